use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use school_quiz_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    dto::admin_dto::CreateUserRequest,
    middleware::{auth as auth_mw, rate_limit},
    models::user::ROLE_PLATFORM_ADMIN,
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);
    seed_platform_admin(&app_state).await?;

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let public_api = Router::new()
        .route("/api/auth/login", post(routes::auth::login))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::new_rps_state(config.public_rps),
            rate_limit::rps_middleware,
        ));

    let authenticated_api = Router::new()
        .route("/api/auth/me", get(routes::auth::me))
        .route("/api/quiz/subjects", get(routes::quiz::list_subjects))
        .route("/api/leaderboard", get(routes::leaderboard::top_students))
        .route("/api/me/progress", get(routes::leaderboard::my_progress))
        .layer(from_fn(auth_mw::require_bearer_auth));

    let student_api = Router::new()
        .route("/api/quiz/sessions", post(routes::quiz::create_session))
        .route("/api/quiz/sessions/:id", get(routes::quiz::get_session))
        .route(
            "/api/quiz/sessions/:id/select",
            post(routes::quiz::select_answer),
        )
        .route(
            "/api/quiz/sessions/:id/submit",
            post(routes::quiz::submit_answer),
        )
        .route(
            "/api/quiz/sessions/:id/advance",
            post(routes::quiz::advance_session),
        )
        .layer(from_fn(auth_mw::require_student));

    let professor_api = Router::new()
        .route(
            "/api/questions",
            get(routes::questions::list_questions).post(routes::questions::create_question),
        )
        .route(
            "/api/questions/:id",
            get(routes::questions::get_question)
                .patch(routes::questions::update_question)
                .delete(routes::questions::delete_question),
        )
        .layer(from_fn(auth_mw::require_professor));

    let school_admin_api = Router::new()
        .route(
            "/api/users",
            get(routes::users::list_users).post(routes::users::create_user),
        )
        .route(
            "/api/users/:id",
            get(routes::users::get_user)
                .patch(routes::users::update_user)
                .delete(routes::users::delete_user),
        )
        .layer(from_fn(auth_mw::require_school_admin))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::new_rps_state(config.admin_rps),
            rate_limit::rps_middleware,
        ));

    let platform_admin_api = Router::new()
        .route(
            "/api/schools",
            get(routes::schools::list_schools).post(routes::schools::create_school),
        )
        .route(
            "/api/schools/:id",
            get(routes::schools::get_school)
                .patch(routes::schools::update_school)
                .delete(routes::schools::delete_school),
        )
        .route(
            "/api/schools/:id/stats",
            get(routes::schools::school_stats),
        )
        .layer(from_fn(auth_mw::require_platform_admin))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::new_rps_state(config.admin_rps),
            rate_limit::rps_middleware,
        ));

    let app = base_routes
        .merge(public_api)
        .merge(authenticated_api)
        .merge(student_api)
        .merge(professor_api)
        .merge(school_admin_api)
        .merge(platform_admin_api)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// First-boot bootstrap: if ADMIN_EMAIL and ADMIN_PASSWORD are set and no
/// account with that email exists yet, create the platform admin.
async fn seed_platform_admin(state: &AppState) -> anyhow::Result<()> {
    let config = get_config();
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return Ok(());
    };

    let exists = sqlx::query_scalar::<_, bool>(
        r#"SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)"#,
    )
    .bind(email)
    .fetch_one(&state.pool)
    .await?;
    if exists {
        return Ok(());
    }

    let admin = state
        .user_service
        .create_user(CreateUserRequest {
            name: "Platform Admin".to_string(),
            email: email.clone(),
            password: password.clone(),
            role: ROLE_PLATFORM_ADMIN.to_string(),
            school_id: None,
            school_year: None,
            classroom: None,
            subject_specialization: None,
        })
        .await?;
    info!(user_id = %admin.id, "platform admin account seeded");
    Ok(())
}
