use std::env;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    routing::{get, post},
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value as JsonValue;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use uuid::Uuid;

use school_quiz_backend::middleware::auth::{self, Claims};
use school_quiz_backend::{routes, AppState};

const TEST_SECRET: &str = "test_secret_key";

fn token_for(role: &str) -> String {
    let claims = Claims {
        sub: Uuid::new_v4().to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        role: Some(role.to_string()),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("encode token")
}

/// Auth and routing behaviour that is decided before any query runs: the
/// pool is lazy, so these requests must never touch the database.
#[tokio::test]
async fn router_auth_smoke() {
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("DATABASE_URL", "postgres://localhost:1/unreachable");
    env::set_var("JWT_SECRET", TEST_SECRET);
    env::set_var("PUBLIC_RPS", "100");
    env::set_var("ADMIN_RPS", "100");
    env::set_var("SESSION_TTL_HOURS", "24");
    env::set_var("REMEMBER_ME_TTL_HOURS", "720");
    let _ = school_quiz_backend::config::init_config();

    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost:1/unreachable")
        .expect("lazy pool");
    let app_state = AppState::new(pool);

    let app = Router::new()
        .route("/health", get(routes::health::health))
        .merge(
            Router::new()
                .route("/api/quiz/subjects", get(routes::quiz::list_subjects))
                .layer(axum::middleware::from_fn(auth::require_bearer_auth)),
        )
        .merge(
            Router::new()
                .route("/api/quiz/sessions", post(routes::quiz::create_session))
                .layer(axum::middleware::from_fn(auth::require_student)),
        )
        .merge(
            Router::new()
                .route(
                    "/api/schools/:id/stats",
                    get(routes::schools::school_stats),
                )
                .layer(axum::middleware::from_fn(auth::require_platform_admin)),
        )
        .with_state(app_state);

    // health is open
    let resp = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json: JsonValue = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");

    // missing token
    let resp = app
        .clone()
        .oneshot(
            Request::get("/api/quiz/subjects")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // garbage token
    let resp = app
        .clone()
        .oneshot(
            Request::get("/api/quiz/subjects")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // valid student token reaches the registry handler
    let resp = app
        .clone()
        .oneshot(
            Request::get("/api/quiz/subjects")
                .header(
                    header::AUTHORIZATION,
                    format!("Bearer {}", token_for("student")),
                )
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let subjects: JsonValue = serde_json::from_slice(&body).unwrap();
    let list = subjects.as_array().unwrap();
    assert_eq!(list.len(), 9);
    let math = list.iter().find(|s| s["key"] == "math").unwrap();
    assert_eq!(math["timed"], true);
    assert!(list
        .iter()
        .filter(|s| s["key"] != "math")
        .all(|s| s["timed"] == false));

    // school stats sit behind the platform-admin gate
    let stats_path = format!("/api/schools/{}/stats", Uuid::new_v4());
    let resp = app
        .clone()
        .oneshot(
            Request::get(stats_path.as_str())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .clone()
        .oneshot(
            Request::get(stats_path.as_str())
                .header(
                    header::AUTHORIZATION,
                    format!("Bearer {}", token_for("admin")),
                )
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // wrong role is rejected by the middleware, not the handler
    let resp = app
        .clone()
        .oneshot(
            Request::post("/api/quiz/sessions")
                .header(
                    header::AUTHORIZATION,
                    format!("Bearer {}", token_for("professor")),
                )
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"subject":"math","topic":"unit-1"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
