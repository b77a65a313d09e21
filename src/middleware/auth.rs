use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::models::user::{
    ROLE_PLATFORM_ADMIN, ROLE_PROFESSOR, ROLE_SCHOOL_ADMIN, ROLE_SCHOOL_ADMIN_EM, ROLE_STUDENT,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

fn unauthorized(code: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": code }))).into_response()
}

fn bearer_claims(req: &Request) -> std::result::Result<Claims, Response> {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return Err(unauthorized("missing_authorization"));
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return Err(unauthorized("bad_authorization"));
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err(unauthorized("unsupported_scheme"));
    };

    let config = crate::config::get_config();
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| unauthorized("invalid_token"))
}

async fn run_with_roles(mut req: Request, next: Next, allowed: &[&str]) -> Response {
    let claims = match bearer_claims(&req) {
        Ok(claims) => claims,
        Err(resp) => return resp,
    };
    let role = claims.role.clone().unwrap_or_default();
    if !allowed.is_empty() && !allowed.iter().any(|r| r.eq_ignore_ascii_case(&role)) {
        return (StatusCode::FORBIDDEN, Json(json!({"error":"forbidden"}))).into_response();
    }
    req.extensions_mut().insert(claims);
    next.run(req).await
}

/// Any authenticated user.
pub async fn require_bearer_auth(req: Request, next: Next) -> Response {
    run_with_roles(req, next, &[]).await
}

/// Students only: the quiz-taking surface.
pub async fn require_student(req: Request, next: Next) -> Response {
    run_with_roles(req, next, &[ROLE_STUDENT]).await
}

/// Question authoring: professors, plus admins for oversight.
pub async fn require_professor(req: Request, next: Next) -> Response {
    run_with_roles(
        req,
        next,
        &[
            ROLE_PROFESSOR,
            ROLE_SCHOOL_ADMIN,
            ROLE_SCHOOL_ADMIN_EM,
            ROLE_PLATFORM_ADMIN,
        ],
    )
    .await
}

/// User management within a school.
pub async fn require_school_admin(req: Request, next: Next) -> Response {
    run_with_roles(
        req,
        next,
        &[ROLE_SCHOOL_ADMIN, ROLE_SCHOOL_ADMIN_EM, ROLE_PLATFORM_ADMIN],
    )
    .await
}

/// School CRUD is platform-admin only.
pub async fn require_platform_admin(req: Request, next: Next) -> Response {
    run_with_roles(req, next, &[ROLE_PLATFORM_ADMIN]).await
}
