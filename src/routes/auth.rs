use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
    Extension,
};
use validator::Validate;

use crate::dto::auth_dto::{LoginRequest, LoginResponse, UserView};
use crate::middleware::auth::Claims;
use crate::AppState;

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let (token, user, expires_at) = state
        .auth_service
        .login(&req.email, &req.password, req.remember_me.unwrap_or(false))
        .await?;
    Ok(Json(LoginResponse {
        token,
        expires_at,
        user: UserView::from(user),
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> crate::error::Result<Response> {
    let user = state.auth_service.current_user(&claims).await?;
    Ok(Json(UserView::from(user)).into_response())
}
