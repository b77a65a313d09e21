use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde_json::json;

use crate::dto::auth_dto::UserView;
use crate::dto::quiz_dto::LeaderboardQuery;
use crate::middleware::auth::Claims;
use crate::AppState;

#[axum::debug_handler]
pub async fn top_students(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> crate::error::Result<Response> {
    let entries = state
        .leaderboard_service
        .top_students(query.school_id, query.limit.unwrap_or(10))
        .await?;
    Ok(Json(entries).into_response())
}

/// The caller's own aggregate plus their per-subject response breakdown.
#[axum::debug_handler]
pub async fn my_progress(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> crate::error::Result<Response> {
    let user = state.auth_service.current_user(&claims).await?;
    let subjects = state.leaderboard_service.subject_breakdown(user.id).await?;
    Ok(Json(json!({
        "user": UserView::from(user),
        "subjects": subjects,
    }))
    .into_response())
}
