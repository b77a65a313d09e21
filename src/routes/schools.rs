use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::dto::admin_dto::{CreateSchoolRequest, UpdateSchoolRequest};
use crate::error::Result;
use crate::middleware::auth::Claims;
use crate::routes::actor_id;
use crate::AppState;

#[axum::debug_handler]
pub async fn create_school(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateSchoolRequest>,
) -> Result<Response> {
    req.validate()?;
    let school = state.school_service.create_school(req).await?;
    let _ = state
        .audit_service
        .log(
            actor_id(&claims),
            "create_school",
            "school",
            school.id,
            Some(json!({ "name": school.name })),
        )
        .await;
    Ok((StatusCode::CREATED, Json(school)).into_response())
}

#[axum::debug_handler]
pub async fn list_schools(State(state): State<AppState>) -> Result<Response> {
    let schools = state.school_service.list_schools().await?;
    Ok(Json(schools).into_response())
}

#[axum::debug_handler]
pub async fn get_school(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    let school = state.school_service.get_school(id).await?;
    Ok(Json(school).into_response())
}

#[axum::debug_handler]
pub async fn update_school(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateSchoolRequest>,
) -> Result<Response> {
    req.validate()?;
    let school = state.school_service.update_school(id, req).await?;
    let _ = state
        .audit_service
        .log(actor_id(&claims), "update_school", "school", id, None)
        .await;
    Ok(Json(school).into_response())
}

/// Dashboard numbers for one school: the record itself plus its response
/// volume from the append-only log.
#[axum::debug_handler]
pub async fn school_stats(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    let school = state.school_service.get_school(id).await?;
    let response_count = state.leaderboard_service.school_response_count(id).await?;
    Ok(Json(json!({
        "school": school,
        "response_count": response_count,
    }))
    .into_response())
}

/// Deletes the school and, in the same transaction, every user, question,
/// response, and quiz session that belongs to it.
#[axum::debug_handler]
pub async fn delete_school(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    state.school_service.delete_school(id).await?;
    let _ = state
        .audit_service
        .log(actor_id(&claims), "delete_school", "school", id, None)
        .await;
    Ok(StatusCode::NO_CONTENT.into_response())
}
