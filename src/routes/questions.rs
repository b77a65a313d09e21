use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::dto::admin_dto::{CreateQuestionRequest, ListQuestionsQuery, UpdateQuestionRequest};
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::question::Question;
use crate::models::user::User;
use crate::AppState;

fn check_school_scope(actor: &User, question: &Question) -> Result<()> {
    if actor.is_platform_admin() || actor.school_id == Some(question.school_id) {
        return Ok(());
    }
    Err(Error::Forbidden(
        "question belongs to another school".to_string(),
    ))
}

#[axum::debug_handler]
pub async fn create_question(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateQuestionRequest>,
) -> Result<Response> {
    req.validate()?;
    let actor = state.auth_service.current_user(&claims).await?;
    let school_id = actor
        .school_id
        .ok_or_else(|| Error::BadRequest("author is not assigned to a school".to_string()))?;
    let question = state
        .question_service
        .create_question(req, school_id, actor.id)
        .await?;
    let _ = state
        .audit_service
        .log(
            Some(actor.id),
            "create_question",
            "question",
            question.id,
            Some(json!({ "subject": question.subject, "topic": question.topic })),
        )
        .await;
    Ok((StatusCode::CREATED, Json(question)).into_response())
}

#[axum::debug_handler]
pub async fn list_questions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListQuestionsQuery>,
) -> Result<Response> {
    let actor = state.auth_service.current_user(&claims).await?;
    let mut query = query;
    if !actor.is_platform_admin() {
        query.school_id = actor.school_id;
    }
    let page = state.question_service.list_questions(query).await?;
    Ok(Json(page).into_response())
}

#[axum::debug_handler]
pub async fn get_question(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    let actor = state.auth_service.current_user(&claims).await?;
    let question = state.question_service.get_question(id).await?;
    check_school_scope(&actor, &question)?;
    Ok(Json(question).into_response())
}

#[axum::debug_handler]
pub async fn update_question(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateQuestionRequest>,
) -> Result<Response> {
    req.validate()?;
    let actor = state.auth_service.current_user(&claims).await?;
    let existing = state.question_service.get_question(id).await?;
    check_school_scope(&actor, &existing)?;
    let question = state.question_service.update_question(id, req).await?;
    let _ = state
        .audit_service
        .log(Some(actor.id), "update_question", "question", id, None)
        .await;
    Ok(Json(question).into_response())
}

#[axum::debug_handler]
pub async fn delete_question(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    let actor = state.auth_service.current_user(&claims).await?;
    let existing = state.question_service.get_question(id).await?;
    check_school_scope(&actor, &existing)?;
    state.question_service.delete_question(id).await?;
    let _ = state
        .audit_service
        .log(Some(actor.id), "delete_question", "question", id, None)
        .await;
    Ok(StatusCode::NO_CONTENT.into_response())
}
