use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::dto::quiz_dto::{
    AdvanceResponse, AnswerView, CreateSessionRequest, SelectAnswerRequest, SessionSummary,
    SessionView, SubjectInfo,
};
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::quiz::ruleset::{ruleset_for, SUBJECT_KEYS};
use crate::quiz::scoring::ProgressionDelta;
use crate::quiz::session::{Advance, QuizSession, SessionError};
use crate::AppState;

#[axum::debug_handler]
pub async fn list_subjects() -> Json<Vec<SubjectInfo>> {
    let subjects = SUBJECT_KEYS
        .into_iter()
        .map(|key| SubjectInfo {
            key,
            timed: ruleset_for(key).is_some_and(|r| r.awards_progression()),
        })
        .collect();
    Json(subjects)
}

#[axum::debug_handler]
pub async fn create_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<Response> {
    req.validate()?;
    let user = state.auth_service.current_user(&claims).await?;
    let rules = ruleset_for(&req.subject)
        .ok_or_else(|| Error::NotFound(format!("unknown subject: {}", req.subject)))?;
    let school_id = user
        .school_id
        .ok_or_else(|| Error::BadRequest("user is not assigned to a school".to_string()))?;

    let questions = state
        .question_service
        .load_quiz_set(
            &req.subject,
            &req.topic,
            school_id,
            user.school_year.as_deref(),
            user.classroom.as_deref(),
        )
        .await?;

    let session = QuizSession::new(req.subject, req.topic, rules, questions, Utc::now())?;
    let row = state.session_service.create(user.id, &session).await?;

    Ok((
        StatusCode::CREATED,
        Json(SessionView::from_session(row.id, &session, Utc::now())),
    )
        .into_response())
}

#[axum::debug_handler]
pub async fn get_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    let user = state.auth_service.current_user(&claims).await?;
    let (row, session) = state.session_service.get_owned(id, user.id).await?;
    Ok(Json(SessionView::from_session(row.id, &session, Utc::now())).into_response())
}

#[axum::debug_handler]
pub async fn select_answer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<SelectAnswerRequest>,
) -> Result<Response> {
    req.validate()?;
    let user = state.auth_service.current_user(&claims).await?;
    let (row, mut session) = state.session_service.get_owned(id, user.id).await?;
    session.select(&req.answer)?;
    state.session_service.save(row.id, &session).await?;
    Ok(Json(SessionView::from_session(row.id, &session, Utc::now())).into_response())
}

/// Locks in the selected answer: scores it, logs the response, and moves
/// the session to `answered`. The duplicate lookup happens here, before the
/// state machine scores, so a repeat of an old question earns zero points.
#[axum::debug_handler]
pub async fn submit_answer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    let user = state.auth_service.current_user(&claims).await?;
    let (row, mut session) = state.session_service.get_owned(id, user.id).await?;

    let question_text = session
        .current_question()
        .map(|q| q.question.clone())
        .ok_or(Error::Session(SessionError::Finished))?;
    let already_answered = state
        .progression_service
        .has_answered_before(user.id, &session.subject, &question_text)
        .await?;

    let outcome = session.submit(already_answered, Utc::now())?;
    state
        .progression_service
        .record_response(&user, &session.subject, &session.topic, &outcome)
        .await?;
    state.session_service.save(row.id, &session).await?;

    Ok(Json(AnswerView::from(&outcome)).into_response())
}

#[axum::debug_handler]
pub async fn advance_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    let user = state.auth_service.current_user(&claims).await?;
    let (row, mut session) = state.session_service.get_owned(id, user.id).await?;

    match session.advance(Utc::now())? {
        Advance::Next(_) => {
            state.session_service.save(row.id, &session).await?;
            Ok(Json(AdvanceResponse {
                finished: false,
                session: Some(SessionView::from_session(row.id, &session, Utc::now())),
                summary: None,
            })
            .into_response())
        }
        Advance::Finished => {
            // Claim the finish before touching the user aggregate: a second
            // advance racing on the same last question loses the claim and
            // gets a conflict instead of double-crediting exp and points.
            if !state.session_service.finish(row.id, &session).await? {
                return Err(Error::Session(SessionError::Finished));
            }
            let progression =
                match ProgressionDelta::from_session(&session.rules, &session.totals) {
                    Some(delta) => Some(
                        state
                            .progression_service
                            .apply_session_finish(user.id, &delta)
                            .await?,
                    ),
                    None => None,
                };

            let summary = SessionSummary {
                correct_count: session.totals.correct_count,
                incorrect_count: session.totals.incorrect_count,
                quiz_points: session.totals.quiz_points,
                progression,
            };
            let _ = state
                .audit_service
                .log(
                    Some(user.id),
                    "finish_session",
                    "quiz_session",
                    row.id,
                    Some(json!({
                        "subject": session.subject,
                        "correct": summary.correct_count,
                        "quiz_points": summary.quiz_points,
                    })),
                )
                .await;

            Ok(Json(AdvanceResponse {
                finished: true,
                session: None,
                summary: Some(summary),
            })
            .into_response())
        }
    }
}
