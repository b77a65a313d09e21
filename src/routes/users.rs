use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::dto::admin_dto::{CreateUserRequest, ListUsersQuery, UpdateUserRequest};
use crate::dto::auth_dto::UserView;
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::user::User;
use crate::AppState;

/// School admins only see and manage accounts inside their own school;
/// platform admins are unscoped.
fn check_school_scope(actor: &User, target: &User) -> Result<()> {
    if actor.is_platform_admin() {
        return Ok(());
    }
    if actor.is_school_admin() && actor.school_id.is_some() && actor.school_id == target.school_id
    {
        return Ok(());
    }
    Err(Error::Forbidden(
        "user belongs to another school".to_string(),
    ))
}

#[axum::debug_handler]
pub async fn create_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Response> {
    req.validate()?;
    let actor = state.auth_service.current_user(&claims).await?;
    let mut req = req;
    if !actor.is_platform_admin() {
        req.school_id = actor.school_id;
    }
    let user = state.user_service.create_user(req).await?;
    let _ = state
        .audit_service
        .log(
            Some(actor.id),
            "create_user",
            "user",
            user.id,
            Some(json!({ "role": user.role, "school_id": user.school_id })),
        )
        .await;
    Ok((StatusCode::CREATED, Json(UserView::from(user))).into_response())
}

#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Response> {
    let actor = state.auth_service.current_user(&claims).await?;
    let mut query = query;
    if !actor.is_platform_admin() {
        query.school_id = actor.school_id;
    }
    let page = state.user_service.list_users(query).await?;
    Ok(Json(page).into_response())
}

#[axum::debug_handler]
pub async fn get_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    let actor = state.auth_service.current_user(&claims).await?;
    let user = state.user_service.get_user(id).await?;
    check_school_scope(&actor, &user)?;
    Ok(Json(UserView::from(user)).into_response())
}

#[axum::debug_handler]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Response> {
    req.validate()?;
    let actor = state.auth_service.current_user(&claims).await?;
    let existing = state.user_service.get_user(id).await?;
    check_school_scope(&actor, &existing)?;
    let user = state.user_service.update_user(id, req).await?;
    let _ = state
        .audit_service
        .log(Some(actor.id), "update_user", "user", id, None)
        .await;
    Ok(Json(UserView::from(user)).into_response())
}

#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    let actor = state.auth_service.current_user(&claims).await?;
    let existing = state.user_service.get_user(id).await?;
    check_school_scope(&actor, &existing)?;
    state.user_service.delete_user(id).await?;
    let _ = state
        .audit_service
        .log(Some(actor.id), "delete_user", "user", id, None)
        .await;
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::{
        ROLE_PLATFORM_ADMIN, ROLE_PROFESSOR, ROLE_SCHOOL_ADMIN, ROLE_SCHOOL_ADMIN_EM, ROLE_STUDENT,
    };
    use chrono::Utc;

    fn account(role: &str, school_id: Option<Uuid>) -> User {
        User {
            id: Uuid::new_v4(),
            name: "t".to_string(),
            email: "t@example.com".to_string(),
            password_hash: "x".to_string(),
            role: role.to_string(),
            school_id,
            points: 0,
            experience: 0,
            level: 1,
            correct_answers: 0,
            school_year: None,
            classroom: None,
            subject_specialization: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn platform_admin_is_unscoped() {
        let actor = account(ROLE_PLATFORM_ADMIN, None);
        let target = account(ROLE_STUDENT, Some(Uuid::new_v4()));
        assert!(check_school_scope(&actor, &target).is_ok());
    }

    #[test]
    fn school_admins_stay_inside_their_school() {
        let school = Uuid::new_v4();
        let target = account(ROLE_STUDENT, Some(school));

        for role in [ROLE_SCHOOL_ADMIN, ROLE_SCHOOL_ADMIN_EM] {
            let same_school = account(role, Some(school));
            assert!(check_school_scope(&same_school, &target).is_ok());

            let other_school = account(role, Some(Uuid::new_v4()));
            assert!(check_school_scope(&other_school, &target).is_err());
        }
    }

    #[test]
    fn non_admin_roles_never_pass_the_scope_check() {
        let school = Uuid::new_v4();
        let actor = account(ROLE_PROFESSOR, Some(school));
        let target = account(ROLE_STUDENT, Some(school));
        assert!(check_school_scope(&actor, &target).is_err());
    }
}
