use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::user::User;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    pub remember_me: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserView,
}

/// Account shape exposed over the API: everything except the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub school_id: Option<Uuid>,
    pub points: i64,
    pub experience: i64,
    pub level: i32,
    pub correct_answers: i32,
    pub school_year: Option<String>,
    pub classroom: Option<String>,
    pub subject_specialization: Option<String>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            school_id: user.school_id,
            points: user.points,
            experience: user.experience,
            level: user.level,
            correct_answers: user.correct_answers,
            school_year: user.school_year,
            classroom: user.classroom,
            subject_specialization: user.subject_specialization,
        }
    }
}
