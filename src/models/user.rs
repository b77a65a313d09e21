use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const ROLE_PLATFORM_ADMIN: &str = "adminMaster";
pub const ROLE_SCHOOL_ADMIN: &str = "admin";
pub const ROLE_SCHOOL_ADMIN_EM: &str = "AdminEM";
pub const ROLE_PROFESSOR: &str = "professor";
pub const ROLE_STUDENT: &str = "student";

pub const ROLES: [&str; 5] = [
    ROLE_PLATFORM_ADMIN,
    ROLE_SCHOOL_ADMIN,
    ROLE_SCHOOL_ADMIN_EM,
    ROLE_PROFESSOR,
    ROLE_STUDENT,
];

/// Portal account. The points/experience/level/correct_answers aggregate is
/// mutated only by the progression engine at session finish, and only upward.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub school_id: Option<Uuid>,
    pub points: i64,
    pub experience: i64,
    pub level: i32,
    pub correct_answers: i32,
    pub school_year: Option<String>,
    pub classroom: Option<String>,
    pub subject_specialization: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_platform_admin(&self) -> bool {
        self.role.eq_ignore_ascii_case(ROLE_PLATFORM_ADMIN)
    }

    pub fn is_school_admin(&self) -> bool {
        self.role.eq_ignore_ascii_case(ROLE_SCHOOL_ADMIN)
            || self.role.eq_ignore_ascii_case(ROLE_SCHOOL_ADMIN_EM)
    }
}
