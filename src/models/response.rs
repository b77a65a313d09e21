use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Append-only record of one submission. Duplicates are inserted as new rows
/// with `points = 0`; nothing in the quiz flow updates or deletes these.
/// `question_text` is denormalized on purpose, matching the duplicate check.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Response {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject: String,
    pub topic: String,
    pub question_text: String,
    pub selected_answer: String,
    pub is_correct: bool,
    pub school_id: Uuid,
    pub school_year: String,
    pub classroom: Option<String>,
    pub points: i32,
    pub role_tag: String,
    pub created_at: DateTime<Utc>,
}
