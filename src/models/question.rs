use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A professor-authored question. `correct_answer` is stored by value, not
/// index; the application enforces that it appears among `answers`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: Uuid,
    pub subject: String,
    pub topic: String,
    pub question: String,
    pub answers: sqlx::types::Json<Vec<String>>,
    pub correct_answer: String,
    pub school_id: Uuid,
    pub school_year: String,
    pub classroom: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
