use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

pub const SESSION_ACTIVE: &str = "active";
pub const SESSION_FINISHED: &str = "finished";

/// Persisted quiz session: `state` is the JSON snapshot of the engine's
/// `QuizSession`, the scalar columns exist for querying.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizSessionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject: String,
    pub topic: String,
    pub state: JsonValue,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
