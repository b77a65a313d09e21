use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::session::{QuizSessionRow, SESSION_ACTIVE, SESSION_FINISHED};
use crate::quiz::session::QuizSession;

/// Persistence for the quiz engine: the state machine itself is pure, this
/// service loads the snapshot, lets the caller apply one transition, and
/// stores the result.
#[derive(Clone)]
pub struct SessionService {
    pool: PgPool,
}

impl SessionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: Uuid, session: &QuizSession) -> Result<QuizSessionRow> {
        let state = serde_json::to_value(session)?;
        let row = sqlx::query_as::<_, QuizSessionRow>(
            r#"
            INSERT INTO quiz_sessions (user_id, subject, topic, state, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&session.subject)
        .bind(&session.topic)
        .bind(state)
        .bind(SESSION_ACTIVE)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            session_id = %row.id,
            user_id = %user_id,
            subject = %session.subject,
            topic = %session.topic,
            questions = session.total_questions(),
            "quiz session created"
        );
        Ok(row)
    }

    /// Loads a session and enforces ownership: a student can only ever touch
    /// their own sessions.
    pub async fn get_owned(&self, id: Uuid, user_id: Uuid) -> Result<(QuizSessionRow, QuizSession)> {
        let row = sqlx::query_as::<_, QuizSessionRow>(
            r#"SELECT * FROM quiz_sessions WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Err(Error::NotFound("quiz session not found".to_string()));
        };
        if row.user_id != user_id {
            return Err(Error::Forbidden(
                "quiz session belongs to another user".to_string(),
            ));
        }
        let session: QuizSession = serde_json::from_value(row.state.clone())?;
        Ok((row, session))
    }

    /// Claims the finish for a session by flipping an `active` row to
    /// `finished` in a single conditional update. Returns false when another
    /// request already claimed it, so the caller applies the progression
    /// aggregate at most once per session.
    pub async fn finish(&self, id: Uuid, session: &QuizSession) -> Result<bool> {
        let state = serde_json::to_value(session)?;
        let result = sqlx::query(
            r#"
            UPDATE quiz_sessions
            SET state = $2,
                status = $3,
                finished_at = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND status = $4
            "#,
        )
        .bind(id)
        .bind(state)
        .bind(SESSION_FINISHED)
        .bind(SESSION_ACTIVE)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn save(&self, id: Uuid, session: &QuizSession) -> Result<()> {
        let state = serde_json::to_value(session)?;
        let status = if session.is_finished() {
            SESSION_FINISHED
        } else {
            SESSION_ACTIVE
        };
        let finished_at = session.is_finished().then(Utc::now);
        sqlx::query(
            r#"
            UPDATE quiz_sessions
            SET state = $2,
                status = $3,
                finished_at = COALESCE(finished_at, $4),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(state)
        .bind(status)
        .bind(finished_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
