use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::response::Response;
use crate::models::user::User;
use crate::quiz::scoring::{level_for_exp, ProgressionDelta};
use crate::quiz::session::AnswerOutcome;

/// User aggregate after a session-finish update was applied.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressionSnapshot {
    pub points: i64,
    pub experience: i64,
    pub level: i32,
    pub correct_answers: i32,
}

#[derive(FromRow)]
struct UserAggregates {
    points: i64,
    experience: i64,
    correct_answers: i32,
}

/// Persistent half of the scoring engine: the duplicate lookup, the
/// append-only response log, and the session-finish aggregate update.
#[derive(Clone)]
pub struct ProgressionService {
    pool: PgPool,
}

impl ProgressionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Idempotency check for scoring: has this user ever submitted this
    /// question (by text) in this subject? Indexed equality probe, not a
    /// scan; two racing submissions may still both see `false`, in which
    /// case both responses are recorded and both score.
    pub async fn has_answered_before(
        &self,
        user_id: Uuid,
        subject: &str,
        question_text: &str,
    ) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM responses
                WHERE user_id = $1 AND subject = $2 AND question_text = $3
            )
            "#,
        )
        .bind(user_id)
        .bind(subject)
        .bind(question_text)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Every submission is recorded, duplicates included; a duplicate just
    /// carries zero points.
    pub async fn record_response(
        &self,
        user: &User,
        subject: &str,
        topic: &str,
        outcome: &AnswerOutcome,
    ) -> Result<Response> {
        let school_id = user
            .school_id
            .ok_or_else(|| Error::BadRequest("user is not assigned to a school".to_string()))?;
        let response = sqlx::query_as::<_, Response>(
            r#"
            INSERT INTO responses (user_id, subject, topic, question_text, selected_answer,
                                   is_correct, school_id, school_year, classroom, points, role_tag)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(subject)
        .bind(topic)
        .bind(&outcome.question)
        .bind(&outcome.selected_answer)
        .bind(outcome.is_correct)
        .bind(school_id)
        .bind(user.school_year.clone().unwrap_or_default())
        .bind(&user.classroom)
        .bind(outcome.points)
        .bind(&user.role)
        .fetch_one(&self.pool)
        .await?;
        Ok(response)
    }

    /// Applies the finish-time aggregate as atomic increments so two
    /// overlapping sessions for the same user both land, then derives the
    /// level from the post-increment experience. The level update is
    /// guarded to stay monotonic.
    pub async fn apply_session_finish(
        &self,
        user_id: Uuid,
        delta: &ProgressionDelta,
    ) -> Result<ProgressionSnapshot> {
        let aggregates = sqlx::query_as::<_, UserAggregates>(
            r#"
            UPDATE users
            SET points = points + $2,
                experience = experience + $3,
                correct_answers = correct_answers + $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING points, experience, correct_answers
            "#,
        )
        .bind(user_id)
        .bind(delta.points)
        .bind(delta.experience)
        .bind(delta.correct_answers)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("user not found".to_string()))?;

        let level = level_for_exp(aggregates.experience);
        sqlx::query(r#"UPDATE users SET level = $2 WHERE id = $1 AND level < $2"#)
            .bind(user_id)
            .bind(level)
            .execute(&self.pool)
            .await?;

        tracing::info!(
            user_id = %user_id,
            points = aggregates.points,
            experience = aggregates.experience,
            level,
            "session progression applied"
        );

        Ok(ProgressionSnapshot {
            points: aggregates.points,
            experience: aggregates.experience,
            level,
            correct_answers: aggregates.correct_answers,
        })
    }
}
