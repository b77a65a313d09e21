use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::Result;
use crate::models::user::ROLE_STUDENT;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LeaderboardEntry {
    pub user_id: Uuid,
    pub name: String,
    pub points: i64,
    pub level: i32,
    pub correct_answers: i32,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SubjectBreakdown {
    pub subject: String,
    pub total: i64,
    pub correct: i64,
}

/// Read-only reducers over the persisted output of the quiz flow. Nothing
/// here mutates state or participates in the session machine.
#[derive(Clone)]
pub struct LeaderboardService {
    pool: PgPool,
}

impl LeaderboardService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn top_students(
        &self,
        school_id: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<LeaderboardEntry>> {
        let entries = sqlx::query_as::<_, LeaderboardEntry>(
            r#"
            SELECT id AS user_id, name, points, level, correct_answers
            FROM users
            WHERE role = $1
              AND ($2::uuid IS NULL OR school_id = $2)
            ORDER BY points DESC, experience DESC, name ASC
            LIMIT $3
            "#,
        )
        .bind(ROLE_STUDENT)
        .bind(school_id)
        .bind(limit.clamp(1, 100))
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    /// Correct/total response counts per subject for one user, duplicates
    /// included since the response log is append-only.
    pub async fn subject_breakdown(&self, user_id: Uuid) -> Result<Vec<SubjectBreakdown>> {
        let breakdown = sqlx::query_as::<_, SubjectBreakdown>(
            r#"
            SELECT subject,
                   COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE is_correct) AS correct
            FROM responses
            WHERE user_id = $1
            GROUP BY subject
            ORDER BY subject
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(breakdown)
    }

    pub async fn school_response_count(&self, school_id: Uuid) -> Result<i64> {
        let count =
            sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM responses WHERE school_id = $1"#)
                .bind(school_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
