use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::admin_dto::{CreateQuestionRequest, ListQuestionsQuery, UpdateQuestionRequest};
use crate::error::{Error, Result};
use crate::models::question::Question;
use crate::quiz::loader;
use crate::quiz::session::SessionQuestion;

#[derive(Debug, serde::Serialize)]
pub struct PaginatedQuestions {
    pub items: Vec<Question>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

#[derive(Clone)]
pub struct QuestionService {
    pool: PgPool,
}

impl QuestionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_question(
        &self,
        payload: CreateQuestionRequest,
        school_id: Uuid,
        created_by: Uuid,
    ) -> Result<Question> {
        if crate::quiz::ruleset::ruleset_for(&payload.subject).is_none() {
            return Err(Error::BadRequest(format!(
                "unknown subject: {}",
                payload.subject
            )));
        }
        check_answer_invariants(&payload.answers, &payload.correct_answer)?;

        let question = sqlx::query_as::<_, Question>(
            r#"
            INSERT INTO questions (subject, topic, question, answers, correct_answer,
                                   school_id, school_year, classroom, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&payload.subject)
        .bind(&payload.topic)
        .bind(&payload.question)
        .bind(sqlx::types::Json(&payload.answers))
        .bind(&payload.correct_answer)
        .bind(school_id)
        .bind(&payload.school_year)
        .bind(&payload.classroom)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(question)
    }

    pub async fn get_question(&self, id: Uuid) -> Result<Question> {
        let question = sqlx::query_as::<_, Question>(r#"SELECT * FROM questions WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        question.ok_or_else(|| Error::NotFound("question not found".to_string()))
    }

    pub async fn list_questions(&self, filter: ListQuestionsQuery) -> Result<PaginatedQuestions> {
        let page = filter.page.unwrap_or(1).max(1);
        let per_page = filter.limit.unwrap_or(50).clamp(1, 200);
        let offset = (page - 1) * per_page;

        let items = sqlx::query_as::<_, Question>(
            r#"
            SELECT * FROM questions
            WHERE ($1::text IS NULL OR subject = $1)
              AND ($2::text IS NULL OR topic = $2)
              AND ($3::uuid IS NULL OR school_id = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(&filter.subject)
        .bind(&filter.topic)
        .bind(filter.school_id)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM questions
            WHERE ($1::text IS NULL OR subject = $1)
              AND ($2::text IS NULL OR topic = $2)
              AND ($3::uuid IS NULL OR school_id = $3)
            "#,
        )
        .bind(&filter.subject)
        .bind(&filter.topic)
        .bind(filter.school_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(PaginatedQuestions {
            items,
            total,
            page,
            per_page,
        })
    }

    /// Partial update. The answer invariants are re-checked against the
    /// merged record, so an update can never leave a question unanswerable.
    pub async fn update_question(
        &self,
        id: Uuid,
        payload: UpdateQuestionRequest,
    ) -> Result<Question> {
        let existing = self.get_question(id).await?;
        let answers = payload.answers.unwrap_or(existing.answers.0);
        let correct_answer = payload.correct_answer.unwrap_or(existing.correct_answer);
        check_answer_invariants(&answers, &correct_answer)?;

        let question = sqlx::query_as::<_, Question>(
            r#"
            UPDATE questions
            SET topic = COALESCE($2, topic),
                question = COALESCE($3, question),
                answers = $4,
                correct_answer = $5,
                school_year = COALESCE($6, school_year),
                classroom = COALESCE($7, classroom),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.topic)
        .bind(&payload.question)
        .bind(sqlx::types::Json(&answers))
        .bind(&correct_answer)
        .bind(&payload.school_year)
        .bind(&payload.classroom)
        .fetch_one(&self.pool)
        .await?;

        Ok(question)
    }

    pub async fn delete_question(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query(r#"DELETE FROM questions WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("question not found".to_string()));
        }
        Ok(())
    }

    /// Question Set Loader: every matching question for the student's school
    /// scope, invalid records filtered out, answers shuffled per question.
    pub async fn load_quiz_set(
        &self,
        subject: &str,
        topic: &str,
        school_id: Uuid,
        school_year: Option<&str>,
        classroom: Option<&str>,
    ) -> Result<Vec<SessionQuestion>> {
        let rows = sqlx::query_as::<_, Question>(
            r#"
            SELECT * FROM questions
            WHERE subject = $1
              AND topic = $2
              AND school_id = $3
              AND ($4::text IS NULL OR school_year = $4)
              AND (classroom IS NULL OR $5::text IS NULL OR classroom = $5)
            "#,
        )
        .bind(subject)
        .bind(topic)
        .bind(school_id)
        .bind(school_year)
        .bind(classroom)
        .fetch_all(&self.pool)
        .await?;

        Ok(loader::prepare(rows, &mut rand::thread_rng()))
    }
}

fn check_answer_invariants(answers: &[String], correct_answer: &str) -> Result<()> {
    if !(loader::MIN_ANSWERS..=loader::MAX_ANSWERS).contains(&answers.len()) {
        return Err(Error::BadRequest(format!(
            "a question must have between {} and {} answers",
            loader::MIN_ANSWERS,
            loader::MAX_ANSWERS
        )));
    }
    if answers.iter().filter(|a| a.as_str() == correct_answer).count() != 1 {
        return Err(Error::BadRequest(
            "correct_answer must appear exactly once among answers".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(list: &[&str]) -> Vec<String> {
        list.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn invariants_accept_well_formed_question() {
        assert!(check_answer_invariants(&answers(&["a", "b", "c"]), "b").is_ok());
        assert!(check_answer_invariants(&answers(&["a", "b", "c", "d", "e"]), "e").is_ok());
    }

    #[test]
    fn invariants_reject_missing_or_duplicated_correct_answer() {
        assert!(check_answer_invariants(&answers(&["a", "b", "c"]), "z").is_err());
        assert!(check_answer_invariants(&answers(&["a", "a", "b"]), "a").is_err());
    }

    #[test]
    fn invariants_reject_bad_answer_counts() {
        assert!(check_answer_invariants(&answers(&["a", "b"]), "a").is_err());
        assert!(check_answer_invariants(&answers(&["a", "b", "c", "d", "e", "f"]), "a").is_err());
    }
}
