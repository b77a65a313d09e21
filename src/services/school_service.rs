use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::admin_dto::{CreateSchoolRequest, UpdateSchoolRequest};
use crate::error::{Error, Result};
use crate::models::school::School;

#[derive(Clone)]
pub struct SchoolService {
    pool: PgPool,
}

impl SchoolService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_school(&self, payload: CreateSchoolRequest) -> Result<School> {
        let school = sqlx::query_as::<_, School>(
            r#"
            INSERT INTO schools (name, address, city, state, email_domain, admin_email)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.address)
        .bind(&payload.city)
        .bind(&payload.state)
        .bind(&payload.email_domain)
        .bind(&payload.admin_email)
        .fetch_one(&self.pool)
        .await?;
        Ok(school)
    }

    pub async fn get_school(&self, id: Uuid) -> Result<School> {
        let school = sqlx::query_as::<_, School>(r#"SELECT * FROM schools WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        school.ok_or_else(|| Error::NotFound("school not found".to_string()))
    }

    pub async fn list_schools(&self) -> Result<Vec<School>> {
        let schools = sqlx::query_as::<_, School>(r#"SELECT * FROM schools ORDER BY name ASC"#)
            .fetch_all(&self.pool)
            .await?;
        Ok(schools)
    }

    pub async fn update_school(&self, id: Uuid, payload: UpdateSchoolRequest) -> Result<School> {
        let school = sqlx::query_as::<_, School>(
            r#"
            UPDATE schools
            SET name = COALESCE($2, name),
                address = COALESCE($3, address),
                city = COALESCE($4, city),
                state = COALESCE($5, state),
                email_domain = COALESCE($6, email_domain),
                admin_email = COALESCE($7, admin_email),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.address)
        .bind(&payload.city)
        .bind(&payload.state)
        .bind(&payload.email_domain)
        .bind(&payload.admin_email)
        .fetch_optional(&self.pool)
        .await?;
        school.ok_or_else(|| Error::NotFound("school not found".to_string()))
    }

    /// Removes a school and everything hanging off it. The store has no
    /// referential integrity, so the cascade is explicit, and it runs in a
    /// single transaction instead of one delete per collection.
    pub async fn delete_school(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM quiz_sessions
            WHERE user_id IN (SELECT id FROM users WHERE school_id = $1)
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        sqlx::query(r#"DELETE FROM responses WHERE school_id = $1"#)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(r#"DELETE FROM questions WHERE school_id = $1"#)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(r#"DELETE FROM users WHERE school_id = $1"#)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query(r#"DELETE FROM schools WHERE id = $1"#)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("school not found".to_string()));
        }

        tx.commit().await?;
        tracing::info!(school_id = %id, "school and dependent records deleted");
        Ok(())
    }
}
