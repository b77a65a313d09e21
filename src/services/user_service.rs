use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::admin_dto::{CreateUserRequest, ListUsersQuery, UpdateUserRequest};
use crate::error::{Error, Result};
use crate::models::user::{User, ROLES};
use crate::services::auth_service::hash_password;

#[derive(Debug, serde::Serialize)]
pub struct PaginatedUsers {
    pub items: Vec<User>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_user(&self, payload: CreateUserRequest) -> Result<User> {
        if !ROLES.iter().any(|r| r.eq_ignore_ascii_case(&payload.role)) {
            return Err(Error::BadRequest(format!(
                "unknown role: {}",
                payload.role
            )));
        }
        let password_hash = hash_password(&payload.password)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, role, school_id,
                               school_year, classroom, subject_specialization)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.email)
        .bind(&password_hash)
        .bind(&payload.role)
        .bind(payload.school_id)
        .bind(&payload.school_year)
        .bind(&payload.classroom)
        .bind(&payload.subject_specialization)
        .fetch_one(&self.pool)
        .await
        .map_err(duplicate_email_error)?;

        Ok(user)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        user.ok_or_else(|| Error::NotFound("user not found".to_string()))
    }

    pub async fn list_users(&self, filter: ListUsersQuery) -> Result<PaginatedUsers> {
        let page = filter.page.unwrap_or(1).max(1);
        let per_page = filter.limit.unwrap_or(50).clamp(1, 200);
        let offset = (page - 1) * per_page;

        let items = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE ($1::uuid IS NULL OR school_id = $1)
              AND ($2::text IS NULL OR role = $2)
            ORDER BY name ASC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.school_id)
        .bind(&filter.role)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM users
            WHERE ($1::uuid IS NULL OR school_id = $1)
              AND ($2::text IS NULL OR role = $2)
            "#,
        )
        .bind(filter.school_id)
        .bind(&filter.role)
        .fetch_one(&self.pool)
        .await?;

        Ok(PaginatedUsers {
            items,
            total,
            page,
            per_page,
        })
    }

    /// Partial update of profile fields. Role and the progression aggregate
    /// are deliberately not updatable here; the aggregate has no decrement
    /// path anywhere in the API.
    pub async fn update_user(&self, id: Uuid, payload: UpdateUserRequest) -> Result<User> {
        let password_hash = match &payload.password {
            Some(plain) => Some(hash_password(plain)?),
            None => None,
        };
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                school_year = COALESCE($5, school_year),
                classroom = COALESCE($6, classroom),
                subject_specialization = COALESCE($7, subject_specialization),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.email)
        .bind(&password_hash)
        .bind(&payload.school_year)
        .bind(&payload.classroom)
        .bind(&payload.subject_specialization)
        .fetch_optional(&self.pool)
        .await
        .map_err(duplicate_email_error)?;
        user.ok_or_else(|| Error::NotFound("user not found".to_string()))
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("user not found".to_string()));
        }
        Ok(())
    }
}

/// The email column is unique; both the insert and the email-changing update
/// surface a violation as a 409, not a 500.
fn duplicate_email_error(err: sqlx::Error) -> Error {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Error::Conflict("email is already registered".to_string())
        }
        _ => err.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::DatabaseError;

    #[derive(Debug)]
    struct DuplicateKey;

    impl std::fmt::Display for DuplicateKey {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.message())
        }
    }

    impl std::error::Error for DuplicateKey {}

    impl sqlx::error::DatabaseError for DuplicateKey {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint \"users_email_key\""
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            sqlx::error::ErrorKind::UniqueViolation
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }
    }

    #[test]
    fn unique_violation_maps_to_conflict() {
        let err = duplicate_email_error(sqlx::Error::Database(Box::new(DuplicateKey)));
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[test]
    fn other_database_errors_pass_through() {
        let err = duplicate_email_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, Error::NotFound(_)));
        let err = duplicate_email_error(sqlx::Error::PoolClosed);
        assert!(matches!(err, Error::Database(_)));
    }
}
