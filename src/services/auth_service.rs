use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use rand::rngs::OsRng;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::user::User;

pub fn hash_password(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Internal(format!("failed to hash password: {}", e)))
}

pub fn verify_password(plain: &str, hashed: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hashed)
        .map_err(|e| Error::Internal(format!("stored password hash is invalid: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
}

impl AuthService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Verifies credentials and issues a bearer token. The "remember me"
    /// flag picks the long TTL; sign-out is client-side token discard.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<(String, User, DateTime<Utc>)> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE email = $1"#)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        let Some(user) = user else {
            return Err(Error::Unauthorized("invalid credentials".to_string()));
        };
        if !verify_password(password, &user.password_hash)? {
            return Err(Error::Unauthorized("invalid credentials".to_string()));
        }

        let config = crate::config::get_config();
        let ttl_hours = if remember_me {
            config.remember_me_ttl_hours
        } else {
            config.session_ttl_hours
        };
        let expires_at = Utc::now() + Duration::hours(ttl_hours);
        let claims = Claims {
            sub: user.id.to_string(),
            exp: expires_at.timestamp() as usize,
            role: Some(user.role.clone()),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .map_err(|e| Error::Internal(format!("failed to sign token: {}", e)))?;

        tracing::info!(user_id = %user.id, remember_me, "user signed in");
        Ok((token, user, expires_at))
    }

    /// Resolves the token subject to a live account. A submit without a
    /// resolvable user is a hard 401, never a silent no-op.
    pub async fn current_user(&self, claims: &Claims) -> Result<User> {
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| Error::Unauthorized("invalid token subject".to_string()))?;
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = $1"#)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        user.ok_or_else(|| Error::Unauthorized("account no longer exists".to_string()))
    }
}
