//! # User Repository
//!
//! The identity side of the gateway: registering accounts and checking
//! credentials. Session tokens are issued by the app, not here.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::password::{hash_password_blocking, verify_password_blocking};
use crate::repository::new_id;
use raiz_core::User;

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Creates an account. `email` must already be normalized.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Email already registered
    pub async fn register(&self, email: &str, password: &str) -> DbResult<User> {
        debug!(email = %email, "Registering user");

        if self.get_by_email(email).await?.is_some() {
            return Err(DbError::duplicate("email", email));
        }

        let password_hash = hash_password_blocking(password.to_string()).await?;
        let user = User {
            id: new_id(),
            email: email.to_string(),
            password_hash,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(user)
    }

    /// Returns the user when `password` matches.
    ///
    /// Unknown email and wrong password are the same error.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> DbResult<User> {
        let user = self
            .get_by_email(email)
            .await?
            .ok_or(DbError::InvalidCredentials)?;

        let matches =
            verify_password_blocking(password.to_string(), user.password_hash.clone()).await?;
        if !matches {
            return Err(DbError::InvalidCredentials);
        }

        Ok(user)
    }

    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, DbError};

    #[tokio::test]
    async fn test_register_and_verify() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let user = db.users().register("ana@example.com", "segredo123").await.unwrap();
        let verified = db
            .users()
            .verify_credentials("ana@example.com", "segredo123")
            .await
            .unwrap();
        assert_eq!(verified.id, user.id);

        let err = db
            .users()
            .verify_credentials("ana@example.com", "errada")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidCredentials));

        let err = db
            .users()
            .verify_credentials("bia@example.com", "segredo123")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.users().register("ana@example.com", "segredo123").await.unwrap();
        let err = db
            .users()
            .register("ana@example.com", "outra123")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }
}
