//! # Store Repository
//!
//! One store per user, created on first login when missing.
//!
//! ```text
//! sign_in ──► get_by_owner(user) ── Some ──► use it
//!                   │
//!                  None
//!                   ▼
//!             create(owner, "Minha Loja")
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::new_id;
use raiz_core::{Store, StoreProfile};

#[derive(Debug, Clone)]
pub struct StoreRepository {
    pool: SqlitePool,
}

impl StoreRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StoreRepository { pool }
    }

    pub async fn get_by_owner(&self, owner_id: &str) -> DbResult<Option<Store>> {
        let store = sqlx::query_as::<_, Store>(
            r#"
            SELECT id, owner_id, name, address, business_hours, created_at, updated_at
            FROM stores
            WHERE owner_id = ?1
            "#,
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(store)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Store>> {
        let store = sqlx::query_as::<_, Store>(
            r#"
            SELECT id, owner_id, name, address, business_hours, created_at, updated_at
            FROM stores
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(store)
    }

    /// Creates the owner's store.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Owner already has a store
    pub async fn create(
        &self,
        owner_id: &str,
        name: &str,
        business_hours: Option<&str>,
    ) -> DbResult<Store> {
        let now = Utc::now();
        let store = Store {
            id: new_id(),
            owner_id: owner_id.to_string(),
            name: name.to_string(),
            address: None,
            business_hours: business_hours.map(str::to_string),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO stores (id, owner_id, name, address, business_hours, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&store.id)
        .bind(&store.owner_id)
        .bind(&store.name)
        .bind(&store.address)
        .bind(&store.business_hours)
        .bind(store.created_at)
        .bind(store.updated_at)
        .execute(&self.pool)
        .await?;

        info!(store_id = %store.id, owner_id = %owner_id, "Store created");
        Ok(store)
    }

    /// Returns the owner's store, creating it if absent.
    pub async fn ensure_for_owner(
        &self,
        owner_id: &str,
        default_name: &str,
        default_business_hours: Option<&str>,
    ) -> DbResult<Store> {
        if let Some(store) = self.get_by_owner(owner_id).await? {
            return Ok(store);
        }

        debug!(owner_id = %owner_id, "No store for owner, creating one");
        self.create(owner_id, default_name, default_business_hours)
            .await
    }

    /// Updates the editable profile fields. Input must be validated.
    pub async fn update_profile(&self, id: &str, profile: &StoreProfile) -> DbResult<Store> {
        let result = sqlx::query(
            r#"
            UPDATE stores SET
                name = ?2,
                address = ?3,
                business_hours = ?4,
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&profile.name)
        .bind(&profile.address)
        .bind(&profile.business_hours)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Store", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Store", id))
    }
}
