//! # Product Repository
//!
//! Catalog operations for one store.
//!
//! ## Visibility
//! ```text
//! ┌──────────────────────┬──────────┬─────────────────────────────────────┐
//! │ Query                │ Filter   │ Screen                              │
//! ├──────────────────────┼──────────┼─────────────────────────────────────┤
//! │ list_active          │ active   │ products (catalog management)       │
//! │ list_sellable        │ active   │ new-sale (only what can be sold)    │
//! │                      │ stock>0  │                                     │
//! │ get_for_store        │ active   │ add_to_cart re-read                 │
//! └──────────────────────┴──────────┴─────────────────────────────────────┘
//! ```
//!
//! Products are never hard-deleted: sale items keep referencing them.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::new_id;
use raiz_core::{Product, ProductInput};

const PRODUCT_COLUMNS: &str =
    "id, store_id, name, description, price_cents, stock, active, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Active products of the store, by name.
    pub async fn list_active(&self, store_id: &str) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE store_id = ?1 AND active = 1 \
             ORDER BY name COLLATE NOCASE"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(store_id)
            .fetch_all(&self.pool)
            .await?;

        debug!(store_id = %store_id, count = products.len(), "Listed products");
        Ok(products)
    }

    /// Active products with stock, by name.
    pub async fn list_sellable(&self, store_id: &str) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE store_id = ?1 AND active = 1 AND stock > 0 \
             ORDER BY name COLLATE NOCASE"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(store_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Gets a product by ID regardless of store or active flag.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets an active product of the store.
    pub async fn get_for_store(&self, store_id: &str, id: &str) -> DbResult<Product> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE id = ?1 AND store_id = ?2 AND active = 1"
        );
        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(store_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Inserts a product. `input` must already be validated.
    pub async fn create(&self, store_id: &str, input: &ProductInput) -> DbResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: new_id(),
            store_id: store_id.to_string(),
            name: input.name.trim().to_string(),
            description: input.description.clone(),
            price_cents: input.price_cents,
            stock: input.stock,
            active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(store_id = %store_id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, store_id, name, description,
                price_cents, stock, active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&product.id)
        .bind(&product.store_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Replaces the editable fields of an active product.
    ///
    /// Past sale items keep their own name and price snapshots.
    pub async fn update(&self, store_id: &str, id: &str, input: &ProductInput) -> DbResult<Product> {
        debug!(id = %id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?3,
                description = ?4,
                price_cents = ?5,
                stock = ?6,
                updated_at = ?7
            WHERE id = ?1 AND store_id = ?2 AND active = 1
            "#,
        )
        .bind(id)
        .bind(store_id)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.price_cents)
        .bind(input.stock)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get_for_store(store_id, id).await
    }

    /// Soft-deletes a product by setting active = false.
    pub async fn soft_delete(&self, store_id: &str, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET active = 0, updated_at = ?3
            WHERE id = ?1 AND store_id = ?2 AND active = 1
            "#,
        )
        .bind(id)
        .bind(store_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products of the store.
    pub async fn count(&self, store_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE store_id = ?1 AND active = 1",
        )
        .bind(store_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, DbError};
    use raiz_core::ProductInput;

    async fn setup() -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = db.users().register("ana@example.com", "segredo123").await.unwrap();
        let store = db.stores().create(&user.id, "Minha Loja", None).await.unwrap();
        (db, store.id)
    }

    fn input(name: &str, price_cents: i64, stock: i64) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            description: None,
            price_cents,
            stock,
        }
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let (db, store_id) = setup().await;

        db.products().create(&store_id, &input("Corte de Cabelo", 4000, 10)).await.unwrap();
        db.products().create(&store_id, &input("Barba", 3000, 0)).await.unwrap();

        let all = db.products().list_active(&store_id).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Barba");

        let sellable = db.products().list_sellable(&store_id).await.unwrap();
        assert_eq!(sellable.len(), 1);
        assert_eq!(sellable[0].name, "Corte de Cabelo");
        assert!(sellable[0].is_sellable());
    }

    #[tokio::test]
    async fn test_update() {
        let (db, store_id) = setup().await;
        let p = db.products().create(&store_id, &input("Barba", 3000, 5)).await.unwrap();

        let updated = db
            .products()
            .update(&store_id, &p.id, &input("Barba Completa", 3500, 4))
            .await
            .unwrap();
        assert_eq!(updated.name, "Barba Completa");
        assert_eq!(updated.price_cents, 3500);
        assert_eq!(updated.stock, 4);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_product() {
        let (db, store_id) = setup().await;
        let p = db.products().create(&store_id, &input("Barba", 3000, 5)).await.unwrap();

        db.products().soft_delete(&store_id, &p.id).await.unwrap();

        assert!(db.products().list_active(&store_id).await.unwrap().is_empty());
        assert_eq!(db.products().count(&store_id).await.unwrap(), 0);

        let row = db.products().get_by_id(&p.id).await.unwrap().unwrap();
        assert!(!row.active);

        let err = db.products().soft_delete(&store_id, &p.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_other_store_cannot_touch_product() {
        let (db, store_id) = setup().await;
        let p = db.products().create(&store_id, &input("Barba", 3000, 5)).await.unwrap();

        let err = db
            .products()
            .get_for_store("other-store", &p.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_negative_stock_rejected_by_schema() {
        let (db, store_id) = setup().await;
        assert!(db
            .products()
            .create(&store_id, &input("Barba", 3000, -1))
            .await
            .is_err());
    }
}
