//! # Sale Repository
//!
//! The `create_sale_transaction` procedure and the sales history reads.
//!
//! ## create_sale_transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  request { store_id, total, items[], payment_method, idempotency_key } │
//! │       │                                                                 │
//! │       ├── key seen before? ── same store, total, method ──► stored     │
//! │       │                      └── otherwise ──► Rejected               │
//! │       │                                                                 │
//! │       ├── shape checks (no I/O)                                        │
//! │       │     items non-empty, qty > 0,                                  │
//! │       │     line = unit × qty, total = Σ lines                         │
//! │       ▼                                                                 │
//! │  BEGIN                                                                 │
//! │       ├── store exists                                                 │
//! │       ├── per line: product active in store, stock -= qty              │
//! │       ├── INSERT sales     (CASH → PAID, else PENDING)                 │
//! │       ├── INSERT sale_items (name / price snapshots)                   │
//! │       └── INSERT payments  (same status, paid_at for CASH)             │
//! │  COMMIT ─────────────────────────────────► { sale_id, status }         │
//! │                                                                         │
//! │  Any error before COMMIT drops the transaction: nothing is written.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::new_id;
use raiz_core::{
    Payment, PaymentMethod, PaymentStatus, Sale, SaleDetails, SaleItem, SaleStatus, SaleTransactionRequest,
    SaleTransactionResult,
};

const SALE_COLUMNS: &str =
    "id, store_id, total_cents, status, idempotency_key, created_at, updated_at";

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Creates a sale, its items and its payment atomically.
    ///
    /// ## Returns
    /// * `Ok(SaleTransactionResult)` - Created, or previously created with
    ///   the same idempotency key
    /// * `Err(DbError::Rejected)` - Malformed request or unknown product
    /// * `Err(DbError::InsufficientStock)` - A line exceeds stock
    pub async fn create_sale_transaction(
        &self,
        request: &SaleTransactionRequest,
    ) -> DbResult<SaleTransactionResult> {
        debug!(
            store_id = %request.store_id,
            total_cents = request.total_cents,
            items = request.items.len(),
            method = %request.payment_method,
            "create_sale_transaction"
        );

        if let Some(key) = &request.idempotency_key {
            if let Some(existing) = self.find_by_idempotency_key(key).await? {
                debug!(sale_id = %existing.sale_id, "Idempotency key seen before");
                return existing.replay(request);
            }
        }

        check_request_shape(request)?;

        let mut tx = self.pool.begin().await?;

        match self.write_sale(&mut tx, request).await {
            Ok(result) => {
                tx.commit().await?;
                info!(
                    sale_id = %result.sale_id,
                    status = ?result.status,
                    total_cents = request.total_cents,
                    "Sale created"
                );
                Ok(result)
            }
            // A concurrent call with the same key committed first.
            Err(DbError::UniqueViolation { field, .. }) if field == "sales.idempotency_key" => {
                drop(tx);
                let key = request.idempotency_key.as_deref().unwrap_or_default();
                self.find_by_idempotency_key(key)
                    .await?
                    .ok_or_else(|| DbError::duplicate(field, key))?
                    .replay(request)
            }
            Err(err) => Err(err),
        }
    }

    async fn write_sale(
        &self,
        tx: &mut Transaction<'static, Sqlite>,
        request: &SaleTransactionRequest,
    ) -> DbResult<SaleTransactionResult> {
        let store_exists: Option<String> =
            sqlx::query_scalar("SELECT id FROM stores WHERE id = ?1")
                .bind(&request.store_id)
                .fetch_optional(&mut **tx)
                .await?;
        if store_exists.is_none() {
            return Err(DbError::rejected(format!("unknown store {}", request.store_id)));
        }

        for line in &request.items {
            let active: Option<bool> = sqlx::query_scalar(
                "SELECT active FROM products WHERE id = ?1 AND store_id = ?2",
            )
            .bind(&line.product_id)
            .bind(&request.store_id)
            .fetch_optional(&mut **tx)
            .await?;

            if active != Some(true) {
                return Err(DbError::rejected(format!(
                    "product {} is not available",
                    line.product_name
                )));
            }

            let decremented = sqlx::query(
                r#"
                UPDATE products
                SET stock = stock - ?2, updated_at = ?3
                WHERE id = ?1 AND stock >= ?2
                "#,
            )
            .bind(&line.product_id)
            .bind(line.quantity)
            .bind(Utc::now())
            .execute(&mut **tx)
            .await?;

            if decremented.rows_affected() == 0 {
                let available: i64 =
                    sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
                        .bind(&line.product_id)
                        .fetch_one(&mut **tx)
                        .await?;
                return Err(DbError::InsufficientStock {
                    product: line.product_name.clone(),
                    available,
                    requested: line.quantity,
                });
            }
        }

        let now = Utc::now();
        let settled = request.payment_method.settles_immediately();
        let (sale_status, payment_status) = if settled {
            (SaleStatus::Paid, PaymentStatus::Paid)
        } else {
            (SaleStatus::Pending, PaymentStatus::Pending)
        };

        let sale_id = new_id();

        sqlx::query(
            r#"
            INSERT INTO sales (id, store_id, total_cents, status, idempotency_key, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
        )
        .bind(&sale_id)
        .bind(&request.store_id)
        .bind(request.total_cents)
        .bind(sale_status)
        .bind(&request.idempotency_key)
        .bind(now)
        .execute(&mut **tx)
        .await?;

        for line in &request.items {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, product_id, product_name,
                    quantity, unit_price_cents, line_total_cents, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(new_id())
            .bind(&sale_id)
            .bind(&line.product_id)
            .bind(&line.product_name)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .bind(line.line_total_cents)
            .bind(now)
            .execute(&mut **tx)
            .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO payments (id, sale_id, amount_cents, method, status, created_at, paid_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(new_id())
        .bind(&sale_id)
        .bind(request.total_cents)
        .bind(request.payment_method)
        .bind(payment_status)
        .bind(now)
        .bind(settled.then_some(now))
        .execute(&mut **tx)
        .await?;

        Ok(SaleTransactionResult {
            sale_id,
            status: sale_status,
        })
    }

    async fn find_by_idempotency_key(&self, key: &str) -> DbResult<Option<KeyedSale>> {
        let row: Option<(String, SaleStatus, String, i64, PaymentMethod)> = sqlx::query_as(
            r#"
            SELECT s.id, s.status, s.store_id, s.total_cents, p.method
            FROM sales s
            JOIN payments p ON p.sale_id = s.id
            WHERE s.idempotency_key = ?1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(
            |(sale_id, status, store_id, total_cents, payment_method)| KeyedSale {
                sale_id,
                status,
                store_id,
                total_cents,
                payment_method,
            },
        ))
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    /// Most recent sales of the store first.
    pub async fn list_for_store(&self, store_id: &str, limit: u32) -> DbResult<Vec<Sale>> {
        let sql = format!(
            "SELECT {SALE_COLUMNS} FROM sales \
             WHERE store_id = ?1 \
             ORDER BY created_at DESC, rowid DESC \
             LIMIT ?2"
        );
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(store_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(sales)
    }

    /// Line items of a sale, in insertion order.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, product_id, product_name,
                   quantity, unit_price_cents, line_total_cents, created_at
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Sale, items and payment. The sale must belong to `store_id`.
    pub async fn get_details(&self, store_id: &str, sale_id: &str) -> DbResult<SaleDetails> {
        let sale = self
            .get_by_id(sale_id)
            .await?
            .filter(|sale| sale.store_id == store_id)
            .ok_or_else(|| DbError::not_found("Sale", sale_id))?;

        let items = self.get_items(sale_id).await?;

        let payment = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, sale_id, amount_cents, method, status, created_at, paid_at
            FROM payments
            WHERE sale_id = ?1
            "#,
        )
        .bind(sale_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(SaleDetails {
            sale,
            items,
            payment,
        })
    }
}

/// A sale found by its idempotency key.
#[derive(Debug)]
struct KeyedSale {
    sale_id: String,
    status: SaleStatus,
    store_id: String,
    total_cents: i64,
    payment_method: PaymentMethod,
}

impl KeyedSale {
    /// The stored sale, if `request` asks for the same sale again.
    ///
    /// A key reused for another store, total or payment method is refused
    /// instead of answering with a sale the caller did not ask for.
    fn replay(self, request: &SaleTransactionRequest) -> DbResult<SaleTransactionResult> {
        if self.store_id != request.store_id
            || self.total_cents != request.total_cents
            || self.payment_method != request.payment_method
        {
            warn!(
                sale_id = %self.sale_id,
                stored_method = %self.payment_method,
                requested_method = %request.payment_method,
                "Idempotency key reused for a different sale"
            );
            return Err(DbError::rejected(
                "idempotency key already used for a different sale",
            ));
        }

        Ok(SaleTransactionResult {
            sale_id: self.sale_id,
            status: self.status,
        })
    }
}

/// Checks that need no database access.
fn check_request_shape(request: &SaleTransactionRequest) -> DbResult<()> {
    if request.items.is_empty() {
        return Err(DbError::rejected("a sale needs at least one item"));
    }

    for line in &request.items {
        if line.quantity <= 0 {
            return Err(DbError::rejected(format!(
                "quantity of {} must be positive",
                line.product_name
            )));
        }
        if line.unit_price_cents < 0 {
            return Err(DbError::rejected(format!(
                "price of {} must not be negative",
                line.product_name
            )));
        }
        let expected = line.unit_price_cents.checked_mul(line.quantity);
        if expected != Some(line.line_total_cents) {
            return Err(DbError::rejected(format!(
                "line total of {} does not match price × quantity",
                line.product_name
            )));
        }
    }

    if request.total_cents <= 0 {
        return Err(DbError::rejected("total must be positive"));
    }
    if request.items_total().cents() != request.total_cents {
        return Err(DbError::rejected("total does not match the sum of the items"));
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
