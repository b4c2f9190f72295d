//! # Payment Repository
//!
//! Reads of payment status (the watcher's poll) and the settlement entry
//! point used by the payment system.
//!
//! ## Settlement
//! ```text
//! payment system ──► mark_payment_paid(sale_id)
//!                        │  BEGIN
//!                        ├── payments.status = PAID, paid_at = now
//!                        ├── sales.status    = PAID
//!                        │  COMMIT
//!                        ▼
//!                  ChangeNotifier::publish ──► PaymentSubscription(sale_id)
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::notify::{ChangeNotifier, PaymentChange};
use raiz_core::{Payment, PaymentStatus};

#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
    notifier: ChangeNotifier,
}

impl PaymentRepository {
    pub fn new(pool: SqlitePool, notifier: ChangeNotifier) -> Self {
        PaymentRepository { pool, notifier }
    }

    pub async fn get_for_sale(&self, sale_id: &str) -> DbResult<Option<Payment>> {
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

        Ok(payment)
    }

    /// Current status of the sale's payment.
    pub async fn status_for_sale(&self, sale_id: &str) -> DbResult<PaymentStatus> {
        let status: Option<PaymentStatus> =
            sqlx::query_scalar("SELECT status FROM payments WHERE sale_id = ?1")
                .bind(sale_id)
                .fetch_optional(&self.pool)
                .await?;

        status.ok_or_else(|| DbError::not_found("Payment", sale_id))
    }

    /// Settles the sale's payment and notifies subscribers.
    ///
    /// Settling an already paid sale changes nothing and publishes nothing.
    pub async fn mark_payment_paid(&self, sale_id: &str) -> DbResult<PaymentChange> {
        let payment = self
            .get_for_sale(sale_id)
            .await?
            .ok_or_else(|| DbError::not_found("Payment", sale_id))?;

        let change = PaymentChange {
            sale_id: sale_id.to_string(),
            payment_id: payment.id.clone(),
            status: PaymentStatus::Paid,
        };

        if payment.status.is_paid() {
            debug!(sale_id = %sale_id, "Payment already paid");
            return Ok(change);
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE payments SET status = 'PAID', paid_at = ?2
            WHERE id = ?1 AND status = 'PENDING'
            "#,
        )
        .bind(&payment.id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE sales SET status = 'PAID', updated_at = ?2 WHERE id = ?1")
            .bind(sale_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(sale_id = %sale_id, payment_id = %payment.id, "Payment confirmed");
        self.notifier.publish(change.clone());

        Ok(change)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, DbError};
    use raiz_core::{
        PaymentMethod, PaymentStatus, ProductInput, SaleLine, SaleStatus, SaleTransactionRequest,
    };

    async fn pending_sale(db: &Database) -> String {
        let user = db.users().register("ana@example.com", "segredo123").await.unwrap();
        let store = db.stores().create(&user.id, "Minha Loja", None).await.unwrap();
        let product = db
            .products()
            .create(
                &store.id,
                &ProductInput {
                    name: "Barba".to_string(),
                    description: None,
                    price_cents: 3000,
                    stock: 3,
                },
            )
            .await
            .unwrap();

        db.sales()
            .create_sale_transaction(&SaleTransactionRequest {
                store_id: store.id,
                total_cents: 3000,
                items: vec![SaleLine {
                    product_id: product.id,
                    quantity: 1,
                    unit_price_cents: 3000,
                    line_total_cents: 3000,
                    product_name: product.name,
                }],
                payment_method: PaymentMethod::Pix,
                idempotency_key: None,
            })
            .await
            .unwrap()
            .sale_id
    }

    #[tokio::test]
    async fn test_mark_paid_updates_and_publishes() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sale_id = pending_sale(&db).await;
        let mut sub = db.subscribe_payments(&sale_id);

        assert_eq!(
            db.payments().status_for_sale(&sale_id).await.unwrap(),
            PaymentStatus::Pending
        );

        db.payments().mark_payment_paid(&sale_id).await.unwrap();

        let change = sub.recv().await.unwrap();
        assert_eq!(change.status, PaymentStatus::Paid);
        assert_eq!(
            db.payments().status_for_sale(&sale_id).await.unwrap(),
            PaymentStatus::Paid
        );

        let sale = db.sales().get_by_id(&sale_id).await.unwrap().unwrap();
        assert_eq!(sale.status, SaleStatus::Paid);
        let payment = db.payments().get_for_sale(&sale_id).await.unwrap().unwrap();
        assert!(payment.paid_at.is_some());
    }

    #[tokio::test]
    async fn test_mark_paid_twice_publishes_once() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sale_id = pending_sale(&db).await;
        let mut sub = db.subscribe_payments(&sale_id);

        db.payments().mark_payment_paid(&sale_id).await.unwrap();
        db.payments().mark_payment_paid(&sale_id).await.unwrap();

        assert!(sub.recv().await.is_some());
        drop(db);
        assert!(sub.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_unknown_sale() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(matches!(
            db.payments().status_for_sale("missing").await,
            Err(DbError::NotFound { .. })
        ));
        assert!(matches!(
            db.payments().mark_payment_paid("missing").await,
            Err(DbError::NotFound { .. })
        ));
    }
}
