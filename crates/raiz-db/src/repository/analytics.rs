//! # Analytics Repository
//!
//! Reads the `store_analytics` view behind the dashboard cards.

use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};
use raiz_core::StoreAnalytics;

#[derive(Debug, Clone)]
pub struct AnalyticsRepository {
    pool: SqlitePool,
}

impl AnalyticsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AnalyticsRepository { pool }
    }

    pub async fn for_store(&self, store_id: &str) -> DbResult<StoreAnalytics> {
        sqlx::query_as::<_, StoreAnalytics>(
            r#"
            SELECT store_id, sales_count, paid_sales_count, pending_sales_count,
                   paid_revenue_cents, active_products
            FROM store_analytics
            WHERE store_id = ?1
            "#,
        )
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Store", store_id))
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use raiz_core::{PaymentMethod, ProductInput, SaleLine, SaleTransactionRequest};

    #[tokio::test]
    async fn test_counts_and_revenue() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = db.users().register("ana@example.com", "segredo123").await.unwrap();
        let store = db.stores().create(&user.id, "Minha Loja", None).await.unwrap();

        let empty = db.analytics().for_store(&store.id).await.unwrap();
        assert_eq!(empty.sales_count, 0);
        assert_eq!(empty.paid_revenue_cents, 0);

        let product = db
            .products()
            .create(
                &store.id,
                &ProductInput {
                    name: "Corte de Cabelo".to_string(),
                    description: None,
                    price_cents: 4000,
                    stock: 10,
                },
            )
            .await
            .unwrap();

        for method in [PaymentMethod::Cash, PaymentMethod::Pix] {
            db.sales()
                .create_sale_transaction(&SaleTransactionRequest {
                    store_id: store.id.clone(),
                    total_cents: 4000,
                    items: vec![SaleLine {
                        product_id: product.id.clone(),
                        quantity: 1,
                        unit_price_cents: 4000,
                        line_total_cents: 4000,
                        product_name: product.name.clone(),
                    }],
                    payment_method: method,
                    idempotency_key: None,
                })
                .await
                .unwrap();
        }

        let stats = db.analytics().for_store(&store.id).await.unwrap();
        assert_eq!(stats.sales_count, 2);
        assert_eq!(stats.paid_sales_count, 1);
        assert_eq!(stats.pending_sales_count, 1);
        assert_eq!(stats.paid_revenue_cents, 4000);
        assert_eq!(stats.active_products, 1);
    }

    #[tokio::test]
    async fn test_unknown_store() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.analytics().for_store("missing").await.is_err());
    }
}
