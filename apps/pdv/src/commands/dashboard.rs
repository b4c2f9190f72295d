//! # Dashboard Command
//!
//! Summary cards of the landing screen, read from `store_analytics`.

use serde::Serialize;
use tracing::debug;

use crate::commands::store::get_profile;
use crate::error::ApiResult;
use crate::state::AppContext;
use raiz_core::Money;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub store_name: String,
    pub sales_count: i64,
    pub paid_sales_count: i64,
    pub pending_sales_count: i64,
    pub paid_revenue_cents: i64,
    /// `R$ 1.234,56`
    pub paid_revenue: String,
    pub active_products: i64,
}

pub async fn dashboard_summary(ctx: &AppContext) -> ApiResult<DashboardSummary> {
    debug!("dashboard_summary command");

    let store = get_profile(ctx).await?;
    let stats = ctx.db.inner().analytics().for_store(&store.id).await?;

    Ok(DashboardSummary {
        store_name: store.name,
        sales_count: stats.sales_count,
        paid_sales_count: stats.paid_sales_count,
        pending_sales_count: stats.pending_sales_count,
        paid_revenue_cents: stats.paid_revenue_cents,
        paid_revenue: Money::from_cents(stats.paid_revenue_cents).to_string(),
        active_products: stats.active_products,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cart::add_to_cart;
    use crate::commands::navigation::navigate;
    use crate::commands::sale::create_sale;
    use crate::commands::test_support::{product, signed_in};
    use crate::error::ErrorCode;
    use raiz_core::{PaymentChoice, View};

    #[tokio::test]
    async fn test_fresh_store() {
        let (ctx, response) = signed_in().await;

        let summary = dashboard_summary(&ctx).await.unwrap();
        assert_eq!(summary.store_name, response.store.name);
        assert_eq!(summary.sales_count, 0);
        assert_eq!(summary.paid_revenue, "R$ 0,00");
    }

    #[tokio::test]
    async fn test_counts_paid_and_pending() {
        let (ctx, _) = signed_in().await;
        let corte = product(&ctx, "Corte de Cabelo", 4000, 10).await;
        product(&ctx, "Barba", 3000, 0).await;

        for choice in [PaymentChoice::Cash, PaymentChoice::Pix] {
            navigate(&ctx, View::NewSale).unwrap();
            add_to_cart(&ctx, &corte.id).await.unwrap();
            navigate(&ctx, View::PaymentMethod).unwrap();
            create_sale(&ctx, choice).await.unwrap();
        }

        let summary = dashboard_summary(&ctx).await.unwrap();
        assert_eq!(summary.sales_count, 2);
        assert_eq!(summary.paid_sales_count, 1);
        assert_eq!(summary.pending_sales_count, 1);
        assert_eq!(summary.paid_revenue_cents, 4000);
        assert_eq!(summary.paid_revenue, "R$ 40,00");
        assert_eq!(summary.active_products, 2);
    }

    #[tokio::test]
    async fn test_requires_session() {
        let (ctx, _) = signed_in().await;
        crate::commands::auth::sign_out(&ctx);

        let err = dashboard_summary(&ctx).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthError);
    }
}
