//! # Sales History Commands
//!
//! Read-only access to the store's past sales.

use tracing::debug;

use crate::commands::store::resolve_store_id;
use crate::error::ApiResult;
use crate::state::AppContext;
use raiz_core::{Sale, SaleDetails};

const DEFAULT_LIMIT: u32 = 50;
const MAX_LIMIT: u32 = 200;

/// Most recent sales first.
///
/// `limit` defaults to 50 and is capped at 200.
pub async fn list_sales(ctx: &AppContext, limit: Option<u32>) -> ApiResult<Vec<Sale>> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    debug!(limit, "list_sales command");

    let store_id = resolve_store_id(ctx).await?;
    Ok(ctx.db.inner().sales().list_for_store(&store_id, limit).await?)
}

/// A sale with its frozen line items and its payment.
///
/// ## Errors
/// * `NOT_FOUND` - Unknown sale, or a sale of another store
pub async fn get_sale_details(ctx: &AppContext, sale_id: &str) -> ApiResult<SaleDetails> {
    debug!(sale_id = %sale_id, "get_sale_details command");

    let store_id = resolve_store_id(ctx).await?;
    Ok(ctx.db.inner().sales().get_details(&store_id, sale_id).await?)
}
