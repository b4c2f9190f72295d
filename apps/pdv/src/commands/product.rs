//! # Product Commands
//!
//! Catalog screen: list, create, edit and soft-delete products.
//!
//! ## Dialogs
//! ```text
//! create / update ── ok ──► show_success
//!                 └─ err ─► show_error
//!
//! delete ──► show_confirm ── false ──► nothing happens
//!                  │ true
//!                  ▼
//!            soft delete ── ok ──► show_success
//!                        └─ err ─► show_error
//! ```

use serde::Deserialize;
use tracing::{debug, info};

use crate::commands::store::resolve_store_id;
use crate::commands::surface;
use crate::error::ApiResult;
use crate::state::AppContext;
use raiz_core::validation::{
    normalize_optional_text, validate_price_cents, validate_product_name, validate_stock,
};
use raiz_core::{Money, Product, ProductInput};

const DESCRIPTION_MAX: usize = 1000;

/// Product form as typed on the catalog screen.
///
/// `price` is the text of the price field: `40.00`, `40,00` and
/// `R$ 1.234,56` are all accepted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductForm {
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub stock: i64,
}

impl ProductForm {
    pub fn to_input(&self) -> ApiResult<ProductInput> {
        validate_product_name(&self.name)?;
        let price = Money::parse(&self.price)?;
        validate_price_cents(price.cents())?;
        validate_stock(self.stock)?;

        Ok(ProductInput {
            name: self.name.trim().to_string(),
            description: normalize_optional_text(
                "description",
                self.description.as_deref(),
                DESCRIPTION_MAX,
            )?,
            price_cents: price.cents(),
            stock: self.stock,
        })
    }
}

/// Active products of the store, by name.
pub async fn list_products(ctx: &AppContext) -> ApiResult<Vec<Product>> {
    debug!("list_products command");

    let store_id = resolve_store_id(ctx).await?;
    Ok(ctx.db.inner().products().list_active(&store_id).await?)
}

/// Products the `new-sale` screen offers: active with stock.
pub async fn list_sellable_products(ctx: &AppContext) -> ApiResult<Vec<Product>> {
    debug!("list_sellable_products command");

    let store_id = resolve_store_id(ctx).await?;
    Ok(ctx.db.inner().products().list_sellable(&store_id).await?)
}

pub async fn create_product(ctx: &AppContext, form: &ProductForm) -> ApiResult<Product> {
    debug!(name = %form.name, "create_product command");

    match insert(ctx, form).await {
        Ok(product) => {
            info!(product_id = %product.id, name = %product.name, "Product created");
            ctx.dialogs.report_success("Produto cadastrado");
            Ok(product)
        }
        Err(e) => Err(surface(ctx, e)),
    }
}

pub async fn update_product(ctx: &AppContext, id: &str, form: &ProductForm) -> ApiResult<Product> {
    debug!(id = %id, "update_product command");

    match save(ctx, id, form).await {
        Ok(product) => {
            info!(product_id = %product.id, "Product updated");
            ctx.dialogs.report_success("Produto atualizado");
            Ok(product)
        }
        Err(e) => Err(surface(ctx, e)),
    }
}

/// Asks for confirmation, then soft-deletes.
///
/// Waits for the confirm dialog to be answered.
///
/// ## Returns
/// * `Ok(true)` - Product deleted
/// * `Ok(false)` - User cancelled
pub async fn delete_product(ctx: &AppContext, id: &str) -> ApiResult<bool> {
    debug!(id = %id, "delete_product command");

    let product = match find(ctx, id).await {
        Ok(product) => product,
        Err(e) => return Err(surface(ctx, e)),
    };

    let confirmed = ctx
        .dialogs
        .show_confirm(
            "Excluir produto",
            format!("Deseja excluir \"{}\"?", product.name),
        )
        .await;
    if !confirmed {
        debug!(id = %id, "Delete cancelled");
        return Ok(false);
    }

    match ctx
        .db
        .inner()
        .products()
        .soft_delete(&product.store_id, &product.id)
        .await
    {
        Ok(()) => {
            info!(product_id = %product.id, "Product deleted");
            ctx.dialogs.report_success("Produto excluído");
            Ok(true)
        }
        Err(e) => Err(surface(ctx, e)),
    }
}

async fn insert(ctx: &AppContext, form: &ProductForm) -> ApiResult<Product> {
    let input = form.to_input()?;
    let store_id = resolve_store_id(ctx).await?;
    Ok(ctx.db.inner().products().create(&store_id, &input).await?)
}

async fn save(ctx: &AppContext, id: &str, form: &ProductForm) -> ApiResult<Product> {
    let input = form.to_input()?;
    let store_id = resolve_store_id(ctx).await?;
    Ok(ctx.db.inner().products().update(&store_id, id, &input).await?)
}

async fn find(ctx: &AppContext, id: &str) -> ApiResult<Product> {
    let store_id = resolve_store_id(ctx).await?;
    Ok(ctx.db.inner().products().get_for_store(&store_id, id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::signed_in;
    use crate::dialog::DialogKind;
    use crate::error::ErrorCode;

    fn form(name: &str, price: &str, stock: i64) -> ProductForm {
        ProductForm {
            name: name.to_string(),
            description: None,
            price: price.to_string(),
            stock,
        }
    }

    #[tokio::test]
    async fn test_create_accepts_comma_price() {
        let (ctx, _) = signed_in().await;

        let product = create_product(&ctx, &form("Corte de Cabelo", "40,00", 5))
            .await
            .unwrap();
        assert_eq!(product.price_cents, 4000);

        let listed = list_products(&ctx).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(ctx.dialogs.current().unwrap().kind, DialogKind::Success);
    }

    #[tokio::test]
    async fn test_sellable_excludes_out_of_stock() {
        let (ctx, _) = signed_in().await;
        create_product(&ctx, &form("Barba", "30.00", 0)).await.unwrap();
        create_product(&ctx, &form("Corte", "40.00", 2)).await.unwrap();

        let sellable = list_sellable_products(&ctx).await.unwrap();
        assert_eq!(sellable.len(), 1);
        assert_eq!(sellable[0].name, "Corte");
        assert_eq!(list_products(&ctx).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_form_shows_error_dialog() {
        let (ctx, _) = signed_in().await;

        let err = create_product(&ctx, &form("", "10,00", 1)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = create_product(&ctx, &form("Barba", "abc", 1)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = create_product(&ctx, &form("Barba", "10,00", -1)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        assert_eq!(ctx.dialogs.pending_count(), 3);
        assert_eq!(ctx.dialogs.current().unwrap().kind, DialogKind::Error);
        assert!(list_products(&ctx).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_product() {
        let (ctx, _) = signed_in().await;
        let product = create_product(&ctx, &form("Barba", "30,00", 3)).await.unwrap();

        let updated = update_product(&ctx, &product.id, &form("Barba Completa", "35,50", 4))
            .await
            .unwrap();
        assert_eq!(updated.name, "Barba Completa");
        assert_eq!(updated.price_cents, 3550);
        assert_eq!(updated.stock, 4);
    }

    #[tokio::test]
    async fn test_delete_waits_for_confirmation() {
        let (ctx, _) = signed_in().await;
        let product = create_product(&ctx, &form("Barba", "30,00", 3)).await.unwrap();
        ctx.dialogs.dismiss_all();

        let task = {
            let ctx = ctx.clone();
            let id = product.id.clone();
            tokio::spawn(async move { delete_product(&ctx, &id).await })
        };

        let confirm = ctx.dialogs.next_request().await;
        assert_eq!(confirm.kind, DialogKind::Confirm);
        assert!(confirm.message.contains("Barba"));
        ctx.dialogs.respond(confirm.id, true);

        assert!(task.await.unwrap().unwrap());
        assert!(list_products(&ctx).await.unwrap().is_empty());
        assert_eq!(ctx.dialogs.current().unwrap().kind, DialogKind::Success);
    }

    #[tokio::test]
    async fn test_delete_cancelled_keeps_product() {
        let (ctx, _) = signed_in().await;
        let product = create_product(&ctx, &form("Barba", "30,00", 3)).await.unwrap();
        ctx.dialogs.dismiss_all();

        let task = {
            let ctx = ctx.clone();
            let id = product.id.clone();
            tokio::spawn(async move { delete_product(&ctx, &id).await })
        };

        let confirm = ctx.dialogs.next_request().await;
        ctx.dialogs.respond(confirm.id, false);

        assert!(!task.await.unwrap().unwrap());
        assert_eq!(list_products(&ctx).await.unwrap().len(), 1);
        assert!(ctx.dialogs.current().is_none());
    }

    #[tokio::test]
    async fn test_delete_unknown_product() {
        let (ctx, _) = signed_in().await;
        let err = delete_product(&ctx, "missing").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(ctx.dialogs.current().unwrap().kind, DialogKind::Error);
    }
}
