//! # Store Commands
//!
//! One store per user, created on first sign-in, plus the profile screen.

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::commands::surface;
use crate::error::ApiResult;
use crate::state::AppContext;
use raiz_core::validation::{normalize_optional_text, validate_store_name};
use raiz_core::{CoreError, Store, StoreProfile};

const ADDRESS_MAX: usize = 300;
const BUSINESS_HOURS_MAX: usize = 120;

/// Profile form as typed on the `profile` screen.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileForm {
    pub name: String,
    pub address: Option<String>,
    pub business_hours: Option<String>,
}

/// Returns the user's store, creating it from the configured defaults.
pub async fn ensure_store(ctx: &AppContext) -> ApiResult<Store> {
    let session = ctx.auth.require()?;

    let store = ctx
        .db
        .inner()
        .stores()
        .ensure_for_owner(
            &session.user_id,
            &ctx.config.store.default_name,
            ctx.config.store.default_business_hours.as_deref(),
        )
        .await?;

    ctx.auth.set_store_id(&store.id);
    Ok(store)
}

/// Store id for sale creation and catalog calls.
///
/// ## Resolution
/// ```text
/// cached on session? ── yes ──► id
///        │ no
///        ▼
/// re-fetch by owner (once) ── found ──► cache, id
///        │ none
///        ▼
/// STORE_NOT_FOUND
/// ```
pub async fn resolve_store_id(ctx: &AppContext) -> ApiResult<String> {
    let session = ctx.auth.require()?;
    if let Some(store_id) = session.store_id {
        return Ok(store_id);
    }

    debug!(user_id = %session.user_id, "Store id unknown, re-fetching");
    match ctx.db.inner().stores().get_by_owner(&session.user_id).await? {
        Some(store) => {
            ctx.auth.set_store_id(&store.id);
            Ok(store.id)
        }
        None => {
            warn!(user_id = %session.user_id, "No store for user");
            Err(CoreError::StoreNotFound.into())
        }
    }
}

pub async fn get_profile(ctx: &AppContext) -> ApiResult<Store> {
    debug!("get_profile command");

    let store_id = resolve_store_id(ctx).await?;
    ctx.db
        .inner()
        .stores()
        .get_by_id(&store_id)
        .await?
        .ok_or_else(|| CoreError::StoreNotFound.into())
}

/// Saves the profile form. Failures are shown as an error dialog.
pub async fn update_profile(ctx: &AppContext, form: &ProfileForm) -> ApiResult<Store> {
    debug!("update_profile command");

    match save_profile(ctx, form).await {
        Ok(store) => {
            info!(store_id = %store.id, "Store profile updated");
            ctx.dialogs.report_success("Perfil atualizado");
            Ok(store)
        }
        Err(e) => Err(surface(ctx, e)),
    }
}

async fn save_profile(ctx: &AppContext, form: &ProfileForm) -> ApiResult<Store> {
    let profile = profile_from_form(form)?;
    let store_id = resolve_store_id(ctx).await?;
    Ok(ctx
        .db
        .inner()
        .stores()
        .update_profile(&store_id, &profile)
        .await?)
}

fn profile_from_form(form: &ProfileForm) -> ApiResult<StoreProfile> {
    validate_store_name(&form.name)?;

    Ok(StoreProfile {
        name: form.name.trim().to_string(),
        address: normalize_optional_text("address", form.address.as_deref(), ADDRESS_MAX)?,
        business_hours: normalize_optional_text(
            "business hours",
            form.business_hours.as_deref(),
            BUSINESS_HOURS_MAX,
        )?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::signed_in;
    use crate::dialog::DialogKind;
    use crate::error::ErrorCode;

    #[tokio::test]
    async fn test_update_profile() {
        let (ctx, _) = signed_in().await;

        let store = update_profile(
            &ctx,
            &ProfileForm {
                name: "  Barbearia Raiz ".into(),
                address: Some("Rua das Flores, 10".into()),
                business_hours: Some("   ".into()),
            },
        )
        .await
        .unwrap();

        assert_eq!(store.name, "Barbearia Raiz");
        assert_eq!(store.address.as_deref(), Some("Rua das Flores, 10"));
        assert_eq!(store.business_hours, None);
        assert_eq!(get_profile(&ctx).await.unwrap().name, "Barbearia Raiz");
        assert_eq!(ctx.dialogs.current().unwrap().kind, DialogKind::Success);
    }

    #[tokio::test]
    async fn test_invalid_profile_shows_error() {
        let (ctx, _) = signed_in().await;

        let err = update_profile(&ctx, &ProfileForm::default()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let dialog = ctx.dialogs.current().unwrap();
        assert_eq!(dialog.kind, DialogKind::Error);
        assert_eq!(dialog.message, err.message);
    }

    #[tokio::test]
    async fn test_resolve_refetches_once() {
        let (ctx, response) = signed_in().await;

        let mut session = ctx.auth.current().unwrap();
        session.store_id = None;
        ctx.auth.set(session);

        assert_eq!(resolve_store_id(&ctx).await.unwrap(), response.store.id);
        assert_eq!(ctx.auth.store_id(), Some(response.store.id));
    }

    #[tokio::test]
    async fn test_resolve_without_store() {
        let (ctx, _) = signed_in().await;
        let mut session = ctx.auth.current().unwrap();
        session.user_id = "user-without-store".into();
        session.store_id = None;
        ctx.auth.set(session);

        let err = resolve_store_id(&ctx).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::StoreNotFound);
    }
}
