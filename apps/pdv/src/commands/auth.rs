//! # Auth Commands
//!
//! Session presence gates every view but `login`.
//!
//! ```text
//! sign_up ──► register ──┐
//!                        ▼
//! sign_in ──► verify ──► issue token ──► ensure store ──► dashboard
//!
//! restore_session(token) ── valid ──► dashboard
//!                        └─ invalid ─► login
//!
//! sign_out ──► stop watcher, clear cart, clear session ──► login
//! ```

use serde::Serialize;
use tracing::{debug, info};

use crate::commands::store::ensure_store;
use crate::error::ApiResult;
use crate::state::{AppContext, Session};
use raiz_core::validation::{validate_email, validate_password};
use raiz_core::{Store, User, View};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub user_id: String,
    pub email: String,
    pub token: String,
    pub store: Store,
    pub view: View,
}

/// Creates an account, then signs in with it.
pub async fn sign_up(ctx: &AppContext, email: &str, password: &str) -> ApiResult<SignInResponse> {
    debug!(email = %email, "sign_up command");

    let email = validate_email(email)?;
    validate_password(password)?;

    let user = ctx.db.inner().users().register(&email, password).await?;
    info!(user_id = %user.id, "User registered");

    establish(ctx, user).await
}

pub async fn sign_in(ctx: &AppContext, email: &str, password: &str) -> ApiResult<SignInResponse> {
    debug!(email = %email, "sign_in command");

    let email = validate_email(email)?;
    let user = ctx
        .db
        .inner()
        .users()
        .verify_credentials(&email, password)
        .await?;

    establish(ctx, user).await
}

/// Re-establishes a session from a stored token.
///
/// ## Returns
/// * `Ok(Some(_))` - Session restored, view is `dashboard`
/// * `Ok(None)` - Token invalid, expired or for a deleted user; view stays `login`
pub async fn restore_session(ctx: &AppContext, token: &str) -> ApiResult<Option<SignInResponse>> {
    debug!("restore_session command");

    let claims = match ctx.sessions.validate(token) {
        Ok(claims) => claims,
        Err(e) => {
            debug!(reason = %e.message, "Stored session rejected");
            return Ok(None);
        }
    };

    let Some(user) = ctx.db.inner().users().get_by_id(&claims.sub).await? else {
        debug!(user_id = %claims.sub, "Session user no longer exists");
        return Ok(None);
    };

    establish(ctx, user).await.map(Some)
}

/// Ends the session. Safe to call when signed out.
pub fn sign_out(ctx: &AppContext) -> View {
    debug!("sign_out command");

    ctx.workflow.reset();
    ctx.cart.clear();
    ctx.auth.clear();
    ctx.dialogs.dismiss_all();

    info!("Signed out");
    View::Login
}

async fn establish(ctx: &AppContext, user: User) -> ApiResult<SignInResponse> {
    let token = ctx.sessions.issue(&user)?;

    // A previous user's cart and sale must not leak into this session
    ctx.workflow.reset();
    ctx.cart.clear();

    ctx.auth.set(Session {
        user_id: user.id.clone(),
        email: user.email.clone(),
        token: token.clone(),
        store_id: None,
    });

    let store = match ensure_store(ctx).await {
        Ok(store) => store,
        Err(e) => {
            ctx.auth.clear();
            return Err(e);
        }
    };

    ctx.workflow.set_view(View::Dashboard);
    info!(user_id = %user.id, store_id = %store.id, "Signed in");

    Ok(SignInResponse {
        user_id: user.id,
        email: user.email,
        token,
        store,
        view: View::Dashboard,
    })
}
