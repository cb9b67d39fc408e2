//! Settings panel: endpoint edit field, model picker and the endpoint test.

pub mod checker;
pub mod types;

pub use checker::{
    check_compatibility, dismiss_test, reset_to_active, similar_models, verify_and_maybe_commit,
};
pub use types::{Confirmation, Incompatibility, IncompatibilityReport, TestOutcome};

use crate::core::errors::ApiError;
use crate::models::{self, ModelListing};
use crate::session::SessionContext;
use crate::stack::StackConnector;

/// Stores the edit field. A URL other than the active endpoint invalidates
/// the picker and refetches models from the candidate; nothing is committed.
pub async fn edit_endpoint(
    ctx: &mut SessionContext,
    connector: &dyn StackConnector,
    url: &str,
) -> Option<ModelListing> {
    let url = url.trim();
    ctx.edit_url = url.to_string();
    if url == ctx.endpoint() {
        return None;
    }

    ctx.picked_model.clear();
    ctx.available_models.clear();
    ctx.model_fetch_error = None;
    if url.is_empty() {
        return None;
    }
    Some(refresh_models(ctx, connector).await)
}

/// Fetches models for the picker from the edit field, or the active endpoint
/// when the field is blank. Keeps a valid pick, otherwise picks the first.
pub async fn refresh_models(
    ctx: &mut SessionContext,
    connector: &dyn StackConnector,
) -> ModelListing {
    let target = if ctx.edit_url.trim().is_empty() {
        ctx.endpoint().to_string()
    } else {
        ctx.edit_url.trim().to_string()
    };

    let api = connector.connect(&target, ctx.api_key());
    let listing = models::fetch_listing(api.as_ref()).await;

    ctx.available_models = listing.chat_identifiers();
    ctx.model_fetch_error = listing.error.clone();
    if !ctx.available_models.contains(&ctx.picked_model) {
        ctx.picked_model = ctx.available_models.first().cloned().unwrap_or_default();
    }
    ctx.refresh_pending = false;
    listing
}

pub fn pick_model(ctx: &mut SessionContext, model: &str) -> Result<(), ApiError> {
    let model = model.trim();
    if model.is_empty() {
        return Err(ApiError::BadRequest("model must not be empty".to_string()));
    }
    if !ctx.available_models.is_empty() && !ctx.available_models.iter().any(|m| m == model) {
        return Err(ApiError::BadRequest(format!(
            "model {} is not offered by {}",
            model, ctx.edit_url
        )));
    }
    ctx.picked_model = model.to_string();
    Ok(())
}

pub fn set_debug_mode(ctx: &mut SessionContext, enabled: bool) {
    ctx.debug_mode = enabled;
    tracing::debug!(session = %ctx.id, "debug mode {}", if enabled { "on" } else { "off" });
}
