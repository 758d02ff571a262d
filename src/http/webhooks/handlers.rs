use crate::{
    deployment,
    http::{Result, State},
};
use axum::{extract::Query, Extension, Json};
use serde::Deserialize;
use serde_json::{json, value::RawValue, Value};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct Params {
    /// The shared secret
    t: Option<String>,
}

/// Handle deployment notifications from the cloud hosting platform
pub async fn cloud_deploy(
    Extension(state): Extension<State>,
    Query(params): Query<Params>,
    Json(payload): Json<Box<RawValue>>,
) -> Result<Json<Value>> {
    sentry::configure_scope(|scope| {
        scope.set_tag("hook.type", "cloud-deploy");
    });

    let receipt = deployment::receive(
        state.content.as_ref(),
        &state.config.webhook,
        &payload,
        params.t.as_deref(),
    )
    .await?;

    sentry::configure_scope(|scope| {
        scope.set_tag("hook.content", receipt.key);
    });
    info!(key = %receipt.key, cultures = receipt.cultures.len(), "handled cloud deployment hook");

    Ok(Json(json!({ "ok": true })))
}
