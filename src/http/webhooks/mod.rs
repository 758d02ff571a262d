use axum::{routing::post, Router};
use tower_http::limit::RequestBodyLimitLayer;

mod handlers;

/// The largest deployment payload that will be accepted
const MAX_PAYLOAD: usize = 1024 * 1024;

/// Build the routes for the webhook receivers
pub fn routes() -> Router {
    // Streamed bodies are capped too, so chunked requests need no Content-Length
    Router::new()
        .route("/api/webhooks/cloud-deploy", post(handlers::cloud_deploy))
        .layer(RequestBodyLimitLayer::new(MAX_PAYLOAD))
}
