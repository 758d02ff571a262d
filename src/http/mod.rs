use crate::{config::SharedConfig, content::ContentStore, giphy::Giphy};
use axum::{http::StatusCode, routing::get, Extension, Router};
use std::sync::Arc;

mod error;
mod logging;
mod webhooks;
mod widgets;

pub(crate) use error::Result;

/// Everything the handlers need to serve a request
#[derive(Clone)]
pub struct State {
    pub config: SharedConfig,
    pub content: Arc<dyn ContentStore>,
    pub giphy: Arc<Giphy>,
}

/// Build all the routes for the service
pub fn routes(state: State) -> Router {
    Router::new()
        .merge(webhooks::routes())
        .merge(widgets::routes())
        .route("/health", get(health))
        .layer(Extension(state))
        .layer(logging::layer())
}

async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}
