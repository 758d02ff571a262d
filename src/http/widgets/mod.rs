use axum::{routing::get, Router};

mod handlers;
mod render;

/// Build the routes for the site widgets
pub fn routes() -> Router {
    Router::new()
        .route("/widgets/giphy", get(handlers::giphy))
        .route("/api/giphy/random", get(handlers::random))
}
