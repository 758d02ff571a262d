use super::render;
use crate::http::State;
use axum::{
    extract::Query,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Params {
    tag: Option<String>,
    rating: Option<String>,
}

/// Render the GIPHY widget, which is empty when no GIF could be found
pub async fn giphy(
    Extension(state): Extension<State>,
    Query(params): Query<Params>,
) -> Html<String> {
    let gif = state
        .giphy
        .random(params.tag.as_deref(), params.rating.as_deref())
        .await;

    Html(render::gif(gif.as_ref()))
}

/// Look up a random GIF as JSON
pub async fn random(
    Extension(state): Extension<State>,
    Query(params): Query<Params>,
) -> Response {
    let gif = state
        .giphy
        .random(params.tag.as_deref(), params.rating.as_deref())
        .await;

    match gif {
        Some(gif) => Json(gif).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}
