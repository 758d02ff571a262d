//! The subset of the GIPHY object schema used to build a [`Gif`].
//!
//! GIPHY encodes rendition dimensions as strings; anything that does not parse
//! as a number is read as `0`.

use super::Gif;
use serde::Deserialize;
use serde_json::Value;
use serde_with::{serde_as, DefaultOnError, DisplayFromStr};
use tracing::debug;

const DEFAULT_TITLE: &str = "Random GIF";

/// Response from the search endpoint. Entries are kept raw so one malformed
/// object does not spoil the whole page.
#[derive(Debug, Deserialize)]
pub struct Search {
    #[serde(default)]
    pub data: Vec<Value>,
}

/// Response from the random endpoint
#[derive(Debug, Deserialize)]
pub struct Random {
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Deserialize)]
struct GifObject {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    images: Option<Images>,
}

#[derive(Debug, Deserialize)]
struct Images {
    #[serde(default)]
    original: Option<Rendition>,
    #[serde(default)]
    downsized_medium: Option<Rendition>,
}

#[serde_as]
#[derive(Debug, Deserialize)]
struct Rendition {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    webp: Option<String>,
    #[serde_as(as = "DefaultOnError<DisplayFromStr>")]
    #[serde(default)]
    width: u32,
    #[serde_as(as = "DefaultOnError<DisplayFromStr>")]
    #[serde(default)]
    height: u32,
}

impl Rendition {
    /// Pair a URL from this rendition with its dimensions
    fn sized(&self, url: &Option<String>) -> Option<(String, u32, u32)> {
        let url = url.as_deref().filter(|u| !u.trim().is_empty())?;
        Some((url.to_owned(), self.width, self.height))
    }
}

/// Map a raw GIPHY object to a [`Gif`].
///
/// Prefers the original WebP, then the medium downsized GIF, then the original
/// GIF. Returns `None` when none of them has a URL.
pub fn map(data: Value) -> Option<Gif> {
    if !data.is_object() {
        return None;
    }

    let object: GifObject = match serde_json::from_value(data) {
        Ok(o) => o,
        Err(e) => {
            debug!(error = %e, "unrecognized GIF object");
            return None;
        }
    };

    let images = object.images?;
    let original = images.original.as_ref();
    let medium = images.downsized_medium.as_ref();

    // A blank URL at any tier falls through to the next one
    let (url, width, height) = original
        .and_then(|o| o.sized(&o.webp))
        .or_else(|| medium.and_then(|m| m.sized(&m.url)))
        .or_else(|| original.and_then(|o| o.sized(&o.url)))?;

    let title = object.title.unwrap_or_else(|| DEFAULT_TITLE.to_owned());

    Some(Gif {
        title,
        url,
        width,
        height,
    })
}
