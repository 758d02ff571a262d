use crate::config::Giphy as GiphyConfig;
use itertools::Itertools;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use url::Url;
use uuid::Uuid;

mod error;
mod models;
mod transport;

pub use error::Error;
pub(crate) use error::Result;
pub use transport::{Http, Response, Transport};

const DEFAULT_TAG: &str = "coding";
const DEFAULT_RATING: &str = "g";
const SEARCH_LIMIT: &str = "50";

/// Broader tags tried, in order, after the requested one
const FALLBACK_TAGS: [&str; 5] = ["developer", "programming", "open source", "tech", "coding"];

/// A GIF ready to be displayed
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Gif {
    pub title: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// Finds random GIFs through the GIPHY API
pub struct Giphy {
    transport: Arc<dyn Transport>,
    base: Url,
    api_key: Option<String>,
    default_tag: Option<String>,
    rating: Option<String>,
}

impl Giphy {
    pub fn new(config: &GiphyConfig, transport: Arc<dyn Transport>) -> Giphy {
        Giphy {
            transport,
            base: config.base_url.clone(),
            api_key: config.api_key.clone(),
            default_tag: config.default_tag.clone(),
            rating: config.rating.clone(),
        }
    }

    /// Create a client that talks to GIPHY over HTTP
    pub fn connect(config: &GiphyConfig) -> Result<Giphy> {
        let transport = Http::new()?;
        Ok(Giphy::new(config, Arc::new(transport)))
    }

    /// Find a random GIF for a tag.
    ///
    /// A search is tried first and one of its results is picked at random. If
    /// that yields nothing usable, the random endpoint is queried for the tag and
    /// then for each of the broader fallback tags until one produces a GIF.
    /// Returns `None` when no API key is configured or nothing was found.
    #[instrument(skip(self))]
    pub async fn random(&self, tag: Option<&str>, rating: Option<&str>) -> Option<Gif> {
        let api_key = match non_blank(self.api_key.as_deref()) {
            Some(key) => key,
            None => {
                debug!("no API key configured, GIPHY is disabled");
                return None;
            }
        };

        let tag = non_blank(tag)
            .or_else(|| non_blank(self.default_tag.as_deref()))
            .unwrap_or(DEFAULT_TAG);
        let rating = non_blank(rating)
            .or_else(|| non_blank(self.rating.as_deref()))
            .unwrap_or(DEFAULT_RATING);

        // Shared by every request so GIPHY can vary its answers between calls
        let random_id = Uuid::new_v4().simple().to_string();

        match self.search(api_key, tag, rating, &random_id).await {
            Ok(Some(gif)) => return Some(gif),
            Ok(None) => debug!(%tag, "search found nothing usable"),
            Err(e) => warn!(error = %e, %tag, "search request failed"),
        }

        for candidate in fallback_tags(tag) {
            match self.random_for(api_key, candidate, rating, &random_id).await {
                Ok(Some(gif)) => return Some(gif),
                Ok(None) => debug!(tag = %candidate, "no usable random GIF"),
                Err(e) => warn!(error = %e, tag = %candidate, "random request failed"),
            }
        }

        info!(%tag, "no GIF found for any tag");
        None
    }

    /// Pick a random entry from a page of search results
    async fn search(
        &self,
        api_key: &str,
        tag: &str,
        rating: &str,
        random_id: &str,
    ) -> Result<Option<Gif>> {
        let params = [
            ("api_key", api_key),
            ("q", tag),
            ("limit", SEARCH_LIMIT),
            ("rating", rating),
            ("random_id", random_id),
        ];
        let mut search = match self.fetch::<models::Search>("gifs/search", &params).await? {
            Some(s) => s,
            None => return Ok(None),
        };

        if search.data.is_empty() {
            return Ok(None);
        }

        let index = pick_index(search.data.len());
        Ok(models::map(search.data.swap_remove(index)))
    }

    /// Ask for a single random GIF with a tag
    async fn random_for(
        &self,
        api_key: &str,
        tag: &str,
        rating: &str,
        random_id: &str,
    ) -> Result<Option<Gif>> {
        let params = [
            ("api_key", api_key),
            ("tag", tag),
            ("rating", rating),
            ("random_id", random_id),
        ];
        let random = self.fetch::<models::Random>("gifs/random", &params).await?;

        Ok(random.and_then(|r| models::map(r.data)))
    }

    /// Request an endpoint, returning `None` when GIPHY answers with an error status
    async fn fetch<T>(&self, path: &str, params: &[(&str, &str)]) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let mut url = self.base.join(path)?;
        url.query_pairs_mut().extend_pairs(params);

        let response = self.transport.get(url).await?;
        if !response.status.is_success() {
            debug!(status = %response.status, %path, "unsuccessful response");
            return Ok(None);
        }

        Ok(Some(serde_json::from_slice(&response.body)?))
    }
}

/// The tags to try with the random endpoint, without case-insensitive duplicates
fn fallback_tags(tag: &str) -> Vec<&str> {
    let mut tags = vec![tag];
    tags.extend(FALLBACK_TAGS.iter().copied());

    tags.into_iter().unique_by(|t| t.to_lowercase()).collect()
}

/// Choose an index in `0..len` using an OS-seeded CSPRNG
fn pick_index(len: usize) -> usize {
    ChaCha20Rng::from_entropy().gen_range(0..len)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
