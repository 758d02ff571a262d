use anyhow::Result;
use serde::Deserialize;
use std::{env, net::SocketAddr, path::Path, path::PathBuf, sync::Arc};
use tokio::fs;
use url::Url;

/// Parse the configuration from a given file, applying any environment overrides
pub async fn parse<P: AsRef<Path>>(path: P) -> Result<SharedConfig> {
    let raw = fs::read(path).await?;
    let mut data: Config = toml::from_slice(&raw)?;
    data.giphy.apply_overrides(|name| env::var(name).ok());
    Ok(Arc::new(data))
}

pub type SharedConfig = Arc<Config>;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub server: Server,
    pub content: Content,
    pub webhook: Webhook,
    #[serde(default)]
    pub giphy: Giphy,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub address: SocketAddr,
    pub log: String,
    #[serde(default)]
    pub sentry: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Content {
    pub path: PathBuf,
    #[serde(default)]
    pub seed: Option<PathBuf>,
}

/// Settings for the cloud deployment webhook
#[derive(Clone, Debug, Deserialize)]
pub struct Webhook {
    #[serde(default)]
    pub secret: String,
    /// Kept as text so a malformed key is reported per request rather than at startup
    #[serde(default)]
    pub content_key: String,
    #[serde(default = "Webhook::default_property_alias")]
    pub property_alias: String,
    #[serde(default)]
    pub atomic_publish: bool,
}

impl Webhook {
    fn default_property_alias() -> String {
        "deploymentData".into()
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Giphy {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub default_tag: Option<String>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default = "Giphy::default_base_url")]
    pub base_url: Url,
}

impl Giphy {
    fn default_base_url() -> Url {
        Url::parse("https://api.giphy.com/v1/").expect("default GIPHY URL must be valid")
    }

    /// Replace settings with the values of `GIPHY_API_KEY`, `GIPHY_DEFAULT_TAG` and
    /// `GIPHY_RATING` when they are present
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("GIPHY_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(tag) = lookup("GIPHY_DEFAULT_TAG") {
            self.default_tag = Some(tag);
        }
        if let Some(rating) = lookup("GIPHY_RATING") {
            self.rating = Some(rating);
        }
    }
}

impl Default for Giphy {
    fn default() -> Giphy {
        Giphy {
            api_key: None,
            default_tag: None,
            rating: None,
            base_url: Giphy::default_base_url(),
        }
    }
}
