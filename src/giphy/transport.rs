use super::Result;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// How long an idle pooled connection is kept around
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// A raw response from the provider
#[derive(Debug)]
pub struct Response {
    pub status: StatusCode,
    pub body: Bytes,
}

/// The way requests reach GIPHY
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a single GET request
    async fn get(&self, url: Url) -> Result<Response>;
}

/// Sends requests over HTTP with a pooled client
#[derive(Debug)]
pub struct Http {
    client: Client,
}

impl Http {
    pub fn new() -> Result<Http> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .build()?;

        Ok(Http { client })
    }
}

#[async_trait]
impl Transport for Http {
    async fn get(&self, url: Url) -> Result<Response> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        Ok(Response { status, body })
    }
}
