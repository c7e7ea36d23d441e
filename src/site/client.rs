//! HTTP access to the catalog site and its file hosts

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};

/// A response whose body is consumed as a stream of chunks
pub struct HttpBody {
    pub status: u16,
    /// Value of the Content-Length header, when present
    pub content_length: Option<u64>,
    pub stream: BoxStream<'static, Result<Bytes>>,
}

/// Minimal HTTP surface the fetcher, art resolver and downloader rely on
#[async_trait]
pub trait HttpFetch: Send + Sync {
    /// GET a page and return its body as text; non-200 statuses are errors
    async fn get_text(&self, url: &str) -> Result<String>;

    /// GET a resource and hand back the status and a chunk stream.
    /// `timeout` bounds the whole request when set.
    async fn get_stream(&self, url: &str, timeout: Option<Duration>) -> Result<HttpBody>;
}

/// reqwest-backed client for the catalog site
#[derive(Clone)]
pub struct SiteClient {
    http_client: Client,
}

impl SiteClient {
    /// Create a new client sending the given user-agent on every request
    pub fn new(user_agent: &str) -> Result<Self> {
        let http_client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|source| Error::Request {
                url: String::new(),
                source,
            })?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl HttpFetch for SiteClient {
    async fn get_text(&self, url: &str) -> Result<String> {
        debug!("Fetching page: {}", url);

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|source| Error::Request {
                url: url.to_string(),
                source,
            })?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(Error::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        response.text().await.map_err(|source| Error::Request {
            url: url.to_string(),
            source,
        })
    }

    async fn get_stream(&self, url: &str, timeout: Option<Duration>) -> Result<HttpBody> {
        debug!("Opening stream: {}", url);

        let mut request = self.http_client.get(url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|source| Error::Request {
            url: url.to_string(),
            source,
        })?;

        let status = response.status().as_u16();
        let content_length = response.content_length();
        let owned_url = url.to_string();
        let stream = response
            .bytes_stream()
            .map(move |chunk| {
                chunk.map_err(|source| Error::Request {
                    url: owned_url.clone(),
                    source,
                })
            })
            .boxed();

        Ok(HttpBody {
            status,
            content_length,
            stream,
        })
    }
}
