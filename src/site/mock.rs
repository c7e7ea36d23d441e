//! In-memory [`HttpFetch`] double for tests

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::client::{HttpBody, HttpFetch};
use crate::error::{Error, Result};

/// Canned response for a streamed resource
#[derive(Clone)]
pub enum MockFile {
    Body(Vec<u8>),
    Status(u16),
    ConnectionRefused,
    /// Yields the bytes, then fails mid-stream
    Truncated(Vec<u8>),
    /// Yields the bytes, then never sends another chunk
    Stalled(Vec<u8>),
}

type PageHook = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Default, Clone)]
pub struct MockHttp {
    pages: HashMap<String, String>,
    files: HashMap<String, MockFile>,
    on_page: Option<PageHook>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl MockHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn file(mut self, url: &str, file: MockFile) -> Self {
        self.files.insert(url.to_string(), file);
        self
    }

    /// Run `hook` whenever a page is fetched
    pub fn on_page(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_page = Some(Arc::new(hook));
        self
    }

    /// URLs opened through `get_stream`, in request order
    pub fn requested_streams(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpFetch for MockHttp {
    async fn get_text(&self, url: &str) -> Result<String> {
        if let Some(hook) = &self.on_page {
            hook(url);
        }
        tokio::task::yield_now().await;

        self.pages.get(url).cloned().ok_or_else(|| Error::Status {
            url: url.to_string(),
            status: 404,
        })
    }

    async fn get_stream(&self, url: &str, _timeout: Option<Duration>) -> Result<HttpBody> {
        self.requested.lock().unwrap().push(url.to_string());
        tokio::task::yield_now().await;

        let file = self.files.get(url).cloned().unwrap_or(MockFile::Status(404));
        let body = match file {
            MockFile::Body(data) => HttpBody {
                status: 200,
                content_length: Some(data.len() as u64),
                stream: stream::iter(
                    data.chunks(4)
                        .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
                        .collect::<Vec<_>>(),
                )
                .boxed(),
            },
            MockFile::Status(status) => HttpBody {
                status,
                content_length: None,
                stream: stream::empty().boxed(),
            },
            MockFile::ConnectionRefused => {
                return Err(Error::Io(io::Error::new(
                    io::ErrorKind::ConnectionRefused,
                    format!("connection to {url} refused"),
                )));
            }
            MockFile::Truncated(data) => HttpBody {
                status: 200,
                content_length: Some(data.len() as u64 * 2),
                stream: stream::iter(vec![
                    Ok(Bytes::from(data)),
                    Err(Error::Io(io::Error::new(
                        io::ErrorKind::ConnectionReset,
                        "connection reset",
                    ))),
                ])
                .boxed(),
            },
            MockFile::Stalled(data) => HttpBody {
                status: 200,
                content_length: Some(data.len() as u64 * 2),
                stream: stream::once(async move { Ok(Bytes::from(data)) })
                    .chain(stream::pending())
                    .boxed(),
            },
        };
        Ok(body)
    }
}
