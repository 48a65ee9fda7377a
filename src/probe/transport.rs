//! HTTP transports
//!
//! A [`Transport`] performs one HTTP request. [`HeaderInjector`] decorates any
//! transport so that every request carries the host's configured headers.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Request, Response};

/// Something that can perform an HTTP request
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and wait for the response head
    async fn execute(&self, request: Request) -> Result<Response, reqwest::Error>;
}

#[async_trait]
impl Transport for Client {
    async fn execute(&self, request: Request) -> Result<Response, reqwest::Error> {
        Client::execute(self, request).await
    }
}

/// Sets a fixed set of headers on every request before delegating.
///
/// Headers already present on the request under the same name are replaced.
#[derive(Debug, Clone)]
pub struct HeaderInjector<T> {
    headers: HeaderMap,
    inner: T,
}

impl<T> HeaderInjector<T> {
    pub fn new(headers: HeaderMap, inner: T) -> Self {
        Self { headers, inner }
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: Transport> Transport for HeaderInjector<T> {
    async fn execute(&self, mut request: Request) -> Result<Response, reqwest::Error> {
        let target = request.headers_mut();
        for (name, value) in &self.headers {
            target.insert(name.clone(), value.clone());
        }

        self.inner.execute(request).await
    }
}
