//! The HTTP layer the client sends its requests through.
//!
//! [`Client`](crate::Client) never talks to the network directly. It hands a
//! prepared [`reqwest::Request`] to a [`Transport`] and gets a fully buffered
//! [`HttpResponse`] back. Authentication, timeouts and connection management
//! are the transport's business: `reqwest::Client` is the default transport,
//! and [`CachedTransport`] decorates any other transport with a response
//! cache.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use reqwest::{Method, Request, StatusCode, header::HeaderMap};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::Result;

/// A response whose body has been read into memory.
///
/// The body can be read any number of times, so it stays available to the
/// caller after the client has decoded it.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    method: Method,
    url: Url,
    status: StatusCode,
    headers: HeaderMap,
    body: Arc<[u8]>,
}

impl HttpResponse {
    #[must_use]
    pub fn new(method: Method, url: Url, status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self {
            method,
            url,
            status,
            headers,
            body: body.into(),
        }
    }

    /// Buffers a `reqwest` response.
    pub async fn read(method: Method, response: reqwest::Response) -> Result<Self> {
        let url = response.url().clone();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        Ok(Self::new(method, url, status, headers, body.to_vec()))
    }

    /// The method of the request that produced this response.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The final URL of the response.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The body as UTF-8 text, if it is valid UTF-8.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// Decodes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Executes HTTP requests on behalf of the client.
///
/// Transport errors (connection refused, DNS, TLS, timeouts) are returned as
/// [`Error::Request`](crate::Error::Request) and never retried.
pub trait Transport: Send + Sync {
    fn execute(&self, request: Request) -> impl Future<Output = Result<HttpResponse>> + Send;
}

impl Transport for reqwest::Client {
    async fn execute(&self, request: Request) -> Result<HttpResponse> {
        let method = request.method().clone();
        let response = reqwest::Client::execute(self, request).await?;
        HttpResponse::read(method, response).await
    }
}

/// A transport decorator that remembers responses by method and URL.
///
/// Repeated requests are answered from memory without touching the inner
/// transport. Redirect (3xx) responses and transport errors are never
/// stored. Each instance owns its own cache.
#[derive(Debug)]
pub struct CachedTransport<T> {
    inner: T,
    cache: Mutex<HashMap<String, HttpResponse>>,
}

impl<T: Transport> CachedTransport<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of responses currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.lock().map_or(0, |cache| cache.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cache_key(request: &Request) -> String {
        format!("{} {}", request.method(), request.url())
    }

    fn lookup(&self, key: &str) -> Option<HttpResponse> {
        self.cache.lock().ok()?.get(key).cloned()
    }

    fn store(&self, key: String, response: &HttpResponse) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, response.clone());
        }
    }
}

impl<T: Transport> Transport for CachedTransport<T> {
    async fn execute(&self, request: Request) -> Result<HttpResponse> {
        let key = Self::cache_key(&request);

        if let Some(response) = self.lookup(&key) {
            debug!(%key, "found response in cache");
            return Ok(response);
        }

        debug!(%key, "not in cache; making round trip");
        let response = self.inner.execute(request).await?;

        if !response.status().is_redirection() {
            trace!(%key, "storing response in cache");
            self.store(key, &response);
        }

        Ok(response)
    }
}
