use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Url;

use crate::error::FetchError;

// 1. FragmentFetcher Contract
/// FragmentFetcher
///
/// The HTTP GET collaborator. Used by the page router for HTML fragments and by
/// page behaviors for API payloads. Swapping the implementation (reqwest in the
/// server, `MockFragmentFetcher` in tests) does not affect the router.
#[async_trait]
pub trait FragmentFetcher: Send + Sync {
    /// Fetches `locator` and returns the body as UTF-8 text. Any non-2xx
    /// response is a failure.
    ///
    /// `locator` is either absolute (`https://...`) or a same-origin path
    /// (`/pages/home.html`), optionally carrying a query string.
    async fn fetch_text(&self, locator: &str) -> Result<String, FetchError>;
}

pub type FetcherState = Arc<dyn FragmentFetcher>;

// 2. The Real Implementation
/// HttpFragmentFetcher
///
/// reqwest-backed fetcher resolving relative locators against a base URL.
#[derive(Clone)]
pub struct HttpFragmentFetcher {
    client: reqwest::Client,
    base: Url,
}

impl HttpFragmentFetcher {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let base =
            Url::parse(base_url).map_err(|_| FetchError::InvalidLocator(base_url.to_string()))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport {
                url: base_url.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self { client, base })
    }

    fn resolve(&self, locator: &str) -> Result<Url, FetchError> {
        match Url::parse(locator) {
            Ok(url) => Ok(url),
            Err(_) => self
                .base
                .join(locator)
                .map_err(|_| FetchError::InvalidLocator(locator.to_string())),
        }
    }
}

#[async_trait]
impl FragmentFetcher for HttpFragmentFetcher {
    async fn fetch_text(&self, locator: &str) -> Result<String, FetchError> {
        let url = self.resolve(locator)?;
        let transport = |e: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(url.clone()).send().await.map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(transport)
    }
}

// 3. The In-Memory Implementation
/// MockFragmentFetcher
///
/// Serves canned bodies keyed by locator (query string ignored) and records
/// every locator requested, query string included. Public so integration
/// suites and embedders can run the router without a network.
#[derive(Default)]
pub struct MockFragmentFetcher {
    bodies: Mutex<HashMap<String, String>>,
    requests: Mutex<Vec<String>>,
}

impl MockFragmentFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(self, locator: &str, body: &str) -> Self {
        self.bodies.lock().insert(locator.to_string(), body.to_string());
        self
    }

    pub fn set_body(&self, locator: &str, body: &str) {
        self.bodies.lock().insert(locator.to_string(), body.to_string());
    }

    /// Every locator requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    /// Number of requests whose locator (query stripped) equals `locator`.
    pub fn request_count(&self, locator: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|requested| strip_query(requested) == locator)
            .count()
    }
}

#[async_trait]
impl FragmentFetcher for MockFragmentFetcher {
    async fn fetch_text(&self, locator: &str) -> Result<String, FetchError> {
        self.requests.lock().push(locator.to_string());

        let key = strip_query(locator);
        self.bodies
            .lock()
            .get(key)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: locator.to_string(),
                status: 404,
            })
    }
}

fn strip_query(locator: &str) -> &str {
    locator.split('?').next().unwrap_or(locator)
}
