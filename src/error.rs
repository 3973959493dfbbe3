use thiserror::Error;

/// Startup configuration failures. The binary refuses to start on any of these.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Failures while retrieving a fragment or API payload over HTTP.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid locator {0:?}")]
    InvalidLocator(String),
    #[error("fetch failed for {url}: status {status}")]
    Status { url: String, status: u16 },
    #[error("fetch failed for {url}: {message}")]
    Transport { url: String, message: String },
}

/// Failures inside the load step of a navigation. Always converted into the
/// generic error page, never surfaced to the caller of `navigate`.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("no extractable content in fragment for {0}")]
    EmptyFragment(String),
}

/// Failures raised by a page behavior after its content was rendered.
#[derive(Error, Debug)]
pub enum BehaviorError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("invalid payload from {endpoint}: {message}")]
    InvalidPayload { endpoint: String, message: String },
    #[error("missing route parameter {0:?}")]
    MissingParam(String),
}
