use std::env;
use std::time::Duration;

use crate::error::ConfigError;

/// AppConfig
///
/// Holds the portal's configuration state. Immutable once loaded and shared by
/// the page router, the auth extractor and the HTTP server through `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Local doubles as the fragment "development mode".
    pub env: Env,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Base URL that relative fragment locators (e.g. `/pages/home.html`) resolve against.
    pub fragment_base_url: String,
    // Base URL of the REST API consumed by page behaviors.
    pub api_base_url: String,
    // Directory of static HTML fragments served under `/pages`.
    pub pages_dir: String,
    // Where unauthenticated visitors of protected routes are sent.
    pub login_location: String,
    // Upper bound on cached fragments.
    pub cache_capacity: usize,
    // Per-request timeout for fragment and API fetches.
    pub fetch_timeout: Duration,
    // Secret used to validate session JWTs.
    pub jwt_secret: String,
}

/// Env
///
/// Local enables the development conveniences: no fragment caching, cache-busting
/// query parameters and the `x-user-role` auth bypass.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Env {
    Local,
    Production,
}

const LOCAL_JWT_SECRET: &str = "super-secure-test-secret-value-local";

impl Default for AppConfig {
    /// Safe values for tests; never reads the environment.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: "127.0.0.1:3000".to_string(),
            fragment_base_url: "http://127.0.0.1:3000".to_string(),
            api_base_url: "http://127.0.0.1:8000".to_string(),
            pages_dir: "pages".to_string(),
            login_location: "/login".to_string(),
            cache_capacity: 64,
            fetch_timeout: Duration::from_secs(15),
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads every parameter from environment variables. Production refuses to
    /// start without an explicit `JWT_SECRET`.
    pub fn load() -> Result<Self, ConfigError> {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let jwt_secret = match env {
            Env::Production => {
                env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?
            }
            Env::Local => env::var("JWT_SECRET").unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
        };

        let defaults = Self::default();

        Ok(Self {
            env,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            fragment_base_url: env::var("FRAGMENT_BASE_URL")
                .unwrap_or(defaults.fragment_base_url),
            api_base_url: env::var("API_BASE_URL").unwrap_or(defaults.api_base_url),
            pages_dir: env::var("PAGES_DIR").unwrap_or(defaults.pages_dir),
            login_location: env::var("LOGIN_LOCATION").unwrap_or(defaults.login_location),
            cache_capacity: parse_var("FRAGMENT_CACHE_CAPACITY", defaults.cache_capacity)?
                .max(1),
            fetch_timeout: Duration::from_secs(parse_var(
                "FETCH_TIMEOUT_SECS",
                defaults.fetch_timeout.as_secs(),
            )?),
            jwt_secret,
        })
    }

    /// Fragments are refetched on every navigation while developing.
    pub fn is_development(&self) -> bool {
        self.env == Env::Local
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            value: raw.clone(),
        }),
        Err(_) => Ok(default),
    }
}
