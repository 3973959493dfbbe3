use std::sync::Arc;

use consultancy_portal::{
    AppState,
    config::{AppConfig, Env},
    create_app,
    fetcher::{FetcherState, HttpFragmentFetcher},
    router::{PageRouter, events::spawn_route_logger},
    routes,
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, initializes logging, builds the page router and its
/// route table, then serves the site.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing production secrets)
    dotenv::dotenv().ok();
    let config = AppConfig::load().expect("FATAL: invalid configuration");

    // 2. Logging: RUST_LOG wins, otherwise sensible local defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "consultancy_portal=debug,analytics=info,tower_http=info".into());

    // 3. Pretty output locally, JSON for log aggregation in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Fragment fetcher (same-origin fragments by default).
    let fetcher = HttpFragmentFetcher::new(&config.fragment_base_url, config.fetch_timeout)
        .expect("FATAL: invalid FRAGMENT_BASE_URL");
    let fetcher = Arc::new(fetcher) as FetcherState;

    // 5. Page router and route table.
    let router = PageRouter::new(config.clone(), fetcher);
    routes::register_all(&router);

    // Analytics subscriber for route changes.
    spawn_route_logger(router.subscribe());

    // 6. HTTP server.
    let app = create_app(AppState::new(router));

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .expect("FATAL: failed to bind BIND_ADDR");

    tracing::info!("Listening on {}", config.bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    axum::serve(listener, app).await.expect("server error");
}
