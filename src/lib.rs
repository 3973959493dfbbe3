use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    routing::get,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core services: the page router and its collaborators.
pub mod auth;
pub mod behavior;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod router;
pub mod shell;
pub mod views;

// HTTP surface.
pub mod handlers;
pub mod models;

// The site's route table (Public, Admin).
pub mod routes;

// --- Public Re-exports ---

pub use config::AppConfig;
pub use fetcher::{FetcherState, HttpFragmentFetcher, MockFragmentFetcher};
pub use router::{NavigationOutcome, PageRouter};

/// ApiDoc
///
/// OpenAPI document for the JSON endpoints, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(handlers::list_routes, handlers::match_route),
    components(schemas(models::RouteSummary, models::MatchedRouteView)),
    tags(
        (name = "consultancy-portal", description = "Educational Consultancy page router")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared by every request. The page router inside is cheap to clone and
/// is rebound to each visitor's session by the page handler.
#[derive(Clone)]
pub struct AppState {
    pub router: PageRouter,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(router: PageRouter) -> Self {
        let config = router.config().clone();
        Self { router, config }
    }
}

impl FromRef<AppState> for PageRouter {
    fn from_ref(app_state: &AppState) -> PageRouter {
        app_state.router.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_app
///
/// Assembles the HTTP surface:
/// - `/health`, `/api/routes`, `/api/routes/match`
/// - `/pages/*` static fragments
/// - Swagger UI
/// - everything else is rendered by the page router
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(|| async { "ok" }))
        .route("/api/routes", get(handlers::list_routes))
        .route("/api/routes/match", get(handlers::match_route))
        .nest_service("/pages", ServeDir::new(&state.config.pages_dir))
        .fallback(handlers::render_page)
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// Span for every request, correlated by the generated `x-request-id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
