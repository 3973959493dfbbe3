use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::{
    AppState,
    auth::Session,
    models::{MatchQuery, MatchedRouteView, RouteSummary},
    router::NavigationOutcome,
    shell::Shell,
    views::PageShellView,
};

// --- API Handlers ---

/// list_routes
///
/// [Public Route] Lists the registered route table in registration order.
#[utoipa::path(
    get,
    path = "/api/routes",
    responses((status = 200, description = "Registered routes", body = [RouteSummary]))
)]
pub async fn list_routes(State(state): State<AppState>) -> Json<Vec<RouteSummary>> {
    let routes = state
        .router
        .routes()
        .iter()
        .map(|route| RouteSummary::from(route.as_ref()))
        .collect();
    Json(routes)
}

/// match_route
///
/// [Public Route] Resolves a path against the route table without navigating.
#[utoipa::path(
    get,
    path = "/api/routes/match",
    params(MatchQuery),
    responses(
        (status = 200, description = "Matched route", body = MatchedRouteView),
        (status = 404, description = "No route matches")
    )
)]
pub async fn match_route(
    State(state): State<AppState>,
    Query(query): Query<MatchQuery>,
) -> Result<Json<MatchedRouteView>, StatusCode> {
    state
        .router
        .match_route(&query.path)
        .map(|matched| Json(MatchedRouteView::from(&matched)))
        .ok_or(StatusCode::NOT_FOUND)
}

// --- Page Rendering ---

/// render_page
///
/// Fallback for every path not claimed by the API or static fragments.
/// Drives one navigation against a fresh in-memory shell for the visitor's
/// session, then serializes the resulting document.
///
/// Outcome mapping: Rendered 200, NotFound 404, Forbidden 403, Failed 500,
/// Redirected 303 to the login location.
pub async fn render_page(State(state): State<AppState>, session: Session, uri: Uri) -> Response {
    let (shell, handles) = Shell::in_memory();
    let router = state.router.with_session(Arc::new(session), shell);

    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    let outcome = router.navigate(target, true).await;

    let status = match outcome {
        NavigationOutcome::Redirected { location } => {
            return Redirect::to(&location).into_response();
        }
        NavigationOutcome::Rendered { .. } => StatusCode::OK,
        NavigationOutcome::NotFound => StatusCode::NOT_FOUND,
        NavigationOutcome::Forbidden => StatusCode::FORBIDDEN,
        NavigationOutcome::Failed => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let snapshot = handles.document.snapshot();
    let page = PageShellView {
        title: &snapshot.title,
        layout: snapshot.layout,
        active_path: snapshot.active_path.as_deref(),
        content: &snapshot.content,
    }
    .render();

    (status, Html(page)).into_response()
}
