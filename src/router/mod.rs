//! The page router.
//!
//! Turns a requested path into rendered page content: match against the
//! route table, guard on authentication and roles, fetch the fragment,
//! swap it into the document, run the page behavior and announce the change.

pub mod events;
pub mod extract;
pub mod matcher;
pub mod route;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tokio::sync::broadcast;

use crate::auth::{AuthState, Session};
use crate::behavior::PageContext;
use crate::cache::FragmentCache;
use crate::config::AppConfig;
use crate::error::LoadError;
use crate::fetcher::FetcherState;
use crate::shell::{HistoryEntry, LoadingIndicator, Shell};
use crate::views::StatusPage;

pub use events::RouteChanged;
pub use extract::extract_fragment;
pub use matcher::{match_route, normalize_path};
pub use route::{Component, LayoutScope, MatchedRoute, RenderFn, Route, RouteOptions};

/// How a navigation ended. Every variant leaves some page rendered (or a
/// redirect issued) and the loading indicator hidden.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    Rendered { path: String },
    NotFound,
    Redirected { location: String },
    Forbidden,
    Failed,
}

/// What `load_route` is asked to load.
pub enum RouteTarget {
    Path(String),
    Matched(MatchedRoute),
}

impl From<&str> for RouteTarget {
    fn from(value: &str) -> Self {
        RouteTarget::Path(value.to_string())
    }
}

impl From<MatchedRoute> for RouteTarget {
    fn from(value: MatchedRoute) -> Self {
        RouteTarget::Matched(value)
    }
}

/// PageRouter
///
/// An explicitly constructed service object. The route table, fragment
/// cache and event channel are shared between clones; `with_session`
/// derives a router bound to another visitor's auth state and shell.
///
/// Overlapping navigations on the same shell are not serialized: each runs
/// to completion and the last one to write the document wins.
#[derive(Clone)]
pub struct PageRouter {
    routes: Arc<RwLock<Vec<Arc<Route>>>>,
    cache: Arc<FragmentCache>,
    fetcher: FetcherState,
    auth: AuthState,
    shell: Shell,
    events: broadcast::Sender<RouteChanged>,
    config: AppConfig,
    bust_counter: Arc<AtomicU64>,
}

/// Hides the loading indicator when dropped, so every exit path clears it.
struct LoaderGuard<'a>(&'a dyn LoadingIndicator);

impl<'a> LoaderGuard<'a> {
    fn show(loader: &'a dyn LoadingIndicator) -> Self {
        loader.show();
        Self(loader)
    }
}

impl Drop for LoaderGuard<'_> {
    fn drop(&mut self) {
        self.0.hide();
    }
}

impl PageRouter {
    /// A router with an anonymous session and a detached in-memory shell.
    pub fn new(config: AppConfig, fetcher: FetcherState) -> Self {
        let (shell, _) = Shell::in_memory();
        Self {
            routes: Arc::new(RwLock::new(Vec::new())),
            cache: Arc::new(FragmentCache::new(config.cache_capacity)),
            fetcher,
            auth: Arc::new(Session::anonymous()),
            shell,
            events: events::channel(),
            config,
            bust_counter: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Same table, cache and subscribers; different visitor.
    pub fn with_session(&self, auth: AuthState, shell: Shell) -> Self {
        Self {
            auth,
            shell,
            ..self.clone()
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn cache(&self) -> &FragmentCache {
        &self.cache
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RouteChanged> {
        self.events.subscribe()
    }

    /// register_route
    ///
    /// Appends to the table. Duplicate paths are accepted; the first one
    /// registered keeps matching.
    pub fn register_route(
        &self,
        path: &str,
        component: impl Into<Component>,
        options: RouteOptions,
    ) {
        let route = Route::new(path, component.into(), options);
        let mut routes = self.routes.write();
        if routes.iter().any(|existing| existing.path == route.path) {
            tracing::debug!(path = %route.path, "duplicate route registered; first one wins");
        }
        routes.push(Arc::new(route));
    }

    /// Registered routes in registration order.
    pub fn routes(&self) -> Vec<Arc<Route>> {
        self.routes.read().clone()
    }

    pub fn match_route(&self, path: &str) -> Option<MatchedRoute> {
        match_route(&self.routes.read(), path)
    }

    /// navigate
    ///
    /// 1. normalize, close modals, show the loader
    /// 2. match (no match -> not-found page)
    /// 3. guard: auth (-> login redirect), roles (-> forbidden page)
    /// 4. push history, load, set title, scroll, mark links
    ///
    /// The loader is hidden on every exit path.
    pub async fn navigate(&self, path: &str, push_state: bool) -> NavigationOutcome {
        let path = normalize_path(path);

        self.shell.modals.close_all();
        let _loader = LoaderGuard::show(self.shell.loader.as_ref());

        let Some(matched) = self.match_route(&path) else {
            tracing::debug!(%path, "no route matched");
            self.render_status(StatusPage::NotFound);
            return NavigationOutcome::NotFound;
        };

        let route = matched.route.clone();

        if route.requires_auth && !self.auth.is_authenticated() {
            let location = self.config.login_location.clone();
            tracing::debug!(%path, %location, "authentication required; redirecting");
            self.shell.document.redirect(&location);
            return NavigationOutcome::Redirected { location };
        }

        if !route.required_roles.is_empty() && !self.auth.has_any_role(&route.required_roles) {
            tracing::debug!(%path, roles = ?route.required_roles, "role check failed");
            self.render_status(StatusPage::Forbidden);
            return NavigationOutcome::Forbidden;
        }

        if push_state {
            self.shell.history.push_state(HistoryEntry {
                route: path.clone(),
            });
        }

        if !self.load_route(matched).await {
            return NavigationOutcome::Failed;
        }

        let document = &self.shell.document;
        document.set_title(&route.title);
        document.scroll_to_top();
        document.mark_active_links(&path);

        tracing::info!(%path, route = %route.path, "navigation complete");
        NavigationOutcome::Rendered { path }
    }

    /// Replays a back/forward traversal. The entry is already on the history
    /// stack, so nothing is pushed.
    pub async fn handle_popstate(&self, entry: Option<HistoryEntry>) -> NavigationOutcome {
        let route = entry.map_or_else(|| "/".to_string(), |entry| entry.route);
        self.navigate(&route, false).await
    }

    /// load_route
    ///
    /// Fetches, extracts and renders the route's content, then runs its page
    /// behavior and broadcasts `RouteChanged`. Returns false when an error or
    /// not-found page was rendered instead.
    pub async fn load_route(&self, target: impl Into<RouteTarget>) -> bool {
        let matched = match target.into() {
            RouteTarget::Matched(matched) => matched,
            RouteTarget::Path(path) => match self.match_route(&path) {
                Some(matched) => matched,
                None => {
                    self.render_status(StatusPage::NotFound);
                    return false;
                }
            },
        };

        let content = match self.render_content(&matched).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path = %matched.path, error = %e, "failed to load route");
                self.render_status(StatusPage::Error);
                return false;
            }
        };

        let document = self.shell.document.as_ref();
        document.replace_content(&content, matched.layout());

        if let Some(behavior) = &matched.route.behavior {
            let page = PageContext {
                matched: &matched,
                document,
                fetcher: self.fetcher.as_ref(),
            };
            if let Err(e) = behavior.activate(&page).await {
                tracing::error!(
                    behavior = behavior.name(),
                    path = %matched.path,
                    error = %e,
                    "page behavior failed"
                );
            }
        }

        // No subscribers is fine.
        let _ = self.events.send(RouteChanged::new(matched));
        true
    }

    async fn render_content(&self, matched: &MatchedRoute) -> Result<String, LoadError> {
        let html = self.fetch_component(matched).await?;
        extract_fragment(&html).ok_or_else(|| LoadError::EmptyFragment(matched.path.clone()))
    }

    /// fetch_component
    ///
    /// Render functions are invoked on every call. Inline markup is returned
    /// as is. Locators go through the cache in production; in development
    /// they are always refetched with a cache-busting parameter.
    pub async fn fetch_component(&self, matched: &MatchedRoute) -> Result<String, LoadError> {
        let locator = match &matched.route.component {
            Component::Render(render) => return Ok(render(matched)),
            Component::Fragment(text) if route::is_inline_markup(text) => {
                return Ok(text.clone());
            }
            Component::Fragment(locator) => locator,
        };

        let development = self.config.is_development();

        if !development {
            if let Some(cached) = self.cache.get(locator) {
                tracing::debug!(%locator, "fragment cache hit");
                return Ok(cached);
            }
        }

        let request = if development {
            self.cache_busted(locator)
        } else {
            locator.clone()
        };

        let html = self.fetcher.fetch_text(&request).await?;

        if !development {
            self.cache.insert(locator, html.clone());
        }

        Ok(html)
    }

    fn cache_busted(&self, locator: &str) -> String {
        let seq = self.bust_counter.fetch_add(1, Ordering::Relaxed);
        let separator = if locator.contains('?') { '&' } else { '?' };
        format!(
            "{locator}{separator}_={}-{seq}",
            chrono::Utc::now().timestamp_millis()
        )
    }

    fn render_status(&self, page: StatusPage) {
        let document = &self.shell.document;
        document.replace_content(&page.view().render(), LayoutScope::Public);
        document.set_title(page.title());
    }
}
