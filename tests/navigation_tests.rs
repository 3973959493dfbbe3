use async_trait::async_trait;
use consultancy_portal::{
    NavigationOutcome, PageRouter,
    auth::{ROLE_ADMIN, ROLE_EDITOR, Session},
    behavior::{ApiDataBehavior, PageBehavior, PageContext},
    config::{AppConfig, Env},
    error::{BehaviorError, FetchError},
    fetcher::{FetcherState, FragmentFetcher, MockFragmentFetcher},
    router::{Component, LayoutScope, RouteOptions},
    shell::{HistoryEntry, History, MemoryShell, Shell},
    views::{ERROR_TITLE, FORBIDDEN_TITLE, NOT_FOUND_TITLE},
};
use std::sync::Arc;
use tokio::{sync::Notify, test};

// --- Fixtures ---

const HOME: &str = "<body><main><h1>Home</h1></main></body>";
const DASHBOARD: &str =
    r#"<html><body><div data-router-content><h1>Dashboard</h1></div></body></html>"#;
const SERVICES: &str = "<main><h1>Services</h1></main>";

fn production() -> AppConfig {
    AppConfig {
        env: Env::Production,
        ..AppConfig::default()
    }
}

fn fetcher() -> Arc<MockFragmentFetcher> {
    Arc::new(
        MockFragmentFetcher::new()
            .with_body("/pages/home.html", HOME)
            .with_body("/pages/admin/dashboard.html", DASHBOARD)
            .with_body("/pages/services.html", SERVICES),
    )
}

fn site(fetcher: &Arc<MockFragmentFetcher>) -> PageRouter {
    let router = PageRouter::new(production(), fetcher.clone() as FetcherState);
    router.register_route("/", "/pages/home.html", RouteOptions::titled("Home"));
    router.register_route(
        "/services",
        "/pages/services.html",
        RouteOptions::titled("Services"),
    );
    router.register_route(
        "/admin/dashboard",
        "/pages/admin/dashboard.html",
        RouteOptions::titled("Dashboard")
            .requires_auth()
            .roles(&[ROLE_ADMIN]),
    );
    router
}

fn visit(router: &PageRouter, session: Session) -> (PageRouter, MemoryShell) {
    let (shell, handles) = Shell::in_memory();
    (router.with_session(Arc::new(session), shell), handles)
}

// --- Guards ---

#[test]
async fn test_unauthenticated_admin_visit_redirects_without_fetching() {
    let fetcher = fetcher();
    let (router, page) = visit(&site(&fetcher), Session::anonymous());

    let outcome = router.navigate("/admin/dashboard", true).await;

    assert_eq!(
        outcome,
        NavigationOutcome::Redirected {
            location: "/login".to_string()
        }
    );
    let doc = page.document.snapshot();
    assert_eq!(doc.redirected_to.as_deref(), Some("/login"));
    assert!(!doc.content.contains("Dashboard"));
    assert_eq!(fetcher.request_count("/pages/admin/dashboard.html"), 0);
    assert!(page.history.is_empty());
    assert!(!page.loader.is_visible());
}

#[test]
async fn test_non_admin_gets_forbidden_page() {
    let fetcher = fetcher();
    let (router, page) = visit(&site(&fetcher), Session::with_roles("12", &[ROLE_EDITOR]));

    let outcome = router.navigate("/admin/dashboard", true).await;

    assert_eq!(outcome, NavigationOutcome::Forbidden);
    let doc = page.document.snapshot();
    assert_eq!(doc.title, FORBIDDEN_TITLE);
    assert!(doc.content.contains("Access Denied"));
    assert_eq!(fetcher.request_count("/pages/admin/dashboard.html"), 0);
    assert!(page.history.is_empty());
    assert!(!page.loader.is_visible());
}

#[test]
async fn test_admin_gets_dashboard_rendered_once() {
    let fetcher = fetcher();
    let (router, page) = visit(&site(&fetcher), Session::with_roles("1", &[ROLE_ADMIN]));

    let outcome = router.navigate("/admin/dashboard", true).await;

    assert_eq!(
        outcome,
        NavigationOutcome::Rendered {
            path: "/admin/dashboard".to_string()
        }
    );
    assert_eq!(fetcher.request_count("/pages/admin/dashboard.html"), 1);

    let doc = page.document.snapshot();
    assert_eq!(doc.content, "<h1>Dashboard</h1>");
    assert_eq!(doc.title, "Dashboard");
    assert_eq!(doc.layout, LayoutScope::Admin);
    assert_eq!(doc.active_path.as_deref(), Some("/admin/dashboard"));
    assert_eq!(doc.scroll_resets, 1);
    assert_eq!(
        page.history.state(),
        Some(HistoryEntry {
            route: "/admin/dashboard".to_string()
        })
    );
    assert!(!page.loader.is_visible());
}

// --- Terminal pages and loader cleanup ---

#[test]
async fn test_unknown_path_renders_not_found() {
    let fetcher = fetcher();
    let (router, page) = visit(&site(&fetcher), Session::anonymous());

    let outcome = router.navigate("/no/such/page", true).await;

    assert_eq!(outcome, NavigationOutcome::NotFound);
    let doc = page.document.snapshot();
    assert_eq!(doc.title, NOT_FOUND_TITLE);
    assert!(doc.content.contains("404"));
    assert!(page.history.is_empty());
    assert!(fetcher.requests().is_empty());
}

#[test]
async fn test_fetch_failure_renders_error_page() {
    let fetcher = fetcher();
    let router = site(&fetcher);
    router.register_route("/faq", "/pages/missing.html", RouteOptions::titled("FAQ"));
    let (router, page) = visit(&router, Session::anonymous());

    let outcome = router.navigate("/faq", true).await;

    assert_eq!(outcome, NavigationOutcome::Failed);
    let doc = page.document.snapshot();
    assert_eq!(doc.title, ERROR_TITLE);
    assert!(doc.content.contains("Something went wrong"));
    assert!(!page.loader.is_visible());
}

#[test]
async fn test_fragment_without_content_is_an_error() {
    let fetcher = fetcher();
    fetcher.set_body("/pages/empty.html", "<html><body>  </body></html>");
    let router = site(&fetcher);
    router.register_route("/empty", "/pages/empty.html", RouteOptions::titled("Empty"));
    let (router, page) = visit(&router, Session::anonymous());

    assert_eq!(router.navigate("/empty", true).await, NavigationOutcome::Failed);
    assert_eq!(page.document.snapshot().title, ERROR_TITLE);
}

#[test]
async fn test_loader_always_clears() {
    let fetcher = fetcher();
    let router = site(&fetcher);
    router.register_route("/broken", "/pages/missing.html", RouteOptions::titled("Broken"));

    let cases = [
        ("/nowhere", Session::anonymous()),
        ("/admin/dashboard", Session::anonymous()),
        ("/admin/dashboard", Session::with_roles("2", &[ROLE_EDITOR])),
        ("/services", Session::anonymous()),
        ("/broken", Session::anonymous()),
    ];

    for (path, session) in cases {
        let (router, page) = visit(&router, session);
        router.navigate(path, true).await;
        assert!(!page.loader.is_visible(), "loader left visible for {path}");
        assert_eq!(page.loader.show_count(), 1);
        assert_eq!(page.loader.hide_count(), 1);
    }
}

#[test]
async fn test_navigation_closes_open_modals() {
    let fetcher = fetcher();
    let (router, page) = visit(&site(&fetcher), Session::anonymous());
    page.modals.open();
    page.modals.open();

    router.navigate("/", true).await;

    assert_eq!(page.modals.open_count(), 0);
}

// --- History ---

#[test]
async fn test_history_tracks_navigation_and_popstate() {
    let fetcher = fetcher();
    let (router, page) = visit(&site(&fetcher), Session::anonymous());

    router.navigate("/", true).await;
    router.navigate("/services/", true).await;
    assert_eq!(page.history.state().unwrap().route, "/services");
    assert_eq!(page.history.len(), 2);

    let entry = page.history.back();
    let outcome = router.handle_popstate(entry).await;

    assert_eq!(outcome, NavigationOutcome::Rendered { path: "/".to_string() });
    assert_eq!(page.history.len(), 2, "popstate must not push");
    assert_eq!(page.history.state().unwrap().route, "/");
    assert_eq!(page.document.snapshot().content, "<h1>Home</h1>");
}

#[test]
async fn test_navigate_without_push_leaves_history_alone() {
    let fetcher = fetcher();
    let (router, page) = visit(&site(&fetcher), Session::anonymous());

    router.navigate("/services?tab=visa", false).await;

    assert!(page.history.is_empty());
    assert_eq!(page.document.snapshot().title, "Services");
}

// --- Components ---

#[test]
async fn test_render_function_receives_params_and_is_never_cached() {
    let fetcher = fetcher();
    let router = site(&fetcher);
    router.register_route(
        "/greet/:name",
        Component::render(|matched| {
            format!("<p>Hello {}</p>", matched.param("name").unwrap_or("?"))
        }),
        RouteOptions::titled("Greeting"),
    );
    let (router, page) = visit(&router, Session::anonymous());

    router.navigate("/greet/ana", true).await;
    assert_eq!(page.document.snapshot().content, "<p>Hello ana</p>");
    router.navigate("/greet/ben", true).await;
    assert_eq!(page.document.snapshot().content, "<p>Hello ben</p>");
    assert!(router.cache().is_empty());
}

#[test]
async fn test_inline_markup_is_rendered_without_fetching() {
    let fetcher = fetcher();
    let router = site(&fetcher);
    router.register_route(
        "/maintenance",
        "<p>Back soon</p>",
        RouteOptions::titled("Maintenance"),
    );
    let (router, page) = visit(&router, Session::anonymous());

    router.navigate("/maintenance", true).await;

    assert_eq!(page.document.snapshot().content, "<p>Back soon</p>");
    assert!(fetcher.requests().is_empty());
}

#[test]
async fn test_load_route_by_path_without_match_renders_not_found() {
    let fetcher = fetcher();
    let (router, page) = visit(&site(&fetcher), Session::anonymous());

    assert!(!router.load_route("/missing").await);
    assert_eq!(page.document.snapshot().title, NOT_FOUND_TITLE);
}

// --- Behaviors and events ---

struct FailingBehavior;

#[async_trait]
impl PageBehavior for FailingBehavior {
    fn name(&self) -> &str {
        "failing"
    }

    async fn activate(&self, _page: &PageContext<'_>) -> Result<(), BehaviorError> {
        Err(BehaviorError::MissingParam("widget".to_string()))
    }
}

#[test]
async fn test_failing_behavior_keeps_rendered_content() {
    let fetcher = fetcher();
    let router = site(&fetcher);
    router.register_route(
        "/about",
        "<section>About us</section>",
        RouteOptions::titled("About").behavior(Arc::new(FailingBehavior)),
    );
    let (router, page) = visit(&router, Session::anonymous());

    let outcome = router.navigate("/about", true).await;

    assert!(matches!(outcome, NavigationOutcome::Rendered { .. }));
    assert_eq!(page.document.snapshot().content, "<section>About us</section>");
}

#[test]
async fn test_api_data_behavior_embeds_record() {
    let fetcher = fetcher();
    fetcher.set_body("/pages/blog-detail.html", "<main><article>post</article></main>");
    fetcher.set_body(
        "http://api.test/api/v1/blogs/42",
        r#"{"id":42,"title":"Visa tips </script>"}"#,
    );
    let router = site(&fetcher);
    router.register_route(
        "/blogs/:id",
        "/pages/blog-detail.html",
        RouteOptions::titled("Blog")
            .behavior(ApiDataBehavior::new("http://api.test", "/api/v1/blogs/{id}").into_state()),
    );
    let (router, page) = visit(&router, Session::anonymous());

    router.navigate("/blogs/42", true).await;

    let content = page.document.snapshot().content;
    assert!(content.starts_with("<article>post</article>"));
    assert!(content.contains(r#"<script type="application/json" id="page-data">"#));
    assert!(content.contains(r#""id":42"#));
    assert!(content.contains(r"<\/script>"));
}

#[test]
async fn test_route_changed_is_broadcast_after_render() {
    let fetcher = fetcher();
    let router = site(&fetcher);
    router.register_route("/blogs/:id", "<p>post</p>", RouteOptions::titled("Blog"));
    let mut events = router.subscribe();
    let (router, _page) = visit(&router, Session::anonymous());

    router.navigate("/blogs/7", true).await;
    router.navigate("/nowhere", true).await;

    let event = events.try_recv().expect("route changed event");
    assert_eq!(event.matched.path, "/blogs/7");
    assert_eq!(event.matched.route.path, "/blogs/:id");
    assert_eq!(event.matched.param("id"), Some("7"));
    assert!(events.try_recv().is_err(), "not-found must not broadcast");
}

/// Holds back one locator until released, so two navigations overlap.
struct GatedFetcher {
    inner: Arc<MockFragmentFetcher>,
    gated: &'static str,
    release: Notify,
}

#[async_trait]
impl FragmentFetcher for GatedFetcher {
    async fn fetch_text(&self, locator: &str) -> Result<String, FetchError> {
        if locator == self.gated {
            self.release.notified().await;
        }
        self.inner.fetch_text(locator).await
    }
}

#[test]
async fn test_navigation_resolving_last_sets_final_content() {
    let gated = Arc::new(GatedFetcher {
        inner: fetcher(),
        gated: "/pages/home.html",
        release: Notify::new(),
    });
    let router = PageRouter::new(production(), gated.clone() as FetcherState);
    router.register_route("/", "/pages/home.html", RouteOptions::titled("Home"));
    router.register_route(
        "/services",
        "/pages/services.html",
        RouteOptions::titled("Services"),
    );
    let (router, page) = visit(&router, Session::anonymous());

    let slow = router.navigate("/", true);
    let fast = async {
        let outcome = router.navigate("/services", true).await;
        assert_eq!(page.document.snapshot().content, "<h1>Services</h1>");
        gated.release.notify_one();
        outcome
    };
    let (first, second) = tokio::join!(slow, fast);

    assert!(matches!(first, NavigationOutcome::Rendered { .. }));
    assert!(matches!(second, NavigationOutcome::Rendered { .. }));

    let doc = page.document.snapshot();
    assert_eq!(doc.content, "<h1>Home</h1>");
    assert_eq!(doc.title, "Home");
    assert!(!page.loader.is_visible());

    assert_eq!(page.history.len(), 2);
    assert_eq!(page.history.state().unwrap().route, "/services");
    assert_eq!(page.history.back().unwrap().route, "/");
}
