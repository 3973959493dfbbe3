use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::behavior::BehaviorState;

use super::matcher::normalize_path;

/// Renders HTML for a matched route on every navigation. Never cached.
pub type RenderFn = Arc<dyn Fn(&MatchedRoute) -> String + Send + Sync>;

/// Component
///
/// What a route shows. `Fragment` holds either a locator (`/pages/home.html`)
/// or inline markup; text starting with `<` is treated as inline markup.
#[derive(Clone)]
pub enum Component {
    Fragment(String),
    Render(RenderFn),
}

impl Component {
    pub fn render<F>(f: F) -> Self
    where
        F: Fn(&MatchedRoute) -> String + Send + Sync + 'static,
    {
        Component::Render(Arc::new(f))
    }
}

impl From<&str> for Component {
    fn from(value: &str) -> Self {
        Component::Fragment(value.to_string())
    }
}

impl From<String> for Component {
    fn from(value: String) -> Self {
        Component::Fragment(value)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Fragment(text) => f.debug_tuple("Fragment").field(text).finish(),
            Component::Render(_) => f.write_str("Render(..)"),
        }
    }
}

pub(crate) fn is_inline_markup(text: &str) -> bool {
    text.starts_with('<')
}

/// LayoutScope
///
/// Which shell a route renders inside. Admin pages hide the public
/// navigation and footer chrome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutScope {
    Admin,
    #[default]
    Public,
}

impl LayoutScope {
    pub fn for_path(path: &str) -> Self {
        if path == "/admin" || path.starts_with("/admin/") {
            LayoutScope::Admin
        } else {
            LayoutScope::Public
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutScope::Admin => "admin",
            LayoutScope::Public => "public",
        }
    }
}

/// Access rules and metadata supplied at registration.
#[derive(Clone, Default)]
pub struct RouteOptions {
    pub title: String,
    pub requires_auth: bool,
    pub required_roles: Vec<String>,
    pub behavior: Option<BehaviorState>,
}

impl RouteOptions {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn requires_auth(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    pub fn roles(mut self, roles: &[&str]) -> Self {
        self.required_roles = roles.iter().map(|role| role.to_string()).collect();
        self
    }

    pub fn behavior(mut self, behavior: BehaviorState) -> Self {
        self.behavior = Some(behavior);
        self
    }
}

/// Route
///
/// A registered navigation target. Immutable once registered.
#[derive(Clone)]
pub struct Route {
    pub path: String,
    pub component: Component,
    pub title: String,
    pub requires_auth: bool,
    pub required_roles: Vec<String>,
    pub behavior: Option<BehaviorState>,
}

impl Route {
    pub fn new(path: &str, component: Component, options: RouteOptions) -> Self {
        Self {
            path: normalize_path(path),
            component,
            title: options.title,
            requires_auth: options.requires_auth,
            required_roles: options.required_roles,
            behavior: options.behavior,
        }
    }

    /// True when any segment is a `:param`.
    pub fn is_dynamic(&self) -> bool {
        self.path.split('/').any(|segment| segment.starts_with(':'))
    }

    pub fn layout(&self) -> LayoutScope {
        LayoutScope::for_path(&self.path)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("component", &self.component)
            .field("title", &self.title)
            .field("requires_auth", &self.requires_auth)
            .field("required_roles", &self.required_roles)
            .field(
                "behavior",
                &self.behavior.as_ref().map(|b| b.name().to_string()),
            )
            .finish()
    }
}

/// MatchedRoute
///
/// A route plus the parameters bound for one navigation.
#[derive(Debug, Clone)]
pub struct MatchedRoute {
    pub route: Arc<Route>,
    /// The normalized path that was matched.
    pub path: String,
    pub params: BTreeMap<String, String>,
}

impl MatchedRoute {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Layout follows the requested path, so `/admin/...` always gets the admin shell.
    pub fn layout(&self) -> LayoutScope {
        LayoutScope::for_path(&self.path)
    }
}
