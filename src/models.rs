use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::router::{MatchedRoute, Route};

// --- Route Table API Schemas (consumed by the admin console's client code) ---

/// RouteSummary
///
/// One registered route as exposed by `GET /api/routes`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub path: String,
    pub title: String,
    pub requires_auth: bool,
    pub required_roles: Vec<String>,
    /// "admin" or "public".
    pub layout: String,
    /// Name of the attached page behavior, if any.
    pub behavior: Option<String>,
}

impl From<&Route> for RouteSummary {
    fn from(route: &Route) -> Self {
        Self {
            path: route.path.clone(),
            title: route.title.clone(),
            requires_auth: route.requires_auth,
            required_roles: route.required_roles.clone(),
            layout: route.layout().as_str().to_string(),
            behavior: route.behavior.as_ref().map(|b| b.name().to_string()),
        }
    }
}

/// MatchedRouteView
///
/// Result of `GET /api/routes/match?path=...`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct MatchedRouteView {
    /// The normalized request path.
    pub path: String,
    pub route: RouteSummary,
    pub params: BTreeMap<String, String>,
}

impl From<&MatchedRoute> for MatchedRouteView {
    fn from(matched: &MatchedRoute) -> Self {
        Self {
            path: matched.path.clone(),
            route: RouteSummary::from(matched.route.as_ref()),
            params: matched.params.clone(),
        }
    }
}

/// Query for the match endpoint.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MatchQuery {
    /// Any path; query string and trailing slash are ignored.
    pub path: String,
}
