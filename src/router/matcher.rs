use std::collections::BTreeMap;
use std::sync::Arc;

use super::route::{MatchedRoute, Route};

/// normalize_path
///
/// Strips query string and fragment, guarantees a leading `/` and removes
/// trailing slashes except for the root. Idempotent.
pub fn normalize_path(path: &str) -> String {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim().trim_end_matches('/');

    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// match_route
///
/// Exact literal matches win over parameterized ones, even when a dynamic
/// route registered earlier would also match. Among candidates of the same
/// kind, registration order decides.
pub fn match_route(routes: &[Arc<Route>], path: &str) -> Option<MatchedRoute> {
    let path = normalize_path(path);

    if let Some(route) = routes.iter().find(|route| route.path == path) {
        return Some(MatchedRoute {
            route: route.clone(),
            path,
            params: BTreeMap::new(),
        });
    }

    let segments: Vec<&str> = path.split('/').collect();

    routes
        .iter()
        .filter(|route| route.is_dynamic())
        .find_map(|route| {
            bind_params(&route.path, &segments).map(|params| MatchedRoute {
                route: route.clone(),
                path: path.clone(),
                params,
            })
        })
}

/// Same segment count, literal segments equal, `:name` segments bind anything.
fn bind_params(pattern: &str, segments: &[&str]) -> Option<BTreeMap<String, String>> {
    let pattern: Vec<&str> = pattern.split('/').collect();
    if pattern.len() != segments.len() {
        return None;
    }

    let mut params = BTreeMap::new();
    for (expected, actual) in pattern.iter().zip(segments) {
        match expected.strip_prefix(':') {
            Some(name) => {
                params.insert(name.to_string(), actual.to_string());
            }
            None if expected == actual => {}
            None => return None,
        }
    }

    Some(params)
}
