/// Site Route Table
///
/// Registers every page of the consultancy site on the page router, split
/// the same way the site is: a public site open to everyone and an admin
/// console behind authentication and role checks.
use crate::router::PageRouter;

/// Pages reachable by anonymous visitors.
pub mod public;

/// Admin console pages. Every route requires a session; most also require
/// the ADMIN or EDITOR role.
pub mod admin;

/// Registers the public site first, then the admin console.
pub fn register_all(router: &PageRouter) {
    public::register(router);
    admin::register(router);
    tracing::debug!(routes = router.routes().len(), "route table registered");
}
