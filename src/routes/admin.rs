use crate::{
    auth::{ROLE_ADMIN, ROLE_EDITOR},
    router::{PageRouter, RouteOptions},
};

/// Content managers open to editors as well as admins.
const CONTENT_MANAGERS: &[(&str, &str, &str)] = &[
    ("/admin/dashboard", "/pages/admin/dashboard.html", "Dashboard"),
    ("/admin/blogs", "/pages/admin/blogs.html", "Manage Blogs"),
    ("/admin/services", "/pages/admin/services.html", "Manage Services"),
    ("/admin/ads", "/pages/admin/ads.html", "Manage Ads"),
    ("/admin/images", "/pages/admin/images.html", "Manage Images"),
    ("/admin/videos", "/pages/admin/videos.html", "Manage Videos"),
    ("/admin/countries", "/pages/admin/countries.html", "Manage Countries"),
    ("/admin/faq", "/pages/admin/faq.html", "Manage FAQ"),
    ("/admin/testimonials", "/pages/admin/testimonials.html", "Manage Testimonials"),
    ("/admin/contacts", "/pages/admin/contacts.html", "Contact Submissions"),
];

fn title(page: &str) -> String {
    format!("{page} | Admin")
}

/// Admin Console
///
/// Access Control:
/// - content managers: authenticated, role ADMIN or EDITOR
/// - user management: authenticated, role ADMIN
/// - own profile: authenticated, any role
pub fn register(router: &PageRouter) {
    for (path, fragment, page) in CONTENT_MANAGERS {
        router.register_route(
            path,
            *fragment,
            RouteOptions::titled(title(page))
                .requires_auth()
                .roles(&[ROLE_ADMIN, ROLE_EDITOR]),
        );
    }

    router.register_route(
        "/admin/users",
        "/pages/admin/users.html",
        RouteOptions::titled(title("Manage Users"))
            .requires_auth()
            .roles(&[ROLE_ADMIN]),
    );

    router.register_route(
        "/admin/profile",
        "/pages/admin/profile.html",
        RouteOptions::titled(title("My Profile")).requires_auth(),
    );
}
