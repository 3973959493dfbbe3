use crate::{
    behavior::ApiDataBehavior,
    router::{PageRouter, RouteOptions},
};

const SITE: &str = "Educational Consultancy";

fn title(page: &str) -> String {
    format!("{page} | {SITE}")
}

/// Public Site
///
/// Static fragments live under `/pages`. Detail pages additionally embed
/// the record they show, fetched from the REST API.
pub fn register(router: &PageRouter) {
    let api = router.config().api_base_url.clone();

    router.register_route("/", "/pages/home.html", RouteOptions::titled(title("Home")));
    router.register_route("/about", "/pages/about.html", RouteOptions::titled(title("About Us")));

    // Services offered (admissions, visa guidance, test preparation, ...).
    router.register_route(
        "/services",
        "/pages/services.html",
        RouteOptions::titled(title("Services")),
    );
    router.register_route(
        "/services/:id",
        "/pages/service-detail.html",
        RouteOptions::titled(title("Service Details"))
            .behavior(ApiDataBehavior::new(&api, "/api/v1/services/{id}").into_state()),
    );

    router.register_route("/blogs", "/pages/blogs.html", RouteOptions::titled(title("Blog")));
    router.register_route(
        "/blogs/:id",
        "/pages/blog-detail.html",
        RouteOptions::titled(title("Blog"))
            .behavior(ApiDataBehavior::new(&api, "/api/v1/blogs/{id}").into_state()),
    );

    // Study destinations.
    router.register_route(
        "/countries",
        "/pages/countries.html",
        RouteOptions::titled(title("Study Destinations")),
    );
    router.register_route(
        "/countries/:id",
        "/pages/country-detail.html",
        RouteOptions::titled(title("Study Destination"))
            .behavior(ApiDataBehavior::new(&api, "/api/v1/countries/{id}").into_state()),
    );

    router.register_route("/faq", "/pages/faq.html", RouteOptions::titled(title("FAQ")));
    router.register_route(
        "/testimonials",
        "/pages/testimonials.html",
        RouteOptions::titled(title("Testimonials")),
    );
    router.register_route(
        "/gallery",
        "/pages/gallery.html",
        RouteOptions::titled(title("Gallery")),
    );
    router.register_route("/videos", "/pages/videos.html", RouteOptions::titled(title("Videos")));
    router.register_route(
        "/contact",
        "/pages/contact.html",
        RouteOptions::titled(title("Contact Us")),
    );
    router.register_route("/login", "/pages/login.html", RouteOptions::titled(title("Login")));
}
