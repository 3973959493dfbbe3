//! Typed view-models rendered to markup.
//!
//! Every dynamic value is escaped with `html_escape`; only fragment content
//! produced by the router is inserted verbatim.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::router::LayoutScope;

pub const NOT_FOUND_TITLE: &str = "404 - Page Not Found";
pub const FORBIDDEN_TITLE: &str = "403 - Access Denied";
pub const ERROR_TITLE: &str = "Error";

/// The three terminal pages a navigation can end on besides its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPage {
    NotFound,
    Forbidden,
    Error,
}

impl StatusPage {
    pub fn title(&self) -> &'static str {
        match self {
            StatusPage::NotFound => NOT_FOUND_TITLE,
            StatusPage::Forbidden => FORBIDDEN_TITLE,
            StatusPage::Error => ERROR_TITLE,
        }
    }

    pub fn view(&self) -> StatusView {
        match self {
            StatusPage::NotFound => StatusView {
                code: 404,
                heading: "Page Not Found",
                message: "The page you are looking for does not exist or has been moved.",
                action: ("/", "Back to Home"),
            },
            StatusPage::Forbidden => StatusView {
                code: 403,
                heading: "Access Denied",
                message: "You do not have permission to view this page.",
                action: ("/", "Back to Home"),
            },
            StatusPage::Error => StatusView {
                code: 500,
                heading: "Something went wrong",
                message: "We could not load this page. Please try again in a moment.",
                action: ("/", "Back to Home"),
            },
        }
    }
}

pub struct StatusView {
    pub code: u16,
    pub heading: &'static str,
    pub message: &'static str,
    pub action: (&'static str, &'static str),
}

impl StatusView {
    pub fn render(&self) -> String {
        format!(
            concat!(
                r#"<section class="status-page status-{code}">"#,
                r#"<h1 class="status-code">{code}</h1>"#,
                r#"<h2>{heading}</h2>"#,
                r#"<p>{message}</p>"#,
                r#"<a class="btn btn-primary" href="{href}">{label}</a>"#,
                "</section>"
            ),
            code = self.code,
            heading = encode_text(self.heading),
            message = encode_text(self.message),
            href = encode_double_quoted_attribute(self.action.0),
            label = encode_text(self.action.1),
        )
    }
}

/// A link in the public navigation bar or the admin sidebar.
pub struct NavLink {
    pub href: &'static str,
    pub label: &'static str,
}

const fn link(href: &'static str, label: &'static str) -> NavLink {
    NavLink { href, label }
}

pub const PUBLIC_NAV: &[NavLink] = &[
    link("/", "Home"),
    link("/services", "Services"),
    link("/countries", "Study Destinations"),
    link("/blogs", "Blog"),
    link("/gallery", "Gallery"),
    link("/videos", "Videos"),
    link("/about", "About"),
    link("/contact", "Contact"),
];

pub const ADMIN_NAV: &[NavLink] = &[
    link("/admin/dashboard", "Dashboard"),
    link("/admin/blogs", "Blogs"),
    link("/admin/services", "Services"),
    link("/admin/ads", "Ads"),
    link("/admin/images", "Images"),
    link("/admin/videos", "Videos"),
    link("/admin/countries", "Countries"),
    link("/admin/faq", "FAQ"),
    link("/admin/testimonials", "Testimonials"),
    link("/admin/contacts", "Contacts"),
    link("/admin/users", "Users"),
];

/// PageShellView
///
/// The full document around the router's content container.
pub struct PageShellView<'a> {
    pub title: &'a str,
    pub layout: LayoutScope,
    pub active_path: Option<&'a str>,
    /// Router output, inserted verbatim.
    pub content: &'a str,
}

impl PageShellView<'_> {
    pub fn render(&self) -> String {
        let (chrome_before, chrome_after) = match self.layout {
            LayoutScope::Public => (
                format!(
                    r#"<header class="site-header"><nav class="navbar">{}</nav></header>"#,
                    self.nav(PUBLIC_NAV, "nav-link")
                ),
                r#"<footer class="site-footer"><p>&copy; Educational Consultancy</p></footer>"#
                    .to_string(),
            ),
            LayoutScope::Admin => (
                format!(
                    r#"<aside class="admin-sidebar"><nav>{}</nav></aside>"#,
                    self.nav(ADMIN_NAV, "sidebar-link")
                ),
                String::new(),
            ),
        };

        format!(
            concat!(
                "<!DOCTYPE html>",
                r#"<html lang="en"><head><meta charset="utf-8">"#,
                r#"<meta name="viewport" content="width=device-width, initial-scale=1">"#,
                "<title>{title}</title></head>",
                r#"<body class="layout-{layout}">{before}"#,
                r#"<main id="app-content" data-layout="{layout}">{content}</main>"#,
                "{after}</body></html>"
            ),
            title = encode_text(self.title),
            layout = self.layout.as_str(),
            before = chrome_before,
            content = self.content,
            after = chrome_after,
        )
    }

    fn nav(&self, links: &[NavLink], class: &str) -> String {
        links
            .iter()
            .map(|link| {
                let active = if self.active_path == Some(link.href) {
                    " active"
                } else {
                    ""
                };
                format!(
                    r#"<a class="{class}{active}" href="{}" data-link>{}</a>"#,
                    encode_double_quoted_attribute(link.href),
                    encode_text(link.label)
                )
            })
            .collect()
    }
}
