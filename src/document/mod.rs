//! Document assembler: the server boundary between the render pipeline and
//! HTTP responses.
//!
//! Two output modes, selected by request shape:
//!
//! - **Full document** - the SSR result is drained into the embedded base
//!   template. The injected head region is bounded by sentinel comments so
//!   the client router can find and replace it later; the page body is
//!   wrapped in the fixed page-root element; the shadow-root bootstrap is
//!   appended.
//! - **Fragment** - paths ending in `index.json` get a JSON `{head, page}`
//!   pair, the payload the client router consumes.
//!
//! Entry documents must never be served stale: every assembled response
//! carries a monotonically increasing render key an intermediary cache
//! cannot reuse.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::core::{BuildMode, UrlPath};
use crate::embed::{BASE_DOCUMENT, DocumentVars, SHADOW_ROOT_BOOTSTRAP};
use crate::render::pipeline::{RenderError, render_path};
use crate::site::Site;
use crate::utils::html::escape;

/// Head injection marker; also opens the managed head region.
pub const HEAD_MARKER: &str = "<!--HEAD-->";

/// Closes the managed head region.
pub const HEAD_END_MARKER: &str = "<!--/HEAD-->";

/// Shell injection marker in the base template.
pub const SHELL_MARKER: &str = "<!--SHELL-->";

/// Page injection marker; a shell positions its page slot here.
pub const PAGE_MARKER: &str = "<!--PAGE-->";

/// Fixed identifier of the page-root wrapper element.
pub const PAGE_ROOT_ID: &str = "__page__";

const PAGE_START: &str = "<div id=\"__page__\"><div>";
const PAGE_END: &str = "</div></div>";

/// Rolling render key. Incremented per assembled response so an LRU
/// response cache can never serve a stale shell.
static RENDER_KEY: AtomicU64 = AtomicU64::new(0);

fn next_render_key() -> u64 {
    RENDER_KEY.fetch_add(1, Ordering::Relaxed) + 1
}

/// A fully assembled HTML document ready to send.
pub struct RenderedDocument {
    pub html: String,
    pub status: u16,
    pub render_key: u64,
}

/// The JSON fragment pair consumed by the client router.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fragment {
    pub head: String,
    pub page: String,
}

/// Assemble a full HTML document for a first-load request.
pub fn render_document(site: &Site, url: &UrlPath, mode: BuildMode) -> RenderedDocument {
    let result = render_path(site, url, true);
    let render_key = next_render_key();

    if let Some(error) = &result.error {
        return RenderedDocument {
            html: error_document(error, mode),
            status: 500,
            render_key,
        };
    }

    let head = format!(
        "{HEAD_MARKER}{}{}{HEAD_END_MARKER}",
        result.head.drain(),
        result.styles
    );
    let shell = result.shell.drain();
    let page = format!("{PAGE_START}{}{PAGE_END}", result.page.drain());

    let mut html = BASE_DOCUMENT.render(&DocumentVars {
        head: &head,
        shell: &shell,
        page: &page,
    });
    html.push_str(SHADOW_ROOT_BOOTSTRAP);

    RenderedDocument {
        html,
        status: if result.not_found { 404 } else { 200 },
        render_key,
    }
}

/// Assemble the JSON fragment pair for a client navigation request.
///
/// Head and page are wrapped in minimal container tags so the client can
/// parse them as complete documents and adopt their children.
pub fn render_fragment(site: &Site, url: &UrlPath, mode: BuildMode) -> Fragment {
    let result = render_path(site, url, false);

    if let Some(error) = &result.error {
        return Fragment {
            head: "<head></head>".to_string(),
            page: format!("<body>{}</body>", error_fragment(error, mode)),
        };
    }

    Fragment {
        head: format!("<head>{}{}</head>", result.head.drain(), result.styles),
        page: format!("<body>{}</body>", result.page.drain()),
    }
}

/// Error presentation for a full document: raw diagnostic in development,
/// opaque failure page in production.
fn error_document(error: &RenderError, mode: BuildMode) -> String {
    format!("<html><body>{}</body></html>", error_fragment(error, mode))
}

fn error_fragment(error: &RenderError, mode: BuildMode) -> String {
    if mode.show_diagnostics() {
        let chain = error_chain(error);
        format!("<pre>{}</pre>", escape(&chain))
    } else {
        "<h2>Something went wrong</h2>".to_string()
    }
}

fn error_chain(error: &RenderError) -> String {
    use std::fmt::Write;

    let mut out = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        write!(out, ": {cause}").ok();
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::markup::{Markup, el, page_slot};
    use crate::render::page::{Data, FnPage, FnShell, Params};
    use crate::render::pipeline::NOT_FOUND_FRAGMENT;

    fn demo_site() -> Site {
        let mut site = Site::new();
        site.set_shell(FnShell(|_: &str| {
            Ok(Markup::from(el("nav").text("menu").child(page_slot())))
        }));
        site.mount(
            "/",
            FnPage(|_: &Params, _: &Data| Ok(Markup::from(el("h1").text("Hello")))),
        )
        .unwrap();
        site
    }

    #[test]
    fn test_full_document_assembly() {
        let site = demo_site();
        let doc = render_document(&site, &UrlPath::from_page("/"), BuildMode::Development);

        assert_eq!(doc.status, 200);
        // Managed head region is bounded by sentinels.
        assert!(doc.html.contains(HEAD_MARKER));
        assert!(doc.html.contains(HEAD_END_MARKER));
        // Shell wraps the page-root element.
        assert!(doc.html.contains("<nav>menu<div id=\"__page__\"><div><h1>Hello</h1></div></div></nav>"));
        // Bootstrap is appended.
        assert!(doc.html.contains("__sprigAttachShadowRoots"));
    }

    #[test]
    fn test_not_found_document() {
        let site = demo_site();
        let doc = render_document(&site, &UrlPath::from_page("/missing"), BuildMode::Development);

        assert_eq!(doc.status, 404);
        assert!(doc.html.contains(NOT_FOUND_FRAGMENT));
        // Head region is present but empty.
        assert!(doc.html.contains(&format!("{HEAD_MARKER}{HEAD_END_MARKER}")));
    }

    #[test]
    fn test_render_key_is_monotonic() {
        let site = demo_site();
        let url = UrlPath::from_page("/");
        let first = render_document(&site, &url, BuildMode::Development);
        let second = render_document(&site, &url, BuildMode::Development);
        assert!(second.render_key > first.render_key);
    }

    #[test]
    fn test_fragment_pair() {
        let site = demo_site();
        let frag = render_fragment(
            &site,
            &UrlPath::from_page("/index.json"),
            BuildMode::Development,
        );

        assert_eq!(frag.head, "<head></head>");
        assert_eq!(frag.page, "<body><h1>Hello</h1></body>");

        // Round-trips through serde as the wire payload.
        let json = serde_json::to_string(&frag).unwrap();
        let parsed: Fragment = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.page, frag.page);
    }

    #[test]
    fn test_error_presentation_by_mode() {
        let mut site = Site::new();
        site.mount(
            "/boom",
            FnPage(|_: &Params, _: &Data| anyhow::bail!("secret detail")),
        )
        .unwrap();
        let url = UrlPath::from_page("/boom");

        let dev = render_document(&site, &url, BuildMode::Development);
        assert_eq!(dev.status, 500);
        assert!(dev.html.contains("secret detail"));

        let prod = render_document(&site, &url, BuildMode::Production);
        assert_eq!(prod.status, 500);
        assert!(!prod.html.contains("secret detail"));
        assert!(prod.html.contains("Something went wrong"));
    }

    #[test]
    fn test_error_diagnostic_is_escaped() {
        let mut site = Site::new();
        site.mount(
            "/boom",
            FnPage(|_: &Params, _: &Data| anyhow::bail!("<script>alert(1)</script>")),
        )
        .unwrap();

        let doc = render_document(
            &site,
            &UrlPath::from_page("/boom"),
            BuildMode::Development,
        );
        assert!(!doc.html.contains("<script>alert(1)"));
        assert!(doc.html.contains("&lt;script&gt;"));
    }
}
