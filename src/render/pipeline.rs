//! SSR render pipeline.
//!
//! Turns a resolved route (or not-found) into an [`SsrResult`]. Every
//! fallible step is converted into either a data value (the `error` field)
//! or a silent degrade (missing shell, missing styles) - nothing propagates
//! to the caller. Presentation of errors is the document assembler's call.

use thiserror::Error;

use super::markup::Chunks;
use super::page::{Data, Params};
use super::styles::style_block;
use crate::core::UrlPath;
use crate::document::PAGE_MARKER;
use crate::route::Resolution;
use crate::site::Site;
use crate::debug;

/// Fixed body fragment for unmatched routes.
pub const NOT_FOUND_FRAGMENT: &str = "<h2>Page Not Found</h2>";

/// A failure captured during rendering. Never crosses the pipeline boundary
/// as an `Err` - it rides on the result for the assembler to present.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("data loader failed for `{path}`")]
    Loader {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("page render failed for `{path}`")]
    Page {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("head render failed for `{path}`")]
    Head {
        path: String,
        #[source]
        source: anyhow::Error,
    },
}

/// The structured output of one render pass.
pub struct SsrResult {
    pub head: Chunks,
    pub styles: String,
    pub shell: Chunks,
    pub page: Chunks,
    /// Captured failure; when set, `page` holds the fallback fragment and
    /// `head`/`styles` are empty.
    pub error: Option<RenderError>,
    /// Route resolution failed; the result is still renderable.
    pub not_found: bool,
}

/// Render the page tree for a URL path.
///
/// Steps, in order: shell (failures swallowed to the bare page-slot
/// placeholder), route resolution (not-found yields the fallback fragment),
/// data loader, page body, optional head, flattened styles.
pub fn render_path(site: &Site, url: &UrlPath, with_shell: bool) -> SsrResult {
    let location = url.route_path();

    let shell = if with_shell {
        render_shell(site, &location)
    } else {
        Chunks::raw(PAGE_MARKER)
    };

    let (entry, params) = match site.resolve(url) {
        Resolution::Found { entry, params } => (entry.clone(), params),
        Resolution::NotFound => return not_found_result(site, shell, &location),
    };

    // Sibling data loader runs before the page; its failure short-circuits
    // page, head, and styles.
    let data = match &entry.loader {
        Some(loader) => match loader.data(&params) {
            Ok(data) => data,
            Err(source) => {
                return error_result(
                    shell,
                    RenderError::Loader {
                        path: location,
                        source,
                    },
                );
            }
        },
        None => Data::Null,
    };

    let page = match entry.page.page(&params, &data) {
        Ok(markup) => markup.chunks(),
        Err(source) => {
            return error_result(
                shell,
                RenderError::Page {
                    path: location,
                    source,
                },
            );
        }
    };

    let head = match entry.page.head(&params, &data) {
        Some(Ok(markup)) => markup.chunks(),
        Some(Err(source)) => {
            return error_result(
                shell,
                RenderError::Head {
                    path: location,
                    source,
                },
            );
        }
        None => Chunks::empty(),
    };

    let styles = entry
        .page
        .styles()
        .map(|group| style_block(&group))
        .unwrap_or_default();

    SsrResult {
        head,
        styles,
        shell,
        page,
        error: None,
        not_found: false,
    }
}

/// Render the shell, degrading to the bare page-slot placeholder when the
/// site has no shell or the shell fails.
fn render_shell(site: &Site, location: &str) -> Chunks {
    match site.shell() {
        Some(shell) => match shell.render(location) {
            Ok(markup) => markup.chunks(),
            Err(e) => {
                debug!("render"; "shell failed for `{location}`: {e:#}");
                Chunks::raw(PAGE_MARKER)
            }
        },
        None => Chunks::raw(PAGE_MARKER),
    }
}

/// The not-found terminal result: fallback fragment, empty head and styles.
/// A custom not-found page replaces the fragment when one is set; its own
/// failure degrades back to the fixed text.
fn not_found_result(site: &Site, shell: Chunks, location: &str) -> SsrResult {
    let page = match site.not_found_page() {
        Some(page) => match page.page(&Params::default(), &Data::Null) {
            Ok(markup) => markup.chunks(),
            Err(e) => {
                debug!("render"; "not-found page failed for `{location}`: {e:#}");
                Chunks::raw(NOT_FOUND_FRAGMENT)
            }
        },
        None => Chunks::raw(NOT_FOUND_FRAGMENT),
    };

    SsrResult {
        head: Chunks::empty(),
        styles: String::new(),
        shell,
        page,
        error: None,
        not_found: true,
    }
}

fn error_result(shell: Chunks, error: RenderError) -> SsrResult {
    SsrResult {
        head: Chunks::empty(),
        styles: String::new(),
        shell,
        page: Chunks::raw(NOT_FOUND_FRAGMENT),
        error: Some(error),
        not_found: false,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::render::markup::{Markup, el, page_slot};
    use crate::render::page::{FnLoader, FnPage, FnShell, Page, Params};
    use crate::render::styles::{StyleGroup, StyleSheet};

    fn site_with_item_page() -> Site {
        let mut site = Site::new();
        site.mount_with_loader(
            "/items/[id]",
            FnPage(|params: &Params, data: &Data| {
                Ok(Markup::from(
                    el("h2").text(format!(
                        "Item {} ({})",
                        params["id"],
                        data["name"].as_str().unwrap_or("?")
                    )),
                ))
            }),
            FnLoader(|params: &Params| {
                Ok(serde_json::json!({ "name": format!("item-{}", params["id"]) }))
            }),
        )
        .unwrap();
        site
    }

    #[test]
    fn test_page_with_loader_data() {
        let site = site_with_item_page();
        let result = render_path(&site, &UrlPath::from_page("/items/42"), false);
        assert!(result.error.is_none());
        assert!(!result.not_found);
        assert_eq!(result.page.drain(), "<h2>Item 42 (item-42)</h2>");
    }

    #[test]
    fn test_loader_failure_short_circuits() {
        let mut site = Site::new();
        site.mount_with_loader(
            "/items/[id]",
            FnPage(|_: &Params, _: &Data| panic!("page must not render")),
            FnLoader(|_: &Params| anyhow::bail!("backend unreachable")),
        )
        .unwrap();

        let result = render_path(&site, &UrlPath::from_page("/items/1"), false);
        assert!(matches!(result.error, Some(RenderError::Loader { .. })));
        assert_eq!(result.page.drain(), NOT_FOUND_FRAGMENT);
        assert_eq!(result.head.drain(), "");
        assert!(result.styles.is_empty());
    }

    #[test]
    fn test_not_found_is_not_an_error() {
        let site = site_with_item_page();
        let result = render_path(&site, &UrlPath::from_page("/missing"), false);
        assert!(result.error.is_none());
        assert!(result.not_found);
        assert_eq!(result.page.drain(), NOT_FOUND_FRAGMENT);
        assert_eq!(result.head.drain(), "");
    }

    #[test]
    fn test_shell_renders_with_location() {
        let mut site = site_with_item_page();
        site.set_shell(FnShell(|location: &str| {
            Ok(Markup::from(
                el("nav").text(location.to_string()).child(page_slot()),
            ))
        }));

        let result = render_path(&site, &UrlPath::from_page("/items/42/index.html"), true);
        // Location is normalized: trailing index.html stripped.
        assert_eq!(result.shell.drain(), "<nav>/items/42<!--PAGE--></nav>");
    }

    #[test]
    fn test_shell_failure_degrades_to_placeholder() {
        let mut site = site_with_item_page();
        site.set_shell(FnShell(|_: &str| anyhow::bail!("shell broken")));

        let result = render_path(&site, &UrlPath::from_page("/items/42"), true);
        assert!(result.error.is_none(), "shell failures are swallowed");
        assert_eq!(result.shell.drain(), PAGE_MARKER);
    }

    #[test]
    fn test_without_shell_flag_uses_placeholder() {
        let mut site = site_with_item_page();
        site.set_shell(FnShell(|_: &str| {
            Ok(Markup::from(el("nav").child(page_slot())))
        }));

        let result = render_path(&site, &UrlPath::from_page("/items/42"), false);
        assert_eq!(result.shell.drain(), PAGE_MARKER);
    }

    #[test]
    fn test_head_and_styles() {
        struct Styled;
        impl Page for Styled {
            fn page(&self, _: &Params, _: &Data) -> anyhow::Result<Markup> {
                Ok(Markup::from(el("h1").text("Hello")))
            }
            fn head(&self, _: &Params, _: &Data) -> Option<anyhow::Result<Markup>> {
                Some(Ok(Markup::from(
                    el("meta").attr("name", "og:title").attr("content", "Hello"),
                )))
            }
            fn styles(&self) -> Option<StyleGroup> {
                Some(StyleGroup::Sheet(StyleSheet::new("h1{color:blue}")))
            }
        }

        let mut site = Site::new();
        site.mount("/", Styled).unwrap();

        let result = render_path(&site, &UrlPath::from_page("/"), false);
        assert_eq!(
            result.head.drain(),
            r#"<meta name="og:title" content="Hello">"#
        );
        assert_eq!(result.styles, "<style>h1{color:blue}</style>");
    }

    #[test]
    fn test_custom_not_found_page() {
        let mut site = site_with_item_page();
        site.set_not_found(FnPage(|_: &Params, _: &Data| {
            Ok(Markup::from(el("h2").text("Nothing here")))
        }));

        let result = render_path(&site, &UrlPath::from_page("/missing"), false);
        assert!(result.not_found);
        assert_eq!(result.page.drain(), "<h2>Nothing here</h2>");
    }

    #[test]
    fn test_page_failure_captured() {
        let mut site = Site::new();
        site.mount(
            "/boom",
            FnPage(|_: &Params, _: &Data| anyhow::bail!("render exploded")),
        )
        .unwrap();

        let result = render_path(&site, &UrlPath::from_page("/boom"), false);
        let err = result.error.expect("error captured");
        assert!(matches!(err, RenderError::Page { .. }));
        // Source chain keeps the underlying cause.
        let chain = format!("{:#}", anyhow::Error::new(err));
        assert!(chain.contains("render exploded"));
    }

    #[test]
    fn test_missing_optional_exports_are_valid() {
        let mut site = Site::new();
        site.mount(
            "/",
            FnPage(|_: &Params, _: &Data| Ok(Markup::from(el("p").text("minimal")))),
        )
        .unwrap();

        let result = render_path(&site, &UrlPath::from_page("/"), true);
        assert!(result.error.is_none());
        assert_eq!(result.head.drain(), "");
        assert!(result.styles.is_empty());
        assert_eq!(result.shell.drain(), PAGE_MARKER);
        assert_eq!(result.page.drain(), "<p>minimal</p>");
    }

    #[test]
    fn test_end_to_end_multi_capture_substitution() {
        let mut site = Site::new();
        site.mount(
            "/items/[id]/part/[num]",
            FnPage(|params: &Params, _: &Data| {
                Ok(Markup::from(el("h3").text(format!(
                    "Part #{} for Item {}",
                    params["num"], params["id"]
                ))))
            }),
        )
        .unwrap();

        let result = render_path(&site, &UrlPath::from_page("/items/42/part/7"), false);
        let page = result.page.drain();
        assert!(page.contains("42"));
        assert!(page.contains("7"));
        assert_eq!(page, "<h3>Part #7 for Item 42</h3>");
    }
}
