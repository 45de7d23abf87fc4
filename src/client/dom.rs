//! Trait seams between the client subsystems and the host DOM.
//!
//! The router owns ordering and decision logic; everything that actually
//! touches the document goes through [`DomDocument`], and fragment retrieval
//! goes through [`FetchFragments`]. Browser glue implements these; tests use
//! in-memory fakes.

use anyhow::Result;

use crate::document::Fragment;

/// Snapshot of a document-level click event, with the anchor found on the
/// event's composed path (if any) already extracted.
#[derive(Debug, Clone)]
pub struct ClickEvent {
    /// Mouse button; `0` is the primary button.
    pub button: u8,
    pub meta: bool,
    pub ctrl: bool,
    pub shift: bool,
    pub default_prevented: bool,
    pub anchor: Option<AnchorTarget>,
}

impl ClickEvent {
    /// An unmodified primary-button click on the given anchor.
    pub fn primary(anchor: AnchorTarget) -> Self {
        Self {
            button: 0,
            meta: false,
            ctrl: false,
            shift: false,
            default_prevented: false,
            anchor: Some(anchor),
        }
    }
}

/// The anchor element a click landed on.
#[derive(Debug, Clone, Default)]
pub struct AnchorTarget {
    /// Fully resolved href, e.g. `http://localhost:8000/about`.
    pub href: String,
    /// `target` attribute, when present.
    pub target: Option<String>,
    /// Anchor carries a `download` attribute.
    pub download: bool,
    /// `rel` attribute, when present.
    pub rel: Option<String>,
}

impl AnchorTarget {
    pub fn href(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            ..Self::default()
        }
    }
}

/// Document operations the router performs during a navigation.
pub trait DomDocument: Send + Sync {
    /// Full current location URL, e.g. `http://localhost:8000/about`.
    fn location_href(&self) -> String;

    /// Origin prefix, e.g. `http://localhost:8000`.
    fn origin(&self) -> String;

    /// Push a new entry onto the session history.
    fn push_state(&self, href: &str);

    /// Whether the fixed page-root element exists in the document.
    fn has_page_root(&self) -> bool;

    /// Replace the managed head region - everything between the head
    /// sentinels - with the fetched head fragment's children. Returns
    /// `false` when the sentinels cannot be found.
    fn replace_head_region(&self, head_html: &str) -> bool;

    /// Replace the page root's single child subtree with the fetched page
    /// fragment's content. Returns `false` when the page root is missing.
    fn replace_page(&self, page_html: &str) -> bool;

    /// Reactivate script tags in the newly inserted subtree by cloning them
    /// into fresh elements (markup-inserted scripts do not execute).
    fn activate_scripts(&self);

    /// Re-run the declarative shadow-root bootstrap for elements not yet
    /// upgraded.
    fn reattach_shadow_roots(&self);

    /// Reset scroll position to the top.
    fn scroll_to_top(&self);
}

/// Retrieval of the JSON fragment pair for a navigation endpoint.
pub trait FetchFragments: Send + Sync {
    fn fetch(&self, endpoint: &str) -> Result<Fragment>;
}
