//! Page, data-loader, and shell contracts.
//!
//! A page produces the body markup for a resolved route and may contribute
//! head metadata and styles. A data loader is a page's optional sibling,
//! invoked server-side before the page renders. A shell is the persistent
//! layout wrapper rendered once per request.
//!
//! Missing optional pieces (no head, no styles, no loader, no shell) are
//! ordinary states, not errors.

use std::sync::Arc;

use anyhow::Result;

use super::markup::Markup;
use super::styles::StyleGroup;
use rustc_hash::FxHashMap;

/// Captured dynamic segment values, keyed by parameter name.
pub type Params = FxHashMap<String, String>;

/// Data produced by a [`DataLoader`]; `Null` when a page has no loader.
pub type Data = serde_json::Value;

/// A routable page.
pub trait Page: Send + Sync {
    /// Render the page body. Required.
    fn page(&self, params: &Params, data: &Data) -> Result<Markup>;

    /// Render head metadata for this page. Optional.
    fn head(&self, _params: &Params, _data: &Data) -> Option<Result<Markup>> {
        None
    }

    /// Styles contributed by this page. Optional.
    fn styles(&self) -> Option<StyleGroup> {
        None
    }
}

/// Server-side data loader, a page's sibling.
pub trait DataLoader: Send + Sync {
    fn data(&self, params: &Params) -> Result<Data>;
}

/// Persistent layout wrapper, rendered once per request with the normalized
/// location path. Its markup must contain a [`page_slot`](super::markup::page_slot)
/// to position the page body.
pub trait Shell: Send + Sync {
    fn render(&self, location: &str) -> Result<Markup>;
}

// =============================================================================
// Function adapters
// =============================================================================

/// Adapt a plain function into a [`Page`] with no head or styles.
pub struct FnPage<F>(pub F);

impl<F> Page for FnPage<F>
where
    F: Fn(&Params, &Data) -> Result<Markup> + Send + Sync,
{
    fn page(&self, params: &Params, data: &Data) -> Result<Markup> {
        (self.0)(params, data)
    }
}

/// Adapt a plain function into a [`DataLoader`].
pub struct FnLoader<F>(pub F);

impl<F> DataLoader for FnLoader<F>
where
    F: Fn(&Params) -> Result<Data> + Send + Sync,
{
    fn data(&self, params: &Params) -> Result<Data> {
        (self.0)(params)
    }
}

/// Adapt a plain function into a [`Shell`].
pub struct FnShell<F>(pub F);

impl<F> Shell for FnShell<F>
where
    F: Fn(&str) -> Result<Markup> + Send + Sync,
{
    fn render(&self, location: &str) -> Result<Markup> {
        (self.0)(location)
    }
}

/// A page plus its optional sibling data loader, as mounted on a route.
#[derive(Clone)]
pub struct PageEntry {
    pub page: Arc<dyn Page>,
    pub loader: Option<Arc<dyn DataLoader>>,
}

impl PageEntry {
    pub fn new(page: Arc<dyn Page>) -> Self {
        Self { page, loader: None }
    }

    pub fn with_loader(page: Arc<dyn Page>, loader: Arc<dyn DataLoader>) -> Self {
        Self {
            page,
            loader: Some(loader),
        }
    }
}
