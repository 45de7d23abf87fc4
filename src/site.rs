//! Site definition: the mounted route table plus optional shell and
//! not-found pages.
//!
//! A `Site` is built once at startup by the embedding application and shared
//! across request handlers. Mounting uses route patterns; the two reserved
//! slots (`shell`, `not_found`) are set through dedicated methods precisely
//! because their names are excluded from ordinary resolution.

use std::sync::Arc;

use crate::render::page::{DataLoader, Page, PageEntry, Shell};
use crate::route::{Resolution, RouteError, RouteTree};
use crate::core::UrlPath;

#[derive(Default)]
pub struct Site {
    routes: RouteTree,
    shell: Option<Arc<dyn Shell>>,
    not_found: Option<Arc<dyn Page>>,
}

impl Site {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a page at a route pattern.
    pub fn mount(
        &mut self,
        pattern: &str,
        page: impl Page + 'static,
    ) -> Result<&mut Self, RouteError> {
        self.routes.mount(pattern, PageEntry::new(Arc::new(page)))?;
        Ok(self)
    }

    /// Mount a page with its sibling data loader.
    pub fn mount_with_loader(
        &mut self,
        pattern: &str,
        page: impl Page + 'static,
        loader: impl DataLoader + 'static,
    ) -> Result<&mut Self, RouteError> {
        self.routes.mount(
            pattern,
            PageEntry::with_loader(Arc::new(page), Arc::new(loader)),
        )?;
        Ok(self)
    }

    /// Set the layout shell rendered once per request.
    pub fn set_shell(&mut self, shell: impl Shell + 'static) -> &mut Self {
        self.shell = Some(Arc::new(shell));
        self
    }

    /// Set a custom not-found page used instead of the fixed fallback
    /// fragment.
    pub fn set_not_found(&mut self, page: impl Page + 'static) -> &mut Self {
        self.not_found = Some(Arc::new(page));
        self
    }

    pub(crate) fn shell(&self) -> Option<&Arc<dyn Shell>> {
        self.shell.as_ref()
    }

    pub(crate) fn not_found_page(&self) -> Option<&Arc<dyn Page>> {
        self.not_found.as_ref()
    }

    /// Resolve a URL path against the mounted routes.
    pub fn resolve(&self, url: &UrlPath) -> Resolution<'_> {
        self.routes.resolve(url)
    }
}
