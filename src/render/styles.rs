//! Style sheet groups and cascade-preserving flattening.
//!
//! Pages expose a [`StyleGroup`] - a possibly-nested composition of shared
//! [`StyleSheet`] values. Composition means the same sheet can be reachable
//! through multiple branches (shared base styles plus per-page overrides);
//! flattening dedupes by sheet identity while keeping the *last* occurrence's
//! relative order, matching cascade expectations.

use std::sync::Arc;

use rustc_hash::FxHashSet;

/// A shared CSS source. Identity (not text equality) is what flattening
/// dedupes on: two sheets with identical text are still distinct sheets.
#[derive(Debug, Clone)]
pub struct StyleSheet {
    css: Arc<str>,
}

impl StyleSheet {
    pub fn new(css: impl Into<Arc<str>>) -> Self {
        Self { css: css.into() }
    }

    /// The raw CSS text.
    pub fn css_text(&self) -> &str {
        &self.css
    }

    /// Stable identity of the shared CSS allocation.
    fn identity(&self) -> *const u8 {
        Arc::as_ptr(&self.css) as *const u8
    }
}

/// An arbitrarily nested group of style sheets.
#[derive(Debug, Clone)]
pub enum StyleGroup {
    Sheet(StyleSheet),
    Group(Vec<StyleGroup>),
}

impl From<StyleSheet> for StyleGroup {
    fn from(sheet: StyleSheet) -> Self {
        StyleGroup::Sheet(sheet)
    }
}

impl From<Vec<StyleGroup>> for StyleGroup {
    fn from(groups: Vec<StyleGroup>) -> Self {
        StyleGroup::Group(groups)
    }
}

/// Flatten a group into a sheet list, deduped by identity.
///
/// Dedupe runs over the reversed list so that the last occurrence of a sheet
/// keeps its position, then restores document order: `[A, B, A] -> [B, A]`.
pub fn flatten(group: &StyleGroup) -> Vec<StyleSheet> {
    let mut sheets = Vec::new();
    collect(group, &mut sheets);

    let mut seen: FxHashSet<*const u8> = FxHashSet::default();
    let mut deduped: Vec<StyleSheet> = sheets
        .into_iter()
        .rev()
        .filter(|s| seen.insert(s.identity()))
        .collect();
    deduped.reverse();
    deduped
}

fn collect(group: &StyleGroup, out: &mut Vec<StyleSheet>) {
    match group {
        StyleGroup::Sheet(sheet) => out.push(sheet.clone()),
        StyleGroup::Group(groups) => {
            for g in groups {
                collect(g, out);
            }
        }
    }
}

/// Render a group into a single `<style>` block, or an empty string for an
/// empty group.
pub fn style_block(group: &StyleGroup) -> String {
    let sheets = flatten(group);
    if sheets.is_empty() {
        return String::new();
    }

    let mut out = String::from("<style>");
    for sheet in &sheets {
        out.push_str(sheet.css_text());
    }
    out.push_str("</style>");
    out
}
