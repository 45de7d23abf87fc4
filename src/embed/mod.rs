//! Embedded static resources.
//!
//! - `template` - template types for typed variable injection
//! - `document.html` - the base HTML document with splice markers
//! - `shadow_root.html` - bootstrap script converting server-flattened
//!   `<template shadowroot>` transports into real shadow roots

mod template;

pub use template::{Template, TemplateVars};

use crate::document::{HEAD_MARKER, PAGE_MARKER, SHELL_MARKER};

/// Variables for the base document template.
///
/// Replacement order matters: the shell markup itself contains the page
/// marker, so the page body must be spliced after the shell.
pub struct DocumentVars<'a> {
    pub head: &'a str,
    pub shell: &'a str,
    pub page: &'a str,
}

impl TemplateVars for DocumentVars<'_> {
    fn apply(&self, content: &str) -> String {
        content
            .replace(HEAD_MARKER, self.head)
            .replace(SHELL_MARKER, self.shell)
            .replace(PAGE_MARKER, self.page)
    }
}

/// Base HTML document for full-document responses.
pub const BASE_DOCUMENT: Template<DocumentVars<'static>> =
    Template::new(include_str!("document.html"));

/// Bootstrap snippet appended to every full document. Runs on load and is
/// re-invoked by the client router after each navigation; converted
/// templates are removed, so repeat invocations are no-ops.
pub const SHADOW_ROOT_BOOTSTRAP: &str = include_str!("shadow_root.html");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_template_markers() {
        let content = BASE_DOCUMENT.content();
        assert!(content.contains(HEAD_MARKER));
        assert!(content.contains(SHELL_MARKER));
        // The page marker arrives via the shell, not the base template.
        assert!(!content.contains(PAGE_MARKER));
    }

    #[test]
    fn test_document_vars_splice_order() {
        let rendered = BASE_DOCUMENT.render(&DocumentVars {
            head: "<title>t</title>",
            shell: "<nav></nav><!--PAGE-->",
            page: "<main>body</main>",
        });
        assert!(rendered.contains("<title>t</title>"));
        assert!(rendered.contains("<nav></nav><main>body</main>"));
        assert!(!rendered.contains(PAGE_MARKER));
    }

    #[test]
    fn test_bootstrap_is_reinvocable() {
        assert!(SHADOW_ROOT_BOOTSTRAP.contains("__sprigAttachShadowRoots"));
        // Declared then invoked once on load.
        assert!(SHADOW_ROOT_BOOTSTRAP.contains("window.__sprigAttachShadowRoots();"));
    }
}
