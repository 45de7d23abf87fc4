//! Core types shared across the engine.

mod state;
mod url;

pub use state::{is_shutdown, register_server, setup_shutdown_handler};
pub use url::{FRAGMENT_SUFFIX, INDEX_HTML, UrlPath};

use serde::{Deserialize, Serialize};

/// Render mode controlling error presentation.
///
/// Development mode surfaces render diagnostics in the response body;
/// production mode replaces them with an opaque failure page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    #[default]
    Development,
    Production,
}

impl BuildMode {
    /// Whether render errors may be shown verbatim to the client.
    #[inline]
    pub fn show_diagnostics(self) -> bool {
        self == BuildMode::Development
    }
}
