//! URL path type for type-safe path handling.
//!
//! - Internal representation: always decoded (human-readable)
//! - Browser boundary: decode on input
//!
//! Page paths are extensionless: a request for `/about/index.html` and a
//! request for `/about` address the same route.

use std::sync::Arc;

use smallvec::SmallVec;

/// Trailing filename a browser may append to a page path.
pub const INDEX_HTML: &str = "index.html";

/// Trailing filename addressing the JSON fragment pair for a page path.
/// Client-side navigations fetch `<path>/index.json` instead of a document.
pub const FRAGMENT_SUFFIX: &str = "index.json";

/// Decoded URL path (internal representation)
///
/// Invariants:
/// - Always decoded (no percent-encoding)
/// - Always starts with `/`
/// - Never ends with `/` except for the root path itself
/// - Query string and fragment stripped
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UrlPath(Arc<str>);

impl UrlPath {
    /// Create from browser URL (decode percent-encoding, strip query string).
    pub fn from_browser(encoded: &str) -> Self {
        use percent_encoding::percent_decode_str;
        // Strip query string before decoding
        let path = encoded.split('?').next().unwrap_or(encoded);
        let decoded = percent_decode_str(path)
            .decode_utf8()
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| path.to_string());
        Self::from_page(&decoded)
    }

    /// Create from a decoded page path. Normalizes leading/trailing slashes
    /// and strips query string and fragment.
    pub fn from_page(decoded: &str) -> Self {
        let trimmed = decoded.trim();

        // Handle root path specially
        if trimmed.is_empty() || trimmed == "/" {
            return Self(Arc::from("/"));
        }

        // Use url crate to properly strip query and fragment
        let path = Self::strip_query_fragment(trimmed);

        // Add leading slash if missing
        let with_leading = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };

        // Drop trailing slashes (root already handled above)
        let normalized = with_leading.trim_end_matches('/');
        if normalized.is_empty() {
            return Self(Arc::from("/"));
        }

        Self(Arc::from(normalized))
    }

    /// Strip query string and fragment from a path using url crate.
    fn strip_query_fragment(path: &str) -> String {
        use percent_encoding::percent_decode_str;

        // Use a dummy base URL to parse the path
        static BASE: std::sync::OnceLock<url::Url> = std::sync::OnceLock::new();
        let base = BASE.get_or_init(|| url::Url::parse("http://x").unwrap());

        match base.join(path) {
            Ok(parsed) => {
                // url crate returns percent-encoded path, decode it
                percent_decode_str(parsed.path())
                    .decode_utf8()
                    .map(|s| s.into_owned())
                    .unwrap_or_else(|_| parsed.path().to_string())
            }
            // Fallback to simple split if url parsing fails
            Err(_) => path.split(['?', '#']).next().unwrap_or(path).to_string(),
        }
    }

    /// Get the decoded URL path as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this path addresses the JSON fragment pair for a page
    /// (last component equals the fragment suffix).
    pub fn is_fragment_request(&self) -> bool {
        self.0
            .rsplit('/')
            .next()
            .is_some_and(|last| last == FRAGMENT_SUFFIX)
    }

    /// Non-empty path segments, with an explicit trailing `index.html` or
    /// `index.json` component dropped.
    pub fn segments(&self) -> SmallVec<[&str; 8]> {
        let mut segments: SmallVec<[&str; 8]> =
            self.0.split('/').filter(|s| !s.is_empty()).collect();
        if let Some(last) = segments.last()
            && (*last == INDEX_HTML || *last == FRAGMENT_SUFFIX)
        {
            segments.pop();
        }
        segments
    }

    /// The navigable route path: trailing index filename stripped, no
    /// trailing slash, root maps to `/`.
    ///
    /// This is the path a shell receives and the path broadcast to
    /// location subscribers after a client navigation.
    pub fn route_path(&self) -> String {
        let segments = self.segments();
        if segments.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", segments.join("/"))
        }
    }
}

impl std::fmt::Display for UrlPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for UrlPath {
    fn default() -> Self {
        Self::from_page("/")
    }
}
