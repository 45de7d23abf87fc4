//! Route tree: pattern registration and path resolution.
//!
//! Routes are registered as slash-delimited patterns where a bracketed
//! segment (`[id]`) captures the matched path component by name:
//!
//! ```text
//! /                      root index page
//! /about
//! /items/[id]            params = {id}
//! /items/[id]/part/[num] params = {id, num}
//! ```
//!
//! Resolution walks one segment at a time, preferring an exact literal match
//! and falling back to the single bracket sibling at that level. Two reserved
//! segment names are never routable.

mod tree;

pub use tree::{Resolution, RouteTree};

use thiserror::Error;

/// Reserved segment name for the layout shell. Never resolvable as a route.
pub const SHELL_SEGMENT: &str = "_shell";

/// Reserved segment name for the not-found page. Never resolvable as a route.
pub const NOT_FOUND_SEGMENT: &str = "_404";

/// Whether a path component is one of the reserved names.
#[inline]
pub fn is_reserved_segment(segment: &str) -> bool {
    segment == SHELL_SEGMENT || segment == NOT_FOUND_SEGMENT
}

/// Errors raised while mounting route patterns.
///
/// Resolution itself never errors - an unmatched path is the ordinary
/// [`Resolution::NotFound`] outcome.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route pattern `{pattern}` uses reserved segment `{segment}`")]
    ReservedSegment { pattern: String, segment: String },

    #[error(
        "route pattern `{pattern}` declares dynamic segment `[{new}]` but `[{existing}]` already exists at this level"
    )]
    AmbiguousParam {
        pattern: String,
        existing: String,
        new: String,
    },

    #[error("route pattern `{0}` is already mounted")]
    Duplicate(String),

    #[error("invalid route pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}
