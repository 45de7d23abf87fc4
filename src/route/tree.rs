//! Segment tree storage and the resolution walk.

use rustc_hash::FxHashMap;

use super::{RouteError, is_reserved_segment};
use crate::core::UrlPath;
use crate::render::page::{PageEntry, Params};

/// One level of the route tree.
///
/// Literal children are looked up first; the single optional bracket child
/// catches whatever a literal did not. A node with an `entry` is a routable
/// terminal; a node may be both a terminal and have children (`/about` and
/// `/about/more`).
#[derive(Default)]
struct RouteNode {
    literals: FxHashMap<String, RouteNode>,
    bracket: Option<Box<BracketNode>>,
    entry: Option<PageEntry>,
}

struct BracketNode {
    param: String,
    node: RouteNode,
}

/// The mounted route table.
#[derive(Default)]
pub struct RouteTree {
    root: RouteNode,
}

/// Outcome of resolving a URL path against the tree.
pub enum Resolution<'t> {
    Found {
        entry: &'t PageEntry,
        params: Params,
    },
    /// Ordinary terminal state - renderable, never an error.
    NotFound,
}

impl RouteTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a page entry at a route pattern.
    ///
    /// Patterns with two differently-named bracket segments at the same
    /// level are rejected: resolution attempts at most one dynamic match
    /// per level, so such trees would be ambiguous.
    pub fn mount(&mut self, pattern: &str, entry: PageEntry) -> Result<(), RouteError> {
        let segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();

        let mut node = &mut self.root;
        for segment in &segments {
            if is_reserved_segment(segment) {
                return Err(RouteError::ReservedSegment {
                    pattern: pattern.to_string(),
                    segment: (*segment).to_string(),
                });
            }

            if let Some(param) = bracket_param(segment) {
                if param.is_empty() {
                    return Err(RouteError::InvalidPattern {
                        pattern: pattern.to_string(),
                        reason: "empty parameter name".to_string(),
                    });
                }
                let bracket = node.bracket.get_or_insert_with(|| {
                    Box::new(BracketNode {
                        param: param.to_string(),
                        node: RouteNode::default(),
                    })
                });
                if bracket.param != param {
                    return Err(RouteError::AmbiguousParam {
                        pattern: pattern.to_string(),
                        existing: bracket.param.clone(),
                        new: param.to_string(),
                    });
                }
                node = &mut bracket.node;
            } else if segment.contains(['[', ']']) {
                return Err(RouteError::InvalidPattern {
                    pattern: pattern.to_string(),
                    reason: "brackets must span a whole segment".to_string(),
                });
            } else {
                node = node.literals.entry((*segment).to_string()).or_default();
            }
        }

        if node.entry.is_some() {
            return Err(RouteError::Duplicate(pattern.to_string()));
        }
        node.entry = Some(entry);
        Ok(())
    }

    /// Resolve a URL path to a mounted entry and its captured parameters.
    ///
    /// Walk order per segment: exact literal child first, then the bracket
    /// child. For the final segment only nodes carrying an entry qualify,
    /// mirroring the file convention where intermediate segments address
    /// directories and the last segment addresses a page file. Reserved
    /// segment names short-circuit to `NotFound`.
    pub fn resolve(&self, url: &UrlPath) -> Resolution<'_> {
        let segments = url.segments();

        let mut node = &self.root;
        let mut params = Params::default();

        for (i, segment) in segments.iter().enumerate() {
            if is_reserved_segment(segment) {
                return Resolution::NotFound;
            }
            let last = i + 1 == segments.len();

            if let Some(child) = node.literals.get(*segment)
                && (!last || child.entry.is_some())
            {
                node = child;
                continue;
            }

            match &node.bracket {
                Some(bracket) if !last || bracket.node.entry.is_some() => {
                    params.insert(bracket.param.clone(), (*segment).to_string());
                    node = &bracket.node;
                }
                _ => return Resolution::NotFound,
            }
        }

        match &node.entry {
            Some(entry) => Resolution::Found { entry, params },
            None => Resolution::NotFound,
        }
    }
}

/// Extract the parameter name from a `[name]` segment.
fn bracket_param(segment: &str) -> Option<&str> {
    segment.strip_prefix('[')?.strip_suffix(']')
}
