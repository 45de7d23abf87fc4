//! Markup tree with deferred serialization.
//!
//! `Markup` is an opaque tree of elements, text, and raw HTML. Pages and
//! shells build trees; nothing is stringified until the document assembler
//! (or a streaming caller) pulls chunks out of [`Chunks`].
//!
//! Text nodes are entity-escaped at serialization time; `raw()` bypasses
//! escaping for trusted HTML. A shell positions the page body with
//! [`page_slot`], which serializes to the page marker comment.

use std::borrow::Cow;

use crate::document::PAGE_MARKER;
use crate::utils::html::{escape, escape_attr, is_void_element};

// =============================================================================
// Tree
// =============================================================================

/// A single node in a markup tree.
#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    /// Text content, escaped at serialization time.
    Text(String),
    /// Trusted HTML emitted verbatim.
    Raw(String),
    Fragment(Vec<Node>),
    /// Placeholder the document assembler replaces with the page body.
    PageSlot,
}

/// An element node: tag, attributes, children.
#[derive(Debug, Clone)]
pub struct Element {
    tag: Cow<'static, str>,
    attrs: Vec<(Cow<'static, str>, String)>,
    children: Vec<Node>,
}

/// Start building an element.
pub fn el(tag: impl Into<Cow<'static, str>>) -> Element {
    Element {
        tag: tag.into(),
        attrs: Vec::new(),
        children: Vec::new(),
    }
}

/// A text node (escaped on output).
pub fn text(content: impl Into<String>) -> Node {
    Node::Text(content.into())
}

/// A raw HTML node (emitted verbatim, caller vouches for safety).
pub fn raw(html: impl Into<String>) -> Node {
    Node::Raw(html.into())
}

/// A sequence of sibling nodes with no wrapping element.
pub fn fragment(nodes: impl IntoIterator<Item = Node>) -> Node {
    Node::Fragment(nodes.into_iter().collect())
}

/// The position where the page body is spliced into a shell.
pub fn page_slot() -> Node {
    Node::PageSlot
}

impl Element {
    /// Add an attribute. Values are escaped on output.
    pub fn attr(mut self, name: impl Into<Cow<'static, str>>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Append a child node.
    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    /// Append multiple child nodes.
    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(nodes);
        self
    }

    /// Append a text child (escaped on output).
    pub fn text(self, content: impl Into<String>) -> Self {
        self.child(Node::Text(content.into()))
    }
}

impl From<Element> for Node {
    fn from(e: Element) -> Self {
        Node::Element(e)
    }
}

/// A complete markup value as returned by a page, head, or shell render.
#[derive(Debug, Clone)]
pub struct Markup {
    root: Node,
}

impl Markup {
    pub fn new(root: impl Into<Node>) -> Self {
        Self { root: root.into() }
    }

    /// Defer serialization: produce the chunk sequence for this tree.
    pub fn chunks(self) -> Chunks {
        Chunks {
            stack: vec![Frame::Node(self.root)],
        }
    }
}

impl From<Element> for Markup {
    fn from(e: Element) -> Self {
        Self::new(Node::Element(e))
    }
}

impl From<Node> for Markup {
    fn from(root: Node) -> Self {
        Self::new(root)
    }
}

// =============================================================================
// Chunk sequence
// =============================================================================

/// Finite, single-pass sequence of serialized string chunks.
///
/// Streaming callers iterate; non-streaming callers use [`Chunks::drain`].
/// The sequence is consumed as it is pulled - it cannot be replayed.
#[derive(Debug)]
pub struct Chunks {
    stack: Vec<Frame>,
}

#[derive(Debug)]
enum Frame {
    Node(Node),
    /// Pre-rendered literal, e.g. a closing tag.
    Lit(String),
}

impl Chunks {
    /// A sequence that yields nothing.
    pub fn empty() -> Self {
        Self { stack: Vec::new() }
    }

    /// A sequence yielding one pre-rendered chunk verbatim.
    pub fn raw(html: impl Into<String>) -> Self {
        Self {
            stack: vec![Frame::Lit(html.into())],
        }
    }

    /// Fully materialize the remaining chunks into one string.
    pub fn drain(self) -> String {
        self.collect()
    }
}

impl Iterator for Chunks {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while let Some(frame) = self.stack.pop() {
            match frame {
                Frame::Lit(s) => return Some(s),
                Frame::Node(Node::Text(t)) => {
                    if !t.is_empty() {
                        return Some(escape(&t).into_owned());
                    }
                }
                Frame::Node(Node::Raw(r)) => {
                    if !r.is_empty() {
                        return Some(r);
                    }
                }
                Frame::Node(Node::PageSlot) => return Some(PAGE_MARKER.to_string()),
                Frame::Node(Node::Fragment(children)) => {
                    self.stack
                        .extend(children.into_iter().rev().map(Frame::Node));
                }
                Frame::Node(Node::Element(element)) => {
                    let open = open_tag(&element);
                    if is_void_element(&element.tag) {
                        // Void elements have no closing tag; children are not
                        // serialized.
                        return Some(open);
                    }
                    self.stack.push(Frame::Lit(format!("</{}>", element.tag)));
                    self.stack
                        .extend(element.children.into_iter().rev().map(Frame::Node));
                    return Some(open);
                }
            }
        }
        None
    }
}

fn open_tag(element: &Element) -> String {
    let mut out = String::with_capacity(element.tag.len() + 2);
    out.push('<');
    out.push_str(&element.tag);
    for (name, value) in &element.attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }
    out.push('>');
    out
}
