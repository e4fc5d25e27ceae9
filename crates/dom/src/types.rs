//! Core type definitions shared by the host document
//!
//! Key design principles:
//! 1. Nodes are kuchikiki `NodeRef`s; identity is the `Rc` pointer
//! 2. Use u32 for listener indices (4 bytes vs 8 bytes pointer)
//! 3. Geometry is plain `f64` CSS pixels

use kuchikiki::NodeRef;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Listener identifier (index into the listener arena)
/// Never reused, so a stale id can not remove someone else's listener
pub type ListenerId = u32;

/// Identity key of a node: the address of its shared allocation
///
/// Only meaningful while the node is alive. Maps keyed by it must also
/// hold a `Weak` to detect reuse of the address.
pub type NodeKey = usize;

pub fn node_key(node: &NodeRef) -> NodeKey {
    Rc::as_ptr(&node.0) as NodeKey
}

/// Rectangle with coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DomRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Move the origin by `(dx, dy)`, keeping the size
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

/// The four sides of a box edge (margin, padding or border widths)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }
}

/// Where `insert_adjacent` places new nodes relative to a target,
/// named after `insertAdjacentHTML` positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsertPosition {
    /// Before the target, as a preceding sibling
    BeforeBegin,
    /// Inside the target, before its first child
    AfterBegin,
    /// Inside the target, after its last child
    BeforeEnd,
    /// After the target, as a following sibling
    AfterEnd,
}

/// Host capabilities a page engine may or may not provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    pub query_selector: bool,
    pub event_listeners: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            query_selector: true,
            event_listeners: true,
        }
    }
}

/// Tags rendered as `display: block` by default
pub const BLOCK_ELEMENTS: &[&str] = &[
    "html",
    "body",
    "address",
    "article",
    "aside",
    "blockquote",
    "dd",
    "details",
    "dialog",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hgroup",
    "hr",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "summary",
    "ul",
];

/// Tags never rendered
pub const HIDDEN_ELEMENTS: &[&str] = &[
    "head", "link", "meta", "script", "style", "template", "title", "base", "noscript",
];

/// Tags with a dedicated default `display`
pub const SPECIAL_DISPLAY: &[(&str, &str)] = &[
    ("li", "list-item"),
    ("table", "table"),
    ("tr", "table-row"),
    ("td", "table-cell"),
    ("th", "table-cell"),
    ("thead", "table-header-group"),
    ("tbody", "table-row-group"),
    ("tfoot", "table-footer-group"),
    ("caption", "table-caption"),
    ("img", "inline-block"),
    ("button", "inline-block"),
    ("input", "inline-block"),
    ("select", "inline-block"),
    ("textarea", "inline-block"),
];
