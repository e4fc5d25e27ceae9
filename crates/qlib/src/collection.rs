//! Collection - an ordered, immutable set of element references
//!
//! Every traversal returns a new Collection; nothing ever edits the node
//! list of an existing one. Operators live in sibling modules as further
//! `impl Collection` blocks:
//! - traverse.rs: children, siblings, parents, eq, filter, find
//! - manipulate.rs: content, insertion, val, remove, clone
//! - attributes.rs: classes, attributes, data
//! - style.rs: css, visibility, geometry
//! - events.rs: on/off/one/trigger

use crate::error::{Error, Result};
use crate::q::{Context, Q};
use qlib_dom::serializer::node_path;
use qlib_dom::{Document, NodeRef};
use std::fmt;
use std::rc::Rc;

#[derive(Clone)]
pub struct Collection {
    pub(crate) ctx: Rc<Context>,
    nodes: Vec<NodeRef>,
}

impl Collection {
    pub(crate) fn new(ctx: Rc<Context>, nodes: Vec<NodeRef>) -> Self {
        Self { ctx, nodes }
    }

    /// New Collection bound to the same document
    pub(crate) fn derive(&self, nodes: Vec<NodeRef>) -> Self {
        Self::new(self.ctx.clone(), nodes)
    }

    pub(crate) fn document(&self) -> &Document {
        &self.ctx.document
    }

    /// Element 0, for getters; `op` names the operation in the error
    pub(crate) fn first_node(&self, op: &'static str) -> Result<&NodeRef> {
        self.nodes.first().ok_or(Error::EmptyCollection(op))
    }

    /// The API handle this Collection was produced by
    pub fn q(&self) -> Q {
        Q::from_context(self.ctx.clone())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&NodeRef> {
        self.nodes.get(index)
    }

    pub fn nodes(&self) -> &[NodeRef] {
        &self.nodes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NodeRef> {
        self.nodes.iter()
    }

    pub fn into_nodes(self) -> Vec<NodeRef> {
        self.nodes
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a NodeRef;
    type IntoIter = std::slice::Iter<'a, NodeRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.nodes.iter().map(node_path))
            .finish()
    }
}
