//! Traversal - new Collections derived from an existing one
//!
//! Selector matching always goes through the host engine (`Selector`).
//! `parent`, `parents` and `parents_until` de-duplicate across the whole
//! result; `siblings` and `find` keep cross-element duplicates.

use crate::collection::Collection;
use crate::error::{Error, Result};
use ahash::AHashSet;
use qlib_dom::utils::{element_children, is_document};
use qlib_dom::{node_key, NodeKey, NodeRef, Selector};

/// Insertion-ordered, identity-unique node list
#[derive(Default)]
struct UniqueNodes {
    seen: AHashSet<NodeKey>,
    nodes: Vec<NodeRef>,
}

impl UniqueNodes {
    fn push(&mut self, node: NodeRef) {
        // Every node is alive for the whole traversal, so addresses are stable
        if self.seen.insert(node_key(&node)) {
            self.nodes.push(node);
        }
    }
}

impl Collection {
    /// Collection over element 0, empty if there is none
    pub fn first(&self) -> Collection {
        self.derive(self.nodes().iter().take(1).cloned().collect())
    }

    /// Immediate element children matching `selector` (all by default)
    pub fn children<'s>(&self, selector: impl Into<Option<&'s str>>) -> Result<Collection> {
        let selector = Selector::parse_optional(selector.into())?;
        let nodes = self
            .iter()
            .flat_map(element_children)
            .filter(|child| selector.matches(child))
            .collect();
        Ok(self.derive(nodes))
    }

    /// Sibling elements, excluding each element itself
    pub fn siblings<'s>(&self, selector: impl Into<Option<&'s str>>) -> Result<Collection> {
        let selector = Selector::parse_optional(selector.into())?;
        let mut nodes = Vec::new();
        for node in self {
            let Some(parent) = node.parent() else {
                continue;
            };
            nodes.extend(
                element_children(&parent)
                    .filter(|sibling| sibling != node && selector.matches(sibling)),
            );
        }
        Ok(self.derive(nodes))
    }

    /// Immediate parents, each once
    pub fn parent(&self) -> Collection {
        let mut unique = UniqueNodes::default();
        for parent in self.iter().filter_map(|node| node.parent()) {
            unique.push(parent);
        }
        self.derive(unique.nodes)
    }

    /// Ancestors below the document node, nearest first, each once
    pub fn parents<'s>(&self, selector: impl Into<Option<&'s str>>) -> Result<Collection> {
        let selector = Selector::parse_optional(selector.into())?;
        let mut unique = UniqueNodes::default();
        for node in self {
            for ancestor in node.ancestors() {
                if is_document(&ancestor) {
                    break;
                }
                if selector.matches(&ancestor) {
                    unique.push(ancestor);
                }
            }
        }
        Ok(self.derive(unique.nodes))
    }

    /// Ancestors up to (excluding) the first one matching `selector`;
    /// without a selector the walk stops below the root element
    pub fn parents_until<'s>(&self, selector: impl Into<Option<&'s str>>) -> Result<Collection> {
        let stop = selector.into().map(Selector::parse).transpose()?;
        let root_element = self.document().document_element();
        let mut unique = UniqueNodes::default();

        for node in self {
            for ancestor in node.ancestors() {
                if is_document(&ancestor) || root_element.as_ref() == Some(&ancestor) {
                    break;
                }
                if stop.as_ref().map_or(false, |stop| stop.matches(&ancestor)) {
                    break;
                }
                unique.push(ancestor);
            }
        }
        Ok(self.derive(unique.nodes))
    }

    /// Slice `[index, index + count)`, clamped to the Collection.
    /// `count` defaults to 1; a negative count takes everything after `index`.
    pub fn eq(&self, index: isize, count: Option<isize>) -> Result<Collection> {
        if index < 0 {
            return Err(Error::InvalidArgument(format!(
                "eq index must be >= 0, got {}",
                index
            )));
        }
        let len = self.len();
        let start = (index as usize).min(len);
        let end = match count.unwrap_or(1) {
            count if count < 0 => len,
            count => start.saturating_add(count as usize).min(len),
        };
        Ok(self.derive(self.nodes()[start..end].to_vec()))
    }

    /// Keep elements matching `selector`, in order
    pub fn filter(&self, selector: &str) -> Result<Collection> {
        let selector = Selector::parse(selector)?;
        let nodes = self
            .iter()
            .filter(|node| selector.matches(node))
            .cloned()
            .collect();
        Ok(self.derive(nodes))
    }

    /// Descendants of every element matching `selector`, concatenated
    pub fn find(&self, selector: &str) -> Result<Collection> {
        let selector = Selector::parse(selector)?;
        let nodes = self
            .iter()
            .flat_map(|node| selector.select_descendants(node))
            .collect();
        Ok(self.derive(nodes))
    }

    /// Call `callback` with each index and a one-element Collection
    pub fn each<F>(&self, mut callback: F) -> &Self
    where
        F: FnMut(usize, Collection),
    {
        for (index, node) in self.iter().enumerate() {
            callback(index, self.derive(vec![node.clone()]));
        }
        self
    }
}
