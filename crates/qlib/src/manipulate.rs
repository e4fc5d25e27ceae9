//! Content and structure mutation
//!
//! Getters read element 0; setters apply to every element in order.
//! Insertion accepts markup or nodes: the original node goes to element 0,
//! every later element receives a deep clone.

use crate::collection::Collection;
use crate::error::{Error, Result};
use crate::value::Value;
use qlib_dom::serializer::inner_html;
use qlib_dom::utils::{clone_node, get_attr, get_text_content, remove_children, tag_name};
use qlib_dom::{InsertPosition, NodeRef};

/// Something to insert next to or inside each element
#[derive(Debug, Clone)]
pub enum Content {
    /// HTML, parsed once per receiving element
    Markup(String),
    Node(NodeRef),
    /// Contributes its element 0
    Nodes(Collection),
}

impl From<&str> for Content {
    fn from(value: &str) -> Self {
        Content::Markup(value.to_string())
    }
}

impl From<String> for Content {
    fn from(value: String) -> Self {
        Content::Markup(value)
    }
}

impl From<&String> for Content {
    fn from(value: &String) -> Self {
        Content::Markup(value.clone())
    }
}

impl From<NodeRef> for Content {
    fn from(value: NodeRef) -> Self {
        Content::Node(value)
    }
}

impl From<&NodeRef> for Content {
    fn from(value: &NodeRef) -> Self {
        Content::Node(value.clone())
    }
}

impl From<Collection> for Content {
    fn from(value: Collection) -> Self {
        Content::Nodes(value)
    }
}

impl From<&Collection> for Content {
    fn from(value: &Collection) -> Self {
        Content::Nodes(value.clone())
    }
}

fn is_checkable(node: &NodeRef) -> bool {
    matches!(
        get_attr(node, "type")
            .map(|kind| kind.to_ascii_lowercase())
            .as_deref(),
        Some("checkbox" | "radio")
    )
}

impl Collection {
    /// textContent of element 0
    pub fn text(&self) -> Result<String> {
        Ok(get_text_content(self.first_node("text")?))
    }

    /// Replace the children of every element with one text node
    pub fn set_text(&self, text: &str) -> &Self {
        for node in self {
            remove_children(node);
            node.append(NodeRef::new_text(text));
        }
        self
    }

    /// innerHTML of element 0
    pub fn html(&self) -> Result<String> {
        Ok(inner_html(self.first_node("html")?)?)
    }

    /// Replace the children of every element with parsed markup
    pub fn set_html(&self, markup: &str) -> &Self {
        for node in self {
            remove_children(node);
            for child in self.document().parse_fragment(markup) {
                node.append(child);
            }
        }
        self
    }

    /// Insert as the last child of every element
    pub fn append(&self, content: impl Into<Content>) -> Result<&Self> {
        self.insert(content.into(), InsertPosition::BeforeEnd, "append")
    }

    /// Insert as the first child of every element
    pub fn prepend(&self, content: impl Into<Content>) -> Result<&Self> {
        self.insert(content.into(), InsertPosition::AfterBegin, "prepend")
    }

    /// Insert as the previous sibling of every element
    pub fn before(&self, content: impl Into<Content>) -> Result<&Self> {
        self.insert(content.into(), InsertPosition::BeforeBegin, "before")
    }

    /// Insert as the next sibling of every element
    pub fn after(&self, content: impl Into<Content>) -> Result<&Self> {
        self.insert(content.into(), InsertPosition::AfterEnd, "after")
    }

    fn insert(&self, content: Content, position: InsertPosition, op: &str) -> Result<&Self> {
        let source = match content {
            Content::Markup(markup) => {
                for node in self {
                    self.document()
                        .insert_adjacent_html(node, position, &markup)?;
                }
                return Ok(self);
            }
            Content::Node(node) => node,
            Content::Nodes(collection) => collection.get(0).cloned().ok_or_else(|| {
                Error::InvalidArgument(format!("{} needs a non-empty collection", op))
            })?,
        };

        for (index, target) in self.iter().enumerate() {
            let node = if index == 0 {
                source.clone()
            } else {
                clone_node(&source, true)
            };
            self.document().insert_adjacent(target, position, vec![node])?;
        }
        tracing::trace!(op, targets = self.len(), "Inserted node");
        Ok(self)
    }

    /// Remove every child node of every element
    pub fn clear(&self) -> &Self {
        for node in self {
            remove_children(node);
        }
        self
    }

    /// Value of input element 0: the checked state for checkboxes and
    /// radios, the `value` attribute otherwise.
    ///
    /// Any other element reads as the empty string.
    pub fn val(&self) -> Result<Value> {
        let node = self.first_node("val")?;
        if tag_name(node).as_deref() != Some("input") {
            return Ok(Value::String(String::new()));
        }
        if is_checkable(node) {
            return Ok(Value::Bool(get_attr(node, "checked").is_some()));
        }
        Ok(Value::String(get_attr(node, "value").unwrap_or_default()))
    }

    /// Write the value of every input element; other elements are skipped
    pub fn set_val(&self, value: impl Into<Value>) -> &Self {
        let value = value.into();
        for node in self {
            if tag_name(node).as_deref() != Some("input") {
                continue;
            }
            let Some(element) = node.as_element() else {
                continue;
            };
            let checkable = is_checkable(node);
            let mut attributes = element.attributes.borrow_mut();
            if checkable {
                if value.is_truthy() {
                    attributes.insert("checked", String::new());
                } else {
                    attributes.remove("checked");
                }
            } else {
                attributes.insert("value", value.to_string());
            }
        }
        self
    }

    /// Detach every element from its parent
    pub fn remove(self) {
        for node in &self {
            node.detach();
        }
        tracing::trace!(count = self.len(), "Removed nodes");
    }

    /// Independent copies of every element; `deep` copies their subtrees
    pub fn clone_nodes(&self, deep: bool) -> Collection {
        self.derive(self.iter().map(|node| clone_node(node, deep)).collect())
    }
}
