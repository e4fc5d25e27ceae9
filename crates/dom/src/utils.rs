//! Utility functions for node handling

use kuchikiki::{NodeData, NodeRef};

/// Lowercase local name for element nodes
pub fn tag_name(node: &NodeRef) -> Option<String> {
    node.as_element()
        .map(|element| element.name.local.to_string().to_ascii_lowercase())
}

/// Check if node is an element
pub fn is_element(node: &NodeRef) -> bool {
    node.as_element().is_some()
}

/// Check if node is the document node
pub fn is_document(node: &NodeRef) -> bool {
    node.as_document().is_some()
}

/// Element children only (text/comment nodes skipped), in document order
pub fn element_children(node: &NodeRef) -> impl Iterator<Item = NodeRef> {
    node.children().filter(is_element)
}

/// Attribute value of an element
pub fn get_attr(node: &NodeRef, name: &str) -> Option<String> {
    node.as_element()
        .and_then(|element| element.attributes.borrow().get(name).map(String::from))
}

/// Get all text content from node and its descendants
pub fn get_text_content(node: &NodeRef) -> String {
    node.text_contents()
}

/// Copy a single node without its children
fn shallow_clone(node: &NodeRef) -> NodeRef {
    match node.data() {
        NodeData::Element(element) => NodeRef::new_element(
            element.name.clone(),
            element.attributes.borrow().map.clone(),
        ),
        NodeData::Text(text) => NodeRef::new_text(text.borrow().clone()),
        NodeData::Comment(comment) => NodeRef::new_comment(comment.borrow().clone()),
        NodeData::ProcessingInstruction(contents) => {
            let contents = contents.borrow();
            NodeRef::new_processing_instruction(contents.0.clone(), contents.1.clone())
        }
        NodeData::Doctype(doctype) => NodeRef::new_doctype(
            doctype.name.clone(),
            doctype.public_id.clone(),
            doctype.system_id.clone(),
        ),
        NodeData::Document(_) => NodeRef::new_document(),
        NodeData::DocumentFragment => NodeRef::new(NodeData::DocumentFragment),
    }
}

/// Node.cloneNode(deep): an independent, detached copy
///
/// Iterative, no recursion: deep trees can't overflow the stack.
pub fn clone_node(node: &NodeRef, deep: bool) -> NodeRef {
    let root = shallow_clone(node);
    if !deep {
        return root;
    }

    let mut stack = vec![(node.clone(), root.clone())];
    while let Some((source, copy)) = stack.pop() {
        for child in source.children() {
            let child_copy = shallow_clone(&child);
            copy.append(child_copy.clone());
            stack.push((child, child_copy));
        }
    }

    root
}

/// Remove every child node; a no-op on empty nodes
pub fn remove_children(node: &NodeRef) {
    while let Some(child) = node.first_child() {
        child.detach();
    }
}
