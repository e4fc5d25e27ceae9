//! DOM Serializer - markup and path strings for nodes
//!
//! This module handles:
//! - innerHTML / outerHTML (html5ever serializer via kuchikiki)
//! - XPath-like paths used to name nodes in logs and debug output

use crate::error::Result;
use crate::utils::tag_name;
use kuchikiki::NodeRef;

/// Markup of the node itself and its subtree
pub fn outer_html(node: &NodeRef) -> Result<String> {
    let mut bytes = Vec::with_capacity(256);
    node.serialize(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Markup of the node's children
pub fn inner_html(node: &NodeRef) -> Result<String> {
    let mut bytes = Vec::with_capacity(256);
    for child in node.children() {
        child.serialize(&mut bytes)?;
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Path for a node: `/html[1]/body[1]/ul[1]/li[2]`
///
/// Position counts preceding siblings with the same tag name (1-indexed).
/// Detached subtrees yield a path rooted at their topmost element.
pub fn node_path(node: &NodeRef) -> String {
    let mut path_parts = Vec::new();
    let mut current = Some(node.clone());

    while let Some(node) = current {
        if let Some(tag) = tag_name(&node) {
            let position = node
                .preceding_siblings()
                .filter(|sibling| tag_name(sibling).as_deref() == Some(tag.as_str()))
                .count()
                + 1;
            path_parts.push(format!("{}[{}]", tag, position));
        } else if node.as_text().is_some() {
            path_parts.push("#text".to_string());
        }
        current = node.parent();
    }

    path_parts.reverse();
    format!("/{}", path_parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kuchikiki::traits::TendrilSink;

    #[test]
    fn test_inner_and_outer_html() {
        let doc = kuchikiki::parse_html().one("<p id='p'>a <b>bold</b> &amp; c</p>");
        let p = doc
            .descendants()
            .find(|n| tag_name(n).as_deref() == Some("p"))
            .unwrap();

        assert_eq!(inner_html(&p).unwrap(), "a <b>bold</b> &amp; c");
        assert_eq!(
            outer_html(&p).unwrap(),
            "<p id=\"p\">a <b>bold</b> &amp; c</p>"
        );
    }

    #[test]
    fn test_node_path() {
        let doc = kuchikiki::parse_html().one("<ul><li>1</li><li>2</li></ul>");
        let second = doc
            .descendants()
            .filter(|n| tag_name(n).as_deref() == Some("li"))
            .nth(1)
            .unwrap();

        assert_eq!(node_path(&second), "/html[1]/body[1]/ul[1]/li[2]");
    }
}
