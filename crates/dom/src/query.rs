//! Selector matching - delegated to the page's CSS engine
//!
//! kuchikiki compiles selector lists with Servo's `selectors` crate.
//! This module only wraps it: no selector grammar lives here.

use crate::error::{DomError, Result};
use kuchikiki::{NodeRef, Selectors};
use std::fmt;
use std::rc::Rc;

/// A compiled selector list, or the match-all selector
#[derive(Clone)]
pub struct Selector {
    source: String,
    compiled: Option<Rc<Selectors>>,
}

impl Selector {
    /// Matches every element (`*`) without going through the engine
    pub fn any() -> Self {
        Self {
            source: "*".to_string(),
            compiled: None,
        }
    }

    pub fn parse(source: &str) -> Result<Self> {
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return Err(DomError::InvalidSelector(source.to_string()));
        }
        if trimmed == "*" {
            return Ok(Self::any());
        }

        let compiled = Selectors::compile(trimmed)
            .map_err(|_| DomError::InvalidSelector(source.to_string()))?;
        Ok(Self {
            source: trimmed.to_string(),
            compiled: Some(Rc::new(compiled)),
        })
    }

    /// `None` means match-all
    pub fn parse_optional(source: Option<&str>) -> Result<Self> {
        match source {
            Some(source) => Self::parse(source),
            None => Ok(Self::any()),
        }
    }

    /// Element.matches(); always false for non-element nodes
    pub fn matches(&self, node: &NodeRef) -> bool {
        let Some(element) = node.clone().into_element_ref() else {
            return false;
        };
        match &self.compiled {
            Some(selectors) => selectors.matches(&element),
            None => true,
        }
    }

    /// querySelectorAll from `scope`: matching descendants in document order
    pub fn select_descendants(&self, scope: &NodeRef) -> Vec<NodeRef> {
        scope
            .descendants()
            .filter(|node| self.matches(node))
            .collect()
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Selector").field(&self.source).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kuchikiki::traits::TendrilSink;

    fn fixture() -> NodeRef {
        kuchikiki::parse_html()
            .one("<ul id='list'><li class='a'>1</li><li class='b'><span>2</span></li></ul>")
    }

    #[test]
    fn test_matches_elements_only() {
        let doc = fixture();
        let li = Selector::parse("li.b").unwrap();
        let hits = li.select_descendants(&doc);
        assert_eq!(hits.len(), 1);

        let text = NodeRef::new_text("li");
        assert!(!Selector::any().matches(&text));
    }

    #[test]
    fn test_descendant_order() {
        let doc = fixture();
        let all = Selector::parse("#list > li").unwrap();
        let hits = all.select_descendants(&doc);
        let classes: Vec<String> = hits
            .iter()
            .filter_map(|n| n.as_element())
            .filter_map(|e| e.attributes.borrow().get("class").map(String::from))
            .collect();
        assert_eq!(classes, vec!["a", "b"]);
    }

    #[test]
    fn test_invalid_selector() {
        assert!(matches!(
            Selector::parse("li[[["),
            Err(DomError::InvalidSelector(_))
        ));
        assert!(Selector::parse("   ").is_err());
        let doc = fixture();
        let elements = doc.descendants().filter(|n| n.as_element().is_some()).count();
        assert_eq!(Selector::parse(" * ").unwrap().select_descendants(&doc).len(), elements);
    }
}
