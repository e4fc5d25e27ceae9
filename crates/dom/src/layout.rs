//! Box geometry - a block-flow model sized from computed style
//!
//! ```text
//! margin box ⊃ border box (offset*) ⊃ padding box (client*) ⊃ content
//! ```
//!
//! - Explicit px sizes win; `auto` height = sum of in-flow children's
//!   margin boxes; `auto` width of a block fills its containing block
//! - Static elements stack below their previous in-flow siblings
//! - Positioned elements use `top`/`left`
//! - Offsets are relative to the parent's content box; the root element's
//!   parent is the viewport
//! - `display: none` collapses everything to zero

use crate::document::Document;
use crate::style::ComputedStyle;
use crate::types::DomRect;
use crate::utils::{element_children, is_element};
use kuchikiki::NodeRef;

fn is_rendered(style: &ComputedStyle) -> bool {
    style.display() != "none"
}

/// Takes part in normal flow (affects siblings and parent auto height)
fn is_in_flow(style: &ComputedStyle) -> bool {
    is_rendered(style) && !matches!(style.position().as_str(), "absolute" | "fixed")
}

impl Document {
    pub fn computed_style(&self, node: &NodeRef) -> ComputedStyle {
        ComputedStyle::of(node)
    }

    fn content_height(&self, node: &NodeRef, style: &ComputedStyle) -> f64 {
        if !is_rendered(style) {
            return 0.0;
        }
        if let Some(height) = style.px("height") {
            return height.max(0.0);
        }
        element_children(node)
            .map(|child| {
                let child_style = ComputedStyle::of(&child);
                if is_in_flow(&child_style) {
                    self.margin_box_height(&child, &child_style)
                } else {
                    0.0
                }
            })
            .sum()
    }

    fn content_width(&self, node: &NodeRef, style: &ComputedStyle) -> f64 {
        if !is_rendered(style) {
            return 0.0;
        }
        if let Some(width) = style.px("width") {
            return width.max(0.0);
        }
        if style.display() == "inline" {
            return 0.0;
        }

        let containing = match node.parent().filter(is_element) {
            Some(parent) => {
                let parent_style = ComputedStyle::of(&parent);
                self.content_width(&parent, &parent_style)
            }
            None => self.config().viewport_width,
        };
        let used = style.margin().horizontal()
            + style.padding().horizontal()
            + style.border().horizontal();
        (containing - used).max(0.0)
    }

    fn margin_box_height(&self, node: &NodeRef, style: &ComputedStyle) -> f64 {
        self.border_box_height(node, style) + style.margin().vertical()
    }

    fn border_box_height(&self, node: &NodeRef, style: &ComputedStyle) -> f64 {
        if !is_rendered(style) {
            return 0.0;
        }
        self.content_height(node, style) + style.padding().vertical() + style.border().vertical()
    }

    /// offsetHeight: content + padding + border
    pub fn offset_height(&self, node: &NodeRef) -> f64 {
        let style = ComputedStyle::of(node);
        self.border_box_height(node, &style)
    }

    /// offsetWidth: content + padding + border
    pub fn offset_width(&self, node: &NodeRef) -> f64 {
        let style = ComputedStyle::of(node);
        if !is_rendered(&style) {
            return 0.0;
        }
        self.content_width(node, &style) + style.padding().horizontal() + style.border().horizontal()
    }

    /// clientHeight: content + padding
    pub fn client_height(&self, node: &NodeRef) -> f64 {
        let style = ComputedStyle::of(node);
        if !is_rendered(&style) {
            return 0.0;
        }
        self.content_height(node, &style) + style.padding().vertical()
    }

    /// clientWidth: content + padding
    pub fn client_width(&self, node: &NodeRef) -> f64 {
        let style = ComputedStyle::of(node);
        if !is_rendered(&style) {
            return 0.0;
        }
        self.content_width(node, &style) + style.padding().horizontal()
    }

    /// offsetTop relative to the parent's content box
    pub fn offset_top(&self, node: &NodeRef) -> f64 {
        let style = ComputedStyle::of(node);
        if !is_rendered(&style) {
            return 0.0;
        }
        let margin = style.margin().top;
        let top = style.px("top").unwrap_or(0.0);

        match style.position().as_str() {
            "absolute" | "fixed" => top + margin,
            "relative" => self.static_top(node) + margin + top,
            _ => self.static_top(node) + margin,
        }
    }

    /// offsetLeft relative to the parent's content box
    pub fn offset_left(&self, node: &NodeRef) -> f64 {
        let style = ComputedStyle::of(node);
        if !is_rendered(&style) {
            return 0.0;
        }
        let margin = style.margin().left;
        match style.position().as_str() {
            "absolute" | "fixed" | "relative" => style.px("left").unwrap_or(0.0) + margin,
            _ => margin,
        }
    }

    /// Sum of previous in-flow siblings' margin boxes
    fn static_top(&self, node: &NodeRef) -> f64 {
        node.preceding_siblings()
            .filter(is_element)
            .map(|sibling| {
                let style = ComputedStyle::of(&sibling);
                if is_in_flow(&style) {
                    self.margin_box_height(&sibling, &style)
                } else {
                    0.0
                }
            })
            .sum()
    }

    /// getBoundingClientRect: border box in viewport coordinates
    pub fn bounding_client_rect(&self, node: &NodeRef) -> DomRect {
        let style = ComputedStyle::of(node);
        if !is_element(node) || !is_rendered(&style) {
            return DomRect::zero();
        }

        let local = DomRect::new(
            self.offset_left(node),
            self.offset_top(node),
            self.offset_width(node),
            self.offset_height(node),
        );
        if style.position() == "fixed" {
            return local;
        }

        let mut rect = local;
        let mut current = node.parent().filter(is_element);
        while let Some(parent) = current {
            let parent_style = ComputedStyle::of(&parent);
            let dx = self.offset_left(&parent)
                + parent_style.border().left
                + parent_style.padding().left;
            let dy = self.offset_top(&parent)
                + parent_style.border().top
                + parent_style.padding().top;
            rect = rect.offset(dx, dy);
            if parent_style.position() == "fixed" {
                break;
            }
            current = parent.parent().filter(is_element);
        }
        rect
    }
}

#[cfg(test)]
mod tests {
    use crate::document::Document;
    use kuchikiki::NodeRef;

    const PAGE: &str = "<html><head></head><body>\
        <div id='a' style='height: 20px; margin: 5px 0; padding: 2px; border-width: 1px'></div>\
        <div id='b' style='width: 100px; padding-left: 10px'><p id='p' style='height: 7px'></p></div>\
        <div id='c' style='display: none; height: 50px'></div>\
        <div id='d' style='position: absolute; top: 40px; left: 30px; margin-top: 3px; height: 1px'></div>\
        </body></html>";

    fn by_id(doc: &Document, id: &str) -> NodeRef {
        doc.query_selector_all(&format!("#{}", id)).unwrap().remove(0)
    }

    #[test]
    fn test_box_sizes() {
        let doc = Document::parse(PAGE);
        let a = by_id(&doc, "a");
        assert_eq!(doc.offset_height(&a), 26.0);
        assert_eq!(doc.client_height(&a), 24.0);
        // auto width fills the 1024px viewport minus padding and border
        assert_eq!(doc.offset_width(&a), 1024.0);

        let b = by_id(&doc, "b");
        assert_eq!(doc.offset_width(&b), 110.0);
        assert_eq!(doc.offset_height(&b), 7.0);
        assert_eq!(doc.offset_height(&by_id(&doc, "c")), 0.0);
    }

    #[test]
    fn test_flow_offsets() {
        let doc = Document::parse(PAGE);
        let b = by_id(&doc, "b");
        // a: 26px border box + 10px vertical margin
        assert_eq!(doc.offset_top(&b), 36.0);

        let rect = doc.bounding_client_rect(&by_id(&doc, "p"));
        assert_eq!(rect.top(), 36.0);
        assert_eq!(rect.left(), 10.0);
        assert_eq!(rect.height, 7.0);
    }

    #[test]
    fn test_positioned_offsets() {
        let doc = Document::parse(PAGE);
        let d = by_id(&doc, "d");
        assert_eq!(doc.offset_top(&d), 43.0);
        assert_eq!(doc.offset_left(&d), 30.0);
        // body auto height ignores the absolutely positioned and hidden boxes
        let body = doc.body().unwrap();
        assert_eq!(doc.offset_height(&body), 43.0);
    }
}
