//! Style and box geometry
//!
//! Reads go through the host's computed style and layout; writes are
//! inline style declarations. Property names may be hyphenated or camel
//! case; they are normalized to camel case (`float` becomes `cssFloat`).

use crate::collection::Collection;
use crate::error::{Error, Result};
use qlib_dom::style::to_camel_case;
use qlib_dom::utils::is_element;
use qlib_dom::NodeRef;
use serde::{Deserialize, Serialize};

/// Viewport position of an element's border box
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    pub top: f64,
    pub left: f64,
}

/// Border box edges relative to the offset parent
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

/// Edges to write with `set_position`; `None` leaves an edge alone
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionUpdate {
    pub top: Option<f64>,
    pub left: Option<f64>,
    pub bottom: Option<f64>,
    pub right: Option<f64>,
}

#[derive(Clone, Copy)]
enum Axis {
    Vertical,
    Horizontal,
}

fn px(value: f64) -> String {
    format!("{}px", value)
}

fn property_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidArgument("empty style property".to_string()));
    }
    Ok(to_camel_case(name))
}

impl Collection {
    fn elements(&self) -> impl Iterator<Item = &NodeRef> {
        self.iter().filter(|node| is_element(node))
    }

    /// Computed value of element 0
    pub fn css(&self, name: &str) -> Result<String> {
        let node = self.first_node("css")?;
        let name = property_name(name)?;
        Ok(self.document().computed_style(node).get(&name))
    }

    /// Inline style on every element; an empty value removes the declaration
    pub fn set_css(&self, name: &str, value: &str) -> Result<&Self> {
        let name = property_name(name)?;
        for node in self.elements() {
            self.document().set_style(node, &name, value)?;
        }
        Ok(self)
    }

    /// Several declarations on every element; all names are checked first
    pub fn set_css_map<I, K, V>(&self, declarations: I) -> Result<&Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let declarations = declarations
            .into_iter()
            .map(|(name, value)| Ok((property_name(name.as_ref())?, value.as_ref().to_string())))
            .collect::<Result<Vec<_>>>()?;
        for node in self.elements() {
            for (name, value) in &declarations {
                self.document().set_style(node, name, value)?;
            }
        }
        Ok(self)
    }

    /// Force `display` to the configured visible value
    pub fn show(&self) -> &Self {
        let display = self.ctx.config.show_display.clone();
        self.force_display(&display)
    }

    /// Force `display: none`
    pub fn hide(&self) -> &Self {
        self.force_display("none")
    }

    fn force_display(&self, display: &str) -> &Self {
        for node in self.elements() {
            if let Err(err) = self.document().set_style(node, "display", display) {
                tracing::warn!(error = %err, "Failed to set display");
            }
        }
        self
    }

    // ---- Geometry -----------------------------------------------------

    /// offsetHeight of element 0, plus vertical margins if asked
    pub fn outer_height(&self, include_margin: bool) -> Result<f64> {
        self.outer_size(Axis::Vertical, include_margin, "outer_height")
    }

    /// offsetWidth of element 0, plus horizontal margins if asked
    pub fn outer_width(&self, include_margin: bool) -> Result<f64> {
        self.outer_size(Axis::Horizontal, include_margin, "outer_width")
    }

    fn outer_size(&self, axis: Axis, include_margin: bool, op: &'static str) -> Result<f64> {
        let node = self.first_node(op)?;
        let document = self.document();
        let style = document.computed_style(node);
        let (size, margin) = match axis {
            Axis::Vertical => (document.offset_height(node), style.margin().vertical()),
            Axis::Horizontal => (document.offset_width(node), style.margin().horizontal()),
        };
        Ok(if include_margin { size + margin } else { size })
    }

    /// Size every element so its border box is `value` tall
    pub fn set_outer_height(&self, value: f64) -> Result<&Self> {
        self.set_outer_size(Axis::Vertical, value)
    }

    /// Size every element so its border box is `value` wide
    pub fn set_outer_width(&self, value: f64) -> Result<&Self> {
        self.set_outer_size(Axis::Horizontal, value)
    }

    fn set_outer_size(&self, axis: Axis, value: f64) -> Result<&Self> {
        if !value.is_finite() {
            return Err(Error::InvalidArgument(format!("invalid size {}", value)));
        }
        let document = self.document();
        for node in self.elements() {
            let style = document.computed_style(node);
            let (property, extra) = match axis {
                Axis::Vertical => ("height", style.padding().vertical() + style.border().vertical()),
                Axis::Horizontal => {
                    ("width", style.padding().horizontal() + style.border().horizontal())
                }
            };
            document.set_style(node, property, &px((value - extra).max(0.0)))?;
        }
        Ok(self)
    }

    /// Viewport position of element 0
    pub fn offset(&self) -> Result<Offset> {
        let node = self.first_node("offset")?;
        let rect = self.document().bounding_client_rect(node);
        Ok(Offset {
            top: rect.top(),
            left: rect.left(),
        })
    }

    /// Move every element: `top`/`left` minus its margins, switching static
    /// elements to `position: absolute`
    pub fn set_offset(&self, offset: Offset) -> Result<&Self> {
        let document = self.document();
        for node in self.elements() {
            let style = document.computed_style(node);
            let margin = style.margin();
            if style.position() == "static" {
                document.set_style(node, "position", "absolute")?;
            }
            document.set_style(node, "top", &px(offset.top - margin.top))?;
            document.set_style(node, "left", &px(offset.left - margin.left))?;
        }
        Ok(self)
    }

    /// Border box edges of element 0 inside its parent
    pub fn position(&self) -> Result<Position> {
        let node = self.first_node("position")?;
        let document = self.document();
        let top = document.offset_top(node);
        let left = document.offset_left(node);
        Ok(Position {
            top,
            left,
            bottom: top + document.offset_height(node),
            right: left + document.offset_width(node),
        })
    }

    /// Write the given edges as px on every element
    pub fn set_position(&self, update: PositionUpdate) -> Result<&Self> {
        let edges = [
            ("top", update.top),
            ("left", update.left),
            ("bottom", update.bottom),
            ("right", update.right),
        ];
        for node in self.elements() {
            for (edge, value) in edges {
                if let Some(value) = value {
                    self.document().set_style(node, edge, &px(value))?;
                }
            }
        }
        Ok(self)
    }
}
