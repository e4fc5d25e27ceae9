//! Inline and computed style
//!
//! Inline style lives in the `style` attribute, parsed on access.
//! Scripts address properties in camel case (`backgroundColor`), the
//! attribute stores them hyphenated (`background-color`).
//!
//! Computed style = inline declarations over per-tag defaults. There are no
//! stylesheets in the host, so the cascade is two levels deep.

use crate::types::{Edges, BLOCK_ELEMENTS, HIDDEN_ELEMENTS, SPECIAL_DISPLAY};
use crate::utils::{get_attr, tag_name};
use ahash::AHashMap;
use kuchikiki::NodeRef;

/// `background-color` → `backgroundColor`, `float` → `cssFloat`
pub fn to_camel_case(name: &str) -> String {
    let name = name.trim();
    if name == "float" {
        return "cssFloat".to_string();
    }

    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// `backgroundColor` → `background-color`, `cssFloat` → `float`
///
/// Already-hyphenated names pass through lowercased.
pub fn to_kebab_case(name: &str) -> String {
    let name = name.trim();
    if name == "cssFloat" {
        return "float".to_string();
    }

    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Leading numeric part of a CSS length, like `parseFloat`
pub fn parse_px(value: &str) -> Option<f64> {
    let value = value.trim();
    let end = value
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || ((c == '-' || c == '+') && i == 0)))
        .map(|(i, _)| i)
        .unwrap_or(value.len());
    value[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parsed `style` attribute, declarations in source order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle {
    declarations: Vec<(String, String)>,
}

impl InlineStyle {
    pub fn parse(text: &str) -> Self {
        let mut style = Self::default();
        for declaration in text.split(';') {
            let Some((name, value)) = declaration.split_once(':') else {
                continue;
            };
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim();
            if !name.is_empty() && !value.is_empty() {
                style.set(&name, value);
            }
        }
        style
    }

    pub fn of(node: &NodeRef) -> Self {
        get_attr(node, "style")
            .map(|text| Self::parse(&text))
            .unwrap_or_default()
    }

    /// Lookup by hyphenated name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Replace in place, or append a new declaration
    pub fn set(&mut self, name: &str, value: &str) {
        match self.declarations.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => self
                .declarations
                .push((name.to_string(), value.to_string())),
        }
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.declarations.len();
        self.declarations.retain(|(n, _)| n != name);
        before != self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations
            .iter()
            .map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// `color: red; display: block;`
    pub fn serialize(&self) -> String {
        self.declarations
            .iter()
            .map(|(n, v)| format!("{}: {};", n, v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Default `display` for a tag
pub fn default_display(tag: &str) -> &'static str {
    if HIDDEN_ELEMENTS.contains(&tag) {
        return "none";
    }
    if BLOCK_ELEMENTS.contains(&tag) {
        return "block";
    }
    SPECIAL_DISPLAY
        .iter()
        .find(|(t, _)| *t == tag)
        .map(|(_, display)| *display)
        .unwrap_or("inline")
}

/// Initial values for the properties the host resolves
const INITIAL_VALUES: &[(&str, &str)] = &[
    ("position", "static"),
    ("visibility", "visible"),
    ("opacity", "1"),
    ("float", "none"),
    ("width", "auto"),
    ("height", "auto"),
    ("top", "auto"),
    ("left", "auto"),
    ("bottom", "auto"),
    ("right", "auto"),
    ("margin-top", "0px"),
    ("margin-right", "0px"),
    ("margin-bottom", "0px"),
    ("margin-left", "0px"),
    ("padding-top", "0px"),
    ("padding-right", "0px"),
    ("padding-bottom", "0px"),
    ("padding-left", "0px"),
    ("border-top-width", "0px"),
    ("border-right-width", "0px"),
    ("border-bottom-width", "0px"),
    ("border-left-width", "0px"),
];

/// Resolved style of one element (getComputedStyle)
#[derive(Debug, Clone, Default)]
pub struct ComputedStyle {
    values: AHashMap<String, String>,
}

impl ComputedStyle {
    pub fn of(node: &NodeRef) -> Self {
        let mut values: AHashMap<String, String> = INITIAL_VALUES
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect();

        let Some(tag) = tag_name(node) else {
            return Self { values };
        };
        values.insert("display".to_string(), default_display(&tag).to_string());

        let inline = InlineStyle::of(node);
        for (name, value) in inline.iter() {
            expand_into(&mut values, name, value);
        }

        Self { values }
    }

    /// Lookup by camel-case or hyphenated name; unknown properties are ""
    pub fn get(&self, name: &str) -> String {
        self.values
            .get(&to_kebab_case(name))
            .cloned()
            .unwrap_or_default()
    }

    /// Numeric px value, `None` for `auto` and other keywords
    pub fn px(&self, name: &str) -> Option<f64> {
        parse_px(&self.get(name))
    }

    pub fn display(&self) -> String {
        self.get("display")
    }

    pub fn position(&self) -> String {
        self.get("position")
    }

    pub fn margin(&self) -> Edges {
        self.edges("margin-", "")
    }

    pub fn padding(&self) -> Edges {
        self.edges("padding-", "")
    }

    pub fn border(&self) -> Edges {
        self.edges("border-", "-width")
    }

    fn edges(&self, prefix: &str, suffix: &str) -> Edges {
        let side = |s: &str| self.px(&format!("{}{}{}", prefix, s, suffix)).unwrap_or(0.0);
        Edges {
            top: side("top"),
            right: side("right"),
            bottom: side("bottom"),
            left: side("left"),
        }
    }
}

/// Expand the shorthands the box model reads (`margin`, `padding`,
/// `border-width`), then store the declaration itself
fn expand_into(values: &mut AHashMap<String, String>, name: &str, value: &str) {
    let sides = ["top", "right", "bottom", "left"];
    let longhand = match name {
        "margin" => Some(("margin-", "")),
        "padding" => Some(("padding-", "")),
        "border-width" => Some(("border-", "-width")),
        _ => None,
    };

    if let Some((prefix, suffix)) = longhand {
        let parts: Vec<&str> = value.split_whitespace().collect();
        let pick = |i: usize| match parts.len() {
            1 => parts.first().copied(),
            2 => parts.get(i % 2).copied(),
            3 => parts.get(if i == 3 { 1 } else { i }).copied(),
            4 => parts.get(i).copied(),
            _ => None,
        };
        for (i, side) in sides.iter().enumerate() {
            if let Some(part) = pick(i) {
                values.insert(format!("{}{}{}", prefix, side, suffix), part.to_string());
            }
        }
    }

    values.insert(name.to_string(), value.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_conversion() {
        assert_eq!(to_camel_case("background-color"), "backgroundColor");
        assert_eq!(to_camel_case("float"), "cssFloat");
        assert_eq!(to_kebab_case("backgroundColor"), "background-color");
        assert_eq!(to_kebab_case("cssFloat"), "float");
        assert_eq!(to_kebab_case("margin-top"), "margin-top");
    }

    #[test]
    fn test_parse_px() {
        assert_eq!(parse_px("10px"), Some(10.0));
        assert_eq!(parse_px("-2.5px"), Some(-2.5));
        assert_eq!(parse_px("auto"), None);
        assert_eq!(parse_px(""), None);
    }

    #[test]
    fn test_inline_style_round_trip() {
        let mut style = InlineStyle::parse("color: red; display:block;;bogus");
        assert_eq!(style.get("color"), Some("red"));
        style.set("color", "blue");
        style.set("margin-top", "4px");
        assert!(style.remove("display"));
        assert_eq!(style.serialize(), "color: blue; margin-top: 4px;");
    }

    #[test]
    fn test_shorthand_expansion() {
        let mut values = AHashMap::new();
        expand_into(&mut values, "margin", "1px 2px 3px");
        assert_eq!(values["margin-top"], "1px");
        assert_eq!(values["margin-right"], "2px");
        assert_eq!(values["margin-bottom"], "3px");
        assert_eq!(values["margin-left"], "2px");
    }

    #[test]
    fn test_default_display() {
        assert_eq!(default_display("div"), "block");
        assert_eq!(default_display("span"), "inline");
        assert_eq!(default_display("li"), "list-item");
        assert_eq!(default_display("script"), "none");
    }
}
