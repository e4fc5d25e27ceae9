//! Classes, attributes and `data-*` attributes
//!
//! Names are validated before any element is touched. `has_*` checks read
//! element 0 only and succeed if ANY of the space-separated names is present.

use crate::collection::Collection;
use crate::error::{Error, Result};
use crate::value::Value;
use qlib_dom::utils::get_attr;
use qlib_dom::NodeRef;

/// Space-separated list, never empty
fn split_names<'a>(input: &'a str, what: &str) -> Result<Vec<&'a str>> {
    let names: Vec<&str> = input.split_whitespace().collect();
    if names.is_empty() {
        return Err(Error::InvalidArgument(format!("no {} given", what)));
    }
    Ok(names)
}

/// A single attribute name
fn check_name(name: &str) -> Result<String> {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(Error::InvalidArgument(format!(
            "invalid attribute name '{}'",
            name
        )));
    }
    Ok(name.to_ascii_lowercase())
}

fn class_list(node: &NodeRef) -> Vec<String> {
    get_attr(node, "class")
        .map(|classes| classes.split_whitespace().map(String::from).collect())
        .unwrap_or_default()
}

fn write_class_list(node: &NodeRef, classes: &[String]) {
    if let Some(element) = node.as_element() {
        element
            .attributes
            .borrow_mut()
            .insert("class", classes.join(" "));
    }
}

fn write_attr(node: &NodeRef, name: &str, value: &str) {
    if let Some(element) = node.as_element() {
        element.attributes.borrow_mut().insert(name, value.to_string());
    }
}

impl Collection {
    // ---- Classes ------------------------------------------------------

    /// Add each space-separated class to every element, skipping ones
    /// already present
    pub fn add_class(&self, names: &str) -> Result<&Self> {
        let names = split_names(names, "class name")?;
        for node in self {
            let mut classes = class_list(node);
            for name in &names {
                if !classes.iter().any(|class| class == name) {
                    classes.push(name.to_string());
                }
            }
            write_class_list(node, &classes);
        }
        Ok(self)
    }

    /// Remove each space-separated class from every element
    pub fn remove_class(&self, names: &str) -> Result<&Self> {
        let names = split_names(names, "class name")?;
        for node in self {
            let mut classes = class_list(node);
            classes.retain(|class| !names.contains(&class.as_str()));
            write_class_list(node, &classes);
        }
        Ok(self)
    }

    /// Whether element 0 has any of the classes
    pub fn has_class(&self, names: &str) -> Result<bool> {
        let node = self.first_node("has_class")?;
        let names = split_names(names, "class name")?;
        let classes = class_list(node);
        Ok(names.iter().any(|name| classes.iter().any(|class| class == name)))
    }

    // ---- Attributes ---------------------------------------------------

    /// Attribute of element 0; `None` when absent
    pub fn attr(&self, name: &str) -> Result<Option<String>> {
        let node = self.first_node("attr")?;
        Ok(get_attr(node, &check_name(name)?))
    }

    pub fn set_attr(&self, name: &str, value: impl Into<Value>) -> Result<&Self> {
        let name = check_name(name)?;
        let value = value.into().to_string();
        for node in self {
            write_attr(node, &name, &value);
        }
        Ok(self)
    }

    /// Set several attributes on every element; all names are checked first
    pub fn set_attrs<I, K, V>(&self, attributes: I) -> Result<&Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let attributes = attributes
            .into_iter()
            .map(|(name, value)| Ok((check_name(name.as_ref())?, value.into().to_string())))
            .collect::<Result<Vec<_>>>()?;
        for node in self {
            for (name, value) in &attributes {
                write_attr(node, name, value);
            }
        }
        Ok(self)
    }

    /// Remove each space-separated attribute from every element
    pub fn remove_attr(&self, names: &str) -> Result<&Self> {
        let names: Vec<String> = split_names(names, "attribute name")?
            .into_iter()
            .map(|name| name.to_ascii_lowercase())
            .collect();
        for node in self {
            if let Some(element) = node.as_element() {
                let mut attributes = element.attributes.borrow_mut();
                for name in &names {
                    attributes.remove(name.as_str());
                }
            }
        }
        Ok(self)
    }

    /// Whether element 0 has any of the attributes
    pub fn has_attr(&self, names: &str) -> Result<bool> {
        let node = self.first_node("has_attr")?;
        let names = split_names(names, "attribute name")?;
        Ok(names
            .iter()
            .any(|name| get_attr(node, &name.to_ascii_lowercase()).is_some()))
    }

    // ---- Data attributes ----------------------------------------------

    fn data_name(&self, key: &str) -> Result<String> {
        check_name(&format!("{}{}", self.ctx.config.data_prefix, key))
    }

    /// Coerced `data-<key>` of element 0; `None` when absent
    pub fn data(&self, key: &str) -> Result<Option<Value>> {
        let node = self.first_node("data")?;
        let name = self.data_name(key)?;
        Ok(get_attr(node, &name).map(|raw| Value::coerce(&raw)))
    }

    pub fn set_data(&self, key: &str, value: impl Into<Value>) -> Result<&Self> {
        let name = self.data_name(key)?;
        self.set_attr(&name, value)
    }

    pub fn set_data_map<I, K, V>(&self, entries: I) -> Result<&Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let entries = entries
            .into_iter()
            .map(|(key, value)| Ok((self.data_name(key.as_ref())?, value.into())))
            .collect::<Result<Vec<_>>>()?;
        self.set_attrs(entries)
    }

    /// Remove each space-separated data key from every element
    pub fn remove_data(&self, keys: &str) -> Result<&Self> {
        let names: Vec<String> = split_names(keys, "data key")?
            .into_iter()
            .map(|key| format!("{}{}", self.ctx.config.data_prefix, key))
            .collect();
        self.remove_attr(&names.join(" "))
    }

    /// Whether element 0 has any of the data keys
    pub fn has_data(&self, keys: &str) -> Result<bool> {
        let node = self.first_node("has_data")?;
        let keys = split_names(keys, "data key")?;
        for key in keys {
            if get_attr(node, &self.data_name(key)?).is_some() {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Error, Value, Q};
    use qlib_dom::utils::get_attr;
    use qlib_dom::Document;

    const PAGE: &str = "<html><body>\
        <p id='p1' class='a' data-count='3'>1</p>\
        <p id='p2'>2</p>\
        </body></html>";

    #[test]
    fn test_add_class_is_a_set_union() {
        let document = Document::parse(PAGE);
        let q = Q::init(&document).unwrap();
        let p = q.select("p").unwrap();

        p.add_class("a b").unwrap().add_class("b").unwrap();
        assert_eq!(
            get_attr(p.get(0).unwrap(), "class").as_deref(),
            Some("a b")
        );
        assert_eq!(
            get_attr(p.get(1).unwrap(), "class").as_deref(),
            Some("a b")
        );
    }

    #[test]
    fn test_remove_and_has_class() {
        let document = Document::parse(PAGE);
        let q = Q::init(&document).unwrap();
        let p = q.select("#p1").unwrap();

        assert!(p.has_class("zzz a").unwrap());
        p.remove_class("a").unwrap();
        assert!(!p.has_class("a").unwrap());
        assert!(matches!(p.has_class("  "), Err(Error::InvalidArgument(_))));
        assert!(matches!(
            q.empty().has_class("a"),
            Err(Error::EmptyCollection(_))
        ));
    }

    #[test]
    fn test_empty_names_are_rejected_before_writing() {
        let document = Document::parse(PAGE);
        let q = Q::init(&document).unwrap();
        let p = q.select("p").unwrap();

        assert!(matches!(p.add_class(""), Err(Error::InvalidArgument(_))));
        assert!(matches!(p.remove_class("  "), Err(Error::InvalidArgument(_))));
        assert!(matches!(p.remove_attr(" "), Err(Error::InvalidArgument(_))));
        assert!(matches!(p.remove_data(""), Err(Error::InvalidArgument(_))));
        // no empty class attribute was written on the second paragraph
        assert_eq!(get_attr(p.get(1).unwrap(), "class"), None);
        assert_eq!(get_attr(p.get(0).unwrap(), "class").as_deref(), Some("a"));
    }

    #[test]
    fn test_attributes() {
        let document = Document::parse(PAGE);
        let q = Q::init(&document).unwrap();
        let p = q.select("p").unwrap();

        assert_eq!(p.attr("id").unwrap().as_deref(), Some("p1"));
        assert_eq!(p.attr("title").unwrap(), None);

        p.set_attr("title", "hi").unwrap();
        p.set_attrs([("role", Value::from("note")), ("tabindex", Value::from(2))])
            .unwrap();
        assert_eq!(
            get_attr(p.get(1).unwrap(), "tabindex").as_deref(),
            Some("2")
        );
        assert!(p.has_attr("missing role").unwrap());

        p.remove_attr("title role").unwrap();
        assert!(!p.has_attr("title role").unwrap());
        assert!(matches!(
            p.set_attr("bad name", "x"),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_invalid_name_in_batch_touches_nothing() {
        let document = Document::parse(PAGE);
        let q = Q::init(&document).unwrap();
        let p = q.select("p").unwrap();

        let result = p.set_attrs([("ok", "1"), ("not ok", "2")]);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert!(!p.has_attr("ok").unwrap());
    }

    #[test]
    fn test_data_coercion() {
        let document = Document::parse(PAGE);
        let q = Q::init(&document).unwrap();
        let p = q.select("#p1").unwrap();

        assert_eq!(p.data("count").unwrap(), Some(Value::Number(3.0)));
        p.set_data("x", 42).unwrap();
        assert_eq!(p.data("x").unwrap(), Some(Value::Number(42.0)));
        p.set_data("x", "hello").unwrap();
        assert_eq!(p.data("x").unwrap(), Some(Value::String("hello".into())));
        p.set_data_map([("on", true)]).unwrap();
        assert_eq!(p.data("on").unwrap(), Some(Value::Bool(true)));

        assert!(p.has_data("nope x").unwrap());
        p.remove_data("x on").unwrap();
        assert!(!p.has_data("x on").unwrap());
        assert_eq!(p.data("missing").unwrap(), None);
    }
}
