//! Cookie store - typed access to `document.cookie`
//!
//! Read:  `a=1; b=hello` → strip whitespace → split `;` → percent-decode
//!        → split at the first `=` → coerce the value
//! Write: every mutating call re-reads the string, applies the change and
//!        rewrites it whole, `name=value;` per entry, percent-encoded like
//!        `encodeURIComponent`, in insertion order

use crate::error::{Error, Result};
use crate::value::Value;
use indexmap::IndexMap;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use qlib_dom::Document;

/// Characters `encodeURIComponent` leaves alone
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn check_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains(' ') {
        return Err(Error::InvalidArgument(format!(
            "cookie name '{}' is empty or contains spaces",
            name
        )));
    }
    Ok(())
}

/// Parse a raw cookie string
pub fn parse_cookie_string(raw: &str) -> IndexMap<String, Value> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    compact
        .split(';')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let decoded = percent_decode_str(pair).decode_utf8_lossy();
            let (name, value) = decoded.split_once('=').unwrap_or((decoded.as_ref(), ""));
            (name.to_string(), Value::coerce(value))
        })
        .collect()
}

/// Serialize cookies into a raw cookie string
pub fn to_cookie_string(cookies: &IndexMap<String, Value>) -> String {
    cookies
        .iter()
        .map(|(name, value)| {
            format!(
                "{}={};",
                utf8_percent_encode(name, COMPONENT),
                utf8_percent_encode(&value.to_string(), COMPONENT)
            )
        })
        .collect()
}

/// Cookie access for one document
///
/// Holds no snapshot: reads parse the current `document.cookie`, and writes
/// parse, apply and write back in one step, so every store on a page sees
/// the others' changes in call order.
#[derive(Debug, Clone)]
pub struct CookieStore {
    document: Document,
}

impl CookieStore {
    /// Bind to `document`; fails when the host has cookies disabled
    pub fn load(document: &Document) -> Result<Self> {
        if !document.cookies_enabled() {
            return Err(Error::UnsupportedEnvironment(
                "cookies are disabled".to_string(),
            ));
        }
        tracing::debug!(document = %document.id(), "Bound cookie store");
        Ok(Self {
            document: document.clone(),
        })
    }

    /// Current cookies, in insertion order
    pub fn entries(&self) -> IndexMap<String, Value> {
        parse_cookie_string(&self.document.cookie())
    }

    pub fn get(&self, name: &str) -> Result<Option<Value>> {
        check_name(name)?;
        Ok(self.entries().shift_remove(name))
    }

    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<&Self> {
        check_name(name)?;
        let value = value.into();
        self.update(|cookies| {
            cookies.insert(name.to_string(), value);
        });
        Ok(self)
    }

    /// Set several cookies with one write; all names are checked first
    pub fn set_many<I, K, V>(&self, entries: I) -> Result<&Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let entries = entries
            .into_iter()
            .map(|(name, value)| {
                let name = name.into();
                check_name(&name)?;
                Ok((name, value.into()))
            })
            .collect::<Result<Vec<_>>>()?;
        self.update(|cookies| cookies.extend(entries));
        Ok(self)
    }

    /// Drop a cookie, returning its last value
    pub fn remove(&self, name: &str) -> Result<Option<Value>> {
        check_name(name)?;
        let mut removed = None;
        self.update(|cookies| removed = cookies.shift_remove(name));
        Ok(removed)
    }

    /// True if ALL space-separated names exist
    pub fn has(&self, names: &str) -> bool {
        let cookies = self.entries();
        let mut names = names.split_whitespace().peekable();
        names.peek().is_some() && names.all(|name| cookies.contains_key(name))
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn update(&self, apply: impl FnOnce(&mut IndexMap<String, Value>)) {
        let mut cookies = self.entries();
        apply(&mut cookies);
        let raw = to_cookie_string(&cookies);
        tracing::trace!(document = %self.document.id(), bytes = raw.len(), "Saving cookies");
        self.document.set_cookie(&raw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qlib_dom::DocumentConfig;

    fn document_with_cookie(cookie: &str) -> Document {
        Document::with_config(
            "<html></html>",
            DocumentConfig {
                cookie: cookie.to_string(),
                ..DocumentConfig::default()
            },
        )
    }

    #[test]
    fn test_parse_coerces_values() {
        let cookies = parse_cookie_string("a=1; b=true ;c=hello%20world;;");
        assert_eq!(cookies.get("a"), Some(&Value::Number(1.0)));
        assert_eq!(cookies.get("b"), Some(&Value::Bool(true)));
        assert_eq!(cookies.get("c"), Some(&Value::String("hello world".into())));
        assert_eq!(cookies.len(), 3);
    }

    #[test]
    fn test_save_encodes_in_insertion_order() {
        let document = document_with_cookie("");
        let store = CookieStore::load(&document).unwrap();
        store.set("b", "x y").unwrap().set("a", 2).unwrap();
        assert_eq!(document.cookie(), "b=x%20y;a=2;");
    }

    #[test]
    fn test_bool_round_trip() {
        let document = document_with_cookie("");
        let store = CookieStore::load(&document).unwrap();
        store.set("flag", true).unwrap();

        let reloaded = CookieStore::load(&document).unwrap();
        assert_eq!(reloaded.get("flag").unwrap(), Some(Value::Bool(true)));
    }

    #[test]
    fn test_has_requires_all_names() {
        let document = document_with_cookie("a=1;b=2");
        let store = CookieStore::load(&document).unwrap();
        assert!(store.has("a b"));
        assert!(!store.has("a c"));
        assert!(!store.has(""));
    }

    #[test]
    fn test_names_with_spaces_are_rejected() {
        let document = document_with_cookie("a=1");
        let store = CookieStore::load(&document).unwrap();
        assert!(matches!(store.get("a b"), Err(Error::InvalidArgument(_))));
        assert!(matches!(
            store.set_many([("ok", 1), ("not ok", 2)]),
            Err(Error::InvalidArgument(_))
        ));
        assert!(!store.has("ok"));
        assert_eq!(document.cookie(), "a=1");
    }

    #[test]
    fn test_remove_drops_on_save() {
        let document = document_with_cookie("a=1;b=2");
        let store = CookieStore::load(&document).unwrap();
        assert_eq!(store.remove("a").unwrap(), Some(Value::Number(1.0)));
        assert_eq!(document.cookie(), "b=2;");
        assert_eq!(store.remove("a").unwrap(), None);
    }

    #[test]
    fn test_two_stores_keep_each_others_writes() {
        let document = document_with_cookie("");
        let session = CookieStore::load(&document).unwrap();
        let prefs = CookieStore::load(&document).unwrap();

        session.set("a", 1).unwrap();
        prefs.set("b", 2).unwrap();
        assert_eq!(document.cookie(), "a=1;b=2;");
        assert!(session.has("a b"));

        session.remove("b").unwrap();
        assert!(!prefs.has("b"));
        assert_eq!(prefs.len(), 1);
    }

    #[test]
    fn test_sees_raw_writes_to_the_document() {
        let document = document_with_cookie("a=1");
        let store = CookieStore::load(&document).unwrap();
        document.set_cookie("a=1;theme=dark");
        assert_eq!(store.get("theme").unwrap(), Some(Value::from("dark")));
        store.set("a", 2).unwrap();
        assert_eq!(document.cookie(), "a=2;theme=dark;");
    }

    #[test]
    fn test_disabled_cookies() {
        let document = Document::with_config(
            "<html></html>",
            DocumentConfig {
                cookies_enabled: false,
                ..DocumentConfig::default()
            },
        );
        assert!(matches!(
            CookieStore::load(&document),
            Err(Error::UnsupportedEnvironment(_))
        ));
    }
}
