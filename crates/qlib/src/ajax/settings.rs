//! AJAX settings
//!
//! Every field has a default, so settings can be loaded from partial JSON.
//! Callbacks are not serializable and are attached afterwards with the
//! builder methods.

use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub type SuccessCallback = Box<dyn FnOnce(String)>;
pub type ErrorCallback = Box<dyn FnOnce(u16, String)>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    #[default]
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AjaxData {
    /// Sent as-is
    Text(String),
    /// Form-url-encoded
    Form(IndexMap<String, Value>),
    /// Pre-encoded multipart body; POST only
    #[serde(skip)]
    Multipart { content_type: String, body: Vec<u8> },
}

impl From<&str> for AjaxData {
    fn from(value: &str) -> Self {
        AjaxData::Text(value.to_string())
    }
}

impl From<String> for AjaxData {
    fn from(value: String) -> Self {
        AjaxData::Text(value)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for AjaxData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        AjaxData::Form(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        value
            .map(|duration| duration.as_millis() as u64)
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}

#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct AjaxSettings {
    pub url: String,
    pub method: Method,
    /// Kept for settings compatibility; requests always run on the caller's
    /// executor
    #[serde(rename = "async")]
    pub asynchronous: bool,
    pub data: Option<AjaxData>,
    pub user: String,
    pub password: String,
    /// Milliseconds in serialized form
    #[serde(with = "millis")]
    pub timeout: Option<Duration>,
    #[serde(skip)]
    pub success: Option<SuccessCallback>,
    #[serde(skip)]
    pub error: Option<ErrorCallback>,
}

impl Default for AjaxSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            method: Method::Post,
            asynchronous: true,
            data: None,
            user: String::new(),
            password: String::new(),
            timeout: None,
            success: None,
            error: None,
        }
    }
}

impl AjaxSettings {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn data(mut self, data: impl Into<AjaxData>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = user.into();
        self.password = password.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Called with the response body on status 200
    pub fn on_success(mut self, callback: impl FnOnce(String) + 'static) -> Self {
        self.success = Some(Box::new(callback));
        self
    }

    /// Called with status and status text otherwise (status 0: no response)
    pub fn on_error(mut self, callback: impl FnOnce(u16, String) + 'static) -> Self {
        self.error = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for AjaxSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AjaxSettings")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("asynchronous", &self.asynchronous)
            .field("data", &self.data)
            .field("user", &self.user)
            .field("timeout", &self.timeout)
            .field("success", &self.success.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_partial_json() {
        let settings: AjaxSettings =
            serde_json::from_str(r#"{"url": "http://localhost/x", "async": false}"#).unwrap();
        assert_eq!(settings.method, Method::Post);
        assert!(!settings.asynchronous);
        assert!(settings.data.is_none());
        assert!(settings.timeout.is_none());
    }

    #[test]
    fn test_data_and_timeout_from_json() {
        let settings: AjaxSettings = serde_json::from_str(
            r#"{"method": "GET", "data": {"q": "rust", "page": 2}, "timeout": 1500}"#,
        )
        .unwrap();
        assert_eq!(settings.method, Method::Get);
        assert_eq!(settings.timeout, Some(Duration::from_millis(1500)));
        let Some(AjaxData::Form(form)) = settings.data else {
            panic!("expected form data");
        };
        assert_eq!(form.get("page"), Some(&Value::Number(2.0)));

        let text: AjaxData = serde_json::from_str(r#""a=1""#).unwrap();
        assert_eq!(text, AjaxData::Text("a=1".into()));
    }

    #[test]
    fn test_builder() {
        let settings = AjaxSettings::new("http://localhost/")
            .method(Method::Put)
            .data([("a", 1)].into_iter().collect::<AjaxData>())
            .on_success(|_| {});
        assert_eq!(settings.method, Method::Put);
        assert!(settings.success.is_some());
        assert!(settings.error.is_none());
    }
}
