//! AJAX - settings merge, form encoding and a pluggable transport
//!
//! ```text
//! AjaxSettings → build_request → HttpRequest → Transport::send → HttpResponse
//!                                                  ↓
//!                                 success(body) on 200, error(status, text) otherwise
//! ```
//!
//! Non-POST methods carry their data in the query string; POST sends it as a
//! form-url-encoded body.

mod settings;
mod transport;

pub use settings::{AjaxData, AjaxSettings, ErrorCallback, Method, SuccessCallback};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

use crate::error::{Error, Result};
use std::time::Duration;
use url::Url;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

fn encode(data: &AjaxData) -> String {
    match data {
        AjaxData::Text(text) => text.clone(),
        AjaxData::Form(form) => url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(form.iter().map(|(name, value)| (name, value.to_string())))
            .finish(),
        AjaxData::Multipart { body, .. } => String::from_utf8_lossy(body).into_owned(),
    }
}

/// Resolve settings into a request; fails on an unparsable URL or on
/// multipart data with a method other than POST
pub fn build_request(settings: &AjaxSettings) -> Result<HttpRequest> {
    let mut url = Url::parse(&settings.url)
        .map_err(|err| Error::InvalidArgument(format!("invalid url '{}': {}", settings.url, err)))?;

    let (content_type, body) = match (&settings.data, settings.method) {
        (None, _) => (None, None),
        (Some(AjaxData::Multipart { content_type, body }), Method::Post) => {
            (Some(content_type.clone()), Some(body.clone()))
        }
        (Some(AjaxData::Multipart { .. }), method) => {
            return Err(Error::InvalidArgument(format!(
                "multipart data can't be sent with {}",
                method
            )));
        }
        (Some(data), Method::Post) => (
            Some(FORM_CONTENT_TYPE.to_string()),
            Some(encode(data).into_bytes()),
        ),
        (Some(data), _) => {
            let query = encode(data);
            let merged = match url.query() {
                Some(existing) if !existing.is_empty() => format!("{}&{}", existing, query),
                _ => query,
            };
            url.set_query(Some(&merged));
            (None, None)
        }
    };

    let user = (!settings.user.is_empty()).then(|| settings.user.clone());
    let password = (!settings.password.is_empty()).then(|| settings.password.clone());

    Ok(HttpRequest {
        method: settings.method,
        url,
        content_type,
        body,
        user,
        password,
    })
}

/// Send through `transport`, bounded by `timeout`
async fn execute<T>(transport: &T, request: HttpRequest, timeout: Option<Duration>) -> Result<HttpResponse>
where
    T: Transport + ?Sized,
{
    tracing::debug!(method = %request.method, url = %request.url, "Sending request");
    match timeout {
        Some(limit) => tokio::time::timeout(limit, transport.send(request))
            .await
            .map_err(|_| Error::Transport(format!("timed out after {:?}", limit)))?,
        None => transport.send(request).await,
    }
}

/// Perform a request and run exactly one of the callbacks: `success` on
/// status 200, `error` otherwise (status 0 when no response arrived).
///
/// Only invalid settings make this fail; request failures go to `error`.
pub async fn ajax<T>(transport: &T, mut settings: AjaxSettings) -> Result<()>
where
    T: Transport + ?Sized,
{
    let request = build_request(&settings)?;
    let success = settings.success.take();
    let error = settings.error.take();

    match execute(transport, request, settings.timeout).await {
        Ok(response) if response.status == 200 => {
            if let Some(callback) = success {
                callback(response.body);
            }
        }
        Ok(response) => {
            tracing::warn!(status = response.status, url = %settings.url, "Request failed");
            if let Some(callback) = error {
                callback(response.status, response.status_text);
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, url = %settings.url, "No response");
            if let Some(callback) = error {
                callback(0, err.to_string());
            }
        }
    }
    Ok(())
}

async fn fetch<T>(transport: &T, settings: AjaxSettings) -> Result<String>
where
    T: Transport + ?Sized,
{
    let request = build_request(&settings)?;
    let response = execute(transport, request, settings.timeout).await?;
    if response.status != 200 {
        return Err(Error::Http {
            status: response.status,
            status_text: response.status_text,
        });
    }
    Ok(response.body)
}

/// GET `url` (with `data` as query) and parse the body as JSON
pub async fn get_json<T>(transport: &T, url: &str, data: Option<AjaxData>) -> Result<serde_json::Value>
where
    T: Transport + ?Sized,
{
    let mut settings = AjaxSettings::new(url).method(Method::Get);
    settings.data = data;
    let body = fetch(transport, settings).await?;
    Ok(serde_json::from_str(&body)?)
}

/// GET `url` and return the body
pub async fn get_file<T>(transport: &T, url: &str) -> Result<String>
where
    T: Transport + ?Sized,
{
    fetch(transport, AjaxSettings::new(url).method(Method::Get)).await
}
