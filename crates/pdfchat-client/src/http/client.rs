//! HTTP client struct, request building, and response envelope parsing.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::ChatError;

pub(crate) const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Longest slice of an error body kept in [`ChatError::Status`].
const ERROR_BODY_LIMIT: usize = 200;

/// Connection settings for [`HttpBackend`].
#[derive(Debug, Clone, PartialEq)]
pub struct HttpBackendConfig {
    /// API root, e.g. `http://localhost:5000/api`.
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Opaque session cookie forwarded verbatim on every request.
    pub session_cookie: Option<String>,
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            connect_timeout: Duration::from_secs(10),
            session_cookie: None,
        }
    }
}

impl HttpBackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.session_cookie = Some(cookie.into());
        self
    }
}

/// Backend client speaking the pdfchat JSON API over HTTP.
///
/// Only the connect phase is bounded; streamed answers may run for as long
/// as the server keeps sending.
pub struct HttpBackend {
    pub(crate) config: HttpBackendConfig,
    pub(crate) http: reqwest::Client,
}

impl HttpBackend {
    pub fn new(config: HttpBackendConfig) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(network)?;
        Ok(Self { config, http })
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Start a request to `path`, carrying the session cookie if one is set.
    pub(crate) fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = self.url(path);
        debug!(%method, %url, "backend request");
        let builder = self.http.request(method, url);
        match &self.config.session_cookie {
            Some(cookie) => builder.header(reqwest::header::COOKIE, cookie),
            None => builder,
        }
    }
}

pub(crate) fn network(e: reqwest::Error) -> ChatError {
    ChatError::Network(e.to_string())
}

/// Map 401 to [`ChatError::Unauthorized`] and any other non-2xx status to
/// [`ChatError::Status`].
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, ChatError> {
    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(ChatError::Unauthorized);
    }
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(ChatError::Status {
            status: status.as_u16(),
            body: text.chars().take(ERROR_BODY_LIMIT).collect(),
        });
    }
    Ok(response)
}

/// Read a `{"ok": ..., "error": ...}` envelope. `ok: false` becomes
/// [`ChatError::Rejected`].
pub(crate) async fn read_envelope(
    response: reqwest::Response,
) -> Result<serde_json::Value, ChatError> {
    let response = check_status(response).await?;
    let json: serde_json::Value = response
        .json()
        .await
        .map_err(|e| ChatError::Parse(e.to_string()))?;
    parse_envelope(json)
}

pub(crate) fn parse_envelope(json: serde_json::Value) -> Result<serde_json::Value, ChatError> {
    if json["ok"].as_bool() == Some(false) {
        let reason = json["error"].as_str().unwrap_or("unknown error");
        return Err(ChatError::Rejected(reason.to_string()));
    }
    Ok(json)
}

/// Deserialize `key` out of an envelope.
pub(crate) fn take_field<T: DeserializeOwned>(
    json: &mut serde_json::Value,
    key: &str,
) -> Result<T, ChatError> {
    let value = json
        .get_mut(key)
        .map(serde_json::Value::take)
        .ok_or_else(|| ChatError::Parse(format!("missing field `{key}`")))?;
    serde_json::from_value(value).map_err(|e| ChatError::Parse(format!("`{key}`: {e}")))
}
