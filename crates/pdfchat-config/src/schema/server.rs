use serde::{Deserialize, Serialize};

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// API root, e.g. `http://localhost:5000/api`. No trailing slash needed.
    pub base_url: String,
    /// TCP connect timeout in seconds (valid range: 1-120).
    pub connect_timeout_secs: u32,
    /// Abort an exchange after this many seconds without a chunk.
    /// `0` disables the idle timeout (valid range: 0-3600).
    pub stream_idle_timeout_secs: u32,
    /// Opaque session cookie forwarded with every request.
    pub session_cookie: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".into(),
            connect_timeout_secs: 10,
            stream_idle_timeout_secs: 0,
            session_cookie: None,
        }
    }
}
