//! Configuration schema types.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod chat;
mod logging;
mod server;

pub use chat::*;
pub use logging::*;
pub use server::*;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PdfChatConfig {
    pub server: ServerConfig,
    pub chat: ChatConfig,
    pub logging: LoggingConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfchat_common::RetrievalMode;

    #[test]
    fn default_server_points_at_local_backend() {
        let config = PdfChatConfig::default();
        assert_eq!(config.server.base_url, "http://localhost:5000/api");
        assert_eq!(config.server.connect_timeout_secs, 10);
        assert_eq!(config.server.stream_idle_timeout_secs, 0);
        assert!(config.server.session_cookie.is_none());
    }

    #[test]
    fn default_mode_is_discrete() {
        let config = PdfChatConfig::default();
        assert_eq!(config.chat.mode(), RetrievalMode::Discrete);
    }

    #[test]
    fn web_search_selects_hybrid() {
        let config: PdfChatConfig = toml::from_str("[chat]\nweb_search = true\n").unwrap();
        assert_eq!(config.chat.mode(), RetrievalMode::Hybrid);
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let config: PdfChatConfig = toml::from_str("").unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.directive(), "pdfchat=info");
    }
}
