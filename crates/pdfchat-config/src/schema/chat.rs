use serde::{Deserialize, Serialize};

use pdfchat_common::RetrievalMode;

/// Chat behaviour defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ChatConfig {
    /// Start sessions with web search enabled (`mode = "hybrid"`).
    pub web_search: bool,
}

impl ChatConfig {
    pub fn mode(&self) -> RetrievalMode {
        RetrievalMode::from_web_search(self.web_search)
    }
}
