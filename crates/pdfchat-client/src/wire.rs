//! Wire types exchanged with the backend.

use serde::{Deserialize, Serialize};

use pdfchat_common::{ConversationId, RetrievalMode, Role};

/// One persisted conversation as listed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: ConversationId,
    /// Document key the conversation is bound to.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub collection_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

/// One uploaded document collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub id: i64,
    pub filename: String,
    #[serde(default)]
    pub processing_status: Option<String>,
}

/// Body of the streaming query request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub query: String,
    pub chat_id: Option<ConversationId>,
    pub collection_name: String,
    pub mode: RetrievalMode,
}

/// One newline-delimited record of a streamed answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    Token {
        data: String,
    },
    Sources {
        data: SourcePayload,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        chat_id: Option<ConversationId>,
    },
    Error {
        data: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourcePayload {
    #[serde(default)]
    pub pdf: Option<Vec<PdfSource>>,
    #[serde(default)]
    pub web: Option<Vec<WebSource>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfSource {
    #[serde(default)]
    pub page: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSource {
    #[serde(default)]
    pub title: String,
}

impl SourcePayload {
    /// Citation labels: PDF pages first, then web results, in wire order.
    pub fn labels(&self) -> Vec<String> {
        let pdf = self
            .pdf
            .iter()
            .flatten()
            .map(|s| format!("Page {}", page_label(&s.page)));
        let web = self
            .web
            .iter()
            .flatten()
            .map(|w| format!("Web: {}", w.title));
        pdf.chain(web).collect()
    }
}

/// Whole-number floats print as integers so `1.0` reads "1".
fn page_label(page: &serde_json::Value) -> String {
    match page {
        serde_json::Value::String(page) => page.clone(),
        serde_json::Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => (f as i64).to_string(),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}
