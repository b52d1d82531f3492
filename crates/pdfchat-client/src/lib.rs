//! Chat session client for the pdfchat document question-answering service.
//!
//! Provides:
//! - Session resolution (find or create the conversation bound to a document)
//! - Newline-delimited JSON frame decoding tolerant of arbitrary chunking
//! - A stream session controller with cooperative cancellation
//! - An observable, append-only conversation state
//! - An HTTP implementation of the backend contract

pub mod conversation;
pub mod decoder;
pub mod http;
pub mod resolver;
pub mod session;
pub mod wire;

#[cfg(test)]
pub(crate) mod fake;

use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use pdfchat_common::ConversationId;

pub use conversation::{ConversationState, Message};
pub use decoder::FrameDecoder;
pub use http::{HttpBackend, HttpBackendConfig};
pub use resolver::{Resolution, Resolver, Unresolved};
pub use session::{ChatSession, ExchangeOutcome, ExchangeStatus, SUGGESTED_QUESTIONS};
pub use wire::{
    ChatRequest, CollectionSummary, ConversationSummary, HistoryEntry, SourcePayload, StreamEvent,
};

/// Raw response body of a streaming exchange, one item per network chunk.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>, ChatError>>;

/// Remote operations the client consumes. Authentication, storage and
/// deletion live behind this boundary.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, ChatError>;

    async fn conversation_history(
        &self,
        id: ConversationId,
    ) -> Result<Vec<HistoryEntry>, ChatError>;

    async fn list_collections(&self) -> Result<Vec<CollectionSummary>, ChatError>;

    async fn create_conversation(
        &self,
        name: &str,
        collection_id: i64,
    ) -> Result<ConversationId, ChatError>;

    /// Issue the query and return the response body once a success status
    /// has been received.
    async fn open_stream(&self, request: &ChatRequest) -> Result<ByteStream, ChatError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    #[error("Unauthorized: Please log in again.")]
    Unauthorized,
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Connection failed: {0}")]
    Network(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Request rejected: {0}")]
    Rejected(String),
    #[error("No data received for {0:?}")]
    Timeout(Duration),
    #[error("Query is empty")]
    EmptyQuery,
    #[error("No document selected")]
    NoDocument,
    #[error("An answer is already streaming")]
    Busy,
}
