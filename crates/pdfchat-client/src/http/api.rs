//! ChatBackend trait implementation for HttpBackend.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Method;
use tracing::debug;

use pdfchat_common::ConversationId;

use crate::wire::{ChatRequest, CollectionSummary, ConversationSummary, HistoryEntry};
use crate::{ByteStream, ChatBackend, ChatError};

use super::client::{check_status, network, read_envelope, take_field, HttpBackend};

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, ChatError> {
        let response = self
            .request(Method::GET, "chats")
            .send()
            .await
            .map_err(network)?;
        take_field(&mut read_envelope(response).await?, "chats")
    }

    async fn conversation_history(
        &self,
        id: ConversationId,
    ) -> Result<Vec<HistoryEntry>, ChatError> {
        let response = self
            .request(Method::GET, &format!("chats/{id}"))
            .send()
            .await
            .map_err(network)?;
        take_field(&mut read_envelope(response).await?, "history")
    }

    async fn list_collections(&self) -> Result<Vec<CollectionSummary>, ChatError> {
        let response = self
            .request(Method::GET, "collections")
            .send()
            .await
            .map_err(network)?;
        take_field(&mut read_envelope(response).await?, "collections")
    }

    async fn create_conversation(
        &self,
        name: &str,
        collection_id: i64,
    ) -> Result<ConversationId, ChatError> {
        let body = serde_json::json!({
            "name": name,
            "collection_id": collection_id,
        });
        let response = self
            .request(Method::POST, "chats")
            .json(&body)
            .send()
            .await
            .map_err(network)?;
        take_field(&mut read_envelope(response).await?, "chat_id")
    }

    async fn open_stream(&self, request: &ChatRequest) -> Result<ByteStream, ChatError> {
        debug!(
            document = %request.collection_name,
            mode = request.mode.as_str(),
            "streaming request"
        );

        let response = self
            .request(Method::POST, "chat")
            .json(request)
            .send()
            .await
            .map_err(network)?;
        let response = check_status(response).await?;

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(network))
            .boxed())
    }
}
