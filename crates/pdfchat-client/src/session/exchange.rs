//! One streaming exchange: request, decode, fold into state, cancel.

use std::time::Duration;

use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use pdfchat_common::{ConversationId, ExchangePhase, MessageId, StateEvent};

use crate::conversation::ConversationState;
use crate::decoder::FrameDecoder;
use crate::wire::{ChatRequest, StreamEvent};
use crate::{ByteStream, ChatError};

use super::manager::ChatSession;
use super::types::{BusyGuard, ExchangeOutcome, ExchangeStatus};

/// Clears the active token when the exchange ends, including when its future
/// is dropped mid-flight.
struct ActiveExchange<'a> {
    session: &'a ChatSession,
}

impl Drop for ActiveExchange<'_> {
    fn drop(&mut self) {
        self.session.lock_active().take();
        if self.session.phase().is_active() {
            self.session.set_phase(ExchangePhase::Cancelled);
        }
    }
}

impl ChatSession {
    /// Submit `query` for the selected document and stream the answer into
    /// the conversation.
    ///
    /// `cancel` belongs to this exchange only; create a fresh token for every
    /// call. Cancelling it freezes the answer as accumulated so far.
    ///
    /// Returns `Err` only when the submission is refused (empty query, no
    /// document, document still resolving, another exchange running); in
    /// that case nothing is appended.
    /// Transport failures are reported as [`ExchangeStatus::Failed`] and
    /// annotated on the answer.
    pub async fn send(
        &self,
        query: &str,
        cancel: CancellationToken,
    ) -> Result<ExchangeOutcome, ChatError> {
        if query.trim().is_empty() {
            return Err(ChatError::EmptyQuery);
        }
        let context = self
            .lock_context()
            .as_ref()
            .cloned()
            .ok_or(ChatError::NoDocument)?;
        if context.resolving {
            return Err(ChatError::Busy);
        }
        let _guard = BusyGuard::acquire(&self.busy)?;

        let token = cancel.child_token();
        *self.lock_active() = Some(token.clone());
        let _active = ActiveExchange { session: self };

        let (_, assistant_id) = self.lock_state().append_exchange(query);
        self.set_phase(ExchangePhase::Sending);

        let request = ChatRequest {
            query: query.to_string(),
            chat_id: context.conversation_id,
            collection_name: context.document_key,
            mode: self.mode(),
        };
        debug!(
            document = %request.collection_name,
            chat_id = ?request.chat_id,
            mode = request.mode.as_str(),
            "opening exchange"
        );

        let status = self
            .run_exchange(&request, &assistant_id, context.generation, &token)
            .await;

        match &status {
            ExchangeStatus::Completed => info!(document = %request.collection_name, "answer complete"),
            ExchangeStatus::Cancelled => info!(document = %request.collection_name, "answer cancelled"),
            ExchangeStatus::Failed { reason } => {
                warn!(document = %request.collection_name, %reason, "exchange failed")
            }
        }
        self.set_phase(status.phase());

        Ok(ExchangeOutcome {
            assistant_id,
            status,
        })
    }

    async fn run_exchange(
        &self,
        request: &ChatRequest,
        assistant_id: &MessageId,
        generation: u64,
        token: &CancellationToken,
    ) -> ExchangeStatus {
        let opened = tokio::select! {
            biased;
            _ = token.cancelled() => return ExchangeStatus::Cancelled,
            opened = self.backend.open_stream(request) => opened,
        };
        let mut stream = match opened {
            Ok(stream) => stream,
            Err(e) => return self.fail(assistant_id, token, e),
        };
        self.set_phase(ExchangePhase::Streaming);

        let mut decoder = FrameDecoder::new();
        loop {
            let next = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    decoder.finish();
                    return ExchangeStatus::Cancelled;
                }
                next = next_chunk(&mut stream, self.idle_timeout) => next,
            };

            match next {
                Ok(Some(chunk)) => {
                    let mut state = self.lock_state();
                    for event in decoder.feed(&chunk) {
                        if token.is_cancelled() {
                            return ExchangeStatus::Cancelled;
                        }
                        self.apply_event(&mut state, assistant_id, generation, event);
                    }
                }
                Ok(None) => {
                    debug!(dropped = decoder.dropped_frames(), "stream ended");
                    decoder.finish();
                    return ExchangeStatus::Completed;
                }
                Err(e) => return self.fail(assistant_id, token, e),
            }
        }
    }

    fn apply_event(
        &self,
        state: &mut ConversationState,
        assistant_id: &MessageId,
        generation: u64,
        event: StreamEvent,
    ) {
        match event {
            StreamEvent::Token { data } => {
                state.append_token(assistant_id, &data);
            }
            StreamEvent::Sources { data, chat_id } => {
                state.set_sources(assistant_id, data.labels());
                if let Some(id) = chat_id {
                    self.adopt_conversation_id(generation, id);
                }
            }
            StreamEvent::Error { data } => {
                state.append_annotation(assistant_id, &format!("Error: {data}"));
            }
        }
    }

    /// A brand-new conversation learns its id from the stream. An id that is
    /// already known is never replaced.
    pub(super) fn adopt_conversation_id(&self, generation: u64, id: ConversationId) {
        let mut guard = self.lock_context();
        let Some(context) = guard.as_mut() else {
            return;
        };
        if context.generation != generation || context.conversation_id.is_some() {
            return;
        }
        context.conversation_id = Some(id);
        self.bus.publish(StateEvent::ConversationAssigned(id));
        info!(document = %context.document_key, %id, "conversation id assigned by stream");
    }

    fn fail(
        &self,
        assistant_id: &MessageId,
        token: &CancellationToken,
        error: ChatError,
    ) -> ExchangeStatus {
        let mut state = self.lock_state();
        if token.is_cancelled() {
            return ExchangeStatus::Cancelled;
        }
        let reason = error.to_string();
        state.append_annotation(assistant_id, &reason);
        ExchangeStatus::Failed { reason }
    }
}

async fn next_chunk(
    stream: &mut ByteStream,
    idle_timeout: Option<Duration>,
) -> Result<Option<Vec<u8>>, ChatError> {
    let next = match idle_timeout {
        Some(limit) => tokio::time::timeout(limit, stream.next())
            .await
            .map_err(|_| ChatError::Timeout(limit))?,
        None => stream.next().await,
    };
    next.transpose()
}
