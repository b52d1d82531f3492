//! In-memory scripted backend for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use tokio::sync::Notify;

use pdfchat_common::ConversationId;

use crate::wire::{ChatRequest, CollectionSummary, ConversationSummary, HistoryEntry};
use crate::{ByteStream, ChatBackend, ChatError};

pub(crate) enum Chunk {
    Data(Vec<u8>),
    Fail(ChatError),
    /// The transport stops delivering without ending the stream.
    Hang,
    /// Delivered once the gate is notified.
    Gated(Arc<Notify>, Vec<u8>),
}

impl Chunk {
    pub(crate) fn text(s: &str) -> Self {
        Self::Data(s.as_bytes().to_vec())
    }
}

pub(crate) enum StreamScript {
    Respond(Vec<Chunk>),
    Reject(ChatError),
    /// The request never receives a response.
    HangOnOpen,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CallCounts {
    pub list_conversations: usize,
    pub history: usize,
    pub list_collections: usize,
    pub create: usize,
    pub open_stream: usize,
}

#[derive(Default)]
struct Inner {
    conversations: Vec<ConversationSummary>,
    collections: Vec<CollectionSummary>,
    histories: HashMap<ConversationId, Vec<HistoryEntry>>,
    next_id: i64,
    listing_error: Option<ChatError>,
    listing_gate: Option<Arc<Notify>>,
    history_error: Option<ChatError>,
    create_error: Option<ChatError>,
    streams: VecDeque<StreamScript>,
    calls: CallCounts,
    created: Vec<(String, i64)>,
    requests: Vec<ChatRequest>,
}

pub(crate) struct ScriptedBackend {
    inner: Mutex<Inner>,
}

impl ScriptedBackend {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 1,
                ..Inner::default()
            }),
        }
    }

    fn edit(self, f: impl FnOnce(&mut Inner)) -> Self {
        f(&mut self.inner.lock().unwrap());
        self
    }

    pub(crate) fn with_conversation(self, id: i64, name: &str, collection_id: Option<i64>) -> Self {
        self.edit(|inner| {
            inner.conversations.push(ConversationSummary {
                id: ConversationId(id),
                name: Some(name.to_string()),
                collection_id,
            })
        })
    }

    pub(crate) fn with_history(self, id: i64, history: Vec<HistoryEntry>) -> Self {
        self.edit(|inner| {
            inner.histories.insert(ConversationId(id), history);
        })
    }

    pub(crate) fn with_collection(self, id: i64, filename: &str) -> Self {
        self.edit(|inner| {
            inner.collections.push(CollectionSummary {
                id,
                filename: filename.to_string(),
                processing_status: Some("completed".into()),
            })
        })
    }

    pub(crate) fn with_next_conversation_id(self, id: i64) -> Self {
        self.edit(|inner| inner.next_id = id)
    }

    pub(crate) fn with_stream(self, script: StreamScript) -> Self {
        self.edit(|inner| inner.streams.push_back(script))
    }

    /// Hold every conversation listing until `gate` is notified.
    pub(crate) fn with_listing_gate(self, gate: Arc<Notify>) -> Self {
        self.edit(|inner| inner.listing_gate = Some(gate))
    }

    pub(crate) fn fail_listing(self, error: ChatError) -> Self {
        self.edit(|inner| inner.listing_error = Some(error))
    }

    pub(crate) fn fail_history(self, error: ChatError) -> Self {
        self.edit(|inner| inner.history_error = Some(error))
    }

    pub(crate) fn fail_create(self, error: ChatError) -> Self {
        self.edit(|inner| inner.create_error = Some(error))
    }

    pub(crate) fn calls(&self) -> CallCounts {
        self.inner.lock().unwrap().calls
    }

    pub(crate) fn created(&self) -> Vec<(String, i64)> {
        self.inner.lock().unwrap().created.clone()
    }

    pub(crate) fn requests(&self) -> Vec<ChatRequest> {
        self.inner.lock().unwrap().requests.clone()
    }
}

fn into_stream(chunks: Vec<Chunk>) -> ByteStream {
    stream::iter(chunks)
        .then(|chunk| async move {
            match chunk {
                Chunk::Data(bytes) => Ok(bytes),
                Chunk::Fail(e) => Err(e),
                Chunk::Hang => std::future::pending().await,
                Chunk::Gated(gate, bytes) => {
                    gate.notified().await;
                    Ok(bytes)
                }
            }
        })
        .boxed()
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, ChatError> {
        let gate = self.inner.lock().unwrap().listing_gate.clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let mut inner = self.inner.lock().unwrap();
        inner.calls.list_conversations += 1;
        match &inner.listing_error {
            Some(e) => Err(e.clone()),
            None => Ok(inner.conversations.clone()),
        }
    }

    async fn conversation_history(
        &self,
        id: ConversationId,
    ) -> Result<Vec<HistoryEntry>, ChatError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.history += 1;
        match &inner.history_error {
            Some(e) => Err(e.clone()),
            None => Ok(inner.histories.get(&id).cloned().unwrap_or_default()),
        }
    }

    async fn list_collections(&self) -> Result<Vec<CollectionSummary>, ChatError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.list_collections += 1;
        match &inner.listing_error {
            Some(e) => Err(e.clone()),
            None => Ok(inner.collections.clone()),
        }
    }

    async fn create_conversation(
        &self,
        name: &str,
        collection_id: i64,
    ) -> Result<ConversationId, ChatError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.create += 1;
        if let Some(e) = &inner.create_error {
            return Err(e.clone());
        }
        let id = ConversationId(inner.next_id);
        inner.next_id += 1;
        inner.conversations.push(ConversationSummary {
            id,
            name: Some(name.to_string()),
            collection_id: Some(collection_id),
        });
        inner.created.push((name.to_string(), collection_id));
        Ok(id)
    }

    async fn open_stream(&self, request: &ChatRequest) -> Result<ByteStream, ChatError> {
        let script = {
            let mut inner = self.inner.lock().unwrap();
            inner.calls.open_stream += 1;
            inner.requests.push(request.clone());
            inner.streams.pop_front()
        };
        match script {
            Some(StreamScript::Respond(chunks)) => Ok(into_stream(chunks)),
            Some(StreamScript::Reject(e)) => Err(e),
            Some(StreamScript::HangOnOpen) => std::future::pending().await,
            None => Ok(stream::empty().boxed()),
        }
    }
}
