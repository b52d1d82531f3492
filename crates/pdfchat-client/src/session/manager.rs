//! Session struct, document selection, and state accessors.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use pdfchat_common::{
    ConversationId, EventBus, ExchangePhase, RetrievalMode, Role, StateEvent,
};

use crate::conversation::{ConversationState, Message};
use crate::resolver::{Resolution, Resolver};
use crate::ChatBackend;

use super::types::SessionContext;

/// Canned prompts offered while a freshly opened conversation is empty.
pub const SUGGESTED_QUESTIONS: [&str; 3] = [
    "Summarize this document",
    "Explain the main conclusion",
    "What are the key points?",
];

const NO_SELECTION: &str = "Hello! Select a document to start chatting.";
const CLEARED: &str = "Conversation cleared (Visual only).";

/// Ends the resolving window of one selection, including when the
/// `select_document` future is dropped before resolution settles.
struct Resolving<'a> {
    session: &'a ChatSession,
    generation: u64,
}

impl Drop for Resolving<'_> {
    fn drop(&mut self) {
        if let Some(context) = self.session.lock_context().as_mut() {
            if context.generation == self.generation {
                context.resolving = false;
            }
        }
    }
}

/// One user's chat client: the selected document, its conversation, and at
/// most one in-flight exchange.
///
/// Shared by reference (typically behind an `Arc`). The presentation layer
/// reads through [`subscribe`](Self::subscribe) and the snapshot accessors;
/// only the session itself mutates conversation state.
pub struct ChatSession {
    pub(super) backend: Arc<dyn ChatBackend>,
    pub(super) bus: Arc<EventBus>,
    pub(super) state: Mutex<ConversationState>,
    pub(super) context: Mutex<Option<SessionContext>>,
    pub(super) phase: Mutex<ExchangePhase>,
    pub(super) active: Mutex<Option<CancellationToken>>,
    pub(super) busy: AtomicBool,
    pub(super) generation: AtomicU64,
    pub(super) web_search: AtomicBool,
    pub(super) idle_timeout: Option<Duration>,
}

impl ChatSession {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        let bus = Arc::new(EventBus::default());
        Self {
            backend,
            state: Mutex::new(ConversationState::with_bus(bus.clone())),
            bus,
            context: Mutex::new(None),
            phase: Mutex::new(ExchangePhase::Idle),
            active: Mutex::new(None),
            busy: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            web_search: AtomicBool::new(false),
            idle_timeout: None,
        }
    }

    /// Fail an exchange that receives nothing for `timeout`. `None` waits forever.
    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn with_mode(self, mode: RetrievalMode) -> Self {
        self.set_mode(mode);
        self
    }

    /// Switch to `document_key`: discard the previous conversation, then find
    /// or create the one bound to the new document and seed its messages.
    ///
    /// Returns the conversation id, or `None` when resolution missed (the
    /// document stays selected and the log stays empty).
    pub async fn select_document(&self, document_key: impl Into<String>) -> Option<ConversationId> {
        let document_key = document_key.into();
        let generation = self.begin_selection(Some(document_key.clone()));
        let _resolving = Resolving {
            session: self,
            generation,
        };

        let resolution = Resolver::new(self.backend.as_ref())
            .resolve(&document_key)
            .await;

        let mut state = self.lock_state();
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(document = %document_key, "selection changed during resolution, discarding");
            return None;
        }

        let id = resolution.conversation_id();
        if let Some(context) = self.lock_context().as_mut() {
            context.conversation_id = id;
            context.resolving = false;
        }
        if let Some(id) = id {
            self.bus.publish(StateEvent::ConversationAssigned(id));
        }

        match resolution {
            Resolution::Existing {
                history: Some(history),
                ..
            } if !history.is_empty() => {
                for entry in history {
                    state.append_message(entry.role, entry.content);
                }
            }
            Resolution::Existing {
                history: Some(_), ..
            } => {
                state.append_message(
                    Role::Assistant,
                    format!("Welcome back! Ask me anything about {document_key}."),
                );
            }
            Resolution::Created { .. } => {
                state.append_message(
                    Role::Assistant,
                    format!("I'm ready to analyze {document_key}."),
                );
            }
            Resolution::Existing { history: None, .. } | Resolution::Unresolved(_) => {}
        }

        info!(document = %document_key, conversation = ?id, messages = state.len(), "document selected");
        id
    }

    /// Drop the current selection and show the idle greeting.
    pub fn clear_selection(&self) {
        self.begin_selection(None);
        self.lock_state().append_message(Role::Assistant, NO_SELECTION);
    }

    /// Clear the visible log only. The backend history is untouched and the
    /// conversation stays selected.
    pub fn clear_view(&self) {
        let mut state = self.lock_state();
        state.reset();
        state.append_message(Role::Assistant, CLEARED);
    }

    /// Cancel the in-flight exchange, if any. Returns whether one was running.
    pub fn stop(&self) -> bool {
        match self.lock_active().as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn set_mode(&self, mode: RetrievalMode) {
        self.web_search
            .store(mode == RetrievalMode::Hybrid, Ordering::Relaxed);
    }

    pub fn mode(&self) -> RetrievalMode {
        RetrievalMode::from_web_search(self.web_search.load(Ordering::Relaxed))
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<StateEvent> {
        self.bus.subscribe()
    }

    /// Snapshot of the message log.
    pub fn messages(&self) -> Vec<Message> {
        self.lock_state().messages().to_vec()
    }

    pub fn phase(&self) -> ExchangePhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a submission would be refused with [`ChatError::Busy`](crate::ChatError::Busy):
    /// an exchange is running or the selected document is still resolving.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
            || self.lock_context().as_ref().is_some_and(|c| c.resolving)
    }

    /// Take a fresh subscription together with the message log it starts
    /// from. Events published after the snapshot arrive on the receiver and
    /// nothing earlier does.
    pub fn resubscribe(&self) -> (Vec<Message>, tokio::sync::broadcast::Receiver<StateEvent>) {
        let state = self.lock_state();
        (state.messages().to_vec(), self.bus.subscribe())
    }

    pub fn document_key(&self) -> Option<String> {
        self.lock_context().as_ref().map(|c| c.document_key.clone())
    }

    pub fn conversation_id(&self) -> Option<ConversationId> {
        self.lock_context().as_ref().and_then(|c| c.conversation_id)
    }

    /// Suggested prompts, offered only while a selected document's log holds
    /// nothing but its greeting.
    pub fn suggestions(&self) -> &'static [&'static str] {
        if self.document_key().is_none() {
            return &[];
        }
        let state = self.lock_state();
        match state.messages() {
            [only] if only.role == Role::Assistant => &SUGGESTED_QUESTIONS,
            _ => &[],
        }
    }

    /// Tear down the current selection atomically and install `document_key`.
    fn begin_selection(&self, document_key: Option<String>) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.stop();
        *self.lock_context() = document_key.map(|document_key| SessionContext {
            document_key,
            conversation_id: None,
            generation,
            resolving: true,
        });
        self.lock_state().reset();
        generation
    }

    pub(super) fn set_phase(&self, phase: ExchangePhase) {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = phase;
        self.bus.publish(StateEvent::PhaseChanged(phase));
    }

    pub(super) fn lock_state(&self) -> MutexGuard<'_, ConversationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn lock_context(&self) -> MutexGuard<'_, Option<SessionContext>> {
        self.context.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn lock_active(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
