//! Ordered message log observed by the presentation layer.
//!
//! Every mutation publishes a [`StateEvent`] on the state's [`EventBus`];
//! readers subscribe instead of being called back. Messages are only ever
//! appended. Individual messages are never reordered or removed, only the
//! whole log can be [`reset`](ConversationState::reset).

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use pdfchat_common::{EventBus, MessageId, Role, StateEvent};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    /// Citation labels, absent until the backend sends them.
    pub sources: Option<Vec<String>>,
}

pub struct ConversationState {
    messages: Vec<Message>,
    bus: Arc<EventBus>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::with_bus(Arc::new(EventBus::default()))
    }

    pub fn with_bus(bus: Arc<EventBus>) -> Self {
        Self {
            messages: Vec::new(),
            bus,
        }
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<StateEvent> {
        self.bus.subscribe()
    }

    /// Append a complete message (history or a synthetic welcome).
    pub fn append_message(&mut self, role: Role, content: impl Into<String>) -> MessageId {
        let message = Message {
            id: MessageId::new(),
            role,
            content: content.into(),
            sources: None,
        };
        let id = message.id.clone();
        self.bus.publish(StateEvent::MessageAppended {
            id: id.clone(),
            role,
            content: message.content.clone(),
        });
        self.messages.push(message);
        id
    }

    pub fn append_user_message(&mut self, text: impl Into<String>) -> MessageId {
        self.append_message(Role::User, text)
    }

    pub fn append_assistant_placeholder(&mut self) -> MessageId {
        self.append_message(Role::Assistant, String::new())
    }

    /// Append a user message and its empty answer slot together, so no
    /// observer ever sees a question without its answer placeholder.
    pub fn append_exchange(&mut self, text: impl Into<String>) -> (MessageId, MessageId) {
        let user = self.append_user_message(text);
        let assistant = self.append_assistant_placeholder();
        (user, assistant)
    }

    /// Append streamed text to a message. Returns `false` for an unknown id.
    pub fn append_token(&mut self, id: &MessageId, text: &str) -> bool {
        let Some(message) = self.get_mut(id) else {
            debug!(%id, "token for unknown message ignored");
            return false;
        };
        message.content.push_str(text);
        self.bus.publish(StateEvent::ContentAppended {
            id: id.clone(),
            text: text.to_string(),
        });
        true
    }

    /// Append a bracketed annotation (`\n[...]`) such as an error report.
    pub fn append_annotation(&mut self, id: &MessageId, note: &str) -> bool {
        self.append_token(id, &format!("\n[{note}]"))
    }

    /// Replace a message's sources wholesale. Returns `false` for an unknown id.
    pub fn set_sources(&mut self, id: &MessageId, sources: Vec<String>) -> bool {
        let Some(message) = self.get_mut(id) else {
            debug!(%id, "sources for unknown message ignored");
            return false;
        };
        message.sources = Some(sources.clone());
        self.bus.publish(StateEvent::SourcesSet {
            id: id.clone(),
            sources,
        });
        true
    }

    /// Discard every message.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.bus.publish(StateEvent::Reset);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn get(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().rev().find(|m| &m.id == id)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn get_mut(&mut self, id: &MessageId) -> Option<&mut Message> {
        // The active message is almost always the last one.
        self.messages.iter_mut().rev().find(|m| &m.id == id)
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchange_appends_user_then_empty_assistant() {
        let mut state = ConversationState::new();
        let (user, assistant) = state.append_exchange("Summarize");

        assert_eq!(state.len(), 2);
        assert_eq!(state.messages()[0].id, user);
        assert_eq!(state.messages()[0].role, Role::User);
        assert_eq!(state.messages()[0].content, "Summarize");
        assert_eq!(state.messages()[1].id, assistant);
        assert_eq!(state.messages()[1].role, Role::Assistant);
        assert!(state.messages()[1].content.is_empty());
        assert!(state.messages()[1].sources.is_none());
    }

    #[test]
    fn tokens_concatenate_in_order() {
        let mut state = ConversationState::new();
        let id = state.append_assistant_placeholder();
        for token in ["The ", "doc", "..."] {
            assert!(state.append_token(&id, token));
        }
        assert_eq!(state.get(&id).unwrap().content, "The doc...");
    }

    #[test]
    fn sources_replace_rather_than_merge() {
        let mut state = ConversationState::new();
        let id = state.append_assistant_placeholder();
        state.set_sources(&id, vec!["Page 1".into(), "Page 2".into()]);
        state.set_sources(&id, vec!["Web: Rust".into()]);
        assert_eq!(
            state.get(&id).unwrap().sources,
            Some(vec!["Web: Rust".to_string()])
        );
    }

    #[test]
    fn annotation_is_bracketed_on_new_line() {
        let mut state = ConversationState::new();
        let id = state.append_assistant_placeholder();
        state.append_token(&id, "partial");
        state.append_annotation(&id, "Error: quota");
        assert_eq!(state.get(&id).unwrap().content, "partial\n[Error: quota]");
    }

    #[test]
    fn unknown_id_is_rejected() {
        let mut state = ConversationState::new();
        state.append_assistant_placeholder();
        let stranger = MessageId::new();
        assert!(!state.append_token(&stranger, "x"));
        assert!(!state.set_sources(&stranger, vec![]));
    }

    #[test]
    fn reset_discards_everything() {
        let mut state = ConversationState::new();
        state.append_exchange("q");
        state.reset();
        assert!(state.is_empty());
    }

    #[tokio::test]
    async fn mutations_are_published_in_order() {
        let mut state = ConversationState::new();
        let mut rx = state.subscribe();

        let (user, assistant) = state.append_exchange("q");
        state.append_token(&assistant, "a");
        state.set_sources(&assistant, vec!["Page 1".into()]);
        state.reset();

        assert!(
            matches!(rx.recv().await.unwrap(), StateEvent::MessageAppended { id, role: Role::User, .. } if id == user)
        );
        assert!(
            matches!(rx.recv().await.unwrap(), StateEvent::MessageAppended { id, role: Role::Assistant, .. } if id == assistant)
        );
        assert!(
            matches!(rx.recv().await.unwrap(), StateEvent::ContentAppended { ref text, .. } if text == "a")
        );
        assert!(matches!(rx.recv().await.unwrap(), StateEvent::SourcesSet { .. }));
        assert_eq!(rx.recv().await.unwrap(), StateEvent::Reset);
    }
}
