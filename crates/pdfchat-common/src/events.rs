use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::id::{ConversationId, MessageId};
use crate::types::{ExchangePhase, Role};

/// A single mutation of conversation state, published for the presentation
/// layer to observe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum StateEvent {
    Reset,
    MessageAppended {
        id: MessageId,
        role: Role,
        content: String,
    },
    ContentAppended {
        id: MessageId,
        text: String,
    },
    SourcesSet {
        id: MessageId,
        sources: Vec<String>,
    },
    ConversationAssigned(ConversationId),
    PhaseChanged(ExchangePhase),
}

pub struct EventBus {
    sender: broadcast::Sender<StateEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: StateEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
