//! Maps a document key to its backend conversation, creating one if needed.
//!
//! One resolution costs exactly one conversation listing and at most one
//! history read, one collection listing and one create call.

use tracing::{debug, info, warn};

use pdfchat_common::ConversationId;

use crate::wire::HistoryEntry;
use crate::{ChatBackend, ChatError};

/// Result of resolving a document key.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// A conversation bound to the key already exists. `history` is `None`
    /// when it could not be fetched.
    Existing {
        id: ConversationId,
        history: Option<Vec<HistoryEntry>>,
    },
    /// A conversation was created for the key.
    Created { id: ConversationId },
    /// No conversation is available. Not an error for the caller.
    Unresolved(Unresolved),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Unresolved {
    /// No uploaded collection has this filename.
    NoCollection,
    /// A listing or the create call failed.
    Backend(ChatError),
}

impl Resolution {
    pub fn conversation_id(&self) -> Option<ConversationId> {
        match self {
            Self::Existing { id, .. } | Self::Created { id } => Some(*id),
            Self::Unresolved(_) => None,
        }
    }
}

pub struct Resolver<'a> {
    backend: &'a dyn ChatBackend,
}

impl<'a> Resolver<'a> {
    pub fn new(backend: &'a dyn ChatBackend) -> Self {
        Self { backend }
    }

    pub async fn resolve(&self, document_key: &str) -> Resolution {
        let conversations = match self.backend.list_conversations().await {
            Ok(conversations) => conversations,
            Err(e) => return unresolved(document_key, e),
        };

        if let Some(existing) = conversations
            .iter()
            .find(|c| c.name.as_deref() == Some(document_key))
        {
            let id = existing.id;
            let history = match self.backend.conversation_history(id).await {
                Ok(history) => Some(history),
                Err(e) => {
                    warn!(document = document_key, %id, error = %e, "history unavailable");
                    None
                }
            };
            info!(document = document_key, %id, "resumed conversation");
            return Resolution::Existing { id, history };
        }

        let collections = match self.backend.list_collections().await {
            Ok(collections) => collections,
            Err(e) => return unresolved(document_key, e),
        };

        let Some(collection) = collections.iter().find(|c| c.filename == document_key) else {
            // TODO: return the Unresolved reason from ChatSession::select_document so
            // callers can tell a missing upload from a backend failure.
            warn!(document = document_key, "no collection for document, nothing to resolve");
            return Resolution::Unresolved(Unresolved::NoCollection);
        };

        debug!(document = document_key, collection = collection.id, "creating conversation");
        match self
            .backend
            .create_conversation(document_key, collection.id)
            .await
        {
            Ok(id) => {
                info!(document = document_key, %id, "created conversation");
                Resolution::Created { id }
            }
            Err(e) => unresolved(document_key, e),
        }
    }
}

fn unresolved(document_key: &str, error: ChatError) -> Resolution {
    warn!(document = document_key, error = %error, "conversation resolution failed");
    Resolution::Unresolved(Unresolved::Backend(error))
}
