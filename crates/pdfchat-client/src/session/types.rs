//! Session types and concurrency guards.

use std::sync::atomic::{AtomicBool, Ordering};

use pdfchat_common::{ConversationId, ExchangePhase, MessageId};

use crate::ChatError;

/// Guard that clears the `busy` flag on drop, so it is released even if the
/// exchange future is dropped or returns early.
pub(crate) struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    /// Attempt to acquire the busy lock. Returns `Err` if already busy.
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Result<Self, ChatError> {
        if flag
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(ChatError::Busy);
        }
        Ok(Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Everything tied to one document selection. Replaced wholesale when the
/// selection changes.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SessionContext {
    pub document_key: String,
    pub conversation_id: Option<ConversationId>,
    /// Selection counter; work started under an older generation is stale.
    pub generation: u64,
    /// Set from selection until resolution settles; submissions are refused
    /// meanwhile.
    pub resolving: bool,
}

/// How an exchange ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeStatus {
    Completed,
    Cancelled,
    Failed { reason: String },
}

impl ExchangeStatus {
    pub fn phase(&self) -> ExchangePhase {
        match self {
            Self::Completed => ExchangePhase::Completed,
            Self::Cancelled => ExchangePhase::Cancelled,
            Self::Failed { .. } => ExchangePhase::Failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeOutcome {
    /// The answer message this exchange wrote into.
    pub assistant_id: MessageId,
    pub status: ExchangeStatus,
}
