//! Chat session: document selection, conversation state, and the streaming
//! exchange controller.

mod exchange;
mod manager;
mod types;


pub use manager::{ChatSession, SUGGESTED_QUESTIONS};
pub use types::{ExchangeOutcome, ExchangeStatus};
