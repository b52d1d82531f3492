pub mod errors;
pub mod events;
pub mod id;
pub mod types;

pub use errors::{ConfigError, PdfChatError};
pub use events::{EventBus, StateEvent};
pub use id::{new_id, ConversationId, MessageId};
pub use types::{ExchangePhase, RetrievalMode, Role};

pub type Result<T> = std::result::Result<T, PdfChatError>;
