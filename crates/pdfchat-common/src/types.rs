use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Retrieval mode sent with every query. `Hybrid` adds web search upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalMode {
    #[default]
    Discrete,
    Hybrid,
}

impl RetrievalMode {
    pub fn from_web_search(enabled: bool) -> Self {
        if enabled {
            Self::Hybrid
        } else {
            Self::Discrete
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Discrete => "discrete",
            Self::Hybrid => "hybrid",
        }
    }
}

/// Lifecycle of one streaming exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangePhase {
    #[default]
    Idle,
    Sending,
    Streaming,
    Completed,
    Cancelled,
    Failed,
}

impl ExchangePhase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Sending => "sending",
            Self::Streaming => "streaming",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }

    /// Input is disabled while this is true.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Sending | Self::Streaming)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

impl fmt::Display for ExchangePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        let role: Role = serde_json::from_str("\"assistant\"").unwrap();
        assert_eq!(role, Role::Assistant);
    }

    #[test]
    fn mode_wire_values() {
        assert_eq!(
            serde_json::to_string(&RetrievalMode::Discrete).unwrap(),
            "\"discrete\""
        );
        assert_eq!(
            serde_json::to_string(&RetrievalMode::Hybrid).unwrap(),
            "\"hybrid\""
        );
        assert_eq!(RetrievalMode::from_web_search(true), RetrievalMode::Hybrid);
        assert_eq!(RetrievalMode::from_web_search(false), RetrievalMode::Discrete);
    }

    #[test]
    fn phase_activity() {
        assert!(!ExchangePhase::Idle.is_active());
        assert!(ExchangePhase::Sending.is_active());
        assert!(ExchangePhase::Streaming.is_active());
        for phase in [
            ExchangePhase::Completed,
            ExchangePhase::Cancelled,
            ExchangePhase::Failed,
        ] {
            assert!(!phase.is_active());
            assert!(phase.is_terminal());
        }
    }

    #[test]
    fn phase_display_uses_label() {
        assert_eq!(ExchangePhase::Cancelled.to_string(), "cancelled");
    }
}
