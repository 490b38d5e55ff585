//! Session event journal
//!
//! The controller reports each finished step of a session here, one
//! record per step. Records are JSON values so an adapter can append them
//! to a transcript file without knowing the session types.
//!
//! Event names in use:
//!
//! | name                 | emitted when                          |
//! |----------------------|---------------------------------------|
//! | `exchange_started`   | optimistic entries were appended      |
//! | `exchange_completed` | the answer placeholder was finalized  |
//! | `exchange_failed`    | a send failed before or during stream |
//! | `history_loaded`     | a transcript replaced the session     |
//! | `history_failed`     | a history fetch failed                |
//! | `session_cleared`    | the session was reset                 |

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct ConversationEvent {
    pub event_type: &'static str,
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Sink for session events. Never fails; adapters drop what they cannot write.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// Discards every event
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
