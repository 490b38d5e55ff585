//! Identity and time ports
//!
//! Abstracts the two ambient capabilities the controller needs so tests
//! can substitute deterministic fakes.

use chrono::{DateTime, Utc};
use docchat_domain::{ConversationId, MessageId};

/// Produces statistically unique, non-guessable opaque tokens
pub trait IdGenerator: Send + Sync {
    /// A fresh tentative conversation id
    fn conversation_id(&self) -> ConversationId;

    /// A fresh message id
    fn message_id(&self) -> MessageId;
}

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
