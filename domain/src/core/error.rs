//! Domain error types

use crate::conversation::ids::MessageId;
use thiserror::Error;

/// Domain-level errors
///
/// These are raised when a mutation would break a session invariant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Question cannot be empty")]
    EmptyQuestion,

    #[error("Message sequence {got} does not follow {last}")]
    OutOfOrder { last: u64, got: u64 },

    #[error("A pending message already exists: {0}")]
    PendingMessageExists(MessageId),

    #[error("Message is not pending: {0}")]
    NotPending(MessageId),

    #[error("Message not found: {0}")]
    MessageNotFound(MessageId),
}
