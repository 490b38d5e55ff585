//! Conversation domain entities

use super::ids::MessageId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Lifecycle status of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    /// Optimistic assistant placeholder; text may still grow.
    Pending,
    /// Text is frozen.
    Final,
    /// The exchange failed and the placeholder was closed without an answer.
    Failed,
}

/// A message in a conversation (Entity)
///
/// `sequence` reflects creation order across the whole session and is
/// assigned by the session store. Text can only change while `Pending`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub text: String,
    pub status: MessageStatus,
    pub sequence: u64,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// A final user message
    pub fn user(
        id: MessageId,
        sequence: u64,
        text: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            role: Role::User,
            text: text.into(),
            status: MessageStatus::Final,
            sequence,
            created_at,
        }
    }

    /// A final assistant message (used when replaying a transcript)
    pub fn assistant(
        id: MessageId,
        sequence: u64,
        text: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            role: Role::Assistant,
            text: text.into(),
            status: MessageStatus::Final,
            sequence,
            created_at,
        }
    }

    /// An empty pending assistant placeholder
    pub fn placeholder(id: MessageId, sequence: u64, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            role: Role::Assistant,
            text: String::new(),
            status: MessageStatus::Pending,
            sequence,
            created_at,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == MessageStatus::Pending
    }
}
