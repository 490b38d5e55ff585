//! Conversation session aggregate

use super::entities::{Message, MessageStatus};
use super::ids::{ConversationId, MessageId};
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// What the session is currently waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    #[default]
    Idle,
    /// Optimistic entries appended, waiting for the response to open.
    Sending,
    /// Response is open, chunks are accumulating into the placeholder.
    Streaming,
    /// Waiting on a history fetch.
    Hydrating,
}

/// A conversation session (Aggregate)
///
/// Holds the conversation id, the ordered message list, the current
/// activity and the last error. Every mutator keeps these invariants:
///
/// - messages are ordered by strictly increasing `sequence`
/// - at most one message is `Pending`
/// - a final message's text never changes
/// - the id is only replaced through [`set_id`](Self::set_id) or a transcript replacement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSession {
    id: Option<ConversationId>,
    messages: Vec<Message>,
    activity: Activity,
    error: Option<String>,
}

impl ConversationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> Option<&ConversationId> {
        self.id.as_ref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn activity(&self) -> Activity {
        self.activity
    }

    /// True while an exchange or a history fetch is outstanding
    pub fn is_loading(&self) -> bool {
        self.activity != Activity::Idle
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The current pending placeholder, if any
    pub fn pending_message(&self) -> Option<&Message> {
        self.messages.iter().find(|m| m.is_pending())
    }

    /// Overwrite the conversation id with an explicitly confirmed value
    pub fn set_id(&mut self, id: ConversationId) {
        self.id = Some(id);
    }

    /// Enter a loading activity and clear any previous error
    pub fn begin(&mut self, activity: Activity) {
        self.activity = activity;
        self.error = None;
    }

    /// Switch activity without touching the error field
    pub fn set_activity(&mut self, activity: Activity) {
        self.activity = activity;
    }

    /// Append a message at the end of the list
    pub fn append(&mut self, message: Message) -> Result<(), DomainError> {
        if let Some(last) = self.messages.last()
            && message.sequence <= last.sequence
        {
            return Err(DomainError::OutOfOrder {
                last: last.sequence,
                got: message.sequence,
            });
        }
        if message.is_pending()
            && let Some(existing) = self.pending_message()
        {
            return Err(DomainError::PendingMessageExists(existing.id.clone()));
        }
        self.messages.push(message);
        Ok(())
    }

    /// Append a streamed chunk to a pending message
    pub fn append_chunk(&mut self, id: &MessageId, chunk: &str) -> Result<(), DomainError> {
        let message = self.pending_mut(id)?;
        message.text.push_str(chunk);
        Ok(())
    }

    /// Set the final text of a pending message and freeze it
    pub fn finalize(&mut self, id: &MessageId, text: String) -> Result<(), DomainError> {
        let message = self.pending_mut(id)?;
        message.text = text;
        message.status = MessageStatus::Final;
        Ok(())
    }

    /// Complete the outstanding operation successfully
    pub fn finish(&mut self) {
        self.activity = Activity::Idle;
    }

    /// Record a failure: loading is cleared before the error is stored.
    ///
    /// When `close_placeholder` names the pending message, it is marked
    /// `Failed`; otherwise the placeholder stays pending.
    pub fn fail(&mut self, error: impl Into<String>, close_placeholder: Option<&MessageId>) {
        self.activity = Activity::Idle;
        if let Some(id) = close_placeholder
            && let Ok(message) = self.pending_mut(id)
        {
            message.status = MessageStatus::Failed;
        }
        self.error = Some(error.into());
    }

    /// Close a placeholder left pending by an earlier failed exchange.
    ///
    /// Returns the id of the closed message. Does nothing while loading,
    /// since the pending message then belongs to the live exchange.
    pub fn close_abandoned(&mut self) -> Option<MessageId> {
        if self.is_loading() {
            return None;
        }
        let message = self.messages.iter_mut().find(|m| m.is_pending())?;
        message.status = MessageStatus::Failed;
        Some(message.id.clone())
    }

    /// Replace the whole message list with a replayed transcript
    pub fn replace_transcript(
        &mut self,
        id: ConversationId,
        messages: Vec<Message>,
    ) -> Result<(), DomainError> {
        for pair in messages.windows(2) {
            if pair[1].sequence <= pair[0].sequence {
                return Err(DomainError::OutOfOrder {
                    last: pair[0].sequence,
                    got: pair[1].sequence,
                });
            }
        }
        if let Some(pending) = messages.iter().find(|m| m.is_pending()) {
            return Err(DomainError::PendingMessageExists(pending.id.clone()));
        }
        self.id = Some(id);
        self.messages = messages;
        self.activity = Activity::Idle;
        Ok(())
    }

    /// Reset to the empty initial state
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn pending_mut(&mut self, id: &MessageId) -> Result<&mut Message, DomainError> {
        let message = self
            .messages
            .iter_mut()
            .find(|m| &m.id == id)
            .ok_or_else(|| DomainError::MessageNotFound(id.clone()))?;
        if !message.is_pending() {
            return Err(DomainError::NotPending(id.clone()));
        }
        Ok(message)
    }
}
