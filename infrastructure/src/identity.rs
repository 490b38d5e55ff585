//! System-backed id generator and clock

use chrono::{DateTime, Utc};
use docchat_application::{Clock, IdGenerator};
use docchat_domain::{ConversationId, MessageId};
use uuid::Uuid;

/// Random v4 UUIDs for conversation and message ids
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn conversation_id(&self) -> ConversationId {
        ConversationId::new(Uuid::new_v4().to_string())
    }

    fn message_id(&self) -> MessageId {
        MessageId::new(Uuid::new_v4().to_string())
    }
}

/// Wall clock in UTC
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
