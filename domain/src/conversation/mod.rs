//! Conversation domain.
//!
//! - [`ids::ConversationId`] / [`ids::MessageId`] — opaque identifiers
//! - [`entities::Message`] — a single user or assistant message
//! - [`session::ConversationSession`] — ordered messages plus loading/error state
//! - [`history::HistoryTurn`] — one persisted question/answer pair
//! - [`stream::StreamEvent`] — incremental answer delivery

pub mod entities;
pub mod history;
pub mod ids;
pub mod session;
pub mod stream;
