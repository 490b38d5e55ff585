//! Domain layer for docchat
//!
//! This crate contains the conversation entities and the invariants that
//! guard them. It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Session
//!
//! A [`ConversationSession`] is the ordered list of exchanges that share one
//! conversation id, plus its loading activity and last error.
//!
//! ## Exchange
//!
//! One user question together with its assistant answer. While the answer
//! streams in, the assistant message is an empty *placeholder* with status
//! `Pending`; at most one such placeholder exists at any time.

pub mod conversation;
pub mod core;

// Re-export commonly used types
pub use conversation::{
    entities::{Message, MessageStatus, Role},
    history::HistoryTurn,
    ids::{ConversationId, MessageId},
    session::{Activity, ConversationSession},
    stream::StreamEvent,
};
pub use core::{error::DomainError, question::Question};
