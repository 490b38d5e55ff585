//! Application layer for docchat
//!
//! This crate contains the conversation session controller, its state
//! store, and the port definitions it is wired with. It depends only on
//! the domain layer.

pub mod config;
pub mod identity;
pub mod ports;
pub mod store;
pub mod use_cases;

// Re-export commonly used types
pub use config::{PlaceholderPolicy, SessionConfig};
pub use identity::{IdentityNegotiator, Negotiated, Reconciled};
pub use ports::{
    answer_transport::{AnswerStream, AnswerTransport, GatewayError},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    exchange_observer::{ExchangeObserver, NoExchangeObserver},
    history_source::HistorySource,
    identity::{Clock, IdGenerator},
};
pub use store::{SessionStore, Ticket};
pub use use_cases::conversation::{
    ConversationController, HISTORY_FAILED_FALLBACK, HistoryError, HydrationOutcome,
    SEND_FAILED_FALLBACK, SendError,
};
