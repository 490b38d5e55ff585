//! Exchange observation port
//!
//! Defines callbacks for live display of exchanges and hydration.

use docchat_domain::ConversationId;

/// Callback for progress updates during an exchange
///
/// Implementations live in the presentation layer. Callbacks for an
/// exchange that has been superseded (cleared or replaced) are not delivered.
pub trait ExchangeObserver: Send + Sync {
    /// Called once the optimistic entries are in the session
    fn on_exchange_start(&self, _question: &str, _conversation_id: &ConversationId) {}

    /// Called for each answer chunk, in arrival order
    fn on_chunk(&self, _chunk: &str) {}

    /// Called when the placeholder has been finalized
    fn on_exchange_complete(&self, _conversation_id: &ConversationId) {}

    /// Called when an exchange failed; `error` is the text stored on the session
    fn on_exchange_failed(&self, _error: &str) {}

    /// Called after a transcript replaced the message list
    fn on_history_loaded(&self, _conversation_id: &ConversationId, _turns: usize) {}
}

/// No-op observer for when live display is not needed
pub struct NoExchangeObserver;

impl ExchangeObserver for NoExchangeObserver {}
