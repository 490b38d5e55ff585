//! Conversation session controller
//!
//! Owns one [`ConversationSession`] and exposes the only entry points that
//! mutate it:
//!
//! - [`send_message`](ConversationController::send_message) — one streamed exchange
//! - [`load_history`](ConversationController::load_history) — replay a persisted transcript
//! - [`clear`](ConversationController::clear) — reset to the empty session
//!
//! State changes go through [`SessionStore`], so they are atomic with
//! respect to each other. Work that resumes after an `.await` carries the
//! [`Ticket`](crate::store::Ticket) of the generation it started under and
//! is discarded once a clear, history load or newer exchange took over.
//!
//! # Reentrancy
//!
//! A second `send_message` while the session is loading is rejected with
//! [`SendError::Busy`] and leaves the session untouched.

mod exchange;
mod hydrate;
#[cfg(test)]
mod test_support;

use crate::config::SessionConfig;
use crate::identity::IdentityNegotiator;
use crate::ports::answer_transport::{AnswerTransport, GatewayError};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::exchange_observer::{ExchangeObserver, NoExchangeObserver};
use crate::ports::history_source::HistorySource;
use crate::ports::identity::{Clock, IdGenerator};
use crate::store::SessionStore;
use docchat_domain::{ConversationSession, DomainError};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

pub use hydrate::HydrationOutcome;

/// Fallback error text for a failed exchange
pub const SEND_FAILED_FALLBACK: &str = "Failed to fetch answer. Please try again later.";

/// Fallback error text for a failed history fetch
pub const HISTORY_FAILED_FALLBACK: &str = "Failed loading history";

/// Why an exchange did not produce an answer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    #[error("Question cannot be empty")]
    EmptyQuestion,

    #[error("Another request is still in progress")]
    Busy,

    #[error("Session changed before the answer arrived")]
    Superseded,

    /// The exchange failed; the text is what was stored on the session
    #[error("{0}")]
    Failed(String),

    #[error("Session invariant violated: {0}")]
    Domain(#[from] DomainError),
}

/// Why a history load did not replace the transcript
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("Session changed before the history arrived")]
    Superseded,

    /// The fetch failed; the text is what was stored on the session
    #[error("{0}")]
    Failed(String),

    #[error("Session invariant violated: {0}")]
    Domain(#[from] DomainError),
}

/// Controller for a single conversation session
///
/// Constructed with its collaborators injected, so tests can substitute
/// deterministic transports, id generators and clocks.
pub struct ConversationController {
    transport: Arc<dyn AnswerTransport>,
    history: Arc<dyn HistorySource>,
    ids: Arc<dyn IdGenerator>,
    identity: IdentityNegotiator,
    clock: Arc<dyn Clock>,
    store: SessionStore,
    config: SessionConfig,
    observer: Arc<dyn ExchangeObserver>,
    logger: Arc<dyn ConversationLogger>,
}

impl ConversationController {
    pub fn new(
        transport: Arc<dyn AnswerTransport>,
        history: Arc<dyn HistorySource>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            transport,
            history,
            identity: IdentityNegotiator::new(Arc::clone(&ids)),
            ids,
            clock,
            store: SessionStore::new(),
            config: SessionConfig::default(),
            observer: Arc::new(NoExchangeObserver),
            logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the observer that receives live exchange callbacks
    pub fn with_observer(mut self, observer: Arc<dyn ExchangeObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Set the structured conversation logger
    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// A consistent snapshot of the session
    pub fn state(&self) -> ConversationSession {
        self.store.snapshot()
    }

    /// Reset the session to its empty initial state.
    ///
    /// Unconditional: any in-flight exchange or history load is superseded,
    /// and its late results are dropped.
    pub fn clear(&self) {
        let previous = self.store.mutate(|txn| {
            txn.supersede();
            let previous = txn.id().cloned();
            txn.reset();
            previous
        });

        info!(
            "Session cleared (was {})",
            previous
                .as_ref()
                .map(|id| id.as_str())
                .unwrap_or("<unset>")
        );
        self.logger.log(ConversationEvent::new(
            "session_cleared",
            serde_json::json!({ "conversation_id": previous }),
        ));
    }
}

/// Human-readable text for a failed exchange
pub(crate) fn describe_send_failure(error: &GatewayError) -> String {
    let text = error.to_string();
    if text.trim().is_empty() {
        SEND_FAILED_FALLBACK.to_string()
    } else {
        text
    }
}

/// Human-readable text for a failed history fetch.
///
/// Prefers a server-supplied detail, then the failure text, then a fallback.
pub(crate) fn describe_history_failure(error: &GatewayError) -> String {
    if let Some(detail) = error.detail()
        && !detail.trim().is_empty()
    {
        return detail.to_string();
    }
    let text = error.to_string();
    if text.trim().is_empty() {
        HISTORY_FAILED_FALLBACK.to_string()
    } else {
        text
    }
}
