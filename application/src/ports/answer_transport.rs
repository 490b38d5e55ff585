//! Answer transport port
//!
//! Defines how the application layer asks a question and receives the
//! answer as an ordered, incremental text stream.

use async_trait::async_trait;
use docchat_domain::{ConversationId, Question, StreamEvent};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur while talking to the question-answering service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// No response was obtained (DNS, refused connection, TLS, ...)
    #[error("Connection error: {0}")]
    Connection(String),

    /// The service answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Server {
        status: u16,
        body: String,
        /// Server-supplied `detail` message, when the body carried one
        detail: Option<String>,
    },

    /// The body stream broke after the response was opened
    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    /// The response could not be decoded
    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Transport closed")]
    TransportClosed,
}

impl GatewayError {
    /// Server-supplied detail text, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            GatewayError::Server { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

/// An opened answer stream.
///
/// Wraps an `mpsc::Receiver<StreamEvent>` together with the conversation
/// id the service reported out-of-band (e.g. in a response header).
pub struct AnswerStream {
    /// Authoritative conversation id, if the service reported one
    pub conversation_id: Option<ConversationId>,
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl AnswerStream {
    pub fn new(
        conversation_id: Option<ConversationId>,
        receiver: mpsc::Receiver<StreamEvent>,
    ) -> Self {
        Self {
            conversation_id,
            receiver,
        }
    }
}

/// Transport for streamed question answering
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait AnswerTransport: Send + Sync {
    /// Ask a question within a conversation and open the answer stream.
    ///
    /// Resolves once the response has been opened; chunks then arrive
    /// through the returned [`AnswerStream`] in order.
    async fn ask_stream(
        &self,
        question: &Question,
        conversation_id: Option<&ConversationId>,
    ) -> Result<AnswerStream, GatewayError>;
}
