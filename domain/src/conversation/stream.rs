//! Streaming events for answer delivery.
//!
//! [`StreamEvent`] represents individual events in a streamed answer,
//! enabling live display of the text as it arrives.

/// An event in a streamed answer.
///
/// Bridges transport-level streaming (raw HTTP body chunks) to the
/// application layer. Events are consumed strictly in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A text chunk of the answer.
    Delta(String),
    /// The complete answer text (signals stream end).
    Completed(String),
    /// An error that occurred mid-stream (signals stream end).
    Error(String),
}

impl StreamEvent {
    /// Returns the text content if this is a Delta or Completed event.
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamEvent::Delta(s) | StreamEvent::Completed(s) => Some(s),
            StreamEvent::Error(_) => None,
        }
    }

    /// Returns true if this event signals the end of the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Completed(_) | StreamEvent::Error(_))
    }
}
