//! HTTP adapter
//!
//! Implements [`AnswerTransport`](docchat_application::AnswerTransport) and
//! [`HistorySource`](docchat_application::HistorySource) against the
//! question-answering service's HTTP API.

pub mod decoder;
pub mod error;
pub mod gateway;
pub mod protocol;

pub use error::HttpError;
pub use gateway::{HttpChatGateway, HttpGatewayConfig};
