//! Infrastructure layer for docchat
//!
//! Adapters for the ports defined in the application layer: the HTTP
//! gateway, uuid/clock providers, the JSONL conversation logger, and
//! configuration file loading.

pub mod config;
pub mod http;
pub mod identity;
pub mod logging;

// Re-export commonly used types
pub use config::{
    ConfigError, ConfigIssue, ConfigLoader, FileConfig, FileLoggingConfig, FileReplConfig,
    FileServerConfig, FileSessionConfig, Severity,
};
pub use http::{HttpChatGateway, HttpError, HttpGatewayConfig};
pub use identity::{SystemClock, UuidIdGenerator};
pub use logging::JsonlConversationLogger;
