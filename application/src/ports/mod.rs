//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod answer_transport;
pub mod conversation_logger;
pub mod exchange_observer;
pub mod history_source;
pub mod identity;
