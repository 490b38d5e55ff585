//! Core domain concepts shared across subdomains.
//!
//! - [`question::Question`] — a validated, non-blank question
//! - [`error::DomainError`] — domain-level errors

pub mod error;
pub mod question;
