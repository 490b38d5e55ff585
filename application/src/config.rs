//! Application-level configuration.
//!
//! Controls how the conversation controller behaves when things go wrong.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What happens to the pending assistant placeholder when an exchange fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderPolicy {
    /// Leave the placeholder pending with whatever text it had.
    #[default]
    KeepPending,
    /// Close the placeholder with status `Failed`.
    MarkFailed,
}

impl PlaceholderPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceholderPolicy::KeepPending => "keep_pending",
            PlaceholderPolicy::MarkFailed => "mark_failed",
        }
    }
}

impl FromStr for PlaceholderPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "keep_pending" | "keep" => Ok(PlaceholderPolicy::KeepPending),
            "mark_failed" | "fail" => Ok(PlaceholderPolicy::MarkFailed),
            other => Err(format!(
                "unknown placeholder policy '{}' (expected keep_pending or mark_failed)",
                other
            )),
        }
    }
}

/// Session controller configuration.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Placeholder handling on failure.
    pub placeholder_on_failure: PlaceholderPolicy,
}

impl SessionConfig {
    pub fn with_placeholder_policy(mut self, policy: PlaceholderPolicy) -> Self {
        self.placeholder_on_failure = policy;
        self
    }
}
