//! Session configuration from TOML (`[session]` section)

use super::super::error::ConfigIssue;
use docchat_application::{PlaceholderPolicy, SessionConfig};
use serde::{Deserialize, Serialize};

/// Raw session configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSessionConfig {
    /// `keep_pending` or `mark_failed`
    pub placeholder_on_failure: String,
}

impl Default for FileSessionConfig {
    fn default() -> Self {
        Self {
            placeholder_on_failure: PlaceholderPolicy::default().as_str().to_string(),
        }
    }
}

impl FileSessionConfig {
    /// Parse the failure policy, reporting an unknown value as a warning
    pub fn parse_placeholder_policy(&self) -> (PlaceholderPolicy, Vec<ConfigIssue>) {
        match self.placeholder_on_failure.parse::<PlaceholderPolicy>() {
            Ok(policy) => (policy, vec![]),
            Err(message) => (
                PlaceholderPolicy::default(),
                vec![ConfigIssue::warning(
                    "session.placeholder_on_failure",
                    format!("{}, using keep_pending", message),
                )],
            ),
        }
    }

    pub fn to_session_config(&self) -> SessionConfig {
        SessionConfig::default().with_placeholder_policy(self.parse_placeholder_policy().0)
    }
}
