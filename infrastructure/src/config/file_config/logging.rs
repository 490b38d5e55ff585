//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL transcript path; disabled when unset
    pub conversation_log: Option<String>,
}

impl FileLoggingConfig {
    /// Transcript path with a leading `~/` expanded
    pub fn conversation_log_path(&self) -> Option<PathBuf> {
        self.conversation_log
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(super::expand_home)
    }
}
