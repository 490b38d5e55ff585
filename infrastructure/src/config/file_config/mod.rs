//! Raw TOML configuration data types
//!
//! These structs mirror the config file layout. Every section is optional;
//! missing keys take their defaults.

mod logging;
mod repl;
mod server;
mod session;

pub use logging::FileLoggingConfig;
pub use repl::FileReplConfig;
pub use server::FileServerConfig;
pub use session::FileSessionConfig;

use super::error::ConfigIssue;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Question-answering service connection
    pub server: FileServerConfig,
    /// Controller behavior
    pub session: FileSessionConfig,
    /// Structured transcript logging
    pub logging: FileLoggingConfig,
    /// Interactive chat settings
    pub repl: FileReplConfig,
}

impl FileConfig {
    /// Validate the whole configuration, returning every detected issue
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.server.validate();
        issues.extend(self.session.parse_placeholder_policy().1);
        issues
    }
}

/// Expand a leading `~/` to the home directory
pub(crate) fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Severity;
    use docchat_application::PlaceholderPolicy;
    use std::time::Duration;

    #[test]
    fn deserialize_full_config() {
        let toml_str = r#"
[server]
base_url = "https://docs.example.com/api/"
request_timeout_secs = 5
connect_timeout_secs = 2
conversation_header = "X-Conversation-Id"

[session]
placeholder_on_failure = "mark_failed"

[logging]
conversation_log = "/tmp/docchat.jsonl"

[repl]
show_progress = false
history_file = "/tmp/docchat_history.txt"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(config.validate().is_empty());

        let gateway = config.server.to_gateway_config();
        assert_eq!(gateway.base_url, "https://docs.example.com/api/");
        assert_eq!(gateway.request_timeout, Some(Duration::from_secs(5)));
        assert_eq!(gateway.connect_timeout, Some(Duration::from_secs(2)));
        assert_eq!(gateway.conversation_header, "x-conversation-id");

        assert_eq!(
            config.session.to_session_config().placeholder_on_failure,
            PlaceholderPolicy::MarkFailed
        );
        assert_eq!(
            config.logging.conversation_log_path(),
            Some(PathBuf::from("/tmp/docchat.jsonl"))
        );
        assert!(!config.repl.show_progress);
        assert_eq!(
            config.repl.history_path(),
            Some(PathBuf::from("/tmp/docchat_history.txt"))
        );
    }

    #[test]
    fn deserialize_partial_config() {
        let config: FileConfig = toml::from_str(
            r#"
[server]
base_url = "http://10.0.0.7:9000"
"#,
        )
        .unwrap();

        assert_eq!(config.server.base_url, "http://10.0.0.7:9000");
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(config.session, FileSessionConfig::default());
        assert!(config.logging.conversation_log.is_none());
        assert!(config.repl.show_progress);
    }

    #[test]
    fn default_config_is_valid() {
        assert!(FileConfig::default().validate().is_empty());
    }

    #[test]
    fn validation_collects_errors_and_warnings() {
        let config: FileConfig = toml::from_str(
            r#"
[server]
base_url = ""
connect_timeout_secs = 0

[session]
placeholder_on_failure = "explode"
"#,
        )
        .unwrap();

        let issues = config.validate();
        let severities: Vec<_> = issues.iter().map(|i| (i.field, i.severity)).collect();
        assert_eq!(
            severities,
            vec![
                ("server.base_url", Severity::Error),
                ("server.connect_timeout_secs", Severity::Error),
                ("session.placeholder_on_failure", Severity::Warning),
            ]
        );
    }

    #[test]
    fn expand_home_leaves_absolute_paths() {
        assert_eq!(expand_home("/var/log/x"), PathBuf::from("/var/log/x"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/h.txt"), home.join("h.txt"));
        }
    }
}
