//! Server configuration from TOML (`[server]` section)

use super::super::error::ConfigIssue;
use crate::http::HttpGatewayConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw server connection configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileServerConfig {
    /// Base address of the question-answering service
    pub base_url: String,
    /// Timeout for history requests, in seconds
    pub request_timeout_secs: u64,
    /// Connect timeout for every request, in seconds
    pub connect_timeout_secs: u64,
    /// Response header that carries the confirmed conversation id
    pub conversation_header: String,
}

impl Default for FileServerConfig {
    fn default() -> Self {
        let defaults = HttpGatewayConfig::default();
        Self {
            base_url: defaults.base_url,
            request_timeout_secs: defaults.request_timeout.map_or(0, |d| d.as_secs()),
            connect_timeout_secs: defaults.connect_timeout.map_or(0, |d| d.as_secs()),
            conversation_header: defaults.conversation_header,
        }
    }
}

impl FileServerConfig {
    pub(super) fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        let url = self.base_url.trim();
        if url.is_empty() {
            issues.push(ConfigIssue::error("server.base_url", "cannot be empty"));
        } else if !(url.starts_with("http://") || url.starts_with("https://")) {
            issues.push(ConfigIssue::error(
                "server.base_url",
                format!("'{}' must start with http:// or https://", url),
            ));
        }
        if self.request_timeout_secs == 0 {
            issues.push(ConfigIssue::error("server.request_timeout_secs", "cannot be 0"));
        }
        if self.connect_timeout_secs == 0 {
            issues.push(ConfigIssue::error("server.connect_timeout_secs", "cannot be 0"));
        }
        if self.conversation_header.trim().is_empty() {
            issues.push(ConfigIssue::warning(
                "server.conversation_header",
                "empty, falling back to 'x-conversation-id'",
            ));
        }

        issues
    }

    /// Convert to the gateway's explicit configuration
    pub fn to_gateway_config(&self) -> HttpGatewayConfig {
        let defaults = HttpGatewayConfig::default();
        let header = self.conversation_header.trim();
        HttpGatewayConfig {
            base_url: self.base_url.trim().to_string(),
            request_timeout: Some(Duration::from_secs(self.request_timeout_secs)),
            connect_timeout: Some(Duration::from_secs(self.connect_timeout_secs)),
            conversation_header: if header.is_empty() {
                defaults.conversation_header
            } else {
                header.to_ascii_lowercase()
            },
            ..defaults
        }
    }
}
