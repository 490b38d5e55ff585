//! Configuration file loading for docchat
//!
//! Priority order (highest to lowest):
//!
//! 1. `DOCCHAT_` prefixed environment variables (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./docchat.toml` or `./.docchat.toml`
//! 4. Global: `$XDG_CONFIG_HOME/docchat/config.toml`
//! 5. Default values

mod error;
mod file_config;
mod loader;

pub use error::{ConfigError, ConfigIssue, Severity};
pub use file_config::{
    FileConfig, FileLoggingConfig, FileReplConfig, FileServerConfig, FileSessionConfig,
};
pub use loader::ConfigLoader;
