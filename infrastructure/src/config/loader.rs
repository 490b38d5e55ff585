//! Configuration file loader with multi-source merging

use super::error::{ConfigError, ConfigIssue, Severity};
use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const PROJECT_FILES: [&str; 2] = ["docchat.toml", ".docchat.toml"];
const ENV_PREFIX: &str = "DOCCHAT_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority.
    ///
    /// Warnings are logged; any error-level issue fails the load.
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, ConfigError> {
        let global = Self::global_config_path().filter(|p| p.exists());
        let project = Self::project_config_path();
        let figment = Self::figment(global.as_deref(), project.as_deref(), config_path)?
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: FileConfig = figment.extract().map_err(Box::new)?;
        Self::check(config)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Files in increasing priority; an explicit path must exist.
    fn figment(
        global: Option<&Path>,
        project: Option<&Path>,
        explicit: Option<&Path>,
    ) -> Result<Figment, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        for path in [global, project].into_iter().flatten() {
            debug!("Merging config file {}", path.display());
            figment = figment.merge(Toml::file(path));
        }
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(ConfigError::Missing(path.to_path_buf()));
            }
            debug!("Merging explicit config file {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        Ok(figment)
    }

    fn check(config: FileConfig) -> Result<FileConfig, ConfigError> {
        let (errors, warnings): (Vec<ConfigIssue>, Vec<ConfigIssue>) = config
            .validate()
            .into_iter()
            .partition(|issue| issue.severity == Severity::Error);

        for issue in &warnings {
            warn!("Config: {}", issue);
        }
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// `$XDG_CONFIG_HOME/docchat/config.toml`, or the platform equivalent
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("docchat").join("config.toml"))
    }

    /// The project-level config file, if one exists in the working directory
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for --show-config)
    pub fn print_config_sources(config_path: Option<&Path>) {
        println!("Configuration sources (in priority order):");

        println!("  [ENV  ] Environment: {}*", ENV_PREFIX);

        if let Some(path) = config_path {
            let mark = if path.exists() { "FOUND" } else { "MISSING" };
            println!("  [{:<5}] Explicit: {}", mark, path.display());
        }

        match Self::project_config_path() {
            Some(path) => println!("  [FOUND] Project: {}", path.display()),
            None => println!("  [     ] Project: ./docchat.toml or ./.docchat.toml"),
        }

        if let Some(path) = Self::global_config_path() {
            let mark = if path.exists() { "FOUND" } else { "     " };
            println!("  [{}] Global:  {}", mark, path.display());
        }

        println!("  [     ] Default: built-in defaults");
    }
}
