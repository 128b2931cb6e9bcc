//! Configuration management for dm.
//!
//! Parses an explicitly named TOML file with serde. Every section and field
//! is optional and falls back to its default:
//!
//! ```toml
//! [markdown]
//! gfm = true
//!
//! [fence]
//! label_class = "code-label"
//! secondary_label_class = "secondary-code-label"
//! allowed_environments = ["local", "production"]
//! ```
//!
//! CLI settings can be applied during load via [`CliSettings`].

use std::path::{Path, PathBuf};

use dm_extensions::FenceConfig;
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override GitHub-flavored Markdown flag.
    pub gfm: Option<bool>,
    /// Override fence label CSS class.
    pub label_class: Option<String>,
    /// Override fence secondary label CSS class.
    pub secondary_label_class: Option<String>,
    /// Replace the allowed environment list.
    pub allowed_environments: Option<Vec<String>>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Markdown parser configuration.
    pub markdown: MarkdownConfig,
    /// Fence extension configuration.
    pub fence: FenceConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Markdown parser configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Enable GitHub-flavored extensions (tables, strikethrough, task lists).
    pub gfm: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self { gfm: true }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise the
    /// defaults are used; no config file is searched for.
    ///
    /// CLI settings are applied after loading, taking precedence over config
    /// file values. The result is validated last.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Self::load_from_file(path)?
            }
            None => Self::default(),
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse and validate configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed TOML and
    /// `ConfigError::Validation` for invalid values.
    ///
    /// # Example
    ///
    /// ```
    /// use dm_config::Config;
    ///
    /// let config = Config::from_toml("[fence]\nallowed_environments = [\"local\"]").unwrap();
    /// assert_eq!(config.fence.allowed_environments, ["local"]);
    /// assert_eq!(config.fence.label_class, "code-label");
    /// assert!(config.markdown.gfm);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(gfm) = settings.gfm {
            self.markdown.gfm = gfm;
        }
        if let Some(label_class) = &settings.label_class {
            self.fence.label_class.clone_from(label_class);
        }
        if let Some(secondary_label_class) = &settings.secondary_label_class {
            self.fence
                .secondary_label_class
                .clone_from(secondary_label_class);
        }
        if let Some(environments) = &settings.allowed_environments {
            self.fence.allowed_environments.clone_from(environments);
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.fence.label_class, "fence.label_class")?;
        require_non_empty(
            &self.fence.secondary_label_class,
            "fence.secondary_label_class",
        )?;
        for environment in &self.fence.allowed_environments {
            require_non_empty(environment, "fence.allowed_environments entry")?;
        }
        Ok(())
    }
}
