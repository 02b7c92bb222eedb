//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/arboreal/arboreal.toml`
//! 3. Explicit config file (`--config`)
//! 4. Environment variables: `ARBOREAL_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::DEFAULT_SEPARATOR;

/// Default field holding the child levels of the nested input shape.
pub const DEFAULT_CHILDREN_KEY: &str = "children";

/// Unified configuration for arboreal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Separator for derived ids and index paths (default: `/`)
    pub separator: char,
    /// Field holding child levels in parsed documents (default: `children`)
    pub children_key: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
            children_key: DEFAULT_CHILDREN_KEY.to_string(),
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub separator: Option<String>,
    pub children_key: Option<String>,
}

/// Get the XDG config directory for arboreal.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "arboreal").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("arboreal.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> ApplicationResult<RawSettings> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

/// A separator must be exactly one character and must not be a digit,
/// otherwise index paths could not be split unambiguously.
fn parse_separator(value: &str) -> ApplicationResult<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if !c.is_ascii_digit() => Ok(c),
        _ => Err(ApplicationError::Config {
            message: format!("separator must be a single non-digit character, got '{value}'"),
        }),
    }
}

impl Settings {
    /// Load settings: defaults, global file, optional explicit file, env vars.
    #[instrument(level = "debug")]
    pub fn load(config_file: Option<&Path>) -> ApplicationResult<Self> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("loading global config {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?)?;
            }
        }

        // 3. Explicit config file must exist when given
        if let Some(path) = config_file {
            let path = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref());
            current = current.merge_with(&load_raw_settings(&path)?)?;
        }

        // 4. Environment variables (replace, they are explicit overrides)
        current = current.apply_env_overrides(Environment::with_prefix("ARBOREAL"))?;

        current.validate()?;
        Ok(current)
    }

    /// Overlay wins for every field it specifies.
    fn merge_with(&self, overlay: &RawSettings) -> ApplicationResult<Self> {
        Ok(Self {
            separator: overlay
                .separator
                .as_deref()
                .map(parse_separator)
                .transpose()?
                .unwrap_or(self.separator),
            children_key: overlay
                .children_key
                .clone()
                .unwrap_or_else(|| self.children_key.clone()),
        })
    }

    /// Apply `ARBOREAL_*` variables read through `source`.
    fn apply_env_overrides(&self, source: Environment) -> ApplicationResult<Self> {
        let config = Config::builder()
            .add_source(source)
            .build()
            .map_err(config_err)?;

        let overlay = RawSettings {
            separator: config.get_string("separator").ok(),
            children_key: config.get_string("children_key").ok(),
        };
        self.merge_with(&overlay)
    }

    fn validate(&self) -> ApplicationResult<()> {
        if self.children_key.is_empty() {
            return Err(ApplicationError::Config {
                message: "children_key must not be empty".to_string(),
            });
        }
        parse_separator(&self.separator.to_string()).map(|_| ())
    }

    /// Apply command line overrides on top of loaded settings.
    pub fn with_overrides(
        self,
        children_key: Option<String>,
        separator: Option<char>,
    ) -> ApplicationResult<Self> {
        let overlay = RawSettings {
            separator: separator.map(String::from),
            children_key,
        };
        let settings = self.merge_with(&overlay)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Render settings as TOML, as shown by `arboreal config`.
    pub fn to_toml(&self) -> ApplicationResult<String> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {e}"),
        })
    }
}
