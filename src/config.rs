use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
    #[error("Invalid configuration: {0}")]
    Extract(#[from] figment::Error),
}

/// Model identifiers offered in the settings view.
pub const DEFAULT_MODELS: [&str; 3] = [
    "gemini-3-flash-preview",
    "gemini-2.0-flash-exp",
    "gemini-1.5-pro",
];

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tui: TuiConfig,
    pub data: DataConfig,
    pub model: ModelConfig,
}

/// TUI-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    /// Tick interval in milliseconds for the event loop.
    pub tick_rate_ms: u64,
    /// Enable mouse support in the terminal.
    pub mouse_enabled: bool,
}

/// Data directory configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Override the default data directory (logs live below it).
    pub data_dir: Option<PathBuf>,
    /// Where exported Markdown reports are written.
    pub export_dir: Option<PathBuf>,
}

/// Model service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Service credential. `None` puts the UI into a warning state.
    pub api_key: Option<String>,
    pub default_model: String,
    pub available_models: Vec<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tui: TuiConfig::default(),
            data: DataConfig::default(),
            model: ModelConfig::default(),
        }
    }
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 50,
            mouse_enabled: false,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            export_dir: None,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_model: DEFAULT_MODELS[0].to_string(),
            available_models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout_secs: 300,
        }
    }
}

impl ModelConfig {
    /// The credential, if one is configured and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Models for the selector; the default model always comes first.
    pub fn model_choices(&self) -> Vec<String> {
        let mut choices = vec![self.default_model.clone()];
        for model in &self.available_models {
            if !choices.contains(model) {
                choices.push(model.clone());
            }
        }
        choices
    }
}

impl AppConfig {
    /// Load configuration from `.env`, `~/.config/tabletop-oracle/config.toml`
    /// and the environment, in increasing priority.
    /// Returns `Default` if the layered configuration cannot be extracted.
    pub fn load() -> Self {
        if let Err(e) = load_dotenv() {
            log::warn!("{e}");
        }

        let config_path = Self::config_path();
        match Self::load_from(&config_path) {
            Ok(config) => {
                if config_path.exists() {
                    log::info!("Loaded config from {}", config_path.display());
                } else {
                    log::debug!(
                        "No config file at {}, using defaults and environment",
                        config_path.display()
                    );
                }
                config
            }
            Err(e) => {
                log::warn!("{e} ({}). Using defaults", config_path.display());
                Self::default()
            }
        }
    }

    /// Extract the layered configuration rooted at `config_path`.
    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        Ok(Self::figment(config_path).extract()?)
    }

    /// Configuration layers: defaults, TOML file, prefixed env, Gemini env vars.
    pub fn figment(config_path: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("TABLETOP_ORACLE_").split("__"))
            .merge(Env::raw().filter_map(|key| {
                if key.as_str().eq_ignore_ascii_case("GEMINI_API_KEY") {
                    Some("model.api_key".into())
                } else if key.as_str().eq_ignore_ascii_case("GEMINI_MODEL_NAME") {
                    Some("model.default_model".into())
                } else {
                    None
                }
            }))
    }

    /// Resolved data directory (override or XDG default).
    pub fn data_dir(&self) -> PathBuf {
        self.data.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("tabletop-oracle"))
                .unwrap_or_else(|| PathBuf::from("data"))
        })
    }

    /// Directory that exported reports are written to.
    pub fn export_dir(&self) -> PathBuf {
        self.data
            .export_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Location of the TOML config file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("tabletop-oracle").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}

/// Load `.env` from the working directory. A missing file is not an error.
fn load_dotenv() -> Result<(), ConfigError> {
    match dotenvy::dotenv() {
        Ok(path) => {
            log::debug!("Loaded environment from {}", path.display());
            Ok(())
        }
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}
