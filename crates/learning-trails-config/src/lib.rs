use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_FONT_SIZE: f32 = 17.0;
const DEFAULT_STATE_PATH: &str = "~/.local/share/learning-trails/state.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Trail XML file to open.
    pub trail_path: PathBuf,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default)]
    pub localization_enabled: bool,
    #[serde(default)]
    pub step_title_in_header: bool,
    /// Allow the trail to be reloaded from disk while it is open.
    #[serde(default)]
    pub authoring_support_enabled: bool,
    /// TOML string table used when localization is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strings_path: Option<PathBuf>,
    /// Where answers and page positions are kept.
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,
}

fn default_font_size() -> f32 {
    DEFAULT_FONT_SIZE
}

fn default_state_path() -> PathBuf {
    PathBuf::from(DEFAULT_STATE_PATH)
}

impl Config {
    /// A config for `trail_path` with everything else at its default.
    pub fn new(trail_path: impl Into<PathBuf>) -> Self {
        Self {
            trail_path: trail_path.into(),
            font_size: DEFAULT_FONT_SIZE,
            localization_enabled: false,
            step_title_in_header: false,
            authoring_support_enabled: false,
            strings_path: None,
            state_path: default_state_path(),
        }
    }

    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;
        config.expand_paths();

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/learning-trails");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Expand shell variables and tilde in every configured path
    pub fn expand_paths(&mut self) {
        self.trail_path = Self::expand_path(&self.trail_path).unwrap_or(self.trail_path.clone());
        self.state_path = Self::expand_path(&self.state_path).unwrap_or(self.state_path.clone());
        if let Some(strings) = &self.strings_path {
            self.strings_path = Some(Self::expand_path(strings).unwrap_or(strings.clone()));
        }
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
