//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/treewalk/treewalk.toml`
//! 3. Explicit config file passed with `--config`
//! 4. Environment variables: `TREEWALK_*` prefix, `__` between section and key

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::{InputMode, LayoutConfig};

/// Automatic playback settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Delay between automatic steps in milliseconds
    pub interval_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self { interval_ms: 800 }
    }
}

impl PlaybackConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Tree construction settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BuilderConfig {
    /// Restart node ids at 0 on every build
    pub reset_ids_on_rebuild: bool,
    /// Input interpretation when none is given on the command line
    pub default_mode: InputMode,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            reset_ids_on_rebuild: true,
            default_mode: InputMode::Level,
        }
    }
}

/// Raw layout section: every field optional so a file can override just one.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawLayoutConfig {
    pub base_offset: Option<f64>,
    pub level_gap: Option<f64>,
    pub base_spacing: Option<f64>,
    pub min_spread: Option<f64>,
    pub left_margin: Option<f64>,
    pub viewport_width: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawPlaybackConfig {
    pub interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawBuilderConfig {
    pub reset_ids_on_rebuild: Option<bool>,
    pub default_mode: Option<InputMode>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub base_dir: Option<PathBuf>,
    pub layout: RawLayoutConfig,
    pub playback: RawPlaybackConfig,
    pub builder: RawBuilderConfig,
}

/// Unified configuration for treewalk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Base directory for treewalk data (default: ~/.treewalk)
    pub base_dir: PathBuf,
    pub layout: LayoutConfig,
    pub playback: PlaybackConfig,
    pub builder: BuilderConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_dir: dirs_default_base_dir(),
            layout: LayoutConfig::default(),
            playback: PlaybackConfig::default(),
            builder: BuilderConfig::default(),
        }
    }
}

/// Get the default base directory (~/.treewalk).
fn dirs_default_base_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".treewalk"))
        .unwrap_or_else(|| PathBuf::from("~/.treewalk"))
}

/// Get the XDG config directory for treewalk.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "treewalk").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("treewalk.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Directory of the file slot store (base_dir/slots).
    pub fn slots_dir(&self) -> PathBuf {
        self.base_dir.join("slots")
    }

    /// Expand `~`, `$VAR` and `${VAR}` in base_dir.
    fn expand_paths(&mut self) {
        let raw = self.base_dir.to_string_lossy().to_string();
        match shellexpand::full(&raw) {
            Ok(expanded) => self.base_dir = PathBuf::from(expanded.as_ref()),
            Err(e) => debug!("expand_paths: leaving {} as is: {}", raw, e),
        }
    }

    /// Overlay every field the raw settings specify.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        let l = &overlay.layout;
        Self {
            base_dir: overlay
                .base_dir
                .clone()
                .unwrap_or_else(|| self.base_dir.clone()),
            layout: LayoutConfig {
                base_offset: l.base_offset.unwrap_or(self.layout.base_offset),
                level_gap: l.level_gap.unwrap_or(self.layout.level_gap),
                base_spacing: l.base_spacing.unwrap_or(self.layout.base_spacing),
                min_spread: l.min_spread.unwrap_or(self.layout.min_spread),
                left_margin: l.left_margin.unwrap_or(self.layout.left_margin),
                viewport_width: l.viewport_width.unwrap_or(self.layout.viewport_width),
            },
            playback: PlaybackConfig {
                interval_ms: overlay
                    .playback
                    .interval_ms
                    .unwrap_or(self.playback.interval_ms),
            },
            builder: BuilderConfig {
                reset_ids_on_rebuild: overlay
                    .builder
                    .reset_ids_on_rebuild
                    .unwrap_or(self.builder.reset_ids_on_rebuild),
                default_mode: overlay
                    .builder
                    .default_mode
                    .unwrap_or(self.builder.default_mode),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file, applied after the global one
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/treewalk/treewalk.toml`
    /// 3. Explicit config file (must exist)
    /// 4. Environment variables: `TREEWALK_*`
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("load: global config {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(path) = config_file {
            debug!("load: explicit config {}", path.display());
            current = current.merge_with(&load_raw_settings(path)?);
        }

        current = Self::apply_env_overrides(current)?;
        current
            .layout
            .validate()
            .map_err(|message| ApplicationError::Config { message })?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply TREEWALK_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("TREEWALK")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("base_dir") {
            settings.base_dir = PathBuf::from(val);
        }

        let layout = &mut settings.layout;
        for (key, slot) in [
            ("layout.base_offset", &mut layout.base_offset),
            ("layout.level_gap", &mut layout.level_gap),
            ("layout.base_spacing", &mut layout.base_spacing),
            ("layout.min_spread", &mut layout.min_spread),
            ("layout.left_margin", &mut layout.left_margin),
            ("layout.viewport_width", &mut layout.viewport_width),
        ] {
            if let Some(val) = env_value::<f64>(&config, key)? {
                *slot = val;
            }
        }

        if let Some(val) = env_value::<u64>(&config, "playback.interval_ms")? {
            settings.playback.interval_ms = val;
        }
        if let Some(val) = env_value::<bool>(&config, "builder.reset_ids_on_rebuild")? {
            settings.builder.reset_ids_on_rebuild = val;
        }
        if let Ok(val) = config.get_string("builder.default_mode") {
            settings.builder.default_mode = val.parse().map_err(|e| ApplicationError::Config {
                message: format!("TREEWALK_BUILDER__DEFAULT_MODE: {e}"),
            })?;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# treewalk configuration
#
# Locations (by precedence, lowest to highest):
#   Global:   ~/.config/treewalk/treewalk.toml
#   Explicit: treewalk --config <file>
#   Env:      TREEWALK_* environment variables, e.g. TREEWALK_PLAYBACK__INTERVAL_MS=300

# Base directory for treewalk data (slots stored in base_dir/slots)
# base_dir = "~/.treewalk"

[layout]
# Vertical offset of the root row
# base_offset = 60.0
# Vertical distance between levels
# level_gap = 90.0
# Horizontal spacing unit, doubled per level towards the root
# base_spacing = 35.0
# Lower bound for every level's spacing, must stay below 2 x base_spacing
# min_spread = 40.0
# Left margin when the tree is wider than the viewport
# left_margin = 50.0
# Width used for centering
# viewport_width = 1200.0

[playback]
# Delay between automatic steps
# interval_ms = 800

[builder]
# Restart node ids at 0 on every build
# reset_ids_on_rebuild = true
# Input interpretation: "level" or "preorder"
# default_mode = "level"
"#
        .to_string()
    }
}

/// Read a typed env override; a present but malformed value is an error.
fn env_value<T>(config: &Config, key: &str) -> Result<Option<T>, ApplicationError>
where
    T: for<'de> Deserialize<'de>,
{
    match config.get::<T>(key) {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(ApplicationError::Config {
            message: format!("{key}: {e}"),
        }),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
