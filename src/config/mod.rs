use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::overlay::{OverlaySize, DEFAULT_NARROW_BREAKPOINT};

/// Narrowest breakpoint accepted; below this every panel would be a sheet.
pub const MIN_NARROW_BREAKPOINT: u16 = 20;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("narrow_breakpoint must be at least {min}, got {value}")]
    Breakpoint { value: u16, min: u16 },
    #[error("could not find config directory")]
    NoConfigDir,
}

/// Defaults applied to the demo dialogs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayDefaults {
    pub size: OverlaySize,
    pub close_on_escape: bool,
    pub close_on_backdrop_click: bool,
}

impl Default for OverlayDefaults {
    fn default() -> Self {
        Self {
            size: OverlaySize::Medium,
            close_on_escape: true,
            close_on_backdrop_click: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Viewports narrower than this show panels as bottom sheets
    pub narrow_breakpoint: u16,

    /// Redraw interval when idle
    pub tick_rate_ms: u64,

    /// Kitty-style color file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<PathBuf>,

    pub overlay: OverlayDefaults,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            narrow_breakpoint: DEFAULT_NARROW_BREAKPOINT,
            tick_rate_ms: 250,
            theme: None,
            overlay: OverlayDefaults::default(),
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join("scrim");
        Ok(config_dir.join("config.toml"))
    }

    /// Load from `path`, or the default location when none is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::config_path() {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!("{}, using defaults", e);
                    return Ok(AppConfig::default());
                }
            },
        };
        Self::load_from(&path)
    }

    /// Read and parse a file. Missing or malformed files fall back to the
    /// defaults; a parsed but invalid config is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(AppConfig::default());
        }

        let config = match std::fs::read_to_string(path) {
            Ok(content) => match Self::parse(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to parse config: {}", e);
                    AppConfig::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config: {}", e);
                AppConfig::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.narrow_breakpoint < MIN_NARROW_BREAKPOINT {
            return Err(ConfigError::Breakpoint {
                value: self.narrow_breakpoint,
                min: MIN_NARROW_BREAKPOINT,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.overlay.size, OverlaySize::Medium);
        assert!(config.overlay.close_on_escape);
        assert_eq!(config.narrow_breakpoint, DEFAULT_NARROW_BREAKPOINT);
    }

    #[test]
    fn test_partial_overlay_table() {
        let config = AppConfig::parse(
            r#"
            narrow_breakpoint = 50

            [overlay]
            size = "lg"
            close_on_backdrop_click = false
            "#,
        )
        .unwrap();
        assert_eq!(config.overlay.size, OverlaySize::Large);
        assert!(config.overlay.close_on_escape);
        assert!(!config.overlay.close_on_backdrop_click);
        assert_eq!(config.narrow_breakpoint, 50);
        assert_eq!(config.tick_rate_ms, 250);
    }

    #[test]
    fn test_unknown_size_is_rejected() {
        assert!(AppConfig::parse("[overlay]\nsize = \"xl\"\n").is_err());
    }

    #[test]
    fn test_small_breakpoint_is_invalid() {
        let config = AppConfig {
            narrow_breakpoint: 10,
            ..AppConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Breakpoint { value: 10, .. })
        ));
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig {
            overlay: OverlayDefaults {
                size: OverlaySize::Small,
                close_on_escape: false,
                close_on_backdrop_click: true,
            },
            narrow_breakpoint: 72,
            tick_rate_ms: 100,
            theme: Some(PathBuf::from("/tmp/theme.conf")),
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        assert!(serialized.contains("size = \"sm\""));
        let deserialized = AppConfig::parse(&serialized).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_load_falls_back_on_bad_file() {
        let dir = std::env::temp_dir().join(format!("scrim-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");

        std::fs::write(&path, "this is = = not toml").unwrap();
        assert_eq!(AppConfig::load_from(&path).unwrap(), AppConfig::default());

        std::fs::write(&path, "narrow_breakpoint = 5\n").unwrap();
        assert!(AppConfig::load_from(&path).is_err());

        let missing = dir.join("missing.toml");
        assert_eq!(AppConfig::load_from(&missing).unwrap(), AppConfig::default());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
