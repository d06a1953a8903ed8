use crate::aggregator::{AbandonPolicy, Aggregator, QUIET_THRESHOLD, SessionMode};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable pointing at an explicit config file.
pub const CONFIG_ENV: &str = "FRAMESCAN_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ScanConfig {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub overlay: OverlayConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    pub quiet_threshold: u32,
    pub mode: SessionMode,
    pub on_abandon: AbandonPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct OverlayConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_height: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub color: bool,
    pub hyperlinks: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            quiet_threshold: QUIET_THRESHOLD,
            mode: SessionMode::Multi,
            on_abandon: AbandonPolicy::Discard,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            hyperlinks: true,
        }
    }
}

impl OverlayConfig {
    /// Display size, when both dimensions are configured.
    pub fn display(&self) -> Option<(u32, u32)> {
        self.display_width.zip(self.display_height)
    }
}

impl ScanConfig {
    /// Load the config file if there is a usable one, defaults otherwise.
    pub fn load() -> Self {
        if let Some(config_path) = Self::config_file_path()
            && config_path.exists()
        {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => log::warn!("ignoring config: {e}"),
            }
        }
        Self::default()
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ScanConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.quiet_threshold == 0 {
            return Err(ConfigError::Invalid(
                "session.quiet_threshold must be at least 1".into(),
            ));
        }
        if self.overlay.display_width == Some(0) || self.overlay.display_height == Some(0) {
            return Err(ConfigError::Invalid(
                "overlay display dimensions must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn aggregator(&self) -> Aggregator {
        Aggregator::new()
            .with_quiet_threshold(self.session.quiet_threshold)
            .with_mode(self.session.mode)
    }

    pub fn config_file_path() -> Option<PathBuf> {
        if let Some(explicit) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
            return Some(PathBuf::from(explicit));
        }
        Self::config_dir().map(|mut path| {
            path.push("config.toml");
            path
        })
    }

    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("framescan");
            path
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScanConfig::default();
        assert_eq!(config.session.quiet_threshold, 10);
        assert_eq!(config.session.mode, SessionMode::Multi);
        assert_eq!(config.session.on_abandon, AbandonPolicy::Discard);
        assert_eq!(config.overlay.display(), None);
        assert!(config.output.color);
        assert!(config.output.hyperlinks);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let toml_str = toml::to_string(&ScanConfig::default()).unwrap();

        assert!(toml_str.contains("[session]"));
        assert!(toml_str.contains("[output]"));
        assert!(toml_str.contains("quiet_threshold = 10"));
        assert!(toml_str.contains("mode = \"multi\""));
        assert!(toml_str.contains("on_abandon = \"discard\""));
        assert!(!toml_str.contains("display_width"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
[session]
quiet_threshold = 4
mode = "single"
on_abandon = "surface"

[overlay]
display_width = 1080
display_height = 2340

[output]
color = false
hyperlinks = false
"#;

        let config: ScanConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.session.quiet_threshold, 4);
        assert_eq!(config.session.mode, SessionMode::Single);
        assert_eq!(config.session.on_abandon, AbandonPolicy::Surface);
        assert_eq!(config.overlay.display(), Some((1080, 2340)));
        assert!(!config.output.color);
        assert!(!config.output.hyperlinks);
    }

    #[test]
    fn test_config_partial_deserialization() {
        let toml_str = r#"
[session]
quiet_threshold = 3
"#;

        let config: ScanConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.session.quiet_threshold, 3);
        assert_eq!(config.session.mode, SessionMode::Multi);
        assert!(config.output.color);
    }

    #[test]
    fn half_configured_display_is_ignored() {
        let config: ScanConfig = toml::from_str("[overlay]\ndisplay_width = 100\n").unwrap();
        assert_eq!(config.overlay.display(), None);
    }

    #[test]
    fn rejects_zero_threshold() {
        let config: ScanConfig = toml::from_str("[session]\nquiet_threshold = 0\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn builds_configured_aggregator() {
        let mut config = ScanConfig::default();
        config.session.quiet_threshold = 7;
        config.session.mode = SessionMode::Single;
        let agg = config.aggregator();
        assert_eq!(agg.quiet_threshold(), 7);
        assert_eq!(agg.mode(), SessionMode::Single);
    }
}
