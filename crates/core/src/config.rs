//! Configuration types

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::{ConverterError, ConverterResult, Observation};

/// Converter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    pub refresh_interval_secs: u64,
    pub parallel: bool,
}

impl ConverterConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 300,
            parallel: true,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: String,
    pub converter: ConverterConfig,
    /// Static observations, used when no live feed is wired in
    pub observations: Vec<Observation>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            converter: ConverterConfig::default(),
            observations: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load from an optional TOML file, overridden by `FX__`-prefixed environment variables
    /// (e.g. `FX__CONVERTER__PARALLEL=false`).
    pub fn load(path: &Path) -> ConverterResult<Self> {
        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix("FX")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConverterError::InvalidConfig(e.to_string()))?;

        Self::from_settings(settings)
    }

    pub fn from_toml_str(contents: &str) -> ConverterResult<Self> {
        let settings = Config::builder()
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()
            .map_err(|e| ConverterError::InvalidConfig(e.to_string()))?;

        Self::from_settings(settings)
    }

    fn from_settings(settings: Config) -> ConverterResult<Self> {
        let config: Self = settings
            .try_deserialize()
            .map_err(|e| ConverterError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConverterResult<()> {
        if self.converter.refresh_interval_secs == 0 {
            return Err(ConverterError::InvalidConfig(
                "converter.refresh_interval_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.converter.refresh_interval(), Duration::from_secs(300));
        assert!(config.converter.parallel);
        assert!(config.observations.is_empty());
    }

    #[test]
    fn test_parse_toml() {
        let config = AppConfig::from_toml_str(
            r#"
            log_level = "debug"

            [converter]
            refresh_interval_secs = 30
            parallel = false

            [[observations]]
            from = "A"
            to = "B"
            rate = 2.0

            [[observations]]
            from = "B"
            to = "C"
            rate = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.converter.refresh_interval_secs, 30);
        assert!(!config.converter.parallel);
        assert_eq!(config.observations.len(), 2);
        assert_eq!(config.observations[1].from.as_str(), "B");
        assert_eq!(config.observations[1].rate, 4.0);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str("log_level = \"warn\"").unwrap();
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.converter.refresh_interval_secs, 300);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let result = AppConfig::from_toml_str("[converter]\nrefresh_interval_secs = 0");
        assert!(matches!(result, Err(ConverterError::InvalidConfig(_))));
    }

    #[test]
    fn test_empty_currency_in_config_rejected() {
        let result = AppConfig::from_toml_str(
            "[[observations]]\nfrom = \"\"\nto = \"B\"\nrate = 1.0",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load(Path::new("/nonexistent/fx-config.toml")).unwrap();
        assert!(config.observations.is_empty());
    }
}
