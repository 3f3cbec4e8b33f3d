//! # CLI Configuration
//!
//! Loads the settings the calculator runs with.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BIZDESK_CURRENCY_SYMBOL=₱                                          │
//! │     BIZDESK_TAX_MODE=inclusive                                         │
//! │                                                                         │
//! │  2. TOML Config File (--config, or the platform default)               │
//! │     ~/.config/bizdesk/bizdesk.toml (Linux)                             │
//! │     ~/Library/Application Support/com.bizdesk.bizdesk/bizdesk.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     USD, exclusive pricing, thresholds 1 and 0.05                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # bizdesk.toml
//! [calculator]
//! default_tax_mode = "exclusive"  # exclusive | inclusive
//!
//! [currency]
//! code = "PHP"
//! symbol = "₱"
//! decimals = 2
//!
//! [thresholds]
//! high_effective_rate = "1"
//! recompose_tolerance = "0.05"
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;

use bizdesk_core::{AnomalyThresholds, CalculatorConfig, CurrencyFormat, TaxMode, ValidationError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};

/// File name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "bizdesk.toml";

// =============================================================================
// Calculator Settings
// =============================================================================

/// The `[calculator]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorSettings {
    /// Pricing mode for quote lines without `isTaxInclusive`.
    pub default_tax_mode: TaxMode,
}

// =============================================================================
// App Configuration
// =============================================================================

/// Complete CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub calculator: CalculatorSettings,

    #[serde(default)]
    pub currency: CurrencyFormat,

    #[serde(default)]
    pub thresholds: AnomalyThresholds,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`bizdesk.toml`)
    /// 3. Environment variables
    ///
    /// An explicit `config_path` that does not exist is an error; a missing
    /// default file is not.
    pub fn load(config_path: Option<&Path>) -> AppResult<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
                None => Self::default(),
            },
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    fn from_file(path: &Path) -> AppResult<Self> {
        info!(?path, "Loading config from file");
        let contents = std::fs::read_to_string(path).map_err(|source| AppError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.currency.code.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "currency.code".to_string(),
            });
        }

        self.calculator_config().validate()
    }

    /// Applies `BIZDESK_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup; unparsable values are skipped
    /// with a warning.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(symbol) = lookup("BIZDESK_CURRENCY_SYMBOL") {
            debug!(symbol = %symbol, "Overriding currency symbol from environment");
            self.currency.symbol = symbol;
        }

        if let Some(code) = lookup("BIZDESK_CURRENCY_CODE") {
            debug!(code = %code, "Overriding currency code from environment");
            self.currency.code = code;
        }

        if let Some(mode) = lookup("BIZDESK_TAX_MODE") {
            match mode.parse::<TaxMode>() {
                Ok(parsed) => self.calculator.default_tax_mode = parsed,
                Err(_) => warn!(mode = %mode, "Unknown tax mode in environment"),
            }
        }

        if let Some(value) = lookup("BIZDESK_HIGH_RATE_THRESHOLD") {
            match Decimal::from_str(value.trim()) {
                Ok(parsed) => self.thresholds.high_effective_rate = parsed,
                Err(_) => warn!(value = %value, "Invalid BIZDESK_HIGH_RATE_THRESHOLD"),
            }
        }

        if let Some(value) = lookup("BIZDESK_RECOMPOSE_TOLERANCE") {
            match Decimal::from_str(value.trim()) {
                Ok(parsed) => self.thresholds.recompose_tolerance = parsed,
                Err(_) => warn!(value = %value, "Invalid BIZDESK_RECOMPOSE_TOLERANCE"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "bizdesk", "bizdesk")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// The part of the configuration the core calculator takes.
    pub fn calculator_config(&self) -> CalculatorConfig {
        CalculatorConfig {
            thresholds: self.thresholds.clone(),
            default_tax_mode: self.calculator.default_tax_mode,
            currency: self.currency.clone(),
        }
    }

    /// Renders the configuration as a `bizdesk.toml` file.
    pub fn to_toml(&self) -> AppResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.currency.code, "USD");
        assert_eq!(config.calculator.default_tax_mode, TaxMode::Exclusive);
        assert_eq!(config.thresholds.high_effective_rate, Decimal::ONE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_file() {
        let config: AppConfig = toml::from_str(
            r#"
            [currency]
            code = "PHP"
            symbol = "₱"

            [thresholds]
            recompose_tolerance = "0.10"
            "#,
        )
        .unwrap();

        assert_eq!(config.currency.code, "PHP");
        assert_eq!(config.currency.decimals, 2);
        assert_eq!(config.thresholds.recompose_tolerance, Decimal::new(10, 2));
        assert_eq!(config.thresholds.high_effective_rate, Decimal::ONE);
        assert_eq!(config.calculator.default_tax_mode, TaxMode::Exclusive);
    }

    #[test]
    fn test_env_overrides() {
        let vars = env(&[
            ("BIZDESK_CURRENCY_SYMBOL", "€"),
            ("BIZDESK_CURRENCY_CODE", "EUR"),
            ("BIZDESK_TAX_MODE", "inclusive"),
            ("BIZDESK_HIGH_RATE_THRESHOLD", "0.5"),
            ("BIZDESK_RECOMPOSE_TOLERANCE", " 0.01 "),
        ]);
        let mut config = AppConfig::default();
        config.apply_overrides(|key| vars.get(key).cloned());

        assert_eq!(config.currency.symbol, "€");
        assert_eq!(config.currency.code, "EUR");
        assert_eq!(config.calculator.default_tax_mode, TaxMode::Inclusive);
        assert_eq!(config.thresholds.high_effective_rate, Decimal::new(5, 1));
        assert_eq!(config.thresholds.recompose_tolerance, Decimal::new(1, 2));
    }

    #[test]
    fn test_invalid_env_values_are_ignored() {
        let vars = env(&[
            ("BIZDESK_TAX_MODE", "sometimes"),
            ("BIZDESK_HIGH_RATE_THRESHOLD", "lots"),
        ]);
        let mut config = AppConfig::default();
        config.apply_overrides(|key| vars.get(key).cloned());

        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();
        config.currency.code = "  ".to_string();
        assert!(config.validate().is_err());

        config.currency.code = "USD".to_string();
        config.thresholds.high_effective_rate = Decimal::new(-1, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = AppConfig::load(Some(Path::new("/nonexistent/bizdesk.toml")));
        assert!(matches!(result, Err(AppError::Read { .. })));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = AppConfig::default();
        config.calculator.default_tax_mode = TaxMode::Inclusive;
        config.currency.symbol = "₱".to_string();

        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("[thresholds]"));
        assert!(rendered.contains("default_tax_mode = \"inclusive\""));

        let parsed: AppConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
