//! # Calculator Configuration
//!
//! App-wide settings that affect totals, passed explicitly instead of read
//! from ambient state.
//!
//! ## Where Values Come From
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Settings page / bizdesk.toml / BIZDESK_* env   (apps/cli)              │
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │  CalculatorConfig (THIS FILE) ──► TotalsCalculator::new(config)         │
//! │                                                                         │
//! │  The core never loads configuration itself.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::TaxMode;

// =============================================================================
// Anomaly Thresholds
// =============================================================================

/// Heuristic limits for the advisory anomaly checks.
///
/// Both defaults come from the production pages. Their intent for edge
/// cases (compound surcharges above 100%) is unverified, so they stay
/// tunable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyThresholds {
    /// Effective rate (`tax_total / net_subtotal`) above which
    /// `HIGH_EFFECTIVE_RATE` is raised. Default: 1 (100%).
    pub high_effective_rate: Decimal,

    /// Allowed gap between the recomposed total and the entered amounts
    /// before `RECOMPOSE_MISMATCH` is raised. Default: 0.05.
    pub recompose_tolerance: Decimal,
}

impl Default for AnomalyThresholds {
    fn default() -> Self {
        AnomalyThresholds {
            high_effective_rate: Decimal::ONE,
            recompose_tolerance: Decimal::new(5, 2),
        }
    }
}

// =============================================================================
// Currency Format
// =============================================================================

/// How amounts are rendered for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyFormat {
    /// ISO 4217 code.
    pub code: String,

    /// Symbol placed before the amount.
    pub symbol: String,

    /// Digits shown after the decimal point. Amounts are held in cents, so
    /// values above 2 pad with zeros.
    pub decimals: u8,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        CurrencyFormat {
            code: "USD".to_string(),
            symbol: "$".to_string(),
            decimals: 2,
        }
    }
}

impl CurrencyFormat {
    /// Formats a money value as a currency string.
    ///
    /// ## Example
    /// ```rust
    /// use bizdesk_core::config::CurrencyFormat;
    /// use bizdesk_core::Money;
    ///
    /// let php = CurrencyFormat { code: "PHP".into(), symbol: "₱".into(), decimals: 2 };
    /// assert_eq!(php.format(Money::from_cents(26900)), "₱269.00");
    /// assert_eq!(php.format(Money::from_cents(-1234)), "-₱12.34");
    /// ```
    pub fn format(&self, amount: Money) -> String {
        let sign = if amount.is_negative() { "-" } else { "" };
        let value = amount.abs().to_decimal();
        let value = value.round_dp_with_strategy(
            self.decimals as u32,
            RoundingStrategy::MidpointAwayFromZero,
        );

        format!(
            "{}{}{:.prec$}",
            sign,
            self.symbol,
            value,
            prec = self.decimals as usize
        )
    }
}

// =============================================================================
// Calculator Configuration
// =============================================================================

/// Everything the calculator and its callers need from app settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    /// Anomaly detection limits.
    pub thresholds: AnomalyThresholds,

    /// Pricing mode for new cart lines and for drafts that do not say.
    pub default_tax_mode: TaxMode,

    /// Display currency.
    pub currency: CurrencyFormat,
}

impl CalculatorConfig {
    /// Checks the configuration for values the calculator cannot use.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.thresholds.high_effective_rate.is_sign_negative() {
            return Err(ValidationError::MustBePositive {
                field: "thresholds.high_effective_rate".to_string(),
            });
        }

        if self.thresholds.recompose_tolerance.is_sign_negative() {
            return Err(ValidationError::MustBePositive {
                field: "thresholds.recompose_tolerance".to_string(),
            });
        }

        if self.currency.decimals > 4 {
            return Err(ValidationError::OutOfRange {
                field: "currency.decimals".to_string(),
                min: "0".to_string(),
                max: "4".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let thresholds = AnomalyThresholds::default();
        assert_eq!(thresholds.high_effective_rate, Decimal::ONE);
        assert_eq!(thresholds.recompose_tolerance, Decimal::new(5, 2));
    }

    #[test]
    fn test_format_currency_positive() {
        let currency = CurrencyFormat::default();
        assert_eq!(currency.format(Money::from_cents(1234)), "$12.34");
        assert_eq!(currency.format(Money::from_cents(100)), "$1.00");
        assert_eq!(currency.format(Money::from_cents(1)), "$0.01");
        assert_eq!(currency.format(Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_format_currency_negative() {
        let currency = CurrencyFormat::default();
        assert_eq!(currency.format(Money::from_cents(-1234)), "-$12.34");
    }

    #[test]
    fn test_format_currency_decimals() {
        let whole = CurrencyFormat {
            code: "JPY".to_string(),
            symbol: "¥".to_string(),
            decimals: 0,
        };
        assert_eq!(whole.format(Money::from_cents(123456)), "¥1235");

        let wide = CurrencyFormat {
            decimals: 3,
            ..CurrencyFormat::default()
        };
        assert_eq!(wide.format(Money::from_cents(1234)), "$12.340");
    }

    #[test]
    fn test_validate() {
        let mut config = CalculatorConfig::default();
        assert!(config.validate().is_ok());

        config.thresholds.recompose_tolerance = Decimal::new(-1, 2);
        assert!(config.validate().is_err());

        config.thresholds.recompose_tolerance = Decimal::new(5, 2);
        config.currency.decimals = 6;
        assert!(config.validate().is_err());
    }
}
