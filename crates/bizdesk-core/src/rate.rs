//! # Tax Rate Normalization
//!
//! The backend stores `rate_percentage` loosely: sometimes as a fraction
//! (`0.12`), sometimes as a whole percent (`12`), sometimes as a string,
//! sometimes not at all. This module turns all of that into one [`Rate`].
//!
//! ## Normalization Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  RawPercentage                     Rate (fraction)                      │
//! │                                                                         │
//! │  null / "" / "abc" / NaN  ───────► 0                                   │
//! │  negative or zero         ───────► 0                                   │
//! │  0 < r <= 1               ───────► r            (already a fraction)    │
//! │  r > 1                    ───────► r / 100      (percent notation)      │
//! │                                                                         │
//! │  Per line, after resolution:                                           │
//! │  rate > 1                 ───────► rate / 100   (clamp, logged)        │
//! │                                                                         │
//! │  Examples: 12 → 0.12, 0.12 → 0.12, 900 → 9 → clamp → 0.09             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Raw Percentage
// =============================================================================

/// A tax percentage exactly as received, before any interpretation.
///
/// Deserialization never fails. Numbers and numeric strings become
/// [`RawPercentage::Value`]; any other string is kept verbatim as
/// [`RawPercentage::Text`] and normalizes to zero unless it parses
/// leniently (`" 12 "`, `"12%"`). `null`, booleans, objects, arrays and
/// numbers outside `Decimal`'s range become [`RawPercentage::Missing`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(untagged)]
pub enum RawPercentage {
    /// Absent, `null`, or non-finite.
    #[default]
    Missing,
    /// A numeric value in either notation.
    Value(Decimal),
    /// A string that was not a plain decimal literal.
    Text(String),
}

impl RawPercentage {
    /// Wraps a float coming from a form or a JS number.
    ///
    /// NaN and infinities become [`RawPercentage::Missing`].
    pub fn from_f64(value: f64) -> Self {
        match Decimal::from_f64(value) {
            Some(d) if value.is_finite() => RawPercentage::Value(d),
            _ => RawPercentage::Missing,
        }
    }

    /// Returns the numeric value if one can be recovered.
    pub fn value(&self) -> Option<Decimal> {
        match self {
            RawPercentage::Missing => None,
            RawPercentage::Value(d) => Some(*d),
            RawPercentage::Text(s) => parse_lenient(s),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, RawPercentage::Missing)
    }
}

impl<'de> Deserialize<'de> for RawPercentage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Value(Decimal),
            Text(String),
            Other(IgnoredAny),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Value(d) => RawPercentage::Value(d),
            Repr::Text(s) => RawPercentage::Text(s),
            Repr::Other(_) => RawPercentage::Missing,
        })
    }
}

impl From<Decimal> for RawPercentage {
    fn from(value: Decimal) -> Self {
        RawPercentage::Value(value)
    }
}

impl From<Option<Decimal>> for RawPercentage {
    fn from(value: Option<Decimal>) -> Self {
        value.map_or(RawPercentage::Missing, RawPercentage::Value)
    }
}

impl From<&str> for RawPercentage {
    fn from(value: &str) -> Self {
        match Decimal::from_str(value) {
            Ok(d) => RawPercentage::Value(d),
            Err(_) => RawPercentage::Text(value.to_string()),
        }
    }
}

impl fmt::Display for RawPercentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawPercentage::Missing => write!(f, "<missing>"),
            RawPercentage::Value(d) => write!(f, "{}", d),
            RawPercentage::Text(s) => write!(f, "{:?}", s),
        }
    }
}

/// Parses `" 12.5 "` and `"12.5%"`; returns `None` for anything else.
pub(crate) fn parse_lenient(input: &str) -> Option<Decimal> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed).ok()
}

// =============================================================================
// Rate
// =============================================================================

/// A normalized tax rate as a non-negative fraction (`0.12` = 12%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rate(Decimal);

impl Rate {
    pub const ZERO: Rate = Rate(Decimal::ZERO);

    /// Creates a rate from a value already known to be a fraction.
    ///
    /// Negative input is treated as zero.
    pub fn from_fraction(fraction: Decimal) -> Self {
        if fraction.is_sign_negative() {
            Rate::ZERO
        } else {
            Rate(fraction)
        }
    }

    /// Applies the normalization rule to a raw backend value.
    ///
    /// ```rust
    /// use bizdesk_core::rate::{RawPercentage, Rate};
    /// use rust_decimal::Decimal;
    ///
    /// let whole = Rate::normalize(&RawPercentage::from(Decimal::from(12)));
    /// let fraction = Rate::normalize(&RawPercentage::from(Decimal::new(12, 2)));
    /// assert_eq!(whole, fraction);
    /// assert_eq!(Rate::normalize(&RawPercentage::Missing), Rate::ZERO);
    /// ```
    pub fn normalize(raw: &RawPercentage) -> Self {
        let value = match raw.value() {
            Some(v) if v > Decimal::ZERO => v,
            _ => return Rate::ZERO,
        };

        if value <= Decimal::ONE {
            Rate(value)
        } else {
            Rate(value / Decimal::ONE_HUNDRED)
        }
    }

    /// Second-chance clamp for a rate that still exceeds 100%.
    ///
    /// Returns the adjusted rate and whether the clamp fired. A raw `900`
    /// normalizes to `9` and clamps to `0.09`. Only one division is applied.
    pub fn clamp_for_line(self) -> (Rate, bool) {
        if self.0 > Decimal::ONE {
            (Rate(self.0 / Decimal::ONE_HUNDRED), true)
        } else {
            (self, false)
        }
    }

    #[inline]
    pub fn fraction(&self) -> Decimal {
        self.0
    }

    /// Returns the rate in percent for display (`0.12 → 12`).
    pub fn as_percent(&self) -> Decimal {
        (self.0 * Decimal::ONE_HUNDRED).normalize()
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percent())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn normalized(raw: RawPercentage) -> Decimal {
        Rate::normalize(&raw).fraction()
    }

    #[test]
    fn test_normalize_fraction_passes_through() {
        assert_eq!(normalized(dec("0.12").into()), dec("0.12"));
        assert_eq!(normalized(dec("1").into()), dec("1"));
        assert_eq!(normalized(dec("0.005").into()), dec("0.005"));
    }

    #[test]
    fn test_normalize_percent_notation() {
        assert_eq!(normalized(dec("12").into()), dec("0.12"));
        assert_eq!(normalized(dec("1.5").into()), dec("0.015"));
        assert_eq!(normalized(dec("100").into()), dec("1"));
    }

    #[test]
    fn test_normalize_invalid_becomes_zero() {
        assert_eq!(normalized(RawPercentage::Missing), Decimal::ZERO);
        assert_eq!(normalized(dec("-5").into()), Decimal::ZERO);
        assert_eq!(normalized(dec("0").into()), Decimal::ZERO);
        assert_eq!(normalized(RawPercentage::Text("abc".into())), Decimal::ZERO);
        assert_eq!(normalized(RawPercentage::Text(String::new())), Decimal::ZERO);
        assert_eq!(normalized(RawPercentage::from_f64(f64::NAN)), Decimal::ZERO);
    }

    #[test]
    fn test_normalize_lenient_text() {
        assert_eq!(normalized(RawPercentage::Text(" 12 ".into())), dec("0.12"));
        assert_eq!(normalized(RawPercentage::Text("12%".into())), dec("0.12"));
        assert_eq!(normalized(RawPercentage::Text("%".into())), Decimal::ZERO);
    }

    #[test]
    fn test_clamp_for_line() {
        let rate = Rate::normalize(&dec("900").into());
        assert_eq!(rate.fraction(), dec("9"));

        let (clamped, fired) = rate.clamp_for_line();
        assert!(fired);
        assert_eq!(clamped.fraction(), dec("0.09"));

        let (same, fired) = Rate::from_fraction(dec("0.12")).clamp_for_line();
        assert!(!fired);
        assert_eq!(same.fraction(), dec("0.12"));
    }

    #[test]
    fn test_from_f64() {
        assert_eq!(RawPercentage::from_f64(12.0).value(), Some(dec("12")));
        assert!(RawPercentage::from_f64(f64::INFINITY).is_missing());
    }

    #[test]
    fn test_deserialize_variants() {
        let parsed: Vec<RawPercentage> =
            serde_json::from_str(r#"[null, 12, 0.12, "8.25", "abc"]"#).unwrap();

        assert_eq!(parsed[0], RawPercentage::Missing);
        assert_eq!(parsed[1].value(), Some(dec("12")));
        assert_eq!(parsed[2].value(), Some(dec("0.12")));
        assert_eq!(parsed[3], RawPercentage::Value(dec("8.25")));
        assert_eq!(parsed[4], RawPercentage::Text("abc".into()));
    }

    #[test]
    fn test_deserialize_never_fails() {
        let parsed: Vec<RawPercentage> =
            serde_json::from_str(r#"[true, false, {"v": 12}, [12], 1e30, -1e30]"#).unwrap();

        assert_eq!(parsed.len(), 6);
        assert!(parsed.iter().all(RawPercentage::is_missing));
        assert!(parsed.iter().all(|raw| Rate::normalize(raw).is_zero()));
    }

    #[test]
    fn test_rate_display() {
        assert_eq!(Rate::from_fraction(dec("0.12")).to_string(), "12%");
        assert_eq!(Rate::from_fraction(dec("0.0825")).to_string(), "8.25%");
    }
}
