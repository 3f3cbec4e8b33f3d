//! # Domain Types
//!
//! The data the totals calculator consumes.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────────┐        ┌──────────────────────┐              │
//! │  │    TaxRateRecord     │        │       LineItem       │              │
//! │  │  ──────────────────  │        │  ──────────────────  │              │
//! │  │  tax_rate_id    ◄────┼────────┼─ taxRateId           │              │
//! │  │  rate_name           │        │  partId              │              │
//! │  │  rate_percentage     │        │  quantity            │              │
//! │  │  is_default          │        │  salePrice           │              │
//! │  └──────────────────────┘        │  discountAmount      │              │
//! │   (REST catalog, snake_case)     │  isTaxInclusive      │              │
//! │                                  └──────────────────────┘              │
//! │                                   (page state, camelCase)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Numeric fields are lenient on the way in: `null`, missing, unparsable
//! and non-numeric JSON values deserialize to zero. Lines arrive as a
//! [`LineItemDraft`] so a missing tax-inclusive flag can take the app's
//! default mode. Strict parsing of what the user
//! typed happens earlier, in [`crate::validation`].

use rust_decimal::Decimal;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::rate::{RawPercentage, Rate};

// =============================================================================
// Lenient Field Deserializers
// =============================================================================

/// Accepts a number, a numeric string, `null`, or garbage; garbage is zero.
fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = RawPercentage::deserialize(deserializer)?;
    Ok(raw.value().unwrap_or_default())
}

/// Accepts `true`/`false`, integers, and `"true"`/`"1"`/`"yes"` style
/// strings. `null` and anything unrecognized read as "not given".
fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Bool(bool),
        Int(i64),
        Text(String),
        Other(IgnoredAny),
    }

    Ok(match Repr::deserialize(deserializer)? {
        Repr::Bool(b) => Some(b),
        Repr::Int(i) => Some(i != 0),
        Repr::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        Repr::Other(_) => None,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_flag(deserializer)?.unwrap_or(false))
}

// =============================================================================
// Tax Rate Id
// =============================================================================

/// Identifier of a tax rate in the backend catalog.
///
/// The REST API sends integers; drafts saved by older clients sent strings.
/// Both deserialize to the same id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct TaxRateId(String);

impl TaxRateId {
    pub fn new(id: impl Into<String>) -> Self {
        TaxRateId(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for TaxRateId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Int(i64),
            Text(String),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Int(i) => TaxRateId(i.to_string()),
            Repr::Text(s) => TaxRateId::new(s),
        })
    }
}

impl From<&str> for TaxRateId {
    fn from(value: &str) -> Self {
        TaxRateId::new(value)
    }
}

impl From<i64> for TaxRateId {
    fn from(value: i64) -> Self {
        TaxRateId(value.to_string())
    }
}

impl fmt::Display for TaxRateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Tax Rate Record
// =============================================================================

/// One entry of the tax rate catalog, as the REST endpoint returns it.
///
/// `rate_percentage` is deliberately kept raw; see [`crate::rate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct TaxRateRecord {
    pub tax_rate_id: TaxRateId,

    pub rate_name: String,

    #[ts(type = "number | string | null")]
    pub rate_percentage: RawPercentage,

    pub is_default: bool,
}

/// The REST payload shape of [`TaxRateRecord`], with every field lenient.
#[derive(Deserialize)]
struct TaxRateRecordWire {
    tax_rate_id: TaxRateId,

    #[serde(default)]
    rate_name: Option<String>,

    #[serde(default)]
    rate_percentage: RawPercentage,

    #[serde(default, deserialize_with = "lenient_bool")]
    is_default: bool,
}

impl<'de> Deserialize<'de> for TaxRateRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wire = TaxRateRecordWire::deserialize(deserializer)?;
        Ok(TaxRateRecord {
            tax_rate_id: wire.tax_rate_id,
            rate_name: wire.rate_name.unwrap_or_default(),
            rate_percentage: wire.rate_percentage,
            is_default: wire.is_default,
        })
    }
}

impl TaxRateRecord {
    pub fn new(id: impl Into<TaxRateId>, name: &str, percentage: RawPercentage) -> Self {
        TaxRateRecord {
            tax_rate_id: id.into(),
            rate_name: name.to_string(),
            rate_percentage: percentage,
            is_default: false,
        }
    }

    /// Marks this record as the catalog default.
    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Returns the normalized rate.
    pub fn rate(&self) -> Rate {
        Rate::normalize(&self.rate_percentage)
    }
}

// =============================================================================
// Tax Mode
// =============================================================================

/// Whether entered prices already contain tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TaxMode {
    /// Price + tax shown separately.
    #[default]
    Exclusive,
    /// Price includes tax; tax is extracted from it.
    Inclusive,
}

impl TaxMode {
    #[inline]
    pub fn is_inclusive(&self) -> bool {
        matches!(self, TaxMode::Inclusive)
    }
}

impl From<bool> for TaxMode {
    fn from(inclusive: bool) -> Self {
        if inclusive {
            TaxMode::Inclusive
        } else {
            TaxMode::Exclusive
        }
    }
}

impl fmt::Display for TaxMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaxMode::Exclusive => write!(f, "exclusive"),
            TaxMode::Inclusive => write!(f, "inclusive"),
        }
    }
}

impl std::str::FromStr for TaxMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exclusive" | "excl" | "false" => Ok(TaxMode::Exclusive),
            "inclusive" | "incl" | "true" => Ok(TaxMode::Inclusive),
            _ => Err(ValidationError::NotAllowed {
                field: "tax_mode".to_string(),
                allowed: vec!["exclusive".to_string(), "inclusive".to_string()],
            }),
        }
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// A line on an invoice or in the POS cart.
///
/// Deserializes through [`LineItemDraft`]; a line that does not say whether
/// its price includes tax is exclusive.
///
/// ## Invariants
/// - `line_total = quantity × sale_price − discount_amount`
/// - Immutable for the duration of a totals computation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineItem {
    pub part_id: Option<String>,

    #[ts(type = "string")]
    pub quantity: Decimal,

    #[ts(type = "string")]
    pub sale_price: Decimal,

    #[ts(type = "string")]
    pub discount_amount: Decimal,

    pub tax_rate_id: Option<TaxRateId>,

    pub is_tax_inclusive: bool,
}

impl<'de> Deserialize<'de> for LineItem {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        LineItemDraft::deserialize(deserializer).map(LineItem::from)
    }
}

impl LineItem {
    /// Creates an exclusive line with no discount and no explicit rate.
    pub fn new(quantity: Decimal, sale_price: Decimal) -> Self {
        LineItem {
            part_id: None,
            quantity,
            sale_price,
            discount_amount: Decimal::ZERO,
            tax_rate_id: None,
            is_tax_inclusive: false,
        }
    }

    pub fn with_part(mut self, part_id: impl Into<String>) -> Self {
        self.part_id = Some(part_id.into());
        self
    }

    pub fn with_discount(mut self, discount: Decimal) -> Self {
        self.discount_amount = discount;
        self
    }

    pub fn with_tax_rate(mut self, id: impl Into<TaxRateId>) -> Self {
        self.tax_rate_id = Some(id.into());
        self
    }

    pub fn with_tax_mode(mut self, mode: TaxMode) -> Self {
        self.is_tax_inclusive = mode.is_inclusive();
        self
    }

    /// The entered ("gross") amount of the line, before any tax handling.
    ///
    /// Saturates instead of overflowing.
    pub fn line_total(&self) -> Decimal {
        self.quantity
            .saturating_mul(self.sale_price)
            .saturating_sub(self.discount_amount)
    }

    #[inline]
    pub fn tax_mode(&self) -> TaxMode {
        TaxMode::from(self.is_tax_inclusive)
    }
}

// =============================================================================
// Line Item Draft
// =============================================================================

/// A line as stored in a saved quote or sent by the page, before the
/// app-wide tax mode is applied.
///
/// Numeric fields are lenient. `is_tax_inclusive` stays `None` when the
/// document does not say, so the caller's default mode can fill it in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemDraft {
    #[serde(default)]
    pub part_id: Option<String>,

    #[serde(default, deserialize_with = "lenient_decimal")]
    pub quantity: Decimal,

    #[serde(default, deserialize_with = "lenient_decimal")]
    pub sale_price: Decimal,

    #[serde(default, deserialize_with = "lenient_decimal")]
    pub discount_amount: Decimal,

    #[serde(default)]
    pub tax_rate_id: Option<TaxRateId>,

    #[serde(default, deserialize_with = "lenient_flag")]
    pub is_tax_inclusive: Option<bool>,
}

impl LineItemDraft {
    /// Builds the line, using `default_mode` when the draft has no flag.
    pub fn into_line(self, default_mode: TaxMode) -> LineItem {
        LineItem {
            part_id: self.part_id,
            quantity: self.quantity,
            sale_price: self.sale_price,
            discount_amount: self.discount_amount,
            tax_rate_id: self.tax_rate_id,
            is_tax_inclusive: self.is_tax_inclusive.unwrap_or(default_mode.is_inclusive()),
        }
    }
}

impl From<LineItemDraft> for LineItem {
    fn from(draft: LineItemDraft) -> Self {
        draft.into_line(TaxMode::default())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
