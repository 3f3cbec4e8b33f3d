//! # Validation Module
//!
//! Parses what the user typed into line item fields.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form input (THIS MODULE)                                     │
//! │  ├── Strict: "12,x" in a quantity box is an error the user sees        │
//! │  └── LineItemForm ──TryFrom──► LineItem                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Cart (cart.rs)                                               │
//! │  └── Line and quantity limits                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Totals calculator                                            │
//! │  └── Lenient: whatever still slips through counts as zero              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Percentages are the exception: catalog data arrives in two notations and
//! with stray `%` signs, so `parse_percentage` never fails and leaves the
//! interpretation to [`crate::rate::Rate::normalize`].
//!
//! ## Usage
//! ```rust
//! use bizdesk_core::validation::{parse_quantity, LineItemForm};
//! use bizdesk_core::LineItem;
//!
//! assert!(parse_quantity("3").is_ok());
//! assert!(parse_quantity("0").is_err());
//!
//! let form = LineItemForm {
//!     quantity: "2".into(),
//!     sale_price: "100".into(),
//!     tax_rate_id: "1".into(),
//!     ..LineItemForm::default()
//! };
//! let line = LineItem::try_from(form).unwrap();
//! assert_eq!(line.line_total().to_string(), "200");
//! ```

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::rate::{parse_lenient, RawPercentage};
use crate::types::{LineItem, TaxRateId};
use crate::MAX_LINE_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Most decimal places accepted in a typed amount.
pub const MAX_AMOUNT_DECIMALS: u32 = 4;

// =============================================================================
// Field Parsers
// =============================================================================

fn parse_decimal(field: &str, input: &str) -> ValidationResult<Decimal> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Decimal::from_str(trimmed).map_err(|_| ValidationError::InvalidNumber {
        field: field.to_string(),
        value: trimmed.to_string(),
    })
}

fn check_amount(field: &str, value: Decimal) -> ValidationResult<Decimal> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: "0".to_string(),
            max: "unbounded".to_string(),
        });
    }

    if value.normalize().scale() > MAX_AMOUNT_DECIMALS {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("at most {} decimal places", MAX_AMOUNT_DECIMALS),
        });
    }

    Ok(value)
}

/// Parses a line quantity.
///
/// ## Rules
/// - Must be a number
/// - Must be positive (> 0)
/// - Must not exceed `MAX_LINE_QUANTITY`
///
/// Fractional quantities are allowed (hours, meters).
pub fn parse_quantity(input: &str) -> ValidationResult<Decimal> {
    let qty = parse_decimal("quantity", input)?;

    if qty <= Decimal::ZERO {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > Decimal::from(MAX_LINE_QUANTITY) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: "0".to_string(),
            max: MAX_LINE_QUANTITY.to_string(),
        });
    }

    Ok(qty)
}

/// Parses a unit price. Zero is allowed (free items).
///
/// ```rust
/// use bizdesk_core::validation::parse_amount;
///
/// assert!(parse_amount("10.99").is_ok());
/// assert!(parse_amount("0").is_ok());
/// assert!(parse_amount("-1").is_err());
/// assert!(parse_amount("ten").is_err());
/// ```
pub fn parse_amount(input: &str) -> ValidationResult<Decimal> {
    check_amount("sale_price", parse_decimal("sale_price", input)?)
}

/// Parses a line discount. An empty box means no discount.
pub fn parse_discount(input: &str) -> ValidationResult<Decimal> {
    if input.trim().is_empty() {
        return Ok(Decimal::ZERO);
    }
    check_amount("discount_amount", parse_decimal("discount_amount", input)?)
}

/// Reads a percentage as typed or as stored in the catalog.
///
/// Never fails: unparsable text is kept as [`RawPercentage::Text`] and
/// normalizes to zero later.
pub fn parse_percentage(input: &str) -> RawPercentage {
    if input.trim().is_empty() {
        return RawPercentage::Missing;
    }

    match parse_lenient(input) {
        Some(value) => RawPercentage::Value(value),
        None => RawPercentage::Text(input.trim().to_string()),
    }
}

// =============================================================================
// Line Item Form
// =============================================================================

/// A line item exactly as the invoicing page's fields hold it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineItemForm {
    pub part_id: String,
    pub quantity: String,
    pub sale_price: String,
    pub discount_amount: String,
    /// Empty selects the fallback rate.
    pub tax_rate_id: String,
    pub is_tax_inclusive: bool,
}

impl TryFrom<LineItemForm> for LineItem {
    type Error = ValidationError;

    fn try_from(form: LineItemForm) -> Result<Self, Self::Error> {
        let quantity = parse_quantity(&form.quantity)?;
        let sale_price = parse_amount(&form.sale_price)?;
        let discount = parse_discount(&form.discount_amount)?;

        let gross = quantity.saturating_mul(sale_price);
        if discount > gross {
            return Err(ValidationError::DiscountExceedsLine {
                discount: discount.to_string(),
                line_amount: gross.to_string(),
            });
        }

        let part_id = form.part_id.trim();
        let tax_rate_id = form.tax_rate_id.trim();

        Ok(LineItem {
            part_id: (!part_id.is_empty()).then(|| part_id.to_string()),
            quantity,
            sale_price,
            discount_amount: discount,
            tax_rate_id: (!tax_rate_id.is_empty()).then(|| TaxRateId::new(tax_rate_id)),
            is_tax_inclusive: form.is_tax_inclusive,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
