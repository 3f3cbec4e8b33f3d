//! # Totals Calculator
//!
//! The one place invoice and POS totals are computed.
//!
//! ## Single Pass Over the Lines
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  for each line:                                                         │
//! │                                                                         │
//! │    line_total = qty × price − discount ──────────────► gross (+=)       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │    rate = table[tax_rate_id] ?: fallback                                │
//! │    rate = normalize(rate), clamp if > 100%                              │
//! │         │                                                               │
//! │         ├── inclusive:  base = total / (1 + rate)                       │
//! │         │               tax  = total − base                             │
//! │         │                                                               │
//! │         └── exclusive:  base = total                                    │
//! │                         tax  = total × rate                             │
//! │         │                                                               │
//! │         ▼                                                               │
//! │    tax rounded to cents PER LINE ────────────────────► tax_total (+=)   │
//! │    base kept unrounded ──────────────────────────────► net (+=)         │
//! │                                                                         │
//! │  finally:  net, gross → cents;  grand = net + tax;  anomaly check       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//! - Pure: no I/O, inputs are borrowed immutably, same input = same output
//! - Never fails: bad numbers were already coerced to zero upstream
//! - At most one anomaly, and it is advisory only
//!
//! ## Example
//! ```rust
//! use bizdesk_core::{LineItem, RawPercentage, TaxRateTable, compute_totals};
//! use rust_decimal::Decimal;
//!
//! let rates: TaxRateTable = vec![("vat", RawPercentage::from(Decimal::from(12)))]
//!     .into_iter()
//!     .collect();
//! let lines = vec![
//!     LineItem::new(Decimal::from(2), Decimal::from(100)).with_tax_rate("vat"),
//! ];
//!
//! let totals = compute_totals(&lines, &rates, &RawPercentage::Missing);
//! assert_eq!(totals.tax_total.cents(), 2400);
//! assert_eq!(totals.grand_total.cents(), 22400);
//! assert!(totals.anomaly.is_none());
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ts_rs::TS;

use crate::catalog::TaxRateTable;
use crate::config::{AnomalyThresholds, CalculatorConfig, CurrencyFormat};
use crate::money::Money;
use crate::rate::{RawPercentage, Rate};
use crate::types::LineItem;

// =============================================================================
// Result Types
// =============================================================================

/// Where a line's rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RateSource {
    /// The line's `tax_rate_id` resolved in the table.
    Table,
    /// The id was absent or unknown; the fallback rate applied.
    Fallback,
}

/// Per-line detail, for tooltips and receipts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineBreakdown {
    /// Position in the input slice.
    pub index: usize,

    pub part_id: Option<String>,

    /// Entered amount (`qty × price − discount`), rounded to cents.
    pub line_total: Money,

    /// Effective rate after normalization and clamping.
    #[ts(type = "string")]
    pub rate: Rate,

    pub rate_source: RateSource,

    /// The rate exceeded 100% after normalization and was divided again.
    pub rate_clamped: bool,

    pub is_tax_inclusive: bool,

    /// Tax base, rounded to cents for display only.
    pub tax_base: Money,

    /// Tax for this line, rounded to cents.
    pub tax_amount: Money,
}

/// Which advisory check fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnomalyKind {
    HighEffectiveRate,
    RecomposeMismatch,
}

impl AnomalyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyKind::HighEffectiveRate => "HIGH_EFFECTIVE_RATE",
            AnomalyKind::RecomposeMismatch => "RECOMPOSE_MISMATCH",
        }
    }
}

/// Advisory diagnostic attached to a totals result.
///
/// Rendered as a warning banner; never blocks posting an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum Anomaly {
    /// `tax_total / net_subtotal` is above the configured limit.
    #[serde(rename_all = "camelCase")]
    HighEffectiveRate {
        /// Ratio, rounded to 4 decimal places (`2.5` = 250%).
        #[ts(type = "string")]
        effective_rate: Decimal,
        net_subtotal: Money,
        tax_total: Money,
    },

    /// Net + tax does not add back up to what was entered.
    #[serde(rename_all = "camelCase")]
    RecomposeMismatch {
        /// `net_subtotal + tax_total`.
        recomposed: Money,
        /// `gross_subtotal + tax on exclusive lines`.
        expected: Money,
        /// `|recomposed − expected|`.
        difference: Money,
    },
}

impl Anomaly {
    pub fn kind(&self) -> AnomalyKind {
        match self {
            Anomaly::HighEffectiveRate { .. } => AnomalyKind::HighEffectiveRate,
            Anomaly::RecomposeMismatch { .. } => AnomalyKind::RecomposeMismatch,
        }
    }

    /// Warning banner text.
    pub fn message(&self, currency: &CurrencyFormat) -> String {
        match self {
            Anomaly::HighEffectiveRate {
                effective_rate,
                net_subtotal,
                tax_total,
            } => format!(
                "Effective tax rate of {}% is unusually high (tax {} on net {}). Check the tax rates on this document.",
                (effective_rate * Decimal::ONE_HUNDRED).round_dp(2).normalize(),
                currency.format(*tax_total),
                currency.format(*net_subtotal),
            ),
            Anomaly::RecomposeMismatch {
                recomposed,
                expected,
                difference,
            } => format!(
                "Net plus tax comes to {} but the entered amounts imply {} (off by {}). Check tax-inclusive lines.",
                currency.format(*recomposed),
                currency.format(*expected),
                currency.format(*difference),
            ),
        }
    }
}

/// Totals for a set of lines.
///
/// Every [`Money`] field is in cents, so a grand total of `$269.00`
/// serializes as `"grandTotal": 26900`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TotalsResult {
    /// Sum of tax bases (tax extracted from inclusive lines), in cents.
    pub net_subtotal: Money,

    /// Sum of per-line rounded tax, in cents.
    pub tax_total: Money,

    /// `net_subtotal + tax_total`, in cents.
    pub grand_total: Money,

    /// Sum of entered line amounts, in cents.
    pub gross_subtotal: Money,

    pub has_inclusive_lines: bool,

    pub anomaly: Option<Anomaly>,

    pub lines: Vec<LineBreakdown>,
}

impl TotalsResult {
    /// The all-zero result (what an empty cart shows).
    pub fn empty() -> Self {
        Self::default()
    }
}

// =============================================================================
// Calculator
// =============================================================================

/// Computes [`TotalsResult`]s under one configuration.
///
/// Holds no mutable state; share it freely between the invoicing page and
/// the POS checkout.
#[derive(Debug, Clone, Default)]
pub struct TotalsCalculator {
    config: CalculatorConfig,
}

impl TotalsCalculator {
    pub fn new(config: CalculatorConfig) -> Self {
        TotalsCalculator { config }
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    /// Computes totals for `lines`.
    ///
    /// `default_rate` applies to every line whose `tax_rate_id` is absent or
    /// not in `rates`.
    pub fn compute(
        &self,
        lines: &[LineItem],
        rates: &TaxRateTable,
        default_rate: &RawPercentage,
    ) -> TotalsResult {
        let fallback = Rate::normalize(default_rate);

        let mut net = Decimal::ZERO;
        let mut gross = Decimal::ZERO;
        let mut tax_total = Money::zero();
        let mut exclusive_tax = Money::zero();
        let mut has_inclusive_lines = false;
        let mut breakdown = Vec::with_capacity(lines.len());

        for (index, line) in lines.iter().enumerate() {
            let line_total = line.line_total();
            gross = gross.saturating_add(line_total);

            let (rate, rate_source) = match rates.resolve(line.tax_rate_id.as_ref()) {
                Some(raw) => (Rate::normalize(raw), RateSource::Table),
                None => {
                    if let Some(id) = &line.tax_rate_id {
                        debug!(index, tax_rate_id = %id, "Unknown tax rate id, using fallback rate");
                    }
                    (fallback, RateSource::Fallback)
                }
            };

            let (rate, rate_clamped) = rate.clamp_for_line();
            if rate_clamped {
                warn!(
                    index,
                    part_id = ?line.part_id,
                    rate = %rate,
                    "Tax rate above 100% after normalization, divided by 100 again"
                );
            }

            let (tax_base, raw_tax) = if line.is_tax_inclusive {
                has_inclusive_lines = true;
                let base = line_total
                    .checked_div(Decimal::ONE + rate.fraction())
                    .unwrap_or(line_total);
                (base, line_total - base)
            } else {
                (line_total, line_total.saturating_mul(rate.fraction()))
            };

            let tax_amount = Money::from_decimal(raw_tax);
            net = net.saturating_add(tax_base);
            tax_total += tax_amount;
            if !line.is_tax_inclusive {
                exclusive_tax += tax_amount;
            }

            breakdown.push(LineBreakdown {
                index,
                part_id: line.part_id.clone(),
                line_total: Money::from_decimal(line_total),
                rate,
                rate_source,
                rate_clamped,
                is_tax_inclusive: line.is_tax_inclusive,
                tax_base: Money::from_decimal(tax_base),
                tax_amount,
            });
        }

        let net_subtotal = Money::from_decimal(net);
        let gross_subtotal = Money::from_decimal(gross);
        let grand_total = net_subtotal + tax_total;

        let anomaly = detect_anomaly(
            &self.config.thresholds,
            net_subtotal,
            tax_total,
            grand_total,
            gross_subtotal + exclusive_tax,
        );

        if let Some(anomaly) = &anomaly {
            warn!(kind = anomaly.kind().as_str(), ?anomaly, "Totals anomaly detected");
        }

        debug!(
            lines = lines.len(),
            net = %net_subtotal,
            tax = %tax_total,
            grand = %grand_total,
            gross = %gross_subtotal,
            "Totals computed"
        );

        TotalsResult {
            net_subtotal,
            tax_total,
            grand_total,
            gross_subtotal,
            has_inclusive_lines,
            anomaly,
            lines: breakdown,
        }
    }
}

/// Computes totals with the default configuration.
pub fn compute_totals(
    lines: &[LineItem],
    rates: &TaxRateTable,
    default_rate: &RawPercentage,
) -> TotalsResult {
    TotalsCalculator::default().compute(lines, rates, default_rate)
}

/// Runs the advisory checks. The high-rate check takes precedence.
fn detect_anomaly(
    thresholds: &AnomalyThresholds,
    net_subtotal: Money,
    tax_total: Money,
    recomposed: Money,
    expected: Money,
) -> Option<Anomaly> {
    if net_subtotal.is_positive() {
        let effective_rate = tax_total.to_decimal() / net_subtotal.to_decimal();
        if effective_rate > thresholds.high_effective_rate {
            return Some(Anomaly::HighEffectiveRate {
                effective_rate: effective_rate.round_dp(4),
                net_subtotal,
                tax_total,
            });
        }
    }

    let difference = (recomposed - expected).abs();
    if difference.to_decimal() > thresholds.recompose_tolerance {
        return Some(Anomaly::RecomposeMismatch {
            recomposed,
            expected,
            difference,
        });
    }

    None
}

// =============================================================================
// Unit Tests
// =============================================================================
