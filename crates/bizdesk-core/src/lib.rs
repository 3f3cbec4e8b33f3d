//! # bizdesk-core: Invoice and POS Totals
//!
//! The single totals calculator shared by the invoicing page and the POS
//! checkout. Pure functions, no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        BizDesk Architecture                             │
//! │                                                                         │
//! │  ┌──────────────────────────┐        ┌──────────────────────────┐      │
//! │  │     Invoicing page       │        │      POS checkout        │      │
//! │  └────────────┬─────────────┘        └─────────────┬────────────┘      │
//! │               │   lines + rate table + fallback    │                   │
//! │  ┌────────────▼────────────────────────────────────▼────────────────┐  │
//! │  │               ★ bizdesk-core (THIS CRATE) ★                      │  │
//! │  │                                                                  │  │
//! │  │  ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌────────┐ │  │
//! │  │  │  rate    │ │ catalog  │ │  totals  │ │   cart   │ │ valid- │ │  │
//! │  │  │ normalize│ │ id→rate  │ │ compute  │ │  lines   │ │ ation  │ │  │
//! │  │  └──────────┘ └──────────┘ └──────────┘ └──────────┘ └────────┘ │  │
//! │  │                                                                  │  │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │               │                                                         │
//! │  ┌────────────▼─────────────────────────────────────────────────────┐  │
//! │  │            apps/cli (`bizdesk`): config, logging, I/O            │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`rate`] - Raw percentages and their normalization
//! - [`catalog`] - Tax rate lookup table
//! - [`totals`] - The calculator and its result types
//! - [`memo`] - Recompute only when inputs change
//! - [`cart`] - Line editing for checkout and invoice drafts
//! - [`money`] - Cents and rounding
//! - [`config`] - Thresholds and currency display
//! - [`validation`] - Form field parsing
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use bizdesk_core::{compute_totals, LineItem, TaxMode, TaxRateRecord, TaxRateTable};
//! use bizdesk_core::RawPercentage;
//! use rust_decimal::Decimal;
//!
//! let table = TaxRateTable::from_records(&[
//!     TaxRateRecord::new("1", "VAT", RawPercentage::from(Decimal::new(12, 2))).as_default(),
//! ]);
//! let lines = vec![
//!     LineItem::new(Decimal::from(2), Decimal::from(100)).with_tax_rate("1"),
//!     LineItem::new(Decimal::ONE, Decimal::from(50))
//!         .with_discount(Decimal::from(5))
//!         .with_tax_rate("1")
//!         .with_tax_mode(TaxMode::Inclusive),
//! ];
//!
//! let totals = compute_totals(&lines, &table, &table.default_rate());
//! assert_eq!(totals.net_subtotal.cents(), 24018);
//! assert_eq!(totals.tax_total.cents(), 2882);
//! assert_eq!(totals.grand_total.cents(), 26900);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod memo;
pub mod money;
pub mod rate;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::Cart;
pub use catalog::TaxRateTable;
pub use config::{AnomalyThresholds, CalculatorConfig, CurrencyFormat};
pub use error::{CoreError, CoreResult, ValidationError};
pub use memo::TotalsMemo;
pub use money::Money;
pub use rate::{RawPercentage, Rate};
pub use totals::{
    compute_totals, Anomaly, AnomalyKind, LineBreakdown, RateSource, TotalsCalculator,
    TotalsResult,
};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines on a single cart or invoice draft.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity on a single line.
///
/// Catches a mistyped extra digit without blocking bulk service lines.
pub const MAX_LINE_QUANTITY: i64 = 9999;
