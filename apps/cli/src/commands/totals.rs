//! # `bizdesk totals`
//!
//! Computes totals for a quote document the way the invoicing page does.
//!
//! ## Quote Document
//! ```json
//! {
//!   "tax_rates": [
//!     { "tax_rate_id": 1, "rate_name": "VAT", "rate_percentage": 12, "is_default": true }
//!   ],
//!   "lines": [
//!     { "partId": "P-1", "quantity": 2, "salePrice": 100, "taxRateId": 1 },
//!     { "quantity": 1, "salePrice": 50, "discountAmount": 5, "isTaxInclusive": true }
//!   ],
//!   "default_tax_rate_id": 1
//! }
//! ```
//!
//! Lines without `isTaxInclusive` take `[calculator] default_tax_mode`.
//!
//! ## Fallback Rate Resolution
//! ```text
//! --default-rate <id> ──► document default_tax_rate_id ──► catalog is_default
//!        │                          │                            │
//!        └── first id found in the table wins; unknown ids are skipped
//!                                                                 │
//!                                                    none ──► Missing (0%)
//! ```

use std::fmt::Write as _;
use std::path::Path;

use bizdesk_core::{
    CalculatorConfig, CurrencyFormat, LineItem, LineItemDraft, RateSource, RawPercentage,
    TaxMode, TaxRateId, TaxRateRecord, TaxRateTable, TotalsCalculator, TotalsResult,
};
use clap::ValueEnum;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};

/// How the result is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report with an anomaly banner.
    #[default]
    Text,
    /// The `TotalsResult` as JSON, amounts in integer cents.
    Json,
}

/// A saved quote: the catalog snapshot plus the lines.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteDocument {
    #[serde(default)]
    pub tax_rates: Vec<TaxRateRecord>,

    #[serde(default)]
    pub lines: Vec<LineItemDraft>,

    #[serde(default)]
    pub default_tax_rate_id: Option<TaxRateId>,
}

impl QuoteDocument {
    pub fn from_json(json: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn read(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| AppError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// The document's lines, with `default_mode` filling in missing
    /// tax-inclusive flags.
    pub fn line_items(&self, default_mode: TaxMode) -> Vec<LineItem> {
        let defaulted = self
            .lines
            .iter()
            .filter(|draft| draft.is_tax_inclusive.is_none())
            .count();
        if defaulted > 0 {
            debug!(defaulted, mode = %default_mode, "Applying default tax mode to lines");
        }

        self.lines
            .iter()
            .cloned()
            .map(|draft| draft.into_line(default_mode))
            .collect()
    }
}

/// Picks the fallback rate for lines whose rate id does not resolve.
pub fn resolve_default_rate(
    table: &TaxRateTable,
    flag: Option<&TaxRateId>,
    document: Option<&TaxRateId>,
) -> RawPercentage {
    let candidates = [("--default-rate", flag), ("document", document)];

    for (source, id) in candidates {
        let Some(id) = id else { continue };
        match table.get(id) {
            Some(raw) => {
                debug!(source, id = %id, "Using fallback tax rate");
                return raw.clone();
            }
            None => warn!(source, id = %id, "Fallback tax rate id not in table, skipping"),
        }
    }

    let raw = table.default_rate();
    if raw.is_missing() {
        debug!("No fallback tax rate, lines without a rate are untaxed");
    }
    raw
}

/// Computes totals for a parsed document.
pub fn compute(
    document: &QuoteDocument,
    config: CalculatorConfig,
    default_rate_flag: Option<&TaxRateId>,
) -> TotalsResult {
    let table = TaxRateTable::from_records(&document.tax_rates);
    let fallback = resolve_default_rate(
        &table,
        default_rate_flag,
        document.default_tax_rate_id.as_ref(),
    );

    let lines = document.line_items(config.default_tax_mode);

    TotalsCalculator::new(config).compute(&lines, &table, &fallback)
}

/// Runs the command and returns what to print.
pub fn run(
    path: &Path,
    config: CalculatorConfig,
    default_rate_flag: Option<&TaxRateId>,
    format: OutputFormat,
) -> AppResult<String> {
    let document = QuoteDocument::read(path)?;
    info!(
        ?path,
        lines = document.lines.len(),
        rates = document.tax_rates.len(),
        "Loaded quote document"
    );

    let currency = config.currency.clone();
    let totals = compute(&document, config, default_rate_flag);

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&totals)?),
        OutputFormat::Text => Ok(render_text(&totals, &currency)),
    }
}

// =============================================================================
// Text Report
// =============================================================================

/// Renders the report shown at the bottom of an invoice.
///
/// ```text
///   #  Part        Amount    Rate  Mode        Base       Tax
///   1  P-1        $200.00     12%  excl     $200.00    $24.00
///   2  P-2         $45.00     12%  incl      $40.18     $4.82
///
/// Net subtotal                $240.18
/// Tax                          $28.82
/// Grand total                 $269.00
/// Prices include tax on some lines. Entered amounts total $245.00.
/// ```
pub fn render_text(totals: &TotalsResult, currency: &CurrencyFormat) -> String {
    let mut out = String::new();

    if !totals.lines.is_empty() {
        let _ = writeln!(
            out,
            "{:>3}  {:<10} {:>10} {:>7}  {:<5} {:>10} {:>10}",
            "#", "Part", "Amount", "Rate", "Mode", "Base", "Tax"
        );
        for line in &totals.lines {
            let rate = match line.rate_source {
                RateSource::Table => line.rate.to_string(),
                RateSource::Fallback => format!("{}*", line.rate),
            };
            let rate = if line.rate_clamped { format!("{}!", rate) } else { rate };
            let _ = writeln!(
                out,
                "{:>3}  {:<10} {:>10} {:>7}  {:<5} {:>10} {:>10}",
                line.index + 1,
                line.part_id.as_deref().unwrap_or("-"),
                currency.format(line.line_total),
                rate,
                if line.is_tax_inclusive { "incl" } else { "excl" },
                currency.format(line.tax_base),
                currency.format(line.tax_amount),
            );
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "{:<20} {:>14}", "Net subtotal", currency.format(totals.net_subtotal));
    let _ = writeln!(out, "{:<20} {:>14}", "Tax", currency.format(totals.tax_total));
    let _ = writeln!(out, "{:<20} {:>14}", "Grand total", currency.format(totals.grand_total));

    if totals.has_inclusive_lines {
        let _ = writeln!(
            out,
            "Prices include tax on some lines. Entered amounts total {}.",
            currency.format(totals.gross_subtotal)
        );
    }

    if totals.lines.iter().any(|l| l.rate_source == RateSource::Fallback) {
        let _ = writeln!(out, "* fallback tax rate applied");
    }
    if totals.lines.iter().any(|l| l.rate_clamped) {
        let _ = writeln!(out, "! rate above 100% was divided by 100 again");
    }

    if let Some(anomaly) = &totals.anomaly {
        let _ = writeln!(out);
        let _ = writeln!(out, "WARNING [{}]: {}", anomaly.kind().as_str(), anomaly.message(currency));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"{
        "tax_rates": [
            { "tax_rate_id": 1, "rate_name": "VAT", "rate_percentage": "0.12", "is_default": true },
            { "tax_rate_id": 2, "rate_name": "Reduced", "rate_percentage": 5 }
        ],
        "lines": [
            { "partId": "P-1", "quantity": 2, "salePrice": 100, "taxRateId": 1 },
            { "partId": "P-2", "quantity": 1, "salePrice": 50, "discountAmount": 5,
              "taxRateId": 1, "isTaxInclusive": true }
        ]
    }"#;

    fn document() -> QuoteDocument {
        QuoteDocument::from_json(SCENARIO).unwrap()
    }

    #[test]
    fn test_compute_scenario() {
        let totals = compute(&document(), CalculatorConfig::default(), None);

        assert_eq!(totals.net_subtotal.cents(), 24018);
        assert_eq!(totals.tax_total.cents(), 2882);
        assert_eq!(totals.grand_total.cents(), 26900);
        assert!(totals.anomaly.is_none());
    }

    #[test]
    fn test_default_rate_resolution_order() {
        let doc = document();
        let table = TaxRateTable::from_records(&doc.tax_rates);
        let reduced = TaxRateId::from("2");
        let unknown = TaxRateId::from("99");

        // catalog default
        assert_eq!(
            resolve_default_rate(&table, None, None).value(),
            Some(rust_decimal::Decimal::new(12, 2))
        );
        // document beats catalog
        assert_eq!(
            resolve_default_rate(&table, None, Some(&reduced)).value(),
            Some(rust_decimal::Decimal::from(5))
        );
        // flag beats document; unknown flag falls through
        assert_eq!(
            resolve_default_rate(&table, Some(&unknown), Some(&reduced)).value(),
            Some(rust_decimal::Decimal::from(5))
        );
        assert!(resolve_default_rate(&TaxRateTable::new(), Some(&unknown), None).is_missing());
    }

    #[test]
    fn test_lines_without_rate_use_flag_rate() {
        let doc = QuoteDocument::from_json(
            r#"{
                "tax_rates": [{ "tax_rate_id": "R5", "rate_percentage": 5 }],
                "lines": [{ "quantity": 1, "salePrice": 100 }]
            }"#,
        )
        .unwrap();

        let untaxed = compute(&doc, CalculatorConfig::default(), None);
        assert!(untaxed.tax_total.is_zero());

        let taxed = compute(&doc, CalculatorConfig::default(), Some(&TaxRateId::from("R5")));
        assert_eq!(taxed.tax_total.cents(), 500);
    }

    #[test]
    fn test_configured_tax_mode_applies_to_unflagged_lines() {
        let doc = QuoteDocument::from_json(
            r#"{
                "tax_rates": [{ "tax_rate_id": 1, "rate_percentage": 12 }],
                "lines": [
                    { "partId": "A", "quantity": 1, "salePrice": 112, "taxRateId": 1 },
                    { "partId": "B", "quantity": 1, "salePrice": 100, "taxRateId": 1,
                      "isTaxInclusive": false }
                ]
            }"#,
        )
        .unwrap();
        let config = CalculatorConfig {
            default_tax_mode: TaxMode::Inclusive,
            ..CalculatorConfig::default()
        };

        let totals = compute(&doc, config, None);

        assert!(totals.has_inclusive_lines);
        assert!(totals.lines[0].is_tax_inclusive);
        assert!(!totals.lines[1].is_tax_inclusive);
        // A: 112 incl → 100 + 12.00; B: 100 excl → 100 + 12.00
        assert_eq!(totals.lines[0].tax_amount.cents(), 1200);
        assert_eq!(totals.net_subtotal.cents(), 20000);
        assert_eq!(totals.tax_total.cents(), 2400);
        assert_eq!(totals.grand_total.cents(), 22400);

        let exclusive = compute(&doc, CalculatorConfig::default(), None);
        assert!(!exclusive.has_inclusive_lines);
        assert_eq!(exclusive.grand_total.cents(), 23744);
    }

    #[test]
    fn test_render_text_report() {
        let totals = compute(&document(), CalculatorConfig::default(), None);
        let report = render_text(&totals, &CurrencyFormat::default());

        assert!(report.contains("P-2"));
        assert!(report.contains("$40.18"));
        assert!(report.contains("$269.00"));
        assert!(report.contains("Entered amounts total $245.00"));
        assert!(!report.contains("WARNING"));
    }

    #[test]
    fn test_render_text_anomaly_banner() {
        let doc = QuoteDocument::from_json(
            r#"{
                "tax_rates": [{ "tax_rate_id": 1, "rate_percentage": 25000 }],
                "lines": [{ "quantity": 1, "salePrice": 100, "taxRateId": 1 }]
            }"#,
        )
        .unwrap();
        let totals = compute(&doc, CalculatorConfig::default(), None);
        let report = render_text(&totals, &CurrencyFormat::default());

        assert!(report.contains("WARNING [HIGH_EFFECTIVE_RATE]"));
        assert!(report.contains("250%!"));
    }

    #[test]
    fn test_render_empty_document() {
        let report = render_text(&TotalsResult::empty(), &CurrencyFormat::default());

        assert!(!report.contains("Part"));
        assert!(report.contains("Grand total"));
        assert!(report.contains("$0.00"));
    }

    #[test]
    fn test_missing_file() {
        let result = run(
            Path::new("/nonexistent/quote.json"),
            CalculatorConfig::default(),
            None,
            OutputFormat::Json,
        );
        assert!(matches!(result, Err(AppError::Read { .. })));
    }

    #[test]
    fn test_invalid_document() {
        assert!(matches!(
            QuoteDocument::from_json(r#"{ "lines": 3 }"#),
            Err(AppError::Json(_))
        ));
    }
}
