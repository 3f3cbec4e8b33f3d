//! # Memoized Totals
//!
//! Pages ask for totals on every render. `TotalsMemo` recomputes only when
//! the lines, the rate table, or the fallback rate actually changed.
//!
//! ```text
//! render ──► get_or_compute(lines, rates, default)
//!                 │
//!                 ├── inputs == cached inputs ──► cached result   (hit)
//!                 │
//!                 └── otherwise ──► compute, replace cache        (miss)
//! ```
//!
//! The memo owns a copy of the last inputs, so callers may mutate their own
//! cart freely between renders.

use tracing::trace;

use crate::catalog::TaxRateTable;
use crate::rate::RawPercentage;
use crate::totals::{TotalsCalculator, TotalsResult};
use crate::types::LineItem;

#[derive(Debug, Clone)]
struct CacheEntry {
    lines: Vec<LineItem>,
    rates: TaxRateTable,
    default_rate: RawPercentage,
    result: TotalsResult,
}

/// Single-entry cache in front of a [`TotalsCalculator`].
#[derive(Debug, Clone, Default)]
pub struct TotalsMemo {
    calculator: TotalsCalculator,
    entry: Option<CacheEntry>,
    hits: u64,
    misses: u64,
}

impl TotalsMemo {
    pub fn new(calculator: TotalsCalculator) -> Self {
        TotalsMemo {
            calculator,
            entry: None,
            hits: 0,
            misses: 0,
        }
    }

    /// Returns totals for the inputs, reusing the last result when possible.
    pub fn get_or_compute(
        &mut self,
        lines: &[LineItem],
        rates: &TaxRateTable,
        default_rate: &RawPercentage,
    ) -> &TotalsResult {
        let fresh = matches!(
            &self.entry,
            Some(entry)
                if entry.lines == lines
                    && &entry.rates == rates
                    && &entry.default_rate == default_rate
        );

        if fresh {
            self.hits += 1;
            trace!(hits = self.hits, "Totals memo hit");
        } else {
            self.misses += 1;
            trace!(misses = self.misses, "Totals memo miss, recomputing");
            self.entry = None;
        }

        let calculator = &self.calculator;
        let entry = self.entry.get_or_insert_with(|| CacheEntry {
            lines: lines.to_vec(),
            rates: rates.clone(),
            default_rate: default_rate.clone(),
            result: calculator.compute(lines, rates, default_rate),
        });
        &entry.result
    }

    /// Drops the cached result; the next call recomputes.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn setup() -> (Vec<LineItem>, TaxRateTable) {
        let lines = vec![LineItem::new(Decimal::from(2), Decimal::from(100)).with_tax_rate("vat")];
        let rates: TaxRateTable = vec![("vat", RawPercentage::from(Decimal::from(12)))]
            .into_iter()
            .collect();
        (lines, rates)
    }

    #[test]
    fn test_same_inputs_hit_cache() {
        let (lines, rates) = setup();
        let mut memo = TotalsMemo::default();

        let first = memo.get_or_compute(&lines, &rates, &RawPercentage::Missing).clone();
        let second = memo.get_or_compute(&lines, &rates, &RawPercentage::Missing).clone();

        assert_eq!(first, second);
        assert_eq!(memo.misses(), 1);
        assert_eq!(memo.hits(), 1);
    }

    #[test]
    fn test_changed_lines_recompute() {
        let (mut lines, rates) = setup();
        let mut memo = TotalsMemo::default();

        let before = memo.get_or_compute(&lines, &rates, &RawPercentage::Missing).grand_total;
        lines[0].quantity = Decimal::from(3);
        let after = memo.get_or_compute(&lines, &rates, &RawPercentage::Missing).grand_total;

        assert_eq!(before.cents(), 22400);
        assert_eq!(after.cents(), 33600);
        assert_eq!(memo.misses(), 2);
    }

    #[test]
    fn test_changed_default_rate_recomputes() {
        let (_, rates) = setup();
        let lines = vec![LineItem::new(Decimal::ONE, Decimal::from(100))];
        let mut memo = TotalsMemo::default();

        let none = memo.get_or_compute(&lines, &rates, &RawPercentage::Missing).tax_total;
        let five = memo
            .get_or_compute(&lines, &rates, &RawPercentage::from(Decimal::from(5)))
            .tax_total;

        assert_eq!(none.cents(), 0);
        assert_eq!(five.cents(), 500);
        assert_eq!(memo.hits(), 0);
    }

    #[test]
    fn test_invalidate() {
        let (lines, rates) = setup();
        let mut memo = TotalsMemo::default();

        memo.get_or_compute(&lines, &rates, &RawPercentage::Missing);
        memo.invalidate();
        memo.get_or_compute(&lines, &rates, &RawPercentage::Missing);

        assert_eq!(memo.misses(), 2);
    }
}
