//! # Tax Rate Table
//!
//! Lookup from tax rate id to the raw percentage the backend sent.
//!
//! The table stores values RAW. Normalization happens per line inside the
//! calculator, so a table built from the REST catalog and a table built by
//! hand from `(id, 12)` pairs behave identically.
//!
//! ## Default Rate
//! At most one catalog record is authoritative as the default: the FIRST
//! record flagged `is_default`. Later flagged records are ignored (with a
//! warning), matching what the settings page shows as selected.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::rate::RawPercentage;
use crate::types::{TaxRateId, TaxRateRecord};

/// Tax rate lookup handed to the calculator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRateTable {
    rates: HashMap<TaxRateId, RawPercentage>,
    default_id: Option<TaxRateId>,
}

impl TaxRateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the table from the REST catalog.
    ///
    /// Duplicate ids keep the last record.
    pub fn from_records(records: &[TaxRateRecord]) -> Self {
        let mut table = TaxRateTable::new();

        for record in records {
            let previous = table
                .rates
                .insert(record.tax_rate_id.clone(), record.rate_percentage.clone());
            if previous.is_some() {
                debug!(id = %record.tax_rate_id, "Duplicate tax rate id in catalog, keeping last");
            }

            if record.is_default {
                match &table.default_id {
                    None => table.default_id = Some(record.tax_rate_id.clone()),
                    Some(existing) if existing != &record.tax_rate_id => warn!(
                        authoritative = %existing,
                        ignored = %record.tax_rate_id,
                        "Multiple default tax rates in catalog"
                    ),
                    Some(_) => {}
                }
            }
        }

        debug!(
            rates = table.rates.len(),
            default = ?table.default_id,
            "Tax rate table built"
        );
        table
    }

    /// Adds or replaces a rate.
    pub fn insert(&mut self, id: impl Into<TaxRateId>, raw: RawPercentage) -> Option<RawPercentage> {
        self.rates.insert(id.into(), raw)
    }

    /// Sets (or clears) the default rate id.
    ///
    /// The id does not have to be present in the table; an unknown default
    /// resolves to [`RawPercentage::Missing`].
    pub fn set_default(&mut self, id: Option<TaxRateId>) {
        self.default_id = id;
    }

    pub fn get(&self, id: &TaxRateId) -> Option<&RawPercentage> {
        self.rates.get(id)
    }

    /// Resolves a line's rate reference; `None` means "use the fallback".
    pub fn resolve(&self, id: Option<&TaxRateId>) -> Option<&RawPercentage> {
        id.and_then(|id| self.rates.get(id))
    }

    pub fn default_id(&self) -> Option<&TaxRateId> {
        self.default_id.as_ref()
    }

    /// Raw percentage of the authoritative default rate, or `Missing`.
    pub fn default_rate(&self) -> RawPercentage {
        self.default_id
            .as_ref()
            .and_then(|id| self.rates.get(id))
            .cloned()
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl<K: Into<TaxRateId>> FromIterator<(K, RawPercentage)> for TaxRateTable {
    fn from_iter<I: IntoIterator<Item = (K, RawPercentage)>>(iter: I) -> Self {
        let mut table = TaxRateTable::new();
        for (id, raw) in iter {
            table.insert(id, raw);
        }
        table
    }
}
