//! Row filtering and type coercion.

use tracing::{debug, info};

use crate::normalize::{clean_company_name, clean_market_cap, clean_volume};
use crate::{
    Dataset, MarketCapCategory, NumericColumn, PerformanceCategory, ProcessedRecord, RawRecord,
    UtcDateTime,
};

/// Drops failed rows and coerces the remaining ones into typed records.
///
/// Derived columns are left empty here; see [`crate::FeatureDeriver`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Cleaner;

impl Cleaner {
    pub fn clean(&self, dataset: &Dataset, processed_at: UtcDateTime) -> Vec<ProcessedRecord> {
        let cleaned: Vec<ProcessedRecord> = dataset
            .records()
            .iter()
            .filter(|record| !record.is_failed())
            .map(|record| self.coerce(record, processed_at))
            .collect();

        info!(
            input = dataset.len(),
            remaining = cleaned.len(),
            "data cleaning completed"
        );
        cleaned
    }

    fn coerce(&self, record: &RawRecord, processed_at: UtcDateTime) -> ProcessedRecord {
        let mut quote = record.quote;
        for column in NumericColumn::ALL {
            quote.set(column, record.quote.get(column));
        }

        let timestamp = record.timestamp.as_deref().and_then(|raw| {
            UtcDateTime::parse(raw)
                .inspect_err(|error| debug!(symbol = %record.symbol, %error, "timestamp dropped"))
                .ok()
        });

        ProcessedRecord {
            symbol: record.symbol.clone(),
            source: record.source.clone(),
            timestamp,
            quote,
            volume: record.volume.as_deref().and_then(clean_volume),
            market_cap: record.market_cap.as_deref().and_then(clean_market_cap),
            company_name: record.company_name.as_deref().and_then(clean_company_name),
            price_momentum: None,
            daily_volatility: None,
            market_cap_category: MarketCapCategory::Unknown,
            performance_category: PerformanceCategory::Unknown,
            processed_at,
        }
    }
}
