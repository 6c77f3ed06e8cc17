use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{MarketCapCategory, PerformanceCategory, Symbol, UtcDateTime};

/// Source tag written on every record extracted from a quote page.
pub const DEFAULT_SOURCE: &str = "yahoo";

/// Declared floating-point columns, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericColumn {
    CurrentPrice,
    Change,
    ChangePercent,
    PreviousClose,
    Open,
    DayLow,
    DayHigh,
    #[serde(rename = "week_52_low")]
    Week52Low,
    #[serde(rename = "week_52_high")]
    Week52High,
    PeRatio,
    Eps,
}

impl NumericColumn {
    pub const ALL: [Self; 11] = [
        Self::CurrentPrice,
        Self::Change,
        Self::ChangePercent,
        Self::PreviousClose,
        Self::Open,
        Self::DayLow,
        Self::DayHigh,
        Self::Week52Low,
        Self::Week52High,
        Self::PeRatio,
        Self::Eps,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::CurrentPrice => "current_price",
            Self::Change => "change",
            Self::ChangePercent => "change_percent",
            Self::PreviousClose => "previous_close",
            Self::Open => "open",
            Self::DayLow => "day_low",
            Self::DayHigh => "day_high",
            Self::Week52Low => "week_52_low",
            Self::Week52High => "week_52_high",
            Self::PeRatio => "pe_ratio",
            Self::Eps => "eps",
        }
    }
}

impl Display for NumericColumn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Floating-point fields shared by raw and processed records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteFields {
    pub current_price: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
    pub previous_close: Option<f64>,
    pub open: Option<f64>,
    pub day_low: Option<f64>,
    pub day_high: Option<f64>,
    pub week_52_low: Option<f64>,
    pub week_52_high: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub eps: Option<f64>,
}

impl QuoteFields {
    pub const fn get(&self, column: NumericColumn) -> Option<f64> {
        match column {
            NumericColumn::CurrentPrice => self.current_price,
            NumericColumn::Change => self.change,
            NumericColumn::ChangePercent => self.change_percent,
            NumericColumn::PreviousClose => self.previous_close,
            NumericColumn::Open => self.open,
            NumericColumn::DayLow => self.day_low,
            NumericColumn::DayHigh => self.day_high,
            NumericColumn::Week52Low => self.week_52_low,
            NumericColumn::Week52High => self.week_52_high,
            NumericColumn::PeRatio => self.pe_ratio,
            NumericColumn::Eps => self.eps,
        }
    }

    pub fn slot(&mut self, column: NumericColumn) -> &mut Option<f64> {
        match column {
            NumericColumn::CurrentPrice => &mut self.current_price,
            NumericColumn::Change => &mut self.change,
            NumericColumn::ChangePercent => &mut self.change_percent,
            NumericColumn::PreviousClose => &mut self.previous_close,
            NumericColumn::Open => &mut self.open,
            NumericColumn::DayLow => &mut self.day_low,
            NumericColumn::DayHigh => &mut self.day_high,
            NumericColumn::Week52Low => &mut self.week_52_low,
            NumericColumn::Week52High => &mut self.week_52_high,
            NumericColumn::PeRatio => &mut self.pe_ratio,
            NumericColumn::Eps => &mut self.eps,
        }
    }

    /// Store a value, turning NaN and infinities into null.
    pub fn set(&mut self, column: NumericColumn, value: Option<f64>) {
        *self.slot(column) = value.filter(|v| v.is_finite());
    }
}

/// Fields extracted from one quote page, before cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub symbol: Symbol,
    pub source: String,
    /// Extraction time as written by the extractor (ISO-8601).
    pub timestamp: Option<String>,
    #[serde(flatten)]
    pub quote: QuoteFields,
    /// Volume as displayed, e.g. `"1.2M"` or `"12,345"`.
    pub volume: Option<String>,
    /// Market cap as displayed, e.g. `"2.9T"`.
    pub market_cap: Option<String>,
    pub company_name: Option<String>,
    pub error: Option<String>,
}

impl RawRecord {
    pub fn new(symbol: Symbol, source: impl Into<String>) -> Self {
        Self {
            symbol,
            source: source.into(),
            timestamp: Some(UtcDateTime::now().format_rfc3339()),
            quote: QuoteFields::default(),
            volume: None,
            market_cap: None,
            company_name: None,
            error: None,
        }
    }

    /// Record standing in for a symbol whose fetch or parse failed.
    pub fn failed(symbol: Symbol, source: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(symbol, source)
        }
    }

    pub const fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Ordered raw records for one batch, one per attempted symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    batch_id: Uuid,
    records: Vec<RawRecord>,
}

impl Dataset {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self {
            batch_id: Uuid::new_v4(),
            records,
        }
    }

    pub const fn batch_id(&self) -> Uuid {
        self.batch_id
    }

    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<RawRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn success_count(&self) -> usize {
        self.records.iter().filter(|record| !record.is_failed()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &RawRecord> {
        self.records.iter().filter(|record| record.is_failed())
    }
}

/// A cleaned, imputed record carrying derived indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedRecord {
    pub symbol: Symbol,
    pub source: String,
    pub timestamp: Option<UtcDateTime>,
    #[serde(flatten)]
    pub quote: QuoteFields,
    pub volume: Option<i64>,
    pub market_cap: Option<String>,
    pub company_name: Option<String>,
    pub price_momentum: Option<f64>,
    pub daily_volatility: Option<f64>,
    pub market_cap_category: MarketCapCategory,
    pub performance_category: PerformanceCategory,
    pub processed_at: UtcDateTime,
}

impl ProcessedRecord {
    /// Project back onto the raw shape so a processed batch can be run through
    /// the pipeline again.
    pub fn to_raw(&self) -> RawRecord {
        RawRecord {
            symbol: self.symbol.clone(),
            source: self.source.clone(),
            timestamp: self.timestamp.map(UtcDateTime::format_rfc3339),
            quote: self.quote,
            volume: self.volume.map(|v| v.to_string()),
            market_cap: self.market_cap.clone(),
            company_name: self.company_name.clone(),
            error: None,
        }
    }
}

/// Terminal output of the processing pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessedDataset {
    records: Vec<ProcessedRecord>,
}

impl ProcessedDataset {
    pub fn new(records: Vec<ProcessedRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ProcessedRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ProcessedRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Raw view of every record, in order.
    pub fn to_dataset(&self) -> Dataset {
        Dataset::new(self.records.iter().map(ProcessedRecord::to_raw).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(raw: &str) -> Symbol {
        Symbol::parse(raw).expect("valid symbol")
    }

    #[test]
    fn column_names_match_serde_names() {
        for column in NumericColumn::ALL {
            let json = serde_json::to_string(&column).expect("serialize");
            assert_eq!(json, format!("\"{}\"", column.name()));
        }
    }

    #[test]
    fn set_rejects_non_finite_values() {
        let mut fields = QuoteFields::default();
        fields.set(NumericColumn::PeRatio, Some(f64::INFINITY));
        fields.set(NumericColumn::Eps, Some(f64::NAN));
        fields.set(NumericColumn::Open, Some(12.5));

        assert_eq!(fields.get(NumericColumn::PeRatio), None);
        assert_eq!(fields.get(NumericColumn::Eps), None);
        assert_eq!(fields.get(NumericColumn::Open), Some(12.5));
    }

    #[test]
    fn dataset_counts_successes_and_failures() {
        let dataset = Dataset::new(vec![
            RawRecord::new(symbol("AAPL"), DEFAULT_SOURCE),
            RawRecord::failed(symbol("MSFT"), DEFAULT_SOURCE, "timeout"),
        ]);

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.success_count(), 1);
        let failed: Vec<&str> = dataset.failures().map(|r| r.symbol.as_str()).collect();
        assert_eq!(failed, ["MSFT"]);
    }
}
