//! Summaries handed to downstream consumers of a processed batch.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::dataset::Table;
use crate::imputer::median;
use crate::{ProcessedDataset, Symbol, UtcDateTime};

/// Number of top movers listed on each side.
pub const TOP_MOVERS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolChange {
    pub symbol: Symbol,
    pub change_percent: Option<f64>,
}

/// Per-symbol moves plus aggregate statistics for one processed batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub generated_at: UtcDateTime,
    pub count: usize,
    pub changes: Vec<SymbolChange>,
    pub average_change_percent: Option<f64>,
    pub median_change_percent: Option<f64>,
    pub gainers: usize,
    pub losers: usize,
    pub unchanged: usize,
    pub top_gainers: Vec<SymbolChange>,
    pub top_losers: Vec<SymbolChange>,
}

impl BatchSummary {
    pub fn from_processed(dataset: &ProcessedDataset) -> Self {
        let changes: Vec<SymbolChange> = dataset
            .records()
            .iter()
            .map(|record| SymbolChange {
                symbol: record.symbol.clone(),
                change_percent: record.quote.change_percent,
            })
            .collect();

        let known: Vec<&SymbolChange> = changes
            .iter()
            .filter(|change| change.change_percent.is_some())
            .collect();
        let values: Vec<f64> = known.iter().filter_map(|c| c.change_percent).collect();
        let average_change_percent =
            (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64);

        let mut ranked = known.clone();
        ranked.sort_by(|a, b| {
            let a = a.change_percent.unwrap_or_default();
            b.change_percent.unwrap_or_default().total_cmp(&a)
        });
        let top_gainers = ranked
            .iter()
            .filter(|c| c.change_percent.is_some_and(|v| v > 0.0))
            .take(TOP_MOVERS)
            .map(|c| (*c).clone())
            .collect();
        let top_losers = ranked
            .iter()
            .rev()
            .filter(|c| c.change_percent.is_some_and(|v| v < 0.0))
            .take(TOP_MOVERS)
            .map(|c| (*c).clone())
            .collect();

        Self {
            generated_at: UtcDateTime::now(),
            count: changes.len(),
            average_change_percent,
            median_change_percent: median(values.iter().copied()),
            gainers: values.iter().filter(|v| **v > 0.0).count(),
            losers: values.iter().filter(|v| **v < 0.0).count(),
            unchanged: values.iter().filter(|v| **v == 0.0).count(),
            top_gainers,
            top_losers,
            changes,
        }
    }

    pub fn best(&self) -> Option<&SymbolChange> {
        self.top_gainers.first()
    }

    pub fn worst(&self) -> Option<&SymbolChange> {
        self.top_losers.first()
    }
}

/// Inferred type of a CSV column, judged from its non-empty cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    Float,
    Text,
    Empty,
}

impl ColumnType {
    fn infer<'a>(cells: impl Iterator<Item = &'a str>) -> Self {
        let mut inferred = Self::Empty;
        for cell in cells {
            inferred = match (inferred, cell.parse::<i64>().is_ok()) {
                (Self::Text, _) => return Self::Text,
                (Self::Empty | Self::Integer, true) => Self::Integer,
                (_, _) if cell.parse::<f64>().is_ok() => Self::Float,
                _ => return Self::Text,
            };
        }
        inferred
    }

    const fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }
}

/// Describe-style statistics for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; absent below two values.
    pub std: Option<f64>,
    pub min: f64,
    pub median: f64,
    pub max: f64,
}

impl ColumnStats {
    fn from_values(values: &[f64]) -> Option<Self> {
        let count = values.len();
        let median = median(values.iter().copied())?;
        let mean = values.iter().sum::<f64>() / count as f64;
        let std = (count > 1).then(|| {
            let squares: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (squares / (count - 1) as f64).sqrt()
        });
        Some(Self {
            count,
            mean,
            std,
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            median,
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

/// Completeness figures for any dataset file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataQualityReport {
    pub total_records: usize,
    pub total_columns: usize,
    /// Empty-cell count per column.
    pub missing_values: BTreeMap<String, usize>,
    /// Rows identical to an earlier row.
    pub duplicate_records: usize,
    pub data_types: BTreeMap<String, ColumnType>,
    /// Statistics for every integer or float column.
    pub numeric_summary: BTreeMap<String, ColumnStats>,
}

impl DataQualityReport {
    pub fn from_table(table: &Table) -> Self {
        let missing_values = table
            .columns
            .iter()
            .enumerate()
            .map(|(index, column)| {
                let missing = table
                    .rows
                    .iter()
                    .filter(|row| row.get(index).map_or(true, |cell| cell.trim().is_empty()))
                    .count();
                (column.clone(), missing)
            })
            .collect();

        let mut seen = HashSet::with_capacity(table.rows.len());
        let duplicate_records = table.rows.iter().filter(|row| !seen.insert(*row)).count();

        let mut data_types = BTreeMap::new();
        let mut numeric_summary = BTreeMap::new();
        for (index, column) in table.columns.iter().enumerate() {
            let column_type = ColumnType::infer(filled_cells(table, index));
            if column_type.is_numeric() {
                let values: Vec<f64> = filled_cells(table, index)
                    .filter_map(|cell| cell.parse().ok())
                    .collect();
                if let Some(stats) = ColumnStats::from_values(&values) {
                    numeric_summary.insert(column.clone(), stats);
                }
            }
            data_types.insert(column.clone(), column_type);
        }

        Self {
            total_records: table.rows.len(),
            total_columns: table.columns.len(),
            missing_values,
            duplicate_records,
            data_types,
            numeric_summary,
        }
    }
}

fn filled_cells(table: &Table, index: usize) -> impl Iterator<Item = &str> {
    table
        .rows
        .iter()
        .filter_map(move |row| row.get(index))
        .map(|cell| cell.trim())
        .filter(|cell| !cell.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MarketCapCategory, PerformanceCategory, ProcessedRecord, QuoteFields};

    fn row(symbol: &str, change_percent: Option<f64>) -> ProcessedRecord {
        ProcessedRecord {
            symbol: Symbol::parse(symbol).expect("valid"),
            source: String::from("yahoo"),
            timestamp: None,
            quote: QuoteFields {
                change_percent,
                ..QuoteFields::default()
            },
            volume: None,
            market_cap: None,
            company_name: None,
            price_momentum: None,
            daily_volatility: None,
            market_cap_category: MarketCapCategory::Unknown,
            performance_category: PerformanceCategory::Unknown,
            processed_at: UtcDateTime::now(),
        }
    }

    #[test]
    fn summarizes_moves() {
        let dataset = ProcessedDataset::new(vec![
            row("AAPL", Some(1.5)),
            row("MSFT", Some(-3.0)),
            row("AMD", Some(6.0)),
            row("INTC", Some(0.0)),
            row("NFLX", None),
        ]);

        let summary = BatchSummary::from_processed(&dataset);

        assert_eq!(summary.count, 5);
        assert_eq!(summary.gainers, 2);
        assert_eq!(summary.losers, 1);
        assert_eq!(summary.unchanged, 1);
        assert_eq!(summary.average_change_percent, Some(1.125));
        assert_eq!(summary.median_change_percent, Some(0.75));
        assert_eq!(summary.best().map(|c| c.symbol.as_str()), Some("AMD"));
        assert_eq!(summary.worst().map(|c| c.symbol.as_str()), Some("MSFT"));
        assert_eq!(summary.changes[4].change_percent, None);
    }

    #[test]
    fn movers_only_list_symbols_that_moved_that_way() {
        let dataset = ProcessedDataset::new(vec![
            row("AAPL", Some(2.0)),
            row("MSFT", Some(1.0)),
            row("AMD", Some(0.0)),
            row("INTC", Some(-0.5)),
        ]);

        let summary = BatchSummary::from_processed(&dataset);

        let losers: Vec<&str> = summary.top_losers.iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(losers, ["INTC"]);
        let gainers: Vec<&str> = summary.top_gainers.iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(gainers, ["AAPL", "MSFT"]);
    }

    #[test]
    fn flat_batch_has_no_best_or_worst() {
        let summary = BatchSummary::from_processed(&ProcessedDataset::new(vec![row(
            "AAPL",
            Some(0.0),
        )]));
        assert!(summary.best().is_none());
        assert!(summary.worst().is_none());
    }

    #[test]
    fn empty_batch_has_no_aggregates() {
        let summary = BatchSummary::from_processed(&ProcessedDataset::default());
        assert_eq!(summary.count, 0);
        assert_eq!(summary.average_change_percent, None);
        assert!(summary.best().is_none());
    }

    #[test]
    fn quality_report_counts_missing_and_duplicates() {
        let table = Table {
            columns: vec![String::from("symbol"), String::from("price")],
            rows: vec![
                vec![String::from("AAPL"), String::from("1")],
                vec![String::from("MSFT"), String::new()],
                vec![String::from("AAPL"), String::from("1")],
            ],
        };

        let report = DataQualityReport::from_table(&table);

        assert_eq!(report.total_records, 3);
        assert_eq!(report.total_columns, 2);
        assert_eq!(report.missing_values["price"], 1);
        assert_eq!(report.missing_values["symbol"], 0);
        assert_eq!(report.duplicate_records, 1);
        assert_eq!(report.data_types["symbol"], ColumnType::Text);
        assert_eq!(report.data_types["price"], ColumnType::Integer);
        assert!(!report.numeric_summary.contains_key("symbol"));
    }

    #[test]
    fn quality_report_describes_numeric_columns() {
        let cells = |values: [&str; 4]| values.map(String::from).to_vec();
        let table = Table {
            columns: cells(["symbol", "current_price", "volume", "error"]),
            rows: vec![
                cells(["AAPL", "2.0", "100", ""]),
                cells(["MSFT", "4", "300", ""]),
                cells(["AMD", "", "200", ""]),
                cells(["NVDA", "6.0", "x", ""]),
            ],
        };

        let report = DataQualityReport::from_table(&table);

        assert_eq!(report.data_types["current_price"], ColumnType::Float);
        assert_eq!(report.data_types["volume"], ColumnType::Text);
        assert_eq!(report.data_types["error"], ColumnType::Empty);
        let price = &report.numeric_summary["current_price"];
        assert_eq!(price.count, 3);
        assert_eq!(price.mean, 4.0);
        assert_eq!(price.std, Some(2.0));
        assert_eq!((price.min, price.median, price.max), (2.0, 4.0, 6.0));
        assert_eq!(report.numeric_summary.len(), 1);
    }
}
