//! CSV persistence for raw and processed datasets.
//!
//! Files carry a header row and one row per record. Nulls are written as empty
//! cells, timestamps as RFC3339 and floats in plain decimal notation. Readers
//! look columns up by header name, so a processed file can be read back as a
//! raw dataset and missing optional columns are treated as null.

use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use csv::StringRecord;
use serde::Serialize;
use tracing::info;

use crate::normalize::clean_numeric;
use crate::{
    Dataset, MarketCapCategory, NumericColumn, PerformanceCategory, PipelineError,
    ProcessedDataset, ProcessedRecord, QuoteFields, RawRecord, Symbol, UtcDateTime,
};

pub const RAW_FILE_PREFIX: &str = "raw_stock_data";
pub const PROCESSED_FILE_PREFIX: &str = "processed_stock_data";

const LEADING_COLUMNS: [&str; 1] = ["symbol"];
const TEXT_COLUMNS: [&str; 5] = ["volume", "market_cap", "company_name", "source", "timestamp"];
const RAW_TRAILING_COLUMNS: [&str; 1] = ["error"];
const DERIVED_COLUMNS: [&str; 5] = [
    "price_momentum",
    "daily_volatility",
    "market_cap_category",
    "performance_category",
    "processed_at",
];

/// `raw_stock_data_YYYYMMDD_HHMMSS.csv`
pub fn raw_file_name(stamp: UtcDateTime) -> String {
    format!("{RAW_FILE_PREFIX}_{}.csv", stamp.file_stamp())
}

/// `processed_stock_data_YYYYMMDD_HHMMSS.csv`
pub fn processed_file_name(stamp: UtcDateTime) -> String {
    format!("{PROCESSED_FILE_PREFIX}_{}.csv", stamp.file_stamp())
}

pub fn raw_headers() -> Vec<&'static str> {
    LEADING_COLUMNS
        .into_iter()
        .chain(NumericColumn::ALL.map(NumericColumn::name))
        .chain(TEXT_COLUMNS)
        .chain(RAW_TRAILING_COLUMNS)
        .collect()
}

pub fn processed_headers() -> Vec<&'static str> {
    LEADING_COLUMNS
        .into_iter()
        .chain(NumericColumn::ALL.map(NumericColumn::name))
        .chain(TEXT_COLUMNS)
        .chain(DERIVED_COLUMNS)
        .collect()
}

/// Write `dataset` to `dir` under a timestamped raw file name.
pub fn write_raw(
    dir: &Path,
    dataset: &Dataset,
    stamp: UtcDateTime,
) -> Result<PathBuf, PipelineError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(raw_file_name(stamp));
    write_raw_to(&path, dataset)?;
    Ok(path)
}

pub fn write_raw_to(path: &Path, dataset: &Dataset) -> Result<(), PipelineError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(raw_headers())?;
    for record in dataset.records() {
        let mut row = quote_row(&record.symbol, &record.quote);
        row.push(opt_text(record.volume.as_deref()));
        row.push(opt_text(record.market_cap.as_deref()));
        row.push(opt_text(record.company_name.as_deref()));
        row.push(record.source.clone());
        row.push(opt_text(record.timestamp.as_deref()));
        row.push(opt_text(record.error.as_deref()));
        writer.write_record(&row)?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = dataset.len(), "raw dataset written");
    Ok(())
}

/// Write `dataset` to `dir` under a timestamped processed file name.
pub fn write_processed(
    dir: &Path,
    dataset: &ProcessedDataset,
    stamp: UtcDateTime,
) -> Result<PathBuf, PipelineError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(processed_file_name(stamp));
    write_processed_to(&path, dataset)?;
    Ok(path)
}

pub fn write_processed_to(path: &Path, dataset: &ProcessedDataset) -> Result<(), PipelineError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(processed_headers())?;
    for record in dataset.records() {
        let mut row = quote_row(&record.symbol, &record.quote);
        row.push(record.volume.map(|v| v.to_string()).unwrap_or_default());
        row.push(opt_text(record.market_cap.as_deref()));
        row.push(opt_text(record.company_name.as_deref()));
        row.push(record.source.clone());
        row.push(record.timestamp.map(UtcDateTime::format_rfc3339).unwrap_or_default());
        row.push(opt_float(record.price_momentum));
        row.push(opt_float(record.daily_volatility));
        row.push(record.market_cap_category.as_str().to_owned());
        row.push(record.performance_category.as_str().to_owned());
        row.push(record.processed_at.format_rfc3339());
        writer.write_record(&row)?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = dataset.len(), "processed dataset written");
    Ok(())
}

/// Read a raw dataset. Also accepts processed files.
pub fn read_raw(path: &Path) -> Result<Dataset, PipelineError> {
    let table = CsvTable::open(path)?;
    let records = table
        .rows
        .iter()
        .map(|row| -> Result<RawRecord, PipelineError> {
            Ok(RawRecord {
                symbol: table.symbol(row)?,
                source: table.text(row, "source").unwrap_or_default(),
                timestamp: table.text(row, "timestamp"),
                quote: table.quote(row),
                volume: table.text(row, "volume"),
                market_cap: table.text(row, "market_cap"),
                company_name: table.text(row, "company_name"),
                error: table.text(row, "error"),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Dataset::new(records))
}

pub fn read_processed(path: &Path) -> Result<ProcessedDataset, PipelineError> {
    let table = CsvTable::open(path)?;
    table.require("processed_at")?;
    let records = table
        .rows
        .iter()
        .map(|row| -> Result<ProcessedRecord, PipelineError> {
            let processed_at =
                UtcDateTime::parse(&table.text(row, "processed_at").unwrap_or_default())?;
            let timestamp = table
                .text(row, "timestamp")
                .and_then(|raw| UtcDateTime::parse(&raw).ok());
            Ok(ProcessedRecord {
                symbol: table.symbol(row)?,
                source: table.text(row, "source").unwrap_or_default(),
                timestamp,
                quote: table.quote(row),
                volume: table.number(row, "volume").map(|v| v.round() as i64),
                market_cap: table.text(row, "market_cap"),
                company_name: table.text(row, "company_name"),
                price_momentum: table.number(row, "price_momentum"),
                daily_volatility: table.number(row, "daily_volatility"),
                market_cap_category: MarketCapCategory::from_label(
                    &table.text(row, "market_cap_category").unwrap_or_default(),
                ),
                performance_category: PerformanceCategory::from_label(
                    &table.text(row, "performance_category").unwrap_or_default(),
                ),
                processed_at,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ProcessedDataset::new(records))
}

/// Untyped view of a CSV file: header names plus string cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn read(path: &Path) -> Result<Self, PipelineError> {
        let table = CsvTable::open(path)?;
        Ok(Self {
            columns: table.headers.iter().map(str::to_owned).collect(),
            rows: table
                .rows
                .iter()
                .map(|row| row.iter().map(str::to_owned).collect())
                .collect(),
        })
    }

    /// First `limit` rows, for display.
    pub fn head(&self, limit: usize) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(limit).cloned().collect(),
        }
    }
}

struct CsvTable {
    headers: StringRecord,
    index: HashMap<String, usize>,
    rows: Vec<StringRecord>,
}

impl CsvTable {
    fn open(path: &Path) -> Result<Self, PipelineError> {
        if !path.is_file() {
            return Err(PipelineError::MissingInput {
                path: path.to_path_buf(),
            });
        }
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(File::open(path)?);
        let headers = reader.headers()?.clone();
        let rows = reader.records().collect::<Result<Vec<_>, _>>()?;
        if rows.is_empty() {
            return Err(PipelineError::EmptyInput {
                path: path.to_path_buf(),
            });
        }

        let index = headers
            .iter()
            .enumerate()
            .map(|(position, name)| (name.trim().to_owned(), position))
            .collect();
        let table = Self {
            headers,
            index,
            rows,
        };
        table.require("symbol")?;
        Ok(table)
    }

    fn require(&self, column: &'static str) -> Result<(), PipelineError> {
        if self.index.contains_key(column) {
            Ok(())
        } else {
            Err(PipelineError::MissingColumn { column })
        }
    }

    fn text(&self, row: &StringRecord, column: &str) -> Option<String> {
        let value = row.get(*self.index.get(column)?)?.trim();
        (!value.is_empty()).then(|| value.to_owned())
    }

    fn number(&self, row: &StringRecord, column: &str) -> Option<f64> {
        let text = self.text(row, column)?;
        text.parse::<f64>()
            .ok()
            .or_else(|| clean_numeric(&text))
            .filter(|value| value.is_finite())
    }

    fn symbol(&self, row: &StringRecord) -> Result<Symbol, PipelineError> {
        let raw = self.text(row, "symbol").unwrap_or_default();
        Ok(Symbol::parse(&raw)?)
    }

    fn quote(&self, row: &StringRecord) -> QuoteFields {
        let mut quote = QuoteFields::default();
        for column in NumericColumn::ALL {
            quote.set(column, self.number(row, column.name()));
        }
        quote
    }
}

fn quote_row(symbol: &Symbol, quote: &QuoteFields) -> Vec<String> {
    let mut row = Vec::with_capacity(24);
    row.push(symbol.as_str().to_owned());
    row.extend(NumericColumn::ALL.map(|column| opt_float(quote.get(column))));
    row
}

fn opt_float(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn opt_text(value: Option<&str>) -> String {
    value.unwrap_or_default().to_owned()
}
