//! Per-column missing-value policy, computed over one batch.

use tracing::debug;

use crate::{NumericColumn, ProcessedRecord};

/// How nulls in a column are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillPolicy {
    /// Carry the last non-null value down; leading nulls stay null.
    ForwardFill,
    Zero,
    /// Column median over the batch; an all-null column stays null.
    Median,
}

impl FillPolicy {
    pub const fn for_column(column: NumericColumn) -> Self {
        match column {
            NumericColumn::CurrentPrice | NumericColumn::PreviousClose | NumericColumn::Open => {
                Self::ForwardFill
            }
            NumericColumn::Change | NumericColumn::ChangePercent => Self::Zero,
            NumericColumn::DayLow
            | NumericColumn::DayHigh
            | NumericColumn::Week52Low
            | NumericColumn::Week52High
            | NumericColumn::PeRatio
            | NumericColumn::Eps => Self::Median,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Imputer;

impl Imputer {
    /// Fill nulls in place. Row order matters for forward-fill.
    pub fn apply(&self, records: &mut [ProcessedRecord]) {
        for column in NumericColumn::ALL {
            let policy = FillPolicy::for_column(column);
            let mut values: Vec<Option<f64>> =
                records.iter().map(|record| record.quote.get(column)).collect();
            fill(&mut values, policy);
            for (record, value) in records.iter_mut().zip(values) {
                record.quote.set(column, value);
            }
            debug!(column = %column, ?policy, "column imputed");
        }

        let volume_median = median(records.iter().filter_map(|r| r.volume.map(|v| v as f64)));
        if let Some(median) = volume_median {
            let filled = median.round() as i64;
            for record in records.iter_mut() {
                record.volume.get_or_insert(filled);
            }
        }

        for record in records.iter_mut() {
            if record.company_name.is_none() {
                record.company_name = Some(record.symbol.as_str().to_owned());
            }
        }
    }
}

/// Apply `policy` to a single column of values.
pub fn fill(values: &mut [Option<f64>], policy: FillPolicy) {
    match policy {
        FillPolicy::ForwardFill => {
            let mut last = None;
            for value in values.iter_mut() {
                match value {
                    Some(current) => last = Some(*current),
                    None => *value = last,
                }
            }
        }
        FillPolicy::Zero => {
            for value in values.iter_mut() {
                value.get_or_insert(0.0);
            }
        }
        FillPolicy::Median => {
            if let Some(median) = median(values.iter().flatten().copied()) {
                for value in values.iter_mut() {
                    value.get_or_insert(median);
                }
            }
        }
    }
}

/// Median of the given values; the mean of the middle two for even counts.
pub fn median(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut sorted: Vec<f64> = values.filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}
