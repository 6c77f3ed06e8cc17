//! Best-effort field extraction from quote page markup.
//!
//! Known elements are located by attribute; the summary table is scanned row
//! by row and each label is matched against [`ROW_LABELS`]. A missing element
//! leaves its field null.

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use crate::normalize::{clean_numeric, clean_range};
use crate::{NumericColumn, RawRecord, Symbol};

/// Structural failure that prevents extraction altogether.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Field populated by a summary-table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowField {
    Numeric(NumericColumn),
    Volume,
    MarketCap,
    DayRange,
    Week52Range,
}

/// Label keywords checked in order; the first keyword contained in a row's
/// label decides the field.
pub const ROW_LABELS: [(&str, RowField); 10] = [
    ("Previous Close", RowField::Numeric(NumericColumn::PreviousClose)),
    ("Open", RowField::Numeric(NumericColumn::Open)),
    ("Volume", RowField::Volume),
    ("Market Cap", RowField::MarketCap),
    ("P/E Ratio", RowField::Numeric(NumericColumn::PeRatio)),
    ("PE Ratio", RowField::Numeric(NumericColumn::PeRatio)),
    ("Day's Range", RowField::DayRange),
    ("Day\u{2019}s Range", RowField::DayRange),
    ("52 Week Range", RowField::Week52Range),
    ("EPS", RowField::Numeric(NumericColumn::Eps)),
];

const STREAMER_FIELDS: [(&str, NumericColumn); 3] = [
    ("regularMarketPrice", NumericColumn::CurrentPrice),
    ("regularMarketChange", NumericColumn::Change),
    ("regularMarketChangePercent", NumericColumn::ChangePercent),
];

/// Map a row label to the field it populates.
pub fn match_label(label: &str) -> Option<RowField> {
    ROW_LABELS
        .iter()
        .find(|(keyword, _)| label.contains(keyword))
        .map(|(_, field)| *field)
}

/// Compiled selectors for a quote page.
#[derive(Debug)]
pub struct Extractor {
    source: String,
    streamers: Vec<(Selector, NumericColumn)>,
    row: Selector,
    cell: Selector,
    heading: Selector,
}

impl Extractor {
    pub fn new(source: impl Into<String>) -> Result<Self, ExtractError> {
        let streamers = STREAMER_FIELDS
            .iter()
            .map(|(field, column)| {
                compile(&format!("fin-streamer[data-field=\"{field}\"]")).map(|s| (s, *column))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            source: source.into(),
            streamers,
            row: compile("tr")?,
            cell: compile("td")?,
            heading: compile("h1")?,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Extract whatever fields the page exposes for `symbol`.
    pub fn extract(&self, symbol: &Symbol, html: &str) -> RawRecord {
        let document = Html::parse_document(html);
        let mut record = RawRecord::new(symbol.clone(), self.source.as_str());

        for (selector, column) in &self.streamers {
            if let Some(element) = document.select(selector).next() {
                record.quote.set(*column, clean_numeric(&element_text(element)));
            }
        }

        self.extract_summary_rows(&document, &mut record);

        record.company_name = document
            .select(&self.heading)
            .next()
            .and_then(|heading| heading_name(&element_text(heading)));

        record
    }

    fn extract_summary_rows(&self, document: &Html, record: &mut RawRecord) {
        for row in document.select(&self.row) {
            let mut cells = row.select(&self.cell);
            let (Some(label_cell), Some(value_cell)) = (cells.next(), cells.next()) else {
                continue;
            };

            let label = element_text(label_cell);
            let value = element_text(value_cell);
            let Some(field) = match_label(&label) else {
                continue;
            };

            // The first row for a field wins, so "Avg. Volume" below "Volume"
            // cannot overwrite it.
            match field {
                RowField::Numeric(column) => {
                    if record.quote.get(column).is_none() {
                        record.quote.set(column, clean_numeric(&value));
                    }
                }
                RowField::Volume => {
                    record.volume.get_or_insert(value);
                }
                RowField::MarketCap => {
                    record.market_cap.get_or_insert(value);
                }
                RowField::DayRange => {
                    fill_range(record, NumericColumn::DayLow, NumericColumn::DayHigh, &value);
                }
                RowField::Week52Range => {
                    fill_range(
                        record,
                        NumericColumn::Week52Low,
                        NumericColumn::Week52High,
                        &value,
                    );
                }
            }
        }
    }
}

fn compile(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|error| ExtractError::InvalidSelector {
        selector: selector.to_owned(),
        message: format!("{error:?}"),
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn heading_name(text: &str) -> Option<String> {
    let name = text.split('(').next().unwrap_or_default().trim();
    (!name.is_empty()).then(|| name.to_owned())
}

fn fill_range(record: &mut RawRecord, low: NumericColumn, high: NumericColumn, value: &str) {
    if record.quote.get(low).is_some() || record.quote.get(high).is_some() {
        return;
    }
    let (low_value, high_value) = clean_range(value);
    record.quote.set(low, low_value);
    record.quote.set(high, high_value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{QuoteFields, DEFAULT_SOURCE};

    const PAGE: &str = r#"
        <html><body>
          <h1>Apple Inc. (AAPL)</h1>
          <fin-streamer data-field="regularMarketPrice" value="189.84">$189.84</fin-streamer>
          <fin-streamer data-field="regularMarketChange">+1.23</fin-streamer>
          <fin-streamer data-field="regularMarketChangePercent">(+0.65%)</fin-streamer>
          <table>
            <tr><td>Previous Close</td><td>188.61</td></tr>
            <tr><td>Open</td><td>188.90</td></tr>
            <tr><td>Day's Range</td><td>187.50 - 190.32</td></tr>
            <tr><td>52 Week Range</td><td>164.08 - 199.62</td></tr>
            <tr><td>Volume</td><td>52,104,398</td></tr>
            <tr><td>Avg. Volume</td><td>58,311,022</td></tr>
            <tr><td>Market Cap</td><td> 2.95T </td></tr>
            <tr><td>PE Ratio (TTM)</td><td>29.52</td></tr>
            <tr><td>EPS (TTM)</td><td>6.43</td></tr>
            <tr><td>Lonely cell</td></tr>
          </table>
        </body></html>
    "#;

    fn extractor() -> Extractor {
        Extractor::new(DEFAULT_SOURCE).expect("static selectors compile")
    }

    fn aapl() -> Symbol {
        Symbol::parse("AAPL").expect("valid symbol")
    }

    #[test]
    fn extracts_streamer_fields() {
        let record = extractor().extract(&aapl(), PAGE);

        assert_eq!(record.quote.current_price, Some(189.84));
        assert_eq!(record.quote.change, Some(1.23));
        assert_eq!(record.quote.change_percent, Some(0.65));
        assert_eq!(record.source, "yahoo");
        assert!(record.error.is_none());
        assert!(record.timestamp.is_some());
    }

    #[test]
    fn extracts_summary_rows_by_label() {
        let record = extractor().extract(&aapl(), PAGE);

        assert_eq!(record.quote.previous_close, Some(188.61));
        assert_eq!(record.quote.open, Some(188.9));
        assert_eq!(record.quote.day_low, Some(187.5));
        assert_eq!(record.quote.day_high, Some(190.32));
        assert_eq!(record.quote.week_52_low, Some(164.08));
        assert_eq!(record.quote.week_52_high, Some(199.62));
        assert_eq!(record.quote.pe_ratio, Some(29.52));
        assert_eq!(record.quote.eps, Some(6.43));
        assert_eq!(record.volume.as_deref(), Some("52,104,398"));
        assert_eq!(record.market_cap.as_deref(), Some("2.95T"));
    }

    #[test]
    fn company_name_drops_ticker_echo() {
        let record = extractor().extract(&aapl(), PAGE);
        assert_eq!(record.company_name.as_deref(), Some("Apple Inc."));
    }

    #[test]
    fn missing_elements_leave_fields_null() {
        let record = extractor().extract(&aapl(), "<html><body><p>consent wall</p></body></html>");

        assert_eq!(record.quote, QuoteFields::default());
        assert!(record.volume.is_none());
        assert!(record.company_name.is_none());
        assert!(record.error.is_none(), "missing elements are not an error");
    }

    #[test]
    fn label_table_is_priority_ordered() {
        assert_eq!(
            match_label("Previous Close"),
            Some(RowField::Numeric(NumericColumn::PreviousClose))
        );
        assert_eq!(match_label("Avg. Volume"), Some(RowField::Volume));
        assert_eq!(match_label("Beta (5Y Monthly)"), None);
    }
}
