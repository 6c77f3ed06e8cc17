//! Behavior-driven tests for dataset files
//!
//! These tests verify WHAT a user gets back from files on disk: faithful raw
//! round trips, clear file-level errors, summaries and quality reports.

use std::fs;
use std::sync::Arc;

use quoteharvest_core::dataset::{
    read_processed, read_raw, write_processed_to, write_raw, RAW_FILE_PREFIX,
};
use quoteharvest_core::{
    BatchSummary, ColumnType, DataQualityReport, PipelineError, Processor, Table, UtcDateTime,
};
use quoteharvest_tests::{collector, quote_page, symbols, RecordingSleeper, ScriptedHttpClient};

// =============================================================================
// Dataset Files: Raw Round Trip
// =============================================================================

#[tokio::test]
async fn collected_batch_survives_a_raw_file_round_trip() {
    // Given: A collected batch with one failed symbol
    let client = Arc::new(
        ScriptedHttpClient::new()
            .page("AAPL", &quote_page("Apple, Inc.", "AAPL", "189.84", "+0.65", "52,104,398")),
    );
    let dataset = collector(client, Arc::new(RecordingSleeper::default()))
        .collect(&symbols(&["AAPL", "MSFT"]))
        .await
        .expect("collect");
    let dir = tempfile::tempdir().expect("tempdir");

    // When: It is written and read back
    let path = write_raw(dir.path(), &dataset, UtcDateTime::now()).expect("write");
    let loaded = read_raw(&path).expect("read");

    // Then: Records, nulls and error tags are preserved
    assert_eq!(loaded.records(), dataset.records());
    let name = path.file_name().and_then(|n| n.to_str()).expect("file name");
    assert!(name.starts_with(RAW_FILE_PREFIX));
    assert!(name.ends_with(".csv"));
}

// =============================================================================
// Dataset Files: File-Level Errors
// =============================================================================

#[test]
fn processing_a_missing_file_reports_missing_input() {
    let dir = tempfile::tempdir().expect("tempdir");

    let error = Processor::default()
        .process(&dir.path().join("raw_stock_data_19700101_000000.csv"))
        .expect_err("missing file");

    assert!(matches!(error, PipelineError::MissingInput { .. }));
}

#[test]
fn processing_a_header_only_file_reports_empty_input() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("raw.csv");
    fs::write(&path, "symbol,current_price,error\n").expect("write");

    let error = Processor::default().process(&path).expect_err("empty file");

    assert!(matches!(error, PipelineError::EmptyInput { .. }));
}

#[test]
fn processing_a_file_of_only_failures_reports_no_data() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("raw.csv");
    fs::write(&path, "symbol,current_price,error\nAAPL,,timeout\nMSFT,,status 503\n")
        .expect("write");

    let error = Processor::default().process(&path).expect_err("no data");

    assert!(matches!(error, PipelineError::NoData { attempted: 2 }));
}

#[test]
fn unparseable_cells_become_nulls_instead_of_errors() {
    // Given: A hand-edited file with junk in numeric cells
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("raw.csv");
    fs::write(
        &path,
        "symbol,current_price,pe_ratio,volume,timestamp\n\
         AAPL,$189.84,N/A,1.2M,yesterday\n\
         MSFT,410.10,35.5,n/a,2024-03-01 14:30:00\n",
    )
    .expect("write");

    // When: It is processed
    let processed = Processor::default().process(&path).expect("process");

    // Then: Junk is nulled, then imputed by column policy
    let aapl = &processed.records()[0];
    assert_eq!(aapl.quote.current_price, Some(189.84));
    assert_eq!(aapl.quote.pe_ratio, Some(35.5));
    assert!(aapl.timestamp.is_none());
    let msft = &processed.records()[1];
    assert_eq!(msft.volume, Some(1_200_000));
    assert!(msft.timestamp.is_some());
}

#[test]
fn timestamps_outside_the_four_digit_year_range_become_nulls() {
    // Given: A timestamp whose UTC form lands before year 0000
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("raw.csv");
    fs::write(
        &path,
        "symbol,current_price,timestamp\nAAPL,1.0,0000-01-01T00:30:00+01:00\n",
    )
    .expect("write");

    // When: It is processed and the result is written out
    let processed = Processor::default().process(&path).expect("process");
    let out = dir.path().join("processed.csv");
    write_processed_to(&out, &processed).expect("write processed");

    // Then: The timestamp was nulled rather than carried into the file
    assert!(processed.records()[0].timestamp.is_none());
    let reread = read_processed(&out).expect("read processed");
    assert!(reread.records()[0].timestamp.is_none());
}

// =============================================================================
// Dataset Files: Summaries
// =============================================================================

#[test]
fn quality_report_counts_gaps_and_duplicate_rows() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("raw.csv");
    fs::write(
        &path,
        "symbol,current_price,error\nAAPL,1.0,\nMSFT,,timeout\nAAPL,1.0,\n",
    )
    .expect("write");

    let report = DataQualityReport::from_table(&Table::read(&path).expect("read"));

    assert_eq!(report.total_records, 3);
    assert_eq!(report.total_columns, 3);
    assert_eq!(report.missing_values["current_price"], 1);
    assert_eq!(report.missing_values["error"], 2);
    assert_eq!(report.duplicate_records, 1);
    assert_eq!(report.data_types["current_price"], ColumnType::Float);
    assert_eq!(report.numeric_summary["current_price"].count, 2);
    assert_eq!(report.numeric_summary["current_price"].mean, 1.0);
}

#[test]
fn batch_summary_ranks_movers() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("raw.csv");
    fs::write(
        &path,
        "symbol,change_percent\nAAPL,1.5\nMSFT,-2.5\nNVDA,7.25\nAMD,\n",
    )
    .expect("write");
    let processed = Processor::default().process(&path).expect("process");

    let summary = BatchSummary::from_processed(&processed);

    assert_eq!(summary.count, 4);
    assert_eq!(summary.gainers, 2);
    assert_eq!(summary.losers, 1);
    assert_eq!(summary.unchanged, 1, "missing change is imputed to zero");
    assert_eq!(summary.best().map(|c| c.symbol.as_str()), Some("NVDA"));
    assert_eq!(summary.worst().map(|c| c.symbol.as_str()), Some("MSFT"));
    assert_eq!(summary.top_losers.len(), 1, "only falling symbols are losers");
}
