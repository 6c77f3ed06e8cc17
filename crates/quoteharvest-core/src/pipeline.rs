//! Entry points used by the CLI and by external drivers.
//!
//! [`Processor`] turns a raw dataset into a processed one without touching the
//! network. [`Pipeline`] adds collection and file output on top of it.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::aggregator::{BatchCollector, CancelToken};
use crate::cleaner::Cleaner;
use crate::dataset;
use crate::features::FeatureDeriver;
use crate::imputer::Imputer;
use crate::{Dataset, PipelineError, ProcessedDataset, Symbol, UtcDateTime};

/// Clean, impute and derive, in that order.
#[derive(Clone, Default)]
pub struct Processor {
    cleaner: Cleaner,
    imputer: Imputer,
    deriver: FeatureDeriver,
}

impl Processor {
    pub fn new(deriver: FeatureDeriver) -> Self {
        Self {
            cleaner: Cleaner,
            imputer: Imputer,
            deriver,
        }
    }

    /// Process an in-memory batch.
    ///
    /// Fails with [`PipelineError::NoData`] when every row carries an error.
    pub fn process_dataset(&self, raw: &Dataset) -> Result<ProcessedDataset, PipelineError> {
        let mut records = self.cleaner.clean(raw, UtcDateTime::now());
        if records.is_empty() {
            return Err(PipelineError::NoData {
                attempted: raw.len(),
            });
        }
        self.imputer.apply(&mut records);
        self.deriver.derive(&mut records);
        info!(records = records.len(), "dataset processed");
        Ok(ProcessedDataset::new(records))
    }

    /// Load a raw (or previously processed) CSV file and process it.
    pub fn process(&self, path: &Path) -> Result<ProcessedDataset, PipelineError> {
        info!(path = %path.display(), "processing dataset file");
        let raw = dataset::read_raw(path)?;
        self.process_dataset(&raw)
    }
}

/// Files written by a full collect-then-process run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutput {
    pub raw_path: PathBuf,
    pub processed_path: PathBuf,
    pub collected: usize,
    pub succeeded: usize,
    pub processed: usize,
}

pub struct Pipeline {
    collector: BatchCollector,
    processor: Processor,
    output_dir: PathBuf,
}

impl Pipeline {
    pub fn new(collector: BatchCollector, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            collector,
            processor: Processor::default(),
            output_dir: output_dir.into(),
        }
    }

    pub fn with_processor(mut self, processor: Processor) -> Self {
        self.processor = processor;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub async fn collect(&self, symbols: &[Symbol]) -> Result<Dataset, PipelineError> {
        self.collector.collect(symbols).await
    }

    /// Collect and write the raw file, returning its path alongside the batch.
    pub async fn collect_to_file(
        &self,
        symbols: &[Symbol],
        cancel: &CancelToken,
    ) -> Result<(Dataset, PathBuf), PipelineError> {
        let dataset = self.collector.collect_with_cancel(symbols, cancel).await?;
        let path = dataset::write_raw(&self.output_dir, &dataset, UtcDateTime::now())?;
        Ok((dataset, path))
    }

    pub fn process(&self, path: &Path) -> Result<ProcessedDataset, PipelineError> {
        self.processor.process(path)
    }

    /// Collect, write raw, process, write processed.
    pub async fn run(
        &self,
        symbols: &[Symbol],
        cancel: &CancelToken,
    ) -> Result<(ProcessedDataset, RunOutput), PipelineError> {
        let (raw, raw_path) = self.collect_to_file(symbols, cancel).await?;
        let processed = self.processor.process(&raw_path)?;
        let processed_path =
            dataset::write_processed(&self.output_dir, &processed, UtcDateTime::now())?;

        let output = RunOutput {
            raw_path,
            processed_path,
            collected: raw.len(),
            succeeded: raw.success_count(),
            processed: processed.len(),
        };
        Ok((processed, output))
    }
}
