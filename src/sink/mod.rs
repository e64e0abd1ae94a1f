//! Trace record sinks.

pub mod csv_sink;

pub use csv_sink::{CsvTraceSink, HeaderLabels};

use crate::domain::TraceRecord;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Output I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Destination for trace records. Records are handed over one at a time, in
/// emission order.
pub trait TraceSink {
    fn emit(&mut self, record: &TraceRecord) -> Result<(), SinkError>;
}

/// Collects records in memory.
#[derive(Debug, Default, Clone)]
pub struct VecSink {
    pub records: Vec<TraceRecord>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TraceSink for VecSink {
    fn emit(&mut self, record: &TraceRecord) -> Result<(), SinkError> {
        self.records.push(record.clone());
        Ok(())
    }
}
