//! Tabular trace output.

use super::{SinkError, TraceSink};
use crate::domain::TraceRecord;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Unit labels used in the header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLabels {
    /// Native coin symbol, e.g. `BTC`.
    pub native_symbol: String,
    /// Reference currency code, e.g. `AUD`.
    pub reference_currency: String,
}

impl HeaderLabels {
    pub fn header_row(&self) -> [String; 8] {
        [
            "Starting Wallet ID".to_string(),
            "Source Wallet".to_string(),
            "Dest Wallet".to_string(),
            format!("Coin Amount ({})", self.native_symbol),
            format!("Fees ({})", self.native_symbol),
            format!("{} Equivalent of Coin Amount", self.reference_currency),
            format!("{} Equivalent of Fees", self.reference_currency),
            "Transaction Hash".to_string(),
        ]
    }
}

impl Default for HeaderLabels {
    fn default() -> Self {
        Self {
            native_symbol: "BTC".to_string(),
            reference_currency: "AUD".to_string(),
        }
    }
}

/// CSV sink. Writes the header on construction and flushes after every row.
pub struct CsvTraceSink<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvTraceSink<File> {
    /// Create (truncating) the output file at `path`.
    pub fn create(path: impl AsRef<Path>, labels: &HeaderLabels) -> Result<Self, SinkError> {
        let file = File::create(path)?;
        Self::new(file, labels)
    }
}

impl<W: Write> CsvTraceSink<W> {
    pub fn new(inner: W, labels: &HeaderLabels) -> Result<Self, SinkError> {
        let mut writer = csv::Writer::from_writer(inner);
        writer.write_record(labels.header_row())?;
        writer.flush()?;
        Ok(Self { writer })
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W, SinkError> {
        self.writer
            .into_inner()
            .map_err(|e| SinkError::Io(e.into_error()))
    }
}

impl<W: Write> TraceSink for CsvTraceSink<W> {
    fn emit(&mut self, record: &TraceRecord) -> Result<(), SinkError> {
        self.writer.write_record(record.to_row())?;
        self.writer.flush()?;
        Ok(())
    }
}
