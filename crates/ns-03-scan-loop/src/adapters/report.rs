//! # Report Sinks
//!
//! `JsonLinesReportSink` writes one JSON object per line to any writer: a
//! file for durable output, stdout for piping into other tools.

use crate::domain::errors::ReportError;
use crate::domain::report::CollisionReport;
use crate::ports::outbound::ReportSink;
use std::io::Write;

/// Newline-delimited JSON report output.
#[derive(Debug)]
pub struct JsonLinesReportSink<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> JsonLinesReportSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonLinesReportSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ReportSink for JsonLinesReportSink<W> {
    fn emit(&mut self, report: &CollisionReport) -> Result<(), ReportError> {
        serde_json::to_writer(&mut self.writer, report)
            .map_err(|e| ReportError::Encode(e.to_string()))?;
        self.writer
            .write_all(b"\n")
            .map_err(|e| ReportError::Io(e.to_string()))?;
        // Reports are rare and must survive a crash of the scan that follows.
        self.writer
            .flush()
            .map_err(|e| ReportError::Io(e.to_string()))
    }

    fn flush(&mut self) -> Result<(), ReportError> {
        self.writer
            .flush()
            .map_err(|e| ReportError::Io(e.to_string()))
    }
}
