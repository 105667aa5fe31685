//! # Adapters Module
//!
//! - `report`: JSON-lines collision report output

pub mod report;

pub use report::JsonLinesReportSink;
