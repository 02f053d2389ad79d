use std::path::Path;

use anyhow::Result;
use thiserror::Error;

use crate::core::domain::EventRecord;

pub mod csv;
pub mod formats;
pub mod jsonl;
pub mod sink;
pub mod synthetic;

pub use formats::{Carrier, FormatSpec};
pub use sink::{JsonSink, ResultSink};

/// Adapter-side failures. Unknown formats and empty inputs are fatal to the
/// run; malformed records name the offending line.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("unknown format '{0}'")]
    UnknownFormat(String),
    #[error("could not detect a known format in '{0}'")]
    DetectFailed(String),
    #[error("input '{0}' contains no events")]
    EmptyInput(String),
    #[error("missing column '{0}' in CSV header")]
    MissingColumn(String),
    #[error("malformed record at line {line}: {msg}")]
    Malformed { line: usize, msg: String },
}

/// A format adapter: yields events in the canonical shape the analysis core
/// consumes, one at a time, until exhausted.
pub trait EventSource: std::fmt::Debug {
    fn next_event(&mut self) -> Result<Option<EventRecord>>;

    /// Name of the backing format/stream (e.g. "ampt").
    fn name(&self) -> &str;
}

/// Resolves a format (by name, or by sniffing for "auto") and opens the
/// matching source over the input file.
pub fn open(
    path: &Path,
    format_name: &str,
) -> Result<(Box<dyn EventSource>, &'static FormatSpec)> {
    let spec = if format_name == "auto" {
        formats::detect(path)?
    } else {
        formats::by_name(format_name)
            .ok_or_else(|| AdapterError::UnknownFormat(format_name.to_string()))?
    };

    let source: Box<dyn EventSource> = match formats::sniff_carrier(path)? {
        Carrier::Jsonl => Box::new(jsonl::JsonlSource::open(path, spec)?),
        Carrier::Csv => Box::new(csv::CsvSource::open(path, spec)?),
    };
    Ok((source, spec))
}
