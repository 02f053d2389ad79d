use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use nalgebra::Vector3;

use crate::adapter::{AdapterError, EventSource, FormatSpec};
use crate::core::domain::{EventRecord, ParticleRecord};

/// Resolved header positions of the columns the analysis needs.
#[derive(Debug, Clone, Copy)]
struct Columns {
    event: usize,
    b: usize,
    pid: usize,
    px: usize,
    py: usize,
    pz: usize,
    x: usize,
    y: usize,
    z: usize,
}

/// CSV event source: one particle per row, consecutive rows with the same
/// event id form one event. The impact parameter is repeated on every row of
/// an event; the first row wins. Schemas without an event-id field use a
/// column named "event".
#[derive(Debug)]
pub struct CsvSource {
    reader: csv::Reader<File>,
    spec: &'static FormatSpec,
    columns: Columns,
    pending: Option<csv::StringRecord>,
    line_no: usize,
}

impl CsvSource {
    pub fn open(path: &Path, spec: &'static FormatSpec) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("failed to open {}", path.display()))?;

        let headers = reader
            .headers()
            .with_context(|| format!("failed to read CSV header of {}", path.display()))?
            .clone();
        let position = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| AdapterError::MissingColumn(name.to_string()).into())
        };

        let event_column = if spec.event_id.is_empty() {
            "event"
        } else {
            spec.event_id
        };
        let columns = Columns {
            event: position(event_column)?,
            b: position(spec.impact_parameter)?,
            pid: position(spec.pid)?,
            px: position(spec.px)?,
            py: position(spec.py)?,
            pz: position(spec.pz)?,
            x: position(spec.x)?,
            y: position(spec.y)?,
            z: position(spec.z)?,
        };

        Ok(Self {
            reader,
            spec,
            columns,
            pending: None,
            line_no: 1,
        })
    }

    fn malformed(&self, msg: impl Into<String>) -> anyhow::Error {
        AdapterError::Malformed {
            line: self.line_no,
            msg: msg.into(),
        }
        .into()
    }

    fn next_record(&mut self) -> Result<Option<csv::StringRecord>> {
        if let Some(rec) = self.pending.take() {
            return Ok(Some(rec));
        }
        let mut rec = csv::StringRecord::new();
        let got = self
            .reader
            .read_record(&mut rec)
            .map_err(|e| self.malformed(e.to_string()))?;
        if got {
            self.line_no += 1;
            Ok(Some(rec))
        } else {
            Ok(None)
        }
    }

    fn field_f64(&self, rec: &csv::StringRecord, idx: usize) -> Result<f64> {
        rec.get(idx)
            .ok_or_else(|| self.malformed("short row"))?
            .trim()
            .parse::<f64>()
            .map_err(|e| self.malformed(e.to_string()))
    }

    fn field_i64(&self, rec: &csv::StringRecord, idx: usize) -> Result<i64> {
        rec.get(idx)
            .ok_or_else(|| self.malformed("short row"))?
            .trim()
            .parse::<i64>()
            .map_err(|e| self.malformed(e.to_string()))
    }

    fn particle(&self, rec: &csv::StringRecord) -> Result<ParticleRecord> {
        Ok(ParticleRecord {
            code: self.field_i64(rec, self.columns.pid)? as i32,
            momentum: Vector3::new(
                self.field_f64(rec, self.columns.px)?,
                self.field_f64(rec, self.columns.py)?,
                self.field_f64(rec, self.columns.pz)?,
            ),
            position: Vector3::new(
                self.field_f64(rec, self.columns.x)?,
                self.field_f64(rec, self.columns.y)?,
                self.field_f64(rec, self.columns.z)?,
            ),
        })
    }
}

impl EventSource for CsvSource {
    fn next_event(&mut self) -> Result<Option<EventRecord>> {
        let Some(first) = self.next_record()? else {
            return Ok(None);
        };

        let id = self.field_i64(&first, self.columns.event)?;
        let impact_parameter = self.field_f64(&first, self.columns.b)?;
        let mut particles = vec![self.particle(&first)?];

        while let Some(rec) = self.next_record()? {
            if self.field_i64(&rec, self.columns.event)? != id {
                self.pending = Some(rec);
                break;
            }
            particles.push(self.particle(&rec)?);
        }

        Ok(Some(EventRecord {
            id,
            impact_parameter,
            particles,
        }))
    }

    fn name(&self) -> &str {
        self.spec.name
    }
}
