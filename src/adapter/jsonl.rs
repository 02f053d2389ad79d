use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use nalgebra::Vector3;
use serde_json::Value;

use crate::adapter::{AdapterError, EventSource, FormatSpec};
use crate::core::domain::{EventRecord, ParticleRecord};

/// JSON-lines event source: one JSON object per line, field names mapped
/// through the format spec. Array-valued particle fields are index-aligned,
/// mirroring the flat array layout of the upstream generator output.
#[derive(Debug)]
pub struct JsonlSource {
    reader: BufReader<File>,
    spec: &'static FormatSpec,
    line_no: usize,
}

impl JsonlSource {
    pub fn open(path: &Path, spec: &'static FormatSpec) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        Ok(Self {
            reader: BufReader::new(file),
            spec,
            line_no: 0,
        })
    }

    fn malformed(&self, msg: impl Into<String>) -> anyhow::Error {
        AdapterError::Malformed {
            line: self.line_no,
            msg: msg.into(),
        }
        .into()
    }

    fn float_array<'a>(&self, value: &'a Value, key: &str) -> Result<&'a Vec<Value>> {
        value
            .get(key)
            .and_then(|v| v.as_array())
            .ok_or_else(|| self.malformed(format!("missing array field '{key}'")))
    }

    fn parse_event(&self, value: &Value) -> Result<EventRecord> {
        let pid = self.float_array(value, self.spec.pid)?;
        let px = self.float_array(value, self.spec.px)?;
        let py = self.float_array(value, self.spec.py)?;
        let pz = self.float_array(value, self.spec.pz)?;
        let x = self.float_array(value, self.spec.x)?;
        let y = self.float_array(value, self.spec.y)?;
        let z = self.float_array(value, self.spec.z)?;

        let mut n = pid.len();
        for (key, arr) in [
            (self.spec.px, px),
            (self.spec.py, py),
            (self.spec.pz, pz),
            (self.spec.x, x),
            (self.spec.y, y),
            (self.spec.z, z),
        ] {
            if arr.len() != n {
                return Err(self.malformed(format!(
                    "field '{key}' has {} entries, expected {n}",
                    arr.len()
                )));
            }
        }

        // A declared count below the array length truncates; above it is a
        // broken record.
        let declared = value
            .get(self.spec.n_particles)
            .and_then(|v| v.as_u64())
            .map(|v| v as usize);
        if let Some(d) = declared {
            if d > n {
                return Err(self.malformed(format!(
                    "declared {d} particles but arrays hold {n}"
                )));
            }
            n = d;
        }

        let impact_parameter = value
            .get(self.spec.impact_parameter)
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);

        let id = if self.spec.event_id.is_empty() {
            self.line_no as i64
        } else {
            value
                .get(self.spec.event_id)
                .and_then(|v| v.as_i64())
                .unwrap_or(self.line_no as i64)
        };

        let mut particles = Vec::with_capacity(n);
        for i in 0..n {
            let code = pid[i]
                .as_i64()
                .ok_or_else(|| self.malformed(format!("non-integer pid at index {i}")))?
                as i32;
            let fetch = |arr: &Vec<Value>, key: &str| -> Result<f64> {
                arr[i]
                    .as_f64()
                    .ok_or_else(|| self.malformed(format!("non-numeric '{key}' at index {i}")))
            };
            particles.push(ParticleRecord {
                code,
                momentum: Vector3::new(
                    fetch(px, self.spec.px)?,
                    fetch(py, self.spec.py)?,
                    fetch(pz, self.spec.pz)?,
                ),
                position: Vector3::new(
                    fetch(x, self.spec.x)?,
                    fetch(y, self.spec.y)?,
                    fetch(z, self.spec.z)?,
                ),
            });
        }

        Ok(EventRecord {
            id,
            impact_parameter,
            particles,
        })
    }
}

impl EventSource for JsonlSource {
    fn next_event(&mut self) -> Result<Option<EventRecord>> {
        let mut line = String::new();
        loop {
            line.clear();
            let n = self.reader.read_line(&mut line).context("read failure")?;
            if n == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(line.trim())
                .map_err(|e| self.malformed(e.to_string()))?;
            return Ok(Some(self.parse_event(&value)?));
        }
    }

    fn name(&self) -> &str {
        self.spec.name
    }
}
