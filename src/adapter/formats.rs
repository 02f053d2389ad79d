use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};

use crate::adapter::AdapterError;
use crate::core::domain::CatalogMode;

/// Field-name mapping for one known input schema. The analysis core never
/// sees these names; the adapter maps them to the canonical event shape.
#[derive(Debug, Clone, Copy)]
pub struct FormatSpec {
    pub name: &'static str,
    /// Stream the schema originates from; decides hadron vs parton mode.
    pub stream: &'static str,
    pub n_particles: &'static str,
    pub impact_parameter: &'static str,
    /// Empty when the schema carries no event id.
    pub event_id: &'static str,
    pub pid: &'static str,
    pub px: &'static str,
    pub py: &'static str,
    pub pz: &'static str,
    pub x: &'static str,
    pub y: &'static str,
    pub z: &'static str,
    pub max_particles: usize,
}

impl FormatSpec {
    pub fn mode(&self) -> CatalogMode {
        if PARTON_STREAMS.contains(&self.stream) {
            CatalogMode::Parton
        } else {
            CatalogMode::Hadron
        }
    }
}

const PARTON_STREAMS: &[&str] = &["zpc", "parton_initial"];

pub const FORMATS: &[FormatSpec] = &[
    FormatSpec {
        name: "ampt",
        stream: "ampt",
        n_particles: "nParticles",
        impact_parameter: "impactParameter",
        event_id: "eventID",
        pid: "pid",
        px: "px",
        py: "py",
        pz: "pz",
        x: "x",
        y: "y",
        z: "z",
        max_particles: 20_000,
    },
    FormatSpec {
        name: "hadron_before_art",
        stream: "hadron_before_art",
        n_particles: "nParticles",
        impact_parameter: "impactParameter",
        event_id: "eventID",
        pid: "pid",
        px: "px",
        py: "py",
        pz: "pz",
        x: "x",
        y: "y",
        z: "z",
        max_particles: 20_000,
    },
    FormatSpec {
        name: "hadron_before_melting",
        stream: "hadron_before_melting",
        n_particles: "nParticles",
        impact_parameter: "impactParameter",
        event_id: "eventID",
        pid: "pid",
        px: "px",
        py: "py",
        pz: "pz",
        x: "x",
        y: "y",
        z: "z",
        max_particles: 20_000,
    },
    FormatSpec {
        name: "zpc",
        stream: "zpc",
        n_particles: "nParticles",
        impact_parameter: "impactParameter",
        event_id: "eventID",
        pid: "pid",
        px: "px",
        py: "py",
        pz: "pz",
        x: "x",
        y: "y",
        z: "z",
        max_particles: 20_000,
    },
    FormatSpec {
        name: "parton_initial",
        stream: "parton_initial",
        n_particles: "nParticles",
        impact_parameter: "impactParameter",
        event_id: "eventID",
        pid: "pid",
        px: "px",
        py: "py",
        pz: "pz",
        x: "x",
        y: "y",
        z: "z",
        max_particles: 20_000,
    },
    FormatSpec {
        name: "legacy",
        stream: "AMPT",
        n_particles: "Event.multi",
        impact_parameter: "Event.impactpar",
        event_id: "",
        pid: "ID",
        px: "Px",
        py: "Py",
        pz: "Pz",
        x: "X",
        y: "Y",
        z: "Z",
        max_particles: 99_999,
    },
];

pub fn by_name(name: &str) -> Option<&'static FormatSpec> {
    FORMATS.iter().find(|f| f.name == name)
}

/// On-disk carrier of the event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Carrier {
    Jsonl,
    Csv,
}

fn first_line(path: &Path) -> Result<String> {
    let file = File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let mut line = String::new();
    loop {
        line.clear();
        let n = reader
            .read_line(&mut line)
            .with_context(|| format!("failed to read {}", path.display()))?;
        if n == 0 {
            return Err(AdapterError::EmptyInput(path.display().to_string()).into());
        }
        if !line.trim().is_empty() {
            return Ok(line.trim().to_string());
        }
    }
}

/// JSON-lines if the first non-blank line is a JSON object, CSV otherwise.
pub fn sniff_carrier(path: &Path) -> Result<Carrier> {
    let line = first_line(path)?;
    if line.starts_with('{') {
        Ok(Carrier::Jsonl)
    } else {
        Ok(Carrier::Csv)
    }
}

/// Schema auto-detection. A JSON-lines input whose records carry a "stream"
/// field is matched by stream name (the reliable path); otherwise the field
/// names present in the input are matched against the predefined formats in
/// declaration order.
pub fn detect(path: &Path) -> Result<&'static FormatSpec> {
    let line = first_line(path)?;

    let keys: Vec<String> = if line.starts_with('{') {
        let value: serde_json::Value = serde_json::from_str(&line)
            .with_context(|| format!("first line of {} is not valid JSON", path.display()))?;
        if let Some(stream) = value.get("stream").and_then(|s| s.as_str()) {
            if let Some(spec) = FORMATS.iter().find(|f| f.stream == stream) {
                return Ok(spec);
            }
        }
        value
            .as_object()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default()
    } else {
        line.split(',').map(|s| s.trim().to_string()).collect()
    };

    for spec in FORMATS {
        let required = [spec.impact_parameter, spec.pid, spec.px, spec.py, spec.pz];
        if required.iter().all(|k| keys.iter().any(|key| key == k)) {
            return Ok(spec);
        }
    }
    Err(AdapterError::DetectFailed(path.display().to_string()).into())
}
