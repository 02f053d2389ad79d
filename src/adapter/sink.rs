use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{json, Map, Value};

use crate::analysis::store::ResultStore;

/// The persistence seam: a result store is handed over wholesale and the
/// sink decides the on-disk representation. Writing must not mutate the
/// store, so checkpoints can reuse the same call.
pub trait ResultSink {
    fn write_store(&self, store: &ResultStore) -> Result<()>;

    /// Human-readable target description for logs.
    fn name(&self) -> String;
}

/// Writes the store as a single JSON document: a run-metadata header plus a
/// flat name -> accumulator map, so downstream consumers can locate any
/// object by its label alone.
pub struct JsonSink {
    path: PathBuf,
}

impl JsonSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ResultSink for JsonSink {
    fn write_store(&self, store: &ResultStore) -> Result<()> {
        let mut objects = Map::new();
        for obj in store.objects() {
            let value =
                serde_json::to_value(&obj).context("failed to serialize accumulator")?;
            objects.insert(obj.name().to_string(), value);
        }

        let doc = json!({
            "meta": {
                "written_at": chrono::Utc::now().to_rfc3339(),
                "label": store.label(),
                "events_processed": store.events_processed,
            },
            "objects": Value::Object(objects),
        });

        let file = File::create(&self.path)
            .with_context(|| format!("failed to create {}", self.path.display()))?;
        serde_json::to_writer(BufWriter::new(file), &doc)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }

    fn name(&self) -> String {
        self.path.display().to_string()
    }
}
