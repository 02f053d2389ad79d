use anyhow::{bail, Result};
use log::{debug, info};
use rayon::prelude::*;

use crate::adapter::{EventSource, ResultSink};
use crate::analysis::engine::CorrelationEngine;
use crate::analysis::store::ResultStore;
use crate::core::domain::{EngineConfig, EventRecord};

/// Caller-side scheduling knobs. Checkpointing is a runner decision, never
/// embedded in the accumulation path.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Flush the store to the checkpoint sink every this many events.
    pub checkpoint_every: u64,
    /// Progress log cadence.
    pub progress_every: u64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            checkpoint_every: 50,
            progress_every: 1000,
        }
    }
}

/// Drives events one at a time through the engine. A checkpoint is a
/// blocking, synchronous write of the current store; nothing mutates the
/// accumulators while it runs. An input yielding zero events is fatal.
pub fn run(
    engine: &mut CorrelationEngine,
    source: &mut dyn EventSource,
    checkpoint: Option<&dyn ResultSink>,
    opts: &RunOptions,
) -> Result<u64> {
    let mut processed: u64 = 0;

    while let Some(event) = source.next_event()? {
        engine.process_event(&event);
        processed += 1;

        if processed % opts.progress_every == 0 {
            info!("processed {} events", processed);
        }
        if let Some(sink) = checkpoint {
            if processed % opts.checkpoint_every == 0 {
                engine.store().write_all(sink)?;
                debug!("checkpoint written to {} at event {}", sink.name(), processed);
            }
        }
    }

    if processed == 0 {
        bail!("input source '{}' yielded no events", source.name());
    }
    Ok(processed)
}

/// Processes an in-memory event batch sharded across a rayon pool: ordered
/// contiguous chunks, one engine per chunk, stores merged sequentially in
/// chunk order via the associative (count, sum, sumsq) rule.
///
/// The mixing pool carries cross-event state, so a config with mixing
/// enabled falls back to a single sequential engine.
pub fn run_sharded(
    config: &EngineConfig,
    events: &[EventRecord],
    threads: usize,
) -> Result<ResultStore> {
    if events.is_empty() {
        bail!("event batch is empty");
    }

    if config.mixing.is_some() || threads <= 1 {
        if config.mixing.is_some() && threads > 1 {
            info!("mixing pool enabled; running sequentially");
        }
        let mut engine = CorrelationEngine::new(config.clone());
        for event in events {
            engine.process_event(event);
        }
        return Ok(engine.into_store());
    }

    let chunk_size = (events.len() + threads - 1) / threads;
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()?;

    let stores: Vec<ResultStore> = pool.install(|| {
        events
            .par_chunks(chunk_size)
            .map(|chunk| {
                let mut engine = CorrelationEngine::new(config.clone());
                for event in chunk {
                    engine.process_event(event);
                }
                engine.into_store()
            })
            .collect()
    });

    let mut iter = stores.into_iter();
    let mut merged = match iter.next() {
        Some(first) => first,
        None => bail!("sharded run produced no stores"),
    };
    for store in iter {
        merged.merge(&store);
    }
    Ok(merged)
}
