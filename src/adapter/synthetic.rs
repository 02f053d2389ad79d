use std::f64::consts::PI;

use anyhow::Result;
use nalgebra::Vector3;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::adapter::EventSource;
use crate::core::domain::{CatalogMode, EventRecord, ParticleRecord};
use crate::core::species::SpeciesCatalog;

/// Seeded generator of plausible events, for demos and pipeline smoke tests.
/// The same seed always yields the same event sequence.
#[derive(Debug)]
pub struct SyntheticSource {
    rng: ChaCha8Rng,
    codes: Vec<i32>,
    remaining: usize,
    next_id: i64,
}

impl SyntheticSource {
    pub fn new(mode: CatalogMode, events: usize, seed: u64) -> Self {
        let catalog = SpeciesCatalog::new(mode);
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            codes: catalog.entries().iter().map(|s| s.code).collect(),
            remaining: events,
            next_id: 0,
        }
    }

    fn random_particle(&mut self) -> ParticleRecord {
        let code = self.codes[self.rng.gen_range(0..self.codes.len())];

        let pt = self.rng.gen_range(0.05..4.0);
        let phi = self.rng.gen_range(-PI..PI);
        let eta: f64 = self.rng.gen_range(-1.5..1.5);

        let r = self.rng.gen_range(0.0..15.0);
        let phi_s = self.rng.gen_range(-PI..PI);
        let z = self.rng.gen_range(-10.0..10.0);

        ParticleRecord {
            code,
            momentum: Vector3::new(pt * phi.cos(), pt * phi.sin(), pt * eta.sinh()),
            position: Vector3::new(r * phi_s.cos(), r * phi_s.sin(), z),
        }
    }
}

impl EventSource for SyntheticSource {
    fn next_event(&mut self) -> Result<Option<EventRecord>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;

        let id = self.next_id;
        self.next_id += 1;

        let impact_parameter = self.rng.gen_range(0.0..16.0);
        let multiplicity = self.rng.gen_range(40..300);
        let particles = (0..multiplicity)
            .map(|_| self.random_particle())
            .collect();

        Ok(Some(EventRecord {
            id,
            impact_parameter,
            particles,
        }))
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}
