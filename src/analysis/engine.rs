use log::warn;

use crate::analysis::acceptance::AcceptanceFilter;
use crate::analysis::centrality::CentralityClassifier;
use crate::analysis::mixing::{MixingPool, PooledEvent};
use crate::analysis::store::ResultStore;
use crate::core::domain::{EngineConfig, EventRecord, GatePolicy, PairDphi, ParticleRecord};
use crate::core::kinematics::{azimuth, pseudorapidity, transverse, WrapWindow};
use crate::core::species::{PairIndex, SpeciesCatalog};

/// Derived kinematics of one accepted particle, computed once per event.
#[derive(Debug, Clone, Copy)]
struct AcceptedTrack {
    /// Index into the event's particle sequence.
    index: usize,
    catalog_idx: usize,
    code: i32,
    pt: f64,
    eta: f64,
    phi_momentum: f64,
    r: f64,
    eta_spatial: f64,
    phi_spatial: f64,
}

/// The central component: consumes one event at a time and updates every
/// pair-indexed and per-species accumulator in its result store.
///
/// One engine instance per analysis stream; no ambient global state. All
/// lookup tables are built once at construction and read-only thereafter.
pub struct CorrelationEngine {
    config: EngineConfig,
    catalog: SpeciesCatalog,
    pairs: PairIndex,
    filter: AcceptanceFilter,
    classifier: CentralityClassifier,
    pool: Option<MixingPool>,
    store: ResultStore,
}

impl CorrelationEngine {
    pub fn new(config: EngineConfig) -> Self {
        let catalog = SpeciesCatalog::new(config.mode);
        let pairs = PairIndex::new(&catalog);
        let filter = AcceptanceFilter::new(&catalog);
        let classifier = CentralityClassifier::new(config.centrality);
        let pool = config.mixing.as_ref().map(MixingPool::new);
        let store = ResultStore::new(&config, &catalog, &pairs);

        Self {
            config,
            catalog,
            pairs,
            filter,
            classifier,
            pool,
            store,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &SpeciesCatalog {
        &self.catalog
    }

    pub fn pairs(&self) -> &PairIndex {
        &self.pairs
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub fn into_store(self) -> ResultStore {
        self.store
    }

    /// Processes one event. Deterministic for a fixed event sequence and
    /// configuration: pair iteration follows accepted-index order exactly.
    pub fn process_event(&mut self, event: &EventRecord) {
        // A. Raw multiplicity, capacity bound
        self.store.mult.fill(event.particles.len() as f64);

        let particles: &[ParticleRecord] = if event.particles.len() > self.config.max_particles {
            warn!(
                "event {}: {} particles exceed capacity {}, truncating",
                event.id,
                event.particles.len(),
                self.config.max_particles
            );
            &event.particles[..self.config.max_particles]
        } else {
            &event.particles
        };

        // B. Centrality gate
        let class = self.classifier.classify(event.impact_parameter);
        if let Some(c) = class {
            self.store.centrality.fill(c as f64 + 0.5);
            self.store.mult_cent[c].fill(event.particles.len() as f64);
        } else if self.config.gate == GatePolicy::GateAll {
            self.store.events_processed += 1;
            return;
        }

        // C. Acceptance pass
        let tracks = self.collect_accepted(particles);

        // D. Per-species singles
        if self.config.singles {
            self.fill_singles(&tracks);
        }

        // E. Unordered pairs: Delta / Gamma profiles
        self.fill_pair_profiles(&tracks);

        // F. Ordered pairs: direct delta-phi distributions
        let fill_dphi = match self.config.pair_dphi {
            PairDphi::Off => false,
            PairDphi::All => true,
            PairDphi::ClassOnly(c) => class == Some(c),
        };
        if fill_dphi {
            self.fill_pair_dphi(&tracks);
        }

        // G. Mixing pool
        if let (Some(pool), Some(c)) = (self.pool.as_mut(), class) {
            if pool.tracked(c) {
                let entry = PooledEvent {
                    codes: tracks.iter().map(|t| t.code).collect(),
                    momenta: tracks.iter().map(|t| particles[t.index].momentum).collect(),
                    positions: tracks.iter().map(|t| particles[t.index].position).collect(),
                };
                if let Some(newest) = pool.push(c, entry) {
                    Self::fill_pooled(
                        &mut self.store,
                        &self.pairs,
                        self.config.wrap,
                        c,
                        newest,
                    );
                }
            }
        }

        self.store.events_processed += 1;
    }

    // --- Helpers ---

    fn collect_accepted(&self, particles: &[ParticleRecord]) -> Vec<AcceptedTrack> {
        let mut tracks = Vec::new();
        for (index, p) in particles.iter().enumerate() {
            let pt = transverse(&p.momentum);
            let eta = pseudorapidity(&p.momentum);
            if !self.filter.accept(p.code, pt, eta) {
                continue;
            }
            // Acceptance implies catalog membership.
            let Some(catalog_idx) = self.catalog.index_of(p.code) else {
                continue;
            };
            tracks.push(AcceptedTrack {
                index,
                catalog_idx,
                code: p.code,
                pt,
                eta,
                phi_momentum: azimuth(&p.momentum),
                r: transverse(&p.position),
                eta_spatial: pseudorapidity(&p.position),
                phi_spatial: azimuth(&p.position),
            });
        }
        tracks
    }

    fn fill_singles(&mut self, tracks: &[AcceptedTrack]) {
        let Some(singles) = self.store.singles.as_mut() else {
            return;
        };
        for t in tracks {
            let i = t.catalog_idx;
            singles.pt[i].fill(t.pt);
            singles.eta[i].fill(t.eta);
            singles.phi[i].fill(t.phi_momentum);
            singles.v2[i].fill(t.pt, (2.0 * t.phi_momentum).cos());
            singles.r_spatial[i].fill(t.r);
            singles.eta_spatial[i].fill(t.eta_spatial);
            singles.phi_spatial[i].fill(t.phi_spatial);
            singles.v2_spatial[i].fill(t.r, (2.0 * t.phi_spatial).cos());
        }
    }

    /// Every unordered pair of distinct accepted particles (i < j), counted
    /// once, feeds the four pair profiles at the pair's canonical bin.
    fn fill_pair_profiles(&mut self, tracks: &[AcceptedTrack]) {
        for i in 0..tracks.len() {
            for j in (i + 1)..tracks.len() {
                let a = &tracks[i];
                let b = &tracks[j];
                let Some(bin) = self.pairs.bin_of(a.code, b.code) else {
                    continue;
                };

                let delta_momentum = (a.phi_momentum - b.phi_momentum).cos();
                let gamma_momentum = (a.phi_momentum + b.phi_momentum).cos();
                let delta_spatial = (a.phi_spatial - b.phi_spatial).cos();
                let gamma_spatial = (a.phi_spatial + b.phi_spatial).cos();

                self.store.delta_momentum.fill_bin(bin, delta_momentum);
                self.store.gamma_momentum.fill_bin(bin, gamma_momentum);
                self.store.delta_spatial.fill_bin(bin, delta_spatial);
                self.store.gamma_spatial.fill_bin(bin, gamma_spatial);
            }
        }
    }

    /// Every ordered pair of distinct accepted particles (i != j), each
    /// direction counted, fills the wrapped delta-phi distributions.
    fn fill_pair_dphi(&mut self, tracks: &[AcceptedTrack]) {
        let wrap = self.config.wrap;
        for i in 0..tracks.len() {
            for j in 0..tracks.len() {
                if i == j {
                    continue;
                }
                let a = &tracks[i];
                let b = &tracks[j];
                let Some(bin) = self.pairs.bin_of(a.code, b.code) else {
                    continue;
                };
                let dphi_momentum = wrap.wrap(a.phi_momentum - b.phi_momentum);
                let dphi_spatial = wrap.wrap(a.phi_spatial - b.phi_spatial);
                self.store.dphi_momentum[bin - 1].fill(dphi_momentum);
                self.store.dphi_spatial[bin - 1].fill(dphi_spatial);
            }
        }
    }

    /// Fills one centrality class's pooled delta-phi distributions from the
    /// ordered distinct pairs of a single buffered event.
    fn fill_pooled(
        store: &mut ResultStore,
        pairs: &PairIndex,
        wrap: WrapWindow,
        class: usize,
        entry: &PooledEvent,
    ) {
        let Some((_, hists)) = store.pooled_dphi.iter_mut().find(|(c, _)| *c == class) else {
            return;
        };
        let n = entry.len();
        for i in 0..n {
            let phi_i = azimuth(&entry.momenta[i]);
            for j in 0..n {
                if i == j {
                    continue;
                }
                let Some(bin) = pairs.bin_of(entry.codes[i], entry.codes[j]) else {
                    continue;
                };
                let dphi = wrap.wrap(phi_i - azimuth(&entry.momenta[j]));
                hists[bin - 1].fill(dphi);
            }
        }
    }
}
