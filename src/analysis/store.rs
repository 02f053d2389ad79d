use anyhow::Result;
use serde::Serialize;

use crate::adapter::sink::ResultSink;
use crate::analysis::accumulators::{Histogram, Profile};
use crate::analysis::centrality::{class_label, CENTRALITY_CLASSES};
use crate::core::domain::EngineConfig;
use crate::core::species::{PairIndex, SpeciesCatalog};

// Binning conventions, shared by both analysis presets.
const MULT_BINS: usize = 1000;
const MULT_MAX: f64 = 10_000.0;
const MULT_CENT_BINS: usize = 1000;
const MULT_CENT_MAX: f64 = 100_000.0;
const PT_BINS: usize = 100;
const PT_MAX: f64 = 10.0;
const ANGLE_BINS: usize = 50;
const ETA_BINS: usize = 50;
const ETA_MAX: f64 = 2.5;
const V2_BINS: usize = 50;
const V2_PT_MAX: f64 = 5.0;
const RADIUS_BINS: usize = 50;
const RADIUS_MAX: f64 = 20.0;

/// Per-species single-particle accumulators, indexed by catalog position.
#[derive(Debug, Clone, Serialize)]
pub struct SinglesStore {
    pub pt: Vec<Histogram>,
    pub eta: Vec<Histogram>,
    pub phi: Vec<Histogram>,
    pub v2: Vec<Profile>,
    pub r_spatial: Vec<Histogram>,
    pub eta_spatial: Vec<Histogram>,
    pub phi_spatial: Vec<Histogram>,
    pub v2_spatial: Vec<Profile>,
}

impl SinglesStore {
    fn new(label: &str, catalog: &SpeciesCatalog) -> Self {
        use std::f64::consts::PI;

        let mut s = Self {
            pt: Vec::new(),
            eta: Vec::new(),
            phi: Vec::new(),
            v2: Vec::new(),
            r_spatial: Vec::new(),
            eta_spatial: Vec::new(),
            phi_spatial: Vec::new(),
            v2_spatial: Vec::new(),
        };

        for sp in catalog.entries() {
            let n = &sp.name;
            s.pt.push(Histogram::new(
                format!("h_pt_{label}_{n}"),
                PT_BINS,
                0.0,
                PT_MAX,
            ));
            s.eta.push(Histogram::new(
                format!("h_eta_{label}_{n}"),
                ETA_BINS,
                -ETA_MAX,
                ETA_MAX,
            ));
            s.phi.push(Histogram::new(
                format!("h_phi_{label}_{n}"),
                ANGLE_BINS,
                -PI,
                PI,
            ));
            s.v2.push(Profile::new(
                format!("p_v2_{label}_{n}"),
                V2_BINS,
                0.0,
                V2_PT_MAX,
            ));
            s.r_spatial.push(Histogram::new(
                format!("h_r_spatial_{label}_{n}"),
                RADIUS_BINS,
                0.0,
                RADIUS_MAX,
            ));
            s.eta_spatial.push(Histogram::new(
                format!("h_eta_spatial_{label}_{n}"),
                ETA_BINS,
                -ETA_MAX,
                ETA_MAX,
            ));
            s.phi_spatial.push(Histogram::new(
                format!("h_phi_spatial_{label}_{n}"),
                ANGLE_BINS,
                -PI,
                PI,
            ));
            s.v2_spatial.push(Profile::new(
                format!("p_v2_spatial_{label}_{n}"),
                V2_BINS,
                0.0,
                RADIUS_MAX,
            ));
        }
        s
    }

    fn merge(&mut self, other: &SinglesStore) {
        for (a, b) in self.pt.iter_mut().zip(&other.pt) {
            a.merge(b);
        }
        for (a, b) in self.eta.iter_mut().zip(&other.eta) {
            a.merge(b);
        }
        for (a, b) in self.phi.iter_mut().zip(&other.phi) {
            a.merge(b);
        }
        for (a, b) in self.v2.iter_mut().zip(&other.v2) {
            a.merge(b);
        }
        for (a, b) in self.r_spatial.iter_mut().zip(&other.r_spatial) {
            a.merge(b);
        }
        for (a, b) in self.eta_spatial.iter_mut().zip(&other.eta_spatial) {
            a.merge(b);
        }
        for (a, b) in self.phi_spatial.iter_mut().zip(&other.phi_spatial) {
            a.merge(b);
        }
        for (a, b) in self.v2_spatial.iter_mut().zip(&other.v2_spatial) {
            a.merge(b);
        }
    }
}

/// A borrowed view of one named accumulator, for sinks that want a flat
/// name -> object layout.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AccumulatorRef<'a> {
    Profile(&'a Profile),
    Histogram(&'a Histogram),
}

impl AccumulatorRef<'_> {
    pub fn name(&self) -> &str {
        match self {
            AccumulatorRef::Profile(p) => p.name(),
            AccumulatorRef::Histogram(h) => h.name(),
        }
    }
}

/// Owns every accumulator of one analysis stream. Names are deterministic
/// and stable across runs: prefixed by the stream label, pair bins labeled
/// "name_i-name_j" in pair-index order.
#[derive(Debug, Clone, Serialize)]
pub struct ResultStore {
    label: String,
    pub events_processed: u64,

    pub mult: Histogram,
    pub centrality: Histogram,
    pub mult_cent: Vec<Histogram>,

    pub delta_momentum: Profile,
    pub gamma_momentum: Profile,
    pub delta_spatial: Profile,
    pub gamma_spatial: Profile,

    /// Per pair bin (index = bin - 1), filled by the direct delta-phi path.
    pub dphi_momentum: Vec<Histogram>,
    pub dphi_spatial: Vec<Histogram>,

    pub singles: Option<SinglesStore>,

    /// Per tracked centrality class, per pair bin; filled from the mixing
    /// pool's newest warm entry.
    pub pooled_dphi: Vec<(usize, Vec<Histogram>)>,
}

impl ResultStore {
    pub fn new(config: &EngineConfig, catalog: &SpeciesCatalog, pairs: &PairIndex) -> Self {
        let label = config.label.clone();
        let wlo = config.wrap.lo;
        let whi = config.wrap.hi();

        let mult_cent = (0..CENTRALITY_CLASSES)
            .map(|c| {
                Histogram::new(
                    format!("h_mult_{label}_{}", class_label(c)),
                    MULT_CENT_BINS,
                    0.0,
                    MULT_CENT_MAX,
                )
            })
            .collect();

        let pair_labels = pairs.labels().to_vec();
        let dphi_momentum = pair_labels
            .iter()
            .map(|pl| {
                Histogram::new(
                    format!("h1_angcorr_momentum_{label}_{pl}"),
                    config.dphi_bins,
                    wlo,
                    whi,
                )
            })
            .collect();
        let dphi_spatial = pair_labels
            .iter()
            .map(|pl| {
                Histogram::new(
                    format!("h1_angcorr_spatial_{label}_{pl}"),
                    config.dphi_bins,
                    wlo,
                    whi,
                )
            })
            .collect();

        let singles = config
            .singles
            .then(|| SinglesStore::new(&label, catalog));

        let pooled_dphi = config
            .mixing
            .as_ref()
            .map(|m| {
                m.classes
                    .iter()
                    .map(|&c| {
                        let hists = pair_labels
                            .iter()
                            .map(|pl| {
                                Histogram::new(
                                    format!(
                                        "h1_angcorr_pooled_{label}_{pl}_{}",
                                        class_label(c)
                                    ),
                                    config.dphi_bins,
                                    wlo,
                                    whi,
                                )
                            })
                            .collect();
                        (c, hists)
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            mult: Histogram::new(format!("h_mult_{label}"), MULT_BINS, 0.0, MULT_MAX),
            centrality: Histogram::new(
                format!("h_centrality_{label}"),
                CENTRALITY_CLASSES,
                0.0,
                CENTRALITY_CLASSES as f64,
            ),
            mult_cent,
            delta_momentum: Profile::with_labels(
                format!("p_delta_momentum_{label}"),
                pair_labels.clone(),
            ),
            gamma_momentum: Profile::with_labels(
                format!("p_gamma_momentum_{label}"),
                pair_labels.clone(),
            ),
            delta_spatial: Profile::with_labels(
                format!("p_delta_spatial_{label}"),
                pair_labels.clone(),
            ),
            gamma_spatial: Profile::with_labels(
                format!("p_gamma_spatial_{label}"),
                pair_labels,
            ),
            dphi_momentum,
            dphi_spatial,
            singles,
            pooled_dphi,
            events_processed: 0,
            label,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Every owned accumulator, in a fixed order.
    pub fn objects(&self) -> Vec<AccumulatorRef<'_>> {
        let mut out: Vec<AccumulatorRef<'_>> = Vec::new();
        out.push(AccumulatorRef::Histogram(&self.mult));
        out.push(AccumulatorRef::Histogram(&self.centrality));
        out.extend(self.mult_cent.iter().map(AccumulatorRef::Histogram));
        out.push(AccumulatorRef::Profile(&self.delta_momentum));
        out.push(AccumulatorRef::Profile(&self.gamma_momentum));
        out.push(AccumulatorRef::Profile(&self.delta_spatial));
        out.push(AccumulatorRef::Profile(&self.gamma_spatial));
        out.extend(self.dphi_momentum.iter().map(AccumulatorRef::Histogram));
        out.extend(self.dphi_spatial.iter().map(AccumulatorRef::Histogram));
        if let Some(s) = &self.singles {
            out.extend(s.pt.iter().map(AccumulatorRef::Histogram));
            out.extend(s.eta.iter().map(AccumulatorRef::Histogram));
            out.extend(s.phi.iter().map(AccumulatorRef::Histogram));
            out.extend(s.v2.iter().map(AccumulatorRef::Profile));
            out.extend(s.r_spatial.iter().map(AccumulatorRef::Histogram));
            out.extend(s.eta_spatial.iter().map(AccumulatorRef::Histogram));
            out.extend(s.phi_spatial.iter().map(AccumulatorRef::Histogram));
            out.extend(s.v2_spatial.iter().map(AccumulatorRef::Profile));
        }
        for (_, hists) in &self.pooled_dphi {
            out.extend(hists.iter().map(AccumulatorRef::Histogram));
        }
        out
    }

    /// Hands the whole store to the persistence layer.
    pub fn write_all(&self, sink: &dyn ResultSink) -> Result<()> {
        sink.write_store(self)
    }

    /// Combines two stores of identical shape via the associative per-bin
    /// (count, sum, sumsq) merge rule.
    pub fn merge(&mut self, other: &ResultStore) {
        self.events_processed += other.events_processed;
        self.mult.merge(&other.mult);
        self.centrality.merge(&other.centrality);
        for (a, b) in self.mult_cent.iter_mut().zip(&other.mult_cent) {
            a.merge(b);
        }
        self.delta_momentum.merge(&other.delta_momentum);
        self.gamma_momentum.merge(&other.gamma_momentum);
        self.delta_spatial.merge(&other.delta_spatial);
        self.gamma_spatial.merge(&other.gamma_spatial);
        for (a, b) in self.dphi_momentum.iter_mut().zip(&other.dphi_momentum) {
            a.merge(b);
        }
        for (a, b) in self.dphi_spatial.iter_mut().zip(&other.dphi_spatial) {
            a.merge(b);
        }
        if let (Some(a), Some(b)) = (self.singles.as_mut(), other.singles.as_ref()) {
            a.merge(b);
        }
        for ((_, a), (_, b)) in self.pooled_dphi.iter_mut().zip(&other.pooled_dphi) {
            for (ha, hb) in a.iter_mut().zip(b) {
                ha.merge(hb);
            }
        }
    }
}
