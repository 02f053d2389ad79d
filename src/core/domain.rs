use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::core::kinematics::WrapWindow;

// --- Constants ---

/// Hard capacity bound on particles per event; excess entries are dropped
/// with a warning and the event is processed with the truncated set.
pub const DEFAULT_MAX_PARTICLES: usize = 20_000;

// --- Event Data ---

/// A single final-state particle as delivered by the format adapter.
/// Immutable once produced; owned by the event that contains it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticleRecord {
    /// Particle-numbering-scheme code (hadron PDG code or parton flavor).
    pub code: i32,
    /// Momentum (px, py, pz) in GeV/c.
    pub momentum: Vector3<f64>,
    /// Production position (x, y, z) in fm.
    pub position: Vector3<f64>,
}

/// One collision event in the canonical shape the analysis core consumes.
/// Transient: constructed per iteration, discarded after processing (except
/// the accepted subset retained by the mixing pool).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Adapter-assigned event id. Diagnostics only, never physics.
    pub id: i64,
    /// Impact parameter b >= 0 in fm.
    pub impact_parameter: f64,
    pub particles: Vec<ParticleRecord>,
}

// --- Configuration Types ---

/// Which fixed species set the analysis runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatalogMode {
    Hadron,
    Parton,
}

impl CatalogMode {
    pub fn label(&self) -> &'static str {
        match self {
            CatalogMode::Hadron => "hadron",
            CatalogMode::Parton => "parton",
        }
    }
}

/// What to do with impact parameters beyond the classified range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CentralityPolicy {
    /// Out-of-range events carry no centrality class.
    Strict,
    /// Fold all very peripheral events into the most peripheral class (9).
    Saturating,
}

/// Scope of the centrality gate when an event has no valid class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatePolicy {
    /// An unclassified event contributes nothing beyond raw multiplicity.
    GateAll,
    /// Only centrality-binned accumulators are skipped; pair observables
    /// still accumulate.
    CentralityBinnedOnly,
}

/// When the engine fills the per-pair delta-phi histograms directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PairDphi {
    /// Never; delta-phi comes from the mixing pool path instead.
    Off,
    /// Every gate-passing event.
    All,
    /// Only events of one centrality class.
    ClassOnly(usize),
}

/// Bounded event-mixing pool configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixingConfig {
    /// FIFO depth per tracked class.
    pub capacity: usize,
    /// Centrality classes that keep a pool; others are a no-op.
    pub classes: Vec<usize>,
}

impl Default for MixingConfig {
    fn default() -> Self {
        Self {
            capacity: 4,
            classes: vec![0, 3, 6],
        }
    }
}

/// Full configuration of one correlation engine instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub mode: CatalogMode,
    pub centrality: CentralityPolicy,
    pub wrap: WrapWindow,
    pub gate: GatePolicy,
    pub pair_dphi: PairDphi,
    /// Bin count of the delta-phi histograms (pair and pooled).
    pub dphi_bins: usize,
    /// Per-species single-particle accumulators on/off.
    pub singles: bool,
    pub mixing: Option<MixingConfig>,
    pub max_particles: usize,
    /// Stream label prefixed to every accumulator name.
    pub label: String,
}

impl EngineConfig {
    /// Mixing-pool analysis: strict centrality, symmetric wrap window,
    /// per-species singles, delta-phi only through the per-class pools.
    pub fn pool_analysis(mode: CatalogMode) -> Self {
        Self {
            mode,
            centrality: CentralityPolicy::Strict,
            wrap: WrapWindow::symmetric(),
            gate: GatePolicy::GateAll,
            pair_dphi: PairDphi::Off,
            dphi_bins: 30,
            singles: true,
            mixing: Some(MixingConfig::default()),
            max_particles: DEFAULT_MAX_PARTICLES,
            label: mode.label().to_string(),
        }
    }

    /// Pair-profile analysis: saturating centrality, shifted wrap window,
    /// direct delta-phi fills for mid-central (class 3) events only.
    pub fn profile_analysis(mode: CatalogMode) -> Self {
        Self {
            mode,
            centrality: CentralityPolicy::Saturating,
            wrap: WrapWindow::shifted(),
            gate: GatePolicy::GateAll,
            pair_dphi: PairDphi::ClassOnly(3),
            dphi_bins: 32,
            singles: false,
            mixing: None,
            max_particles: DEFAULT_MAX_PARTICLES,
            label: mode.label().to_string(),
        }
    }
}
