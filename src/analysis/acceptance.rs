use crate::core::domain::CatalogMode;
use crate::core::species::SpeciesCatalog;

/// A species-specific transverse-momentum window, matched by |code|.
#[derive(Debug, Clone, Copy)]
struct PtWindow {
    abs_code: i32,
    lo: f64,
    hi: f64,
}

/// Per-species kinematic cut table, built once per mode at initialization.
/// Decides whether a particle enters the analysis at all.
#[derive(Debug, Clone)]
pub struct AcceptanceFilter {
    codes: Vec<i32>,
    pt_min: f64,
    eta_max: f64,
    windows: Vec<PtWindow>,
}

impl AcceptanceFilter {
    pub fn new(catalog: &SpeciesCatalog) -> Self {
        let (pt_min, eta_max, windows) = match catalog.mode() {
            CatalogMode::Hadron => (
                0.2,
                0.8,
                vec![
                    PtWindow { abs_code: 211, lo: 0.2, hi: 2.5 },
                    PtWindow { abs_code: 321, lo: 0.5, hi: 2.5 },
                    PtWindow { abs_code: 2212, lo: 0.7, hi: 5.0 },
                    PtWindow { abs_code: 2112, lo: 0.7, hi: 5.0 },
                    PtWindow { abs_code: 333, lo: 0.3, hi: 4.3 },
                    PtWindow { abs_code: 3122, lo: 1.0, hi: 10.0 },
                ],
            ),
            CatalogMode::Parton => (
                0.1,
                1.0,
                vec![
                    PtWindow { abs_code: 1, lo: 0.1, hi: 20.0 },
                    PtWindow { abs_code: 2, lo: 0.1, hi: 20.0 },
                    PtWindow { abs_code: 3, lo: 0.1, hi: 20.0 },
                ],
            ),
        };

        Self {
            codes: catalog.entries().iter().map(|s| s.code).collect(),
            pt_min,
            eta_max,
            windows,
        }
    }

    /// Inclusive lower bounds, exclusive rejections: a particle exactly on a
    /// threshold is kept.
    pub fn accept(&self, code: i32, pt: f64, eta: f64) -> bool {
        if !self.codes.contains(&code) {
            return false;
        }
        if pt < self.pt_min || eta.abs() > self.eta_max {
            return false;
        }
        let abs_code = code.abs();
        for w in &self.windows {
            if w.abs_code == abs_code && (pt < w.lo || pt > w.hi) {
                return false;
            }
        }
        true
    }
}
