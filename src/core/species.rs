use serde::Serialize;

use crate::core::domain::CatalogMode;

/// One catalog entry. The declaration order of entries is significant: it
/// defines the pair-bin order downstream.
#[derive(Debug, Clone, Serialize)]
pub struct Species {
    pub name: String,
    pub code: i32,
}

/// Fixed, mode-selected ordered species list.
#[derive(Debug, Clone, Serialize)]
pub struct SpeciesCatalog {
    mode: CatalogMode,
    entries: Vec<Species>,
}

impl SpeciesCatalog {
    pub fn new(mode: CatalogMode) -> Self {
        let defs: &[(&str, i32)] = match mode {
            CatalogMode::Hadron => &[
                ("pipos", 211),
                ("pineg", -211),
                ("Kpos", 321),
                ("Kneg", -321),
                ("p", 2212),
                ("pbar", -2212),
                ("n", 2112),
                ("nbar", -2112),
                ("phi", 333),
                ("Lambda", 3122),
                ("LambdaBar", -3122),
            ],
            CatalogMode::Parton => &[
                ("u", 2),
                ("ubar", -2),
                ("d", 1),
                ("dbar", -1),
                ("s", 3),
                ("sbar", -3),
            ],
        };

        let entries = defs
            .iter()
            .map(|&(name, code)| Species {
                name: name.to_string(),
                code,
            })
            .collect();

        Self { mode, entries }
    }

    pub fn mode(&self) -> CatalogMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Species] {
        &self.entries
    }

    /// Catalog index of a species code. Linear scan; the catalogs are small.
    pub fn index_of(&self, code: i32) -> Option<usize> {
        self.entries.iter().position(|s| s.code == code)
    }

    pub fn contains(&self, code: i32) -> bool {
        self.index_of(code).is_some()
    }
}

/// Canonical unordered species pair: (min code, max code). Two pairs with the
/// same multiset of codes always produce an identical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SpeciesPairKey {
    pub lo: i32,
    pub hi: i32,
}

impl SpeciesPairKey {
    pub fn new(a: i32, b: i32) -> Self {
        Self {
            lo: a.min(b),
            hi: a.max(b),
        }
    }
}

/// Read-only mapping from species pairs to stable 1-based bins, built once
/// from a catalog. Lookup goes through a flattened n x n matrix indexed by
/// catalog position, so no hashing happens on the per-pair hot path.
///
/// Bins are assigned by the nested (i, j >= i) iteration over the catalog in
/// declaration order, so bin order matches the human-readable species
/// ordering rather than numeric code order.
#[derive(Debug, Clone, Serialize)]
pub struct PairIndex {
    n: usize,
    codes: Vec<i32>,
    /// Flattened n x n, symmetric; value is the 1-based pair bin.
    bins: Vec<u32>,
    /// Per bin: "name_i-name_j" in assignment order.
    labels: Vec<String>,
    keys: Vec<SpeciesPairKey>,
}

impl PairIndex {
    pub fn new(catalog: &SpeciesCatalog) -> Self {
        let n = catalog.len();
        let entries = catalog.entries();

        let mut bins = vec![0u32; n * n];
        let mut labels = Vec::with_capacity(n * (n + 1) / 2);
        let mut keys = Vec::with_capacity(n * (n + 1) / 2);

        let mut bin = 0u32;
        for i in 0..n {
            for j in i..n {
                bin += 1;
                bins[i * n + j] = bin;
                bins[j * n + i] = bin;
                labels.push(format!("{}-{}", entries[i].name, entries[j].name));
                keys.push(SpeciesPairKey::new(entries[i].code, entries[j].code));
            }
        }

        Self {
            n,
            codes: entries.iter().map(|s| s.code).collect(),
            bins,
            labels,
            keys,
        }
    }

    /// Number of pair bins: |species| * (|species| + 1) / 2.
    pub fn n_pairs(&self) -> usize {
        self.labels.len()
    }

    /// 1-based bin for a pair of species codes; None if either code is
    /// uncataloged.
    #[inline]
    pub fn bin_of(&self, code_a: i32, code_b: i32) -> Option<usize> {
        let i = self.index_of(code_a)?;
        let j = self.index_of(code_b)?;
        Some(self.bins[i * self.n + j] as usize)
    }

    pub fn bin_of_key(&self, key: SpeciesPairKey) -> Option<usize> {
        self.keys.iter().position(|k| *k == key).map(|p| p + 1)
    }

    /// Label of a 1-based bin.
    pub fn label(&self, bin: usize) -> &str {
        &self.labels[bin - 1]
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn key(&self, bin: usize) -> SpeciesPairKey {
        self.keys[bin - 1]
    }

    #[inline]
    fn index_of(&self, code: i32) -> Option<usize> {
        self.codes.iter().position(|&c| c == code)
    }
}
