use serde::{Deserialize, Serialize};

/// Streaming profile: per bin, the (count, sum, sum-of-squares) of a scalar
/// observable over a uniform axis. Supports the mean/variance-per-bin
/// contract of a running-average histogram. Mutated additively; never reset
/// after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    name: String,
    lo: f64,
    hi: f64,
    count: Vec<u64>,
    sum: Vec<f64>,
    sumsq: Vec<f64>,
    labels: Option<Vec<String>>,
}

impl Profile {
    pub fn new(name: impl Into<String>, nbins: usize, lo: f64, hi: f64) -> Self {
        Self {
            name: name.into(),
            lo,
            hi,
            count: vec![0; nbins],
            sum: vec![0.0; nbins],
            sumsq: vec![0.0; nbins],
            labels: None,
        }
    }

    /// A profile with one bin per label, axis [0, n). Used for the
    /// pair-binned observables.
    pub fn with_labels(name: impl Into<String>, labels: Vec<String>) -> Self {
        let n = labels.len();
        let mut p = Self::new(name, n, 0.0, n as f64);
        p.labels = Some(labels);
        p
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nbins(&self) -> usize {
        self.count.len()
    }

    pub fn labels(&self) -> Option<&[String]> {
        self.labels.as_deref()
    }

    /// Adds a sample y at axis position x. Out-of-range samples are dropped.
    pub fn fill(&mut self, x: f64, y: f64) {
        if x < self.lo || x >= self.hi || self.count.is_empty() {
            return;
        }
        let width = (self.hi - self.lo) / self.count.len() as f64;
        let bin = ((x - self.lo) / width) as usize;
        let bin = bin.min(self.count.len() - 1);
        self.add(bin, y);
    }

    /// Adds a sample directly at a 1-based bin, matching the pair-bin
    /// numbering. Out-of-range bins are dropped.
    pub fn fill_bin(&mut self, bin: usize, y: f64) {
        if bin == 0 || bin > self.count.len() {
            return;
        }
        self.add(bin - 1, y);
    }

    #[inline]
    fn add(&mut self, idx: usize, y: f64) {
        self.count[idx] += 1;
        self.sum[idx] += y;
        self.sumsq[idx] += y * y;
    }

    /// (count, sum, sumsq) of a 1-based bin.
    pub fn stats(&self, bin: usize) -> (u64, f64, f64) {
        let idx = bin - 1;
        (self.count[idx], self.sum[idx], self.sumsq[idx])
    }

    pub fn entries(&self, bin: usize) -> u64 {
        self.count[bin - 1]
    }

    pub fn mean(&self, bin: usize) -> Option<f64> {
        let idx = bin - 1;
        if self.count[idx] == 0 {
            return None;
        }
        Some(self.sum[idx] / self.count[idx] as f64)
    }

    pub fn total_entries(&self) -> u64 {
        self.count.iter().sum()
    }

    /// Associative (count, sum, sumsq) combine; the shard-merge rule.
    /// Panics on shape mismatch, which only happens on incompatible configs.
    pub fn merge(&mut self, other: &Profile) {
        assert_eq!(self.count.len(), other.count.len(), "profile shape mismatch");
        for i in 0..self.count.len() {
            self.count[i] += other.count[i];
            self.sum[i] += other.sum[i];
            self.sumsq[i] += other.sumsq[i];
        }
    }
}

/// Fixed-edge count histogram with underflow/overflow tracking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Histogram {
    name: String,
    lo: f64,
    hi: f64,
    counts: Vec<u64>,
    underflow: u64,
    overflow: u64,
}

impl Histogram {
    pub fn new(name: impl Into<String>, nbins: usize, lo: f64, hi: f64) -> Self {
        Self {
            name: name.into(),
            lo,
            hi,
            counts: vec![0; nbins],
            underflow: 0,
            overflow: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nbins(&self) -> usize {
        self.counts.len()
    }

    pub fn fill(&mut self, x: f64) {
        if x < self.lo {
            self.underflow += 1;
            return;
        }
        if x >= self.hi {
            self.overflow += 1;
            return;
        }
        let width = (self.hi - self.lo) / self.counts.len() as f64;
        let bin = (((x - self.lo) / width) as usize).min(self.counts.len() - 1);
        self.counts[bin] += 1;
    }

    /// Count of a 0-based bin.
    pub fn count(&self, bin: usize) -> u64 {
        self.counts[bin]
    }

    /// In-range entries.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn underflow(&self) -> u64 {
        self.underflow
    }

    pub fn overflow(&self) -> u64 {
        self.overflow
    }

    pub fn merge(&mut self, other: &Histogram) {
        assert_eq!(self.counts.len(), other.counts.len(), "histogram shape mismatch");
        for i in 0..self.counts.len() {
            self.counts[i] += other.counts[i];
        }
        self.underflow += other.underflow;
        self.overflow += other.overflow;
    }
}
