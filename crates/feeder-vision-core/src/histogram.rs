//! Sparse 1-D histogram with kernel-smoothed peak lookup.
//!
//! Samples are binned at a fixed resolution; the maximum is taken on the
//! `[1, 4, 6, 4, 1] / 16` smoothed density so that a peak split across two
//! neighbouring bins still wins against an isolated outlier.

use std::collections::{BTreeMap, BTreeSet};

const KERNEL: [f64; 5] = [1.0, 4.0, 6.0, 4.0, 1.0];
const KERNEL_SUM: f64 = 16.0;

#[derive(Clone, Debug)]
pub struct Histogram {
    resolution: f64,
    bins: BTreeMap<i64, f64>,
}

impl Histogram {
    /// Create an empty histogram. `resolution` must be positive.
    pub fn new(resolution: f64) -> Self {
        Self {
            resolution,
            bins: BTreeMap::new(),
        }
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Add a weighted sample. Non-finite keys are ignored.
    pub fn add(&mut self, key: f64, weight: f64) {
        if !key.is_finite() {
            return;
        }
        let bin = (key / self.resolution).round() as i64;
        *self.bins.entry(bin).or_insert(0.0) += weight;
    }

    fn raw(&self, bin: i64) -> f64 {
        self.bins.get(&bin).copied().unwrap_or(0.0)
    }

    /// Smoothed density at `bin`.
    pub fn smoothed(&self, bin: i64) -> f64 {
        let acc: f64 = KERNEL
            .iter()
            .enumerate()
            .map(|(k, w)| w * self.raw(bin + k as i64 - 2))
            .sum();
        acc / KERNEL_SUM
    }

    /// Key of the bin with the highest smoothed density.
    ///
    /// Ties resolve to the lowest key. Returns `None` for an empty histogram.
    pub fn maximum_key(&self) -> Option<f64> {
        // Only bins within the kernel radius of a sample can be non-zero.
        let candidates: BTreeSet<i64> = self
            .bins
            .keys()
            .flat_map(|&bin| (bin - 2)..=(bin + 2))
            .collect();
        let mut best: Option<(i64, f64)> = None;
        for bin in candidates {
            let value = self.smoothed(bin);
            if best.is_none_or(|(_, v)| value > v) {
                best = Some((bin, value));
            }
        }
        best.map(|(bin, _)| bin as f64 * self.resolution)
    }
}
