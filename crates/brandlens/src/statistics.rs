//! Streaming statistics.
//!
//! Both accumulators use Welford's update so values never need to be stored
//! and the result stays stable over long inputs.

use serde::{Deserialize, Serialize};

/// Incremental arithmetic mean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningMean {
    count: u64,
    mean: f64,
}

impl RunningMean {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: f64) {
        self.count += 1;
        self.mean += (value - self.mean) / self.count as f64;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// The mean so far, or 0 when nothing has been pushed.
    pub fn mean(&self) -> f64 {
        self.mean
    }
}

/// Incremental mean and population variance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Population variance (divides by `n`).
    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.m2 / self.count as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}

impl FromIterator<f64> for RunningStats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = Self::new();
        for value in iter {
            stats.push(value);
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_mean_empty() {
        let mean = RunningMean::new();
        assert_eq!(mean.count(), 0);
        assert_eq!(mean.mean(), 0.0);
    }

    #[test]
    fn test_running_mean_matches_arithmetic_mean() {
        let mut mean = RunningMean::new();
        for v in [2.0, 4.0, 9.0] {
            mean.push(v);
        }
        assert!((mean.mean() - 5.0).abs() < 1e-12);
        assert_eq!(mean.count(), 3);
    }

    #[test]
    fn test_running_stats_population_std() {
        let stats: RunningStats = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0].into_iter().collect();
        assert!((stats.mean() - 5.0).abs() < 1e-12);
        assert!((stats.std_dev() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_running_stats_single_value_has_zero_spread() {
        let stats: RunningStats = std::iter::once(42.0).collect();
        assert_eq!(stats.variance(), 0.0);
        assert_eq!(stats.mean(), 42.0);
    }

    #[test]
    fn test_running_mean_stable_for_large_offsets() {
        let mut mean = RunningMean::new();
        for i in 0..10_000 {
            mean.push(1e9 + (i % 3) as f64);
        }
        assert!((mean.mean() - (1e9 + 1.0)).abs() < 1e-3);
    }
}
