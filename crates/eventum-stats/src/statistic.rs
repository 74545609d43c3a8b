//! Sample accumulator

use serde::{Deserialize, Serialize};

/// Collects scalar samples and reduces them
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Statistic {
    samples: Vec<f64>,
}

impl Statistic {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, value: f64) {
        self.samples.push(value);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.samples
    }

    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    /// Unbiased sample variance
    pub fn var(&self) -> f64 {
        if self.samples.len() < 2 {
            return 0.0;
        }
        let mean = self.mean();
        let sum_sq: f64 = self.samples.iter().map(|s| (s - mean) * (s - mean)).sum();
        sum_sq / (self.samples.len() - 1) as f64
    }

    pub fn std(&self) -> f64 {
        self.var().sqrt()
    }

    pub fn min(&self) -> Option<f64> {
        self.samples.iter().copied().reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.samples.iter().copied().reduce(f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_statistic() {
        let stat = Statistic::new();
        assert_eq!(stat.mean(), 0.0);
        assert_eq!(stat.var(), 0.0);
        assert!(stat.min().is_none());
    }

    #[test]
    fn test_mean_and_variance() {
        let mut stat = Statistic::new();
        for v in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            stat.append(v);
        }
        assert_eq!(stat.len(), 8);
        assert_eq!(stat.mean(), 5.0);
        assert!((stat.var() - 32.0 / 7.0).abs() < 1e-12);
        assert_eq!(stat.min(), Some(2.0));
        assert_eq!(stat.max(), Some(9.0));
    }
}
