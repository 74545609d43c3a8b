//! Timestamp recorder

use crate::Statistic;
use eventum_core::SimTime;
use serde::{Deserialize, Serialize};

/// Records a growing series of timestamps; the derived statistic is the
/// series of consecutive intervals (e.g. inter-arrival times).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Intervals {
    timestamps: Vec<f64>,
}

impl Intervals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, stime: SimTime) {
        self.timestamps.push(stime.get());
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn last(&self) -> Option<f64> {
        self.timestamps.last().copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.timestamps
    }

    /// Consecutive differences as a sample statistic
    pub fn statistic(&self) -> Statistic {
        let mut stat = Statistic::new();
        for pair in self.timestamps.windows(2) {
            stat.append(pair[1] - pair[0]);
        }
        stat
    }
}
