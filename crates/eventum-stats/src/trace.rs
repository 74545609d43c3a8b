//! Time-weighted value trace

use eventum_core::SimTime;
use serde::{Deserialize, Serialize};

/// Time-series data point
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TracePoint {
    pub stime: f64,
    pub value: f64,
}

/// A sampled step function: the value recorded at `t` holds until the next
/// record. Used for quantities like queue length or busy status.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Trace {
    points: Vec<TracePoint>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, stime: SimTime, value: f64) {
        self.points.push(TracePoint {
            stime: stime.get(),
            value,
        });
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<TracePoint> {
        self.points.last().copied()
    }

    pub fn as_slice(&self) -> &[TracePoint] {
        &self.points
    }

    /// Time-weighted mean over the recorded span
    pub fn timeavg(&self) -> f64 {
        if self.points.len() < 2 {
            return self.points.first().map(|p| p.value).unwrap_or(0.0);
        }
        let mut weighted = 0.0;
        for pair in self.points.windows(2) {
            weighted += pair[0].value * (pair[1].stime - pair[0].stime);
        }
        let span = self.points[self.points.len() - 1].stime - self.points[0].stime;
        if span > 0.0 {
            weighted / span
        } else {
            self.points[self.points.len() - 1].value
        }
    }
}
