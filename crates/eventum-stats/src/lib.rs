//! Eventum Stats - statistical collectors for simulation models
//!
//! User models own and update these; the kernel never reads them. `Trace`
//! follows a value through time, `Intervals` records a series of
//! timestamps, and `Statistic` accumulates plain samples.

pub mod intervals;
pub mod statistic;
pub mod trace;

pub use intervals::Intervals;
pub use statistic::Statistic;
pub use trace::{Trace, TracePoint};
