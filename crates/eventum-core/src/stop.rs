//! Stop predicates tested before each dispatch
//!
//! Predicates are evaluated after the kernel has popped an event and
//! advanced the clock to its fire-time, and before the handler runs. They
//! are assumed total: a predicate never errors.

use crate::kernel::Kernel;
use std::fmt;

/// A labelled predicate over kernel state; once true, the dispatch loop
/// halts without invoking the pending handler.
pub struct StopCondition {
    label: String,
    pred: Box<dyn Fn(&Kernel) -> bool>,
}

impl StopCondition {
    pub fn new(label: impl Into<String>, pred: impl Fn(&Kernel) -> bool + 'static) -> Self {
        Self {
            label: label.into(),
            pred: Box::new(pred),
        }
    }

    /// The default time limit. Strict inequality: an event scheduled at
    /// exactly `limit` still fires.
    pub fn time_limit(limit: f64) -> Self {
        Self::new(format!("stime > {limit}"), move |kernel| {
            kernel.stime().get() > limit
        })
    }

    pub fn holds(&self, kernel: &Kernel) -> bool {
        (self.pred)(kernel)
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for StopCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopCondition({})", self.label)
    }
}
