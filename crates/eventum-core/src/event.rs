//! Event records and the handler variant dispatched by the kernel

use crate::error::SimResult;
use crate::id::EventId;
use crate::model::ModelRef;
use crate::sim::Simulator;
use crate::time::SimTime;
use std::cmp::Ordering;
use std::fmt;

/// Closure invoked when an event fires. Fires at most once, so the payload
/// is owned by the closure and consumed on dispatch.
pub type HandlerFn = Box<dyn FnOnce(&Simulator) -> SimResult<()>>;

/// A scheduled callable.
///
/// `Bound` is a method bound to a model instance: the closure captures a
/// strong handle to its target together with the call arguments, and the
/// target reaches the simulator context through its own back-reference.
/// `Free` is a plain callable that receives the context explicitly. The
/// variant is constructed once at schedule time; the dispatcher only
/// switches on the tag.
pub enum Handler {
    Bound {
        target: ModelRef,
        name: String,
        call: HandlerFn,
    },
    Free {
        name: String,
        call: HandlerFn,
    },
}

impl Handler {
    pub fn bound(
        target: ModelRef,
        name: impl Into<String>,
        call: impl FnOnce(&Simulator) -> SimResult<()> + 'static,
    ) -> Self {
        Handler::Bound {
            target,
            name: name.into(),
            call: Box::new(call),
        }
    }

    pub fn free(
        name: impl Into<String>,
        call: impl FnOnce(&Simulator) -> SimResult<()> + 'static,
    ) -> Self {
        Handler::Free {
            name: name.into(),
            call: Box::new(call),
        }
    }

    /// Handler name used in dispatch trace records
    pub fn name(&self) -> &str {
        match self {
            Handler::Bound { name, .. } | Handler::Free { name, .. } => name,
        }
    }

    /// Source tag for log records: the bound target's label, or `kernel`
    pub(crate) fn source(&self) -> String {
        match self {
            Handler::Bound { target, .. } => target.borrow().label().to_string(),
            Handler::Free { .. } => "kernel".to_string(),
        }
    }

    pub(crate) fn invoke(self, sim: &Simulator) -> SimResult<()> {
        match self {
            Handler::Bound { call, .. } | Handler::Free { call, .. } => call(sim),
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Bound { name, .. } => write!(f, "Handler::Bound({})", name),
            Handler::Free { name, .. } => write!(f, "Handler::Free({})", name),
        }
    }
}

/// Immutable-after-insert record of a scheduled handler invocation.
/// Created only by the kernel.
pub struct Event {
    id: EventId,
    fire_time: SimTime,
    handler: Handler,
}

impl Event {
    pub(crate) fn new(id: EventId, fire_time: SimTime, handler: Handler) -> Self {
        Self {
            id,
            fire_time,
            handler,
        }
    }

    #[inline]
    pub fn id(&self) -> EventId {
        self.id
    }

    #[inline]
    pub fn fire_time(&self) -> SimTime {
        self.fire_time
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    pub(crate) fn into_handler(self) -> Handler {
        self.handler
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("id", &self.id)
            .field("fire_time", &self.fire_time)
            .field("handler", &self.handler)
            .finish()
    }
}

/// Heap key for the event queue, ordered by `(fire_time, id)`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct QueueKey {
    pub fire_time: SimTime,
    pub id: EventId,
}

impl PartialEq for QueueKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for QueueKey {}

impl PartialOrd for QueueKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueKey {
    /// Reverse ordering for min-heap use: the earliest fire-time (and, on a
    /// tie, the lowest id) sorts greatest.
    fn cmp(&self, other: &Self) -> Ordering {
        match other.fire_time.total_cmp(&self.fire_time) {
            Ordering::Equal => other.id.cmp(&self.id),
            ord => ord,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_earlier_time_sorts_greater() {
        let e1 = QueueKey {
            fire_time: SimTime::new(10.0),
            id: EventId(1),
        };
        let e2 = QueueKey {
            fire_time: SimTime::new(5.0),
            id: EventId(2),
        };
        assert!(e2 > e1);
    }

    #[test]
    fn test_equal_time_breaks_tie_by_id() {
        let e1 = QueueKey {
            fire_time: SimTime::new(5.0),
            id: EventId(1),
        };
        let e2 = QueueKey {
            fire_time: SimTime::new(5.0),
            id: EventId(2),
        };
        assert!(e1 > e2);
    }
}
