//! Discrete Event Simulation (DES) kernel
//!
//! The kernel owns simulated time, the event queue, and the id allocator.
//! It advances the clock by consuming the earliest live event; the dispatch
//! loop itself runs on the simulator context, which releases its borrow of
//! the kernel while user handlers execute.

use crate::error::{SimError, SimResult};
use crate::event::{Event, Handler};
use crate::id::{EventId, IdGenerator};
use crate::queue::EventQueue;
use crate::stop::StopCondition;
use crate::time::SimTime;
use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug)]
pub struct Kernel {
    /// Current simulation time, in a shared cell so the logger can stamp
    /// records without borrowing the kernel
    clock: Rc<Cell<SimTime>>,
    /// Priority queue of scheduled events
    queue: EventQueue,
    /// Event id allocator
    event_ids: IdGenerator<EventId>,
    /// Total events dispatched
    num_events: u64,
    /// Predicates tested after each pop, before dispatch
    stop_conditions: Vec<StopCondition>,
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel {
    /// Create a new kernel starting at time 0
    pub fn new() -> Self {
        Self {
            clock: Rc::new(Cell::new(SimTime::ZERO)),
            queue: EventQueue::new(),
            event_ids: IdGenerator::new(),
            num_events: 0,
            stop_conditions: Vec::new(),
        }
    }

    /// Shared handle to the clock, read by the logger
    pub fn clock(&self) -> Rc<Cell<SimTime>> {
        Rc::clone(&self.clock)
    }

    /// Get current simulation time
    #[inline]
    pub fn stime(&self) -> SimTime {
        self.clock.get()
    }

    /// Total events dispatched so far
    #[inline]
    pub fn num_events(&self) -> u64 {
        self.num_events
    }

    /// Number of live scheduled events
    #[inline]
    pub fn queue_size(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Schedule `handler` to fire `delay` from the current time.
    ///
    /// Returns the event id so the caller may cancel later. Fails with
    /// `NegativeDelay` for delays below zero; NaN delays are rejected at
    /// this boundary rather than poisoning the queue order.
    pub fn schedule(&mut self, delay: f64, handler: Handler) -> SimResult<EventId> {
        if !(delay >= 0.0) {
            return Err(SimError::NegativeDelay(delay));
        }
        let id = self.event_ids.next();
        let fire_time = self.stime() + SimTime::new(delay);
        self.queue.push(Event::new(id, fire_time, handler));
        Ok(id)
    }

    /// Cancel a scheduled event. Returns the event if it was still pending;
    /// `None` (no-op) for events that already fired or were cancelled.
    pub fn cancel(&mut self, id: EventId) -> Option<Event> {
        self.queue.cancel(id)
    }

    /// Register the time-limit stop predicate. Non-positive limits install
    /// nothing; multiple calls accumulate predicates.
    pub fn setup(&mut self, stime_limit: f64) {
        if stime_limit > 0.0 {
            self.stop_conditions
                .push(StopCondition::time_limit(stime_limit));
        }
    }

    pub fn add_stop_condition(&mut self, condition: StopCondition) {
        self.stop_conditions.push(condition);
    }

    /// Pop the earliest live event and advance the clock to its fire-time.
    ///
    /// The clock moves even when a stop predicate then vetoes dispatch:
    /// after a vetoed pop, `stime` reads as the rejected event's fire-time.
    pub fn pop_next(&mut self) -> SimResult<Event> {
        let event = self.queue.pop_next()?;
        if event.fire_time() < self.stime() {
            return Err(SimError::InvariantViolation(format!(
                "event {} fires at {} before current stime {}",
                event.id(),
                event.fire_time().get(),
                self.stime().get(),
            )));
        }
        self.clock.set(event.fire_time());
        Ok(event)
    }

    /// True once any registered stop predicate holds
    pub fn should_stop(&self) -> bool {
        self.stop_conditions.iter().any(|c| c.holds(self))
    }

    pub(crate) fn count_dispatch(&mut self) {
        self.num_events += 1;
    }
}
