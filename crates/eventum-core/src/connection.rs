//! Directed model-to-model channels
//!
//! A connection owned by model A and naming peer B is a directed channel:
//! `send(msg)` resolves the channel delay and schedules B's
//! `handle_message(msg, sender = A)` through the kernel. Connections hold
//! non-owning references; targets are siblings or any other model.

use crate::error::{SimError, SimResult};
use crate::event::Handler;
use crate::id::EventId;
use crate::model::{Message, ModelRef, WeakModel};
use crate::sim::WeakSim;
use indexmap::IndexMap;
use std::fmt;

/// Scheduling delay of a connection: a fixed scalar or a draw made at send
/// time. Defaults to zero.
pub enum Delay {
    Fixed(f64),
    FromFn(Box<dyn Fn() -> f64>),
}

impl Delay {
    fn resolve(&self) -> f64 {
        match self {
            Delay::Fixed(d) => *d,
            Delay::FromFn(f) => f(),
        }
    }
}

impl Default for Delay {
    fn default() -> Self {
        Delay::Fixed(0.0)
    }
}

impl From<f64> for Delay {
    fn from(d: f64) -> Self {
        Delay::Fixed(d)
    }
}

impl fmt::Debug for Delay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delay::Fixed(d) => write!(f, "Fixed({d})"),
            Delay::FromFn(_) => write!(f, "FromFn"),
        }
    }
}

/// A directed channel from its owning model to a peer
pub struct Connection {
    sim: WeakSim,
    owner: WeakModel,
    module: ModelRef,
    delay: Delay,
}

impl Connection {
    pub(crate) fn new(sim: WeakSim, owner: WeakModel, module: ModelRef) -> Self {
        Self {
            sim,
            owner,
            module,
            delay: Delay::default(),
        }
    }

    /// The peer model
    pub fn module(&self) -> ModelRef {
        self.module.clone()
    }

    pub fn set_module(&mut self, module: ModelRef) {
        self.module = module;
    }

    pub fn delay(&self) -> &Delay {
        &self.delay
    }

    pub fn set_delay(&mut self, delay: impl Into<Delay>) {
        self.delay = delay.into();
    }

    pub fn set_delay_fn(&mut self, f: impl Fn() -> f64 + 'static) {
        self.delay = Delay::FromFn(Box::new(f));
    }

    pub(crate) fn set_sim(&mut self, sim: WeakSim) {
        self.sim = sim;
    }

    /// Resolve the delay and schedule the peer's `handle_message` with this
    /// connection's owner as the sender. The returned event id may be kept
    /// for cancellation or discarded.
    ///
    /// Only weak handles are upgraded here, so models may send from inside
    /// their own handler bodies while mutably borrowed.
    pub fn send(&self, msg: Message) -> SimResult<EventId> {
        let sim = self.sim.upgrade().ok_or_else(|| {
            SimError::InvariantViolation("connection used outside a live simulation".to_string())
        })?;
        let sender = self.owner.upgrade();
        let target = self.module.clone();
        let peer = self.module.clone();
        let delay = self.delay.resolve();
        sim.schedule(
            delay,
            Handler::bound(target, "handle_message", move |sim| {
                peer.borrow_mut().handle_message(sim, msg, sender)
            }),
        )
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("module", &self.module.borrow().label())
            .field("delay", &self.delay)
            .finish()
    }
}

/// Named connection records owned by a model. Assigning a peer wraps it in
/// a fresh `Connection` with zero delay; one connection per (owner, name).
#[derive(Default)]
pub struct Connections {
    sim: Option<WeakSim>,
    owner: Option<WeakModel>,
    map: IndexMap<String, Connection>,
}

impl Connections {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn bind(&mut self, sim: WeakSim, owner: WeakModel) {
        self.sim = Some(sim);
        self.owner = Some(owner);
    }

    pub(crate) fn set_sim(&mut self, sim: WeakSim) {
        for connection in self.map.values_mut() {
            connection.set_sim(sim.clone());
        }
        self.sim = Some(sim);
    }

    /// Create (or replace) the named connection wrapping `module`
    pub fn insert(&mut self, name: impl Into<String>, module: ModelRef) {
        let sim = self
            .sim
            .clone()
            .expect("connection manager not bound; wrap the model with into_ref first");
        let owner = self
            .owner
            .clone()
            .expect("connection manager not bound; wrap the model with into_ref first");
        self.map
            .insert(name.into(), Connection::new(sim, owner, module));
    }

    /// Bulk insert
    pub fn update<I, K>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, ModelRef)>,
        K: Into<String>,
    {
        for (name, module) in entries {
            self.insert(name, module);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Connection> {
        self.map.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Connection> {
        self.map.get_mut(name)
    }

    /// Lookup that surfaces absence as `UnknownName`
    pub fn lookup(&self, name: &str) -> SimResult<&Connection> {
        self.get(name)
            .ok_or_else(|| SimError::UnknownName(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    /// The peers, in insertion order
    pub fn modules(&self) -> Vec<ModelRef> {
        self.map.values().map(Connection::module).collect()
    }

    /// Name → peer view
    pub fn as_dict(&self) -> IndexMap<String, ModelRef> {
        self.map
            .iter()
            .map(|(name, connection)| (name.clone(), connection.module()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl fmt::Debug for Connections {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.map.iter()).finish()
    }
}
