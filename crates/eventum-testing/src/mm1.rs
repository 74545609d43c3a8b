//! M/M/1 queueing system demonstration model
//!
//! The root `QueueingSystem` owns four children: a packet queue, a traffic
//! source with exponential inter-arrival times, a single server with
//! exponential service times, and a sink counting departures. Handler
//! methods are associated functions over the shared handle so they can
//! capture a strong reference when scheduling their own continuations.
//!
//! Sibling links are held as weak typed handles; the children mapping owns
//! the models.

use crate::rng::SimRng;
use eventum_core::{
    as_model, Model, ModelBase, ModelExt, Params, SimResult, Simulator,
};
use eventum_stats::{Intervals, Statistic, Trace};
use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Top-level model wiring the queue, source, server and sink together
pub struct QueueingSystem {
    base: ModelBase,
    queue: Rc<RefCell<PacketQueue>>,
    source: Rc<RefCell<Source>>,
    server: Rc<RefCell<Server>>,
    sink: Rc<RefCell<Sink>>,
    /// History of queue length plus the packet in service
    pub system_size_trace: Trace,
}

impl QueueingSystem {
    /// Build the system from a parameter bag: `arrival_mean` and
    /// `service_mean` are required, `capacity` (default unbounded) and
    /// `seed` (default 42) optional.
    pub fn create(sim: &Simulator, params: &Params) -> SimResult<Rc<RefCell<Self>>> {
        let arrival_mean = params.get_f64("arrival_mean")?;
        let service_mean = params.get_f64("service_mean")?;
        let capacity = if params.contains("capacity") {
            params.get_i64("capacity")?
        } else {
            -1
        };
        let seed = if params.contains("seed") {
            params.get_u64("seed")?
        } else {
            42
        };

        let queue = PacketQueue::new(sim, capacity).into_ref();
        let source = Source::new(sim, arrival_mean, SimRng::new(seed)).into_ref();
        let server = Server::new(sim, service_mean, SimRng::new(seed.wrapping_add(1))).into_ref();
        let sink = Sink::new(sim).into_ref();

        let system = QueueingSystem {
            base: ModelBase::new(sim, "system"),
            queue: queue.clone(),
            source: source.clone(),
            server: server.clone(),
            sink: sink.clone(),
            system_size_trace: Trace::new(),
        }
        .into_ref();

        queue.borrow_mut().wire(&server, &system);
        source.borrow_mut().wire(&queue);
        server.borrow_mut().wire(&queue, &sink, &system);

        {
            let mut sys = system.borrow_mut();
            sys.base_mut().children_mut().update([
                ("queue", as_model(&queue)),
                ("source", as_model(&source)),
                ("server", as_model(&server)),
                ("sink", as_model(&sink)),
            ]);
        }

        Ok(system)
    }

    pub fn queue(&self) -> Rc<RefCell<PacketQueue>> {
        self.queue.clone()
    }

    pub fn source(&self) -> Rc<RefCell<Source>> {
        self.source.clone()
    }

    pub fn server(&self) -> Rc<RefCell<Server>> {
        self.server.clone()
    }

    pub fn sink(&self) -> Rc<RefCell<Sink>> {
        self.sink.clone()
    }

    /// Queue length plus the packet in service, if any
    pub fn system_size(&self) -> f64 {
        let queued = self.queue.borrow().size() as f64;
        let in_service = if self.server.borrow().busy() { 1.0 } else { 0.0 };
        queued + in_service
    }

    fn record_system_size(&mut self, sim: &Simulator) {
        let size = self.system_size();
        self.system_size_trace.record(sim.stime(), size);
    }
}

impl Model for QueueingSystem {
    fn base(&self) -> &ModelBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ModelBase {
        &mut self.base
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn initialize(&mut self, sim: &Simulator) -> SimResult<()> {
        self.system_size_trace.record(sim.stime(), 0.0);
        let source = self.source.clone();
        Source::schedule_next(&source, sim)
    }
}

/// Packet queue holding only its current length
pub struct PacketQueue {
    base: ModelBase,
    capacity: i64,
    size: u64,
    server: Weak<RefCell<Server>>,
    system: Weak<RefCell<QueueingSystem>>,
    pub size_trace: Trace,
}

impl PacketQueue {
    fn new(sim: &Simulator, capacity: i64) -> Self {
        let mut size_trace = Trace::new();
        size_trace.record(sim.stime(), 0.0);
        Self {
            base: ModelBase::new(sim, "queue"),
            capacity,
            size: 0,
            server: Weak::new(),
            system: Weak::new(),
            size_trace,
        }
    }

    fn wire(&mut self, server: &Rc<RefCell<Server>>, system: &Rc<RefCell<QueueingSystem>>) {
        self.server = Rc::downgrade(server);
        self.system = Rc::downgrade(system);
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn capacity(&self) -> i64 {
        self.capacity
    }

    /// Arrival: an idle server takes the packet directly; otherwise the
    /// packet queues if there is room and is dropped if not.
    fn push(this: &Rc<RefCell<Self>>, sim: &Simulator) -> SimResult<()> {
        let (server, system) = {
            let q = this.borrow();
            (
                q.server.upgrade().expect("queue not wired"),
                q.system.upgrade().expect("queue not wired"),
            )
        };
        let server_idle = !server.borrow().busy();
        if this.borrow().size == 0 && server_idle {
            Server::start_service(&server, sim)?;
        } else {
            let mut q = this.borrow_mut();
            if q.capacity < 0 || (q.size as i64) < q.capacity {
                q.size += 1;
                let t = sim.stime();
                let size = q.size as f64;
                q.size_trace.record(t, size);
            }
        }
        system.borrow_mut().record_system_size(sim);
        Ok(())
    }

    fn pop(&mut self, sim: &Simulator) {
        debug_assert!(self.size > 0);
        self.size -= 1;
        self.size_trace.record(sim.stime(), self.size as f64);
    }
}

impl Model for PacketQueue {
    fn base(&self) -> &ModelBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ModelBase {
        &mut self.base
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Traffic source with exponential inter-arrival times
pub struct Source {
    base: ModelBase,
    arrival_mean: f64,
    rng: SimRng,
    queue: Weak<RefCell<PacketQueue>>,
    pub intervals: Intervals,
}

impl Source {
    fn new(sim: &Simulator, arrival_mean: f64, rng: SimRng) -> Self {
        Self {
            base: ModelBase::new(sim, "source"),
            arrival_mean,
            rng,
            queue: Weak::new(),
            intervals: Intervals::new(),
        }
    }

    fn wire(&mut self, queue: &Rc<RefCell<PacketQueue>>) {
        self.queue = Rc::downgrade(queue);
    }

    pub fn arrival_mean(&self) -> f64 {
        self.arrival_mean
    }

    fn on_timeout(this: &Rc<RefCell<Self>>, sim: &Simulator) -> SimResult<()> {
        let queue = this.borrow().queue.upgrade().expect("source not wired");
        PacketQueue::push(&queue, sim)?;
        Self::schedule_next(this, sim)
    }

    fn schedule_next(this: &Rc<RefCell<Self>>, sim: &Simulator) -> SimResult<()> {
        let delay = {
            let mut s = this.borrow_mut();
            let t = sim.stime();
            s.intervals.record(t);
            let mean = s.arrival_mean;
            s.rng.exponential(mean)
        };
        let me = Rc::clone(this);
        sim.schedule_bound(delay, as_model(this), "on_timeout", move |sim| {
            Source::on_timeout(&me, sim)
        })?;
        Ok(())
    }
}

impl Model for Source {
    fn base(&self) -> &ModelBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ModelBase {
        &mut self.base
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Single server with exponential service times
pub struct Server {
    base: ModelBase,
    service_mean: f64,
    rng: SimRng,
    busy: bool,
    queue: Weak<RefCell<PacketQueue>>,
    sink: Weak<RefCell<Sink>>,
    system: Weak<RefCell<QueueingSystem>>,
    /// Service durations handed to the kernel
    pub delays: Statistic,
    /// Busy status history (0/1)
    pub busy_trace: Trace,
}

impl Server {
    fn new(sim: &Simulator, service_mean: f64, rng: SimRng) -> Self {
        let mut busy_trace = Trace::new();
        busy_trace.record(sim.stime(), 0.0);
        Self {
            base: ModelBase::new(sim, "server"),
            service_mean,
            rng,
            busy: false,
            queue: Weak::new(),
            sink: Weak::new(),
            system: Weak::new(),
            delays: Statistic::new(),
            busy_trace,
        }
    }

    fn wire(
        &mut self,
        queue: &Rc<RefCell<PacketQueue>>,
        sink: &Rc<RefCell<Sink>>,
        system: &Rc<RefCell<QueueingSystem>>,
    ) {
        self.queue = Rc::downgrade(queue);
        self.sink = Rc::downgrade(sink);
        self.system = Rc::downgrade(system);
    }

    pub fn busy(&self) -> bool {
        self.busy
    }

    pub fn service_mean(&self) -> f64 {
        self.service_mean
    }

    fn start_service(this: &Rc<RefCell<Self>>, sim: &Simulator) -> SimResult<()> {
        let delay = {
            let mut s = this.borrow_mut();
            debug_assert!(!s.busy);
            let mean = s.service_mean;
            s.rng.exponential(mean)
        };
        let me = Rc::clone(this);
        sim.schedule_bound(delay, as_model(this), "on_service_end", move |sim| {
            Server::on_service_end(&me, sim)
        })?;
        let mut s = this.borrow_mut();
        s.delays.append(delay);
        s.busy = true;
        let t = sim.stime();
        s.busy_trace.record(t, 1.0);
        Ok(())
    }

    fn on_service_end(this: &Rc<RefCell<Self>>, sim: &Simulator) -> SimResult<()> {
        let (queue, sink, system) = {
            let s = this.borrow();
            (
                s.queue.upgrade().expect("server not wired"),
                s.sink.upgrade().expect("server not wired"),
                s.system.upgrade().expect("server not wired"),
            )
        };
        {
            let mut s = this.borrow_mut();
            debug_assert!(s.busy);
            s.busy = false;
            let t = sim.stime();
            s.busy_trace.record(t, 0.0);
        }
        let packet_waiting = queue.borrow().size() > 0;
        if packet_waiting {
            queue.borrow_mut().pop(sim);
            Server::start_service(this, sim)?;
        }
        sink.borrow_mut().receive_packet(sim);
        system.borrow_mut().record_system_size(sim);
        Ok(())
    }
}

impl Model for Server {
    fn base(&self) -> &ModelBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ModelBase {
        &mut self.base
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Traffic sink counting departures
pub struct Sink {
    base: ModelBase,
    pub departures: Intervals,
}

impl Sink {
    fn new(sim: &Simulator) -> Self {
        let mut departures = Intervals::new();
        departures.record(sim.stime());
        Self {
            base: ModelBase::new(sim, "sink"),
            departures,
        }
    }

    fn receive_packet(&mut self, sim: &Simulator) {
        self.departures.record(sim.stime());
    }
}

impl Model for Sink {
    fn base(&self) -> &ModelBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ModelBase {
        &mut self.base
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
