//! Simulator context facade and run orchestration
//!
//! `Simulator` bundles one run's kernel, parameter bag, handler registry,
//! logger, and root user model behind a cheaply-cloneable handle. Models
//! hold `WeakSim` back-references. The dispatch loop lives here: the kernel
//! sits in a `RefCell` and its borrow is released before each user handler
//! runs, so handlers are free to schedule and cancel.

use crate::error::SimResult;
use crate::event::Handler;
use crate::id::EventId;
use crate::kernel::Kernel;
use crate::logger::{LogLevel, LogSink, Logger, StdoutSink};
use crate::model::{Model, ModelRef};
use crate::params::Params;
use crate::registry::{HandlerRegistry, NamedHandler};
use crate::stop::StopCondition;
use crate::time::SimTime;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Callback run before or after the dispatch loop
pub type SetupFn = Box<dyn Fn(&Simulator) -> SimResult<()>>;

struct SimInner {
    kernel: RefCell<Kernel>,
    params: Params,
    handlers: HandlerRegistry,
    logger: Logger,
    data: RefCell<Option<ModelRef>>,
}

/// Handle to one simulation run
#[derive(Clone)]
pub struct Simulator {
    inner: Rc<SimInner>,
}

/// Non-owning handle held by models
#[derive(Clone)]
pub struct WeakSim {
    inner: Weak<SimInner>,
}

impl WeakSim {
    /// A handle pointing at nothing; used by detached models until they are
    /// adopted into a run
    pub fn detached() -> Self {
        Self { inner: Weak::new() }
    }

    pub fn upgrade(&self) -> Option<Simulator> {
        self.inner.upgrade().map(|inner| Simulator { inner })
    }
}

impl Simulator {
    pub(crate) fn new(params: Params, loglevel: LogLevel, sink: Box<dyn LogSink>) -> Self {
        let kernel = Kernel::new();
        let logger = Logger::new(kernel.clock(), loglevel, sink);
        Self {
            inner: Rc::new(SimInner {
                kernel: RefCell::new(kernel),
                params,
                handlers: HandlerRegistry::new(),
                logger,
                data: RefCell::new(None),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakSim {
        WeakSim {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Schedule `handler` to fire `delay` from now; returns the event id
    pub fn schedule(&self, delay: f64, handler: Handler) -> SimResult<EventId> {
        self.inner.kernel.borrow_mut().schedule(delay, handler)
    }

    /// Schedule a method bound to `target`
    pub fn schedule_bound(
        &self,
        delay: f64,
        target: ModelRef,
        name: impl Into<String>,
        call: impl FnOnce(&Simulator) -> SimResult<()> + 'static,
    ) -> SimResult<EventId> {
        self.schedule(delay, Handler::bound(target, name, call))
    }

    /// Schedule a free callable
    pub fn schedule_free(
        &self,
        delay: f64,
        name: impl Into<String>,
        call: impl FnOnce(&Simulator) -> SimResult<()> + 'static,
    ) -> SimResult<EventId> {
        self.schedule(delay, Handler::free(name, call))
    }

    /// Schedule a registry handler by name
    pub fn schedule_named(&self, delay: f64, name: &str) -> SimResult<EventId> {
        let handler = self.inner.handlers.lookup(name)?;
        self.schedule(
            delay,
            Handler::free(name.to_string(), move |sim| handler(sim)),
        )
    }

    /// Cancel a scheduled event. Idempotent; unknown ids (already fired or
    /// already cancelled) are silently tolerated.
    pub fn cancel(&self, id: EventId) {
        self.inner.kernel.borrow_mut().cancel(id);
    }

    pub fn stime(&self) -> SimTime {
        self.inner.kernel.borrow().stime()
    }

    pub fn num_events(&self) -> u64 {
        self.inner.kernel.borrow().num_events()
    }

    pub fn queue_size(&self) -> usize {
        self.inner.kernel.borrow().queue_size()
    }

    pub fn params(&self) -> &Params {
        &self.inner.params
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.inner.handlers
    }

    pub fn logger(&self) -> &Logger {
        &self.inner.logger
    }

    /// The root user model, once constructed or adopted
    pub fn data(&self) -> Option<ModelRef> {
        self.inner.data.borrow().clone()
    }

    /// Register the time-limit stop predicate (no-op for non-positive limits)
    pub fn setup(&self, stime_limit: f64) {
        self.inner.kernel.borrow_mut().setup(stime_limit);
    }

    pub fn add_stop_condition(&self, condition: StopCondition) {
        self.inner.kernel.borrow_mut().add_stop_condition(condition);
    }

    pub(crate) fn set_data(&self, root: ModelRef) {
        *self.inner.data.borrow_mut() = Some(root);
    }

    /// Adopt an already-constructed root: stamp the context handle through
    /// the whole tree, then install it as `data`.
    pub(crate) fn adopt(&self, root: ModelRef) {
        fn stamp(sim: &Simulator, model: &ModelRef) {
            model.borrow_mut().base_mut().set_sim(sim.downgrade());
            let children = model.borrow().base().children().models();
            for child in &children {
                stamp(sim, child);
            }
        }
        stamp(self, &root);
        self.set_data(root);
    }

    /// The dispatch loop.
    ///
    /// Runs the root model's `initialize`, then `init`; pops live events
    /// until the queue drains or a stop predicate holds. A vetoing stop
    /// predicate is consulted after the pop has advanced the clock, so a
    /// run ended this way leaves `stime` at the rejected event's fire-time.
    /// Handler errors propagate unchanged and terminate the run; `fin` runs
    /// only on orderly termination.
    pub(crate) fn run(&self, init: Option<&SetupFn>, fin: Option<&SetupFn>) -> SimResult<()> {
        if let Some(root) = self.data() {
            root.borrow_mut().initialize(self)?;
        }
        if let Some(init) = init {
            init(self)?;
        }
        loop {
            let event = {
                let mut kernel = self.inner.kernel.borrow_mut();
                if kernel.is_empty() {
                    break;
                }
                let event = kernel.pop_next()?;
                if kernel.should_stop() {
                    break;
                }
                event
            };
            let handler = event.into_handler();
            if self.inner.logger.level() == LogLevel::Trace {
                match &handler {
                    Handler::Bound { .. } => self
                        .inner
                        .logger
                        .trace(&handler.source(), format!("** calling {}()", handler.name())),
                    Handler::Free { .. } => self
                        .inner
                        .logger
                        .trace("kernel", format!("** {}()", handler.name())),
                }
            }
            handler.invoke(self)?;
            self.inner.kernel.borrow_mut().count_dispatch();
        }
        if let Some(fin) = fin {
            fin(self)?;
        }
        Ok(())
    }
}

/// Fluent configuration for one or more simulation runs
pub struct SimulationBuilder {
    init: Option<SetupFn>,
    fin: Option<SetupFn>,
    handlers: Vec<(String, NamedHandler)>,
    stop_conditions: Vec<(String, Rc<dyn Fn(&Kernel) -> bool>)>,
    stime_limit: f64,
    loglevel: LogLevel,
    sink: Option<Box<dyn Fn() -> Box<dyn LogSink>>>,
}

impl Default for SimulationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationBuilder {
    pub fn new() -> Self {
        Self {
            init: None,
            fin: None,
            handlers: Vec::new(),
            stop_conditions: Vec::new(),
            stime_limit: 0.0,
            loglevel: LogLevel::Info,
            sink: None,
        }
    }

    /// Callback invoked after the root model's `initialize`, before the loop
    pub fn init(mut self, f: impl Fn(&Simulator) -> SimResult<()> + 'static) -> Self {
        self.init = Some(Box::new(f));
        self
    }

    /// Callback invoked after the loop terminates
    pub fn fin(mut self, f: impl Fn(&Simulator) -> SimResult<()> + 'static) -> Self {
        self.fin = Some(Box::new(f));
        self
    }

    /// Pre-register a named handler in every run's registry
    pub fn handler(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&Simulator) -> SimResult<()> + 'static,
    ) -> Self {
        self.handlers.push((name.into(), Rc::new(f)));
        self
    }

    /// Register a custom stop predicate in every run
    pub fn stop_when(
        mut self,
        label: impl Into<String>,
        pred: impl Fn(&Kernel) -> bool + 'static,
    ) -> Self {
        self.stop_conditions.push((label.into(), Rc::new(pred)));
        self
    }

    /// Simulated-time limit; zero (the default) installs no predicate
    pub fn stime_limit(mut self, limit: f64) -> Self {
        self.stime_limit = limit;
        self
    }

    pub fn loglevel(mut self, level: LogLevel) -> Self {
        self.loglevel = level;
        self
    }

    /// Sink factory, invoked once per run; defaults to styled stdout
    pub fn log_sink(mut self, make: impl Fn() -> Box<dyn LogSink> + 'static) -> Self {
        self.sink = Some(Box::new(make));
        self
    }

    /// Construct a context without running the dispatch loop
    pub fn build(&self, params: Params) -> Simulator {
        let sink: Box<dyn LogSink> = match &self.sink {
            Some(make) => make(),
            None => Box::new(StdoutSink::new()),
        };
        let sim = Simulator::new(params, self.loglevel, sink);
        for (name, handler) in &self.handlers {
            sim.handlers().insert_shared(name.clone(), handler.clone());
        }
        sim.setup(self.stime_limit);
        for (label, pred) in &self.stop_conditions {
            let pred = pred.clone();
            sim.add_stop_condition(StopCondition::new(label.clone(), move |k| pred(k)));
        }
        sim
    }

    /// Run with an already-constructed root model, adopted as-is
    pub fn run(self, root: ModelRef, params: Params) -> SimResult<Simulator> {
        let sim = self.build(params);
        sim.adopt(root);
        sim.run(self.init.as_ref(), self.fin.as_ref())?;
        Ok(sim)
    }

    /// Run with a root model built by `factory` from the fresh context and
    /// its parameter bag
    pub fn run_with<M, F>(self, factory: F, params: Params) -> SimResult<Simulator>
    where
        M: Model,
        F: FnOnce(&Simulator, &Params) -> SimResult<Rc<RefCell<M>>>,
    {
        let sim = self.build(params);
        let root = factory(&sim, sim.params())?;
        sim.set_data(root);
        sim.run(self.init.as_ref(), self.fin.as_ref())?;
        Ok(sim)
    }

    /// Run without a root model; everything is driven by `init` and free
    /// handlers
    pub fn run_bare(self, params: Params) -> SimResult<Simulator> {
        let sim = self.build(params);
        sim.run(self.init.as_ref(), self.fin.as_ref())?;
        Ok(sim)
    }

    /// One fully isolated run per parameter bag: fresh kernel and model
    /// graph each time, nothing shared. Results come back in input order.
    pub fn sweep<M, F>(self, factory: F, param_sets: Vec<Params>) -> SimResult<Vec<Simulator>>
    where
        M: Model,
        F: Fn(&Simulator, &Params) -> SimResult<Rc<RefCell<M>>>,
    {
        let mut results = Vec::with_capacity(param_sets.len());
        for params in param_sets {
            let sim = self.build(params);
            let root = factory(&sim, sim.params())?;
            sim.set_data(root);
            sim.run(self.init.as_ref(), self.fin.as_ref())?;
            results.push(sim);
        }
        Ok(results)
    }
}

/// Single run with default settings, adopting `root`
pub fn simulate(root: ModelRef, params: Params) -> SimResult<Simulator> {
    SimulationBuilder::new().run(root, params)
}

/// Single run with default settings, building the root through `factory`
pub fn simulate_with<M, F>(factory: F, params: Params) -> SimResult<Simulator>
where
    M: Model,
    F: FnOnce(&Simulator, &Params) -> SimResult<Rc<RefCell<M>>>,
{
    SimulationBuilder::new().run_with(factory, params)
}
