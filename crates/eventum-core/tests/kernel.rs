//! Kernel dispatch scenarios exercised through the public embedding API

use eventum_core::{
    LogLevel, LogRecord, MemorySink, Model, ModelBase, ModelExt, Params, SimError, SimResult,
    SimulationBuilder, Simulator,
};
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

type Log = Rc<RefCell<Vec<(&'static str, f64)>>>;

fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

fn record(log: &Log, tag: &'static str) -> impl FnOnce(&Simulator) -> SimResult<()> + 'static {
    let log = Rc::clone(log);
    move |sim| {
        log.borrow_mut().push((tag, sim.stime().get()));
        Ok(())
    }
}

#[test]
fn equal_time_events_fire_in_schedule_order() {
    let log = new_log();
    let l = log.clone();
    let sim = SimulationBuilder::new()
        .init(move |sim| {
            sim.schedule_free(5.0, "a", record(&l, "a"))?;
            sim.schedule_free(5.0, "b", record(&l, "b"))?;
            Ok(())
        })
        .run_bare(Params::new())
        .unwrap();

    assert_eq!(*log.borrow(), vec![("a", 5.0), ("b", 5.0)]);
    assert_eq!(sim.num_events(), 2);
}

#[test]
fn cancelled_event_never_runs() {
    let log = new_log();
    let l = log.clone();
    let sim = SimulationBuilder::new()
        .init(move |sim| {
            let id = sim.schedule_free(10.0, "a", record(&l, "a"))?;
            sim.schedule_free(5.0, "b", record(&l, "b"))?;
            sim.cancel(id);
            sim.cancel(id); // idempotent
            Ok(())
        })
        .run_bare(Params::new())
        .unwrap();

    assert_eq!(*log.borrow(), vec![("b", 5.0)]);
    assert_eq!(sim.num_events(), 1);
    assert_eq!(sim.stime().get(), 5.0);
}

#[test]
fn handlers_chain_further_events() {
    let log = new_log();
    let l = log.clone();
    let sim = SimulationBuilder::new()
        .init(move |sim| {
            let l2 = l.clone();
            sim.schedule_free(2.0, "a", move |sim| {
                l2.borrow_mut().push(("a", sim.stime().get()));
                let l3 = l2.clone();
                sim.schedule_free(3.0, "b", move |sim| {
                    l3.borrow_mut().push(("b", sim.stime().get()));
                    Ok(())
                })?;
                Ok(())
            })?;
            Ok(())
        })
        .run_bare(Params::new())
        .unwrap();

    assert_eq!(*log.borrow(), vec![("a", 2.0), ("b", 5.0)]);
    assert_eq!(sim.num_events(), 2);
    assert_eq!(sim.stime().get(), 5.0);
}

#[test]
fn stop_predicate_vetoes_dispatch_after_advance() {
    let log = new_log();
    let l = log.clone();
    let sim = SimulationBuilder::new()
        .stime_limit(10.0)
        .init(move |sim| {
            sim.schedule_free(15.0, "a", record(&l, "a"))?;
            sim.schedule_free(20.0, "b", record(&l, "b"))?;
            Ok(())
        })
        .run_bare(Params::new())
        .unwrap();

    assert!(log.borrow().is_empty());
    assert_eq!(sim.num_events(), 0);
    // The clock advanced to the rejected event's fire-time.
    assert_eq!(sim.stime().get(), 15.0);
    // The rejected event was consumed by the pop; the rest stay queued.
    assert_eq!(sim.queue_size(), 1);
}

#[test]
fn event_exactly_at_limit_fires() {
    let log = new_log();
    let l = log.clone();
    let sim = SimulationBuilder::new()
        .stime_limit(10.0)
        .init(move |sim| {
            sim.schedule_free(10.0, "a", record(&l, "a"))?;
            Ok(())
        })
        .run_bare(Params::new())
        .unwrap();

    assert_eq!(*log.borrow(), vec![("a", 10.0)]);
    assert_eq!(sim.num_events(), 1);
    assert_eq!(sim.stime().get(), 10.0);
}

#[test]
fn zero_delay_fires_at_current_time_in_order() {
    let log = new_log();
    let l = log.clone();
    let sim = SimulationBuilder::new()
        .init(move |sim| {
            let l2 = l.clone();
            sim.schedule_free(2.0, "a", move |sim| {
                l2.borrow_mut().push(("a", sim.stime().get()));
                let l3 = l2.clone();
                sim.schedule_free(0.0, "c", move |sim| {
                    l3.borrow_mut().push(("c", sim.stime().get()));
                    Ok(())
                })?;
                Ok(())
            })?;
            sim.schedule_free(3.0, "b", record(&l, "b"))?;
            Ok(())
        })
        .run_bare(Params::new())
        .unwrap();

    // The zero-delay event fires at the current time, before anything later.
    assert_eq!(*log.borrow(), vec![("a", 2.0), ("c", 2.0), ("b", 3.0)]);
    assert_eq!(sim.num_events(), 3);
}

#[test]
fn negative_delay_is_rejected() {
    let sim = SimulationBuilder::new()
        .init(|sim| {
            assert!(matches!(
                sim.schedule_free(-1.0, "x", |_| Ok(())),
                Err(SimError::NegativeDelay(_))
            ));
            Ok(())
        })
        .run_bare(Params::new())
        .unwrap();

    assert_eq!(sim.num_events(), 0);
    assert_eq!(sim.stime().get(), 0.0);
}

#[test]
fn empty_run_invokes_init_and_fin() {
    let init_called = Rc::new(Cell::new(false));
    let fin_called = Rc::new(Cell::new(false));
    let i = init_called.clone();
    let f = fin_called.clone();

    let sim = SimulationBuilder::new()
        .init(move |_| {
            i.set(true);
            Ok(())
        })
        .fin(move |_| {
            f.set(true);
            Ok(())
        })
        .run_bare(Params::new())
        .unwrap();

    assert!(init_called.get());
    assert!(fin_called.get());
    assert_eq!(sim.num_events(), 0);
    assert_eq!(sim.stime().get(), 0.0);
}

#[test]
fn handler_errors_terminate_the_run() {
    let log = new_log();
    let l = log.clone();
    let fin_called = Rc::new(Cell::new(false));
    let f = fin_called.clone();

    let result = SimulationBuilder::new()
        .init(move |sim| {
            sim.schedule_free(1.0, "boom", |_| Err(SimError::Config("boom".to_string())))?;
            sim.schedule_free(2.0, "after", record(&l, "after"))?;
            Ok(())
        })
        .fin(move |_| {
            f.set(true);
            Ok(())
        })
        .run_bare(Params::new());

    assert!(matches!(result, Err(SimError::Config(_))));
    assert!(log.borrow().is_empty());
    assert!(!fin_called.get());
}

#[test]
fn custom_stop_predicate_halts_the_loop() {
    let log = new_log();
    let l = log.clone();
    let sim = SimulationBuilder::new()
        .stop_when("three dispatched", |kernel| kernel.num_events() >= 3)
        .init(move |sim| {
            for tag in ["a", "b", "c", "d", "e"] {
                sim.schedule_free(1.0, tag, record(&l, tag))?;
            }
            Ok(())
        })
        .run_bare(Params::new())
        .unwrap();

    assert_eq!(sim.num_events(), 3);
    assert_eq!(log.borrow().len(), 3);
    assert_eq!(sim.queue_size(), 1);
}

#[test]
fn named_handlers_schedule_by_name() {
    let log = new_log();
    let l = log.clone();
    let sim = SimulationBuilder::new()
        .handler("tick", move |sim| {
            l.borrow_mut().push(("tick", sim.stime().get()));
            Ok(())
        })
        .init(|sim| {
            sim.schedule_named(4.0, "tick")?;
            assert!(matches!(
                sim.schedule_named(1.0, "absent"),
                Err(SimError::UnknownName(_))
            ));
            Ok(())
        })
        .run_bare(Params::new())
        .unwrap();

    assert_eq!(*log.borrow(), vec![("tick", 4.0)]);
    assert_eq!(sim.num_events(), 1);
}

#[test]
fn dispatch_emits_trace_records() {
    let records: Rc<RefCell<Vec<LogRecord>>> = Rc::new(RefCell::new(Vec::new()));
    let shared = records.clone();

    SimulationBuilder::new()
        .loglevel(LogLevel::Trace)
        .log_sink(move || Box::new(MemorySink::shared(shared.clone())))
        .init(|sim| {
            sim.schedule_free(1.0, "ping", |_| Ok(()))?;
            Ok(())
        })
        .run_bare(Params::new())
        .unwrap();

    let records = records.borrow();
    assert!(records.iter().any(|r| {
        r.level == LogLevel::Trace
            && r.source == "kernel"
            && r.message.contains("ping")
            && r.stime.get() == 1.0
    }));
}

struct Probe {
    base: ModelBase,
    fired_at: Vec<f64>,
}

impl Probe {
    fn create(sim: &Simulator, _params: &Params) -> SimResult<Rc<RefCell<Self>>> {
        Ok(Probe {
            base: ModelBase::new(sim, "probe"),
            fired_at: Vec::new(),
        }
        .into_ref())
    }
}

impl Model for Probe {
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
        let delay = sim.params().get_f64("x")?;
        let me = self.base().me();
        let target = me.clone();
        sim.schedule_bound(delay, target, "on_fire", move |sim| {
            let t = sim.stime().get();
            me.borrow_mut()
                .as_any_mut()
                .downcast_mut::<Probe>()
                .unwrap()
                .fired_at
                .push(t);
            Ok(())
        })?;
        Ok(())
    }
}

#[test]
fn parameter_sweep_runs_are_isolated() {
    let results = SimulationBuilder::new()
        .sweep(
            Probe::create,
            vec![Params::new().with("x", 1.0), Params::new().with("x", 2.0)],
        )
        .unwrap();

    assert_eq!(results.len(), 2);
    for (sim, expected) in results.iter().zip([1.0, 2.0]) {
        assert_eq!(sim.num_events(), 1);
        assert_eq!(sim.stime().get(), expected);
        let data = sim.data().unwrap();
        let data = data.borrow();
        let probe = data.as_any().downcast_ref::<Probe>().unwrap();
        assert_eq!(probe.fired_at, vec![expected]);
    }
}

#[test]
fn bound_handler_trace_names_its_target() {
    let records: Rc<RefCell<Vec<LogRecord>>> = Rc::new(RefCell::new(Vec::new()));
    let shared = records.clone();

    SimulationBuilder::new()
        .loglevel(LogLevel::Trace)
        .log_sink(move || Box::new(MemorySink::shared(shared.clone())))
        .run_with(Probe::create, Params::new().with("x", 1.0))
        .unwrap();

    let records = records.borrow();
    assert!(records
        .iter()
        .any(|r| r.source == "probe" && r.message.contains("on_fire")));
}
