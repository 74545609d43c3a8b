//! Queueing-theory objectives for the M/M/1 demonstration model

use anyhow::Result;
use eventum_core::{Params, SimulationBuilder};
use eventum_testing::QueueingSystem;

fn close(actual: f64, expected: f64, rtol: f64, atol: f64) -> bool {
    (actual - expected).abs() <= atol + rtol * expected.abs()
}

fn mm1_params(arrival_mean: f64, service_mean: f64, seed: u64) -> Params {
    Params::new()
        .with("arrival_mean", arrival_mean)
        .with("service_mean", service_mean)
        .with("seed", seed)
}

fn check_objectives(arrival_mean: f64, service_mean: f64) -> Result<()> {
    let sim = SimulationBuilder::new()
        .stime_limit(4000.0)
        .run_with(
            QueueingSystem::create,
            mm1_params(arrival_mean, service_mean, 0xE5EED),
        )?;

    let data = sim.data().expect("root model");
    let data = data.borrow();
    let system = data
        .as_any()
        .downcast_ref::<QueueingSystem>()
        .expect("queueing system root");

    let server = system.server();
    let source = system.source();
    let sink = system.sink();

    let busy_rate = server.borrow().busy_trace.timeavg();
    let system_size = system.system_size_trace.timeavg();
    let est_arrival_mean = source.borrow().intervals.statistic().mean();
    let est_departure_mean = sink.borrow().departures.statistic().mean();
    let est_service_mean = server.borrow().delays.mean();

    let rho = service_mean / arrival_mean;

    assert!(
        close(est_service_mean, service_mean, 0.2, 0.0),
        "service mean estimate {est_service_mean} vs {service_mean}"
    );
    assert!(
        close(busy_rate, rho, 0.2, 0.0),
        "busy rate {busy_rate} vs rho {rho}"
    );
    assert!(
        close(system_size, rho / (1.0 - rho), 0.25, 0.1),
        "system size {system_size} vs {}",
        rho / (1.0 - rho)
    );
    assert!(
        close(est_arrival_mean, arrival_mean, 0.2, 0.0),
        "arrival mean estimate {est_arrival_mean} vs {arrival_mean}"
    );
    assert!(
        close(est_departure_mean, arrival_mean, 0.2, 0.0),
        "departure mean estimate {est_departure_mean} vs {arrival_mean}"
    );

    // The source keeps the queue populated, so the run ends on the time
    // limit with the clock on the first rejected event.
    assert!(sim.stime().get() > 4000.0);
    assert!(sim.num_events() > 1000);
    Ok(())
}

#[test]
fn mm1_objectives_light_load() -> Result<()> {
    check_objectives(2.0, 1.0)
}

#[test]
fn mm1_objectives_lighter_load() -> Result<()> {
    check_objectives(5.0, 2.0)
}

#[test]
fn same_seed_runs_are_identical() -> Result<()> {
    let run = || -> Result<(u64, f64)> {
        let sim = SimulationBuilder::new()
            .stime_limit(500.0)
            .run_with(QueueingSystem::create, mm1_params(2.0, 1.0, 7))?;
        Ok((sim.num_events(), sim.stime().get()))
    };

    let first = run()?;
    let second = run()?;
    assert_eq!(first.0, second.0);
    assert_eq!(first.1, second.1);
    Ok(())
}

#[test]
fn zero_capacity_queue_never_holds_packets() -> Result<()> {
    let sim = SimulationBuilder::new().stime_limit(500.0).run_with(
        QueueingSystem::create,
        mm1_params(2.0, 1.0, 7).with("capacity", 0),
    )?;

    let data = sim.data().expect("root model");
    let data = data.borrow();
    let system = data
        .as_any()
        .downcast_ref::<QueueingSystem>()
        .expect("queueing system root");

    // With no buffer, the system never holds more than the packet in service.
    assert!(system
        .system_size_trace
        .as_slice()
        .iter()
        .all(|p| p.value <= 1.0));
    let queue = system.queue();
    let queue = queue.borrow();
    assert_eq!(queue.size(), 0);
    Ok(())
}
