//! A simple benchmark for baseline simulation perf.
#![allow(clippy::missing_docs_in_private_items, clippy::expect_used)]
#[macro_use]
extern crate criterion;

use criterion::criterion_group;
use criterion::Criterion;
use mmc_sim::scenario::Scenario;
use mmc_sim::{Simulation, SimulationParameters};

fn mmc_run_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("mmc run");

    group.bench_function("stable c=8, t=3000", |b| {
        b.iter(|| {
            let mut simulation = Simulation::new(SimulationParameters {
                arrival_rate: 4.0,
                service_rate: 1.0,
                server_count: 8,
                ..Default::default()
            })
            .expect("valid parameters");
            simulation.run().expect("run to complete")
        });
    });

    group.bench_function("saturated c=2, t=3000", |b| {
        b.iter(|| {
            let mut simulation = Simulation::new(SimulationParameters::default())
                .expect("valid parameters");
            simulation.run().expect("run to complete")
        });
    });

    group.finish();
}

fn baseline_scenarios_bench(c: &mut Criterion) {
    let scenarios = Scenario::baseline_set();

    c.bench_function("baseline scenario set, t=3000", |b| {
        b.iter(|| {
            mmc_sim::experiment::run_scenarios(&scenarios, 3000.0, 42).expect("scenarios to run")
        });
    });
}

criterion_group!(benches, mmc_run_bench, baseline_scenarios_bench);
criterion_main!(benches);
