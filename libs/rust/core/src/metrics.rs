//! Optimizer metrics. Instruments register against the global meter provider,
//! so they are no-ops until the host installs one.

use once_cell::sync::Lazy;
use opentelemetry::metrics::{Counter, Histogram, Meter};
use std::time::Duration;

static METER: Lazy<Meter> = Lazy::new(|| opentelemetry::global::meter("swarm_optimizer"));

#[derive(Clone, Debug)]
pub struct OptimizerMetrics {
    pub evaluations_total: Counter<u64>,
    pub objective_failures_total: Counter<u64>,
    pub iterations_total: Counter<u64>,
    pub swarms_spawned_total: Counter<u64>,
    pub swarms_retired_total: Counter<u64>,
    pub exclusions_total: Counter<u64>,
    pub landscape_changes_total: Counter<u64>,
    pub barrier_latency_ms: Histogram<f64>,
}

pub static OPTIMIZER_METRICS: Lazy<OptimizerMetrics> = Lazy::new(|| OptimizerMetrics {
    evaluations_total: METER.u64_counter("swarm_optimizer_evaluations_total").with_description("Objective evaluations completed").build(),
    objective_failures_total: METER.u64_counter("swarm_optimizer_objective_failures_total").with_description("Objective evaluations that returned an error").build(),
    iterations_total: METER.u64_counter("swarm_optimizer_iterations_total").with_description("Solver iterations completed").build(),
    swarms_spawned_total: METER.u64_counter("swarm_optimizer_swarms_spawned_total").with_description("Swarms added by anti-convergence").build(),
    swarms_retired_total: METER.u64_counter("swarm_optimizer_swarms_retired_total").with_description("Swarms removed by anti-convergence").build(),
    exclusions_total: METER.u64_counter("swarm_optimizer_exclusions_total").with_description("Swarms reinitialized by exclusion").build(),
    landscape_changes_total: METER.u64_counter("swarm_optimizer_landscape_changes_total").with_description("Swarm attractors whose height moved on re-evaluation").build(),
    barrier_latency_ms: METER
        .f64_histogram("swarm_optimizer_barrier_latency_ms")
        .with_description("Wall time of one evaluation batch up to its join barrier (ms)")
        .with_unit("ms")
        .build(),
});

pub fn record_barrier(evaluations: usize, elapsed: Duration) {
    let m = &*OPTIMIZER_METRICS;
    m.evaluations_total.add(evaluations as u64, &[]);
    m.barrier_latency_ms.record(elapsed.as_secs_f64() * 1000.0, &[]);
}
