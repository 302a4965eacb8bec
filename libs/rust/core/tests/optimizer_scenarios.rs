use std::sync::{Arc, Mutex};
use std::time::Duration;

use swarm_core::{
    CancellationToken, ChargedSwarmSolver, Constraints, EvaluationMode, FnInitializer, MultiSwarmParams, MultiSwarmSolver,
    Objective, QpsoSolver, ResilienceError, Solver, SolverConfig, SwarmError,
};

const ITERATION_CAP: u64 = 5_000;

fn parabola(p: &[f64]) -> anyhow::Result<f64> { Ok(-(p[0] * p[0] + p[1] * p[1])) }

fn square() -> Constraints { Constraints::uniform(2, -100.0, 100.0).unwrap() }

fn converged(it: u64, height: f64) -> bool { height.abs() < 0.001 || it >= ITERATION_CAP }

#[test]
fn charged_swarm_finds_parabola_peak() {
    let config = SolverConfig::new(20).constraints(square()).seed(17).exit_when(|it, best| converged(it, best.height));
    let mut solver = ChargedSwarmSolver::new(config).unwrap();
    let best = solver.solve(Objective::shared(parabola)).unwrap();
    assert!(best.height.abs() < 0.001, "stopped at height {}", best.height);
    let distance = best.position.iter().map(|x| x * x).sum::<f64>().sqrt();
    assert!(distance < 0.0316, "best {:?} too far from the origin", best.position);
}

#[test]
fn multiswarm_finds_peak_with_bounded_population() {
    let counts = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&counts);
    let config = SolverConfig::new(10)
        .constraints(square())
        .mode(EvaluationMode::Concurrent { threads: None })
        .seed(4)
        .observe(move |r| sink.lock().unwrap().push(r.swarms))
        .exit_when(|it, best| converged(it, best.height));
    let mut solver = MultiSwarmSolver::new(config, MultiSwarmParams { num_swarms: 4, ..Default::default() }).unwrap();
    let max = solver.max_swarms();
    let best = solver.solve(Objective::shared(parabola)).unwrap();
    assert!(best.height.abs() < 0.001);
    let counts = counts.lock().unwrap();
    assert!(!counts.is_empty());
    assert!(counts.iter().all(|&n| n >= 1 && n <= max), "population left [1, {max}]: {counts:?}");
}

#[test]
fn overall_best_never_regresses() {
    let heights = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&heights);
    let config = SolverConfig::new(10)
        .constraints(square())
        .seed(99)
        .observe(move |r| sink.lock().unwrap().push(r.best_height))
        .exit_when(|it, _| it >= 80);
    MultiSwarmSolver::new(config, MultiSwarmParams::default()).unwrap().solve(Objective::shared(parabola)).unwrap();
    let heights = heights.lock().unwrap();
    assert_eq!(heights.len(), 80);
    assert!(heights.windows(2).all(|w| w[1] >= w[0]));
}

#[test]
fn sequential_mode_never_reenters_objective() {
    let guard = parking_lot::Mutex::new(());
    let objective = Objective::shared(|p: &[f64]| {
        let _held = guard.try_lock().ok_or_else(|| anyhow::anyhow!("objective re-entered"))?;
        std::thread::yield_now();
        parabola(p)
    });
    let config = SolverConfig::new(10).constraints(square()).mode(EvaluationMode::Sequential).seed(5).exit_when(|it, _| it >= 30);
    let result = MultiSwarmSolver::new(config, MultiSwarmParams::default()).unwrap().solve(objective);
    assert!(result.is_ok(), "{result:?}");
}

#[test]
fn cancellation_stops_an_unbounded_run() {
    let token = CancellationToken::new();
    let trigger = token.clone();
    let config = SolverConfig::new(10)
        .constraints(square())
        .seed(8)
        .cancellation(token)
        .observe(move |r| if r.iteration == 3 { trigger.cancel() });
    let mut solver = QpsoSolver::new(config).unwrap();
    let err = solver.solve(Objective::shared(parabola)).unwrap_err();
    assert!(matches!(err, SwarmError::Cancelled(ResilienceError::Cancelled)));
    assert!(solver.best().is_some());
}

#[test]
fn deadline_stops_a_run_without_exit_condition() {
    let config = SolverConfig::new(10)
        .constraints(square())
        .mode(EvaluationMode::Concurrent { threads: Some(2) })
        .cancellation(CancellationToken::with_timeout(Duration::from_millis(50)));
    let mut solver = MultiSwarmSolver::new(config, MultiSwarmParams::default()).unwrap();
    let err = solver.solve(Objective::shared(parabola)).unwrap_err();
    assert!(matches!(err, SwarmError::Cancelled(ResilienceError::DeadlineExceeded)));
}

#[test]
fn dimension_mismatches_are_configuration_errors() {
    let three_d = FnInitializer::new(3, |_| vec![0.0; 3], |_| vec![0.0; 3]);
    let config = SolverConfig::new(10).constraints(square()).initializer(three_d);
    assert!(matches!(ChargedSwarmSolver::new(config), Err(SwarmError::DimensionMismatch { expected: 2, actual: 3 })));

    // a sampler that disagrees with its declared dimension fails at the first swarm
    let liar = FnInitializer::new(2, |_| vec![1.0; 4], |_| vec![0.0; 2]);
    let config = SolverConfig::new(10).initializer(liar).exit_when(|_, _| true);
    let err = QpsoSolver::new(config).unwrap().solve(Objective::shared(|p: &[f64]| Ok(-p[0].abs()))).unwrap_err();
    assert!(matches!(err, SwarmError::DimensionMismatch { expected: 2, actual: 4 }));
}
