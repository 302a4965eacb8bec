//! Constricted particle swarm optimization over one neutral swarm.

use crate::attractor::Attractor;
use crate::error::Result;
use crate::objective::Objective;
use crate::scheduler::Scheduler;
use crate::solver::{run_single_swarm, Solver, SolverConfig};
use crate::swarm::Composition;

#[derive(Debug)]
pub struct PsoSolver {
    config: SolverConfig,
    scheduler: Scheduler,
    best: Option<Attractor>,
}

impl PsoSolver {
    pub fn new(config: SolverConfig) -> Result<Self> {
        let scheduler = config.scheduler()?;
        Ok(Self { config, scheduler, best: None })
    }
}

impl Solver for PsoSolver {
    fn solve(&mut self, objective: Objective<'_>) -> Result<Attractor> {
        run_single_swarm(&mut self.config, &self.scheduler, Composition::Neutral, objective, &mut self.best)
    }

    fn best(&self) -> Option<&Attractor> { self.best.as_ref() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::Constraints;
    use crate::error::SwarmError;
    use crate::scheduler::EvaluationMode;

    fn parabola(p: &[f64]) -> anyhow::Result<f64> { Ok(-p.iter().map(|x| x * x).sum::<f64>()) }

    #[test]
    fn finds_parabola_peak() {
        let config = SolverConfig::new(30)
            .constraints(Constraints::uniform(2, -100.0, 100.0).unwrap())
            .seed(42)
            .exit_when(|it, best| best.height.abs() < 1e-3 || it >= 2_000);
        let mut solver = PsoSolver::new(config).unwrap();
        let best = solver.solve(Objective::shared(parabola)).unwrap();
        assert!(best.height.abs() < 1e-3);
        assert_eq!(solver.best(), Some(&best));
    }

    #[test]
    fn exit_sees_every_iteration() {
        let mut seen = Vec::new();
        let (tx, rx) = std::sync::mpsc::channel();
        let config = SolverConfig::new(5)
            .constraints(Constraints::uniform(1, -1.0, 1.0).unwrap())
            .seed(3)
            .exit_when(move |it, _| { tx.send(it).ok(); it == 4 });
        PsoSolver::new(config).unwrap().solve(Objective::shared(parabola)).unwrap();
        seen.extend(rx.try_iter());
        assert_eq!(seen, vec![1, 2, 3, 4]);
    }

    #[test]
    fn needs_a_sampling_source() {
        assert!(matches!(PsoSolver::new(SolverConfig::new(5)), Err(SwarmError::Config(_))));
        let zero = SolverConfig::new(0).constraints(Constraints::uniform(1, 0.0, 1.0).unwrap());
        assert!(matches!(PsoSolver::new(zero), Err(SwarmError::Config(_))));
    }

    #[test]
    fn empty_pool_is_rejected_at_construction() {
        let config = || SolverConfig::new(5).constraints(Constraints::uniform(1, -1.0, 1.0).unwrap());
        let empty = config().mode(EvaluationMode::Concurrent { threads: Some(0) });
        assert!(matches!(PsoSolver::new(empty), Err(SwarmError::Config(_))));
        let solver = PsoSolver::new(config().mode(EvaluationMode::Concurrent { threads: Some(2) })).unwrap();
        assert_eq!(solver.scheduler.mode(), EvaluationMode::Concurrent { threads: Some(2) });
    }
}
