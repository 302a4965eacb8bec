//! Quantum-behaved PSO (type II) over one charged swarm.

use crate::attractor::Attractor;
use crate::error::Result;
use crate::objective::Objective;
use crate::scheduler::Scheduler;
use crate::solver::{run_single_swarm, Solver, SolverConfig};
use crate::swarm::Composition;

#[derive(Debug)]
pub struct QpsoSolver {
    config: SolverConfig,
    scheduler: Scheduler,
    best: Option<Attractor>,
}

impl QpsoSolver {
    pub fn new(config: SolverConfig) -> Result<Self> {
        let scheduler = config.scheduler()?;
        Ok(Self { config, scheduler, best: None })
    }
}

impl Solver for QpsoSolver {
    fn solve(&mut self, objective: Objective<'_>) -> Result<Attractor> {
        run_single_swarm(&mut self.config, &self.scheduler, Composition::Charged, objective, &mut self.best)
    }

    fn best(&self) -> Option<&Attractor> { self.best.as_ref() }
}
