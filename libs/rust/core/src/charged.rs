//! Single charged swarm: neutral and quantum particles around one attractor.

use crate::attractor::Attractor;
use crate::error::Result;
use crate::objective::Objective;
use crate::scheduler::Scheduler;
use crate::solver::{run_single_swarm, Solver, SolverConfig};
use crate::swarm::{Composition, DEFAULT_CHARGED_TO_NEUTRAL_RATIO};

#[derive(Debug)]
pub struct ChargedSwarmSolver {
    config: SolverConfig,
    scheduler: Scheduler,
    composition: Composition,
    best: Option<Attractor>,
}

impl ChargedSwarmSolver {
    pub fn new(config: SolverConfig) -> Result<Self> { Self::with_ratio(config, DEFAULT_CHARGED_TO_NEUTRAL_RATIO) }

    pub fn with_ratio(config: SolverConfig, charged_to_neutral_ratio: f64) -> Result<Self> {
        let scheduler = config.scheduler()?;
        let composition = Composition::Mixed { charged_to_neutral_ratio };
        composition.split(config.swarm_size())?;
        Ok(Self { config, scheduler, composition, best: None })
    }
}

impl Solver for ChargedSwarmSolver {
    fn solve(&mut self, objective: Objective<'_>) -> Result<Attractor> {
        run_single_swarm(&mut self.config, &self.scheduler, self.composition, objective, &mut self.best)
    }

    fn best(&self) -> Option<&Attractor> { self.best.as_ref() }
}
