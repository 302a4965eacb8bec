//! Solver contract and the configuration shared by every solver.

use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use swarm_resilience::CancellationToken;
use tracing::{debug, info};

use crate::attractor::Attractor;
use crate::coefficient::SwarmParams;
use crate::constraints::{Constraints, Initializer};
use crate::error::{Result, SwarmError};
use crate::metrics::OPTIMIZER_METRICS;
use crate::objective::Objective;
use crate::scheduler::{EvaluationMode, Scheduler};
use crate::swarm::{Composition, Swarm};

/// Stop predicate over `(iteration, overall best)`.
pub type ExitCondition = Box<dyn FnMut(u64, &Attractor) -> bool + Send>;
pub type IterationObserver = Box<dyn FnMut(&IterationReport) + Send>;

pub trait Solver: Send {
    /// Run until the exit condition holds and return the overall best.
    fn solve(&mut self, objective: Objective<'_>) -> Result<Attractor>;

    /// Best attractor of the latest run, also after a cancelled or failed one.
    fn best(&self) -> Option<&Attractor>;
}

/// Emitted through tracing once per iteration.
#[derive(Debug, Clone, Copy)]
pub struct IterationReport {
    pub iteration: u64,
    pub best_height: f64,
    pub swarms: usize,
    pub evaluations: usize,
}

impl IterationReport {
    pub fn emit(&self) {
        OPTIMIZER_METRICS.iterations_total.add(1, &[]);
        debug!(iteration = self.iteration, best = self.best_height, swarms = self.swarms, evaluations = self.evaluations, "iteration_completed");
    }
}

pub struct SolverConfig {
    swarm_size: usize,
    constraints: Option<Constraints>,
    initializer: Option<Arc<dyn Initializer>>,
    params: SwarmParams,
    mode: EvaluationMode,
    seed: Option<u64>,
    exit: Option<ExitCondition>,
    observer: Option<IterationObserver>,
    cancel: CancellationToken,
}

impl SolverConfig {
    pub fn new(swarm_size: usize) -> Self {
        Self {
            swarm_size,
            constraints: None,
            initializer: None,
            params: SwarmParams::default(),
            mode: EvaluationMode::Sequential,
            seed: None,
            exit: None,
            observer: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn constraints(mut self, constraints: Constraints) -> Self { self.constraints = Some(constraints); self }
    /// Sample initial states from `init` instead of the constraint box.
    pub fn initializer(mut self, init: impl Initializer + 'static) -> Self { self.initializer = Some(Arc::new(init)); self }
    pub fn params(mut self, params: SwarmParams) -> Self { self.params = params; self }
    pub fn mode(mut self, mode: EvaluationMode) -> Self { self.mode = mode; self }
    pub fn seed(mut self, seed: u64) -> Self { self.seed = Some(seed); self }
    pub fn cancellation(mut self, token: CancellationToken) -> Self { self.cancel = token; self }

    pub fn exit_when<F>(mut self, f: F) -> Self
    where
        F: FnMut(u64, &Attractor) -> bool + Send + 'static,
    {
        self.exit = Some(Box::new(f));
        self
    }

    pub fn observe<F>(mut self, f: F) -> Self
    where
        F: FnMut(&IterationReport) + Send + 'static,
    {
        self.observer = Some(Box::new(f));
        self
    }

    pub fn swarm_size(&self) -> usize { self.swarm_size }
    pub fn constraints_ref(&self) -> Option<&Constraints> { self.constraints.as_ref() }
    pub fn swarm_params(&self) -> &SwarmParams { &self.params }
    pub fn cancellation_token(&self) -> &CancellationToken { &self.cancel }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.swarm_size == 0 { return Err(SwarmError::config("swarm size must be positive")); }
        if let EvaluationMode::Concurrent { threads: Some(0) } = self.mode {
            return Err(SwarmError::config("evaluation pool needs at least one thread"));
        }
        if let (Some(c), Some(init)) = (&self.constraints, &self.initializer) { c.check_dimension(init.dimension())?; }
        self.initial_states()?;
        Ok(())
    }

    /// Custom initializer first, constraint box otherwise.
    pub(crate) fn initial_states(&self) -> Result<Arc<dyn Initializer>> {
        match (&self.initializer, &self.constraints) {
            (Some(init), _) => Ok(Arc::clone(init)),
            (None, Some(c)) => Ok(Arc::new(c.clone())),
            (None, None) => Err(SwarmError::config("either constraints or an initializer is required")),
        }
    }

    pub(crate) fn rng(&self) -> StdRng {
        match self.seed { Some(s) => StdRng::seed_from_u64(s), None => StdRng::from_entropy() }
    }

    /// Validates, then builds the evaluation pool a solver keeps for its lifetime.
    pub(crate) fn scheduler(&self) -> Result<Scheduler> {
        self.validate()?;
        Scheduler::new(self.mode, self.cancel.clone())
    }

    pub(crate) fn spawn_swarm(&self, composition: Composition, init: &dyn Initializer, rng: &mut StdRng) -> Result<Swarm> {
        Swarm::new(self.swarm_size, composition, self.params.clone(), init, self.constraints.clone(), rng)
    }

    pub(crate) fn report(&mut self, report: IterationReport) {
        report.emit();
        if let Some(f) = self.observer.as_mut() { f(&report); }
    }

    pub(crate) fn should_exit(&mut self, iteration: u64, best: &Attractor) -> bool {
        self.exit.as_mut().map_or(false, |f| f(iteration, best))
    }
}

impl fmt::Debug for SolverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverConfig")
            .field("swarm_size", &self.swarm_size)
            .field("constraints", &self.constraints)
            .field("custom_initializer", &self.initializer.is_some())
            .field("params", &self.params)
            .field("mode", &self.mode)
            .field("seed", &self.seed)
            .field("exit_condition", &self.exit.is_some())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

/// Evaluate, refresh the attractor, check the exit predicate, move; repeat.
pub(crate) fn run_single_swarm(
    config: &mut SolverConfig,
    scheduler: &Scheduler,
    composition: Composition,
    mut objective: Objective<'_>,
    best: &mut Option<Attractor>,
) -> Result<Attractor> {
    *best = None;
    let init = config.initial_states()?;
    let mut rng = config.rng();
    let mut swarm = config.spawn_swarm(composition, init.as_ref(), &mut rng)?;
    info!(size = swarm.len(), neutral = swarm.num_neutral(), charged = swarm.num_charged(), dimension = swarm.dimension(), "swarm_run_started");
    let mut iteration = 0u64;
    loop {
        let evaluations = scheduler.evaluate_swarms([&mut swarm], &mut objective)?;
        let swarm_best = swarm.update_attractor()?.clone();
        Attractor::promote(best, &swarm_best);
        let overall = best.clone().unwrap_or(swarm_best);
        iteration += 1;
        config.report(IterationReport { iteration, best_height: overall.height, swarms: 1, evaluations });
        if config.should_exit(iteration, &overall) {
            info!(iteration, height = overall.height, "swarm_run_finished");
            return Ok(overall);
        }
        swarm.mutate(&mut rng)?;
    }
}
