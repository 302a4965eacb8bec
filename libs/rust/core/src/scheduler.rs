//! Evaluation barrier.
//!
//! Every batch of objective calls either runs one at a time on the control
//! thread or fans out over a dedicated rayon pool. In both cases the call
//! returns only after every dispatched evaluation has finished, and each
//! evaluation writes nothing but its own particle.

use std::time::Instant;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use swarm_resilience::CancellationToken;
use tracing::{debug, warn};

use crate::error::{Result, SwarmError};
use crate::metrics::{record_barrier, OPTIMIZER_METRICS};
use crate::objective::Objective;
use crate::particle::Particle;
use crate::swarm::Swarm;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvaluationMode {
    #[default]
    Sequential,
    /// Worker pool of `threads` (default: four per available core).
    Concurrent { threads: Option<usize> },
}

pub fn default_pool_size() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1) * 4
}

#[derive(Debug)]
pub struct Scheduler {
    mode: EvaluationMode,
    pool: Option<ThreadPool>,
    cancel: CancellationToken,
}

impl Scheduler {
    pub fn new(mode: EvaluationMode, cancel: CancellationToken) -> Result<Self> {
        let pool = match mode {
            EvaluationMode::Sequential => None,
            EvaluationMode::Concurrent { threads } => {
                let threads = threads.unwrap_or_else(default_pool_size);
                if threads == 0 { return Err(SwarmError::config("evaluation pool needs at least one thread")); }
                debug!(threads, "evaluation_pool_started");
                Some(ThreadPoolBuilder::new().num_threads(threads).thread_name(|i| format!("swarm-eval-{i}")).build()?)
            }
        };
        Ok(Self { mode, pool, cancel })
    }

    pub fn sequential() -> Self { Self { mode: EvaluationMode::Sequential, pool: None, cancel: CancellationToken::new() } }

    pub fn mode(&self) -> EvaluationMode { self.mode }
    pub fn cancellation(&self) -> &CancellationToken { &self.cancel }

    /// Evaluate every particle of every given swarm behind one barrier.
    pub fn evaluate_swarms<'s, I>(&self, swarms: I, objective: &mut Objective<'_>) -> Result<usize>
    where
        I: IntoIterator<Item = &'s mut Swarm>,
    {
        let mut batch: Vec<&mut Particle> = swarms.into_iter().flat_map(|s| s.particles_mut().iter_mut()).collect();
        self.evaluate_particles(&mut batch, objective)?;
        Ok(batch.len())
    }

    /// Evaluate each particle once at its current position.
    pub fn evaluate_particles(&self, particles: &mut [&mut Particle], objective: &mut Objective<'_>) -> Result<()> {
        self.cancel.check()?;
        let started = Instant::now();
        let cancel = &self.cancel;
        let outcome = match (&self.pool, objective) {
            (Some(pool), Objective::Shared(f)) => {
                let f = &**f;
                pool.install(|| {
                    particles.par_iter_mut().try_for_each(|p| {
                        cancel.check()?;
                        p.evaluate(f).map(|_| ())
                    })
                })
            }
            (pool, obj) => {
                if pool.is_some() { debug!("exclusive_objective_evaluated_sequentially"); }
                particles.iter_mut().try_for_each(|p| {
                    cancel.check()?;
                    p.evaluate(|x| obj.call(x)).map(|_| ())
                })
            }
        };
        self.finish(particles.len(), started, outcome)
    }

    /// Heights at arbitrary positions; nothing is written back.
    pub fn evaluate_positions(&self, positions: &[&[f64]], objective: &mut Objective<'_>) -> Result<Vec<f64>> {
        self.cancel.check()?;
        let started = Instant::now();
        let cancel = &self.cancel;
        let outcome = match (&self.pool, objective) {
            (Some(pool), Objective::Shared(f)) => {
                let f = &**f;
                pool.install(|| {
                    positions.par_iter().map(|x| {
                        cancel.check()?;
                        f(*x).map_err(SwarmError::Objective)
                    }).collect::<Result<Vec<f64>>>()
                })
            }
            (_, obj) => positions.iter().map(|x| {
                cancel.check()?;
                obj.call(*x).map_err(SwarmError::Objective)
            }).collect(),
        };
        self.finish(positions.len(), started, outcome)
    }

    fn finish<T>(&self, evaluations: usize, started: Instant, outcome: Result<T>) -> Result<T> {
        match &outcome {
            Ok(_) => record_barrier(evaluations, started.elapsed()),
            Err(SwarmError::Objective(e)) => {
                OPTIMIZER_METRICS.objective_failures_total.add(1, &[]);
                warn!(error=%e, "objective_failed");
            }
            Err(e) => debug!(error=%e, "evaluation_interrupted"),
        }
        outcome
    }
}
