//! Multiswarm controller (Blackwell-Branke) for moving optima.
//!
//! A population of charged swarms is kept apart by exclusion and kept diverse
//! by anti-convergence. Each iteration:
//!
//! 1. evaluate every particle and refresh every swarm attractor;
//! 2. anti-convergence: spawn a swarm when all have collapsed, retire the worst
//!    spread-out one when too many are still searching;
//! 3. re-evaluate each swarm attractor to notice a changed landscape, move
//!    every swarm, evaluate again and refresh attractors;
//! 4. exclusion: of two swarms whose attractors sit closer than `r_excl`, the
//!    lower one is reinitialized in place. Under `ExclusionRadius::Adaptive`
//!    the radius is sized for the population left by step 2.
//!
//! All population management runs on the control thread between barriers.

use std::sync::Arc;

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::arena::{SwarmArena, SwarmId};
use crate::attractor::Attractor;
use crate::constraints::{Constraints, Initializer};
use crate::error::{Result, SwarmError};
use crate::metrics::OPTIMIZER_METRICS;
use crate::objective::Objective;
use crate::scheduler::Scheduler;
use crate::solver::{IterationReport, Solver, SolverConfig};
use crate::swarm::{Composition, Swarm, DEFAULT_CHARGED_TO_NEUTRAL_RATIO};
use crate::vector;

pub const DEFAULT_NUM_SWARMS: usize = 4;
pub const DEFAULT_EXCESS_THRESHOLD: usize = 3;

/// How `r_excl` follows the population size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionRadius {
    /// Computed once from the configured swarm count.
    #[default]
    Fixed,
    /// Recomputed every iteration from the live swarm count.
    Adaptive,
}

/// What to do when a swarm attractor re-evaluates to a different height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeResponse {
    #[default]
    LogOnly,
    Reinitialize,
}

pub fn exclusion_radius(max_extent: f64, num_swarms: usize, dimension: usize) -> f64 {
    max_extent / (2.0 * num_swarms as f64).powf(1.0 / dimension as f64)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiSwarmParams {
    pub num_swarms: usize,
    /// Defaults to twice `num_swarms`.
    pub max_swarms: Option<usize>,
    pub excess_threshold: usize,
    pub charged_to_neutral_ratio: f64,
    pub exclusion_radius: ExclusionRadius,
    pub change_response: ChangeResponse,
}

impl Default for MultiSwarmParams {
    fn default() -> Self {
        Self {
            num_swarms: DEFAULT_NUM_SWARMS,
            max_swarms: None,
            excess_threshold: DEFAULT_EXCESS_THRESHOLD,
            charged_to_neutral_ratio: DEFAULT_CHARGED_TO_NEUTRAL_RATIO,
            exclusion_radius: ExclusionRadius::Fixed,
            change_response: ChangeResponse::LogOnly,
        }
    }
}

#[derive(Debug)]
pub struct MultiSwarmSolver {
    config: SolverConfig,
    constraints: Constraints,
    composition: Composition,
    num_swarms: usize,
    max_swarms: usize,
    excess_threshold: usize,
    exclusion: ExclusionRadius,
    change_response: ChangeResponse,
    scheduler: Scheduler,
    best: Option<Attractor>,
}

impl MultiSwarmSolver {
    pub fn new(config: SolverConfig, params: MultiSwarmParams) -> Result<Self> {
        config.validate()?;
        let constraints = config.constraints_ref().cloned()
            .ok_or_else(|| SwarmError::config("multiswarm solver needs constraints to size the exclusion radius"))?;
        if params.num_swarms == 0 { return Err(SwarmError::config("num_swarms must be positive")); }
        let max_swarms = params.max_swarms.unwrap_or(2 * params.num_swarms);
        if max_swarms < params.num_swarms {
            return Err(SwarmError::config(format!("max_swarms {max_swarms} is below num_swarms {}", params.num_swarms)));
        }
        let composition = Composition::Mixed { charged_to_neutral_ratio: params.charged_to_neutral_ratio };
        composition.split(config.swarm_size())?;
        let scheduler = config.scheduler()?;
        Ok(Self {
            config,
            constraints,
            composition,
            num_swarms: params.num_swarms,
            max_swarms,
            excess_threshold: params.excess_threshold,
            exclusion: params.exclusion_radius,
            change_response: params.change_response,
            scheduler,
            best: None,
        })
    }

    pub fn max_swarms(&self) -> usize { self.max_swarms }

    /// `r_excl` for a population of `live` swarms under the configured policy.
    pub fn exclusion_radius(&self, live: usize) -> f64 {
        let n = match self.exclusion { ExclusionRadius::Fixed => self.num_swarms, ExclusionRadius::Adaptive => live.max(1) };
        exclusion_radius(self.constraints.max_extent(), n, self.constraints.dimension())
    }
}

impl Solver for MultiSwarmSolver {
    fn solve(&mut self, mut objective: Objective<'_>) -> Result<Attractor> {
        self.best = None;
        let mut run = Population {
            scheduler: &self.scheduler,
            init: self.config.initial_states()?,
            rng: self.config.rng(),
            arena: SwarmArena::new(),
            evaluations: 0,
        };
        for _ in 0..self.num_swarms {
            let swarm = self.config.spawn_swarm(self.composition, run.init.as_ref(), &mut run.rng)?;
            run.arena.insert(swarm);
        }
        info!(swarms = self.num_swarms, max_swarms = self.max_swarms, r_excl = self.exclusion_radius(self.num_swarms), "multiswarm_run_started");

        let mut iteration = 0u64;
        loop {
            run.evaluations = 0;
            run.evaluate_all(&mut objective)?;
            run.refresh_attractors()?;
            run.fold_best(&mut self.best);

            let r_excl = self.balance(&mut run, &mut objective)?;
            self.track_landscape(&mut run, &mut objective)?;

            for swarm in run.arena.swarms_mut() { swarm.mutate(&mut run.rng)?; }
            run.evaluate_all(&mut objective)?;
            run.refresh_attractors()?;

            self.exclusion_phase(&mut run, &mut objective, r_excl)?;
            run.fold_best(&mut self.best);

            let overall = self.best.clone().ok_or(SwarmError::Precondition("no swarm produced an attractor"))?;
            iteration += 1;
            self.config.report(IterationReport { iteration, best_height: overall.height, swarms: run.arena.len(), evaluations: run.evaluations });
            if self.config.should_exit(iteration, &overall) {
                info!(iteration, height = overall.height, swarms = run.arena.len(), "multiswarm_run_finished");
                return Ok(overall);
            }
        }
    }

    fn best(&self) -> Option<&Attractor> { self.best.as_ref() }
}

impl MultiSwarmSolver {
    /// Anti-convergence, then the radius this iteration's exclusion uses.
    fn balance(&self, run: &mut Population<'_>, objective: &mut Objective<'_>) -> Result<f64> {
        self.anti_convergence(run, objective, self.exclusion_radius(run.arena.len()))?;
        Ok(self.exclusion_radius(run.arena.len()))
    }

    fn anti_convergence(&self, run: &mut Population<'_>, objective: &mut Objective<'_>, r_excl: f64) -> Result<()> {
        let mut not_converged = 0usize;
        let mut worst: Option<(SwarmId, f64)> = None;
        for (id, swarm) in run.arena.iter() {
            if swarm.diameter() <= 2.0 * r_excl { continue; }
            not_converged += 1;
            let height = swarm.bestfit().unwrap_or(f64::NEG_INFINITY);
            if worst.map_or(true, |(_, h)| height < h) { worst = Some((id, height)); }
        }
        debug!(not_converged, swarms = run.arena.len(), "anti_convergence_scan");

        if not_converged == 0 && run.arena.len() < self.max_swarms {
            let mut swarm = self.config.spawn_swarm(self.composition, run.init.as_ref(), &mut run.rng)?;
            run.evaluations += run.scheduler.evaluate_swarms([&mut swarm], objective)?;
            swarm.update_attractor()?;
            let id = run.arena.insert(swarm);
            OPTIMIZER_METRICS.swarms_spawned_total.add(1, &[]);
            info!(swarm = ?id, swarms = run.arena.len(), "swarm_spawned");
        } else if not_converged > self.excess_threshold && run.arena.len() > 1 {
            if let Some((id, height)) = worst {
                run.arena.remove(id);
                OPTIMIZER_METRICS.swarms_retired_total.add(1, &[]);
                info!(swarm = ?id, height, swarms = run.arena.len(), "swarm_retired");
            }
        }
        Ok(())
    }

    fn track_landscape(&self, run: &mut Population<'_>, objective: &mut Objective<'_>) -> Result<()> {
        let mut ids = Vec::with_capacity(run.arena.len());
        let mut stored = Vec::with_capacity(run.arena.len());
        for (id, swarm) in run.arena.iter() {
            let att = swarm.attractor().ok_or(SwarmError::Precondition("swarm without attractor after evaluation"))?;
            ids.push(id);
            stored.push(att.clone());
        }
        let positions: Vec<&[f64]> = stored.iter().map(|a| a.position.as_slice()).collect();
        let heights = run.scheduler.evaluate_positions(&positions, objective)?;
        run.evaluations += heights.len();
        for ((id, att), height) in ids.into_iter().zip(&stored).zip(heights) {
            if height == att.height { continue; }
            OPTIMIZER_METRICS.landscape_changes_total.add(1, &[]);
            info!(swarm = ?id, previous = att.height, current = height, "landscape_changed");
            if self.change_response == ChangeResponse::Reinitialize {
                run.reseed(id, objective)?;
            }
        }
        Ok(())
    }

    fn exclusion_phase(&self, run: &mut Population<'_>, objective: &mut Objective<'_>, r_excl: f64) -> Result<()> {
        let mut attractors = Vec::with_capacity(run.arena.len());
        for (id, swarm) in run.arena.iter() {
            let att = swarm.attractor().ok_or(SwarmError::Precondition("swarm without attractor after evaluation"))?;
            attractors.push((id, att.clone()));
        }
        let mut marked: Vec<SwarmId> = Vec::new();
        for i in 0..attractors.len() {
            for j in (i + 1)..attractors.len() {
                let ((a_id, a), (b_id, b)) = (&attractors[i], &attractors[j]);
                if marked.contains(a_id) || marked.contains(b_id) { continue; }
                let distance = vector::distance(&a.position, &b.position);
                if distance >= r_excl { continue; }
                let loser = if b.height > a.height { *a_id } else { *b_id };
                debug!(first = ?a_id, second = ?b_id, distance, reinitialized = ?loser, "swarm_collision");
                marked.push(loser);
            }
        }
        for id in marked {
            run.reseed(id, objective)?;
            OPTIMIZER_METRICS.exclusions_total.add(1, &[]);
            info!(swarm = ?id, r_excl, "swarm_excluded");
        }
        Ok(())
    }
}

struct Population<'s> {
    scheduler: &'s Scheduler,
    init: Arc<dyn Initializer>,
    rng: StdRng,
    arena: SwarmArena,
    evaluations: usize,
}

impl Population<'_> {
    fn evaluate_all(&mut self, objective: &mut Objective<'_>) -> Result<()> {
        self.evaluations += self.scheduler.evaluate_swarms(self.arena.swarms_mut(), objective)?;
        Ok(())
    }

    fn refresh_attractors(&mut self) -> Result<()> {
        for swarm in self.arena.swarms_mut() { swarm.update_attractor()?; }
        Ok(())
    }

    fn fold_best(&self, best: &mut Option<Attractor>) {
        let current = Attractor::best_of(self.arena.iter().filter_map(|(_, s)| s.attractor()));
        if let Some(a) = current { Attractor::promote(best, a); }
    }

    /// Fresh particles in the same slot, evaluated once.
    fn reseed(&mut self, id: SwarmId, objective: &mut Objective<'_>) -> Result<()> {
        let swarm: &mut Swarm = self.arena.get_mut(id).ok_or(SwarmError::Precondition("reinitialize of a retired swarm"))?;
        swarm.reinitialize(self.init.as_ref(), &mut self.rng)?;
        self.evaluations += self.scheduler.evaluate_swarms([&mut *swarm], objective)?;
        swarm.update_attractor()?;
        Ok(())
    }
}
