//! Swarms of particles sharing one attractor.
//!
//! Particles are ordered neutral (classical) first, charged (quantum) last.
//! A swarm made only of neutral particles is a plain PSO swarm, one made only
//! of charged particles is a QPSO swarm, and a mix is a charged swarm in the
//! Blackwell-Branke sense: both kinds share the swarm attractor and the charged
//! ones also orbit the centroid of every particle attractor.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::attractor::Attractor;
use crate::coefficient::SwarmParams;
use crate::constraints::{sample_position, sample_velocity, Constraints, Initializer};
use crate::error::{Result, SwarmError};
use crate::particle::{Guide, Particle};
use crate::vector;

pub const DEFAULT_CHARGED_TO_NEUTRAL_RATIO: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Composition {
    Neutral,
    Charged,
    Mixed { charged_to_neutral_ratio: f64 },
}

impl Default for Composition {
    fn default() -> Self { Self::Mixed { charged_to_neutral_ratio: DEFAULT_CHARGED_TO_NEUTRAL_RATIO } }
}

impl Composition {
    /// `(neutral, charged)` particle counts for a swarm of `size`.
    pub fn split(&self, size: usize) -> Result<(usize, usize)> {
        if size == 0 { return Err(SwarmError::config("swarm size must be positive")); }
        match *self {
            Self::Neutral => Ok((size, 0)),
            Self::Charged => Ok((0, size)),
            Self::Mixed { charged_to_neutral_ratio: r } => {
                if !(r.is_finite() && r > 0.0) {
                    return Err(SwarmError::config(format!("charged_to_neutral_ratio must be a positive real, got {r}")));
                }
                let charged = ((size as f64) * r / (1.0 + r)).round() as usize;
                let charged = charged.min(size);
                Ok((size - charged, charged))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Swarm {
    particles: Vec<Particle>,
    num_neutral: usize,
    attractor: Option<Attractor>,
    iteration: u64,
    params: SwarmParams,
    constraints: Option<Constraints>,
}

impl Swarm {
    /// Sample a fresh swarm from `init`, optionally confined to `constraints`.
    pub fn new(
        size: usize,
        composition: Composition,
        params: SwarmParams,
        init: &dyn Initializer,
        constraints: Option<Constraints>,
        rng: &mut dyn RngCore,
    ) -> Result<Self> {
        let (num_neutral, _) = composition.split(size)?;
        if let Some(c) = &constraints { c.check_dimension(init.dimension())?; }
        let particles = sample_particles(size, num_neutral, init, rng)?;
        Ok(Self { particles, num_neutral, attractor: None, iteration: 1, params, constraints })
    }

    /// Build from explicit particles; classical ones must come first.
    pub fn from_particles(particles: Vec<Particle>, params: SwarmParams, constraints: Option<Constraints>) -> Result<Self> {
        let first = particles.first().ok_or_else(|| SwarmError::config("swarm size must be positive"))?;
        let dim = first.dimension();
        for p in &particles { SwarmError::check_dimension(dim, p.dimension())?; }
        if let Some(c) = &constraints { c.check_dimension(dim)?; }
        let num_neutral = particles.iter().take_while(|p| !p.is_charged()).count();
        if particles[num_neutral..].iter().any(|p| !p.is_charged()) {
            return Err(SwarmError::config("neutral particles must precede charged ones"));
        }
        Ok(Self { particles, num_neutral, attractor: None, iteration: 1, params, constraints })
    }

    /// Resample every particle in place, keeping composition and parameters.
    pub fn reinitialize(&mut self, init: &dyn Initializer, rng: &mut dyn RngCore) -> Result<()> {
        SwarmError::check_dimension(self.dimension(), init.dimension())?;
        self.particles = sample_particles(self.particles.len(), self.num_neutral, init, rng)?;
        self.attractor = None;
        self.iteration = 1;
        Ok(())
    }

    pub fn len(&self) -> usize { self.particles.len() }
    pub fn is_empty(&self) -> bool { self.particles.is_empty() }
    pub fn dimension(&self) -> usize { self.particles[0].dimension() }
    pub fn num_neutral(&self) -> usize { self.num_neutral }
    pub fn num_charged(&self) -> usize { self.particles.len() - self.num_neutral }
    pub fn iteration(&self) -> u64 { self.iteration }
    pub fn params(&self) -> &SwarmParams { &self.params }
    pub fn constraints(&self) -> Option<&Constraints> { self.constraints.as_ref() }
    pub fn attractor(&self) -> Option<&Attractor> { self.attractor.as_ref() }
    pub fn bestfit(&self) -> Option<f64> { self.attractor.as_ref().map(|a| a.height) }
    pub fn particles(&self) -> &[Particle] { &self.particles }
    pub fn particles_mut(&mut self) -> &mut [Particle] { &mut self.particles }
    pub fn iter(&self) -> std::slice::Iter<'_, Particle> { self.particles.iter() }

    /// Fold every particle attractor into the swarm attractor.
    pub fn update_attractor(&mut self) -> Result<&Attractor> {
        let best = Attractor::best_of(self.particles.iter().filter_map(|p| p.attractor()))
            .ok_or(SwarmError::Precondition("swarm attractor update before any evaluation"))?
            .clone();
        Attractor::promote(&mut self.attractor, &best);
        self.attractor.as_ref().ok_or(SwarmError::Precondition("swarm attractor missing"))
    }

    /// Mean of the particle attractor positions.
    pub fn centroid(&self) -> Result<Vec<f64>> {
        let positions = self.particles.iter()
            .map(|p| p.attractor().map(|a| a.position.as_slice()))
            .collect::<Option<Vec<_>>>()
            .ok_or(SwarmError::Precondition("centroid needs every particle evaluated"))?;
        vector::centroid(positions)
    }

    /// Widest pairwise distance between current particle positions.
    pub fn diameter(&self) -> f64 {
        let positions: Vec<&[f64]> = self.particles.iter().map(|p| p.position()).collect();
        vector::diameter(&positions)
    }

    /// Move every particle one step and confine it if the swarm is bounded.
    pub fn mutate(&mut self, rng: &mut dyn RngCore) -> Result<()> {
        let swarm_attractor = self.attractor.clone()
            .ok_or(SwarmError::Precondition("swarm mutated before its attractor was computed"))?;
        let centroid = if self.num_charged() > 0 { Some(self.centroid()?) } else { None };
        let guide = Guide {
            chi: self.params.chi.value(self.iteration),
            c1: self.params.c1,
            c2: self.params.c2,
            alpha: self.params.alpha.value(self.iteration),
            swarm_attractor: &swarm_attractor,
            centroid: centroid.as_deref(),
        };
        for p in self.particles.iter_mut() {
            p.step(&guide, rng)?;
            if let Some(c) = &self.constraints { p.remain_within(c)?; }
        }
        debug!(iteration = self.iteration, chi = guide.chi, alpha = guide.alpha, "swarm_mutated");
        self.iteration += 1;
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Swarm {
    type Item = &'a Particle;
    type IntoIter = std::slice::Iter<'a, Particle>;
    fn into_iter(self) -> Self::IntoIter { self.particles.iter() }
}

fn sample_particles(size: usize, num_neutral: usize, init: &dyn Initializer, rng: &mut dyn RngCore) -> Result<Vec<Particle>> {
    (0..size)
        .map(|i| {
            let position = sample_position(init, rng)?;
            if i < num_neutral { Particle::classical(position, sample_velocity(init, rng)?) } else { Ok(Particle::quantum(position)) }
        })
        .collect()
}
