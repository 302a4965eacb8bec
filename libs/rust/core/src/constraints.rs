//! Search-space bounds and the initial-state samplers built on them.

use std::fmt;
use std::sync::Arc;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SwarmError};
use crate::vector::{Position, Velocity};

/// Per-dimension `[min, max]` box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    min: Vec<f64>,
    max: Vec<f64>,
}

impl Constraints {
    pub fn new(min: Vec<f64>, max: Vec<f64>) -> Result<Self> {
        if min.is_empty() { return Err(SwarmError::config("constraints need at least one dimension")); }
        SwarmError::check_dimension(min.len(), max.len())?;
        if let Some(j) = (0..min.len()).find(|&j| !(min[j] <= max[j])) {
            return Err(SwarmError::config(format!("constraint {j}: min {} exceeds max {}", min[j], max[j])));
        }
        Ok(Self { min, max })
    }

    /// Same bounds on every dimension.
    pub fn uniform(dimension: usize, min: f64, max: f64) -> Result<Self> {
        Self::new(vec![min; dimension], vec![max; dimension])
    }

    pub fn dimension(&self) -> usize { self.min.len() }
    pub fn min(&self) -> &[f64] { &self.min }
    pub fn max(&self) -> &[f64] { &self.max }
    pub fn extent(&self, j: usize) -> f64 { self.max[j] - self.min[j] }
    pub fn max_extent(&self) -> f64 { (0..self.dimension()).map(|j| self.extent(j)).fold(0.0, f64::max) }

    pub fn check_dimension(&self, dimension: usize) -> Result<()> { SwarmError::check_dimension(self.dimension(), dimension) }

    pub fn contains(&self, position: &[f64]) -> bool {
        position.len() == self.dimension()
            && position.iter().enumerate().all(|(j, x)| *x >= self.min[j] && *x <= self.max[j])
    }
}

/// Source of initial positions and velocities for fresh particles.
pub trait Initializer: Send + Sync {
    fn dimension(&self) -> usize;
    fn position(&self, rng: &mut dyn RngCore) -> Position;
    fn velocity(&self, rng: &mut dyn RngCore) -> Velocity;
}

impl Initializer for Constraints {
    fn dimension(&self) -> usize { Constraints::dimension(self) }

    fn position(&self, rng: &mut dyn RngCore) -> Position {
        (0..self.dimension()).map(|j| self.min[j] + rng.gen::<f64>() * self.extent(j)).collect()
    }

    // velocities span half the extent in either direction
    fn velocity(&self, rng: &mut dyn RngCore) -> Velocity {
        (0..self.dimension()).map(|j| (rng.gen::<f64>() - 0.5) * self.extent(j)).collect()
    }
}

type SampleFn = Arc<dyn Fn(&mut dyn RngCore) -> Vec<f64> + Send + Sync>;

/// Caller-supplied samplers for problems without a bounding box.
#[derive(Clone)]
pub struct FnInitializer {
    dimension: usize,
    position: SampleFn,
    velocity: SampleFn,
}

impl FnInitializer {
    pub fn new<P, V>(dimension: usize, position: P, velocity: V) -> Self
    where
        P: Fn(&mut dyn RngCore) -> Vec<f64> + Send + Sync + 'static,
        V: Fn(&mut dyn RngCore) -> Vec<f64> + Send + Sync + 'static,
    {
        Self { dimension, position: Arc::new(position), velocity: Arc::new(velocity) }
    }
}

impl fmt::Debug for FnInitializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnInitializer").field("dimension", &self.dimension).finish_non_exhaustive()
    }
}

impl Initializer for FnInitializer {
    fn dimension(&self) -> usize { self.dimension }
    fn position(&self, rng: &mut dyn RngCore) -> Position { (self.position)(rng) }
    fn velocity(&self, rng: &mut dyn RngCore) -> Velocity { (self.velocity)(rng) }
}

/// Draw a position and check it against the dimension fixed by the first one.
pub(crate) fn sample_position(init: &dyn Initializer, rng: &mut dyn RngCore) -> Result<Position> {
    let p = init.position(rng);
    SwarmError::check_dimension(init.dimension(), p.len())?;
    Ok(p)
}

pub(crate) fn sample_velocity(init: &dyn Initializer, rng: &mut dyn RngCore) -> Result<Velocity> {
    let v = init.velocity(rng);
    SwarmError::check_dimension(init.dimension(), v.len())?;
    Ok(v)
}
