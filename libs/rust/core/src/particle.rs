//! Particles and their motion rules.
//!
//! A particle is either *classical* (constricted PSO, carries a velocity) or
//! *quantum* (QPSO type II, position only). Both keep a personal attractor that
//! only ever moves to a strictly higher height.

use rand::{Rng, RngCore};

use crate::attractor::Attractor;
use crate::constraints::Constraints;
use crate::error::{Result, SwarmError};
use crate::vector::{Position, Velocity};

#[derive(Debug, Clone, PartialEq)]
pub enum Motion {
    Classical { velocity: Velocity },
    Quantum,
}

/// Swarm-level inputs for one move.
#[derive(Debug, Clone, Copy)]
pub struct Guide<'a> {
    pub chi: f64,
    pub c1: f64,
    pub c2: f64,
    pub alpha: f64,
    pub swarm_attractor: &'a Attractor,
    /// Mean of the particle attractors; only quantum particles read it.
    pub centroid: Option<&'a [f64]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    position: Position,
    motion: Motion,
    height: Option<f64>,
    attractor: Option<Attractor>,
}

impl Particle {
    pub fn classical(position: Position, velocity: Velocity) -> Result<Self> {
        SwarmError::check_dimension(position.len(), velocity.len())?;
        Ok(Self { position, motion: Motion::Classical { velocity }, height: None, attractor: None })
    }

    pub fn quantum(position: Position) -> Self {
        Self { position, motion: Motion::Quantum, height: None, attractor: None }
    }

    pub fn position(&self) -> &[f64] { &self.position }
    pub fn dimension(&self) -> usize { self.position.len() }
    pub fn is_charged(&self) -> bool { matches!(self.motion, Motion::Quantum) }
    /// Height at the current position, once evaluated there.
    pub fn height(&self) -> Option<f64> { self.height }
    pub fn attractor(&self) -> Option<&Attractor> { self.attractor.as_ref() }

    pub fn velocity(&self) -> Option<&[f64]> {
        match &self.motion { Motion::Classical { velocity } => Some(velocity), Motion::Quantum => None }
    }

    /// Run the objective at the current position and keep the result.
    pub fn evaluate<F>(&mut self, objective: F) -> Result<f64>
    where
        F: FnOnce(&[f64]) -> anyhow::Result<f64>,
    {
        let height = objective(&self.position).map_err(SwarmError::Objective)?;
        self.record(height);
        Ok(height)
    }

    /// Store a height computed for the current position.
    pub fn record(&mut self, height: f64) {
        self.height = Some(height);
        let improved = match &self.attractor { None => true, Some(a) => height > a.height };
        if improved { self.attractor = Some(Attractor::new(height, self.position.clone())); }
    }

    /// Advance one step. Fails if the particle was never evaluated.
    pub fn step(&mut self, guide: &Guide<'_>, rng: &mut dyn RngCore) -> Result<()> {
        let pbest = match &self.attractor {
            Some(a) => a.position.clone(),
            None => return Err(SwarmError::Precondition("particle moved before its first evaluation")),
        };
        let gbest = &guide.swarm_attractor.position;
        SwarmError::check_dimension(self.position.len(), gbest.len())?;
        match &mut self.motion {
            Motion::Classical { velocity } => {
                for j in 0..self.position.len() {
                    let x = self.position[j];
                    let r1: f64 = rng.gen();
                    let r2: f64 = rng.gen();
                    velocity[j] = guide.chi * (velocity[j] + guide.c1 * r1 * (pbest[j] - x) + guide.c2 * r2 * (gbest[j] - x));
                    self.position[j] = x + velocity[j];
                }
            }
            Motion::Quantum => {
                let centroid = guide.centroid.ok_or(SwarmError::Precondition("quantum move without a centroid"))?;
                SwarmError::check_dimension(self.position.len(), centroid.len())?;
                let mut next = Vec::with_capacity(self.position.len());
                let mut delta = Vec::with_capacity(self.position.len());
                for j in 0..self.position.len() {
                    let phi: f64 = rng.gen();
                    next.push(phi * pbest[j] + (1.0 - phi) * gbest[j]);
                    // u in (0, 1] keeps ln(1/u) finite
                    let u = 1.0 - rng.gen::<f64>();
                    delta.push(guide.alpha * (self.position[j] - centroid[j]).abs() * (1.0 / u).ln());
                }
                let sign = if rng.gen::<f64>() < 0.5 { 1.0 } else { -1.0 };
                for (p, d) in next.iter_mut().zip(&delta) { *p += sign * d; }
                self.position = next;
            }
        }
        self.height = None;
        Ok(())
    }

    /// Clamp into the box; classical particles bounce with half their speed.
    pub fn remain_within(&mut self, constraints: &Constraints) -> Result<()> {
        constraints.check_dimension(self.position.len())?;
        let (min, max) = (constraints.min(), constraints.max());
        for j in 0..self.position.len() {
            let x = self.position[j];
            let bound = if x > max[j] { max[j] } else if x < min[j] { min[j] } else { continue };
            self.position[j] = bound;
            if let Motion::Classical { velocity } = &mut self.motion { velocity[j] *= -0.5; }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn parabola(p: &[f64]) -> anyhow::Result<f64> { Ok(-p.iter().map(|x| x * x).sum::<f64>()) }

    fn guide(att: &Attractor) -> Guide<'_> {
        Guide { chi: 0.7298, c1: 2.05, c2: 2.05, alpha: 0.75, swarm_attractor: att, centroid: None }
    }

    #[test]
    fn attractor_tracks_max_height() {
        let mut p = Particle::quantum(vec![3.0, 4.0]);
        assert_eq!(p.evaluate(parabola).unwrap(), -25.0);
        p.position = vec![1.0, 0.0];
        p.evaluate(parabola).unwrap();
        assert_eq!(p.attractor().unwrap().position, vec![1.0, 0.0]);
        p.position = vec![5.0, 5.0];
        p.evaluate(parabola).unwrap();
        let att = p.attractor().unwrap();
        assert_eq!((att.height, att.position.clone()), (-1.0, vec![1.0, 0.0]));
        assert_eq!(p.height(), Some(-50.0));
    }

    #[test]
    fn objective_error_leaves_state_untouched() {
        let mut p = Particle::quantum(vec![1.0]);
        let err = p.evaluate(|_| anyhow::bail!("sensor offline")).unwrap_err();
        assert_eq!(err.objective_source().unwrap().to_string(), "sensor offline");
        assert!(p.attractor().is_none());
    }

    #[test]
    fn move_before_evaluate_is_rejected() {
        let att = Attractor::new(0.0, vec![0.0, 0.0]);
        let mut rng = StdRng::seed_from_u64(3);
        let mut p = Particle::classical(vec![1.0, 1.0], vec![0.0, 0.0]).unwrap();
        assert!(matches!(p.step(&guide(&att), &mut rng), Err(SwarmError::Precondition(_))));
        assert!(Particle::classical(vec![1.0, 1.0], vec![0.0]).is_err());
    }

    #[test]
    fn classical_step_follows_constricted_update() {
        // all attractors at the current position: velocity just decays by chi
        let att = Attractor::new(0.0, vec![2.0, -2.0]);
        let mut rng = StdRng::seed_from_u64(11);
        let mut p = Particle::classical(vec![2.0, -2.0], vec![1.0, -4.0]).unwrap();
        p.record(0.0);
        p.step(&guide(&att), &mut rng).unwrap();
        let v = p.velocity().unwrap().to_vec();
        assert!((v[0] - 0.7298).abs() < 1e-12 && (v[1] + 4.0 * 0.7298).abs() < 1e-12);
        assert!((p.position()[0] - 2.7298).abs() < 1e-12);
        assert!(p.height().is_none());
    }

    #[test]
    fn quantum_step_collapses_on_centroid() {
        // x == centroid gives zero displacement, so the particle lands between pbest and gbest
        let att = Attractor::new(0.0, vec![4.0, 4.0]);
        let mut rng = StdRng::seed_from_u64(5);
        let mut p = Particle::quantum(vec![0.0, 0.0]);
        p.record(-1.0);
        let centroid = [0.0, 0.0];
        let g = Guide { centroid: Some(&centroid), ..guide(&att) };
        p.step(&g, &mut rng).unwrap();
        assert!(p.position().iter().all(|x| (0.0..=4.0).contains(x)));

        let mut lost = Particle::quantum(vec![0.0, 0.0]);
        lost.record(-1.0);
        assert!(matches!(lost.step(&guide(&att), &mut rng), Err(SwarmError::Precondition(_))));
    }

    #[test]
    fn confinement_reflects_classical_velocity() {
        let c = Constraints::uniform(2, -1.0, 1.0).unwrap();
        let mut p = Particle::classical(vec![3.0, 0.5], vec![2.0, 0.1]).unwrap();
        p.remain_within(&c).unwrap();
        assert_eq!(p.position(), &[1.0, 0.5]);
        assert_eq!(p.velocity().unwrap(), &[-1.0, 0.1]);

        let mut q = Particle::quantum(vec![-7.0, 7.0]);
        q.remain_within(&c).unwrap();
        assert_eq!(q.position(), &[-1.0, 1.0]);
        assert!(q.remain_within(&Constraints::uniform(3, 0.0, 1.0).unwrap()).is_err());
    }
}
