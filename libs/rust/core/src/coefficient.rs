//! Motion coefficients and their per-iteration strategies.
//!
//! Defaults follow Clerc's constriction analysis and Sun et al. for QPSO:
//! `c1 = c2 = 2.05`, `chi = 2 / |2 - phi - sqrt(phi^2 - 4 phi)|` with
//! `phi = c1 + c2`, and a contraction-expansion `alpha = 0.75` (QPSO converges
//! for `alpha < e^gamma ~ 1.781`).

use std::fmt;
use std::sync::Arc;

/// Cognitive acceleration coefficient.
pub const DEFAULT_C1: f64 = 2.05;
/// Social acceleration coefficient.
pub const DEFAULT_C2: f64 = 2.05;
pub const DEFAULT_ALPHA: f64 = 0.75;

pub fn constriction_factor(c1: f64, c2: f64) -> f64 {
    let phi = c1 + c2;
    2.0 / (2.0 - phi - (phi * phi - 4.0 * phi).sqrt()).abs()
}

pub fn default_chi() -> f64 { constriction_factor(DEFAULT_C1, DEFAULT_C2) }

/// Value of a coefficient at a given iteration (1-based).
pub trait Coefficient: Send + Sync {
    fn value(&self, iteration: u64) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constant(pub f64);

impl Coefficient for Constant {
    fn value(&self, _iteration: u64) -> f64 { self.0 }
}

impl<F> Coefficient for F
where
    F: Fn(u64) -> f64 + Send + Sync,
{
    fn value(&self, iteration: u64) -> f64 { self(iteration) }
}

/// Coefficients shared by every particle of a swarm.
#[derive(Clone)]
pub struct SwarmParams {
    pub c1: f64,
    pub c2: f64,
    /// Constriction (or inertia) weight for classical particles.
    pub chi: Arc<dyn Coefficient>,
    /// Contraction-expansion coefficient for quantum particles.
    pub alpha: Arc<dyn Coefficient>,
}

impl SwarmParams {
    pub fn with_chi(mut self, chi: impl Coefficient + 'static) -> Self { self.chi = Arc::new(chi); self }
    pub fn with_alpha(mut self, alpha: impl Coefficient + 'static) -> Self { self.alpha = Arc::new(alpha); self }
    pub fn with_acceleration(mut self, c1: f64, c2: f64) -> Self { self.c1 = c1; self.c2 = c2; self }
}

impl Default for SwarmParams {
    fn default() -> Self {
        Self { c1: DEFAULT_C1, c2: DEFAULT_C2, chi: Arc::new(Constant(default_chi())), alpha: Arc::new(Constant(DEFAULT_ALPHA)) }
    }
}

impl fmt::Debug for SwarmParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwarmParams")
            .field("c1", &self.c1)
            .field("c2", &self.c2)
            .field("chi@1", &self.chi.value(1))
            .field("alpha@1", &self.alpha.value(1))
            .finish()
    }
}
