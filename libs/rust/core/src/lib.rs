//! Core swarm optimization engine shared by SwarmGuard services.
//!
//! Maximizes a black-box objective with constricted PSO, quantum-behaved PSO,
//! charged swarms mixing both, and a multiswarm controller that tracks moving
//! optima through exclusion and anti-convergence. Objective calls go through an
//! evaluation barrier that runs them sequentially or over a worker pool.

use anyhow::Result;
use once_cell::sync::OnceCell;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub mod arena;
pub mod attractor;
pub mod charged;
pub mod coefficient;
pub mod constraints;
pub mod error;
pub mod metrics;
pub mod multiswarm;
pub mod objective;
pub mod particle;
pub mod pso;
pub mod qpso;
pub mod scheduler;
pub mod settings;
pub mod solver;
pub mod swarm;
pub mod vector;

pub use arena::{SwarmArena, SwarmId};
pub use attractor::Attractor;
pub use charged::ChargedSwarmSolver;
pub use coefficient::{Coefficient, Constant, SwarmParams};
pub use constraints::{Constraints, FnInitializer, Initializer};
pub use error::{Result as SwarmResult, SwarmError};
pub use multiswarm::{ChangeResponse, ExclusionRadius, MultiSwarmParams, MultiSwarmSolver};
pub use objective::Objective;
pub use particle::Particle;
pub use pso::PsoSolver;
pub use qpso::QpsoSolver;
pub use scheduler::{EvaluationMode, Scheduler};
pub use settings::{load_settings, Algorithm, SolverSettings};
pub use solver::{ExitCondition, IterationReport, Solver, SolverConfig};
pub use swarm::{Composition, Swarm};
pub use swarm_resilience::{CancellationToken, ResilienceError};

static TRACING_INIT: OnceCell<()> = OnceCell::new();

/// Install the fmt subscriber once. `RUST_LOG` filters (default `info`);
/// `SWARM_JSON_LOG=1|true` switches to JSON lines.
pub fn init_tracing(service: &str) -> Result<()> {
    TRACING_INIT.get_or_try_init(|| -> Result<()> {
        let json = std::env::var("SWARM_JSON_LOG").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false);
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let registry = tracing_subscriber::registry().with(env_filter);
        if json {
            registry
                .with(tracing_subscriber::fmt::layer().json().flatten_event(true).with_current_span(true).with_span_list(false))
                .try_init()?;
        } else {
            registry
                .with(tracing_subscriber::fmt::layer().with_target(true).with_thread_ids(false).with_line_number(true))
                .try_init()?;
        }
        Ok(())
    })?;
    info!(service, "tracing_initialized");
    Ok(())
}
