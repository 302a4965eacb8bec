//! Layered solver settings: defaults, optional file, `SWARM__*` environment.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use swarm_resilience::CancellationToken;
use tracing::info;

use crate::charged::ChargedSwarmSolver;
use crate::coefficient::{constriction_factor, Constant, SwarmParams, DEFAULT_ALPHA, DEFAULT_C1, DEFAULT_C2};
use crate::constraints::Constraints;
use crate::error::SwarmError;
use crate::multiswarm::{ChangeResponse, ExclusionRadius, MultiSwarmParams, MultiSwarmSolver, DEFAULT_EXCESS_THRESHOLD, DEFAULT_NUM_SWARMS};
use crate::pso::PsoSolver;
use crate::qpso::QpsoSolver;
use crate::scheduler::EvaluationMode;
use crate::solver::{Solver, SolverConfig};
use crate::swarm::DEFAULT_CHARGED_TO_NEUTRAL_RATIO;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Pso,
    Qpso,
    Charged,
    #[default]
    Multiswarm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Evaluation {
    #[default]
    Sequential,
    Concurrent,
}

/// Per-dimension box; overrides the uniform `dimension`/`lower`/`upper` box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec<f64>,
    pub max: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    pub algorithm: Algorithm,
    pub objective: String,
    pub swarm_size: usize,
    pub num_swarms: usize,
    pub max_swarms: Option<usize>,
    pub excess_threshold: usize,
    pub charged_to_neutral_ratio: f64,
    pub dimension: usize,
    pub lower: f64,
    pub upper: f64,
    pub bounds: Option<Bounds>,
    pub c1: f64,
    pub c2: f64,
    /// Constriction factor; derived from `c1 + c2` when absent.
    pub chi: Option<f64>,
    pub alpha: f64,
    pub evaluation: Evaluation,
    pub threads: Option<usize>,
    pub seed: Option<u64>,
    pub exclusion_radius: ExclusionRadius,
    pub change_response: ChangeResponse,
    pub max_iterations: Option<u64>,
    /// Stop once `|best height|` drops below this.
    pub tolerance: Option<f64>,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            objective: "parabola".into(),
            swarm_size: 20,
            num_swarms: DEFAULT_NUM_SWARMS,
            max_swarms: None,
            excess_threshold: DEFAULT_EXCESS_THRESHOLD,
            charged_to_neutral_ratio: DEFAULT_CHARGED_TO_NEUTRAL_RATIO,
            dimension: 2,
            lower: -100.0,
            upper: 100.0,
            bounds: None,
            c1: DEFAULT_C1,
            c2: DEFAULT_C2,
            chi: None,
            alpha: DEFAULT_ALPHA,
            evaluation: Evaluation::Sequential,
            threads: None,
            seed: None,
            exclusion_radius: ExclusionRadius::Fixed,
            change_response: ChangeResponse::LogOnly,
            max_iterations: Some(10_000),
            tolerance: Some(1e-3),
        }
    }
}

/// Defaults, then `file` if given (missing file is fine), then `SWARM__*` env vars.
pub fn load_settings(file: Option<&str>) -> Result<SolverSettings> {
    let mut builder = config::Config::builder();
    if let Some(file) = file {
        builder = builder.add_source(config::File::with_name(file).required(false));
    }
    builder = builder.add_source(config::Environment::with_prefix("SWARM").separator("__").try_parsing(true));
    let settings: SolverSettings = builder.build()?.try_deserialize()?;
    info!(algorithm = ?settings.algorithm, objective = %settings.objective, file = ?file, "settings_loaded");
    Ok(settings)
}

impl SolverSettings {
    pub fn constraints(&self) -> crate::error::Result<Constraints> {
        match &self.bounds {
            Some(b) => Constraints::new(b.min.clone(), b.max.clone()),
            None => Constraints::uniform(self.dimension, self.lower, self.upper),
        }
    }

    pub fn params(&self) -> crate::error::Result<SwarmParams> {
        let chi = match self.chi {
            Some(chi) => chi,
            None if self.c1 + self.c2 > 4.0 => constriction_factor(self.c1, self.c2),
            None => return Err(SwarmError::config("c1 + c2 must exceed 4 to derive the constriction factor; set chi explicitly")),
        };
        Ok(SwarmParams::default().with_acceleration(self.c1, self.c2).with_chi(Constant(chi)).with_alpha(Constant(self.alpha)))
    }

    pub fn evaluation_mode(&self) -> EvaluationMode {
        match self.evaluation {
            Evaluation::Sequential => EvaluationMode::Sequential,
            Evaluation::Concurrent => EvaluationMode::Concurrent { threads: self.threads },
        }
    }

    pub fn solver_config(&self, cancel: CancellationToken) -> crate::error::Result<SolverConfig> {
        let (max_iterations, tolerance) = (self.max_iterations, self.tolerance);
        let mut config = SolverConfig::new(self.swarm_size)
            .constraints(self.constraints()?)
            .params(self.params()?)
            .mode(self.evaluation_mode())
            .cancellation(cancel)
            .exit_when(move |it, best| {
                max_iterations.map_or(false, |m| it >= m) || tolerance.map_or(false, |t| best.height.abs() < t)
            });
        if let Some(seed) = self.seed { config = config.seed(seed); }
        Ok(config)
    }

    pub fn build(&self, cancel: CancellationToken) -> crate::error::Result<Box<dyn Solver>> {
        let config = self.solver_config(cancel)?;
        Ok(match self.algorithm {
            Algorithm::Pso => Box::new(PsoSolver::new(config)?),
            Algorithm::Qpso => Box::new(QpsoSolver::new(config)?),
            Algorithm::Charged => Box::new(ChargedSwarmSolver::with_ratio(config, self.charged_to_neutral_ratio)?),
            Algorithm::Multiswarm => Box::new(MultiSwarmSolver::new(config, MultiSwarmParams {
                num_swarms: self.num_swarms,
                max_swarms: self.max_swarms,
                excess_threshold: self.excess_threshold,
                charged_to_neutral_ratio: self.charged_to_neutral_ratio,
                exclusion_radius: self.exclusion_radius,
                change_response: self.change_response,
            })?),
        })
    }
}
