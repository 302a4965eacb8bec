use anyhow::{Context, Result};
use serde::Serialize;
use swarm_core::{init_tracing, load_settings, Attractor, Objective, SolverSettings, SwarmError};
use swarm_resilience::CancellationToken;
use tokio::signal;
use tracing::{info, warn};

mod objectives;

#[derive(Debug, Serialize)]
struct RunSummary {
    algorithm: String,
    objective: String,
    cancelled: bool,
    best: Option<Attractor>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("swarm-optimizer")?;
    let file = std::env::var("SWARM_CONFIG_FILE").unwrap_or_else(|_| "config/default".into());
    let settings = load_settings(Some(&file))?;
    info!(?settings, "config_loaded");

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("interrupt_received");
            on_signal.cancel();
        }
    });

    let summary = optimize(settings, cancel).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Run the configured solver off the async runtime; a cancelled run still reports its best.
async fn optimize(settings: SolverSettings, cancel: CancellationToken) -> Result<RunSummary> {
    let benchmark = objectives::lookup(&settings.objective)
        .with_context(|| format!("unknown objective '{}', expected one of {:?}", settings.objective, objectives::NAMES))?;
    let mut solver = settings.build(cancel)?;
    let algorithm = format!("{:?}", settings.algorithm).to_lowercase();
    let objective = settings.objective.clone();
    tokio::task::spawn_blocking(move || {
        let outcome = solver.solve(Objective::shared(benchmark));
        let (cancelled, best) = match outcome {
            Ok(best) => (false, Some(best)),
            Err(SwarmError::Cancelled(reason)) => {
                warn!(%reason, "optimization_cancelled");
                (true, solver.best().cloned())
            }
            Err(e) => return Err(anyhow::Error::new(e).context("optimization failed")),
        };
        info!(cancelled, height = best.as_ref().map(|b| b.height), "optimization_finished");
        Ok(RunSummary { algorithm, objective, cancelled, best })
    })
    .await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use swarm_core::Algorithm;

    fn unbounded(algorithm: Algorithm) -> SolverSettings {
        SolverSettings { algorithm, max_iterations: None, tolerance: None, seed: Some(3), ..Default::default() }
    }

    #[tokio::test]
    async fn cancellation_reports_best_so_far() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });
        let summary = optimize(unbounded(Algorithm::Multiswarm), cancel).await.unwrap();
        assert!(summary.cancelled);
        assert!(summary.best.unwrap().height <= 0.0);
    }

    #[tokio::test]
    async fn bounded_run_completes() {
        let settings = SolverSettings { algorithm: Algorithm::Qpso, max_iterations: Some(500), seed: Some(1), ..Default::default() };
        let summary = optimize(settings, CancellationToken::new()).await.unwrap();
        assert!(!summary.cancelled);
        assert_eq!(summary.algorithm, "qpso");
        assert!(summary.best.unwrap().height.abs() < 1e-3);
    }

    #[tokio::test]
    async fn unknown_objective_is_rejected() {
        let settings = SolverSettings { objective: "himmelblau".into(), ..Default::default() };
        let err = optimize(settings, CancellationToken::new()).await.unwrap_err();
        assert!(err.to_string().contains("unknown objective"));
    }
}
