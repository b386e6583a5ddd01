//! Monte Carlo orchestration across independent trials.

use crate::stats::aggregate;
use crate::trial::run_trial;
use biz_core::{validate_parameters, AggregateResult, ParameterSet, Scenario, SimConfig, ValidationError};
use biz_params::{adjust_for_scenario, apply_overlay, ScenarioOverlay};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

/// Errors produced by a simulation run.
#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    /// Periods and iterations must both be positive.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    #[error("invalid parameters: {0}")]
    InvalidParameters(#[from] ValidationError),
    /// The cancellation flag was raised before all trials started.
    #[error("simulation cancelled")]
    Cancelled,
}

fn validate_config(cfg: &SimConfig) -> Result<(), SimError> {
    if cfg.periods == 0 {
        return Err(SimError::InvalidConfig("periods must be > 0"));
    }
    if cfg.iterations == 0 {
        return Err(SimError::InvalidConfig("iterations must be > 0"));
    }
    Ok(())
}

/// RNG for one trial: the run seed on its own ChaCha stream.
pub fn trial_rng(seed: u64, trial: u32) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(trial as u64);
    rng
}

fn resolve_seed(cfg: &SimConfig) -> u64 {
    cfg.rng_seed.unwrap_or_else(rand::random)
}

/// Run trials on an already adjusted parameter set.
fn run_prepared(
    adjusted: &ParameterSet,
    cfg: &SimConfig,
    seed: u64,
    cancel: &AtomicBool,
) -> Result<AggregateResult, SimError> {
    let started = Instant::now();
    info!(
        periods = cfg.periods,
        iterations = cfg.iterations,
        scenario = %cfg.scenario,
        seed,
        "simulation started"
    );
    let trials: Option<Vec<_>> = (0..cfg.iterations)
        .into_par_iter()
        .map(|i| {
            if cancel.load(Ordering::Relaxed) {
                return None;
            }
            let mut rng = trial_rng(seed, i);
            Some(run_trial(adjusted, cfg.periods, &mut rng))
        })
        .collect();
    let Some(trials) = trials else {
        info!("simulation cancelled");
        return Err(SimError::Cancelled);
    };
    let result = aggregate(&trials, cfg.periods, cfg.scenario, seed);
    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        profitability = result.profitability_probability,
        bankruptcy = result.bankruptcy_probability,
        high_growth = result.high_growth_probability,
        "simulation finished"
    );
    Ok(result)
}

/// Apply the configured scenario and run the Monte Carlo simulation.
pub fn run_simulation(params: &ParameterSet, cfg: &SimConfig) -> Result<AggregateResult, SimError> {
    run_simulation_with_cancel(params, cfg, &AtomicBool::new(false))
}

/// Like [`run_simulation`], checking `cancel` before each trial starts.
pub fn run_simulation_with_cancel(
    params: &ParameterSet,
    cfg: &SimConfig,
    cancel: &AtomicBool,
) -> Result<AggregateResult, SimError> {
    run_with_overlay(params, cfg, &ScenarioOverlay::IDENTITY, cancel)
}

/// Apply the configured scenario, then `overlay` on top, and run.
pub fn run_with_overlay(
    params: &ParameterSet,
    cfg: &SimConfig,
    overlay: &ScenarioOverlay,
    cancel: &AtomicBool,
) -> Result<AggregateResult, SimError> {
    validate_config(cfg)?;
    validate_parameters(params)?;
    let adjusted = apply_overlay(&adjust_for_scenario(params, cfg.scenario), overlay);
    // Overlay multipliers come from user plans.
    validate_parameters(&adjusted)?;
    run_prepared(&adjusted, cfg, resolve_seed(cfg), cancel)
}

/// Simulate several companies independently; company `k` uses seed `seed + k`.
pub fn run_batch(
    companies: &[ParameterSet],
    cfg: &SimConfig,
) -> Result<Vec<AggregateResult>, SimError> {
    run_batch_with_cancel(companies, cfg, &AtomicBool::new(false))
}

/// Like [`run_batch`]; `cancel` is shared by every company's run.
pub fn run_batch_with_cancel(
    companies: &[ParameterSet],
    cfg: &SimConfig,
    cancel: &AtomicBool,
) -> Result<Vec<AggregateResult>, SimError> {
    validate_config(cfg)?;
    let base = resolve_seed(cfg);
    companies
        .iter()
        .enumerate()
        .map(|(k, params)| {
            debug!(company = k, "batch entry");
            let cfg = SimConfig {
                rng_seed: Some(base.wrapping_add(k as u64)),
                ..cfg.clone()
            };
            run_simulation_with_cancel(params, &cfg, cancel)
        })
        .collect()
}

/// Run every scenario with the same seed, best case first.
pub fn compare_scenarios(
    params: &ParameterSet,
    cfg: &SimConfig,
) -> Result<Vec<AggregateResult>, SimError> {
    let seed = resolve_seed(cfg);
    Scenario::ALL
        .iter()
        .map(|&scenario| {
            let cfg = SimConfig {
                scenario,
                rng_seed: Some(seed),
                ..cfg.clone()
            };
            run_simulation(params, &cfg)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture;

    fn cfg(periods: u32, iterations: u32) -> SimConfig {
        SimConfig {
            periods,
            iterations,
            scenario: Scenario::Neutral,
            rng_seed: Some(42),
        }
    }

    #[test]
    fn rejects_empty_runs() {
        let p = fixture();
        assert_eq!(
            run_simulation(&p, &cfg(0, 10)),
            Err(SimError::InvalidConfig("periods must be > 0"))
        );
        assert_eq!(
            run_simulation(&p, &cfg(4, 0)),
            Err(SimError::InvalidConfig("iterations must be > 0"))
        );
    }

    #[test]
    fn rejects_invalid_parameters() {
        let mut p = fixture();
        p.initial_revenue = f64::INFINITY;
        assert!(matches!(
            run_simulation(&p, &cfg(4, 10)),
            Err(SimError::InvalidParameters(ValidationError::NonFinite("initial_revenue")))
        ));
    }

    #[test]
    fn raised_flag_cancels() {
        let cancel = AtomicBool::new(true);
        assert_eq!(
            run_simulation_with_cancel(&fixture(), &cfg(8, 100), &cancel),
            Err(SimError::Cancelled)
        );
    }

    #[test]
    fn unseeded_runs_record_their_seed() {
        let p = fixture();
        let c = SimConfig {
            rng_seed: None,
            ..cfg(4, 50)
        };
        let first = run_simulation(&p, &c).unwrap();
        let replay = run_simulation(
            &p,
            &SimConfig {
                rng_seed: Some(first.rng_seed),
                ..c
            },
        )
        .unwrap();
        assert_eq!(first, replay);
    }

    #[test]
    fn trial_streams_differ() {
        use rand::RngCore;
        let a = trial_rng(7, 0).next_u64();
        let b = trial_rng(7, 1).next_u64();
        assert_ne!(a, b);
        assert_eq!(a, trial_rng(7, 0).next_u64());
    }

    #[test]
    fn batch_runs_each_company() {
        let mut other = fixture();
        other.initial_revenue *= 4.0;
        let results = run_batch(&[fixture(), other], &cfg(6, 200)).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].rng_seed, 42);
        assert_eq!(results[1].rng_seed, 43);
        assert!(results[1].revenue.mean[0] > results[0].revenue.mean[0]);
    }

    #[test]
    fn raised_flag_cancels_batch() {
        let cancel = AtomicBool::new(true);
        assert_eq!(
            run_batch_with_cancel(&[fixture(), fixture()], &cfg(4, 50), &cancel),
            Err(SimError::Cancelled)
        );
    }

    #[test]
    fn overlay_results_are_validated() {
        let p = fixture();
        let c = cfg(4, 20);
        let never = AtomicBool::new(false);
        let negative = ScenarioOverlay {
            competitor_entry_probability: -3.0,
            ..ScenarioOverlay::IDENTITY
        };
        assert_eq!(
            run_with_overlay(&p, &c, &negative, &never),
            Err(SimError::InvalidParameters(ValidationError::Negative(
                "competitor_entry_probability"
            )))
        );
        let unbounded = ScenarioOverlay {
            revenue_growth_rate_mean: f64::INFINITY,
            ..ScenarioOverlay::IDENTITY
        };
        assert_eq!(
            run_with_overlay(&p, &c, &unbounded, &never),
            Err(SimError::InvalidParameters(ValidationError::NonFinite(
                "revenue_growth_rate_mean"
            )))
        );
    }

    #[test]
    fn scenarios_order_expected_revenue() {
        let results = compare_scenarios(&fixture(), &cfg(12, 1500)).unwrap();
        let scenarios: Vec<_> = results.iter().map(|r| r.scenario).collect();
        assert_eq!(scenarios, Scenario::ALL.to_vec());
        let finals: Vec<f64> = results.iter().map(|r| r.revenue.mean[11]).collect();
        assert!(finals[0] > finals[2], "optimistic {} vs pessimistic {}", finals[0], finals[2]);
    }

    #[test]
    fn custom_overlay_stacks_on_scenario() {
        let p = fixture();
        let boost = ScenarioOverlay {
            revenue_growth_rate_mean: 3.0,
            ..ScenarioOverlay::IDENTITY
        };
        let c = cfg(10, 800);
        let plain = run_simulation(&p, &c).unwrap();
        let boosted = run_with_overlay(&p, &c, &boost, &AtomicBool::new(false)).unwrap();
        assert!(boosted.revenue.mean[9] > plain.revenue.mean[9]);
    }
}
