#![deny(warnings)]
//! Monte Carlo runtime: per-trial engine, parallel orchestration,
//! aggregation, run plans and a qualitative outlook.

pub mod config;
pub mod orchestrator;
pub mod outlook;
pub mod stats;
pub mod trial;

pub use config::{load_plan, CompanySpec, ConfigError, SimulationPlan};
pub use orchestrator::{
    compare_scenarios, run_batch, run_batch_with_cancel, run_simulation,
    run_simulation_with_cancel, run_with_overlay, trial_rng, SimError,
};
pub use outlook::{BankruptcyRisk, Outlook, ProfitabilityOutlook, RoiPotential};
pub use stats::aggregate;
pub use trial::run_trial;
