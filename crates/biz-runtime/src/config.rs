//! YAML run plans.
//!
//! A plan names the company to generate, the run shape and optional
//! overrides, e.g.
//!
//! ```yaml
//! company:
//!   industry: Biotech
//!   size: growth
//!   market_condition: recession
//! periods: 20
//! iterations: 5000
//! scenario: pessimistic
//! seed: 7
//! overrides:
//!   initial_investment: 4000000
//! ```

use biz_core::{Industry, MarketCondition, Scenario, SimConfig, SizeTier};
use biz_params::{ParameterOverrides, ScenarioOverlay};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed plan: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid plan: {0}")]
    Invalid(String),
}

/// Categorical description of the company to generate.
///
/// Tags are free-form; unknown values fall back to the documented defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompanySpec {
    pub industry: String,
    pub size: String,
    pub market_condition: String,
}

impl Default for CompanySpec {
    fn default() -> Self {
        Self {
            industry: Industry::default().name().to_string(),
            size: SizeTier::default().name().to_string(),
            market_condition: MarketCondition::default().name().to_string(),
        }
    }
}

impl CompanySpec {
    pub fn industry(&self) -> Industry {
        Industry::parse(&self.industry)
    }

    pub fn size(&self) -> SizeTier {
        SizeTier::parse(&self.size)
    }

    pub fn market_condition(&self) -> MarketCondition {
        MarketCondition::parse(&self.market_condition)
    }
}

/// Everything needed to reproduce one CLI run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationPlan {
    pub company: CompanySpec,
    pub periods: u32,
    pub iterations: u32,
    pub scenario: String,
    pub seed: Option<u64>,
    /// Extra multipliers stacked on the named scenario.
    pub overlay: Option<ScenarioOverlay>,
    pub overrides: ParameterOverrides,
    /// Number of companies generated and simulated independently.
    pub batch: u32,
}

impl Default for SimulationPlan {
    fn default() -> Self {
        let cfg = SimConfig::default();
        Self {
            company: CompanySpec::default(),
            periods: cfg.periods,
            iterations: cfg.iterations,
            scenario: cfg.scenario.name().to_string(),
            seed: cfg.rng_seed,
            overlay: None,
            overrides: ParameterOverrides::default(),
            batch: 1,
        }
    }
}

impl SimulationPlan {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let plan: SimulationPlan = serde_yaml::from_str(text)?;
        plan.validate()?;
        Ok(plan)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.periods == 0 {
            return Err(ConfigError::Invalid("periods must be > 0".into()));
        }
        if self.iterations == 0 {
            return Err(ConfigError::Invalid("iterations must be > 0".into()));
        }
        if self.batch == 0 {
            return Err(ConfigError::Invalid("batch must be > 0".into()));
        }
        Ok(())
    }

    pub fn scenario(&self) -> Scenario {
        Scenario::parse(&self.scenario)
    }

    pub fn sim_config(&self) -> SimConfig {
        SimConfig {
            periods: self.periods,
            iterations: self.iterations,
            scenario: self.scenario(),
            rng_seed: self.seed,
        }
    }
}

/// Load and validate a plan from a YAML file.
pub fn load_plan<P: AsRef<Path>>(path: P) -> Result<SimulationPlan, ConfigError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    SimulationPlan::from_yaml_str(&text)
}
