//! Scenario overlays.

use biz_core::{ParameterSet, Scenario};
use serde::{Deserialize, Serialize};

/// Multipliers applied to a parameter set for one scenario.
///
/// Fields missing from a deserialized overlay default to 1.0.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioOverlay {
    pub revenue_growth_rate_mean: f64,
    pub market_growth_rate_mean: f64,
    pub cost_inflation_rate: f64,
    pub competitor_entry_probability: f64,
    pub regulatory_change_probability: f64,
    pub supply_chain_disruption_probability: f64,
    pub customer_retention_rate: f64,
    pub funding_probability: f64,
}

impl ScenarioOverlay {
    /// Overlay that leaves every field untouched.
    pub const IDENTITY: ScenarioOverlay = ScenarioOverlay {
        revenue_growth_rate_mean: 1.0,
        market_growth_rate_mean: 1.0,
        cost_inflation_rate: 1.0,
        competitor_entry_probability: 1.0,
        regulatory_change_probability: 1.0,
        supply_chain_disruption_probability: 1.0,
        customer_retention_rate: 1.0,
        funding_probability: 1.0,
    };

    /// Built-in multipliers for a named scenario.
    pub fn for_scenario(scenario: Scenario) -> Self {
        match scenario {
            Scenario::Optimistic => ScenarioOverlay {
                revenue_growth_rate_mean: 1.3,
                market_growth_rate_mean: 1.2,
                cost_inflation_rate: 0.8,
                competitor_entry_probability: 0.7,
                regulatory_change_probability: 0.7,
                supply_chain_disruption_probability: 0.7,
                customer_retention_rate: 1.1,
                funding_probability: 1.3,
            },
            Scenario::Neutral => Self::IDENTITY,
            Scenario::Pessimistic => ScenarioOverlay {
                revenue_growth_rate_mean: 0.7,
                market_growth_rate_mean: 0.7,
                cost_inflation_rate: 1.2,
                competitor_entry_probability: 1.3,
                regulatory_change_probability: 1.3,
                supply_chain_disruption_probability: 1.3,
                customer_retention_rate: 0.9,
                funding_probability: 0.6,
            },
        }
    }
}

impl Default for ScenarioOverlay {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Apply arbitrary multipliers, returning a new parameter set.
pub fn apply_overlay(params: &ParameterSet, overlay: &ScenarioOverlay) -> ParameterSet {
    let mut out = params.clone();
    out.revenue_growth_rate_mean *= overlay.revenue_growth_rate_mean;
    out.market_growth_rate_mean *= overlay.market_growth_rate_mean;
    out.cost_inflation_rate *= overlay.cost_inflation_rate;
    out.competitor_entry_probability *= overlay.competitor_entry_probability;
    out.regulatory_change_probability *= overlay.regulatory_change_probability;
    out.supply_chain_disruption_probability *= overlay.supply_chain_disruption_probability;
    // Retention is a share of customers kept, so it cannot exceed 100%.
    out.customer_retention_rate =
        (out.customer_retention_rate * overlay.customer_retention_rate).min(100.0);
    out.funding_probability *= overlay.funding_probability;
    out
}

/// Apply the built-in overlay of `scenario`. The input is left untouched.
pub fn adjust_for_scenario(params: &ParameterSet, scenario: Scenario) -> ParameterSet {
    apply_overlay(params, &ScenarioOverlay::for_scenario(scenario))
}
