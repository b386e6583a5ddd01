//! User-supplied values layered over a generated parameter set.

use biz_core::{validate_parameters, ParameterSet, ValidationError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Optional replacements for the user-editable parameters.
///
/// Values are taken as given, i.e. already per period.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParameterOverrides {
    pub initial_investment: Option<f64>,
    pub initial_revenue: Option<f64>,
    pub cash_reserves: Option<f64>,
    pub debt_level: Option<f64>,
    pub revenue_growth_rate_mean: Option<f64>,
    pub revenue_growth_volatility: Option<f64>,
    pub fixed_costs: Option<f64>,
    pub variable_costs_percentage: Option<f64>,
    pub market_growth_rate_mean: Option<f64>,
    pub market_volatility: Option<f64>,
    pub competitor_entry_probability: Option<f64>,
    pub regulatory_change_probability: Option<f64>,
}

impl ParameterOverrides {
    /// True when no field is overridden.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Return a copy of `params` with every present override applied.
    ///
    /// The result is validated, so a negative revenue or a NaN is rejected
    /// here instead of surfacing inside the engine.
    pub fn apply(&self, params: &ParameterSet) -> Result<ParameterSet, ValidationError> {
        let mut out = params.clone();
        let slots: [(Option<f64>, &mut f64); 12] = [
            (self.initial_investment, &mut out.initial_investment),
            (self.initial_revenue, &mut out.initial_revenue),
            (self.cash_reserves, &mut out.cash_reserves),
            (self.debt_level, &mut out.debt_level),
            (self.revenue_growth_rate_mean, &mut out.revenue_growth_rate_mean),
            (self.revenue_growth_volatility, &mut out.revenue_growth_volatility),
            (self.fixed_costs, &mut out.fixed_costs),
            (self.variable_costs_percentage, &mut out.variable_costs_percentage),
            (self.market_growth_rate_mean, &mut out.market_growth_rate_mean),
            (self.market_volatility, &mut out.market_volatility),
            (self.competitor_entry_probability, &mut out.competitor_entry_probability),
            (self.regulatory_change_probability, &mut out.regulatory_change_probability),
        ];
        let mut applied = 0usize;
        for (value, slot) in slots {
            if let Some(v) = value {
                *slot = v;
                applied += 1;
            }
        }
        validate_parameters(&out)?;
        debug!(applied, "parameter overrides applied");
        Ok(out)
    }
}
