//! Qualitative reading of an aggregate result.

use biz_core::AggregateResult;
use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfitabilityOutlook {
    Strong,
    Moderate,
    Limited,
}

impl ProfitabilityOutlook {
    fn from_probability(pct: f64) -> Self {
        if pct >= 75.0 {
            Self::Strong
        } else if pct >= 50.0 {
            Self::Moderate
        } else {
            Self::Limited
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::Strong => "strong likelihood of profitability",
            Self::Moderate => "moderate likelihood of profitability",
            Self::Limited => "limited likelihood of profitability",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BankruptcyRisk {
    Significant,
    Moderate,
    Low,
}

impl BankruptcyRisk {
    fn from_probability(pct: f64) -> Self {
        if pct >= 25.0 {
            Self::Significant
        } else if pct >= 10.0 {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::Significant => "significant bankruptcy risk",
            Self::Moderate => "moderate bankruptcy risk",
            Self::Low => "low bankruptcy risk",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoiPotential {
    High,
    Mixed,
    Negative,
}

impl RoiPotential {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::High => "high return potential",
            Self::Mixed => "mixed return profile",
            Self::Negative => "returns likely negative",
        }
    }
}

/// Headline judgement for a run, suitable for a report summary.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Outlook {
    pub profitability: ProfitabilityOutlook,
    pub bankruptcy: BankruptcyRisk,
    pub roi: RoiPotential,
    /// Mean final-period revenue reached at least twice the starting revenue.
    pub doubles_revenue: bool,
}

impl Outlook {
    pub fn assess(result: &AggregateResult, initial_revenue: f64) -> Self {
        let buckets = &result.roi_buckets;
        let roi = if buckets.twenty_plus >= 40.0 {
            RoiPotential::High
        } else if buckets.negative >= 40.0 {
            RoiPotential::Negative
        } else {
            RoiPotential::Mixed
        };
        let final_revenue = result.revenue.mean.last().copied().unwrap_or(0.0);
        Self {
            profitability: ProfitabilityOutlook::from_probability(result.profitability_probability),
            bankruptcy: BankruptcyRisk::from_probability(result.bankruptcy_probability),
            roi,
            doubles_revenue: initial_revenue > 0.0 && final_revenue >= 2.0 * initial_revenue,
        }
    }
}

impl fmt::Display for Outlook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}; {}; {}",
            self.profitability.describe(),
            self.bankruptcy.describe(),
            self.roi.describe()
        )?;
        if self.doubles_revenue {
            write!(f, "; revenue expected to at least double")?;
        }
        Ok(())
    }
}
