#![deny(warnings)]

//! Core domain models and invariants for the business-performance simulator.
//!
//! This crate defines the serializable types shared by the parameter
//! generator and the Monte Carlo runtime, with validation helpers and the
//! guarded numeric primitives every ratio in the engine goes through.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, trace};

/// Simulated periods per calendar year (quarters).
pub const PERIODS_PER_YEAR: u32 = 4;

/// Industry vertical of a simulated company.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Industry {
    /// Software as a service.
    #[default]
    SaaS,
    /// Capital-heavy manufacturing.
    Manufacturing,
    /// Consumer retail.
    Retail,
    /// Biotechnology, high regulatory exposure.
    Biotech,
}

impl Industry {
    /// Every supported industry, in table order.
    pub const ALL: [Industry; 4] = [
        Industry::SaaS,
        Industry::Manufacturing,
        Industry::Retail,
        Industry::Biotech,
    ];

    /// Lenient parse; unknown tags fall back to [`Industry::SaaS`].
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "saas" => Industry::SaaS,
            "manufacturing" => Industry::Manufacturing,
            "retail" => Industry::Retail,
            "biotech" => Industry::Biotech,
            other => {
                debug!(input = other, "unrecognized industry, falling back to SaaS");
                Industry::default()
            }
        }
    }

    /// Display name as used in inputs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Industry::SaaS => "SaaS",
            Industry::Manufacturing => "Manufacturing",
            Industry::Retail => "Retail",
            Industry::Biotech => "Biotech",
        }
    }

    /// Average revenue per customer used to seed the customer-count model.
    pub fn revenue_per_customer(&self) -> f64 {
        match self {
            Industry::SaaS => 1000.0,
            _ => 100.0,
        }
    }
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Company size tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeTier {
    #[default]
    Startup,
    Growth,
    Established,
}

impl SizeTier {
    /// Lenient parse; unknown tags fall back to [`SizeTier::Startup`].
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "startup" => SizeTier::Startup,
            "growth" => SizeTier::Growth,
            "established" => SizeTier::Established,
            other => {
                debug!(input = other, "unrecognized size tier, falling back to startup");
                SizeTier::default()
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SizeTier::Startup => "startup",
            SizeTier::Growth => "growth",
            SizeTier::Established => "established",
        }
    }
}

impl fmt::Display for SizeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Macro-economic backdrop at generation time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketCondition {
    Boom,
    #[default]
    Normal,
    Recession,
}

impl MarketCondition {
    /// Lenient parse; unknown tags fall back to [`MarketCondition::Normal`].
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "boom" => MarketCondition::Boom,
            "normal" => MarketCondition::Normal,
            "recession" => MarketCondition::Recession,
            other => {
                debug!(input = other, "unrecognized market condition, falling back to normal");
                MarketCondition::default()
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MarketCondition::Boom => "boom",
            MarketCondition::Normal => "normal",
            MarketCondition::Recession => "recession",
        }
    }
}

impl fmt::Display for MarketCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named multiplicative overlay applied before a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Optimistic,
    #[default]
    Neutral,
    Pessimistic,
}

impl Scenario {
    /// All scenarios, best case first.
    pub const ALL: [Scenario; 3] = [
        Scenario::Optimistic,
        Scenario::Neutral,
        Scenario::Pessimistic,
    ];

    /// Lenient parse; unknown tags fall back to [`Scenario::Neutral`].
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "optimistic" => Scenario::Optimistic,
            "neutral" => Scenario::Neutral,
            "pessimistic" => Scenario::Pessimistic,
            other => {
                debug!(input = other, "unrecognized scenario, falling back to neutral");
                Scenario::default()
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Optimistic => "optimistic",
            Scenario::Neutral => "neutral",
            Scenario::Pessimistic => "pessimistic",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Complete parameter set for one simulated company.
///
/// Rates and percentages are per period (quarterly) and expressed in percent
/// unless stated otherwise. Probabilities are expected event counts over the
/// whole simulated horizon.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    /// Industry the company operates in.
    pub industry: Industry,
    /// Capital invested up front in USD (>= 0).
    pub initial_investment: f64,
    /// Revenue at period zero in USD (>= 0).
    pub initial_revenue: f64,
    /// Cash on hand at period zero in USD.
    pub cash_reserves: f64,
    /// Outstanding debt at period zero in USD (>= 0).
    pub debt_level: f64,
    /// Expected organic revenue growth per period (%).
    pub revenue_growth_rate_mean: f64,
    /// Standard deviation of organic revenue growth per period (%).
    pub revenue_growth_volatility: f64,
    /// Fixed costs per period in USD.
    pub fixed_costs: f64,
    /// Variable costs as % of revenue.
    pub variable_costs_percentage: f64,
    /// R&D spend as % of revenue.
    pub r_and_d_percentage: f64,
    /// Marketing spend as % of revenue.
    pub marketing_percentage: f64,
    /// Share of customers kept each period (%).
    pub customer_retention_rate: f64,
    /// Market share at period zero (%).
    pub market_share: f64,
    /// Market share growth per period before saturation (%).
    pub market_share_growth: f64,
    /// Expected market growth per period (%).
    pub market_growth_rate_mean: f64,
    /// Standard deviation of market growth per period (%).
    pub market_volatility: f64,
    /// Cyclicality index; larger values mean longer market cycles.
    pub industry_cyclicality: f64,
    /// Amplitude of the seasonal growth component (fraction).
    pub seasonality_factor: f64,
    pub competitor_entry_probability: f64,
    /// Market share lost on competitor entry (%).
    pub competitor_impact: f64,
    pub regulatory_change_probability: f64,
    /// Revenue lost on a regulatory change (%).
    pub regulatory_impact: f64,
    pub supply_chain_disruption_probability: f64,
    /// Revenue lost per supply-chain disruption (%).
    pub supply_chain_impact: f64,
    /// Funding rounds the company may still raise.
    pub funding_rounds: u32,
    pub funding_probability: f64,
    /// Typical round size in USD; informational.
    pub funding_amount_mean: f64,
    /// Credit score used for emergency debt financing.
    pub credit_score: f64,
    /// Fixed-cost inflation per period (%).
    pub cost_inflation_rate: f64,
    pub employee_count: f64,
    /// Relative productivity multiplier; informational.
    pub employee_productivity: f64,
}

impl ParameterSet {
    /// Named numeric fields, used by validation and reporting.
    pub fn numeric_fields(&self) -> [(&'static str, f64); 30] {
        [
            ("initial_investment", self.initial_investment),
            ("initial_revenue", self.initial_revenue),
            ("cash_reserves", self.cash_reserves),
            ("debt_level", self.debt_level),
            ("revenue_growth_rate_mean", self.revenue_growth_rate_mean),
            ("revenue_growth_volatility", self.revenue_growth_volatility),
            ("fixed_costs", self.fixed_costs),
            ("variable_costs_percentage", self.variable_costs_percentage),
            ("r_and_d_percentage", self.r_and_d_percentage),
            ("marketing_percentage", self.marketing_percentage),
            ("customer_retention_rate", self.customer_retention_rate),
            ("market_share", self.market_share),
            ("market_share_growth", self.market_share_growth),
            ("market_growth_rate_mean", self.market_growth_rate_mean),
            ("market_volatility", self.market_volatility),
            ("industry_cyclicality", self.industry_cyclicality),
            ("seasonality_factor", self.seasonality_factor),
            ("competitor_entry_probability", self.competitor_entry_probability),
            ("competitor_impact", self.competitor_impact),
            ("regulatory_change_probability", self.regulatory_change_probability),
            ("regulatory_impact", self.regulatory_impact),
            (
                "supply_chain_disruption_probability",
                self.supply_chain_disruption_probability,
            ),
            ("supply_chain_impact", self.supply_chain_impact),
            ("funding_rounds", self.funding_rounds as f64),
            ("funding_probability", self.funding_probability),
            ("funding_amount_mean", self.funding_amount_mean),
            ("credit_score", self.credit_score),
            ("cost_inflation_rate", self.cost_inflation_rate),
            ("employee_count", self.employee_count),
            ("employee_productivity", self.employee_productivity),
        ]
    }
}

/// Simulation configuration parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Number of simulated quarters (> 0).
    pub periods: u32,
    /// Number of independent trials (> 0).
    pub iterations: u32,
    /// Scenario overlay applied before the trials.
    pub scenario: Scenario,
    /// Seed for deterministic RNG; drawn from entropy when absent.
    pub rng_seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            periods: 20,
            iterations: 10_000,
            scenario: Scenario::Neutral,
            rng_seed: None,
        }
    }
}

/// Metrics recorded for one period of one trial.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodMetrics {
    pub revenue: f64,
    pub profit: f64,
    pub cash_flow: f64,
    /// Quarterly ROI on the initial investment (%).
    pub roi: f64,
    /// Market share (%).
    pub market_share: f64,
}

/// Recorded per-period metric kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Revenue,
    Profit,
    CashFlow,
    Roi,
    MarketShare,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Revenue,
        Metric::Profit,
        Metric::CashFlow,
        Metric::Roi,
        Metric::MarketShare,
    ];
}

impl PeriodMetrics {
    /// Value of one metric.
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Revenue => self.revenue,
            Metric::Profit => self.profit,
            Metric::CashFlow => self.cash_flow,
            Metric::Roi => self.roi,
            Metric::MarketShare => self.market_share,
        }
    }
}

/// Full trajectory of a single trial.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    /// One entry per simulated period, in order.
    pub periods: Vec<PeriodMetrics>,
    /// Cash exhausted and debt above 1.5x the initial investment at the end.
    pub bankrupt: bool,
    /// Final revenue above 3x the initial revenue.
    pub high_growth: bool,
}

impl TrialResult {
    pub fn final_period(&self) -> Option<&PeriodMetrics> {
        self.periods.last()
    }
}

/// Per-period statistics of one metric across all trials.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    pub mean: Vec<f64>,
    /// Population standard deviation (0 for a single trial).
    pub std: Vec<f64>,
    /// 10th percentile band.
    pub p10: Vec<f64>,
    /// 90th percentile band.
    pub p90: Vec<f64>,
}

impl MetricSeries {
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    fn all_finite(&self) -> bool {
        self.mean
            .iter()
            .chain(&self.std)
            .chain(&self.p10)
            .chain(&self.p90)
            .all(|v| v.is_finite())
    }
}

/// Final-period percentile thresholds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub low_10th: f64,
    pub median: f64,
    pub high_90th: f64,
}

/// Final-period ROI distribution, each bucket in percent of trials.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoiBuckets {
    /// ROI < 0.
    pub negative: f64,
    /// 0 <= ROI < 10.
    pub zero_to_ten: f64,
    /// 10 <= ROI < 20.
    pub ten_to_twenty: f64,
    /// ROI >= 20.
    pub twenty_plus: f64,
}

impl RoiBuckets {
    pub fn total(&self) -> f64 {
        self.negative + self.zero_to_ten + self.ten_to_twenty + self.twenty_plus
    }
}

/// Aggregate statistics of one simulation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub scenario: Scenario,
    pub periods: u32,
    pub iterations: u32,
    /// Seed the trial streams were derived from.
    pub rng_seed: u64,
    pub revenue: MetricSeries,
    pub profit: MetricSeries,
    pub cash_flow: MetricSeries,
    pub roi: MetricSeries,
    pub market_share: MetricSeries,
    pub revenue_thresholds: Thresholds,
    pub profit_thresholds: Thresholds,
    pub roi_buckets: RoiBuckets,
    /// Share of trials with positive final profit (%).
    pub profitability_probability: f64,
    /// Share of trials flagged bankrupt (%).
    pub bankruptcy_probability: f64,
    /// Share of trials flagged high-growth (%).
    pub high_growth_probability: f64,
}

impl AggregateResult {
    /// Series for one metric.
    pub fn series(&self, metric: Metric) -> &MetricSeries {
        match metric {
            Metric::Revenue => &self.revenue,
            Metric::Profit => &self.profit,
            Metric::CashFlow => &self.cash_flow,
            Metric::Roi => &self.roi,
            Metric::MarketShare => &self.market_share,
        }
    }

    /// True when no NaN or infinity appears anywhere in the result.
    pub fn all_finite(&self) -> bool {
        let thresholds = [self.revenue_thresholds, self.profit_thresholds]
            .iter()
            .all(|t| t.low_10th.is_finite() && t.median.is_finite() && t.high_90th.is_finite());
        let scalars = [
            self.profitability_probability,
            self.bankruptcy_probability,
            self.high_growth_probability,
            self.roi_buckets.total(),
        ]
        .iter()
        .all(|v| v.is_finite());
        thresholds && scalars && Metric::ALL.iter().all(|m| self.series(*m).all_finite())
    }
}

/// Validation errors for parameter invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Numeric field must be finite.
    #[error("non-finite value in field {0}")]
    NonFinite(&'static str),
    /// Monetary amounts and headcount must be non-negative.
    #[error("negative value in field {0}")]
    Negative(&'static str),
    /// Market share is a percentage.
    #[error("market share {0} outside [0, 100]")]
    MarketShareOutOfRange(f64),
    /// Retention is the share of customers kept per period.
    #[error("customer retention {0} above 100")]
    RetentionOutOfRange(f64),
}

const NON_NEGATIVE_FIELDS: [&str; 21] = [
    "initial_investment",
    "initial_revenue",
    "debt_level",
    "revenue_growth_volatility",
    "fixed_costs",
    "variable_costs_percentage",
    "r_and_d_percentage",
    "marketing_percentage",
    "customer_retention_rate",
    "market_volatility",
    "competitor_entry_probability",
    "competitor_impact",
    "regulatory_change_probability",
    "regulatory_impact",
    "supply_chain_disruption_probability",
    "supply_chain_impact",
    "funding_probability",
    "funding_amount_mean",
    "credit_score",
    "employee_count",
    "employee_productivity",
];

/// Validate a parameter set before it enters the engine.
///
/// Cash reserves, growth means and inflation may be negative; everything
/// else that is an amount, a rate of occurrence or a headcount may not.
pub fn validate_parameters(p: &ParameterSet) -> Result<(), ValidationError> {
    for (name, value) in p.numeric_fields() {
        if !value.is_finite() {
            return Err(ValidationError::NonFinite(name));
        }
        if value < 0.0 && NON_NEGATIVE_FIELDS.contains(&name) {
            return Err(ValidationError::Negative(name));
        }
    }
    if !(0.0..=100.0).contains(&p.market_share) {
        return Err(ValidationError::MarketShareOutOfRange(p.market_share));
    }
    if p.customer_retention_rate > 100.0 {
        return Err(ValidationError::RetentionOutOfRange(p.customer_retention_rate));
    }
    Ok(())
}

/// Convert an annual percentage rate to a compounding per-period rate.
///
/// `((1 + annual/100)^(1/periods_per_year) - 1) * 100`. Rates at or below
/// -100% map to -100%.
pub fn annual_to_period_rate(annual_pct: f64, periods_per_year: u32) -> f64 {
    let base = (1.0 + annual_pct / 100.0).max(0.0);
    let n = periods_per_year.max(1) as f64;
    (base.powf(1.0 / n) - 1.0) * 100.0
}

/// Division that never yields NaN or infinity.
///
/// Returns `fallback` when the denominator is zero or non-finite, or when the
/// quotient itself is not finite.
pub fn safe_ratio(numerator: f64, denominator: f64, fallback: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        trace!(numerator, denominator, fallback, "degenerate denominator");
        return fallback;
    }
    let q = numerator / denominator;
    if q.is_finite() {
        q
    } else {
        trace!(numerator, denominator, fallback, "non-finite ratio");
        fallback
    }
}

/// Replace NaN or infinity with `fallback`.
pub fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        trace!(value, fallback, "non-finite value replaced");
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_params() -> ParameterSet {
        ParameterSet {
            industry: Industry::SaaS,
            initial_investment: 1_000_000.0,
            initial_revenue: 500_000.0,
            cash_reserves: 400_000.0,
            debt_level: 100_000.0,
            revenue_growth_rate_mean: 5.0,
            revenue_growth_volatility: 10.0,
            fixed_costs: 200_000.0,
            variable_costs_percentage: 30.0,
            r_and_d_percentage: 15.0,
            marketing_percentage: 15.0,
            customer_retention_rate: 85.0,
            market_share: 1.0,
            market_share_growth: 7.5,
            market_growth_rate_mean: 4.0,
            market_volatility: 8.0,
            industry_cyclicality: 2.0,
            seasonality_factor: 0.1,
            competitor_entry_probability: 0.15,
            competitor_impact: 10.0,
            regulatory_change_probability: 0.1,
            regulatory_impact: 10.0,
            supply_chain_disruption_probability: 0.1,
            supply_chain_impact: 15.0,
            funding_rounds: 2,
            funding_probability: 0.5,
            funding_amount_mean: 1_000_000.0,
            credit_score: 700.0,
            cost_inflation_rate: 0.6,
            employee_count: 20.0,
            employee_productivity: 1.0,
        }
    }

    #[test]
    fn parameter_set_roundtrip() {
        let p = sample_params();
        let s = serde_json::to_string(&p).unwrap();
        let back: ParameterSet = serde_json::from_str(&s).unwrap();
        assert_eq!(back, p);
        assert!(s.contains("\"industry\":\"SaaS\""));
    }

    #[test]
    fn categorical_fallbacks() {
        assert_eq!(Industry::parse("biotech"), Industry::Biotech);
        assert_eq!(Industry::parse("Fintech"), Industry::SaaS);
        assert_eq!(SizeTier::parse("ESTABLISHED"), SizeTier::Established);
        assert_eq!(SizeTier::parse("huge"), SizeTier::Startup);
        assert_eq!(MarketCondition::parse("recession"), MarketCondition::Recession);
        assert_eq!(MarketCondition::parse(""), MarketCondition::Normal);
        assert_eq!(Scenario::parse("pessimistic"), Scenario::Pessimistic);
        assert_eq!(Scenario::parse("meh"), Scenario::Neutral);
    }

    #[test]
    fn scenario_serializes_lowercase() {
        let s = serde_json::to_string(&Scenario::Optimistic).unwrap();
        assert_eq!(s, "\"optimistic\"");
    }

    #[test]
    fn validation_accepts_sample_and_rejects_bad_fields() {
        let p = sample_params();
        assert!(validate_parameters(&p).is_ok());

        let mut bad = p.clone();
        bad.initial_revenue = f64::NAN;
        assert_eq!(
            validate_parameters(&bad),
            Err(ValidationError::NonFinite("initial_revenue"))
        );

        let mut bad = p.clone();
        bad.debt_level = -1.0;
        assert_eq!(
            validate_parameters(&bad),
            Err(ValidationError::Negative("debt_level"))
        );

        let mut bad = p.clone();
        bad.market_share = 120.0;
        assert_eq!(
            validate_parameters(&bad),
            Err(ValidationError::MarketShareOutOfRange(120.0))
        );

        let mut bad = p.clone();
        bad.customer_retention_rate = 105.0;
        assert_eq!(
            validate_parameters(&bad),
            Err(ValidationError::RetentionOutOfRange(105.0))
        );

        let mut full = p.clone();
        full.customer_retention_rate = 100.0;
        assert!(validate_parameters(&full).is_ok());

        let mut ok = p;
        ok.cash_reserves = -50_000.0;
        ok.initial_investment = 0.0;
        assert!(validate_parameters(&ok).is_ok());
    }

    #[test]
    fn annual_rate_conversion_matches_compounding() {
        let q = annual_to_period_rate(25.0, PERIODS_PER_YEAR);
        assert!((q - 5.737_126_8).abs() < 1e-6);
        assert_eq!(annual_to_period_rate(0.0, PERIODS_PER_YEAR), 0.0);
        assert_eq!(annual_to_period_rate(-150.0, PERIODS_PER_YEAR), -100.0);
    }

    #[test]
    fn safe_ratio_guards() {
        assert_eq!(safe_ratio(10.0, 4.0, 0.0), 2.5);
        assert_eq!(safe_ratio(10.0, 0.0, 0.0), 0.0);
        assert_eq!(safe_ratio(10.0, f64::NAN, 7.0), 7.0);
        assert_eq!(safe_ratio(f64::MAX, 1e-300, 1.0), 1.0);
        assert_eq!(finite_or(f64::INFINITY, 0.0), 0.0);
    }

    #[test]
    fn roi_bucket_total() {
        let b = RoiBuckets {
            negative: 40.0,
            zero_to_ten: 30.0,
            ten_to_twenty: 20.0,
            twenty_plus: 10.0,
        };
        assert_eq!(b.total(), 100.0);
    }

    proptest! {
        #[test]
        fn period_rate_compounds_back(annual in -90.0f64..300.0) {
            let q = annual_to_period_rate(annual, PERIODS_PER_YEAR);
            let back = ((1.0 + q / 100.0).powi(4) - 1.0) * 100.0;
            prop_assert!((back - annual).abs() < 1e-6);
        }

        #[test]
        fn safe_ratio_always_finite(n in proptest::num::f64::ANY, d in proptest::num::f64::ANY) {
            prop_assert!(safe_ratio(n, d, 0.0).is_finite());
        }
    }
}
