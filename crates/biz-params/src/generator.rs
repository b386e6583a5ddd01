//! Benchmark-driven generation of a complete [`ParameterSet`].
//!
//! Generation stages values in a [`Draft`] keyed by [`Field`] so that the
//! "only adjust what is already set" semantics of the size and market tables
//! hold, then fills what is still missing with industry-scoped defaults and
//! converts annual rates to per-period compounding.

use biz_core::{
    annual_to_period_rate, Industry, MarketCondition, ParameterSet, SizeTier, PERIODS_PER_YEAR,
};
use rand::Rng;
use std::collections::BTreeMap;
use tracing::debug;

/// Average annual salary in USD used to derive fixed costs from headcount.
pub const AVERAGE_SALARY: f64 = 100_000.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Field {
    RevenueGrowthRateMean,
    RevenueGrowthVolatility,
    VariableCostsPercentage,
    FixedCostsBase,
    RAndDPercentage,
    MarketingPercentage,
    CustomerRetentionRate,
    MarketGrowthRateMean,
    IndustryCyclicality,
    MarketVolatility,
    SeasonalityFactor,
    InitialInvestment,
    InitialRevenue,
    CashReserves,
    DebtLevel,
    MarketShare,
    EmployeeCount,
    FundingRounds,
    FundingProbability,
    FundingAmountMean,
    CompetitorEntryProbability,
    SupplyChainDisruptionProbability,
    CreditScore,
    CostInflationRate,
}

#[derive(Clone, Copy, Debug)]
enum Adjustment {
    /// Uniform draw in `[min, max)`.
    Range(f64, f64),
    /// Uniform integer draw in `[min, max]`.
    Count(u32, u32),
    /// Multiplier applied only if the field is already set.
    Scale(f64),
}

use Adjustment::{Count, Range, Scale};
use Field::*;

/// Annual industry benchmarks.
fn industry_table(industry: Industry) -> &'static [(Field, f64)] {
    match industry {
        Industry::SaaS => &[
            (RevenueGrowthRateMean, 25.0),
            (RevenueGrowthVolatility, 10.0),
            (VariableCostsPercentage, 30.0),
            (FixedCostsBase, 800_000.0),
            (RAndDPercentage, 15.0),
            (MarketingPercentage, 15.0),
            (CustomerRetentionRate, 85.0),
            (MarketGrowthRateMean, 20.0),
            (IndustryCyclicality, 2.0),
            (MarketVolatility, 8.0),
        ],
        Industry::Manufacturing => &[
            (RevenueGrowthRateMean, 8.0),
            (RevenueGrowthVolatility, 5.0),
            (VariableCostsPercentage, 60.0),
            (FixedCostsBase, 2_000_000.0),
            (RAndDPercentage, 5.0),
            (MarketingPercentage, 8.0),
            (CustomerRetentionRate, 90.0),
            (MarketGrowthRateMean, 6.0),
            (IndustryCyclicality, 4.0),
            (MarketVolatility, 6.0),
        ],
        Industry::Retail => &[
            (RevenueGrowthRateMean, 10.0),
            (RevenueGrowthVolatility, 8.0),
            (VariableCostsPercentage, 70.0),
            (FixedCostsBase, 1_500_000.0),
            (RAndDPercentage, 2.0),
            (MarketingPercentage, 12.0),
            (CustomerRetentionRate, 70.0),
            (MarketGrowthRateMean, 5.0),
            (IndustryCyclicality, 5.0),
            (MarketVolatility, 9.0),
            (SeasonalityFactor, 0.25),
        ],
        Industry::Biotech => &[
            (RevenueGrowthRateMean, 15.0),
            (RevenueGrowthVolatility, 20.0),
            (VariableCostsPercentage, 40.0),
            (FixedCostsBase, 4_000_000.0),
            (RAndDPercentage, 25.0),
            (MarketingPercentage, 10.0),
            (CustomerRetentionRate, 95.0),
            (MarketGrowthRateMean, 12.0),
            (IndustryCyclicality, 1.0),
            (MarketVolatility, 15.0),
            (SeasonalityFactor, 0.05),
        ],
    }
}

fn size_table(size: SizeTier) -> &'static [(Field, Adjustment)] {
    match size {
        SizeTier::Startup => &[
            (InitialInvestment, Range(500_000.0, 3_000_000.0)),
            (InitialRevenue, Range(100_000.0, 2_000_000.0)),
            (CashReserves, Range(200_000.0, 1_000_000.0)),
            (DebtLevel, Range(0.0, 500_000.0)),
            (RevenueGrowthRateMean, Scale(1.5)),
            (RevenueGrowthVolatility, Scale(1.3)),
            (MarketShare, Range(0.1, 2.0)),
            (EmployeeCount, Range(5.0, 50.0)),
            (FundingRounds, Count(1, 4)),
            (FundingProbability, Range(0.3, 0.7)),
            (FundingAmountMean, Range(500_000.0, 3_000_000.0)),
            (CompetitorEntryProbability, Scale(1.3)),
            (SupplyChainDisruptionProbability, Scale(1.2)),
            (CreditScore, Range(650.0, 750.0)),
        ],
        SizeTier::Growth => &[
            (InitialInvestment, Range(2_000_000.0, 10_000_000.0)),
            (InitialRevenue, Range(1_000_000.0, 10_000_000.0)),
            (CashReserves, Range(500_000.0, 3_000_000.0)),
            (DebtLevel, Range(500_000.0, 3_000_000.0)),
            (RevenueGrowthRateMean, Scale(1.0)),
            (RevenueGrowthVolatility, Scale(1.0)),
            (MarketShare, Range(2.0, 8.0)),
            (EmployeeCount, Range(50.0, 200.0)),
            (FundingRounds, Count(0, 2)),
            (FundingProbability, Range(0.2, 0.5)),
            (FundingAmountMean, Range(2_000_000.0, 10_000_000.0)),
            (CompetitorEntryProbability, Scale(1.0)),
            (SupplyChainDisruptionProbability, Scale(1.0)),
            (CreditScore, Range(680.0, 780.0)),
        ],
        SizeTier::Established => &[
            (InitialInvestment, Range(5_000_000.0, 50_000_000.0)),
            (InitialRevenue, Range(10_000_000.0, 100_000_000.0)),
            (CashReserves, Range(2_000_000.0, 20_000_000.0)),
            (DebtLevel, Range(2_000_000.0, 20_000_000.0)),
            (RevenueGrowthRateMean, Scale(0.6)),
            (RevenueGrowthVolatility, Scale(0.7)),
            (MarketShare, Range(5.0, 25.0)),
            (EmployeeCount, Range(200.0, 1000.0)),
            (FundingRounds, Count(0, 1)),
            (FundingProbability, Range(0.1, 0.3)),
            (FundingAmountMean, Range(5_000_000.0, 30_000_000.0)),
            (CompetitorEntryProbability, Scale(0.8)),
            (SupplyChainDisruptionProbability, Scale(0.9)),
            (CreditScore, Range(700.0, 820.0)),
        ],
    }
}

fn market_table(condition: MarketCondition) -> &'static [(Field, f64)] {
    match condition {
        MarketCondition::Boom => &[
            (RevenueGrowthRateMean, 1.3),
            (MarketGrowthRateMean, 1.4),
            (FundingProbability, 1.3),
            (CompetitorEntryProbability, 1.2),
            (CostInflationRate, 1.1),
        ],
        MarketCondition::Normal => &[
            (RevenueGrowthRateMean, 1.0),
            (MarketGrowthRateMean, 1.0),
            (FundingProbability, 1.0),
            (CompetitorEntryProbability, 1.0),
            (CostInflationRate, 1.0),
        ],
        MarketCondition::Recession => &[
            (RevenueGrowthRateMean, 0.6),
            (MarketGrowthRateMean, 0.4),
            (FundingProbability, 0.5),
            (CompetitorEntryProbability, 0.7),
            (CostInflationRate, 0.8),
        ],
    }
}

/// Share-growth divisor applied to the annual growth mean.
fn share_growth_divisor(size: SizeTier) -> f64 {
    match size {
        SizeTier::Startup => 5.0,
        SizeTier::Growth => 8.0,
        SizeTier::Established => 15.0,
    }
}

#[derive(Debug)]
struct Draft(BTreeMap<Field, f64>);

impl Draft {
    fn seed(table: &[(Field, f64)]) -> Self {
        Self(table.iter().copied().collect())
    }

    fn get(&self, field: Field) -> Option<f64> {
        self.0.get(&field).copied()
    }

    fn value(&self, field: Field) -> f64 {
        self.get(field).unwrap_or(0.0)
    }

    fn set(&mut self, field: Field, value: f64) {
        self.0.insert(field, value);
    }

    fn scale(&mut self, field: Field, factor: f64) {
        if let Some(v) = self.0.get_mut(&field) {
            *v *= factor;
        }
    }

    fn adjust<R: Rng + ?Sized>(&mut self, table: &[(Field, Adjustment)], rng: &mut R) {
        for &(field, adj) in table {
            match adj {
                Range(lo, hi) => self.set(field, rng.gen_range(lo..hi)),
                Count(lo, hi) => self.set(field, rng.gen_range(lo..=hi) as f64),
                Scale(m) => self.scale(field, m),
            }
        }
    }

    fn or_insert_with(&mut self, field: Field, default: impl FnOnce() -> f64) {
        self.0.entry(field).or_insert_with(default);
    }
}

/// Generate a complete parameter set from categorical inputs.
///
/// All draws come from `rng`, so a seeded generator reproduces the same
/// company. Rates in the result are per period (quarterly).
pub fn generate_parameters<R: Rng + ?Sized>(
    industry: Industry,
    size: SizeTier,
    condition: MarketCondition,
    rng: &mut R,
) -> ParameterSet {
    let mut draft = Draft::seed(industry_table(industry));
    draft.adjust(size_table(size), rng);
    for &(field, m) in market_table(condition) {
        draft.scale(field, m);
    }

    let fixed_costs = (draft.value(FixedCostsBase) + draft.value(EmployeeCount) * AVERAGE_SALARY)
        / PERIODS_PER_YEAR as f64;

    draft.or_insert_with(CompetitorEntryProbability, || 0.15);
    let competitor_impact = rng.gen_range(5.0..20.0);
    let regulatory_change_probability = match industry {
        Industry::Biotech => 0.25,
        _ => 0.1,
    };
    let regulatory_impact = match industry {
        Industry::Biotech => rng.gen_range(10.0..30.0),
        _ => rng.gen_range(5.0..15.0),
    };
    draft.or_insert_with(SupplyChainDisruptionProbability, || match industry {
        Industry::Manufacturing | Industry::Retail => 0.2,
        _ => 0.1,
    });
    let supply_chain_impact = rng.gen_range(10.0..25.0);
    draft.or_insert_with(SeasonalityFactor, || 0.1);
    if draft.get(CostInflationRate).is_none() {
        draft.set(CostInflationRate, rng.gen_range(1.5..3.5));
    }
    let market_share_growth = draft.value(RevenueGrowthRateMean) / share_growth_divisor(size);
    let employee_productivity = rng.gen_range(0.8..1.2);

    let params = ParameterSet {
        industry,
        initial_investment: draft.value(InitialInvestment),
        initial_revenue: draft.value(InitialRevenue),
        cash_reserves: draft.value(CashReserves),
        debt_level: draft.value(DebtLevel),
        revenue_growth_rate_mean: annual_to_period_rate(
            draft.value(RevenueGrowthRateMean),
            PERIODS_PER_YEAR,
        ),
        revenue_growth_volatility: draft.value(RevenueGrowthVolatility),
        fixed_costs,
        variable_costs_percentage: draft.value(VariableCostsPercentage),
        r_and_d_percentage: draft.value(RAndDPercentage),
        marketing_percentage: draft.value(MarketingPercentage),
        customer_retention_rate: 100.0
            + annual_to_period_rate(draft.value(CustomerRetentionRate) - 100.0, PERIODS_PER_YEAR),
        market_share: draft.value(MarketShare),
        market_share_growth,
        market_growth_rate_mean: annual_to_period_rate(
            draft.value(MarketGrowthRateMean),
            PERIODS_PER_YEAR,
        ),
        market_volatility: draft.value(MarketVolatility),
        industry_cyclicality: draft.value(IndustryCyclicality),
        seasonality_factor: draft.value(SeasonalityFactor),
        competitor_entry_probability: draft.value(CompetitorEntryProbability),
        competitor_impact,
        regulatory_change_probability,
        regulatory_impact,
        supply_chain_disruption_probability: draft.value(SupplyChainDisruptionProbability),
        supply_chain_impact,
        funding_rounds: draft.value(FundingRounds) as u32,
        funding_probability: draft.value(FundingProbability),
        funding_amount_mean: draft.value(FundingAmountMean),
        credit_score: draft.value(CreditScore),
        cost_inflation_rate: annual_to_period_rate(
            draft.value(CostInflationRate),
            PERIODS_PER_YEAR,
        ),
        employee_count: draft.value(EmployeeCount),
        employee_productivity,
    };
    debug!(
        %industry,
        %size,
        %condition,
        initial_revenue = params.initial_revenue,
        fixed_costs = params.fixed_costs,
        "generated company parameters"
    );
    params
}

/// Like [`generate_parameters`] but from free-form tags, with fallbacks for
/// anything unrecognized.
pub fn generate_from_tags<R: Rng + ?Sized>(
    industry: &str,
    size: &str,
    condition: &str,
    rng: &mut R,
) -> ParameterSet {
    generate_parameters(
        Industry::parse(industry),
        SizeTier::parse(size),
        MarketCondition::parse(condition),
        rng,
    )
}
