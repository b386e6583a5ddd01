//! Trial engine: one stochastic multi-period trajectory of one company.
//!
//! Every trial works on a private copy of the parameter set because
//! competitor entry, regulatory change, supply-chain disruption and forced
//! cost cuts mutate it for the remainder of the trial.

use biz_core::{
    finite_or, safe_ratio, ParameterSet, PeriodMetrics, TrialResult, PERIODS_PER_YEAR,
};
use rand::Rng;
use rand_distr::StandardNormal;
use std::f64::consts::TAU;
use tracing::trace;

/// Heuristic constants of the state machine.
pub mod consts {
    /// Economic cycle length in periods.
    pub const ECON_CYCLE_LENGTH: f64 = 16.0;
    pub const ECON_CYCLE_AMPLITUDE: f64 = 0.2;
    /// Industry cycle period is `MARKET_CYCLE_BASE + cyclicality`.
    pub const MARKET_CYCLE_BASE: f64 = 6.0;
    pub const MARKET_CYCLE_AMPLITUDE: f64 = 0.2;

    pub const MAX_SHARE_CEILING: f64 = 80.0;
    pub const SHARE_CEILING_MULTIPLE: f64 = 5.0;
    pub const S_CURVE_STEEPNESS: f64 = 10.0;
    pub const S_CURVE_MIDPOINT: f64 = 0.5;
    pub const CUSTOMER_VALUE_DRIFT_MEAN: f64 = 0.005;
    pub const CUSTOMER_VALUE_DRIFT_STD: f64 = 0.002;
    /// Lowest growth rate a single period can produce.
    pub const GROWTH_FLOOR: f64 = -0.95;

    pub const COMPETITOR_MARKETING_BOOST: f64 = 1.2;
    pub const COMPETITOR_RECOVERY_PERIODS: u32 = 4;
    pub const SUPPLY_RETENTION_FACTOR: f64 = 0.95;
    pub const SUPPLY_RECOVERY_PERIODS: u32 = 2;

    pub const ANTITRUST_SHARE: f64 = 50.0;
    pub const ANTITRUST_PROBABILITY: f64 = 0.2;
    pub const ANTITRUST_FACTOR: f64 = 0.9;

    /// Revenue per period above which facility expansion may kick in.
    pub const FACILITY_THRESHOLD: f64 = 3_000_000.0;
    pub const FACILITY_JUMP: f64 = 1.2;
    pub const FACILITY_STEP_PER_PERIOD: f64 = 0.01;
    /// Headcount grows at this share of revenue growth.
    pub const HIRING_RATIO: f64 = 0.7;
    pub const SCALE_DISCOUNT_SLOPE: f64 = 0.05;
    pub const SCALE_DISCOUNT_FLOOR: f64 = 0.8;

    pub const MIN_FUNDING_GAP: u32 = 4;
    pub const RUNWAY_TRIGGER: f64 = 3.0;
    pub const RUNWAY_WHEN_PROFITABLE: f64 = 8.0;
    pub const FUNDING_GROWTH_TRIGGER: f64 = 0.1;
    pub const FUNDING_SHARE_RATIO_TRIGGER: f64 = 0.5;
    pub const BASE_VALUATION_MULTIPLE: f64 = 4.0;
    pub const MIN_VALUATION_MULTIPLE: f64 = 1.0;
    pub const FUNDING_FRACTION_MIN: f64 = 0.1;
    pub const FUNDING_FRACTION_MAX: f64 = 0.3;

    /// 6% a year.
    pub const QUARTERLY_INTEREST: f64 = 0.015;
    pub const DEBT_PAYDOWN_SHARE: f64 = 0.05;
    pub const PROFIT_PAYDOWN_SHARE: f64 = 0.2;
    pub const MIN_DEBT_PAYMENT: f64 = 0.02;
    pub const MAX_DEBT_TO_REVENUE: f64 = 2.0;
    pub const MIN_CREDIT_SCORE: f64 = 650.0;
    pub const CREDIT_SCORE_REFERENCE: f64 = 750.0;
    pub const BORROW_BASE_PREMIUM: f64 = 1.1;
    pub const DEBT_LOAD_PREMIUM: f64 = 0.5;
    /// Share of emergency debt that reaches the cash balance after fees.
    pub const USABLE_DEBT_SHARE: f64 = 0.9;

    pub const CUT_MARKETING: f64 = 0.8;
    pub const CUT_R_AND_D: f64 = 0.7;
    pub const CUT_FIXED: f64 = 0.9;

    pub const BANKRUPTCY_DEBT_MULTIPLE: f64 = 1.5;
    pub const HIGH_GROWTH_MULTIPLE: f64 = 3.0;
}

use consts::*;

/// Mutable per-trial state.
#[derive(Debug)]
struct TrialState {
    revenue: f64,
    cash: f64,
    debt: f64,
    market_share: f64,
    market_size: f64,
    customer_count: f64,
    competitor_entry: Option<u32>,
    regulatory_hit: bool,
    /// Periods in which a still-active disruption started.
    disruptions: Vec<u32>,
    funding_rounds_left: u32,
    last_funding: Option<u32>,
}

struct Trial {
    params: ParameterSet,
    state: TrialState,
    periods: u32,
    share_ceiling: f64,
    base_retention: f64,
    revenue_per_customer: f64,
    cycle_phase: f64,
}

fn normal<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    let z: f64 = rng.sample(StandardNormal);
    mean + std_dev.max(0.0) * z
}

/// Evenly spaced seasonal phase across the horizon, `amplitude * sin(...)`.
fn seasonality(t: u32, periods: u32, amplitude: f64) -> f64 {
    if periods < 2 {
        return 0.0;
    }
    let span = TAU * periods as f64 / PERIODS_PER_YEAR as f64;
    amplitude * (span * t as f64 / (periods - 1) as f64).sin()
}

impl Trial {
    fn new<R: Rng + ?Sized>(params: &ParameterSet, periods: u32, rng: &mut R) -> Self {
        let params = params.clone();
        let revenue_per_customer = params.industry.revenue_per_customer();
        let state = TrialState {
            revenue: params.initial_revenue,
            cash: params.cash_reserves,
            debt: params.debt_level,
            market_share: params.market_share,
            market_size: safe_ratio(params.initial_revenue, params.market_share / 100.0, 0.0),
            customer_count: safe_ratio(params.initial_revenue, revenue_per_customer, 0.0),
            competitor_entry: None,
            regulatory_hit: false,
            disruptions: Vec::new(),
            funding_rounds_left: params.funding_rounds,
            last_funding: None,
        };
        Self {
            share_ceiling: MAX_SHARE_CEILING.min(params.market_share * SHARE_CEILING_MULTIPLE),
            base_retention: params.customer_retention_rate / 100.0,
            revenue_per_customer,
            cycle_phase: rng.gen_range(0.0..ECON_CYCLE_LENGTH),
            params,
            state,
            periods,
        }
    }

    fn per_period(&self, horizon_probability: f64) -> f64 {
        safe_ratio(horizon_probability, self.periods as f64, 0.0)
    }

    fn economic_cycle(&self, t: u32) -> f64 {
        let phase = (t as f64 + self.cycle_phase) % ECON_CYCLE_LENGTH;
        1.0 + ECON_CYCLE_AMPLITUDE * (TAU * phase / ECON_CYCLE_LENGTH).sin()
    }

    fn market_growth<R: Rng + ?Sized>(&mut self, t: u32, econ: f64, rng: &mut R) -> f64 {
        let cycle_len = MARKET_CYCLE_BASE + self.params.industry_cyclicality;
        let market_cycle = 1.0 + MARKET_CYCLE_AMPLITUDE * safe_ratio(t as f64, cycle_len, 0.0).sin();
        let growth = normal(
            rng,
            self.params.market_growth_rate_mean * market_cycle * econ / 100.0,
            self.params.market_volatility / 100.0,
        );
        self.state.market_size *= 1.0 + growth;
        growth
    }

    fn risk_events<R: Rng + ?Sized>(&mut self, t: u32, rng: &mut R) {
        let competitor_roll: f64 = rng.gen();
        if self.state.competitor_entry.is_none()
            && competitor_roll < self.per_period(self.params.competitor_entry_probability)
        {
            self.state.competitor_entry = Some(t);
            self.state.market_share *= 1.0 - self.params.competitor_impact / 100.0;
            self.params.marketing_percentage *= COMPETITOR_MARKETING_BOOST;
            trace!(t, share = self.state.market_share, "competitor entered");
        }
        if let Some(entry) = self.state.competitor_entry {
            let since = t - entry;
            if since > 0 && since <= COMPETITOR_RECOVERY_PERIODS {
                let recovery = self.params.marketing_percentage / 10.0 * since as f64
                    / COMPETITOR_RECOVERY_PERIODS as f64;
                self.state.market_share *= 1.0 + recovery / 100.0;
            }
        }

        let regulatory_roll: f64 = rng.gen();
        if !self.state.regulatory_hit
            && regulatory_roll < self.per_period(self.params.regulatory_change_probability)
        {
            self.state.regulatory_hit = true;
            let impact = self.params.regulatory_impact / 100.0;
            self.state.revenue *= 1.0 - impact;
            self.params.fixed_costs *= 1.0 + impact / 2.0;
            trace!(t, impact, "regulatory change");
        }

        let supply_roll: f64 = rng.gen();
        if supply_roll < self.per_period(self.params.supply_chain_disruption_probability) {
            self.state.disruptions.push(t);
            self.state.revenue *= 1.0 - self.params.supply_chain_impact / 100.0;
            self.params.customer_retention_rate *= SUPPLY_RETENTION_FACTOR;
            trace!(t, "supply chain disruption");
        }
        let active = self.state.disruptions.len();
        self.state
            .disruptions
            .retain(|&start| t - start < SUPPLY_RECOVERY_PERIODS);
        for _ in self.state.disruptions.len()..active {
            self.params.customer_retention_rate /= SUPPLY_RETENTION_FACTOR;
        }
    }

    /// Customer-driven growth with logistic dampening near the share ceiling.
    fn growth_rate<R: Rng + ?Sized>(
        &mut self,
        t: u32,
        econ: f64,
        market_growth: f64,
        share_ratio: f64,
        rng: &mut R,
    ) -> f64 {
        let saturation = (1.0 - share_ratio).clamp(0.0, 1.0);
        let dampening = 1.0 / (1.0 + (S_CURVE_STEEPNESS * (share_ratio - S_CURVE_MIDPOINT)).exp());

        let organic = normal(
            rng,
            self.params.revenue_growth_rate_mean / 100.0,
            self.params.revenue_growth_volatility / 100.0,
        );
        let retained = self.state.customer_count * self.params.customer_retention_rate / 100.0;
        let acquisition =
            (1.0 - self.base_retention + organic) * saturation * dampening * (1.0 + market_growth);
        let acquired = self.state.customer_count * acquisition;
        self.state.customer_count = (retained + acquired).max(0.0);

        let implied_customers = safe_ratio(self.state.revenue, self.revenue_per_customer, 0.0);
        let from_customers = safe_ratio(self.state.customer_count, implied_customers, 1.0) - 1.0;
        let value_drift = normal(rng, CUSTOMER_VALUE_DRIFT_MEAN, CUSTOMER_VALUE_DRIFT_STD);

        let growth = (from_customers + value_drift) * econ
            + seasonality(t, self.periods, self.params.seasonality_factor);
        finite_or(growth, 0.0).max(GROWTH_FLOOR)
    }

    fn update_share<R: Rng + ?Sized>(&mut self, share_ratio: f64, rng: &mut R) {
        let saturation = (1.0 - share_ratio).clamp(0.0, 1.0);
        let growth = self.params.market_share_growth / 100.0 * saturation;
        self.state.market_share = self
            .share_ceiling
            .min(self.state.market_share * (1.0 + growth));
        if self.state.market_share > ANTITRUST_SHARE && rng.gen::<f64>() < ANTITRUST_PROBABILITY {
            self.state.market_share *= ANTITRUST_FACTOR;
        }
    }

    fn fixed_costs(&self, t: u32, growth: f64) -> f64 {
        let revenue = self.state.revenue;
        let elapsed = t as f64;
        if revenue > FACILITY_THRESHOLD && revenue / FACILITY_THRESHOLD > elapsed + 1.0 {
            self.params.fixed_costs * (FACILITY_JUMP + FACILITY_STEP_PER_PERIOD * elapsed)
        } else {
            let inflation = (1.0 + self.params.cost_inflation_rate / 100.0).powi(t as i32);
            let hiring = (growth * HIRING_RATIO).max(0.0);
            self.params.fixed_costs * inflation * (1.0 + hiring)
        }
    }

    fn variable_costs(&self) -> f64 {
        let scale_up = safe_ratio(self.state.revenue, self.params.initial_revenue, 1.0) - 1.0;
        let discount = (1.0 - scale_up * SCALE_DISCOUNT_SLOPE).max(SCALE_DISCOUNT_FLOOR);
        self.state.revenue * self.params.variable_costs_percentage / 100.0 * discount
    }

    fn funding<R: Rng + ?Sized>(
        &mut self,
        t: u32,
        profit: f64,
        growth: f64,
        share_ratio: f64,
        rng: &mut R,
    ) -> f64 {
        let runway = if profit < 0.0 {
            safe_ratio(self.state.cash, -profit, 0.0)
        } else {
            RUNWAY_WHEN_PROFITABLE
        };
        let triggered = runway < RUNWAY_TRIGGER
            || (growth > FUNDING_GROWTH_TRIGGER && share_ratio < FUNDING_SHARE_RATIO_TRIGGER);
        let spaced = self
            .state
            .last_funding
            .map_or(true, |last| t - last >= MIN_FUNDING_GAP);
        if self.state.funding_rounds_left == 0
            || !spaced
            || !triggered
            || rng.gen::<f64>() >= self.per_period(self.params.funding_probability)
        {
            return 0.0;
        }
        let multiple = (BASE_VALUATION_MULTIPLE + growth * 100.0).max(MIN_VALUATION_MULTIPLE);
        let valuation = self.state.revenue * PERIODS_PER_YEAR as f64 * multiple;
        let amount = valuation * rng.gen_range(FUNDING_FRACTION_MIN..FUNDING_FRACTION_MAX);
        self.state.funding_rounds_left -= 1;
        self.state.last_funding = Some(t);
        trace!(t, amount, valuation, "funding round closed");
        amount
    }

    /// Accrue interest and pay down principal; returns the payment.
    fn service_debt(&mut self, profit: f64) -> f64 {
        let debt = self.state.debt;
        let interest = debt * QUARTERLY_INTEREST;
        let payment = if profit > 0.0 {
            debt.min((debt * DEBT_PAYDOWN_SHARE).max(profit * PROFIT_PAYDOWN_SHARE))
        } else {
            debt * MIN_DEBT_PAYMENT
        };
        self.state.debt = (debt - payment + interest).max(0.0);
        payment
    }

    /// Emergency financing when cash runs out, or forced cost cuts.
    fn cover_shortfall(&mut self, t: u32) {
        if self.state.cash >= 0.0 {
            return;
        }
        let score = self.params.credit_score;
        let revenue = self.state.revenue;
        if self.state.debt < revenue * MAX_DEBT_TO_REVENUE && score > MIN_CREDIT_SCORE {
            let score_factor = (score / CREDIT_SCORE_REFERENCE).min(1.0);
            let premium = (BORROW_BASE_PREMIUM - score_factor)
                + safe_ratio(self.state.debt, revenue, 0.0) * DEBT_LOAD_PREMIUM;
            let borrowed = self.state.cash.abs() * (BORROW_BASE_PREMIUM + premium);
            self.state.debt += borrowed;
            self.state.cash += borrowed * USABLE_DEBT_SHARE;
            trace!(t, borrowed, "emergency debt financing");
        } else {
            self.params.marketing_percentage *= CUT_MARKETING;
            self.params.r_and_d_percentage *= CUT_R_AND_D;
            self.params.fixed_costs *= CUT_FIXED;
            self.state.cash = 0.0;
            trace!(t, "financing unavailable, costs cut");
        }
    }

    fn step<R: Rng + ?Sized>(&mut self, t: u32, rng: &mut R) -> PeriodMetrics {
        let econ = self.economic_cycle(t);
        let market_growth = self.market_growth(t, econ, rng);
        self.risk_events(t, rng);

        let share_ratio = safe_ratio(self.state.market_share, self.share_ceiling, 1.0);
        let growth = self.growth_rate(t, econ, market_growth, share_ratio, rng);
        self.update_share(share_ratio, rng);
        self.state.revenue *= 1.0 + growth;

        let revenue = self.state.revenue;
        let fixed = self.fixed_costs(t, growth);
        let variable = self.variable_costs();
        let r_and_d = revenue * self.params.r_and_d_percentage / 100.0;
        let marketing = revenue * self.params.marketing_percentage / 100.0;
        let profit = revenue - fixed - variable - r_and_d - marketing;

        let funding = self.funding(t, profit, growth, share_ratio, rng);
        let payment = self.service_debt(profit);
        let cash_flow = profit - payment + funding;
        self.state.cash += cash_flow;
        self.cover_shortfall(t);

        let quarterly_investment = self.params.initial_investment / PERIODS_PER_YEAR as f64;
        let roi = if self.params.initial_investment > 0.0 {
            safe_ratio(profit, quarterly_investment, 0.0) * 100.0
        } else {
            0.0
        };

        PeriodMetrics {
            revenue: finite_or(revenue, 0.0),
            profit: finite_or(profit, 0.0),
            cash_flow: finite_or(cash_flow, 0.0),
            roi: finite_or(roi, 0.0),
            market_share: finite_or(self.state.market_share, 0.0),
        }
    }

    fn finish(self, periods: Vec<PeriodMetrics>) -> TrialResult {
        let state = &self.state;
        let bankrupt = state.cash <= 0.0
            && state.debt > self.params.initial_investment * BANKRUPTCY_DEBT_MULTIPLE;
        let high_growth = state.revenue > self.params.initial_revenue * HIGH_GROWTH_MULTIPLE;
        trace!(
            revenue = state.revenue,
            cash = state.cash,
            debt = state.debt,
            market_size = state.market_size,
            bankrupt,
            high_growth,
            "trial finished"
        );
        TrialResult {
            periods,
            bankrupt,
            high_growth,
        }
    }
}

/// Run one trial of `periods` quarters.
///
/// `params` should already carry any scenario overlay; it is cloned so the
/// caller's copy is never touched.
pub fn run_trial<R: Rng + ?Sized>(params: &ParameterSet, periods: u32, rng: &mut R) -> TrialResult {
    let mut trial = Trial::new(params, periods, rng);
    let mut recorded = Vec::with_capacity(periods as usize);
    for t in 0..periods {
        recorded.push(trial.step(t, rng));
    }
    trial.finish(recorded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    #[test]
    fn records_one_entry_per_period() {
        let r = run_trial(&fixture(), 12, &mut rng(1));
        assert_eq!(r.periods.len(), 12);
        assert!(r
            .periods
            .iter()
            .all(|m| m.revenue.is_finite() && m.profit.is_finite() && m.roi.is_finite()));
    }

    #[test]
    fn caller_params_are_untouched() {
        let mut p = fixture();
        p.competitor_entry_probability = 20.0;
        p.regulatory_change_probability = 20.0;
        p.supply_chain_disruption_probability = 20.0;
        let snapshot = p.clone();
        for seed in 0..20 {
            let _ = run_trial(&p, 10, &mut rng(seed));
        }
        assert_eq!(p, snapshot);
    }

    #[test]
    fn zero_investment_means_zero_roi() {
        let mut p = fixture();
        p.initial_investment = 0.0;
        let r = run_trial(&p, 8, &mut rng(3));
        assert!(r.periods.iter().all(|m| m.roi == 0.0));
    }

    #[test]
    fn zero_periods_is_empty() {
        let r = run_trial(&fixture(), 0, &mut rng(4));
        assert!(r.periods.is_empty());
        assert!(r.final_period().is_none());
    }

    #[test]
    fn same_seed_same_trajectory() {
        let p = fixture();
        assert_eq!(run_trial(&p, 16, &mut rng(9)), run_trial(&p, 16, &mut rng(9)));
    }

    #[test]
    fn share_never_exceeds_ceiling_without_competitor() {
        let mut p = fixture();
        p.competitor_entry_probability = 0.0;
        p.market_share_growth = 40.0;
        let ceiling = MAX_SHARE_CEILING.min(p.market_share * SHARE_CEILING_MULTIPLE);
        for seed in 0..10 {
            let r = run_trial(&p, 20, &mut rng(seed));
            assert!(r.periods.iter().all(|m| m.market_share <= ceiling + 1e-9));
        }
    }

    #[test]
    fn degenerate_company_stays_finite() {
        let mut p = fixture();
        p.initial_revenue = 0.0;
        p.market_share = 0.0;
        p.cash_reserves = 0.0;
        p.credit_score = 0.0;
        let r = run_trial(&p, 12, &mut rng(5));
        assert!(r.periods.iter().all(|m| m.revenue.is_finite()
            && m.profit.is_finite()
            && m.cash_flow.is_finite()
            && m.roi.is_finite()
            && m.market_share.is_finite()));
    }

    #[test]
    fn crushing_costs_without_credit_end_bankrupt() {
        let mut p = fixture();
        p.fixed_costs = p.initial_revenue * 10.0;
        p.credit_score = 500.0;
        p.funding_rounds = 0;
        p.debt_level = p.initial_investment * 3.0;
        let r = run_trial(&p, 8, &mut rng(6));
        assert!(r.bankrupt);
        assert!(!r.high_growth);
    }

    /// Trial over `periods` quarters with every risk event switched off.
    fn quiet_trial(mut p: ParameterSet, periods: u32) -> (Trial, ChaCha8Rng) {
        p.competitor_entry_probability = 0.0;
        p.regulatory_change_probability = 0.0;
        p.supply_chain_disruption_probability = 0.0;
        let mut r = rng(21);
        let trial = Trial::new(&p, periods, &mut r);
        (trial, r)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * b.abs().max(1.0)
    }

    #[test]
    fn competitor_entry_cuts_share_then_recovers() {
        let (mut trial, mut r) = quiet_trial(fixture(), 10);
        trial.params.competitor_entry_probability = 10.0;
        trial.risk_events(0, &mut r);
        assert_eq!(trial.state.competitor_entry, Some(0));
        let mut expected = 1.0 * (1.0 - 10.0 / 100.0);
        assert!(close(trial.state.market_share, expected));
        assert!(close(trial.params.marketing_percentage, 15.0 * 1.2));

        for t in 1..=6 {
            trial.risk_events(t, &mut r);
            if t <= COMPETITOR_RECOVERY_PERIODS {
                let recovery = 18.0 / 10.0 * t as f64 / 4.0;
                expected *= 1.0 + recovery / 100.0;
            }
            assert!(close(trial.state.market_share, expected), "period {t}");
        }
        // Entry happens once, so the marketing boost is not compounded.
        assert!(close(trial.params.marketing_percentage, 18.0));
    }

    #[test]
    fn regulatory_change_hits_once() {
        let (mut trial, mut r) = quiet_trial(fixture(), 8);
        trial.params.regulatory_change_probability = 8.0;
        trial.risk_events(0, &mut r);
        assert!(close(trial.state.revenue, 500_000.0 * 0.9));
        assert!(close(trial.params.fixed_costs, 200_000.0 * (1.0 + 10.0 / 200.0)));
        trial.risk_events(1, &mut r);
        assert!(close(trial.state.revenue, 450_000.0));
        assert!(close(trial.params.fixed_costs, 210_000.0));
    }

    #[test]
    fn disruption_restores_retention_after_two_periods() {
        let (mut trial, mut r) = quiet_trial(fixture(), 8);
        trial.params.supply_chain_disruption_probability = 8.0;
        trial.risk_events(0, &mut r);
        assert!(close(trial.state.revenue, 500_000.0 * 0.85));
        trial.params.supply_chain_disruption_probability = 0.0;
        trial.risk_events(1, &mut r);
        assert!(close(trial.params.customer_retention_rate, 96.0 * 0.95));
        trial.risk_events(2, &mut r);
        assert!(close(trial.params.customer_retention_rate, 96.0));
        assert!(trial.state.disruptions.is_empty());
    }

    #[test]
    fn back_to_back_disruptions_unwind_in_order() {
        let (mut trial, mut r) = quiet_trial(fixture(), 8);
        trial.params.supply_chain_disruption_probability = 8.0;
        trial.risk_events(0, &mut r);
        trial.risk_events(1, &mut r);
        assert!(close(trial.params.customer_retention_rate, 96.0 * 0.95 * 0.95));
        trial.params.supply_chain_disruption_probability = 0.0;
        trial.risk_events(2, &mut r);
        assert!(close(trial.params.customer_retention_rate, 96.0 * 0.95));
        trial.risk_events(3, &mut r);
        assert!(close(trial.params.customer_retention_rate, 96.0));
    }

    #[test]
    fn facility_expansion_steps_fixed_costs() {
        let (mut trial, _) = quiet_trial(fixture(), 8);
        trial.state.revenue = 7_000_000.0;
        assert!(close(trial.fixed_costs(1, 0.1), 200_000.0 * (1.2 + 0.01)));
        // 7M / 3M is not above t + 1 = 3: smooth inflation path with hiring.
        let smooth = 200_000.0 * 1.006_f64.powi(2) * (1.0 + 0.7 * 0.1);
        assert!(close(trial.fixed_costs(2, 0.1), smooth));

        trial.state.revenue = 2_900_000.0;
        assert!(close(trial.fixed_costs(0, 0.1), 200_000.0 * 1.07));
        assert!(close(trial.fixed_costs(0, -0.2), 200_000.0));
    }

    #[test]
    fn antitrust_only_above_half_the_market() {
        let mut cut = 0;
        for seed in 0..200 {
            let (mut trial, _) = quiet_trial(fixture(), 8);
            let mut r = rng(seed);
            trial.params.market_share_growth = 0.0;
            trial.share_ceiling = 80.0;
            trial.state.market_share = 60.0;
            trial.update_share(0.75, &mut r);
            let share = trial.state.market_share;
            assert!(share == 60.0 || close(share, 60.0 * ANTITRUST_FACTOR));
            if share < 60.0 {
                cut += 1;
            }

            trial.state.market_share = 40.0;
            trial.update_share(0.5, &mut r);
            assert_eq!(trial.state.market_share, 40.0);
        }
        assert!(cut > 0 && cut < 200, "cut {cut} of 200");
    }

    #[test]
    fn funding_rounds_are_spaced() {
        let (mut trial, mut r) = quiet_trial(fixture(), 8);
        trial.params.funding_probability = 8.0;
        trial.state.cash = 0.0;
        let raised: Vec<f64> = (0..10)
            .map(|t| trial.funding(t, -1_000.0, 0.0, 0.1, &mut r))
            .collect();
        let closed: Vec<u32> = (0..10).filter(|&t| raised[t as usize] > 0.0).collect();
        // Two rounds available, four periods apart.
        assert_eq!(closed, vec![0, 4]);
        // revenue x 4 quarters x multiple 4, times a 10-30% stake.
        let valuation = 500_000.0 * 4.0 * 4.0;
        assert!(raised[0] >= valuation * 0.1 && raised[0] < valuation * 0.3);
        assert_eq!(trial.state.funding_rounds_left, 0);
    }

    #[test]
    fn debt_service_follows_profit() {
        let (mut trial, _) = quiet_trial(fixture(), 8);
        assert!(close(trial.service_debt(1_000_000.0), 100_000.0));
        assert!(close(trial.state.debt, 1_500.0));

        trial.state.debt = 100_000.0;
        assert!(close(trial.service_debt(10_000.0), 5_000.0));
        assert!(close(trial.state.debt, 100_000.0 - 5_000.0 + 1_500.0));

        trial.state.debt = 100_000.0;
        assert!(close(trial.service_debt(-1.0), 2_000.0));
        assert!(close(trial.state.debt, 99_500.0));
    }

    #[test]
    fn shortfall_borrows_when_credit_allows() {
        let (mut trial, _) = quiet_trial(fixture(), 8);
        trial.state.cash = -10_000.0;
        trial.cover_shortfall(3);
        let premium = (1.1 - 700.0 / 750.0) + 100_000.0 / 500_000.0 * 0.5;
        let borrowed = 10_000.0 * (1.1 + premium);
        assert!(close(trial.state.debt, 100_000.0 + borrowed));
        assert!(close(trial.state.cash, -10_000.0 + borrowed * 0.9));
        assert!(close(trial.params.marketing_percentage, 15.0));
    }

    #[test]
    fn shortfall_cuts_costs_without_credit() {
        let mut p = fixture();
        p.credit_score = 600.0;
        let (mut trial, _) = quiet_trial(p, 8);
        trial.state.cash = -10_000.0;
        trial.cover_shortfall(3);
        assert_eq!(trial.state.cash, 0.0);
        assert_eq!(trial.state.debt, 100_000.0);
        assert!(close(trial.params.marketing_percentage, 15.0 * 0.8));
        assert!(close(trial.params.r_and_d_percentage, 15.0 * 0.7));
        assert!(close(trial.params.fixed_costs, 200_000.0 * 0.9));

        // Positive cash leaves everything alone.
        trial.state.cash = 5.0;
        trial.cover_shortfall(4);
        assert!(close(trial.params.fixed_costs, 180_000.0));
    }

    #[test]
    fn seasonality_is_zero_for_single_period() {
        assert_eq!(seasonality(0, 1, 0.3), 0.0);
        assert_eq!(seasonality(0, 20, 0.3), 0.0);
        assert!(seasonality(1, 20, 0.3).abs() <= 0.3);
    }
}
