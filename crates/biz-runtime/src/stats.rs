//! Cross-trial aggregation.

use biz_core::{
    AggregateResult, Metric, MetricSeries, RoiBuckets, Scenario, Thresholds, TrialResult,
};

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation around `mean`; 0 for fewer than two values.
pub fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Percentile of an ascending slice with linear interpolation between the
/// closest ranks. `pct` is in [0, 100].
pub fn percentile(sorted: &[f64], pct: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = pct.clamp(0.0, 100.0) / 100.0 * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            let frac = rank - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

fn sorted(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(f64::total_cmp);
    values
}

/// `count / total` in percent; 0 when there are no trials.
pub fn share_pct(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64 * 100.0
}

fn thresholds(sorted: &[f64]) -> Thresholds {
    Thresholds {
        low_10th: percentile(sorted, 10.0),
        median: percentile(sorted, 50.0),
        high_90th: percentile(sorted, 90.0),
    }
}

fn series(trials: &[TrialResult], periods: usize, metric: Metric) -> MetricSeries {
    let mut out = MetricSeries {
        mean: Vec::with_capacity(periods),
        std: Vec::with_capacity(periods),
        p10: Vec::with_capacity(periods),
        p90: Vec::with_capacity(periods),
    };
    for t in 0..periods {
        let column: Vec<f64> = trials
            .iter()
            .map(|r| r.periods.get(t).map_or(0.0, |m| m.get(metric)))
            .collect();
        let m = mean(&column);
        out.mean.push(m);
        out.std.push(std_dev(&column, m));
        let column = sorted(column);
        out.p10.push(percentile(&column, 10.0));
        out.p90.push(percentile(&column, 90.0));
    }
    out
}

fn final_values(trials: &[TrialResult], metric: Metric) -> Vec<f64> {
    trials
        .iter()
        .map(|r| r.final_period().map_or(0.0, |m| m.get(metric)))
        .collect()
}

fn roi_buckets(final_roi: &[f64]) -> RoiBuckets {
    let total = final_roi.len();
    let count = |pred: &dyn Fn(f64) -> bool| final_roi.iter().filter(|&&v| pred(v)).count();
    RoiBuckets {
        negative: share_pct(count(&|v| v < 0.0), total),
        zero_to_ten: share_pct(count(&|v| (0.0..10.0).contains(&v)), total),
        ten_to_twenty: share_pct(count(&|v| (10.0..20.0).contains(&v)), total),
        twenty_plus: share_pct(count(&|v| v >= 20.0), total),
    }
}

/// Reduce a full set of trials into the run's aggregate statistics.
pub fn aggregate(
    trials: &[TrialResult],
    periods: u32,
    scenario: Scenario,
    rng_seed: u64,
) -> AggregateResult {
    let n = trials.len();
    let p = periods as usize;
    let final_revenue = sorted(final_values(trials, Metric::Revenue));
    let final_profit = sorted(final_values(trials, Metric::Profit));
    let final_roi = final_values(trials, Metric::Roi);

    AggregateResult {
        scenario,
        periods,
        iterations: n as u32,
        rng_seed,
        revenue: series(trials, p, Metric::Revenue),
        profit: series(trials, p, Metric::Profit),
        cash_flow: series(trials, p, Metric::CashFlow),
        roi: series(trials, p, Metric::Roi),
        market_share: series(trials, p, Metric::MarketShare),
        revenue_thresholds: thresholds(&final_revenue),
        profit_thresholds: thresholds(&final_profit),
        roi_buckets: roi_buckets(&final_roi),
        profitability_probability: share_pct(final_profit.iter().filter(|&&v| v > 0.0).count(), n),
        bankruptcy_probability: share_pct(trials.iter().filter(|r| r.bankrupt).count(), n),
        high_growth_probability: share_pct(trials.iter().filter(|r| r.high_growth).count(), n),
    }
}
