#![deny(warnings)]

//! Headless CLI: generate a company, run the Monte Carlo simulation and
//! print a KPI summary or the full result as JSON.

use anyhow::{bail, Context, Result};
use biz_core::{AggregateResult, ParameterSet};
use biz_runtime::{run_batch, run_with_overlay, Outlook, SimulationPlan};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::atomic::AtomicBool;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    config: Option<String>,
    industry: Option<String>,
    size: Option<String>,
    market: Option<String>,
    scenario: Option<String>,
    periods: Option<u32>,
    iterations: Option<u32>,
    seed: Option<u64>,
    batch: Option<u32>,
    json: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => args.config = it.next(),
            "--industry" => args.industry = it.next(),
            "--size" => args.size = it.next(),
            "--market" => args.market = it.next(),
            "--scenario" => args.scenario = it.next(),
            "--periods" => args.periods = Some(number(&arg, it.next())?),
            "--iterations" => args.iterations = Some(number(&arg, it.next())?),
            "--seed" => args.seed = Some(number(&arg, it.next())?),
            "--batch" => args.batch = Some(number(&arg, it.next())?),
            "--json" => args.json = true,
            other => bail!("unknown argument {other}"),
        }
    }
    Ok(args)
}

fn number<T: std::str::FromStr>(flag: &str, value: Option<String>) -> Result<T> {
    let value = value.with_context(|| format!("{flag} needs a value"))?;
    value
        .parse()
        .map_err(|_| anyhow::anyhow!("{flag}: not a number: {value}"))
}

fn build_plan(args: &Args) -> Result<SimulationPlan> {
    let mut plan = match &args.config {
        Some(path) => biz_runtime::load_plan(path)?,
        None => SimulationPlan::default(),
    };
    if let Some(v) = &args.industry {
        plan.company.industry = v.clone();
    }
    if let Some(v) = &args.size {
        plan.company.size = v.clone();
    }
    if let Some(v) = &args.market {
        plan.company.market_condition = v.clone();
    }
    if let Some(v) = &args.scenario {
        plan.scenario = v.clone();
    }
    plan.periods = args.periods.unwrap_or(plan.periods);
    plan.iterations = args.iterations.unwrap_or(plan.iterations);
    plan.batch = args.batch.unwrap_or(plan.batch);
    if args.seed.is_some() {
        plan.seed = args.seed;
    }
    plan.validate()?;
    Ok(plan)
}

fn companies(plan: &SimulationPlan, seed: u64) -> Result<Vec<ParameterSet>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let overridden = !plan.overrides.is_empty();
    if overridden {
        info!(overrides = ?plan.overrides, "applying parameter overrides");
    }
    (0..plan.batch)
        .map(|_| {
            let generated = biz_params::generate_parameters(
                plan.company.industry(),
                plan.company.size(),
                plan.company.market_condition(),
                &mut rng,
            );
            if !overridden {
                return Ok(generated);
            }
            Ok(plan.overrides.apply(&generated)?)
        })
        .collect()
}

fn kpi_line(index: usize, params: &ParameterSet, r: &AggregateResult) -> String {
    let last = r.periods.saturating_sub(1) as usize;
    let at = |v: &[f64]| v.get(last).copied().unwrap_or(0.0);
    format!(
        "KPI | company: {} | {} | periods: {} | trials: {} | revenue: ${:.0} (p10 ${:.0}, p90 ${:.0}) | profit: ${:.0} | share: {:.2}% | profitable: {:.1}% | bankrupt: {:.1}% | high growth: {:.1}%",
        index,
        params.industry,
        r.periods,
        r.iterations,
        at(&r.revenue.mean),
        r.revenue_thresholds.low_10th,
        r.revenue_thresholds.high_90th,
        at(&r.profit.mean),
        at(&r.market_share.mean),
        r.profitability_probability,
        r.bankruptcy_probability,
        r.high_growth_probability
    )
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;
    info!(
        git_sha = env!("GIT_SHA"),
        build_date = env!("BUILD_DATE"),
        ?args,
        "starting CLI"
    );

    let plan = build_plan(&args)?;
    let seed = plan.seed.unwrap_or_else(rand::random);
    let cfg = biz_core::SimConfig {
        rng_seed: Some(seed),
        ..plan.sim_config()
    };
    let companies = companies(&plan, seed)?;

    let results = match (&plan.overlay, companies.as_slice()) {
        (Some(overlay), [single]) => {
            vec![run_with_overlay(single, &cfg, overlay, &AtomicBool::new(false))?]
        }
        (Some(_), _) => bail!("a custom overlay applies to a single company, not a batch"),
        (None, many) => run_batch(many, &cfg)?,
    };

    if args.json {
        let report = serde_json::json!({
            "generated_at": chrono::Utc::now(),
            "git_sha": env!("GIT_SHA"),
            "seed": seed,
            "companies": companies,
            "results": results,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for (i, (params, result)) in companies.iter().zip(&results).enumerate() {
        println!("{}", kpi_line(i, params, result));
        println!(
            "Outlook | {}",
            Outlook::assess(result, params.initial_revenue)
        );
    }
    Ok(())
}
