#![deny(warnings)]

//! Parameter models: company generation and scenario overlays.
//!
//! This crate provides:
//! - Industry/size/market-condition driven parameter generation with seeded draws
//! - Optional user overrides on top of a generated set
//! - Optimistic/neutral/pessimistic (or custom) multiplicative overlays

mod generator;
mod overrides;
mod scenario;

pub use generator::{generate_from_tags, generate_parameters, AVERAGE_SALARY};
pub use overrides::ParameterOverrides;
pub use scenario::{adjust_for_scenario, apply_overlay, ScenarioOverlay};
