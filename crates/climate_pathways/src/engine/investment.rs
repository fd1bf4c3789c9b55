//! Threshold-triggered investment accumulators (levee, agricultural R&D).

use rand::Rng;
use rand_distr::Distribution;

use super::error::EngineError;
use super::forcing::normal;
use super::params::ClimateParameters;

/// Post-step accumulator state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct InvestmentStep {
    pub cumulative: f64,
    pub level: f64,
    pub ceiling: f64,
}

/// Advance one investment accumulator by a year.
///
/// The trigger threshold is noisy: `Normal(threshold * required_years,
/// threshold * 0.1)`, re-drawn every year. On crossing, the level rises by
/// `increment` (clamped at `ceiling`) and the *realized* noisy threshold is
/// subtracted from the accumulator, so overshoot carries into the next
/// build-up instead of being discarded. When `ratchet_ceiling` is set and the
/// raised level lands on the ceiling, the ceiling itself relaxes by +0.1,
/// the escalating-headroom behavior of the R&D track.
pub(crate) fn step_investment<R: Rng + ?Sized>(
    track: &str,
    cumulative: f64,
    annual_cost: f64,
    level: f64,
    increment: f64,
    ceiling: f64,
    threshold: f64,
    required_years: f64,
    ratchet_ceiling: bool,
    rng: &mut R,
) -> Result<InvestmentStep, EngineError> {
    let mut cumulative = cumulative + annual_cost.max(0.0);
    let mut level = level;
    let mut ceiling = ceiling;

    let noisy_threshold =
        normal(track, threshold * required_years, threshold * 0.1)?.sample(rng);

    if cumulative >= noisy_threshold {
        let raised = (level + increment).min(ceiling);
        if ratchet_ceiling && raised >= ceiling {
            ceiling += 0.1;
        }
        level = raised;
        cumulative -= noisy_threshold;
    }

    Ok(InvestmentStep {
        cumulative,
        level,
        ceiling,
    })
}

/// Levee track: level capped at 1.0, no ceiling ratchet.
pub(crate) fn step_levee_investment<R: Rng + ?Sized>(
    cumulative: f64,
    annual_cost: f64,
    level: f64,
    params: &ClimateParameters,
    rng: &mut R,
) -> Result<InvestmentStep, EngineError> {
    step_investment(
        "levee_investment_threshold",
        cumulative,
        annual_cost,
        level,
        params.levee_level_increment,
        1.0,
        params.levee_investment_threshold,
        params.levee_investment_years,
        false,
        rng,
    )
}

/// Agricultural R&D track: tolerance ceiling ratchets when hit.
pub(crate) fn step_rnd_investment<R: Rng + ?Sized>(
    cumulative: f64,
    annual_cost: f64,
    level: f64,
    ceiling: f64,
    params: &ClimateParameters,
    rng: &mut R,
) -> Result<InvestmentStep, EngineError> {
    step_investment(
        "rnd_investment_threshold",
        cumulative,
        annual_cost,
        level,
        params.rnd_tolerance_increment,
        ceiling,
        params.rnd_investment_threshold,
        params.rnd_investment_years,
        true,
        rng,
    )
}
