//! Stochastic annual climate forcing: trend + noise draws.

use rand::Rng;
use rand_distr::{Distribution, Gumbel, Normal, Poisson};
use serde::{Deserialize, Serialize};

use super::error::EngineError;
use super::params::ClimateParameters;
use super::types::Year;

/// The climate variables drawn for one simulated year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateForcing {
    pub temperature_c: f64,
    pub precipitation_mm: f64,
    pub hot_days: f64,
    /// One Gumbel-distributed magnitude per extreme precipitation event.
    pub extreme_events: Vec<f64>,
}

impl ClimateForcing {
    /// Draw the forcing for `year`. Deterministic given `rng`; draw order is
    /// fixed (temperature, precipitation, hot days, event count, magnitudes)
    /// so seeded runs replay byte-identically.
    pub fn draw<R: Rng + ?Sized>(
        year: Year,
        params: &ClimateParameters,
        rng: &mut R,
    ) -> Result<Self, EngineError> {
        let dy = f64::from(year - params.start_year);

        let temperature_c = params.base_temp_c
            + params.temp_trend_c_per_year * dy
            + normal("temp_sd_c", 0.0, params.temp_sd_c)?.sample(rng);

        // Precipitation variability widens with the horizon.
        let precip_sd =
            params.precip_sd_base_mm * (1.0 + params.precip_sd_trend_per_year * dy).max(0.0);
        let precipitation_mm = (params.base_precip_mm
            + params.precip_trend_mm_per_year * dy
            + normal("precip_sd_base_mm", 0.0, precip_sd)?.sample(rng))
        .max(0.0);

        let hot_days = (params.initial_hot_days
            + (temperature_c - params.base_temp_c) * params.hot_days_per_degree
            + normal("hot_days_sd", 0.0, params.hot_days_sd)?.sample(rng))
        .max(0.0);

        let lambda =
            params.extreme_freq_base * (1.0 + params.extreme_freq_growth_per_year).powf(dy);
        let event_count = if lambda > 0.0 {
            let poisson = Poisson::new(lambda).map_err(|err| {
                EngineError::configuration("extreme_freq_base", format!("{err:?}"))
            })?;
            let drawn: f64 = poisson.sample(rng);
            drawn as u32
        } else {
            0
        };

        let beta = params.gumbel_base_beta + params.extreme_intensity_trend * dy;
        let gumbel = Gumbel::new(params.gumbel_base_mu, beta.max(f64::MIN_POSITIVE))
            .map_err(|err| EngineError::configuration("gumbel_base_beta", format!("{err:?}")))?;
        let extreme_events = (0..event_count)
            .map(|_| gumbel.sample(rng).max(0.0))
            .collect();

        Ok(ClimateForcing {
            temperature_c,
            precipitation_mm,
            hot_days,
            extreme_events,
        })
    }
}

/// Grow municipal demand by trend plus noise.
pub(crate) fn grow_demand<R: Rng + ?Sized>(
    prev_demand: f64,
    params: &ClimateParameters,
    rng: &mut R,
) -> Result<f64, EngineError> {
    let noise = normal("municipal_demand_sd", 0.0, params.municipal_demand_sd)?.sample(rng);
    Ok((prev_demand * (1.0 + params.municipal_demand_trend + noise)).max(0.0))
}

pub(crate) fn normal(
    parameter: &str,
    mean: f64,
    sd: f64,
) -> Result<Normal<f64>, EngineError> {
    Normal::new(mean, sd)
        .map_err(|err| EngineError::configuration(parameter, format!("{err:?}")))
}
