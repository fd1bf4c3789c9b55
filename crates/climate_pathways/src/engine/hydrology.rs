//! Annual water balance.

use super::forcing::ClimateForcing;
use super::params::ClimateParameters;

/// Update available water from the year's inflows and outflows.
///
/// Inflows: precipitation, forest infiltration, agricultural return flow.
/// Outflows: temperature-scaled evapotranspiration, municipal demand, fixed
/// agricultural demand, a runoff fraction of precipitation. The result is
/// clipped to `[0, max_available_water]`.
pub(crate) fn step_water_balance(
    prev_available: f64,
    forcing: &ClimateForcing,
    municipal_demand: f64,
    forest_infiltration: f64,
    params: &ClimateParameters,
) -> f64 {
    let evapotranspiration = params.evapotranspiration_base
        * (1.0 + params.evap_temp_coeff * (forcing.temperature_c - params.base_temp_c)).max(0.0);
    let runoff = params.runoff_coefficient * forcing.precipitation_mm;
    let return_flow = params.agri_return_flow_ratio * params.agricultural_demand;

    let next = prev_available + forcing.precipitation_mm - evapotranspiration - municipal_demand
        - params.agricultural_demand
        - runoff
        + forest_infiltration
        + return_flow;
    next.clamp(0.0, params.max_available_water)
}
