//! Paddy-dam stock and the temperature-driven rice yield response.

use super::params::ClimateParameters;
use super::types::DecisionVector;

/// Accumulate paddy-dam area from this year's construction spend.
pub(crate) fn step_paddy_dam(
    prev_area_ha: f64,
    construction_cost: f64,
    params: &ClimateParameters,
) -> f64 {
    let built = construction_cost.max(0.0) / params.paddy_dam_cost_per_ha;
    (prev_area_ha + built).min(params.max_paddy_dam_area_ha)
}

/// Fraction of rice yield lost to ripening-period heat.
///
/// Piecewise linear in the effective ripening temperature: zero below the
/// onset breakpoint, a shallow slope up to the severe breakpoint, a steeper
/// slope beyond, capped at 1. Heat tolerance from R&D shifts the curve right;
/// irrigation cools the canopy with Michaelis–Menten saturation capped at
/// `irrigation_max_cooling_c`.
pub(crate) fn rice_yield_loss(
    temperature_c: f64,
    heat_tolerance_level: f64,
    irrigation_amount: f64,
    params: &ClimateParameters,
) -> f64 {
    let cooling = if irrigation_amount > 0.0 {
        params.irrigation_max_cooling_c * irrigation_amount
            / (irrigation_amount + params.irrigation_half_sat)
    } else {
        0.0
    };
    let effective = temperature_c + params.ripening_temp_offset - heat_tolerance_level - cooling;

    let loss = if effective <= params.yield_loss_onset_temp {
        0.0
    } else if effective <= params.yield_loss_severe_temp {
        params.yield_loss_slope * (effective - params.yield_loss_onset_temp)
    } else {
        params.yield_loss_slope * (params.yield_loss_severe_temp - params.yield_loss_onset_temp)
            + params.yield_loss_severe_slope * (effective - params.yield_loss_severe_temp)
    };
    loss.clamp(0.0, 1.0)
}

/// Crop yield before the flood penalty: potential yield scaled by heat loss,
/// water sufficiency, and the paddy-dam drag.
pub(crate) fn step_crop_yield(
    available_water: f64,
    temperature_c: f64,
    heat_tolerance_level: f64,
    paddy_dam_area_ha: f64,
    decision: &DecisionVector,
    params: &ClimateParameters,
) -> f64 {
    let loss = rice_yield_loss(
        temperature_c,
        heat_tolerance_level,
        decision.irrigation_amount,
        params,
    );
    let sufficiency = (available_water / params.crop_water_requirement).clamp(0.0, 1.0);
    let drag = (paddy_dam_area_ha * params.paddy_dam_yield_drag_per_ha).clamp(0.0, 1.0);
    (params.potential_crop_yield * (1.0 - loss) * sufficiency * (1.0 - drag)).max(0.0)
}

/// Apply the small linear flood penalty to an already-computed yield.
pub(crate) fn apply_flood_penalty(
    crop_yield: f64,
    flood_damage: f64,
    params: &ClimateParameters,
) -> f64 {
    let penalty = (flood_damage * params.flood_crop_penalty).clamp(0.0, 1.0);
    (crop_yield * (1.0 - penalty)).max(0.0)
}
