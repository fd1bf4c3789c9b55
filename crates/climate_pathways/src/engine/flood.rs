//! Per-event flood overflow and damage.

use super::params::ClimateParameters;

/// Total flood damage for one year's drawn event magnitudes.
///
/// The state carries levee and paddy-dam capability in normalized units;
/// this is where they convert to event-magnitude units (`levee_height_max`
/// at levee level 1.0, `paddy_dam_retention_per_ha` per hectare) before the
/// overflow subtraction. Social mitigation (resident capacity plus the share
/// of households already out of harm's way) scales damage down, but its
/// effectiveness collapses through a logistic knee as overflow grows: past
/// the knee no amount of preparedness changes the outcome much.
pub(crate) fn step_flood_damage(
    event_magnitudes: &[f64],
    levee_level: f64,
    paddy_dam_area_ha: f64,
    forest_flood_reduction: f64,
    resident_capacity: f64,
    migration_ratio: f64,
    params: &ClimateParameters,
) -> f64 {
    let protection = levee_level * params.levee_height_max
        + paddy_dam_area_ha * params.paddy_dam_retention_per_ha;
    let social = (params.capacity_mitigation_weight * resident_capacity
        + params.migration_mitigation_weight * migration_ratio)
        .clamp(0.0, 1.0);

    let mut total = 0.0;
    for &magnitude in event_magnitudes {
        let overflow = (magnitude - protection).max(0.0) * (1.0 - forest_flood_reduction);
        if overflow <= 0.0 {
            continue;
        }
        let base_damage = overflow * params.flood_damage_coefficient;
        let saturation = 1.0
            / (1.0
                + (-(overflow - params.flood_mitigation_knee) / params.flood_mitigation_steepness)
                    .exp());
        let mitigation = (social * (1.0 - saturation)).clamp(0.0, 1.0);
        total += base_damage * (1.0 - mitigation);
    }
    total
}
