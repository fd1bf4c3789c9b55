//! Socioeconomic aggregation: ecosystem, housing, urban, capacity, costs.

use super::error::EngineError;
use super::params::ClimateParameters;
use super::types::{DecisionVector, Year, RESIDENT_CAPACITY_MAX};

/// Ecosystem / biodiversity index on a 0–100 scale: equal thirds of forest
/// base, water availability, and the inverse of levee-driven human pressure.
pub(crate) fn ecosystem_level(
    forest_area_ha: f64,
    available_water: f64,
    levee_level: f64,
    params: &ClimateParameters,
) -> f64 {
    let eco_forest = (forest_area_ha / params.forest_ecosystem_base_ha).min(1.0);
    let eco_water = (available_water / params.max_available_water).min(1.0);
    let eco_pressure = (1.0 - levee_level * params.levee_human_pressure_coeff).max(0.0);
    (100.0 * (eco_forest + eco_water + eco_pressure) / 3.0).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct HousingStep {
    pub risky_house_total: f64,
    pub non_risky_house_total: f64,
    pub migration_ratio: f64,
}

/// Move households out of the risky stock and grow the remainder with the
/// population proxy. Migration beyond the remaining risky stock is floored.
pub(crate) fn step_housing(
    year: Year,
    prev_risky: f64,
    prev_non_risky: f64,
    decision: &DecisionVector,
    params: &ClimateParameters,
) -> Result<HousingStep, EngineError> {
    let migrated = decision.house_migration_amount.clamp(0.0, prev_risky);
    let risky_house_total =
        ((prev_risky - migrated) * (1.0 + params.population_growth_rate)).max(0.0);
    let non_risky_house_total = prev_non_risky + migrated;

    let total = risky_house_total + non_risky_house_total;
    if total <= 0.0 {
        return Err(EngineError::NumericDomain {
            year,
            quantity: "total housing stock is zero".to_string(),
        });
    }
    Ok(HousingStep {
        risky_house_total,
        non_risky_house_total,
        migration_ratio: non_risky_house_total / total,
    })
}

/// Transportation level: 5%/yr decay plus investment minus a maintenance
/// drift, clipped to [0, 100].
pub(crate) fn step_transportation(
    prev_level: f64,
    decision: &DecisionVector,
    params: &ClimateParameters,
) -> f64 {
    (prev_level * (1.0 - params.transport_decay_rate)
        + decision.transportation_invest * params.transport_invest_coeff
        - params.transport_maintenance_drift)
        .clamp(0.0, 100.0)
}

/// Urban livability from centrality, transportation, and this year's flood
/// losses, clipped to [0, 100].
pub(crate) fn urban_level(
    migration_ratio: f64,
    transportation_level: f64,
    flood_damage: f64,
    params: &ClimateParameters,
) -> f64 {
    let base = params.urban_distance_coefficient * (1.0 - migration_ratio) * transportation_level;
    (base - flood_damage * params.flood_urban_damage_coeff).clamp(0.0, 100.0)
}

/// Resident adaptive capacity: annual decay plus capacity-building spend,
/// clipped to [0, 0.99].
pub(crate) fn step_resident_capacity(
    prev_capacity: f64,
    decision: &DecisionVector,
    params: &ClimateParameters,
) -> f64 {
    (prev_capacity * (1.0 - params.capacity_decay_rate)
        + decision.capacity_building_cost * params.capacity_gain_per_cost)
        .clamp(0.0, RESIDENT_CAPACITY_MAX)
}

/// Municipal cost of this year's decision vector, unit-converted to million
/// yen.
pub(crate) fn municipal_cost(decision: &DecisionVector, params: &ClimateParameters) -> f64 {
    decision.planting_trees_amount * params.planting_cost_per_ha
        + decision.house_migration_amount * params.house_migration_cost_per_house
        + decision.dam_levee_construction_cost
        + decision.paddy_dam_construction_cost
        + decision.capacity_building_cost
        + decision.agricultural_rnd_cost
        + decision.transportation_invest
}

/// Per-household financial burden: the municipal bill spread over the housing
/// stock plus a flood-recovery surcharge.
pub(crate) fn resident_burden(
    year: Year,
    municipal_cost: f64,
    flood_damage: f64,
    total_houses: f64,
    params: &ClimateParameters,
) -> Result<f64, EngineError> {
    if total_houses <= 0.0 {
        return Err(EngineError::NumericDomain {
            year,
            quantity: "resident burden over zero housing stock".to_string(),
        });
    }
    Ok(
        (municipal_cost * params.yen_per_cost_unit
            + flood_damage * params.flood_recovery_cost_ratio)
            / total_houses,
    )
}
