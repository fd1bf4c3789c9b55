//! Forest stock: planting, delayed maturation, degradation, derived effects.

use std::collections::BTreeMap;

use super::params::ClimateParameters;
use super::state::SimulationState;
use super::types::{DecisionVector, Year};

/// Result of one forest step plus the downstream effects other subsystems
/// consume this year.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ForestStep {
    pub area_ha: f64,
    pub planting_history: BTreeMap<Year, f64>,
    /// Fraction of flood overflow absorbed by forest cover.
    pub flood_reduction: f64,
    /// Water-balance infiltration contribution.
    pub infiltration: f64,
    /// Reported CO2 uptake; feeds the record only.
    pub co2_absorption: f64,
}

/// Advance the forest stock by one year.
///
/// Trees planted in year `y` join the canopy in year `y + tree_growup_year`,
/// exactly once. The degradation rate itself grows with the horizon. History
/// entries older than the maturation window are pruned; they are never read
/// again.
pub(crate) fn step_forest(
    year: Year,
    prev: &SimulationState,
    decision: &DecisionVector,
    params: &ClimateParameters,
) -> ForestStep {
    let dy = f64::from(year - params.start_year);

    let mut planting_history = prev.planting_history.clone();
    if decision.planting_trees_amount > 0.0 {
        *planting_history.entry(year).or_insert(0.0) += decision.planting_trees_amount;
    }

    let matured = planting_history
        .get(&(year - params.tree_growup_year))
        .copied()
        .unwrap_or(0.0);
    planting_history.retain(|&planted, _| planted > year - params.tree_growup_year);

    let degradation =
        (params.forest_degradation_base * (1.0 + params.forest_degradation_trend * dy)).min(1.0);
    let area_ha = (prev.forest_area_ha * (1.0 - degradation) + matured).max(0.0);

    let flood_reduction =
        (area_ha * params.forest_flood_reduction_per_ha).min(params.max_forest_flood_reduction);
    let infiltration = area_ha * params.forest_infiltration_per_ha;
    let co2_absorption = area_ha * params.co2_absorption_per_ha;

    ForestStep {
        area_ha,
        planting_history,
        flood_reduction,
        infiltration,
        co2_absorption,
    }
}
