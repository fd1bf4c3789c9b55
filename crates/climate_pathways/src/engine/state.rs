//! Simulation state: every stock carried from one year to the next.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::params::ClimateParameters;
use super::types::Year;

/// All carried stocks for one run. Exactly one instance exists per run and
/// the driver owns it exclusively; each year the orchestrator consumes the
/// previous state and emits the next one plus an immutable record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    pub temperature_c: f64,
    pub precipitation_mm: f64,
    pub municipal_demand: f64,
    pub available_water: f64,
    pub crop_yield: f64,
    pub hot_days: f64,
    pub extreme_precip_events: u32,
    /// Normalized levee capability in [0, 1].
    pub levee_level: f64,
    pub heat_tolerance_level: f64,
    /// Current R&D tolerance ceiling; ratchets upward each time it is hit.
    pub heat_tolerance_ceiling: f64,
    pub forest_area_ha: f64,
    /// Hectares planted per year, pruned to the `tree_growup_year` most
    /// recent entries (older ones are never read again).
    pub planting_history: BTreeMap<Year, f64>,
    pub levee_investment_total: f64,
    pub rnd_investment_total: f64,
    pub risky_house_total: f64,
    pub non_risky_house_total: f64,
    pub paddy_dam_area_ha: f64,
    pub transportation_level: f64,
    pub resident_capacity: f64,
    pub ecosystem_level: f64,
    pub resident_burden: f64,
    pub urban_level: f64,
}

impl SimulationState {
    /// Initial state at the start of a run, filled from the parameter table.
    /// Callers override individual stocks with struct-update syntax.
    pub fn initial(params: &ClimateParameters) -> Self {
        SimulationState {
            temperature_c: params.base_temp_c,
            precipitation_mm: params.base_precip_mm,
            municipal_demand: params.initial_municipal_demand,
            available_water: params.initial_available_water,
            crop_yield: params.potential_crop_yield,
            hot_days: params.initial_hot_days,
            extreme_precip_events: 0,
            levee_level: params.initial_levee_level,
            heat_tolerance_level: 0.0,
            heat_tolerance_ceiling: params.crop_rnd_max_tolerance,
            forest_area_ha: params.initial_forest_area_ha,
            planting_history: BTreeMap::new(),
            levee_investment_total: 0.0,
            rnd_investment_total: 0.0,
            risky_house_total: params.initial_risky_houses,
            non_risky_house_total: params.initial_non_risky_houses,
            paddy_dam_area_ha: 0.0,
            transportation_level: params.initial_transportation_level,
            resident_capacity: params.initial_resident_capacity,
            ecosystem_level: params.initial_ecosystem_level,
            resident_burden: 0.0,
            urban_level: params.initial_urban_level,
        }
    }

    /// Share of households in non-risky housing; 0 when the stock is empty.
    pub fn migration_ratio(&self) -> f64 {
        let total = self.risky_house_total + self.non_risky_house_total;
        if total > 0.0 {
            self.non_risky_house_total / total
        } else {
            0.0
        }
    }
}
