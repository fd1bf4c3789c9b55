//! Parameter table and RCP override rows.

use serde::{Deserialize, Serialize};

use super::error::EngineError;
use super::types::Year;

// ============================================================================
// RCP Scenarios
// ============================================================================

/// Representative Concentration Pathway labels (stable IDs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rcp {
    Rcp19,
    Rcp26,
    Rcp45,
    Rcp60,
    Rcp85,
}

impl Rcp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rcp::Rcp19 => "rcp1.9",
            Rcp::Rcp26 => "rcp2.6",
            Rcp::Rcp45 => "rcp4.5",
            Rcp::Rcp60 => "rcp6.0",
            Rcp::Rcp85 => "rcp8.5",
        }
    }

    /// Numeric radiative-forcing label used on the decision schema edge.
    pub fn label(&self) -> f64 {
        match self {
            Rcp::Rcp19 => 1.9,
            Rcp::Rcp26 => 2.6,
            Rcp::Rcp45 => 4.5,
            Rcp::Rcp60 => 6.0,
            Rcp::Rcp85 => 8.5,
        }
    }

    /// Map a numeric label to a scenario. Unknown labels are a configuration
    /// error at the caller; there is no fallback row.
    pub fn from_label(label: f64) -> Option<Self> {
        const EPS: f64 = 1e-9;
        let known = [Rcp::Rcp19, Rcp::Rcp26, Rcp::Rcp45, Rcp::Rcp60, Rcp::Rcp85];
        known
            .into_iter()
            .find(|rcp| (rcp.label() - label).abs() < EPS)
    }

    pub fn variants() -> &'static [Rcp] {
        &[Rcp::Rcp19, Rcp::Rcp26, Rcp::Rcp45, Rcp::Rcp60, Rcp::Rcp85]
    }
}

/// RCP-specific overrides. Only the temperature / precipitation /
/// extreme-event trend fields differ between scenarios; everything else in
/// the parameter table is scenario-independent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RcpOverrides {
    pub temp_trend_c_per_year: f64,
    pub precip_trend_mm_per_year: f64,
    pub precip_sd_trend_per_year: f64,
    pub extreme_freq_growth_per_year: f64,
    pub extreme_intensity_trend: f64,
}

impl RcpOverrides {
    pub fn for_rcp(rcp: Rcp) -> Self {
        match rcp {
            Rcp::Rcp19 => RcpOverrides {
                temp_trend_c_per_year: 0.010,
                precip_trend_mm_per_year: -0.10,
                precip_sd_trend_per_year: 0.004,
                extreme_freq_growth_per_year: 0.010,
                extreme_intensity_trend: 0.20,
            },
            Rcp::Rcp26 => RcpOverrides {
                temp_trend_c_per_year: 0.015,
                precip_trend_mm_per_year: 0.0,
                precip_sd_trend_per_year: 0.005,
                extreme_freq_growth_per_year: 0.015,
                extreme_intensity_trend: 0.30,
            },
            Rcp::Rcp45 => RcpOverrides {
                temp_trend_c_per_year: 0.025,
                precip_trend_mm_per_year: 0.20,
                precip_sd_trend_per_year: 0.006,
                extreme_freq_growth_per_year: 0.025,
                extreme_intensity_trend: 0.45,
            },
            Rcp::Rcp60 => RcpOverrides {
                temp_trend_c_per_year: 0.032,
                precip_trend_mm_per_year: 0.35,
                precip_sd_trend_per_year: 0.007,
                extreme_freq_growth_per_year: 0.035,
                extreme_intensity_trend: 0.55,
            },
            Rcp::Rcp85 => RcpOverrides {
                temp_trend_c_per_year: 0.045,
                precip_trend_mm_per_year: 0.50,
                precip_sd_trend_per_year: 0.009,
                extreme_freq_growth_per_year: 0.050,
                extreme_intensity_trend: 0.70,
            },
        }
    }
}

// ============================================================================
// Parameter Table
// ============================================================================

/// Immutable configuration bag for one run.
///
/// `Default` is the baseline table; `for_rcp` merges in the scenario row.
/// Every field is required by construction, so validation only has to
/// reject out-of-domain values; a missing constant cannot be expressed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateParameters {
    // Timing
    pub start_year: Year,

    // Temperature
    pub base_temp_c: f64,
    pub temp_trend_c_per_year: f64,
    pub temp_sd_c: f64,

    // Precipitation
    pub base_precip_mm: f64,
    pub precip_trend_mm_per_year: f64,
    pub precip_sd_base_mm: f64,
    /// Fractional growth of the precipitation standard deviation per year.
    pub precip_sd_trend_per_year: f64,

    // Hot days
    pub initial_hot_days: f64,
    pub hot_days_per_degree: f64,
    pub hot_days_sd: f64,

    // Extreme precipitation events
    /// Poisson rate at the start year.
    pub extreme_freq_base: f64,
    /// Multiplicative rate growth per year.
    pub extreme_freq_growth_per_year: f64,
    pub gumbel_base_mu: f64,
    pub gumbel_base_beta: f64,
    /// Gumbel scale increment per year.
    pub extreme_intensity_trend: f64,

    // Municipal water demand
    pub initial_municipal_demand: f64,
    pub municipal_demand_trend: f64,
    pub municipal_demand_sd: f64,

    // Water balance
    pub initial_available_water: f64,
    pub max_available_water: f64,
    pub evapotranspiration_base: f64,
    /// Fractional evapotranspiration increase per degree above the base
    /// temperature.
    pub evap_temp_coeff: f64,
    pub runoff_coefficient: f64,
    pub agricultural_demand: f64,
    pub agri_return_flow_ratio: f64,
    pub forest_infiltration_per_ha: f64,

    // Forest
    pub initial_forest_area_ha: f64,
    pub tree_growup_year: Year,
    pub forest_degradation_base: f64,
    /// Fractional growth of the degradation rate per year (compounding
    /// climate stress).
    pub forest_degradation_trend: f64,
    pub forest_flood_reduction_per_ha: f64,
    pub max_forest_flood_reduction: f64,
    pub co2_absorption_per_ha: f64,

    // Crops
    pub potential_crop_yield: f64,
    pub ripening_temp_offset: f64,
    pub yield_loss_onset_temp: f64,
    pub yield_loss_slope: f64,
    pub yield_loss_severe_temp: f64,
    pub yield_loss_severe_slope: f64,
    pub crop_water_requirement: f64,
    pub crop_rnd_max_tolerance: f64,
    pub irrigation_half_sat: f64,
    pub irrigation_max_cooling_c: f64,

    // Paddy dams
    pub paddy_dam_cost_per_ha: f64,
    pub max_paddy_dam_area_ha: f64,
    /// Event-magnitude units retained per hectare of paddy dam.
    pub paddy_dam_retention_per_ha: f64,
    pub paddy_dam_yield_drag_per_ha: f64,

    // Levee investment
    pub levee_investment_threshold: f64,
    pub levee_investment_years: f64,
    pub levee_level_increment: f64,
    /// Event-magnitude units protected at levee level 1.0.
    pub levee_height_max: f64,
    pub initial_levee_level: f64,

    // Agricultural R&D investment
    pub rnd_investment_threshold: f64,
    pub rnd_investment_years: f64,
    pub rnd_tolerance_increment: f64,

    // Flood damage
    pub flood_damage_coefficient: f64,
    pub flood_mitigation_knee: f64,
    pub flood_mitigation_steepness: f64,
    pub capacity_mitigation_weight: f64,
    pub migration_mitigation_weight: f64,
    /// Yield loss fraction per unit of flood damage.
    pub flood_crop_penalty: f64,
    /// Urban-level points lost per unit of flood damage.
    pub flood_urban_damage_coeff: f64,
    pub flood_recovery_cost_ratio: f64,

    // Housing
    pub initial_risky_houses: f64,
    pub initial_non_risky_houses: f64,
    pub population_growth_rate: f64,
    pub house_migration_cost_per_house: f64,

    // Transportation and urban
    pub initial_transportation_level: f64,
    pub transport_decay_rate: f64,
    pub transport_invest_coeff: f64,
    pub transport_maintenance_drift: f64,
    pub urban_distance_coefficient: f64,
    pub initial_urban_level: f64,

    // Ecosystem
    pub forest_ecosystem_base_ha: f64,
    pub levee_human_pressure_coeff: f64,
    pub initial_ecosystem_level: f64,

    // Resident capacity
    pub initial_resident_capacity: f64,
    pub capacity_decay_rate: f64,
    pub capacity_gain_per_cost: f64,

    // Costs
    pub planting_cost_per_ha: f64,
    /// Yen per unit of municipal cost (costs are carried in million yen).
    pub yen_per_cost_unit: f64,
}

impl Default for ClimateParameters {
    fn default() -> Self {
        let rcp45 = RcpOverrides::for_rcp(Rcp::Rcp45);
        ClimateParameters {
            start_year: 2026,

            base_temp_c: 15.4,
            temp_trend_c_per_year: rcp45.temp_trend_c_per_year,
            temp_sd_c: 0.45,

            base_precip_mm: 1700.0,
            precip_trend_mm_per_year: rcp45.precip_trend_mm_per_year,
            precip_sd_base_mm: 150.0,
            precip_sd_trend_per_year: rcp45.precip_sd_trend_per_year,

            initial_hot_days: 30.0,
            hot_days_per_degree: 2.2,
            hot_days_sd: 2.0,

            extreme_freq_base: 0.10,
            extreme_freq_growth_per_year: rcp45.extreme_freq_growth_per_year,
            gumbel_base_mu: 180.0,
            gumbel_base_beta: 30.0,
            extreme_intensity_trend: rcp45.extreme_intensity_trend,

            initial_municipal_demand: 100.0,
            municipal_demand_trend: 0.0,
            municipal_demand_sd: 0.01,

            initial_available_water: 1000.0,
            max_available_water: 3000.0,
            evapotranspiration_base: 600.0,
            evap_temp_coeff: 0.05,
            runoff_coefficient: 0.30,
            agricultural_demand: 250.0,
            agri_return_flow_ratio: 0.30,
            forest_infiltration_per_ha: 0.01,

            initial_forest_area_ha: 20_000.0,
            tree_growup_year: 10,
            forest_degradation_base: 0.005,
            forest_degradation_trend: 0.02,
            forest_flood_reduction_per_ha: 1.0e-5,
            max_forest_flood_reduction: 0.6,
            co2_absorption_per_ha: 2.2,

            potential_crop_yield: 5.0,
            ripening_temp_offset: 11.0,
            yield_loss_onset_temp: 26.5,
            yield_loss_slope: 0.07,
            yield_loss_severe_temp: 30.5,
            yield_loss_severe_slope: 0.15,
            crop_water_requirement: 800.0,
            crop_rnd_max_tolerance: 2.0,
            irrigation_half_sat: 150.0,
            irrigation_max_cooling_c: 2.0,

            paddy_dam_cost_per_ha: 5.0,
            max_paddy_dam_area_ha: 2_000.0,
            paddy_dam_retention_per_ha: 0.05,
            paddy_dam_yield_drag_per_ha: 2.0e-5,

            levee_investment_threshold: 100.0,
            levee_investment_years: 10.0,
            levee_level_increment: 0.2,
            levee_height_max: 250.0,
            initial_levee_level: 0.5,

            rnd_investment_threshold: 50.0,
            rnd_investment_years: 10.0,
            rnd_tolerance_increment: 0.2,

            flood_damage_coefficient: 20_000.0,
            flood_mitigation_knee: 200.0,
            flood_mitigation_steepness: 10.0,
            capacity_mitigation_weight: 0.5,
            migration_mitigation_weight: 0.5,
            flood_crop_penalty: 1.0e-8,
            flood_urban_damage_coeff: 1.0e-6,
            flood_recovery_cost_ratio: 0.3,

            initial_risky_houses: 12_000.0,
            initial_non_risky_houses: 18_000.0,
            population_growth_rate: 0.001,
            house_migration_cost_per_house: 3.0,

            initial_transportation_level: 80.0,
            transport_decay_rate: 0.05,
            transport_invest_coeff: 0.1,
            transport_maintenance_drift: 1.0,
            urban_distance_coefficient: 1.2,
            initial_urban_level: 70.0,

            forest_ecosystem_base_ha: 25_000.0,
            levee_human_pressure_coeff: 1.0,
            initial_ecosystem_level: 70.0,

            initial_resident_capacity: 0.2,
            capacity_decay_rate: 0.05,
            capacity_gain_per_cost: 0.001,

            planting_cost_per_ha: 0.3,
            yen_per_cost_unit: 1.0e6,
        }
    }
}

impl ClimateParameters {
    /// Baseline table merged with the override row for `rcp`.
    pub fn for_rcp(rcp: Rcp) -> Self {
        let overrides = RcpOverrides::for_rcp(rcp);
        ClimateParameters {
            temp_trend_c_per_year: overrides.temp_trend_c_per_year,
            precip_trend_mm_per_year: overrides.precip_trend_mm_per_year,
            precip_sd_trend_per_year: overrides.precip_sd_trend_per_year,
            extreme_freq_growth_per_year: overrides.extreme_freq_growth_per_year,
            extreme_intensity_trend: overrides.extreme_intensity_trend,
            ..ClimateParameters::default()
        }
    }

    /// Like [`for_rcp`](Self::for_rcp) but keyed by the numeric label from
    /// the decision schema. Unknown labels abort before any year executes.
    pub fn for_rcp_label(label: f64) -> Result<Self, EngineError> {
        let rcp = Rcp::from_label(label).ok_or_else(|| {
            EngineError::configuration("rcp", format!("unknown RCP label {label}"))
        })?;
        Ok(Self::for_rcp(rcp))
    }

    /// Reject out-of-domain constants before a run starts.
    pub fn validate(&self) -> Result<(), EngineError> {
        fn non_negative(name: &str, value: f64) -> Result<(), EngineError> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(EngineError::configuration(
                    name,
                    format!("must be finite and >= 0, got {value}"),
                ))
            }
        }
        fn positive(name: &str, value: f64) -> Result<(), EngineError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(EngineError::configuration(
                    name,
                    format!("must be finite and > 0, got {value}"),
                ))
            }
        }
        fn fraction(name: &str, value: f64) -> Result<(), EngineError> {
            if value.is_finite() && (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(EngineError::configuration(
                    name,
                    format!("must lie in [0, 1], got {value}"),
                ))
            }
        }

        non_negative("temp_sd_c", self.temp_sd_c)?;
        non_negative("precip_sd_base_mm", self.precip_sd_base_mm)?;
        non_negative("hot_days_sd", self.hot_days_sd)?;
        non_negative("extreme_freq_base", self.extreme_freq_base)?;
        positive("gumbel_base_beta", self.gumbel_base_beta)?;
        non_negative("municipal_demand_sd", self.municipal_demand_sd)?;
        positive("max_available_water", self.max_available_water)?;
        fraction("runoff_coefficient", self.runoff_coefficient)?;
        fraction("agri_return_flow_ratio", self.agri_return_flow_ratio)?;
        if self.tree_growup_year < 1 {
            return Err(EngineError::configuration(
                "tree_growup_year",
                format!("must be >= 1, got {}", self.tree_growup_year),
            ));
        }
        fraction("forest_degradation_base", self.forest_degradation_base)?;
        fraction("max_forest_flood_reduction", self.max_forest_flood_reduction)?;
        non_negative("potential_crop_yield", self.potential_crop_yield)?;
        positive("crop_water_requirement", self.crop_water_requirement)?;
        positive("irrigation_half_sat", self.irrigation_half_sat)?;
        non_negative("irrigation_max_cooling_c", self.irrigation_max_cooling_c)?;
        if self.yield_loss_severe_temp < self.yield_loss_onset_temp {
            return Err(EngineError::configuration(
                "yield_loss_severe_temp",
                "severe breakpoint must not precede the onset breakpoint",
            ));
        }
        positive("paddy_dam_cost_per_ha", self.paddy_dam_cost_per_ha)?;
        non_negative("max_paddy_dam_area_ha", self.max_paddy_dam_area_ha)?;
        positive("levee_investment_threshold", self.levee_investment_threshold)?;
        positive("levee_investment_years", self.levee_investment_years)?;
        fraction("initial_levee_level", self.initial_levee_level)?;
        positive("rnd_investment_threshold", self.rnd_investment_threshold)?;
        positive("rnd_investment_years", self.rnd_investment_years)?;
        non_negative("flood_damage_coefficient", self.flood_damage_coefficient)?;
        positive("flood_mitigation_steepness", self.flood_mitigation_steepness)?;
        fraction("capacity_mitigation_weight", self.capacity_mitigation_weight)?;
        fraction("migration_mitigation_weight", self.migration_mitigation_weight)?;
        fraction("transport_decay_rate", self.transport_decay_rate)?;
        fraction("capacity_decay_rate", self.capacity_decay_rate)?;
        non_negative("initial_risky_houses", self.initial_risky_houses)?;
        non_negative("initial_non_risky_houses", self.initial_non_risky_houses)?;
        if self.initial_risky_houses + self.initial_non_risky_houses <= 0.0 {
            return Err(EngineError::configuration(
                "initial_risky_houses",
                "total housing stock must be positive",
            ));
        }
        positive("forest_ecosystem_base_ha", self.forest_ecosystem_base_ha)?;
        positive("yen_per_cost_unit", self.yen_per_cost_unit)?;
        Ok(())
    }
}
