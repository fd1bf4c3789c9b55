//! Core type definitions: years, decision vectors, schedules, and year records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::error::EngineError;

// ============================================================================
// Type Aliases
// ============================================================================

/// Simulated calendar year.
pub type Year = i32;

// ============================================================================
// Constants
// ============================================================================

/// Upper cap on the resident adaptive-capacity level.
pub const RESIDENT_CAPACITY_MAX: f64 = 0.99;
/// Width of one decision bucket under decade-bucketed resolution.
pub const DECADE_BUCKET_YEARS: Year = 10;
/// Schema default for the RCP label on external decision rows.
pub const DEFAULT_RCP_LABEL: f64 = 4.5;

// ============================================================================
// Decision Vector
// ============================================================================

/// The discretionary levers applicable for one simulated year.
///
/// Every field defaults to 0 when absent; a missing lever is "do nothing",
/// never an error. Costs are in million yen per year, amounts in the unit of
/// the lever (hectares, houses).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct DecisionVector {
    #[serde(default)]
    pub planting_trees_amount: f64,
    #[serde(default)]
    pub house_migration_amount: f64,
    #[serde(default)]
    pub dam_levee_construction_cost: f64,
    #[serde(default)]
    pub paddy_dam_construction_cost: f64,
    #[serde(default)]
    pub capacity_building_cost: f64,
    #[serde(default, rename = "agricultural_RnD_cost")]
    pub agricultural_rnd_cost: f64,
    #[serde(default)]
    pub transportation_invest: f64,
    #[serde(default)]
    pub irrigation_amount: f64,
}

fn default_rcp_label() -> f64 {
    DEFAULT_RCP_LABEL
}

/// External wire shape for one decision entry: a year, the levers, and the
/// RCP label the caller wants the run forced under.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionRow {
    pub year: Year,
    #[serde(flatten)]
    pub decision: DecisionVector,
    #[serde(default = "default_rcp_label")]
    pub rcp: f64,
}

// ============================================================================
// Decision Schedule
// ============================================================================

/// How per-year decisions are supplied to a run.
///
/// The three shapes mirror the three caller conventions: one fixed vector for
/// every year, an exact per-year table, or a sparse table keyed by decade
/// bucket (`((year - start) / 10) * 10 + start`) as used by Monte-Carlo
/// sweeps where levers are only redefined every ten years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum DecisionSchedule {
    Fixed(DecisionVector),
    PerYear(BTreeMap<Year, DecisionVector>),
    DecadeBucketed(BTreeMap<Year, DecisionVector>),
}

impl DecisionSchedule {
    /// Build a per-year schedule from external decision rows.
    ///
    /// A run binds exactly one parameter table, so the rows' `rcp` labels
    /// must agree; the caller feeds that single label to
    /// [`ClimateParameters::for_rcp_label`](super::ClimateParameters::for_rcp_label).
    /// Mixed labels are rejected here rather than silently ignored.
    pub fn from_rows(rows: &[DecisionRow]) -> Result<Self, EngineError> {
        if let Some(first) = rows.first() {
            if let Some(row) = rows.iter().find(|row| row.rcp != first.rcp) {
                return Err(EngineError::configuration(
                    "rcp",
                    format!("decision rows mix RCP labels {} and {}", first.rcp, row.rcp),
                ));
            }
        }
        Ok(DecisionSchedule::PerYear(
            rows.iter().map(|row| (row.year, row.decision)).collect(),
        ))
    }

    /// Resolve the decision vector active in `year`.
    ///
    /// A missing year or decade bucket is a hard error for the run; decisions
    /// are never silently substituted with zeros.
    pub fn resolve(&self, year: Year, start_year: Year) -> Result<&DecisionVector, EngineError> {
        match self {
            DecisionSchedule::Fixed(decision) => Ok(decision),
            DecisionSchedule::PerYear(by_year) => {
                by_year
                    .get(&year)
                    .ok_or_else(|| EngineError::DecisionResolution {
                        year,
                        detail: format!("no per-year decision entry for {year}"),
                    })
            }
            DecisionSchedule::DecadeBucketed(by_bucket) => {
                let bucket =
                    (year - start_year).div_euclid(DECADE_BUCKET_YEARS) * DECADE_BUCKET_YEARS
                        + start_year;
                by_bucket
                    .get(&bucket)
                    .ok_or_else(|| EngineError::DecisionResolution {
                        year,
                        detail: format!("no decision entry for decade bucket {bucket}"),
                    })
            }
        }
    }
}

// ============================================================================
// Year Record
// ============================================================================

/// One flattened output row per simulated year.
///
/// Field names serialize in the display-oriented PascalCase form consumed by
/// downstream scorecard and charting collaborators; the decision levers are
/// echoed under their wire names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct YearRecord {
    pub year: Year,
    pub temperature: f64,
    pub precipitation: f64,
    pub available_water: f64,
    pub crop_yield: f64,
    pub municipal_demand: f64,
    pub flood_damage: f64,
    pub levee_level: f64,
    pub high_temp_tolerance_level: f64,
    pub hot_days: f64,
    pub extreme_precip_events: u32,
    pub ecosystem_level: f64,
    pub municipal_cost: f64,
    pub urban_level: f64,
    pub resident_burden: f64,
    pub forest_area: f64,
    pub risky_house_total: f64,
    pub non_risky_house_total: f64,
    pub transportation_level: f64,
    pub paddy_dam_area: f64,
    pub co2_absorption: f64,
    pub resident_capacity: f64,
    pub migration_ratio: f64,
    #[serde(flatten)]
    pub decision: DecisionVector,
}

impl YearRecord {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Read one monitorable column by metric.
    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::Precipitation => self.precipitation,
            Metric::AvailableWater => self.available_water,
            Metric::CropYield => self.crop_yield,
            Metric::MunicipalDemand => self.municipal_demand,
            Metric::FloodDamage => self.flood_damage,
            Metric::LeveeLevel => self.levee_level,
            Metric::HighTempToleranceLevel => self.high_temp_tolerance_level,
            Metric::HotDays => self.hot_days,
            Metric::ExtremePrecipEvents => f64::from(self.extreme_precip_events),
            Metric::EcosystemLevel => self.ecosystem_level,
            Metric::MunicipalCost => self.municipal_cost,
            Metric::UrbanLevel => self.urban_level,
            Metric::ResidentBurden => self.resident_burden,
            Metric::ForestArea => self.forest_area,
            Metric::RiskyHouseTotal => self.risky_house_total,
            Metric::NonRiskyHouseTotal => self.non_risky_house_total,
            Metric::TransportationLevel => self.transportation_level,
            Metric::PaddyDamArea => self.paddy_dam_area,
            Metric::ResidentCapacity => self.resident_capacity,
            Metric::MigrationRatio => self.migration_ratio,
        }
    }
}

// ============================================================================
// Metrics
// ============================================================================

/// Monitorable year-record columns (stable IDs).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Temperature,
    Precipitation,
    AvailableWater,
    CropYield,
    MunicipalDemand,
    FloodDamage,
    LeveeLevel,
    HighTempToleranceLevel,
    HotDays,
    ExtremePrecipEvents,
    EcosystemLevel,
    MunicipalCost,
    UrbanLevel,
    ResidentBurden,
    ForestArea,
    RiskyHouseTotal,
    NonRiskyHouseTotal,
    TransportationLevel,
    PaddyDamArea,
    ResidentCapacity,
    MigrationRatio,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Temperature => "temperature",
            Metric::Precipitation => "precipitation",
            Metric::AvailableWater => "available_water",
            Metric::CropYield => "crop_yield",
            Metric::MunicipalDemand => "municipal_demand",
            Metric::FloodDamage => "flood_damage",
            Metric::LeveeLevel => "levee_level",
            Metric::HighTempToleranceLevel => "high_temp_tolerance_level",
            Metric::HotDays => "hot_days",
            Metric::ExtremePrecipEvents => "extreme_precip_events",
            Metric::EcosystemLevel => "ecosystem_level",
            Metric::MunicipalCost => "municipal_cost",
            Metric::UrbanLevel => "urban_level",
            Metric::ResidentBurden => "resident_burden",
            Metric::ForestArea => "forest_area",
            Metric::RiskyHouseTotal => "risky_house_total",
            Metric::NonRiskyHouseTotal => "non_risky_house_total",
            Metric::TransportationLevel => "transportation_level",
            Metric::PaddyDamArea => "paddy_dam_area",
            Metric::ResidentCapacity => "resident_capacity",
            Metric::MigrationRatio => "migration_ratio",
        }
    }

    /// Parse a metric from a wire or display name.
    pub fn parse(input: &str) -> Option<Self> {
        let normalized: String = input
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "temperature" => Some(Metric::Temperature),
            "precipitation" => Some(Metric::Precipitation),
            "availablewater" => Some(Metric::AvailableWater),
            "cropyield" => Some(Metric::CropYield),
            "municipaldemand" => Some(Metric::MunicipalDemand),
            "flooddamage" => Some(Metric::FloodDamage),
            "leveelevel" => Some(Metric::LeveeLevel),
            "hightemptolerancelevel" => Some(Metric::HighTempToleranceLevel),
            "hotdays" => Some(Metric::HotDays),
            "extremeprecipevents" | "extremeprecipfrequency" => {
                Some(Metric::ExtremePrecipEvents)
            }
            "ecosystemlevel" | "biodiversitylevel" => Some(Metric::EcosystemLevel),
            "municipalcost" => Some(Metric::MunicipalCost),
            "urbanlevel" => Some(Metric::UrbanLevel),
            "residentburden" => Some(Metric::ResidentBurden),
            "forestarea" => Some(Metric::ForestArea),
            "riskyhousetotal" => Some(Metric::RiskyHouseTotal),
            "nonriskyhousetotal" => Some(Metric::NonRiskyHouseTotal),
            "transportationlevel" => Some(Metric::TransportationLevel),
            "paddydamarea" => Some(Metric::PaddyDamArea),
            "residentcapacity" => Some(Metric::ResidentCapacity),
            "migrationratio" => Some(Metric::MigrationRatio),
            _ => None,
        }
    }
}
