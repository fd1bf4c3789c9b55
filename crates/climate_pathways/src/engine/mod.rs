//! Adaptation engine - annual transition, simulation driver, and ensembles.
//!
//! This module is organized into submodules:
//! - `types`: decision vectors, schedules, year records, metrics
//! - `params`: parameter table and RCP override rows
//! - `state`: the carried simulation stocks
//! - `forcing`: stochastic annual climate draws
//! - `forest` / `hydrology` / `agriculture` / `investment` / `flood` /
//!   `society`: pure subsystem step functions
//! - `step`: the `advance_year` orchestrator
//! - `driver`: the multi-year loop with decision resolution
//! - `ensemble`: seeded parallel Monte-Carlo repetitions

mod agriculture;
mod driver;
mod ensemble;
mod error;
mod flood;
mod forcing;
mod forest;
mod hydrology;
mod investment;
mod params;
mod society;
mod state;
mod step;
mod types;

#[cfg(test)]
mod tests;

pub use driver::SimulationDriver;
pub use ensemble::{
    completed_runs, mean_by_year, percentile_by_year, EnsembleRun, EnsembleRunner, YearStat,
};
pub use error::EngineError;
pub use forcing::ClimateForcing;
pub use params::{ClimateParameters, Rcp, RcpOverrides};
pub use state::SimulationState;
pub use step::advance_year;
pub use types::{
    DecisionRow, DecisionSchedule, DecisionVector, Metric, Year, YearRecord, DECADE_BUCKET_YEARS,
    DEFAULT_RCP_LABEL, RESIDENT_CAPACITY_MAX,
};
