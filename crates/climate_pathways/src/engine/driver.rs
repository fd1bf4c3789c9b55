//! Simulation driver: the multi-year loop over `advance_year`.

use rand::Rng;
use std::ops::RangeInclusive;

use super::error::EngineError;
use super::params::ClimateParameters;
use super::state::SimulationState;
use super::step::advance_year;
use super::types::{DecisionSchedule, Year, YearRecord};

/// Runs `advance_year` across a year range, resolving the active decision
/// vector per year from the schedule. One driver instance can serve many
/// runs; each `run` call owns its state exclusively.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationDriver {
    params: ClimateParameters,
    schedule: DecisionSchedule,
}

impl SimulationDriver {
    /// Validate the parameter table up front; a bad table aborts before any
    /// year executes.
    pub fn new(
        params: ClimateParameters,
        schedule: DecisionSchedule,
    ) -> Result<Self, EngineError> {
        params.validate()?;
        Ok(SimulationDriver { params, schedule })
    }

    pub fn params(&self) -> &ClimateParameters {
        &self.params
    }

    pub fn schedule(&self) -> &DecisionSchedule {
        &self.schedule
    }

    /// Run the simulation over `years`, carrying state across the loop, and
    /// return one record per simulated year in order.
    pub fn run<R: Rng + ?Sized>(
        &self,
        years: RangeInclusive<Year>,
        initial_state: SimulationState,
        rng: &mut R,
    ) -> Result<Vec<YearRecord>, EngineError> {
        let mut state = initial_state;
        let mut records = Vec::with_capacity(years.clone().count());
        for year in years {
            let decision = self.schedule.resolve(year, self.params.start_year)?;
            let (next, record) = advance_year(year, &state, decision, &self.params, rng)?;
            state = next;
            records.push(record);
        }
        Ok(records)
    }
}
