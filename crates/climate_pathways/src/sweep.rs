//! Policy-by-scenario sweeps: a Monte-Carlo ensemble per grid cell,
//! condensed into comparable scorecards.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use crate::engine::{
    completed_runs, ClimateParameters, DecisionSchedule, EngineError, EnsembleRunner, Metric,
    Rcp, SimulationDriver, SimulationState, Year, YearRecord,
};

/// Condensed ensemble result for one (policy, scenario) cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioScorecard {
    pub completed_runs: u32,
    pub failed_runs: u32,
    /// Means are taken over every year of every completed run.
    pub mean_crop_yield: f64,
    pub mean_flood_damage: f64,
    pub mean_resident_burden: f64,
    /// Terminal values are averaged over the final simulated year.
    pub terminal_ecosystem_level: f64,
    pub terminal_urban_level: f64,
}

/// One grid cell of a sweep. A cell that could not run at all (bad parameter
/// table, unresolvable schedule in every member) carries its error; sibling
/// cells are unaffected.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepCell {
    pub policy: String,
    pub rcp: Rcp,
    pub outcome: Result<ScenarioScorecard, EngineError>,
}

/// Run every named decision schedule under every scenario, `runs_per_cell`
/// ensemble members each, in parallel across cells.
///
/// Cell seeds are spaced `2^32` apart from `base_seed` so no two cells share
/// a member seed; repeating a sweep with the same base seed reproduces every
/// scorecard exactly.
pub fn run_sweep(
    policies: &BTreeMap<String, DecisionSchedule>,
    rcps: &[Rcp],
    years: RangeInclusive<Year>,
    runs_per_cell: u32,
    base_seed: u64,
) -> Vec<SweepCell> {
    let grid: Vec<(&String, &DecisionSchedule, Rcp)> = policies
        .iter()
        .flat_map(|(name, schedule)| rcps.iter().map(move |rcp| (name, schedule, *rcp)))
        .collect();

    grid.into_par_iter()
        .enumerate()
        .map(|(index, (name, schedule, rcp))| {
            let cell_seed = base_seed.wrapping_add((index as u64) << 32);
            let outcome = run_cell(schedule.clone(), rcp, years.clone(), runs_per_cell, cell_seed);
            SweepCell {
                policy: name.clone(),
                rcp,
                outcome,
            }
        })
        .collect()
}

fn run_cell(
    schedule: DecisionSchedule,
    rcp: Rcp,
    years: RangeInclusive<Year>,
    runs_per_cell: u32,
    seed: u64,
) -> Result<ScenarioScorecard, EngineError> {
    let params = ClimateParameters::for_rcp(rcp);
    let driver = SimulationDriver::new(params.clone(), schedule)?;
    let initial = SimulationState::initial(&params);
    let runs = EnsembleRunner::new(driver, runs_per_cell, seed).run(years, &initial);

    let completed = completed_runs(&runs);
    if completed.is_empty() {
        // Surface the first member error rather than an empty scorecard.
        if let Some(err) = runs
            .iter()
            .find_map(|run| run.outcome.as_ref().err().cloned())
        {
            return Err(err);
        }
        return Err(EngineError::Configuration {
            parameter: "runs_per_cell".to_string(),
            message: "sweep cell produced no runs".to_string(),
        });
    }
    let failed = runs.len() - completed.len();
    Ok(scorecard(&completed, completed.len() as u32, failed as u32))
}

fn scorecard(runs: &[&[YearRecord]], completed: u32, failed: u32) -> ScenarioScorecard {
    ScenarioScorecard {
        completed_runs: completed,
        failed_runs: failed,
        mean_crop_yield: grand_mean(runs, Metric::CropYield),
        mean_flood_damage: grand_mean(runs, Metric::FloodDamage),
        mean_resident_burden: grand_mean(runs, Metric::ResidentBurden),
        terminal_ecosystem_level: terminal_mean(runs, Metric::EcosystemLevel),
        terminal_urban_level: terminal_mean(runs, Metric::UrbanLevel),
    }
}

fn grand_mean(runs: &[&[YearRecord]], metric: Metric) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for run in runs {
        for record in *run {
            sum += record.metric(metric);
            count += 1;
        }
    }
    if count > 0 {
        sum / count as f64
    } else {
        0.0
    }
}

fn terminal_mean(runs: &[&[YearRecord]], metric: Metric) -> f64 {
    let values: Vec<f64> = runs
        .iter()
        .filter_map(|run| run.last().map(|record| record.metric(metric)))
        .collect();
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
