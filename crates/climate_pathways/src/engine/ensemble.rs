//! Monte-Carlo ensembles: independently seeded repetitions of one driver.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use super::driver::SimulationDriver;
use super::error::EngineError;
use super::state::SimulationState;
use super::types::{Metric, Year, YearRecord};

/// One tagged ensemble member. Failures stay local to the member: a run that
/// dies with a configuration or resolution error does not abort its siblings.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleRun {
    pub run: u32,
    pub seed: u64,
    pub outcome: Result<Vec<YearRecord>, EngineError>,
}

/// Repeats a driver N times with independent randomness.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleRunner {
    driver: SimulationDriver,
    n_runs: u32,
    base_seed: u64,
}

impl EnsembleRunner {
    pub fn new(driver: SimulationDriver, n_runs: u32, base_seed: u64) -> Self {
        EnsembleRunner {
            driver,
            n_runs,
            base_seed,
        }
    }

    pub fn driver(&self) -> &SimulationDriver {
        &self.driver
    }

    /// Seed for one member, derived from the base seed by a splitmix64 round
    /// so member streams are decorrelated for any base seed.
    pub fn run_seed(&self, run: u32) -> u64 {
        splitmix64(self.base_seed.wrapping_add(u64::from(run)))
    }

    /// Execute all members in parallel. Members never share RNG state or read
    /// each other's output; the parameter table is shared read-only.
    pub fn run(
        &self,
        years: RangeInclusive<Year>,
        initial_state: &SimulationState,
    ) -> Vec<EnsembleRun> {
        (0..self.n_runs)
            .into_par_iter()
            .map(|run| {
                let seed = self.run_seed(run);
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let outcome = self
                    .driver
                    .run(years.clone(), initial_state.clone(), &mut rng);
                EnsembleRun { run, seed, outcome }
            })
            .collect()
    }
}

fn splitmix64(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

// ============================================================================
// Aggregation (pure post-processing over immutable per-run output)
// ============================================================================

/// One aggregated point: a year and the statistic across runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearStat {
    pub year: Year,
    pub value: f64,
}

/// Per-year mean of one metric across completed runs. Runs are aligned by
/// position; slices of unequal length are truncated to the shortest run.
pub fn mean_by_year(runs: &[&[YearRecord]], metric: Metric) -> Vec<YearStat> {
    let Some(years) = common_years(runs) else {
        return Vec::new();
    };
    years
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let sum: f64 = runs.iter().map(|run| run[i].metric(metric)).sum();
            YearStat {
                year: record.year,
                value: sum / runs.len() as f64,
            }
        })
        .collect()
}

/// Per-year percentile (nearest-rank) of one metric across completed runs.
/// Alignment is the same as [`mean_by_year`].
pub fn percentile_by_year(runs: &[&[YearRecord]], metric: Metric, percentile: f64) -> Vec<YearStat> {
    let Some(years) = common_years(runs) else {
        return Vec::new();
    };
    let p = percentile.clamp(0.0, 100.0);
    years
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let mut values: Vec<f64> = runs.iter().map(|run| run[i].metric(metric)).collect();
            values.sort_by(|a, b| a.total_cmp(b));
            let rank = ((p / 100.0) * (values.len() - 1) as f64).round() as usize;
            YearStat {
                year: record.year,
                value: values[rank],
            }
        })
        .collect()
}

/// The year axis shared by every run: the first run, cut to the shortest
/// run's length. `None` when there are no runs.
fn common_years<'a>(runs: &[&'a [YearRecord]]) -> Option<&'a [YearRecord]> {
    let first = runs.first()?;
    let len = runs.iter().map(|run| run.len()).min().unwrap_or(0);
    Some(&first[..len])
}

/// Borrow the record slices of the completed members.
pub fn completed_runs(runs: &[EnsembleRun]) -> Vec<&[YearRecord]> {
    runs.iter()
        .filter_map(|run| run.outcome.as_ref().ok().map(|records| records.as_slice()))
        .collect()
}
