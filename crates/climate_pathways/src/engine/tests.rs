//! Engine tests: subsystem behavior, schedule resolution, determinism,
//! long-run invariants, and ensemble aggregation.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

use super::forest::step_forest;
use super::investment::{step_levee_investment, step_rnd_investment};
use super::society::step_housing;
use super::*;

fn rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Parameter table with every noise source silenced and the side flows of the
/// water balance zeroed, so trajectories can be computed by hand.
fn quiet_params() -> ClimateParameters {
    ClimateParameters {
        temp_trend_c_per_year: 0.0,
        temp_sd_c: 0.0,
        precip_trend_mm_per_year: 0.0,
        precip_sd_base_mm: 0.0,
        precip_sd_trend_per_year: 0.0,
        hot_days_sd: 0.0,
        extreme_freq_base: 0.0,
        municipal_demand_trend: 0.0,
        municipal_demand_sd: 0.0,
        evap_temp_coeff: 0.0,
        runoff_coefficient: 0.0,
        agricultural_demand: 0.0,
        forest_infiltration_per_ha: 0.0,
        forest_degradation_base: 0.0,
        forest_degradation_trend: 0.0,
        ..ClimateParameters::default()
    }
}

// ============================================================================
// Metrics and RCP labels
// ============================================================================

#[test]
fn metric_parse_roundtrips_every_stable_id() {
    let all = [
        Metric::Temperature,
        Metric::Precipitation,
        Metric::AvailableWater,
        Metric::CropYield,
        Metric::MunicipalDemand,
        Metric::FloodDamage,
        Metric::LeveeLevel,
        Metric::HighTempToleranceLevel,
        Metric::HotDays,
        Metric::ExtremePrecipEvents,
        Metric::EcosystemLevel,
        Metric::MunicipalCost,
        Metric::UrbanLevel,
        Metric::ResidentBurden,
        Metric::ForestArea,
        Metric::RiskyHouseTotal,
        Metric::NonRiskyHouseTotal,
        Metric::TransportationLevel,
        Metric::PaddyDamArea,
        Metric::ResidentCapacity,
        Metric::MigrationRatio,
    ];
    for metric in all {
        assert_eq!(Metric::parse(metric.as_str()), Some(metric));
    }
}

#[test]
fn metric_parse_accepts_display_names_and_aliases() {
    assert_eq!(Metric::parse("Crop Yield"), Some(Metric::CropYield));
    assert_eq!(Metric::parse("high-temp_tolerance level"), Some(Metric::HighTempToleranceLevel));
    assert_eq!(
        Metric::parse("ExtremePrecipFrequency"),
        Some(Metric::ExtremePrecipEvents)
    );
    assert_eq!(Metric::parse("BiodiversityLevel"), Some(Metric::EcosystemLevel));
    assert_eq!(Metric::parse("no_such_column"), None);
}

#[test]
fn rcp_label_roundtrips_and_rejects_unknown() {
    for rcp in Rcp::variants() {
        assert_eq!(Rcp::from_label(rcp.label()), Some(*rcp));
    }
    assert_eq!(Rcp::from_label(3.7), None);
    assert!(ClimateParameters::for_rcp_label(3.7).is_err());
}

#[test]
fn rcp_rows_order_trends_by_forcing() {
    let trends: Vec<f64> = Rcp::variants()
        .iter()
        .map(|rcp| RcpOverrides::for_rcp(*rcp).temp_trend_c_per_year)
        .collect();
    assert!(trends.windows(2).all(|pair| pair[0] < pair[1]));
}

// ============================================================================
// Parameter validation
// ============================================================================

#[test]
fn default_parameter_table_validates() {
    assert!(ClimateParameters::default().validate().is_ok());
    for rcp in Rcp::variants() {
        assert!(ClimateParameters::for_rcp(*rcp).validate().is_ok());
    }
}

#[test]
fn validation_rejects_out_of_domain_constants() {
    let bad = ClimateParameters {
        runoff_coefficient: 1.5,
        ..ClimateParameters::default()
    };
    match bad.validate() {
        Err(EngineError::Configuration { parameter, .. }) => {
            assert_eq!(parameter, "runoff_coefficient");
        }
        other => panic!("expected configuration error, got {other:?}"),
    }

    let bad = ClimateParameters {
        tree_growup_year: 0,
        ..ClimateParameters::default()
    };
    assert!(bad.validate().is_err());
}

// ============================================================================
// Decision schedules
// ============================================================================

#[test]
fn decade_bucketed_schedule_resolves_by_bucket() {
    let mut buckets = BTreeMap::new();
    buckets.insert(
        2026,
        DecisionVector {
            planting_trees_amount: 1.0,
            ..DecisionVector::default()
        },
    );
    buckets.insert(
        2036,
        DecisionVector {
            planting_trees_amount: 2.0,
            ..DecisionVector::default()
        },
    );
    let schedule = DecisionSchedule::DecadeBucketed(buckets);

    assert_eq!(schedule.resolve(2026, 2026).unwrap().planting_trees_amount, 1.0);
    assert_eq!(schedule.resolve(2030, 2026).unwrap().planting_trees_amount, 1.0);
    assert_eq!(schedule.resolve(2035, 2026).unwrap().planting_trees_amount, 1.0);
    assert_eq!(schedule.resolve(2036, 2026).unwrap().planting_trees_amount, 2.0);
    assert_eq!(schedule.resolve(2045, 2026).unwrap().planting_trees_amount, 2.0);

    match schedule.resolve(2046, 2026) {
        Err(EngineError::DecisionResolution { year, .. }) => assert_eq!(year, 2046),
        other => panic!("expected resolution error, got {other:?}"),
    }
}

#[test]
fn per_year_schedule_never_substitutes_zeros() {
    let schedule = DecisionSchedule::from_rows(&[DecisionRow {
        year: 2026,
        decision: DecisionVector::default(),
        rcp: 4.5,
    }])
    .unwrap();
    assert!(schedule.resolve(2026, 2026).is_ok());
    assert!(schedule.resolve(2027, 2026).is_err());
}

#[test]
fn from_rows_rejects_mixed_rcp_labels() {
    let row = |year, rcp| DecisionRow {
        year,
        decision: DecisionVector::default(),
        rcp,
    };
    assert!(DecisionSchedule::from_rows(&[row(2026, 8.5), row(2027, 8.5)]).is_ok());

    match DecisionSchedule::from_rows(&[row(2026, 4.5), row(2027, 8.5)]) {
        Err(EngineError::Configuration { parameter, .. }) => assert_eq!(parameter, "rcp"),
        other => panic!("expected configuration error, got {other:?}"),
    }
}

#[test]
fn decision_row_defaults_missing_levers_to_zero() {
    let row: DecisionRow = serde_json::from_str(
        r#"{"year": 2040, "agricultural_RnD_cost": 12.5, "irrigation_amount": 80.0}"#,
    )
    .unwrap();
    assert_eq!(row.year, 2040);
    assert_eq!(row.rcp, DEFAULT_RCP_LABEL);
    assert_eq!(row.decision.agricultural_rnd_cost, 12.5);
    assert_eq!(row.decision.irrigation_amount, 80.0);
    assert_eq!(row.decision.dam_levee_construction_cost, 0.0);
}

// ============================================================================
// Subsystems
// ============================================================================

#[test]
fn planted_trees_mature_exactly_once_after_the_delay() {
    let params = quiet_params();
    let mut state = SimulationState::initial(&params);
    let plant = DecisionVector {
        planting_trees_amount: 100.0,
        ..DecisionVector::default()
    };
    let idle = DecisionVector::default();
    let base_area = state.forest_area_ha;

    for year in 2026..=2040 {
        let decision = if year == 2026 { &plant } else { &idle };
        let step = step_forest(year, &state, decision, &params);
        state.forest_area_ha = step.area_ha;
        state.planting_history = step.planting_history;

        if year < 2036 {
            assert_eq!(state.forest_area_ha, base_area, "no growth before maturation ({year})");
        } else {
            assert_eq!(state.forest_area_ha, base_area + 100.0, "matured once in 2036 ({year})");
        }
    }
    // The 2026 entry was pruned after it matured.
    assert!(state.planting_history.is_empty());
}

#[test]
fn water_balance_follows_the_hand_computed_trajectory() {
    let params = quiet_params();
    let driver =
        SimulationDriver::new(params.clone(), DecisionSchedule::Fixed(DecisionVector::default()))
            .unwrap();
    let records = driver
        .run(2026..=2029, SimulationState::initial(&params), &mut rng(1))
        .unwrap();

    // Net inflow is precip - evapotranspiration - demand = 1700 - 600 - 100
    // per year, from an initial stock of 1000, clipped at 3000.
    let expected = [2000.0, 3000.0, 3000.0, 3000.0];
    for (record, want) in records.iter().zip(expected) {
        assert!((record.available_water - want).abs() < 1e-9, "year {}", record.year);
    }
}

#[test]
fn levee_investment_carries_overshoot_into_the_next_buildup() {
    let params = ClimateParameters::default();
    let step = step_levee_investment(0.0, 2000.0, 0.5, &params, &mut rng(3)).unwrap();
    // Threshold is Normal(1000, 10); 2000 crosses and the realized draw is
    // subtracted, not the whole pot.
    assert!((step.level - 0.7).abs() < 1e-12);
    assert!(step.cumulative > 900.0 && step.cumulative < 1100.0);
    assert_eq!(step.ceiling, 1.0);
}

#[test]
fn rnd_ceiling_ratchets_when_hit() {
    let params = ClimateParameters::default();
    let step = step_rnd_investment(10_000.0, 0.0, 1.9, 2.0, &params, &mut rng(4)).unwrap();
    assert!((step.level - 2.0).abs() < 1e-12);
    assert!((step.ceiling - 2.1).abs() < 1e-12);
    assert!(step.cumulative < 10_000.0);
}

#[test]
fn housing_migration_is_clamped_to_the_risky_stock() {
    let params = quiet_params();
    let decision = DecisionVector {
        house_migration_amount: 1.0e9,
        ..DecisionVector::default()
    };
    let step = step_housing(2026, 12_000.0, 18_000.0, &decision, &params).unwrap();
    assert_eq!(step.risky_house_total, 0.0);
    assert_eq!(step.non_risky_house_total, 30_000.0);
    assert_eq!(step.migration_ratio, 1.0);
}

// ============================================================================
// Determinism and long-run invariants
// ============================================================================

#[test]
fn equal_seeds_replay_identically() {
    let params = ClimateParameters::for_rcp(Rcp::Rcp85);
    let decision = DecisionVector {
        dam_levee_construction_cost: 20.0,
        agricultural_rnd_cost: 10.0,
        ..DecisionVector::default()
    };
    let driver =
        SimulationDriver::new(params.clone(), DecisionSchedule::Fixed(decision)).unwrap();
    let initial = SimulationState::initial(&params);

    let a = driver.run(2026..=2100, initial.clone(), &mut rng(7)).unwrap();
    let b = driver.run(2026..=2100, initial.clone(), &mut rng(7)).unwrap();
    assert_eq!(a, b);

    let c = driver.run(2026..=2100, initial, &mut rng(8)).unwrap();
    assert_ne!(a, c);
}

#[test]
fn long_run_respects_bounds_and_monotone_stocks() {
    let params = ClimateParameters::for_rcp(Rcp::Rcp85);
    let decision = DecisionVector {
        planting_trees_amount: 50.0,
        house_migration_amount: 100.0,
        dam_levee_construction_cost: 30.0,
        paddy_dam_construction_cost: 10.0,
        capacity_building_cost: 20.0,
        agricultural_rnd_cost: 15.0,
        transportation_invest: 10.0,
        irrigation_amount: 100.0,
    };
    let driver =
        SimulationDriver::new(params.clone(), DecisionSchedule::Fixed(decision)).unwrap();
    let records = driver
        .run(2026..=2100, SimulationState::initial(&params), &mut rng(42))
        .unwrap();
    assert_eq!(records.len(), 75);

    let mut prev_levee = params.initial_levee_level;
    let mut prev_tolerance = 0.0;
    for record in &records {
        assert!((0.0..=100.0).contains(&record.ecosystem_level), "year {}", record.year);
        assert!((0.0..=100.0).contains(&record.urban_level), "year {}", record.year);
        assert!(
            (0.0..=RESIDENT_CAPACITY_MAX).contains(&record.resident_capacity),
            "year {}",
            record.year
        );
        assert!(record.crop_yield >= 0.0);
        assert!(record.flood_damage >= 0.0);
        assert!(record.resident_burden >= 0.0);
        assert!((0.0..=params.max_available_water).contains(&record.available_water));
        assert!((0.0..=1.0).contains(&record.levee_level));
        assert!(record.levee_level >= prev_levee, "levee never regresses");
        assert!(record.high_temp_tolerance_level >= prev_tolerance, "tolerance never regresses");
        prev_levee = record.levee_level;
        prev_tolerance = record.high_temp_tolerance_level;
    }
}

#[test]
fn sustained_levee_spending_saturates_at_full_level() {
    let params = quiet_params();
    let decision = DecisionVector {
        dam_levee_construction_cost: 2_000.0,
        ..DecisionVector::default()
    };
    let driver =
        SimulationDriver::new(params.clone(), DecisionSchedule::Fixed(decision)).unwrap();
    let records = driver
        .run(2026..=2045, SimulationState::initial(&params), &mut rng(5))
        .unwrap();
    let last = records.last().unwrap();
    assert_eq!(last.levee_level, 1.0);
}

#[test]
fn year_record_serializes_display_columns_and_wire_levers() {
    let params = quiet_params();
    let driver =
        SimulationDriver::new(params.clone(), DecisionSchedule::Fixed(DecisionVector::default()))
            .unwrap();
    let records = driver
        .run(2026..=2026, SimulationState::initial(&params), &mut rng(2))
        .unwrap();
    let json = records[0].to_json().unwrap();
    assert!(json.contains("\"Temperature\""));
    assert!(json.contains("\"FloodDamage\""));
    assert!(json.contains("\"agricultural_RnD_cost\""));
}

// ============================================================================
// Ensembles
// ============================================================================

#[test]
fn ensemble_members_are_decorrelated_and_reproducible() {
    let params = ClimateParameters::default();
    let driver =
        SimulationDriver::new(params.clone(), DecisionSchedule::Fixed(DecisionVector::default()))
            .unwrap();
    let runner = EnsembleRunner::new(driver.clone(), 8, 123);
    let initial = SimulationState::initial(&params);

    let seeds: Vec<u64> = (0..8).map(|run| runner.run_seed(run)).collect();
    let mut unique = seeds.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), seeds.len());

    let first = runner.run(2026..=2050, &initial);
    let second = EnsembleRunner::new(driver, 8, 123).run(2026..=2050, &initial);
    assert_eq!(first, second);

    let completed = completed_runs(&first);
    assert_eq!(completed.len(), 8);
    // Members with distinct seeds diverge.
    assert_ne!(completed[0], completed[1]);
}

#[test]
fn ensemble_aggregation_is_well_formed() {
    let params = ClimateParameters::default();
    let driver =
        SimulationDriver::new(params.clone(), DecisionSchedule::Fixed(DecisionVector::default()))
            .unwrap();
    let runner = EnsembleRunner::new(driver, 16, 99);
    let runs = runner.run(2026..=2045, &SimulationState::initial(&params));
    let completed = completed_runs(&runs);

    let means = mean_by_year(&completed, Metric::CropYield);
    assert_eq!(means.len(), 20);
    assert_eq!(means[0].year, 2026);
    assert!(means.iter().all(|stat| stat.value.is_finite() && stat.value >= 0.0));

    let p10 = percentile_by_year(&completed, Metric::CropYield, 10.0);
    let p90 = percentile_by_year(&completed, Metric::CropYield, 90.0);
    for (low, high) in p10.iter().zip(&p90) {
        assert!(low.value <= high.value);
    }
}

#[test]
fn aggregation_truncates_runs_of_unequal_length() {
    let params = quiet_params();
    let driver =
        SimulationDriver::new(params.clone(), DecisionSchedule::Fixed(DecisionVector::default()))
            .unwrap();
    let long = driver
        .run(2026..=2035, SimulationState::initial(&params), &mut rng(1))
        .unwrap();
    let short = driver
        .run(2026..=2030, SimulationState::initial(&params), &mut rng(1))
        .unwrap();
    let runs: Vec<&[YearRecord]> = vec![&long, &short];

    let means = mean_by_year(&runs, Metric::AvailableWater);
    assert_eq!(means.len(), 5);
    assert_eq!(means.last().unwrap().year, 2030);

    let medians = percentile_by_year(&runs, Metric::AvailableWater, 50.0);
    assert_eq!(medians.len(), 5);
}

#[test]
fn per_year_mean_yield_stabilizes_as_runs_grow() {
    let params = ClimateParameters::default();
    let driver =
        SimulationDriver::new(params.clone(), DecisionSchedule::Fixed(DecisionVector::default()))
            .unwrap();
    // Member seeds depend only on (base seed, run index), so the first 32
    // members of the large ensemble are the small ensemble.
    let runs = EnsembleRunner::new(driver, 64, 2024).run(2026..=2050, &SimulationState::initial(&params));
    let completed = completed_runs(&runs);
    assert_eq!(completed.len(), 64);

    let small = mean_by_year(&completed[..32], Metric::CropYield);
    let large = mean_by_year(&completed, Metric::CropYield);
    for (a, b) in small.iter().zip(&large) {
        // Yield lives in [0, potential]; doubling the run count moves the
        // per-year mean by far less than a tenth of that scale.
        assert!((a.value - b.value).abs() < 0.5, "year {}", a.year);
    }
}

#[test]
fn ensemble_member_failure_stays_local() {
    let params = ClimateParameters::default();
    // Schedule covers 2026 only; every member dies resolving 2027 but the
    // ensemble itself returns normally.
    let schedule = DecisionSchedule::from_rows(&[DecisionRow {
        year: 2026,
        decision: DecisionVector::default(),
        rcp: 4.5,
    }])
    .unwrap();
    let driver = SimulationDriver::new(params.clone(), schedule).unwrap();
    let runs = EnsembleRunner::new(driver, 4, 1).run(2026..=2030, &SimulationState::initial(&params));
    assert_eq!(runs.len(), 4);
    assert!(runs.iter().all(|run| run.outcome.is_err()));
    assert!(completed_runs(&runs).is_empty());
}
