//! Annual state transition: composes the subsystem steps in a fixed order.

use rand::Rng;

use super::agriculture::{apply_flood_penalty, step_crop_yield, step_paddy_dam};
use super::error::EngineError;
use super::flood::step_flood_damage;
use super::forcing::{grow_demand, ClimateForcing};
use super::forest::step_forest;
use super::hydrology::step_water_balance;
use super::investment::{step_levee_investment, step_rnd_investment};
use super::params::ClimateParameters;
use super::society::{
    ecosystem_level, municipal_cost, resident_burden, step_housing, step_resident_capacity,
    step_transportation, urban_level,
};
use super::state::SimulationState;
use super::types::{DecisionVector, Year, YearRecord};

/// Advance the simulation by one year.
///
/// Deterministic given `rng`; pure otherwise. The internal sequencing is
/// load-bearing: climate draw, demand growth, forest, water balance, paddy
/// dam and crop yield, investment accumulators, flood damage, ecosystem,
/// housing and urban, resident capacity, costs and burden. Levee investment
/// lands before the flood step, so a level raised this year protects this
/// year; crop yield uses last year's heat tolerance, so R&D pays off starting
/// the following season. Flood mitigation reads last year's resident capacity
/// and migration ratio; preparedness built this year helps next year. No
/// subsystem consults a future year's draw.
pub fn advance_year<R: Rng + ?Sized>(
    year: Year,
    prev: &SimulationState,
    decision: &DecisionVector,
    params: &ClimateParameters,
    rng: &mut R,
) -> Result<(SimulationState, YearRecord), EngineError> {
    // 1. Climate draw
    let forcing = ClimateForcing::draw(year, params, rng)?;

    // 2. Demand growth
    let demand = grow_demand(prev.municipal_demand, params, rng)?;

    // 3. Forest update
    let forest = step_forest(year, prev, decision, params);

    // 4. Water balance
    let available_water =
        step_water_balance(prev.available_water, &forcing, demand, forest.infiltration, params);

    // 5. Paddy dam and crop yield
    let paddy_dam_area =
        step_paddy_dam(prev.paddy_dam_area_ha, decision.paddy_dam_construction_cost, params);
    let pre_flood_yield = step_crop_yield(
        available_water,
        forcing.temperature_c,
        prev.heat_tolerance_level,
        paddy_dam_area,
        decision,
        params,
    );

    // 6. Investment accumulators
    let levee = step_levee_investment(
        prev.levee_investment_total,
        decision.dam_levee_construction_cost,
        prev.levee_level,
        params,
        rng,
    )?;
    let rnd = step_rnd_investment(
        prev.rnd_investment_total,
        decision.agricultural_rnd_cost,
        prev.heat_tolerance_level,
        prev.heat_tolerance_ceiling,
        params,
        rng,
    )?;

    // 7. Flood damage
    let flood_damage = step_flood_damage(
        &forcing.extreme_events,
        levee.level,
        paddy_dam_area,
        forest.flood_reduction,
        prev.resident_capacity,
        prev.migration_ratio(),
        params,
    );
    let crop_yield = apply_flood_penalty(pre_flood_yield, flood_damage, params);

    // 8. Ecosystem
    let ecosystem = ecosystem_level(forest.area_ha, available_water, levee.level, params);

    // 9. Housing and urban
    let housing = step_housing(
        year,
        prev.risky_house_total,
        prev.non_risky_house_total,
        decision,
        params,
    )?;
    let transportation = step_transportation(prev.transportation_level, decision, params);
    let urban = urban_level(
        housing.migration_ratio,
        transportation,
        flood_damage,
        params,
    );

    // 10. Resident capacity
    let capacity = step_resident_capacity(prev.resident_capacity, decision, params);

    // 11. Costs and burden
    let cost = municipal_cost(decision, params);
    let burden = resident_burden(
        year,
        cost,
        flood_damage,
        housing.risky_house_total + housing.non_risky_house_total,
        params,
    )?;

    let next = SimulationState {
        temperature_c: forcing.temperature_c,
        precipitation_mm: forcing.precipitation_mm,
        municipal_demand: demand,
        available_water,
        crop_yield,
        hot_days: forcing.hot_days,
        extreme_precip_events: forcing.extreme_events.len() as u32,
        levee_level: levee.level,
        heat_tolerance_level: rnd.level,
        heat_tolerance_ceiling: rnd.ceiling,
        forest_area_ha: forest.area_ha,
        planting_history: forest.planting_history,
        levee_investment_total: levee.cumulative,
        rnd_investment_total: rnd.cumulative,
        risky_house_total: housing.risky_house_total,
        non_risky_house_total: housing.non_risky_house_total,
        paddy_dam_area_ha: paddy_dam_area,
        transportation_level: transportation,
        resident_capacity: capacity,
        ecosystem_level: ecosystem,
        resident_burden: burden,
        urban_level: urban,
    };

    let record = YearRecord {
        year,
        temperature: next.temperature_c,
        precipitation: next.precipitation_mm,
        available_water: next.available_water,
        crop_yield: next.crop_yield,
        municipal_demand: next.municipal_demand,
        flood_damage,
        levee_level: next.levee_level,
        high_temp_tolerance_level: next.heat_tolerance_level,
        hot_days: next.hot_days,
        extreme_precip_events: next.extreme_precip_events,
        ecosystem_level: next.ecosystem_level,
        municipal_cost: cost,
        urban_level: next.urban_level,
        resident_burden: next.resident_burden,
        forest_area: next.forest_area_ha,
        risky_house_total: next.risky_house_total,
        non_risky_house_total: next.non_risky_house_total,
        transportation_level: next.transportation_level,
        paddy_dam_area: next.paddy_dam_area_ha,
        co2_absorption: forest.co2_absorption,
        resident_capacity: next.resident_capacity,
        migration_ratio: next.migration_ratio(),
        decision: *decision,
    };

    Ok((next, record))
}
