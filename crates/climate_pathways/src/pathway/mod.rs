//! Dynamic Adaptive Policy Pathways: threshold monitoring and policy
//! switching over a running simulation.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use crate::engine::{
    advance_year, ClimateParameters, DecisionVector, EngineError, Metric, SimulationState, Year,
    YearRecord,
};

// ============================================================================
// Threshold Rules
// ============================================================================

/// Which side of the threshold counts as passing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdDirection {
    MustStayBelow,
    MustStayAbove,
}

/// One monitored condition. A year passes when the metric sits on the
/// required side of the threshold; the boundary itself passes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRule {
    pub metric: Metric,
    pub threshold: f64,
    pub direction: ThresholdDirection,
}

impl ThresholdRule {
    pub fn passes(&self, record: &YearRecord) -> bool {
        let value = record.metric(self.metric);
        match self.direction {
            ThresholdDirection::MustStayBelow => value <= self.threshold,
            ThresholdDirection::MustStayAbove => value >= self.threshold,
        }
    }
}

// ============================================================================
// Pathway Trace
// ============================================================================

/// One committed policy switch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathwaySwitch {
    /// Year whose record completed the failing run; the new policy governs
    /// the following year onward.
    pub year: Year,
    pub metric: Metric,
    pub from_policy: String,
    pub to_policy: String,
}

/// Ordered switch events for one run; append-only.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PathwayTrace {
    pub switches: Vec<PathwaySwitch>,
}

/// Everything a pathway run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct PathwayOutcome {
    pub records: Vec<YearRecord>,
    pub trace: PathwayTrace,
    /// Policy active at the final simulated year.
    pub final_policy: String,
}

// ============================================================================
// Pathway Simulator
// ============================================================================

/// Wraps the annual loop with rolling-window threshold detection and
/// ladder/trigger-map policy switching.
///
/// An Adaptation Tipping Point fires the year a rule has failed
/// `required_run` consecutive years. Each rule carries its own counter,
/// reset only by a passing year or by that rule firing; one rule's detection
/// never disturbs a sibling's accumulated run. The replacement policy is the
/// trigger map entry for the failing metric when present, otherwise the next ladder
/// rung (clamped at the last rung, no wraparound). The switch takes effect
/// the *next* simulated year; the triggering year already ran under the old
/// policy. When several rules reach their run length in the same year, the
/// first-declared rule wins; reorder `rules` to change the tie-break.
#[derive(Debug, Clone, PartialEq)]
pub struct PathwaySimulator {
    params: ClimateParameters,
    policies: BTreeMap<String, DecisionVector>,
    ladder: Vec<String>,
    trigger_map: BTreeMap<Metric, String>,
    rules: Vec<ThresholdRule>,
    required_run: u32,
}

impl PathwaySimulator {
    pub fn new(
        params: ClimateParameters,
        policies: BTreeMap<String, DecisionVector>,
        ladder: Vec<String>,
        trigger_map: BTreeMap<Metric, String>,
        rules: Vec<ThresholdRule>,
        required_run: u32,
    ) -> Result<Self, EngineError> {
        params.validate()?;
        if ladder.is_empty() {
            return Err(EngineError::configuration(
                "ladder",
                "policy ladder must name at least one policy",
            ));
        }
        if required_run == 0 {
            return Err(EngineError::configuration(
                "required_run",
                "consecutive-failure run length must be >= 1",
            ));
        }
        for name in &ladder {
            if !policies.contains_key(name) {
                return Err(EngineError::configuration(
                    "ladder",
                    format!("ladder names unknown policy `{name}`"),
                ));
            }
        }
        for (metric, name) in &trigger_map {
            if !policies.contains_key(name) {
                return Err(EngineError::configuration(
                    "trigger_map",
                    format!(
                        "trigger for {} names unknown policy `{name}`",
                        metric.as_str()
                    ),
                ));
            }
        }
        Ok(PathwaySimulator {
            params,
            policies,
            ladder,
            trigger_map,
            rules,
            required_run,
        })
    }

    pub fn params(&self) -> &ClimateParameters {
        &self.params
    }

    /// Run the pathway over `years`. The initial policy is the first ladder
    /// rung; the terminal policy is whatever is active at the final year.
    pub fn run<R: Rng + ?Sized>(
        &self,
        years: RangeInclusive<Year>,
        initial_state: SimulationState,
        rng: &mut R,
    ) -> Result<PathwayOutcome, EngineError> {
        let mut active_policy = self.ladder[0].clone();
        let mut ladder_cursor = 0usize;
        let mut pending_policy: Option<String> = None;

        let mut state = initial_state;
        let mut records = Vec::with_capacity(years.clone().count());
        let mut trace = PathwayTrace::default();
        let mut failure_runs = vec![0u32; self.rules.len()];

        for year in years {
            if let Some(next_policy) = pending_policy.take() {
                if let Some(position) = self.ladder.iter().position(|name| *name == next_policy) {
                    ladder_cursor = position;
                }
                active_policy = next_policy;
            }

            let decision = &self.policies[&active_policy];
            let (next, record) = advance_year(year, &state, decision, &self.params, rng)?;
            state = next;

            // Detection over the committed record: consecutive-failure run
            // counters, first rule to reach the run length wins the year.
            let mut fired: Option<usize> = None;
            for (index, rule) in self.rules.iter().enumerate() {
                if rule.passes(&record) {
                    failure_runs[index] = 0;
                } else {
                    failure_runs[index] += 1;
                    if fired.is_none() && failure_runs[index] >= self.required_run {
                        fired = Some(index);
                    }
                }
            }

            if let Some(index) = fired {
                // Only the fired rule's window closes; siblings keep their
                // accumulated runs and fire on their own timelines.
                failure_runs[index] = 0;
                let metric = self.rules[index].metric;
                let resolved = self
                    .trigger_map
                    .get(&metric)
                    .cloned()
                    .unwrap_or_else(|| {
                        let next_rung = (ladder_cursor + 1).min(self.ladder.len() - 1);
                        self.ladder[next_rung].clone()
                    });
                if resolved != active_policy {
                    trace.switches.push(PathwaySwitch {
                        year,
                        metric,
                        from_policy: active_policy.clone(),
                        to_policy: resolved.clone(),
                    });
                    pending_policy = Some(resolved);
                }
            }

            records.push(record);
        }

        Ok(PathwayOutcome {
            records,
            trace,
            final_policy: active_policy,
        })
    }
}
