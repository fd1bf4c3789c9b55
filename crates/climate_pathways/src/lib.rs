pub mod engine;
pub mod pathway;
pub mod sweep;

pub use engine::{
    advance_year, completed_runs, mean_by_year, percentile_by_year, ClimateForcing,
    ClimateParameters, DecisionRow, DecisionSchedule, DecisionVector, EngineError, EnsembleRun,
    EnsembleRunner, Metric, Rcp, RcpOverrides, SimulationDriver, SimulationState, Year, YearRecord,
    YearStat, DECADE_BUCKET_YEARS, DEFAULT_RCP_LABEL, RESIDENT_CAPACITY_MAX,
};

// Adaptive pathways (monitor → detect → switch)
pub use pathway::{
    PathwayOutcome, PathwaySimulator, PathwaySwitch, PathwayTrace, ThresholdDirection,
    ThresholdRule,
};

pub use sweep::{run_sweep, ScenarioScorecard, SweepCell};
