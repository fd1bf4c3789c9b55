//! Engine error taxonomy.

use std::error::Error;
use std::fmt;

use super::types::Year;

/// Errors raised by the adaptation engine.
///
/// `Configuration` aborts a run before any year executes. `DecisionResolution`
/// is fatal for the affected run only; sibling ensemble runs keep going.
/// `NumericDomain` is raised only where no floor or cap can make an
/// intermediate value well-defined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    Configuration { parameter: String, message: String },
    DecisionResolution { year: Year, detail: String },
    NumericDomain { year: Year, quantity: String },
}

impl EngineError {
    pub(crate) fn configuration(parameter: &str, message: impl Into<String>) -> Self {
        EngineError::Configuration {
            parameter: parameter.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Configuration { parameter, message } => {
                write!(f, "configuration error for `{parameter}`: {message}")
            }
            EngineError::DecisionResolution { year, detail } => {
                write!(f, "decision resolution failed for year {year}: {detail}")
            }
            EngineError::NumericDomain { year, quantity } => {
                write!(f, "numeric domain violation in year {year}: {quantity}")
            }
        }
    }
}

impl Error for EngineError {}
