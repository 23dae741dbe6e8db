use std::fmt;
use std::time::Duration;

/// Why a scenario step failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioFailure {
    /// Nothing arrived in time
    Timeout { waiting_for: String, after: Duration },
    /// A message arrived but did not satisfy an assertion
    Mismatch { expected: String, actual: String },
}

impl ScenarioFailure {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ScenarioFailure::Timeout { .. })
    }
}

impl fmt::Display for ScenarioFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioFailure::Timeout { waiting_for, after } => {
                write!(f, "timed out after {:?} waiting for {}", after, waiting_for)
            }
            ScenarioFailure::Mismatch { expected, actual } => {
                write!(f, "expected {}, got:\n{}", expected, actual)
            }
        }
    }
}

/// Result of running a scenario against the UA under test
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioOutcome {
    Passed {
        steps: usize,
    },
    Failed {
        /// Zero-based index of the failing transaction
        step: usize,
        title: String,
        failure: ScenarioFailure,
    },
}

impl ScenarioOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, ScenarioOutcome::Passed { .. })
    }

    pub fn failure(&self) -> Option<&ScenarioFailure> {
        match self {
            ScenarioOutcome::Passed { .. } => None,
            ScenarioOutcome::Failed { failure, .. } => Some(failure),
        }
    }
}

impl fmt::Display for ScenarioOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioOutcome::Passed { steps } => write!(f, "passed ({} transactions)", steps),
            ScenarioOutcome::Failed { step, title, failure } => {
                write!(f, "failed at transaction {} '{}': {}", step + 1, title, failure)
            }
        }
    }
}
