use serde::Serialize;
use thiserror::Error;

use crate::ast::Location;
use crate::binder::bound::RuleId;
use crate::capability::DispatchError;

/// Failures raised while a program runs.
///
/// These never abort the run as a whole; each one is recorded in the
/// [`RunReport`](super::RunReport) of the chain or rule it happened in.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RuntimeError {
    #[error("No fact named `{attribute}` at {location}")]
    UnknownFact { attribute: String, location: Location },

    #[error("Cannot apply `{operator}` to {left} and {right} at {location}")]
    TypeMismatch {
        operator: String,
        left: String,
        right: String,
        location: Location,
    },

    #[error("Variable `{name}` has no value")]
    UnknownVariable { name: String },

    #[error("Rule {rule} step {index} (`{verb}`) failed: {error}")]
    StepFailed {
        rule: RuleId,
        index: usize,
        verb: String,
        error: DispatchError,
    },

    #[error("Rule {rule} step {index} (`{verb}`) timed out after {timeout_ms}ms")]
    StepTimeout {
        rule: RuleId,
        index: usize,
        verb: String,
        timeout_ms: u64,
    },

    #[error("Rule {rule} aborted {}", progress(.last_completed))]
    Aborted {
        rule: RuleId,
        last_completed: Option<usize>,
    },
}

impl RuntimeError {
    /// Index of the failing step, for step-level failures.
    pub fn step_index(&self) -> Option<usize> {
        match self {
            RuntimeError::StepFailed { index, .. } | RuntimeError::StepTimeout { index, .. } => {
                Some(*index)
            }
            _ => None,
        }
    }
}

fn progress(last_completed: &Option<usize>) -> String {
    match last_completed {
        Some(index) => format!("after step {}", index),
        None => "before its first step".to_string(),
    }
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let failed = RuntimeError::StepFailed {
            rule: 2,
            index: 1,
            verb: "send email".to_string(),
            error: DispatchError::new("smtp down"),
        };
        assert_eq!(
            failed.to_string(),
            "Rule 2 step 1 (`send email`) failed: smtp down"
        );
        assert_eq!(failed.step_index(), Some(1));

        let aborted = RuntimeError::Aborted {
            rule: 0,
            last_completed: None,
        };
        assert_eq!(aborted.to_string(), "Rule 0 aborted before its first step");
        assert_eq!(aborted.step_index(), None);
    }

    #[test]
    fn test_serialized_kind() {
        let error = RuntimeError::UnknownVariable {
            name: "limit".to_string(),
        };
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["kind"], "unknownVariable");
        assert_eq!(json["name"], "limit");
    }
}
