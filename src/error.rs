//! Error taxonomy.
//!
//! Only structurally invalid input and rejected commits abort a call.
//! Per-vessel infeasibility is data ([`crate::models::UnallocatedVessel`])
//! and an exhausted search budget is a flag on
//! [`crate::ga::OptimizationResult`].

use thiserror::Error;

use crate::models::Violation;
use crate::validation::ValidationError;

/// Errors returned by planning entry points.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanningError {
    /// Snapshots failed structural validation; nothing was scheduled.
    #[error("invalid input: {} problem(s), first: {}", .0.len(), first_message(.0))]
    InvalidInput(Vec<ValidationError>),

    /// No resolution of the conflict satisfies the hard constraints.
    #[error("conflict {conflict_id} is unresolvable: {} blocking violation(s)", violations.len())]
    ConflictUnresolvable {
        conflict_id: String,
        /// Diagnostics for human escalation.
        violations: Vec<Violation>,
    },

    /// A resolution was committed against an allocation that is not active.
    #[error("allocation {0} is not active in the allocation set")]
    UnknownAllocation(String),

    /// The resolution was not proposed for the given conflict.
    #[error("resolution for vessel {vessel_id} is not among the proposals of conflict {conflict_id}")]
    UnknownResolution {
        conflict_id: String,
        vessel_id: String,
    },

    /// A resolution no longer satisfies hard constraints against the
    /// current allocation set.
    #[error("resolution for vessel {vessel_id} violates hard constraints: {}", join_violations(violations))]
    ResolutionRejected {
        vessel_id: String,
        violations: Vec<Violation>,
    },
}

fn first_message(errors: &[ValidationError]) -> &str {
    errors.first().map(|e| e.message.as_str()).unwrap_or("")
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result alias for planning entry points.
pub type PlanningResult<T> = Result<T, PlanningError>;

impl From<Vec<ValidationError>> for PlanningError {
    fn from(errors: Vec<ValidationError>) -> Self {
        PlanningError::InvalidInput(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConstraintName;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_invalid_input_message() {
        let err = PlanningError::from(vec![ValidationError::new(
            ValidationErrorKind::DuplicateId,
            "Duplicate vessel ID: V1",
        )]);
        let msg = err.to_string();
        assert!(msg.contains("1 problem"));
        assert!(msg.contains("Duplicate vessel ID: V1"));
    }

    #[test]
    fn test_rejected_lists_constraints() {
        let err = PlanningError::ResolutionRejected {
            vessel_id: "V2".into(),
            violations: vec![Violation::hard(
                ConstraintName::BerthOccupied,
                "B1",
                "overlaps V3",
            )],
        };
        assert!(err.to_string().contains("BERTH_OCCUPIED"));
    }
}
