//! Transition guards
//!
//! Pure predicates deciding whether an operation is legal from the current
//! status. A failed guard returns [`DomainError::InvalidTransition`] naming
//! the kind, the operation, and the current status, and leaves the aggregate
//! completely unchanged - guards are always evaluated before any field is
//! touched.
//!
//! Two gating styles exist deliberately:
//! - capability-gated: the operation checks a flag on [`StatusCaps`]
//!   (e.g. Approve requires `can_review`);
//! - exact-status gated: the operation requires one precise status
//!   (e.g. Submit requires Draft, not merely "editable").
//!
//! The asymmetry is per-operation policy, not something to be inferred from
//! the flag set.

use crate::errors::{DomainError, DomainResult};
use crate::status::{Status, StatusCaps, WorkItemKind};

/// Evaluate a capability-gated guard
///
/// `allowed` is the capability flag the caller read off the current status.
pub fn ensure_capability<S: Status>(
    kind: WorkItemKind,
    operation: &'static str,
    current: S,
    allowed: impl FnOnce(&StatusCaps) -> bool,
) -> DomainResult<()> {
    if allowed(&current.caps()) {
        Ok(())
    } else {
        Err(DomainError::InvalidTransition {
            kind,
            operation,
            from: current.name(),
        })
    }
}

/// Evaluate an exact-status guard
pub fn ensure_exact<S: Status>(
    kind: WorkItemKind,
    operation: &'static str,
    current: S,
    expected: S,
) -> DomainResult<()> {
    if current == expected {
        Ok(())
    } else {
        Err(DomainError::InvalidTransition {
            kind,
            operation,
            from: current.name(),
        })
    }
}

/// Evaluate an arbitrary relationship-state guard
///
/// Used where legality depends on more than the status, e.g. a task claim
/// requires a department assignment and a blocked task cannot complete. The
/// error still names the current status so the caller sees one uniform
/// rejection shape.
pub fn ensure<S: Status>(
    kind: WorkItemKind,
    operation: &'static str,
    current: S,
    condition: bool,
) -> DomainResult<()> {
    if condition {
        Ok(())
    } else {
        Err(DomainError::InvalidTransition {
            kind,
            operation,
            from: current.name(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::RequestStatus;

    #[test]
    fn capability_guard_passes_and_fails() {
        assert!(ensure_capability(
            WorkItemKind::Request,
            "Approve",
            RequestStatus::Pending,
            |caps| caps.can_review,
        )
        .is_ok());

        let err = ensure_capability(
            WorkItemKind::Request,
            "Approve",
            RequestStatus::Draft,
            |caps| caps.can_review,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Approve is not allowed for Request in status Draft"
        );
    }

    #[test]
    fn exact_guard_rejects_nearby_statuses() {
        // Submit requires Draft precisely; an editable-adjacent status such
        // as Pending must not slip through.
        assert!(ensure_exact(
            WorkItemKind::Request,
            "Submit",
            RequestStatus::Draft,
            RequestStatus::Draft,
        )
        .is_ok());

        let err = ensure_exact(
            WorkItemKind::Request,
            "Submit",
            RequestStatus::Pending,
            RequestStatus::Draft,
        )
        .unwrap_err();
        assert!(err.is_invalid_transition());
    }

    #[test]
    fn relationship_guard_names_current_status() {
        let err = ensure(
            WorkItemKind::Task,
            "Complete",
            crate::status::TaskStatus::InProgress,
            false,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Complete is not allowed for Task in status InProgress"
        );
    }
}
