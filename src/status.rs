//! Status catalog for work items
//!
//! Each work item kind defines a closed set of named statuses. A status
//! carries a record of capability flags ([`StatusCaps`]) that transition
//! guards evaluate; legality of an operation depends solely on the current
//! status plus these flags, never on hidden global state.
//!
//! Statuses are compared by identity, never ordinally.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The five work item kinds governed by the workflow core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkItemKind {
    /// Generic request
    Request,
    /// Request that converts into a project on approval
    ProjectRequest,
    /// Project created from an approved project request
    Project,
    /// Change under change-advisory approval
    ChangeRequest,
    /// Work-breakdown task (a business entity, not a concurrency primitive)
    Task,
}

impl WorkItemKind {
    /// Stable name of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Request => "Request",
            Self::ProjectRequest => "ProjectRequest",
            Self::Project => "Project",
            Self::ChangeRequest => "ChangeRequest",
            Self::Task => "Task",
        }
    }
}

impl fmt::Display for WorkItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability flags carried by a status
///
/// This is the static lookup record keyed by (kind, status): each status enum
/// maps every variant to one `StatusCaps` value in a `const fn`. Guards read
/// flags from here instead of matching on statuses directly, except where an
/// operation is deliberately exact-status gated (e.g. Submit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusCaps {
    /// Title, description, and priority may be edited
    pub can_edit: bool,
    /// A reviewer may pick the item up, approve it, or deny it
    pub can_review: bool,
    /// The item may be assigned (or reassigned) to a user
    pub can_assign: bool,
    /// Execution may begin
    pub can_start: bool,
    /// An approved project request may be converted into a project
    pub can_convert_to_project: bool,
    /// A department-assigned task may be claimed by a tenant member
    pub can_claim: bool,
    /// An active project may be put on hold
    pub can_put_on_hold: bool,
    /// An on-hold project may be resumed
    pub can_resume: bool,
    /// A scheduled change may enter execution
    pub can_execute: bool,
    /// An approved change may be scheduled into a window
    pub can_schedule: bool,
    /// The item may be completed (or, for changes, failed or rolled back)
    pub can_complete: bool,
    /// The item may be cancelled
    pub can_cancel: bool,
    /// No further mutation is permitted
    pub is_terminal: bool,
}

impl StatusCaps {
    /// The all-false capability record; terminal statuses use `TERMINAL`
    pub const NONE: StatusCaps = StatusCaps {
        can_edit: false,
        can_review: false,
        can_assign: false,
        can_start: false,
        can_convert_to_project: false,
        can_claim: false,
        can_put_on_hold: false,
        can_resume: false,
        can_execute: false,
        can_schedule: false,
        can_complete: false,
        can_cancel: false,
        is_terminal: false,
    };

    /// Capability record of every terminal status
    pub const TERMINAL: StatusCaps = StatusCaps {
        is_terminal: true,
        ..StatusCaps::NONE
    };
}

/// Trait for the closed, per-kind status enumerations
pub trait Status: fmt::Debug + Clone + Copy + PartialEq + Eq + Send + Sync {
    /// Display name of this status
    fn name(&self) -> &'static str;

    /// Capability flags of this status
    fn caps(&self) -> StatusCaps;

    /// Check if this is a terminal status
    fn is_terminal(&self) -> bool {
        self.caps().is_terminal
    }
}

/// Lifecycle statuses of a generic [`Request`](crate::Request)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    /// Being drafted by the requester
    Draft,
    /// Submitted, waiting for a reviewer
    Pending,
    /// Picked up by a reviewer
    InReview,
    /// Approved, waiting for assignment
    Approved,
    /// Terminal - denied with a reason
    Denied,
    /// Assigned and being worked
    InProgress,
    /// Terminal - work finished
    Completed,
    /// Terminal - withdrawn
    Cancelled,
}

impl Status for RequestStatus {
    fn name(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Pending => "Pending",
            Self::InReview => "InReview",
            Self::Approved => "Approved",
            Self::Denied => "Denied",
            Self::InProgress => "InProgress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    fn caps(&self) -> StatusCaps {
        match self {
            Self::Draft => StatusCaps {
                can_edit: true,
                can_cancel: true,
                ..StatusCaps::NONE
            },
            Self::Pending | Self::InReview => StatusCaps {
                can_review: true,
                can_cancel: true,
                ..StatusCaps::NONE
            },
            Self::Approved => StatusCaps {
                can_assign: true,
                can_cancel: true,
                ..StatusCaps::NONE
            },
            Self::InProgress => StatusCaps {
                can_assign: true,
                can_complete: true,
                can_cancel: true,
                ..StatusCaps::NONE
            },
            Self::Denied | Self::Completed | Self::Cancelled => StatusCaps::TERMINAL,
        }
    }
}

/// Lifecycle statuses of a [`ProjectRequest`](crate::ProjectRequest)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectRequestStatus {
    /// Being drafted by the requester
    Draft,
    /// Submitted, waiting for a reviewer
    Pending,
    /// Picked up by a reviewer
    InReview,
    /// Approved and eligible for conversion
    Approved,
    /// Terminal - denied with a reason
    Denied,
    /// Terminal - converted into a project
    Converted,
    /// Terminal - withdrawn
    Cancelled,
}

impl Status for ProjectRequestStatus {
    fn name(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Pending => "Pending",
            Self::InReview => "InReview",
            Self::Approved => "Approved",
            Self::Denied => "Denied",
            Self::Converted => "Converted",
            Self::Cancelled => "Cancelled",
        }
    }

    fn caps(&self) -> StatusCaps {
        match self {
            Self::Draft => StatusCaps {
                can_edit: true,
                can_cancel: true,
                ..StatusCaps::NONE
            },
            Self::Pending | Self::InReview => StatusCaps {
                can_review: true,
                can_cancel: true,
                ..StatusCaps::NONE
            },
            Self::Approved => StatusCaps {
                can_convert_to_project: true,
                can_cancel: true,
                ..StatusCaps::NONE
            },
            Self::Denied | Self::Converted | Self::Cancelled => StatusCaps::TERMINAL,
        }
    }
}

/// Lifecycle statuses of a [`Project`](crate::Project)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectStatus {
    /// Scoping and staffing; the only editable status
    Planning,
    /// In delivery
    Active,
    /// Paused; resumable
    OnHold,
    /// Terminal - delivered
    Completed,
    /// Terminal - abandoned
    Cancelled,
}

impl Status for ProjectStatus {
    fn name(&self) -> &'static str {
        match self {
            Self::Planning => "Planning",
            Self::Active => "Active",
            Self::OnHold => "OnHold",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    fn caps(&self) -> StatusCaps {
        match self {
            Self::Planning => StatusCaps {
                can_edit: true,
                can_assign: true,
                can_start: true,
                can_cancel: true,
                ..StatusCaps::NONE
            },
            Self::Active => StatusCaps {
                can_assign: true,
                can_put_on_hold: true,
                can_complete: true,
                can_cancel: true,
                ..StatusCaps::NONE
            },
            Self::OnHold => StatusCaps {
                can_resume: true,
                can_cancel: true,
                ..StatusCaps::NONE
            },
            Self::Completed | Self::Cancelled => StatusCaps::TERMINAL,
        }
    }
}

/// Lifecycle statuses of a [`ChangeRequest`](crate::ChangeRequest)
///
/// Approval is the CAB gate; execution only happens inside a scheduled
/// window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeRequestStatus {
    /// Being drafted
    Draft,
    /// Submitted to the change advisory board
    Pending,
    /// Under CAB review
    InReview,
    /// Approved, waiting for a window
    Approved,
    /// Scheduled into a window
    Scheduled,
    /// Executing inside the window
    InProgress,
    /// Terminal - denied by the CAB
    Denied,
    /// Terminal - executed successfully
    Completed,
    /// Terminal - execution failed
    Failed,
    /// Terminal - execution was rolled back
    RolledBack,
    /// Terminal - withdrawn before execution
    Cancelled,
}

impl Status for ChangeRequestStatus {
    fn name(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Pending => "Pending",
            Self::InReview => "InReview",
            Self::Approved => "Approved",
            Self::Scheduled => "Scheduled",
            Self::InProgress => "InProgress",
            Self::Denied => "Denied",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::RolledBack => "RolledBack",
            Self::Cancelled => "Cancelled",
        }
    }

    fn caps(&self) -> StatusCaps {
        match self {
            Self::Draft => StatusCaps {
                can_edit: true,
                can_cancel: true,
                ..StatusCaps::NONE
            },
            Self::Pending | Self::InReview => StatusCaps {
                can_review: true,
                can_cancel: true,
                ..StatusCaps::NONE
            },
            Self::Approved => StatusCaps {
                can_schedule: true,
                can_cancel: true,
                ..StatusCaps::NONE
            },
            Self::Scheduled => StatusCaps {
                can_execute: true,
                can_cancel: true,
                ..StatusCaps::NONE
            },
            // A change mid-execution is not cancellable; it runs to
            // Completed, Failed, or RolledBack.
            Self::InProgress => StatusCaps {
                can_complete: true,
                ..StatusCaps::NONE
            },
            Self::Denied
            | Self::Completed
            | Self::Failed
            | Self::RolledBack
            | Self::Cancelled => StatusCaps::TERMINAL,
        }
    }
}

/// Lifecycle statuses of a [`Task`](crate::Task)
///
/// Blocking is an independent toggle on the task, orthogonal to this
/// progression - a task can be blocked while otherwise `InProgress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Not started
    ToDo,
    /// Being worked
    InProgress,
    /// Terminal - done
    Completed,
    /// Terminal - abandoned
    Cancelled,
}

impl Status for TaskStatus {
    fn name(&self) -> &'static str {
        match self {
            Self::ToDo => "ToDo",
            Self::InProgress => "InProgress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    fn caps(&self) -> StatusCaps {
        match self {
            Self::ToDo => StatusCaps {
                can_edit: true,
                can_assign: true,
                can_claim: true,
                can_start: true,
                can_cancel: true,
                ..StatusCaps::NONE
            },
            Self::InProgress => StatusCaps {
                can_assign: true,
                can_claim: true,
                can_complete: true,
                can_cancel: true,
                ..StatusCaps::NONE
            },
            Self::Completed | Self::Cancelled => StatusCaps::TERMINAL,
        }
    }
}

/// Priority of a work item, editable only while the status permits edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    /// Routine work
    Low,
    /// Default priority
    Medium,
    /// Needs attention soon
    High,
    /// Drop everything
    Critical,
}

/// Risk assessment of a change request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Routine, well-understood change
    Low,
    /// Needs review attention
    Medium,
    /// High blast radius
    High,
}

/// Classification of a change request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeType {
    /// Pre-authorized, low-risk change
    Standard,
    /// Goes through the full CAB cycle
    Normal,
    /// Expedited handling
    Emergency,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(RequestStatus::Denied)]
    #[test_case(RequestStatus::Completed)]
    #[test_case(RequestStatus::Cancelled)]
    fn request_terminal_statuses_permit_nothing(status: RequestStatus) {
        assert!(status.is_terminal());
        assert_eq!(status.caps(), StatusCaps::TERMINAL);
    }

    #[test]
    fn request_caps_follow_lifecycle() {
        assert!(RequestStatus::Draft.caps().can_edit);
        assert!(!RequestStatus::Draft.caps().can_review);
        assert!(RequestStatus::Pending.caps().can_review);
        assert!(RequestStatus::InReview.caps().can_review);
        assert!(RequestStatus::Approved.caps().can_assign);
        assert!(RequestStatus::InProgress.caps().can_assign);
        assert!(RequestStatus::InProgress.caps().can_complete);
    }

    #[test]
    fn project_request_approval_enables_conversion_only() {
        let caps = ProjectRequestStatus::Approved.caps();
        assert!(caps.can_convert_to_project);
        assert!(!caps.can_edit);
        assert!(!caps.can_review);
        assert!(ProjectRequestStatus::Converted.is_terminal());
    }

    #[test]
    fn project_hold_and_resume_are_symmetric() {
        assert!(ProjectStatus::Active.caps().can_put_on_hold);
        assert!(!ProjectStatus::Active.caps().can_resume);
        assert!(ProjectStatus::OnHold.caps().can_resume);
        assert!(!ProjectStatus::OnHold.caps().can_put_on_hold);
    }

    #[test]
    fn change_request_execution_cannot_be_cancelled() {
        assert!(ChangeRequestStatus::Scheduled.caps().can_cancel);
        assert!(!ChangeRequestStatus::InProgress.caps().can_cancel);
        assert!(ChangeRequestStatus::InProgress.caps().can_complete);
    }

    #[test_case(ChangeRequestStatus::Denied)]
    #[test_case(ChangeRequestStatus::Completed)]
    #[test_case(ChangeRequestStatus::Failed)]
    #[test_case(ChangeRequestStatus::RolledBack)]
    #[test_case(ChangeRequestStatus::Cancelled)]
    fn change_request_terminal_statuses(status: ChangeRequestStatus) {
        assert!(status.is_terminal());
    }

    #[test]
    fn task_claim_is_possible_until_terminal() {
        assert!(TaskStatus::ToDo.caps().can_claim);
        assert!(TaskStatus::InProgress.caps().can_claim);
        assert!(!TaskStatus::Completed.caps().can_claim);
        assert!(!TaskStatus::Cancelled.caps().can_claim);
    }

    #[test]
    fn status_names_are_stable() {
        assert_eq!(RequestStatus::InReview.name(), "InReview");
        assert_eq!(ChangeRequestStatus::RolledBack.name(), "RolledBack");
        assert_eq!(TaskStatus::ToDo.name(), "ToDo");
        assert_eq!(WorkItemKind::ProjectRequest.to_string(), "ProjectRequest");
    }

    #[test]
    fn status_serde_round_trip() {
        let status = ChangeRequestStatus::Scheduled;
        let json = serde_json::to_string(&status).unwrap();
        let back: ChangeRequestStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(status, back);
    }
}
