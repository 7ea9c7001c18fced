//! Domain events for work item transitions
//!
//! Events are transient records of committed transitions: they exist only
//! between the mutation that produced them and the dispatch that follows a
//! successful persist. They are immutable facts - nothing in the core ever
//! rewrites one.

use crate::identifiers::{
    ChangeRequestId, ChecklistItemId, DepartmentId, ProjectId, ProjectRequestId, RequestId, TaskId,
    TenantId, UserId,
};
use crate::status::WorkItemKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Base trait for domain events
pub trait DomainEvent: Send + Sync + std::fmt::Debug {
    /// The aggregate this event relates to
    fn aggregate_id(&self) -> Uuid;

    /// Stable event type name
    fn event_type(&self) -> &'static str;

    /// The work item kind the event belongs to
    fn kind(&self) -> WorkItemKind;
}

/// Closed enumeration of every work item transition event
///
/// One variant per successful mutating operation; the payload carries the
/// affected id plus whatever the transition recorded. `StartReview` is the
/// one mutation that deliberately emits nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorkItemEvent {
    // Request events
    /// A request was created
    RequestCreated {
        /// The new request
        id: RequestId,
        /// Owning tenant
        tenant_id: TenantId,
        /// Who created it
        created_by: UserId,
    },
    /// A request left Draft for review
    RequestSubmitted {
        /// The submitted request
        id: RequestId,
    },
    /// A request was approved
    RequestApproved {
        /// The approved request
        id: RequestId,
        /// The approving actor
        approved_by: UserId,
        /// Optional approval notes
        notes: Option<String>,
    },
    /// A request was denied
    RequestDenied {
        /// The denied request
        id: RequestId,
        /// The denying actor
        denied_by: UserId,
        /// Why it was denied
        reason: String,
    },
    /// A request was assigned or reassigned
    RequestAssigned {
        /// The assigned request
        id: RequestId,
        /// The new assignee
        assignee: UserId,
    },
    /// A request finished
    RequestCompleted {
        /// The completed request
        id: RequestId,
    },
    /// A request was cancelled
    RequestCancelled {
        /// The cancelled request
        id: RequestId,
        /// Optional cancellation reason
        reason: Option<String>,
    },
    /// A request's editable fields changed
    RequestUpdated {
        /// The updated request
        id: RequestId,
    },

    // ProjectRequest events
    /// A project request was created
    ProjectRequestCreated {
        /// The new project request
        id: ProjectRequestId,
        /// Owning tenant
        tenant_id: TenantId,
        /// Who created it
        created_by: UserId,
    },
    /// A project request left Draft for review
    ProjectRequestSubmitted {
        /// The submitted project request
        id: ProjectRequestId,
    },
    /// A project request was approved
    ProjectRequestApproved {
        /// The approved project request
        id: ProjectRequestId,
        /// The approving actor
        approved_by: UserId,
        /// Optional approval notes
        notes: Option<String>,
    },
    /// A project request was denied
    ProjectRequestDenied {
        /// The denied project request
        id: ProjectRequestId,
        /// The denying actor
        denied_by: UserId,
        /// Why it was denied
        reason: String,
    },
    /// A project request was converted into a project
    ProjectRequestConverted {
        /// The converted project request
        id: ProjectRequestId,
        /// The project it became
        project_id: ProjectId,
    },
    /// A project request was cancelled
    ProjectRequestCancelled {
        /// The cancelled project request
        id: ProjectRequestId,
        /// Optional cancellation reason
        reason: Option<String>,
    },
    /// A project request's editable fields changed
    ProjectRequestUpdated {
        /// The updated project request
        id: ProjectRequestId,
    },

    // Project events
    /// A project was created
    ProjectCreated {
        /// The new project
        id: ProjectId,
        /// Owning tenant
        tenant_id: TenantId,
        /// Who created it
        created_by: UserId,
        /// The project request it originated from, if converted
        origin_request: Option<ProjectRequestId>,
    },
    /// A manager was assigned to a project
    ProjectManagerAssigned {
        /// The project
        id: ProjectId,
        /// The new manager
        manager: UserId,
    },
    /// A project moved from Planning to Active
    ProjectStarted {
        /// The started project
        id: ProjectId,
    },
    /// An active project was put on hold
    ProjectPutOnHold {
        /// The held project
        id: ProjectId,
        /// Why it was held
        reason: String,
    },
    /// An on-hold project resumed
    ProjectResumed {
        /// The resumed project
        id: ProjectId,
    },
    /// A project was delivered
    ProjectCompleted {
        /// The completed project
        id: ProjectId,
    },
    /// A project was cancelled
    ProjectCancelled {
        /// The cancelled project
        id: ProjectId,
        /// Optional cancellation reason
        reason: Option<String>,
    },
    /// A project's editable fields changed
    ProjectUpdated {
        /// The updated project
        id: ProjectId,
    },

    // ChangeRequest events
    /// A change request was created
    ChangeRequestCreated {
        /// The new change request
        id: ChangeRequestId,
        /// Owning tenant
        tenant_id: TenantId,
        /// Who created it
        created_by: UserId,
    },
    /// A change request was submitted to the CAB
    ChangeRequestSubmitted {
        /// The submitted change request
        id: ChangeRequestId,
    },
    /// The CAB approved a change request
    ChangeRequestApproved {
        /// The approved change request
        id: ChangeRequestId,
        /// The approving actor
        approved_by: UserId,
        /// Optional approval notes
        notes: Option<String>,
    },
    /// The CAB denied a change request
    ChangeRequestDenied {
        /// The denied change request
        id: ChangeRequestId,
        /// The denying actor
        denied_by: UserId,
        /// Why it was denied
        reason: String,
    },
    /// A change was scheduled into a window
    ChangeRequestScheduled {
        /// The scheduled change request
        id: ChangeRequestId,
        /// Window start
        window_start: DateTime<Utc>,
        /// Window end
        window_end: DateTime<Utc>,
    },
    /// Execution of a scheduled change began
    ChangeRequestExecutionStarted {
        /// The executing change request
        id: ChangeRequestId,
    },
    /// A change executed successfully
    ChangeRequestCompleted {
        /// The completed change request
        id: ChangeRequestId,
    },
    /// A change failed during execution
    ChangeRequestFailed {
        /// The failed change request
        id: ChangeRequestId,
        /// What went wrong
        reason: String,
    },
    /// A change was rolled back during execution
    ChangeRequestRolledBack {
        /// The rolled-back change request
        id: ChangeRequestId,
        /// Why it was rolled back
        reason: String,
    },
    /// A change request was withdrawn before execution
    ChangeRequestCancelled {
        /// The cancelled change request
        id: ChangeRequestId,
        /// Optional cancellation reason
        reason: Option<String>,
    },
    /// A change request's editable fields changed
    ChangeRequestUpdated {
        /// The updated change request
        id: ChangeRequestId,
    },

    // Task events
    /// A task was created
    TaskCreated {
        /// The new task
        id: TaskId,
        /// Owning tenant
        tenant_id: TenantId,
        /// Who created it
        created_by: UserId,
    },
    /// A task was assigned to a user
    TaskAssignedToUser {
        /// The assigned task
        id: TaskId,
        /// The assignee
        user: UserId,
    },
    /// A task was assigned to a department
    TaskAssignedToDepartment {
        /// The assigned task
        id: TaskId,
        /// The owning department
        department: DepartmentId,
    },
    /// A department-assigned task was claimed by a tenant member
    TaskClaimed {
        /// The claimed task
        id: TaskId,
        /// Who claimed it
        claimed_by: UserId,
    },
    /// Work on a task began
    TaskStarted {
        /// The started task
        id: TaskId,
    },
    /// A task was blocked
    TaskBlocked {
        /// The blocked task
        id: TaskId,
        /// Why it is blocked
        reason: String,
    },
    /// A blocked task was unblocked
    TaskUnblocked {
        /// The unblocked task
        id: TaskId,
    },
    /// Hours were logged against a task
    TaskTimeLogged {
        /// The task
        id: TaskId,
        /// Hours added this entry
        hours: f32,
        /// Cumulative actual hours after this entry
        total_hours: f32,
    },
    /// A checklist item was added to a task
    TaskChecklistItemAdded {
        /// The parent task
        id: TaskId,
        /// The new checklist item
        item_id: ChecklistItemId,
    },
    /// A checklist item was ticked off
    TaskChecklistItemCompleted {
        /// The parent task
        id: TaskId,
        /// The completed checklist item
        item_id: ChecklistItemId,
        /// Who completed it
        completed_by: UserId,
    },
    /// A task finished
    TaskCompleted {
        /// The completed task
        id: TaskId,
    },
    /// A task was cancelled
    TaskCancelled {
        /// The cancelled task
        id: TaskId,
        /// Optional cancellation reason
        reason: Option<String>,
    },
    /// A task's editable fields changed
    TaskUpdated {
        /// The updated task
        id: TaskId,
    },
}

impl DomainEvent for WorkItemEvent {
    fn aggregate_id(&self) -> Uuid {
        use WorkItemEvent::*;
        match self {
            RequestCreated { id, .. }
            | RequestSubmitted { id }
            | RequestApproved { id, .. }
            | RequestDenied { id, .. }
            | RequestAssigned { id, .. }
            | RequestCompleted { id }
            | RequestCancelled { id, .. }
            | RequestUpdated { id } => (*id).into(),

            ProjectRequestCreated { id, .. }
            | ProjectRequestSubmitted { id }
            | ProjectRequestApproved { id, .. }
            | ProjectRequestDenied { id, .. }
            | ProjectRequestConverted { id, .. }
            | ProjectRequestCancelled { id, .. }
            | ProjectRequestUpdated { id } => (*id).into(),

            ProjectCreated { id, .. }
            | ProjectManagerAssigned { id, .. }
            | ProjectStarted { id }
            | ProjectPutOnHold { id, .. }
            | ProjectResumed { id }
            | ProjectCompleted { id }
            | ProjectCancelled { id, .. }
            | ProjectUpdated { id } => (*id).into(),

            ChangeRequestCreated { id, .. }
            | ChangeRequestSubmitted { id }
            | ChangeRequestApproved { id, .. }
            | ChangeRequestDenied { id, .. }
            | ChangeRequestScheduled { id, .. }
            | ChangeRequestExecutionStarted { id }
            | ChangeRequestCompleted { id }
            | ChangeRequestFailed { id, .. }
            | ChangeRequestRolledBack { id, .. }
            | ChangeRequestCancelled { id, .. }
            | ChangeRequestUpdated { id } => (*id).into(),

            TaskCreated { id, .. }
            | TaskAssignedToUser { id, .. }
            | TaskAssignedToDepartment { id, .. }
            | TaskClaimed { id, .. }
            | TaskStarted { id }
            | TaskBlocked { id, .. }
            | TaskUnblocked { id }
            | TaskTimeLogged { id, .. }
            | TaskChecklistItemAdded { id, .. }
            | TaskChecklistItemCompleted { id, .. }
            | TaskCompleted { id }
            | TaskCancelled { id, .. }
            | TaskUpdated { id } => (*id).into(),
        }
    }

    fn event_type(&self) -> &'static str {
        use WorkItemEvent::*;
        match self {
            RequestCreated { .. } => "RequestCreated",
            RequestSubmitted { .. } => "RequestSubmitted",
            RequestApproved { .. } => "RequestApproved",
            RequestDenied { .. } => "RequestDenied",
            RequestAssigned { .. } => "RequestAssigned",
            RequestCompleted { .. } => "RequestCompleted",
            RequestCancelled { .. } => "RequestCancelled",
            RequestUpdated { .. } => "RequestUpdated",
            ProjectRequestCreated { .. } => "ProjectRequestCreated",
            ProjectRequestSubmitted { .. } => "ProjectRequestSubmitted",
            ProjectRequestApproved { .. } => "ProjectRequestApproved",
            ProjectRequestDenied { .. } => "ProjectRequestDenied",
            ProjectRequestConverted { .. } => "ProjectRequestConverted",
            ProjectRequestCancelled { .. } => "ProjectRequestCancelled",
            ProjectRequestUpdated { .. } => "ProjectRequestUpdated",
            ProjectCreated { .. } => "ProjectCreated",
            ProjectManagerAssigned { .. } => "ProjectManagerAssigned",
            ProjectStarted { .. } => "ProjectStarted",
            ProjectPutOnHold { .. } => "ProjectPutOnHold",
            ProjectResumed { .. } => "ProjectResumed",
            ProjectCompleted { .. } => "ProjectCompleted",
            ProjectCancelled { .. } => "ProjectCancelled",
            ProjectUpdated { .. } => "ProjectUpdated",
            ChangeRequestCreated { .. } => "ChangeRequestCreated",
            ChangeRequestSubmitted { .. } => "ChangeRequestSubmitted",
            ChangeRequestApproved { .. } => "ChangeRequestApproved",
            ChangeRequestDenied { .. } => "ChangeRequestDenied",
            ChangeRequestScheduled { .. } => "ChangeRequestScheduled",
            ChangeRequestExecutionStarted { .. } => "ChangeRequestExecutionStarted",
            ChangeRequestCompleted { .. } => "ChangeRequestCompleted",
            ChangeRequestFailed { .. } => "ChangeRequestFailed",
            ChangeRequestRolledBack { .. } => "ChangeRequestRolledBack",
            ChangeRequestCancelled { .. } => "ChangeRequestCancelled",
            ChangeRequestUpdated { .. } => "ChangeRequestUpdated",
            TaskCreated { .. } => "TaskCreated",
            TaskAssignedToUser { .. } => "TaskAssignedToUser",
            TaskAssignedToDepartment { .. } => "TaskAssignedToDepartment",
            TaskClaimed { .. } => "TaskClaimed",
            TaskStarted { .. } => "TaskStarted",
            TaskBlocked { .. } => "TaskBlocked",
            TaskUnblocked { .. } => "TaskUnblocked",
            TaskTimeLogged { .. } => "TaskTimeLogged",
            TaskChecklistItemAdded { .. } => "TaskChecklistItemAdded",
            TaskChecklistItemCompleted { .. } => "TaskChecklistItemCompleted",
            TaskCompleted { .. } => "TaskCompleted",
            TaskCancelled { .. } => "TaskCancelled",
            TaskUpdated { .. } => "TaskUpdated",
        }
    }

    fn kind(&self) -> WorkItemKind {
        use WorkItemEvent::*;
        match self {
            RequestCreated { .. }
            | RequestSubmitted { .. }
            | RequestApproved { .. }
            | RequestDenied { .. }
            | RequestAssigned { .. }
            | RequestCompleted { .. }
            | RequestCancelled { .. }
            | RequestUpdated { .. } => WorkItemKind::Request,

            ProjectRequestCreated { .. }
            | ProjectRequestSubmitted { .. }
            | ProjectRequestApproved { .. }
            | ProjectRequestDenied { .. }
            | ProjectRequestConverted { .. }
            | ProjectRequestCancelled { .. }
            | ProjectRequestUpdated { .. } => WorkItemKind::ProjectRequest,

            ProjectCreated { .. }
            | ProjectManagerAssigned { .. }
            | ProjectStarted { .. }
            | ProjectPutOnHold { .. }
            | ProjectResumed { .. }
            | ProjectCompleted { .. }
            | ProjectCancelled { .. }
            | ProjectUpdated { .. } => WorkItemKind::Project,

            ChangeRequestCreated { .. }
            | ChangeRequestSubmitted { .. }
            | ChangeRequestApproved { .. }
            | ChangeRequestDenied { .. }
            | ChangeRequestScheduled { .. }
            | ChangeRequestExecutionStarted { .. }
            | ChangeRequestCompleted { .. }
            | ChangeRequestFailed { .. }
            | ChangeRequestRolledBack { .. }
            | ChangeRequestCancelled { .. }
            | ChangeRequestUpdated { .. } => WorkItemKind::ChangeRequest,

            TaskCreated { .. }
            | TaskAssignedToUser { .. }
            | TaskAssignedToDepartment { .. }
            | TaskClaimed { .. }
            | TaskStarted { .. }
            | TaskBlocked { .. }
            | TaskUnblocked { .. }
            | TaskTimeLogged { .. }
            | TaskChecklistItemAdded { .. }
            | TaskChecklistItemCompleted { .. }
            | TaskCompleted { .. }
            | TaskCancelled { .. }
            | TaskUpdated { .. } => WorkItemKind::Task,
        }
    }
}
