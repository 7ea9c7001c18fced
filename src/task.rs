//! Task aggregate
//!
//! "Task" is a business entity - a unit of work breakdown - not a
//! concurrency primitive. Tasks carry an assignment that is either a user or
//! a department (never both), an orthogonal blocked toggle, time tracking,
//! and two owned child collections: a checklist and an append-only activity
//! log. Children have no independent lifecycle; they cascade with the task.

use crate::audit::AuditBlock;
use crate::errors::{DomainError, DomainResult};
use crate::events::WorkItemEvent;
use crate::guards;
use crate::identifiers::{ChecklistItemId, DepartmentId, TaskId, TenantId, UserId};
use crate::journal::EventJournal;
use crate::status::{Priority, Status, TaskStatus, WorkItemKind};
use crate::validate;
use crate::work_item::WorkItem;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

const KIND: WorkItemKind = WorkItemKind::Task;

/// Who a task is assigned to
///
/// The user-XOR-department invariant is structural: the enum cannot hold
/// both. Assigning one side clears the other by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TaskAssignment {
    /// Nobody owns the task yet
    #[default]
    Unassigned,
    /// Owned by an individual
    User(UserId),
    /// Parked on a department queue, waiting to be claimed
    Department(DepartmentId),
}

impl TaskAssignment {
    /// The assigned user, if individually assigned
    pub fn user(&self) -> Option<UserId> {
        match self {
            Self::User(user) => Some(*user),
            _ => None,
        }
    }

    /// The assigned department, if department-assigned
    pub fn department(&self) -> Option<DepartmentId> {
        match self {
            Self::Department(dept) => Some(*dept),
            _ => None,
        }
    }
}

/// A checklist item owned by a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    /// The item's identifier within the parent task
    pub id: ChecklistItemId,
    /// What needs doing
    pub description: String,
    /// Position within the checklist
    pub order: u32,
    /// Whether the item has been ticked off
    pub is_completed: bool,
    /// Who ticked it off
    pub completed_by: Option<UserId>,
    /// When it was ticked off
    pub completed_at: Option<DateTime<Utc>>,
}

/// One entry in a task's append-only activity log
///
/// Recorded for every state-affecting operation; never mutated or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    /// When the operation happened
    pub at: DateTime<Utc>,
    /// The acting user, where the operation names one
    pub actor: Option<UserId>,
    /// The operation that ran
    pub action: String,
    /// Extra context, e.g. a block reason or logged hours
    pub detail: Option<String>,
}

/// A work-breakdown task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    tenant_id: TenantId,
    title: String,
    description: String,
    status: TaskStatus,
    priority: Priority,
    assignment: TaskAssignment,
    estimated_hours: Option<f32>,
    actual_hours: f32,
    blocked: bool,
    blocked_reason: Option<String>,
    checklist: IndexMap<ChecklistItemId, ChecklistItem>,
    activity_log: Vec<ActivityLogEntry>,
    cancellation_reason: Option<String>,
    audit: AuditBlock,
    version: u64,
    #[serde(skip)]
    journal: EventJournal,
}

impl Task {
    /// Create a new task in `ToDo`
    pub fn create(
        tenant_id: TenantId,
        title: impl Into<String>,
        description: impl Into<String>,
        priority: Priority,
        estimated_hours: Option<f32>,
        created_by: UserId,
    ) -> DomainResult<Self> {
        let title = validate::title(title.into())?;
        let description = validate::description(description.into())?;
        if let Some(hours) = estimated_hours {
            validate::positive_hours(hours)?;
        }
        let id = TaskId::new();

        let mut task = Self {
            id,
            tenant_id,
            title,
            description,
            status: TaskStatus::ToDo,
            priority,
            assignment: TaskAssignment::Unassigned,
            estimated_hours,
            actual_hours: 0.0,
            blocked: false,
            blocked_reason: None,
            checklist: IndexMap::new(),
            activity_log: Vec::new(),
            cancellation_reason: None,
            audit: AuditBlock::new(created_by),
            version: 0,
            journal: EventJournal::new(),
        };
        task.log_activity(Some(created_by), "Created", None);
        task.journal.record(WorkItemEvent::TaskCreated {
            id,
            tenant_id,
            created_by,
        });
        Ok(task)
    }

    /// The task's identifier
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Current status
    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Priority
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Current assignment
    pub fn assignment(&self) -> TaskAssignment {
        self.assignment
    }

    /// Whether the task is blocked
    ///
    /// Orthogonal to the status progression: a task can be blocked while
    /// otherwise `InProgress`.
    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    /// Why the task is blocked, while it is
    pub fn blocked_reason(&self) -> Option<&str> {
        self.blocked_reason.as_deref()
    }

    /// Estimated effort in hours
    pub fn estimated_hours(&self) -> Option<f32> {
        self.estimated_hours
    }

    /// Cumulative logged hours
    pub fn actual_hours(&self) -> f32 {
        self.actual_hours
    }

    /// The checklist, in insertion order
    pub fn checklist(&self) -> impl Iterator<Item = &ChecklistItem> {
        self.checklist.values()
    }

    /// A checklist item by id
    pub fn checklist_item(&self, id: ChecklistItemId) -> Option<&ChecklistItem> {
        self.checklist.get(&id)
    }

    /// The append-only activity log, oldest first
    pub fn activity_log(&self) -> &[ActivityLogEntry] {
        &self.activity_log
    }

    /// Audit stamps
    pub fn audit(&self) -> &AuditBlock {
        &self.audit
    }

    /// Assign the task to an individual user, clearing any department
    pub fn assign_to_user(&mut self, user: UserId) -> DomainResult<()> {
        guards::ensure_capability(KIND, "AssignToUser", self.status, |caps| caps.can_assign)?;
        self.assignment = TaskAssignment::User(user);
        self.log_activity(Some(user), "AssignedToUser", None);
        self.mutated(WorkItemEvent::TaskAssignedToUser { id: self.id, user });
        Ok(())
    }

    /// Assign the task to a department queue, clearing any user
    pub fn assign_to_department(&mut self, department: DepartmentId) -> DomainResult<()> {
        guards::ensure_capability(KIND, "AssignToDepartment", self.status, |caps| {
            caps.can_assign
        })?;
        self.assignment = TaskAssignment::Department(department);
        self.log_activity(None, "AssignedToDepartment", Some(department.to_string()));
        self.mutated(WorkItemEvent::TaskAssignedToDepartment {
            id: self.id,
            department,
        });
        Ok(())
    }

    /// Claim a department-assigned task
    ///
    /// Any member of the tenant may claim - the caller's membership has
    /// already been checked at the command boundary. Claiming moves the
    /// assignment from the department to the claiming user, so a second
    /// claim finds nothing claimable and fails.
    pub fn claim(&mut self, claimed_by: UserId) -> DomainResult<()> {
        guards::ensure_capability(KIND, "ClaimTask", self.status, |caps| caps.can_claim)?;
        guards::ensure(
            KIND,
            "ClaimTask",
            self.status,
            matches!(self.assignment, TaskAssignment::Department(_)),
        )?;
        self.assignment = TaskAssignment::User(claimed_by);
        self.log_activity(Some(claimed_by), "Claimed", None);
        self.mutated(WorkItemEvent::TaskClaimed {
            id: self.id,
            claimed_by,
        });
        Ok(())
    }

    /// Begin work, moving the task to `InProgress`
    pub fn start(&mut self) -> DomainResult<()> {
        guards::ensure_capability(KIND, "Start", self.status, |caps| caps.can_start)?;
        self.status = TaskStatus::InProgress;
        self.log_activity(None, "Started", None);
        self.mutated(WorkItemEvent::TaskStarted { id: self.id });
        Ok(())
    }

    /// Block the task with a required reason
    ///
    /// Leaves the status untouched; blocking is an independent toggle.
    pub fn block(&mut self, reason: impl Into<String>) -> DomainResult<()> {
        guards::ensure(
            KIND,
            "Block",
            self.status,
            !self.status.is_terminal() && !self.blocked,
        )?;
        let reason = validate::required_reason(reason.into())?;
        self.blocked = true;
        self.blocked_reason = Some(reason.clone());
        self.log_activity(None, "Blocked", Some(reason.clone()));
        self.mutated(WorkItemEvent::TaskBlocked {
            id: self.id,
            reason,
        });
        Ok(())
    }

    /// Clear the blocked toggle
    pub fn unblock(&mut self) -> DomainResult<()> {
        guards::ensure(
            KIND,
            "Unblock",
            self.status,
            !self.status.is_terminal() && self.blocked,
        )?;
        self.blocked = false;
        self.blocked_reason = None;
        self.log_activity(None, "Unblocked", None);
        self.mutated(WorkItemEvent::TaskUnblocked { id: self.id });
        Ok(())
    }

    /// Log hours worked; accumulates into `actual_hours`
    pub fn log_time(&mut self, hours: f32, logged_by: UserId) -> DomainResult<()> {
        guards::ensure(KIND, "LogTime", self.status, !self.status.is_terminal())?;
        let hours = validate::positive_hours(hours)?;
        self.actual_hours += hours;
        self.log_activity(Some(logged_by), "TimeLogged", Some(format!("{hours}h")));
        self.mutated(WorkItemEvent::TaskTimeLogged {
            id: self.id,
            hours,
            total_hours: self.actual_hours,
        });
        Ok(())
    }

    /// Append a checklist item, returning its id
    pub fn add_checklist_item(&mut self, description: impl Into<String>) -> DomainResult<ChecklistItemId> {
        guards::ensure(
            KIND,
            "AddChecklistItem",
            self.status,
            !self.status.is_terminal(),
        )?;
        let description = validate::required_text(description.into(), "description")?;
        let item_id = ChecklistItemId::new();
        let order = self.checklist.len() as u32;
        self.checklist.insert(
            item_id,
            ChecklistItem {
                id: item_id,
                description,
                order,
                is_completed: false,
                completed_by: None,
                completed_at: None,
            },
        );
        self.log_activity(None, "ChecklistItemAdded", None);
        self.mutated(WorkItemEvent::TaskChecklistItemAdded {
            id: self.id,
            item_id,
        });
        Ok(item_id)
    }

    /// Tick off a checklist item
    pub fn complete_checklist_item(
        &mut self,
        item_id: ChecklistItemId,
        completed_by: UserId,
    ) -> DomainResult<()> {
        guards::ensure(
            KIND,
            "CompleteChecklistItem",
            self.status,
            !self.status.is_terminal(),
        )?;
        let item = self
            .checklist
            .get_mut(&item_id)
            .ok_or_else(|| DomainError::validation("unknown checklist item"))?;
        if item.is_completed {
            return Err(DomainError::validation("checklist item already completed"));
        }
        item.is_completed = true;
        item.completed_by = Some(completed_by);
        item.completed_at = Some(Utc::now());
        self.log_activity(Some(completed_by), "ChecklistItemCompleted", None);
        self.mutated(WorkItemEvent::TaskChecklistItemCompleted {
            id: self.id,
            item_id,
            completed_by,
        });
        Ok(())
    }

    /// Complete the task
    ///
    /// A blocked task cannot complete; unblock it first.
    pub fn complete(&mut self) -> DomainResult<()> {
        guards::ensure_capability(KIND, "Complete", self.status, |caps| caps.can_complete)?;
        guards::ensure(KIND, "Complete", self.status, !self.blocked)?;
        self.status = TaskStatus::Completed;
        self.log_activity(None, "Completed", None);
        self.mutated(WorkItemEvent::TaskCompleted { id: self.id });
        Ok(())
    }

    /// Cancel the task
    pub fn cancel(&mut self, reason: Option<String>) -> DomainResult<()> {
        guards::ensure_capability(KIND, "Cancel", self.status, |caps| caps.can_cancel)?;
        self.status = TaskStatus::Cancelled;
        self.cancellation_reason = reason.clone();
        self.log_activity(None, "Cancelled", reason.clone());
        self.mutated(WorkItemEvent::TaskCancelled {
            id: self.id,
            reason,
        });
        Ok(())
    }

    /// Edit title, description, priority, or estimate while the status permits
    pub fn update_details(
        &mut self,
        title: Option<String>,
        description: Option<String>,
        priority: Option<Priority>,
        estimated_hours: Option<f32>,
    ) -> DomainResult<()> {
        guards::ensure_capability(KIND, "UpdateDetails", self.status, |caps| caps.can_edit)?;
        if let Some(hours) = estimated_hours {
            validate::positive_hours(hours)?;
        }
        if let Some(title) = title {
            self.title = validate::title(title)?;
        }
        if let Some(description) = description {
            self.description = validate::description(description)?;
        }
        if let Some(priority) = priority {
            self.priority = priority;
        }
        if let Some(hours) = estimated_hours {
            self.estimated_hours = Some(hours);
        }
        self.log_activity(None, "Updated", None);
        self.mutated(WorkItemEvent::TaskUpdated { id: self.id });
        Ok(())
    }

    /// Immutable read-side view
    pub fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot {
            id: self.id,
            tenant_id: self.tenant_id,
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            priority: self.priority,
            assigned_user: self.assignment.user(),
            assigned_department: self.assignment.department(),
            blocked: self.blocked,
            blocked_reason: self.blocked_reason.clone(),
            estimated_hours: self.estimated_hours,
            actual_hours: self.actual_hours,
            checklist: self.checklist.values().cloned().collect(),
            created_by: self.audit.created_by,
            created_at: self.audit.created_at,
            last_modified_at: self.audit.last_modified_at,
        }
    }

    fn log_activity(&mut self, actor: Option<UserId>, action: &str, detail: Option<String>) {
        self.activity_log.push(ActivityLogEntry {
            at: Utc::now(),
            actor,
            action: action.to_string(),
            detail,
        });
    }

    fn mutated(&mut self, event: WorkItemEvent) {
        self.audit.touch();
        self.journal.record(event);
    }
}

impl WorkItem for Task {
    type Id = TaskId;
    const KIND: WorkItemKind = KIND;

    fn id(&self) -> TaskId {
        self.id
    }

    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    fn status_name(&self) -> &'static str {
        self.status.name()
    }

    fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn increment_version(&mut self) {
        self.version += 1;
    }

    fn journal(&self) -> &EventJournal {
        &self.journal
    }

    fn journal_mut(&mut self) -> &mut EventJournal {
        &mut self.journal
    }
}

/// Read-side snapshot of a [`Task`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    /// The task's identifier
    pub id: TaskId,
    /// Owning tenant
    pub tenant_id: TenantId,
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Current status
    pub status: TaskStatus,
    /// Priority
    pub priority: Priority,
    /// Assigned user, if individually assigned
    pub assigned_user: Option<UserId>,
    /// Assigned department, if department-assigned
    pub assigned_department: Option<DepartmentId>,
    /// Whether the task is blocked
    pub blocked: bool,
    /// Why the task is blocked
    pub blocked_reason: Option<String>,
    /// Estimated effort in hours
    pub estimated_hours: Option<f32>,
    /// Cumulative logged hours
    pub actual_hours: f32,
    /// Checklist items in order
    pub checklist: Vec<ChecklistItem>,
    /// Who created it
    pub created_by: UserId,
    /// When it was created
    pub created_at: DateTime<Utc>,
    /// When it was last mutated
    pub last_modified_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn todo() -> Task {
        Task::create(
            TenantId::new(),
            "Wire up the staging cluster",
            "",
            Priority::Medium,
            Some(8.0),
            UserId::new(),
        )
        .unwrap()
    }

    #[test]
    fn assignment_is_user_xor_department() {
        let mut task = todo();
        let user = UserId::new();
        let dept = DepartmentId::new();

        task.assign_to_user(user).unwrap();
        assert_eq!(task.assignment().user(), Some(user));
        assert_eq!(task.assignment().department(), None);

        task.assign_to_department(dept).unwrap();
        assert_eq!(task.assignment().user(), None);
        assert_eq!(task.assignment().department(), Some(dept));
    }

    #[test]
    fn claim_moves_assignment_to_the_claimer_once() {
        let mut task = todo();
        task.assign_to_department(DepartmentId::new()).unwrap();

        let u1 = UserId::new();
        let u2 = UserId::new();

        task.claim(u1).unwrap();
        assert_eq!(task.assignment().user(), Some(u1));
        assert_eq!(task.assignment().department(), None);

        // No department assignment remains, so there is nothing to claim
        let err = task.claim(u2).unwrap_err();
        assert!(err.is_invalid_transition());
        assert_eq!(task.assignment().user(), Some(u1));
    }

    #[test]
    fn claim_requires_department_assignment() {
        let mut task = todo();
        assert!(task.claim(UserId::new()).is_err());

        task.assign_to_user(UserId::new()).unwrap();
        assert!(task.claim(UserId::new()).is_err());
    }

    #[test]
    fn blocked_task_cannot_complete_until_unblocked() {
        let mut task = todo();
        task.start().unwrap();
        task.block("waiting on credentials").unwrap();
        assert!(task.is_blocked());
        assert_eq!(task.status(), TaskStatus::InProgress);

        let err = task.complete().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Complete is not allowed for Task in status InProgress"
        );

        task.unblock().unwrap();
        task.complete().unwrap();
        assert_eq!(task.status(), TaskStatus::Completed);
    }

    #[test]
    fn block_is_not_reentrant() {
        let mut task = todo();
        task.block("first").unwrap();
        assert!(task.block("second").is_err());
        assert_eq!(task.blocked_reason(), Some("first"));

        task.unblock().unwrap();
        assert!(task.unblock().is_err());
    }

    #[test]
    fn log_time_accumulates_and_rejects_non_positive() {
        let mut task = todo();
        let worker = UserId::new();

        assert!(task.log_time(0.0, worker).unwrap_err().is_validation());
        assert!(task.log_time(-1.0, worker).unwrap_err().is_validation());
        assert_eq!(task.actual_hours(), 0.0);

        task.log_time(3.0, worker).unwrap();
        task.log_time(3.0, worker).unwrap();
        assert_eq!(task.actual_hours(), 6.0);
    }

    #[test]
    fn checklist_keeps_insertion_order_and_completion_stamps() {
        let mut task = todo();
        let first = task.add_checklist_item("rack the servers").unwrap();
        let second = task.add_checklist_item("cable the switches").unwrap();

        let orders: Vec<u32> = task.checklist().map(|item| item.order).collect();
        assert_eq!(orders, vec![0, 1]);

        let user = UserId::new();
        task.complete_checklist_item(first, user).unwrap();
        let item = task.checklist_item(first).unwrap();
        assert!(item.is_completed);
        assert_eq!(item.completed_by, Some(user));
        assert!(item.completed_at.is_some());

        assert!(task
            .complete_checklist_item(first, user)
            .unwrap_err()
            .is_validation());
        assert!(!task.checklist_item(second).unwrap().is_completed);

        assert!(task
            .complete_checklist_item(ChecklistItemId::new(), user)
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn activity_log_records_every_operation() {
        let mut task = todo();
        task.assign_to_user(UserId::new()).unwrap();
        task.start().unwrap();
        task.block("dependency").unwrap();
        task.unblock().unwrap();
        task.complete().unwrap();

        let actions: Vec<&str> = task
            .activity_log()
            .iter()
            .map(|entry| entry.action.as_str())
            .collect();
        assert_eq!(
            actions,
            vec![
                "Created",
                "AssignedToUser",
                "Started",
                "Blocked",
                "Unblocked",
                "Completed"
            ]
        );
    }

    #[test]
    fn terminal_task_rejects_children_and_time() {
        let mut task = todo();
        task.cancel(None).unwrap();

        assert!(task.add_checklist_item("too late").is_err());
        assert!(task.log_time(1.0, UserId::new()).is_err());
        assert!(task.block("too late").is_err());
    }

    proptest! {
        #[test]
        fn logged_time_always_accumulates(hours in proptest::collection::vec(0.1f32..40.0, 1..10)) {
            let mut task = todo();
            let worker = UserId::new();
            let mut expected = 0.0f32;
            for h in &hours {
                task.log_time(*h, worker).unwrap();
                expected += h;
            }
            prop_assert!((task.actual_hours() - expected).abs() < 1e-4);
        }
    }
}
