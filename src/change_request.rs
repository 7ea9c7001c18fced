//! Change request aggregate
//!
//! Changes go through change-advisory approval, get scheduled into an
//! execution window, and end in exactly one of Completed, Failed, or
//! RolledBack once execution starts.

use crate::audit::AuditBlock;
use crate::errors::{DomainError, DomainResult};
use crate::events::WorkItemEvent;
use crate::guards;
use crate::identifiers::{ChangeRequestId, TenantId, UserId};
use crate::journal::EventJournal;
use crate::status::{ChangeRequestStatus, ChangeType, Priority, RiskLevel, Status, WorkItemKind};
use crate::validate;
use crate::work_item::WorkItem;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const KIND: WorkItemKind = WorkItemKind::ChangeRequest;

/// The window a change is scheduled to execute in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledWindow {
    /// Window start
    pub start: DateTime<Utc>,
    /// Window end; strictly after `start`
    pub end: DateTime<Utc>,
}

/// A change under change-advisory approval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRequest {
    id: ChangeRequestId,
    tenant_id: TenantId,
    title: String,
    description: String,
    status: ChangeRequestStatus,
    priority: Priority,
    risk_level: RiskLevel,
    change_type: ChangeType,
    impact_assessment: String,
    rollback_plan: String,
    affected_systems: Vec<String>,
    scheduled_window: Option<ScheduledWindow>,
    reviewer: Option<UserId>,
    review_notes: Option<String>,
    approved_by: Option<UserId>,
    approval_notes: Option<String>,
    denied_by: Option<UserId>,
    denial_reason: Option<String>,
    failure_reason: Option<String>,
    rollback_reason: Option<String>,
    cancellation_reason: Option<String>,
    audit: AuditBlock,
    version: u64,
    #[serde(skip)]
    journal: EventJournal,
}

impl ChangeRequest {
    /// Create a new change request in `Draft`
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        tenant_id: TenantId,
        title: impl Into<String>,
        description: impl Into<String>,
        priority: Priority,
        risk_level: RiskLevel,
        change_type: ChangeType,
        impact_assessment: impl Into<String>,
        rollback_plan: impl Into<String>,
        affected_systems: Vec<String>,
        created_by: UserId,
    ) -> DomainResult<Self> {
        let title = validate::title(title.into())?;
        let description = validate::description(description.into())?;
        let id = ChangeRequestId::new();

        let mut change = Self {
            id,
            tenant_id,
            title,
            description,
            status: ChangeRequestStatus::Draft,
            priority,
            risk_level,
            change_type,
            impact_assessment: impact_assessment.into(),
            rollback_plan: rollback_plan.into(),
            affected_systems,
            scheduled_window: None,
            reviewer: None,
            review_notes: None,
            approved_by: None,
            approval_notes: None,
            denied_by: None,
            denial_reason: None,
            failure_reason: None,
            rollback_reason: None,
            cancellation_reason: None,
            audit: AuditBlock::new(created_by),
            version: 0,
            journal: EventJournal::new(),
        };
        change.journal.record(WorkItemEvent::ChangeRequestCreated {
            id,
            tenant_id,
            created_by,
        });
        Ok(change)
    }

    /// The change request's identifier
    pub fn id(&self) -> ChangeRequestId {
        self.id
    }

    /// Current status
    pub fn status(&self) -> ChangeRequestStatus {
        self.status
    }

    /// Title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Risk assessment
    pub fn risk_level(&self) -> RiskLevel {
        self.risk_level
    }

    /// Change classification
    pub fn change_type(&self) -> ChangeType {
        self.change_type
    }

    /// The scheduled execution window, once scheduled
    pub fn scheduled_window(&self) -> Option<ScheduledWindow> {
        self.scheduled_window
    }

    /// Systems this change touches
    pub fn affected_systems(&self) -> &[String] {
        &self.affected_systems
    }

    /// Who approved the change, once approved
    pub fn approved_by(&self) -> Option<UserId> {
        self.approved_by
    }

    /// Why the change was denied, once denied
    pub fn denial_reason(&self) -> Option<&str> {
        self.denial_reason.as_deref()
    }

    /// Why execution failed, once failed
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// Audit stamps
    pub fn audit(&self) -> &AuditBlock {
        &self.audit
    }

    /// Submit the draft to the change advisory board
    pub fn submit(&mut self) -> DomainResult<()> {
        guards::ensure_exact(KIND, "Submit", self.status, ChangeRequestStatus::Draft)?;
        self.status = ChangeRequestStatus::Pending;
        self.mutated(WorkItemEvent::ChangeRequestSubmitted { id: self.id });
        Ok(())
    }

    /// Pick the change up for CAB review; records the reviewer, appends no event
    pub fn start_review(&mut self, reviewer: UserId, notes: Option<String>) -> DomainResult<()> {
        guards::ensure_exact(KIND, "StartReview", self.status, ChangeRequestStatus::Pending)?;
        self.status = ChangeRequestStatus::InReview;
        self.reviewer = Some(reviewer);
        self.review_notes = notes;
        self.audit.touch();
        Ok(())
    }

    /// Approve the change on behalf of the CAB
    pub fn approve(&mut self, approved_by: UserId, notes: Option<String>) -> DomainResult<()> {
        guards::ensure_capability(KIND, "Approve", self.status, |caps| caps.can_review)?;
        self.status = ChangeRequestStatus::Approved;
        self.approved_by = Some(approved_by);
        self.approval_notes = notes.clone();
        self.mutated(WorkItemEvent::ChangeRequestApproved {
            id: self.id,
            approved_by,
            notes,
        });
        Ok(())
    }

    /// Deny the change with a required reason
    pub fn deny(&mut self, denied_by: UserId, reason: impl Into<String>) -> DomainResult<()> {
        guards::ensure_capability(KIND, "Deny", self.status, |caps| caps.can_review)?;
        let reason = validate::required_reason(reason.into())?;
        self.status = ChangeRequestStatus::Denied;
        self.denied_by = Some(denied_by);
        self.denial_reason = Some(reason.clone());
        self.mutated(WorkItemEvent::ChangeRequestDenied {
            id: self.id,
            denied_by,
            reason,
        });
        Ok(())
    }

    /// Schedule the approved change into a window
    ///
    /// The window must end strictly after it starts.
    pub fn schedule(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> DomainResult<()> {
        guards::ensure_capability(KIND, "Schedule", self.status, |caps| caps.can_schedule)?;
        if end <= start {
            return Err(DomainError::validation(
                "scheduled window must end after it starts",
            ));
        }
        self.status = ChangeRequestStatus::Scheduled;
        self.scheduled_window = Some(ScheduledWindow { start, end });
        self.mutated(WorkItemEvent::ChangeRequestScheduled {
            id: self.id,
            window_start: start,
            window_end: end,
        });
        Ok(())
    }

    /// Begin executing the scheduled change
    pub fn start_execution(&mut self) -> DomainResult<()> {
        guards::ensure_capability(KIND, "StartExecution", self.status, |caps| caps.can_execute)?;
        self.status = ChangeRequestStatus::InProgress;
        self.mutated(WorkItemEvent::ChangeRequestExecutionStarted { id: self.id });
        Ok(())
    }

    /// Record successful execution
    pub fn complete(&mut self) -> DomainResult<()> {
        guards::ensure_capability(KIND, "Complete", self.status, |caps| caps.can_complete)?;
        self.status = ChangeRequestStatus::Completed;
        self.mutated(WorkItemEvent::ChangeRequestCompleted { id: self.id });
        Ok(())
    }

    /// Record a failed execution with a required reason
    pub fn mark_as_failed(&mut self, reason: impl Into<String>) -> DomainResult<()> {
        guards::ensure_capability(KIND, "MarkAsFailed", self.status, |caps| caps.can_complete)?;
        let reason = validate::required_reason(reason.into())?;
        self.status = ChangeRequestStatus::Failed;
        self.failure_reason = Some(reason.clone());
        self.mutated(WorkItemEvent::ChangeRequestFailed {
            id: self.id,
            reason,
        });
        Ok(())
    }

    /// Record that the change was rolled back, with a required reason
    pub fn rollback(&mut self, reason: impl Into<String>) -> DomainResult<()> {
        guards::ensure_capability(KIND, "Rollback", self.status, |caps| caps.can_complete)?;
        let reason = validate::required_reason(reason.into())?;
        self.status = ChangeRequestStatus::RolledBack;
        self.rollback_reason = Some(reason.clone());
        self.mutated(WorkItemEvent::ChangeRequestRolledBack {
            id: self.id,
            reason,
        });
        Ok(())
    }

    /// Withdraw the change before execution begins
    pub fn cancel(&mut self, reason: Option<String>) -> DomainResult<()> {
        guards::ensure_capability(KIND, "Cancel", self.status, |caps| caps.can_cancel)?;
        self.status = ChangeRequestStatus::Cancelled;
        self.cancellation_reason = reason.clone();
        self.mutated(WorkItemEvent::ChangeRequestCancelled {
            id: self.id,
            reason,
        });
        Ok(())
    }

    /// Edit details while the status permits
    #[allow(clippy::too_many_arguments)]
    pub fn update_details(
        &mut self,
        title: Option<String>,
        description: Option<String>,
        priority: Option<Priority>,
        risk_level: Option<RiskLevel>,
        change_type: Option<ChangeType>,
        impact_assessment: Option<String>,
        rollback_plan: Option<String>,
    ) -> DomainResult<()> {
        guards::ensure_capability(KIND, "UpdateDetails", self.status, |caps| caps.can_edit)?;
        if let Some(title) = title {
            self.title = validate::title(title)?;
        }
        if let Some(description) = description {
            self.description = validate::description(description)?;
        }
        if let Some(priority) = priority {
            self.priority = priority;
        }
        if let Some(risk_level) = risk_level {
            self.risk_level = risk_level;
        }
        if let Some(change_type) = change_type {
            self.change_type = change_type;
        }
        if let Some(impact) = impact_assessment {
            self.impact_assessment = impact;
        }
        if let Some(plan) = rollback_plan {
            self.rollback_plan = plan;
        }
        self.mutated(WorkItemEvent::ChangeRequestUpdated { id: self.id });
        Ok(())
    }

    /// Immutable read-side view
    pub fn snapshot(&self) -> ChangeRequestSnapshot {
        ChangeRequestSnapshot {
            id: self.id,
            tenant_id: self.tenant_id,
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            priority: self.priority,
            risk_level: self.risk_level,
            change_type: self.change_type,
            impact_assessment: self.impact_assessment.clone(),
            rollback_plan: self.rollback_plan.clone(),
            affected_systems: self.affected_systems.clone(),
            scheduled_window: self.scheduled_window,
            approved_by: self.approved_by,
            denial_reason: self.denial_reason.clone(),
            failure_reason: self.failure_reason.clone(),
            rollback_reason: self.rollback_reason.clone(),
            created_by: self.audit.created_by,
            created_at: self.audit.created_at,
            last_modified_at: self.audit.last_modified_at,
        }
    }

    fn mutated(&mut self, event: WorkItemEvent) {
        self.audit.touch();
        self.journal.record(event);
    }
}

impl WorkItem for ChangeRequest {
    type Id = ChangeRequestId;
    const KIND: WorkItemKind = KIND;

    fn id(&self) -> ChangeRequestId {
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

/// Read-side snapshot of a [`ChangeRequest`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRequestSnapshot {
    /// The change request's identifier
    pub id: ChangeRequestId,
    /// Owning tenant
    pub tenant_id: TenantId,
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Current status
    pub status: ChangeRequestStatus,
    /// Priority
    pub priority: Priority,
    /// Risk assessment
    pub risk_level: RiskLevel,
    /// Change classification
    pub change_type: ChangeType,
    /// Expected impact
    pub impact_assessment: String,
    /// How to undo the change
    pub rollback_plan: String,
    /// Systems this change touches
    pub affected_systems: Vec<String>,
    /// Scheduled execution window
    pub scheduled_window: Option<ScheduledWindow>,
    /// Who approved it
    pub approved_by: Option<UserId>,
    /// Why it was denied
    pub denial_reason: Option<String>,
    /// Why execution failed
    pub failure_reason: Option<String>,
    /// Why it was rolled back
    pub rollback_reason: Option<String>,
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
    use chrono::Duration;

    fn approved() -> ChangeRequest {
        let mut change = ChangeRequest::create(
            TenantId::new(),
            "Rotate database credentials",
            "Quarterly rotation",
            Priority::High,
            RiskLevel::Medium,
            ChangeType::Normal,
            "Brief connection drops during rotation",
            "Restore previous credentials from the vault",
            vec!["orders-db".to_string(), "billing-db".to_string()],
            UserId::new(),
        )
        .unwrap();
        change.submit().unwrap();
        change.approve(UserId::new(), None).unwrap();
        change
    }

    #[test]
    fn schedule_rejects_inverted_window() {
        let mut change = approved();
        let start = Utc::now();

        let err = change.schedule(start, start).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(change.status(), ChangeRequestStatus::Approved);
        assert_eq!(change.scheduled_window(), None);

        let err = change.schedule(start, start - Duration::hours(1)).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn execution_path_ends_in_exactly_one_terminal() {
        let start = Utc::now();
        let end = start + Duration::hours(2);

        let mut completed = approved();
        completed.schedule(start, end).unwrap();
        completed.start_execution().unwrap();
        completed.complete().unwrap();
        assert!(completed.is_terminal());
        assert!(completed.mark_as_failed("late failure").is_err());

        let mut failed = approved();
        failed.schedule(start, end).unwrap();
        failed.start_execution().unwrap();
        failed.mark_as_failed("migration script crashed").unwrap();
        assert_eq!(failed.status(), ChangeRequestStatus::Failed);
        assert_eq!(failed.failure_reason(), Some("migration script crashed"));

        let mut rolled_back = approved();
        rolled_back.schedule(start, end).unwrap();
        rolled_back.start_execution().unwrap();
        rolled_back.rollback("latency regression").unwrap();
        assert_eq!(rolled_back.status(), ChangeRequestStatus::RolledBack);
    }

    #[test]
    fn cannot_execute_without_scheduling() {
        let mut change = approved();
        let err = change.start_execution().unwrap_err();
        assert_eq!(
            err.to_string(),
            "StartExecution is not allowed for ChangeRequest in status Approved"
        );
    }

    #[test]
    fn cancel_is_blocked_once_execution_starts() {
        let mut change = approved();
        change
            .schedule(Utc::now(), Utc::now() + Duration::hours(1))
            .unwrap();
        assert!(change.cancel(None).is_ok());

        let mut executing = approved();
        executing
            .schedule(Utc::now(), Utc::now() + Duration::hours(1))
            .unwrap();
        executing.start_execution().unwrap();
        assert!(executing.cancel(None).is_err());
    }

    #[test]
    fn risk_and_type_editable_only_in_draft() {
        let mut change = approved();
        assert!(change
            .update_details(None, None, None, Some(RiskLevel::High), None, None, None)
            .is_err());
        assert_eq!(change.risk_level(), RiskLevel::Medium);
    }
}
