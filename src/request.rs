//! Generic request aggregate
//!
//! The simplest of the five kinds: drafted, submitted for review, approved or
//! denied, then assigned and worked to completion.

use crate::audit::AuditBlock;
use crate::errors::DomainResult;
use crate::events::WorkItemEvent;
use crate::guards;
use crate::identifiers::{RequestId, TenantId, UserId};
use crate::journal::EventJournal;
use crate::status::{Priority, RequestStatus, Status, WorkItemKind};
use crate::validate;
use crate::work_item::WorkItem;
use serde::{Deserialize, Serialize};

const KIND: WorkItemKind = WorkItemKind::Request;

/// A generic request moving through approval and execution
///
/// Born through [`Request::create`], mutated only through the named
/// operations, never deleted - a finished request sits in a terminal status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    id: RequestId,
    tenant_id: TenantId,
    title: String,
    description: String,
    status: RequestStatus,
    priority: Priority,
    assignee: Option<UserId>,
    reviewer: Option<UserId>,
    review_notes: Option<String>,
    approved_by: Option<UserId>,
    approval_notes: Option<String>,
    denied_by: Option<UserId>,
    denial_reason: Option<String>,
    cancellation_reason: Option<String>,
    audit: AuditBlock,
    version: u64,
    #[serde(skip)]
    journal: EventJournal,
}

impl Request {
    /// Create a new request in `Draft`
    ///
    /// Validates field constraints, establishes all invariants atomically,
    /// and appends the `Created` event.
    pub fn create(
        tenant_id: TenantId,
        title: impl Into<String>,
        description: impl Into<String>,
        priority: Priority,
        created_by: UserId,
    ) -> DomainResult<Self> {
        let title = validate::title(title.into())?;
        let description = validate::description(description.into())?;
        let id = RequestId::new();

        let mut request = Self {
            id,
            tenant_id,
            title,
            description,
            status: RequestStatus::Draft,
            priority,
            assignee: None,
            reviewer: None,
            review_notes: None,
            approved_by: None,
            approval_notes: None,
            denied_by: None,
            denial_reason: None,
            cancellation_reason: None,
            audit: AuditBlock::new(created_by),
            version: 0,
            journal: EventJournal::new(),
        };
        request.journal.record(WorkItemEvent::RequestCreated {
            id,
            tenant_id,
            created_by,
        });
        Ok(request)
    }

    /// The request's identifier
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Current status
    pub fn status(&self) -> RequestStatus {
        self.status
    }

    /// Title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Priority
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Current assignee, if any
    pub fn assignee(&self) -> Option<UserId> {
        self.assignee
    }

    /// Who approved the request, once approved
    pub fn approved_by(&self) -> Option<UserId> {
        self.approved_by
    }

    /// Why the request was denied, once denied
    pub fn denial_reason(&self) -> Option<&str> {
        self.denial_reason.as_deref()
    }

    /// Audit stamps
    pub fn audit(&self) -> &AuditBlock {
        &self.audit
    }

    /// Submit the draft for review
    ///
    /// Exact-status gated: only a request still in `Draft` may be submitted.
    pub fn submit(&mut self) -> DomainResult<()> {
        guards::ensure_exact(KIND, "Submit", self.status, RequestStatus::Draft)?;
        self.status = RequestStatus::Pending;
        self.mutated(WorkItemEvent::RequestSubmitted { id: self.id });
        Ok(())
    }

    /// Pick the request up for review, recording the reviewer
    ///
    /// The one mutation that appends no event: review pickup is bookkeeping,
    /// not a domain fact other systems react to.
    pub fn start_review(&mut self, reviewer: UserId, notes: Option<String>) -> DomainResult<()> {
        guards::ensure_exact(KIND, "StartReview", self.status, RequestStatus::Pending)?;
        self.status = RequestStatus::InReview;
        self.reviewer = Some(reviewer);
        self.review_notes = notes;
        self.audit.touch();
        Ok(())
    }

    /// Approve the request, with optional notes
    pub fn approve(&mut self, approved_by: UserId, notes: Option<String>) -> DomainResult<()> {
        guards::ensure_capability(KIND, "Approve", self.status, |caps| caps.can_review)?;
        self.status = RequestStatus::Approved;
        self.approved_by = Some(approved_by);
        self.approval_notes = notes.clone();
        self.mutated(WorkItemEvent::RequestApproved {
            id: self.id,
            approved_by,
            notes,
        });
        Ok(())
    }

    /// Deny the request with a required reason
    pub fn deny(&mut self, denied_by: UserId, reason: impl Into<String>) -> DomainResult<()> {
        guards::ensure_capability(KIND, "Deny", self.status, |caps| caps.can_review)?;
        let reason = validate::required_reason(reason.into())?;
        self.status = RequestStatus::Denied;
        self.denied_by = Some(denied_by);
        self.denial_reason = Some(reason.clone());
        self.mutated(WorkItemEvent::RequestDenied {
            id: self.id,
            denied_by,
            reason,
        });
        Ok(())
    }

    /// Assign the approved request, or reassign while in progress
    pub fn assign(&mut self, assignee: UserId) -> DomainResult<()> {
        guards::ensure_capability(KIND, "Assign", self.status, |caps| caps.can_assign)?;
        self.status = RequestStatus::InProgress;
        self.assignee = Some(assignee);
        self.mutated(WorkItemEvent::RequestAssigned {
            id: self.id,
            assignee,
        });
        Ok(())
    }

    /// Complete the in-progress request
    pub fn complete(&mut self) -> DomainResult<()> {
        guards::ensure_capability(KIND, "Complete", self.status, |caps| caps.can_complete)?;
        self.status = RequestStatus::Completed;
        self.mutated(WorkItemEvent::RequestCompleted { id: self.id });
        Ok(())
    }

    /// Cancel the request from any non-terminal status that permits it
    pub fn cancel(&mut self, reason: Option<String>) -> DomainResult<()> {
        guards::ensure_capability(KIND, "Cancel", self.status, |caps| caps.can_cancel)?;
        self.status = RequestStatus::Cancelled;
        self.cancellation_reason = reason.clone();
        self.mutated(WorkItemEvent::RequestCancelled {
            id: self.id,
            reason,
        });
        Ok(())
    }

    /// Edit title, description, or priority while the status permits
    pub fn update_details(
        &mut self,
        title: Option<String>,
        description: Option<String>,
        priority: Option<Priority>,
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
        self.mutated(WorkItemEvent::RequestUpdated { id: self.id });
        Ok(())
    }

    /// Immutable read-side view for reporting and notification consumers
    pub fn snapshot(&self) -> RequestSnapshot {
        RequestSnapshot {
            id: self.id,
            tenant_id: self.tenant_id,
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            priority: self.priority,
            assignee: self.assignee,
            reviewer: self.reviewer,
            approved_by: self.approved_by,
            approval_notes: self.approval_notes.clone(),
            denied_by: self.denied_by,
            denial_reason: self.denial_reason.clone(),
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

impl WorkItem for Request {
    type Id = RequestId;
    const KIND: WorkItemKind = KIND;

    fn id(&self) -> RequestId {
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

/// Read-side snapshot of a [`Request`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSnapshot {
    /// The request's identifier
    pub id: RequestId,
    /// Owning tenant
    pub tenant_id: TenantId,
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Current status
    pub status: RequestStatus,
    /// Priority
    pub priority: Priority,
    /// Current assignee
    pub assignee: Option<UserId>,
    /// Reviewer who picked the request up
    pub reviewer: Option<UserId>,
    /// Who approved it
    pub approved_by: Option<UserId>,
    /// Approval notes
    pub approval_notes: Option<String>,
    /// Who denied it
    pub denied_by: Option<UserId>,
    /// Why it was denied
    pub denial_reason: Option<String>,
    /// Who created it
    pub created_by: UserId,
    /// When it was created
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// When it was last mutated
    pub last_modified_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::DomainEvent;
    use pretty_assertions::assert_eq;

    fn draft() -> Request {
        Request::create(
            TenantId::new(),
            "Replace the badge printer",
            "The one on floor 2 keeps jamming",
            Priority::Medium,
            UserId::new(),
        )
        .unwrap()
    }

    fn event_types(request: &Request) -> Vec<&'static str> {
        request
            .journal()
            .pending()
            .iter()
            .map(DomainEvent::event_type)
            .collect()
    }

    #[test]
    fn create_validates_title_length() {
        let err = Request::create(
            TenantId::new(),
            "ab",
            "",
            Priority::Low,
            UserId::new(),
        )
        .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn submit_then_approve_records_the_full_journal() {
        let mut request = draft();
        let approver = UserId::new();

        request.submit().unwrap();
        request.approve(approver, Some("ok".to_string())).unwrap();

        assert_eq!(request.status(), RequestStatus::Approved);
        assert_eq!(request.approved_by(), Some(approver));
        assert_eq!(
            event_types(&request),
            vec!["RequestCreated", "RequestSubmitted", "RequestApproved"]
        );
    }

    #[test]
    fn submit_requires_draft_exactly() {
        let mut request = draft();
        request.submit().unwrap();

        let err = request.submit().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Submit is not allowed for Request in status Pending"
        );
    }

    #[test]
    fn deny_sets_reason_and_blocks_later_approval() {
        let mut request = draft();
        request.submit().unwrap();
        request
            .deny(UserId::new(), "insufficient budget")
            .unwrap();

        assert_eq!(request.status(), RequestStatus::Denied);
        assert_eq!(request.denial_reason(), Some("insufficient budget"));

        let before = request.snapshot();
        let journal_len = request.journal().len();
        let err = request.approve(UserId::new(), None).unwrap_err();
        assert!(err.is_invalid_transition());
        assert_eq!(request.snapshot(), before);
        assert_eq!(request.journal().len(), journal_len);
    }

    #[test]
    fn deny_requires_a_reason() {
        let mut request = draft();
        request.submit().unwrap();
        let err = request.deny(UserId::new(), "  ").unwrap_err();
        assert!(err.is_validation());
        // Validation is caught pre-mutation
        assert_eq!(request.status(), RequestStatus::Pending);
    }

    #[test]
    fn start_review_records_reviewer_without_an_event() {
        let mut request = draft();
        request.submit().unwrap();
        let journal_len = request.journal().len();
        let reviewer = UserId::new();

        request
            .start_review(reviewer, Some("looking".to_string()))
            .unwrap();

        assert_eq!(request.status(), RequestStatus::InReview);
        assert_eq!(request.snapshot().reviewer, Some(reviewer));
        assert_eq!(request.journal().len(), journal_len);
    }

    #[test]
    fn assign_moves_to_in_progress_and_allows_reassignment() {
        let mut request = draft();
        request.submit().unwrap();
        request.approve(UserId::new(), None).unwrap();

        let first = UserId::new();
        let second = UserId::new();
        request.assign(first).unwrap();
        assert_eq!(request.status(), RequestStatus::InProgress);
        assert_eq!(request.assignee(), Some(first));

        request.assign(second).unwrap();
        assert_eq!(request.assignee(), Some(second));

        request.complete().unwrap();
        assert_eq!(request.status(), RequestStatus::Completed);
    }

    #[test]
    fn terminal_request_rejects_every_mutation() {
        let mut request = draft();
        request.cancel(Some("no longer needed".to_string())).unwrap();
        assert!(request.is_terminal());

        let before = request.snapshot();
        let journal_len = request.journal().len();

        assert!(request.submit().is_err());
        assert!(request.approve(UserId::new(), None).is_err());
        assert!(request.deny(UserId::new(), "x").is_err());
        assert!(request.assign(UserId::new()).is_err());
        assert!(request.complete().is_err());
        assert!(request.cancel(None).is_err());
        assert!(request
            .update_details(Some("New title".to_string()), None, None)
            .is_err());

        assert_eq!(request.snapshot(), before);
        assert_eq!(request.journal().len(), journal_len);
    }

    #[test]
    fn update_details_only_in_editable_status() {
        let mut request = draft();
        request
            .update_details(None, None, Some(Priority::Critical))
            .unwrap();
        assert_eq!(request.priority(), Priority::Critical);

        request.submit().unwrap();
        assert!(request
            .update_details(None, None, Some(Priority::Low))
            .is_err());
        assert_eq!(request.priority(), Priority::Critical);
    }
}
