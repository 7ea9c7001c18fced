//! Project request aggregate
//!
//! A request whose approval makes it eligible for exactly one conversion
//! into a [`Project`](crate::Project). Conversion is driven by the
//! cross-aggregate workflow in [`crate::workflows`]; this aggregate only
//! guards its own side of it.

use crate::audit::AuditBlock;
use crate::errors::DomainResult;
use crate::events::WorkItemEvent;
use crate::guards;
use crate::identifiers::{ProjectId, ProjectRequestId, TenantId, UserId};
use crate::journal::EventJournal;
use crate::status::{Priority, ProjectRequestStatus, Status, WorkItemKind};
use crate::validate;
use crate::work_item::WorkItem;
use serde::{Deserialize, Serialize};

const KIND: WorkItemKind = WorkItemKind::ProjectRequest;

/// A request to start a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRequest {
    id: ProjectRequestId,
    tenant_id: TenantId,
    title: String,
    description: String,
    status: ProjectRequestStatus,
    priority: Priority,
    reviewer: Option<UserId>,
    review_notes: Option<String>,
    approved_by: Option<UserId>,
    approval_notes: Option<String>,
    denied_by: Option<UserId>,
    denial_reason: Option<String>,
    cancellation_reason: Option<String>,
    converted_project_id: Option<ProjectId>,
    audit: AuditBlock,
    version: u64,
    #[serde(skip)]
    journal: EventJournal,
}

impl ProjectRequest {
    /// Create a new project request in `Draft`
    pub fn create(
        tenant_id: TenantId,
        title: impl Into<String>,
        description: impl Into<String>,
        priority: Priority,
        created_by: UserId,
    ) -> DomainResult<Self> {
        let title = validate::title(title.into())?;
        let description = validate::description(description.into())?;
        let id = ProjectRequestId::new();

        let mut request = Self {
            id,
            tenant_id,
            title,
            description,
            status: ProjectRequestStatus::Draft,
            priority,
            reviewer: None,
            review_notes: None,
            approved_by: None,
            approval_notes: None,
            denied_by: None,
            denial_reason: None,
            cancellation_reason: None,
            converted_project_id: None,
            audit: AuditBlock::new(created_by),
            version: 0,
            journal: EventJournal::new(),
        };
        request.journal.record(WorkItemEvent::ProjectRequestCreated {
            id,
            tenant_id,
            created_by,
        });
        Ok(request)
    }

    /// The project request's identifier
    pub fn id(&self) -> ProjectRequestId {
        self.id
    }

    /// Current status
    pub fn status(&self) -> ProjectRequestStatus {
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

    /// Who approved the request, once approved
    pub fn approved_by(&self) -> Option<UserId> {
        self.approved_by
    }

    /// The project this request became, once converted
    pub fn converted_project_id(&self) -> Option<ProjectId> {
        self.converted_project_id
    }

    /// Audit stamps
    pub fn audit(&self) -> &AuditBlock {
        &self.audit
    }

    /// Submit the draft for review
    pub fn submit(&mut self) -> DomainResult<()> {
        guards::ensure_exact(KIND, "Submit", self.status, ProjectRequestStatus::Draft)?;
        self.status = ProjectRequestStatus::Pending;
        self.mutated(WorkItemEvent::ProjectRequestSubmitted { id: self.id });
        Ok(())
    }

    /// Pick the request up for review; records the reviewer, appends no event
    pub fn start_review(&mut self, reviewer: UserId, notes: Option<String>) -> DomainResult<()> {
        guards::ensure_exact(KIND, "StartReview", self.status, ProjectRequestStatus::Pending)?;
        self.status = ProjectRequestStatus::InReview;
        self.reviewer = Some(reviewer);
        self.review_notes = notes;
        self.audit.touch();
        Ok(())
    }

    /// Approve the request, making it convert-eligible
    pub fn approve(&mut self, approved_by: UserId, notes: Option<String>) -> DomainResult<()> {
        guards::ensure_capability(KIND, "Approve", self.status, |caps| caps.can_review)?;
        self.status = ProjectRequestStatus::Approved;
        self.approved_by = Some(approved_by);
        self.approval_notes = notes.clone();
        self.mutated(WorkItemEvent::ProjectRequestApproved {
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
        self.status = ProjectRequestStatus::Denied;
        self.denied_by = Some(denied_by);
        self.denial_reason = Some(reason.clone());
        self.mutated(WorkItemEvent::ProjectRequestDenied {
            id: self.id,
            denied_by,
            reason,
        });
        Ok(())
    }

    /// Record the conversion into `project_id`
    ///
    /// Only an approved request converts, and only once: `Converted` is
    /// terminal, so a second attempt fails the guard. The back-reference
    /// makes the link navigable from either side.
    pub fn mark_as_converted(&mut self, project_id: ProjectId) -> DomainResult<()> {
        guards::ensure_capability(KIND, "MarkAsConverted", self.status, |caps| {
            caps.can_convert_to_project
        })?;
        self.status = ProjectRequestStatus::Converted;
        self.converted_project_id = Some(project_id);
        self.mutated(WorkItemEvent::ProjectRequestConverted {
            id: self.id,
            project_id,
        });
        Ok(())
    }

    /// Cancel the request
    pub fn cancel(&mut self, reason: Option<String>) -> DomainResult<()> {
        guards::ensure_capability(KIND, "Cancel", self.status, |caps| caps.can_cancel)?;
        self.status = ProjectRequestStatus::Cancelled;
        self.cancellation_reason = reason.clone();
        self.mutated(WorkItemEvent::ProjectRequestCancelled {
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
        self.mutated(WorkItemEvent::ProjectRequestUpdated { id: self.id });
        Ok(())
    }

    /// Immutable read-side view
    pub fn snapshot(&self) -> ProjectRequestSnapshot {
        ProjectRequestSnapshot {
            id: self.id,
            tenant_id: self.tenant_id,
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            priority: self.priority,
            approved_by: self.approved_by,
            denial_reason: self.denial_reason.clone(),
            converted_project_id: self.converted_project_id,
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

impl WorkItem for ProjectRequest {
    type Id = ProjectRequestId;
    const KIND: WorkItemKind = KIND;

    fn id(&self) -> ProjectRequestId {
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

/// Read-side snapshot of a [`ProjectRequest`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRequestSnapshot {
    /// The project request's identifier
    pub id: ProjectRequestId,
    /// Owning tenant
    pub tenant_id: TenantId,
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Current status
    pub status: ProjectRequestStatus,
    /// Priority
    pub priority: Priority,
    /// Who approved it
    pub approved_by: Option<UserId>,
    /// Why it was denied
    pub denial_reason: Option<String>,
    /// The project it became
    pub converted_project_id: Option<ProjectId>,
    /// Who created it
    pub created_by: UserId,
    /// When it was created
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// When it was last mutated
    pub last_modified_at: chrono::DateTime<chrono::Utc>,
}
