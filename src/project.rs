//! Project aggregate
//!
//! Created directly or seeded from an approved
//! [`ProjectRequest`](crate::ProjectRequest) by the conversion workflow.

use crate::audit::AuditBlock;
use crate::errors::DomainResult;
use crate::events::WorkItemEvent;
use crate::guards;
use crate::identifiers::{ProjectId, ProjectRequestId, TenantId, UserId};
use crate::journal::EventJournal;
use crate::status::{Priority, ProjectStatus, Status, WorkItemKind};
use crate::validate;
use crate::work_item::WorkItem;
use serde::{Deserialize, Serialize};

const KIND: WorkItemKind = WorkItemKind::Project;

/// A project moving from planning through delivery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    tenant_id: TenantId,
    name: String,
    description: String,
    status: ProjectStatus,
    priority: Priority,
    manager: Option<UserId>,
    origin_request: Option<ProjectRequestId>,
    hold_reason: Option<String>,
    cancellation_reason: Option<String>,
    audit: AuditBlock,
    version: u64,
    #[serde(skip)]
    journal: EventJournal,
}

impl Project {
    /// Create a new project in `Planning`
    pub fn create(
        tenant_id: TenantId,
        name: impl Into<String>,
        description: impl Into<String>,
        priority: Priority,
        created_by: UserId,
    ) -> DomainResult<Self> {
        Self::new(tenant_id, name, description, priority, created_by, None)
    }

    /// Create a project seeded from an approved project request
    ///
    /// Used by the conversion workflow; the origin id ends up both here and
    /// as a back-reference on the converted request.
    pub fn create_from_request(
        tenant_id: TenantId,
        origin: ProjectRequestId,
        name: impl Into<String>,
        description: impl Into<String>,
        priority: Priority,
        created_by: UserId,
    ) -> DomainResult<Self> {
        Self::new(
            tenant_id,
            name,
            description,
            priority,
            created_by,
            Some(origin),
        )
    }

    fn new(
        tenant_id: TenantId,
        name: impl Into<String>,
        description: impl Into<String>,
        priority: Priority,
        created_by: UserId,
        origin_request: Option<ProjectRequestId>,
    ) -> DomainResult<Self> {
        let name = validate::title(name.into())?;
        let description = validate::description(description.into())?;
        let id = ProjectId::new();

        let mut project = Self {
            id,
            tenant_id,
            name,
            description,
            status: ProjectStatus::Planning,
            priority,
            manager: None,
            origin_request,
            hold_reason: None,
            cancellation_reason: None,
            audit: AuditBlock::new(created_by),
            version: 0,
            journal: EventJournal::new(),
        };
        project.journal.record(WorkItemEvent::ProjectCreated {
            id,
            tenant_id,
            created_by,
            origin_request,
        });
        Ok(project)
    }

    /// The project's identifier
    pub fn id(&self) -> ProjectId {
        self.id
    }

    /// Current status
    pub fn status(&self) -> ProjectStatus {
        self.status
    }

    /// Name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Priority
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Current manager, if assigned
    pub fn manager(&self) -> Option<UserId> {
        self.manager
    }

    /// The project request this project came from, if converted
    pub fn origin_request(&self) -> Option<ProjectRequestId> {
        self.origin_request
    }

    /// Why the project is on hold, while it is
    pub fn hold_reason(&self) -> Option<&str> {
        self.hold_reason.as_deref()
    }

    /// Audit stamps
    pub fn audit(&self) -> &AuditBlock {
        &self.audit
    }

    /// Assign or replace the project manager
    pub fn assign_manager(&mut self, manager: UserId) -> DomainResult<()> {
        guards::ensure_capability(KIND, "AssignManager", self.status, |caps| caps.can_assign)?;
        self.manager = Some(manager);
        self.mutated(WorkItemEvent::ProjectManagerAssigned {
            id: self.id,
            manager,
        });
        Ok(())
    }

    /// Move the project from `Planning` to `Active`
    pub fn start(&mut self) -> DomainResult<()> {
        guards::ensure_capability(KIND, "Start", self.status, |caps| caps.can_start)?;
        self.status = ProjectStatus::Active;
        self.mutated(WorkItemEvent::ProjectStarted { id: self.id });
        Ok(())
    }

    /// Put the active project on hold with a required reason
    pub fn put_on_hold(&mut self, reason: impl Into<String>) -> DomainResult<()> {
        guards::ensure_capability(KIND, "PutOnHold", self.status, |caps| caps.can_put_on_hold)?;
        let reason = validate::required_reason(reason.into())?;
        self.status = ProjectStatus::OnHold;
        self.hold_reason = Some(reason.clone());
        self.mutated(WorkItemEvent::ProjectPutOnHold {
            id: self.id,
            reason,
        });
        Ok(())
    }

    /// Resume the on-hold project
    pub fn resume(&mut self) -> DomainResult<()> {
        guards::ensure_capability(KIND, "Resume", self.status, |caps| caps.can_resume)?;
        self.status = ProjectStatus::Active;
        self.hold_reason = None;
        self.mutated(WorkItemEvent::ProjectResumed { id: self.id });
        Ok(())
    }

    /// Complete the active project
    pub fn complete(&mut self) -> DomainResult<()> {
        guards::ensure_capability(KIND, "Complete", self.status, |caps| caps.can_complete)?;
        self.status = ProjectStatus::Completed;
        self.mutated(WorkItemEvent::ProjectCompleted { id: self.id });
        Ok(())
    }

    /// Cancel the project from any non-terminal status
    pub fn cancel(&mut self, reason: Option<String>) -> DomainResult<()> {
        guards::ensure_capability(KIND, "Cancel", self.status, |caps| caps.can_cancel)?;
        self.status = ProjectStatus::Cancelled;
        self.cancellation_reason = reason.clone();
        self.mutated(WorkItemEvent::ProjectCancelled {
            id: self.id,
            reason,
        });
        Ok(())
    }

    /// Edit name, description, or priority while still planning
    pub fn update_details(
        &mut self,
        name: Option<String>,
        description: Option<String>,
        priority: Option<Priority>,
    ) -> DomainResult<()> {
        guards::ensure_capability(KIND, "UpdateDetails", self.status, |caps| caps.can_edit)?;
        if let Some(name) = name {
            self.name = validate::title(name)?;
        }
        if let Some(description) = description {
            self.description = validate::description(description)?;
        }
        if let Some(priority) = priority {
            self.priority = priority;
        }
        self.mutated(WorkItemEvent::ProjectUpdated { id: self.id });
        Ok(())
    }

    /// Immutable read-side view
    pub fn snapshot(&self) -> ProjectSnapshot {
        ProjectSnapshot {
            id: self.id,
            tenant_id: self.tenant_id,
            name: self.name.clone(),
            description: self.description.clone(),
            status: self.status,
            priority: self.priority,
            manager: self.manager,
            origin_request: self.origin_request,
            hold_reason: self.hold_reason.clone(),
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

impl WorkItem for Project {
    type Id = ProjectId;
    const KIND: WorkItemKind = KIND;

    fn id(&self) -> ProjectId {
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

/// Read-side snapshot of a [`Project`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    /// The project's identifier
    pub id: ProjectId,
    /// Owning tenant
    pub tenant_id: TenantId,
    /// Name
    pub name: String,
    /// Description
    pub description: String,
    /// Current status
    pub status: ProjectStatus,
    /// Priority
    pub priority: Priority,
    /// Current manager
    pub manager: Option<UserId>,
    /// The project request this project came from
    pub origin_request: Option<ProjectRequestId>,
    /// Why the project is on hold
    pub hold_reason: Option<String>,
    /// Who created it
    pub created_by: UserId,
    /// When it was created
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// When it was last mutated
    pub last_modified_at: chrono::DateTime<chrono::Utc>,
}
