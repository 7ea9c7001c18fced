//! Command handlers for the five work item kinds
//!
//! Handlers own the ports and run every command through the same sequence:
//! load, tenant guard, guarded mutation, persist, dispatch. Tenant and actor
//! arrive as explicit parameters; nothing is resolved from ambient context.
//!
//! Role policy: picking an item up for review requires [`Role::Reviewer`],
//! approving or denying requires [`Role::Approver`]; every other command
//! needs tenant membership only. Claiming a task is deliberately
//! membership-based - the one guard whose "who may act" predicate is not a
//! role.

use crate::change_request::{ChangeRequest, ChangeRequestSnapshot};
use crate::commands::{
    CreateChangeRequest, CreateProject, CreateProjectRequest, CreateRequest, CreateTask,
};
use crate::commit::{CommitPipeline, EventDispatcher, WorkItemRepository};
use crate::errors::{DomainError, DomainResult};
use crate::identifiers::{
    ChangeRequestId, ChecklistItemId, DepartmentId, ProjectId, ProjectRequestId, RequestId, TaskId,
    UserId,
};
use crate::project::{Project, ProjectSnapshot};
use crate::project_request::{ProjectRequest, ProjectRequestSnapshot};
use crate::request::{Request, RequestSnapshot};
use crate::status::{Priority, WorkItemKind};
use crate::task::{Task, TaskSnapshot};
use crate::tenant::{ensure_role, ensure_same_tenant, Actor, Role};
use crate::work_item::WorkItem;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Identifying fields returned by every successful mutating command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutcome {
    /// The mutated aggregate
    pub id: Uuid,
    /// Its kind
    pub kind: WorkItemKind,
    /// The status after the mutation
    pub status: String,
    /// The version token after the persist
    pub version: u64,
}

/// Shared load/guard/mutate/commit plumbing behind each handler
pub(crate) struct HandlerCore<A: WorkItem> {
    repository: Arc<dyn WorkItemRepository<A>>,
    pipeline: CommitPipeline,
}

impl<A: WorkItem> HandlerCore<A> {
    pub(crate) fn new(
        repository: Arc<dyn WorkItemRepository<A>>,
        dispatcher: Arc<dyn EventDispatcher>,
    ) -> Self {
        Self {
            repository,
            pipeline: CommitPipeline::new(dispatcher),
        }
    }

    pub(crate) fn repository(&self) -> &dyn WorkItemRepository<A> {
        self.repository.as_ref()
    }

    /// Resolve `id` within the actor's tenant
    ///
    /// An absent id fails `NotFound`; an id present under another tenant
    /// fails `Forbidden`.
    pub(crate) async fn load_for(&self, actor: &Actor, id: A::Id) -> DomainResult<A> {
        let aggregate = self
            .repository
            .load(id)
            .await?
            .ok_or(DomainError::NotFound {
                kind: A::KIND,
                id: id.into(),
            })?;
        ensure_same_tenant(actor, aggregate.tenant_id())?;
        Ok(aggregate)
    }

    /// Persist and dispatch a freshly created aggregate
    pub(crate) async fn insert(&self, aggregate: &mut A) -> DomainResult<()> {
        self.pipeline
            .commit(self.repository.as_ref(), aggregate)
            .await?;
        let raw_id: Uuid = aggregate.id().into();
        info!(kind = %A::KIND, id = %raw_id, "work item created");
        Ok(())
    }

    /// Load, guard, apply `op`, commit; the uniform mutating-command shape
    pub(crate) async fn mutate<F>(
        &self,
        actor: &Actor,
        id: A::Id,
        operation: &'static str,
        op: F,
    ) -> DomainResult<CommandOutcome>
    where
        F: FnOnce(&mut A) -> DomainResult<()> + Send,
    {
        let (outcome, ()) = self.mutate_with(actor, id, operation, op).await?;
        Ok(outcome)
    }

    /// Like [`HandlerCore::mutate`], for operations that return a value
    pub(crate) async fn mutate_with<R, F>(
        &self,
        actor: &Actor,
        id: A::Id,
        operation: &'static str,
        op: F,
    ) -> DomainResult<(CommandOutcome, R)>
    where
        F: FnOnce(&mut A) -> DomainResult<R> + Send,
    {
        let mut aggregate = self.load_for(actor, id).await?;
        let raw_id: Uuid = id.into();
        let value = match op(&mut aggregate) {
            Ok(value) => value,
            Err(error) => {
                debug!(kind = %A::KIND, id = %raw_id, operation, %error, "command rejected");
                return Err(error);
            }
        };
        self.pipeline
            .commit(self.repository.as_ref(), &mut aggregate)
            .await?;
        info!(
            kind = %A::KIND,
            id = %raw_id,
            operation,
            status = aggregate.status_name(),
            "command applied"
        );
        Ok((
            CommandOutcome {
                id: raw_id,
                kind: A::KIND,
                status: aggregate.status_name().to_string(),
                version: aggregate.version(),
            },
            value,
        ))
    }
}

/// Commands over generic [`Request`] aggregates
pub struct RequestCommandHandler {
    core: HandlerCore<Request>,
}

impl RequestCommandHandler {
    /// Create a handler over the given ports
    pub fn new(
        repository: Arc<dyn WorkItemRepository<Request>>,
        dispatcher: Arc<dyn EventDispatcher>,
    ) -> Self {
        Self {
            core: HandlerCore::new(repository, dispatcher),
        }
    }

    /// Create a request owned by the actor's tenant
    pub async fn create(&self, actor: &Actor, command: CreateRequest) -> DomainResult<RequestId> {
        let mut request = Request::create(
            actor.tenant_id,
            command.title,
            command.description,
            command.priority,
            actor.id,
        )?;
        let id = request.id();
        self.core.insert(&mut request).await?;
        Ok(id)
    }

    /// Read a tenant-guarded snapshot
    pub async fn get(&self, actor: &Actor, id: RequestId) -> DomainResult<RequestSnapshot> {
        Ok(self.core.load_for(actor, id).await?.snapshot())
    }

    /// Submit the draft for review
    pub async fn submit(&self, actor: &Actor, id: RequestId) -> DomainResult<CommandOutcome> {
        self.core
            .mutate(actor, id, "Submit", |request| request.submit())
            .await
    }

    /// Pick the request up for review
    pub async fn start_review(
        &self,
        actor: &Actor,
        id: RequestId,
        notes: Option<String>,
    ) -> DomainResult<CommandOutcome> {
        ensure_role(actor, Role::Reviewer)?;
        let reviewer = actor.id;
        self.core
            .mutate(actor, id, "StartReview", |request| {
                request.start_review(reviewer, notes)
            })
            .await
    }

    /// Approve the request
    pub async fn approve(
        &self,
        actor: &Actor,
        id: RequestId,
        notes: Option<String>,
    ) -> DomainResult<CommandOutcome> {
        ensure_role(actor, Role::Approver)?;
        let approver = actor.id;
        self.core
            .mutate(actor, id, "Approve", |request| {
                request.approve(approver, notes)
            })
            .await
    }

    /// Deny the request with a reason
    pub async fn deny(
        &self,
        actor: &Actor,
        id: RequestId,
        reason: String,
    ) -> DomainResult<CommandOutcome> {
        ensure_role(actor, Role::Approver)?;
        let denier = actor.id;
        self.core
            .mutate(actor, id, "Deny", |request| request.deny(denier, reason))
            .await
    }

    /// Assign or reassign the request
    pub async fn assign(
        &self,
        actor: &Actor,
        id: RequestId,
        assignee: UserId,
    ) -> DomainResult<CommandOutcome> {
        self.core
            .mutate(actor, id, "Assign", |request| request.assign(assignee))
            .await
    }

    /// Complete the in-progress request
    pub async fn complete(&self, actor: &Actor, id: RequestId) -> DomainResult<CommandOutcome> {
        self.core
            .mutate(actor, id, "Complete", |request| request.complete())
            .await
    }

    /// Cancel the request
    pub async fn cancel(
        &self,
        actor: &Actor,
        id: RequestId,
        reason: Option<String>,
    ) -> DomainResult<CommandOutcome> {
        self.core
            .mutate(actor, id, "Cancel", |request| request.cancel(reason))
            .await
    }

    /// Edit the request while its status permits
    pub async fn update_details(
        &self,
        actor: &Actor,
        id: RequestId,
        title: Option<String>,
        description: Option<String>,
        priority: Option<Priority>,
    ) -> DomainResult<CommandOutcome> {
        self.core
            .mutate(actor, id, "UpdateDetails", |request| {
                request.update_details(title, description, priority)
            })
            .await
    }
}

/// Commands over [`ProjectRequest`] aggregates
///
/// Conversion into a project is a cross-aggregate workflow and lives in
/// [`crate::workflows::ProjectConversionWorkflow`].
pub struct ProjectRequestCommandHandler {
    core: HandlerCore<ProjectRequest>,
}

impl ProjectRequestCommandHandler {
    /// Create a handler over the given ports
    pub fn new(
        repository: Arc<dyn WorkItemRepository<ProjectRequest>>,
        dispatcher: Arc<dyn EventDispatcher>,
    ) -> Self {
        Self {
            core: HandlerCore::new(repository, dispatcher),
        }
    }

    /// Create a project request owned by the actor's tenant
    pub async fn create(
        &self,
        actor: &Actor,
        command: CreateProjectRequest,
    ) -> DomainResult<ProjectRequestId> {
        let mut request = ProjectRequest::create(
            actor.tenant_id,
            command.title,
            command.description,
            command.priority,
            actor.id,
        )?;
        let id = request.id();
        self.core.insert(&mut request).await?;
        Ok(id)
    }

    /// Read a tenant-guarded snapshot
    pub async fn get(
        &self,
        actor: &Actor,
        id: ProjectRequestId,
    ) -> DomainResult<ProjectRequestSnapshot> {
        Ok(self.core.load_for(actor, id).await?.snapshot())
    }

    /// Submit the draft for review
    pub async fn submit(
        &self,
        actor: &Actor,
        id: ProjectRequestId,
    ) -> DomainResult<CommandOutcome> {
        self.core
            .mutate(actor, id, "Submit", |request| request.submit())
            .await
    }

    /// Pick the request up for review
    pub async fn start_review(
        &self,
        actor: &Actor,
        id: ProjectRequestId,
        notes: Option<String>,
    ) -> DomainResult<CommandOutcome> {
        ensure_role(actor, Role::Reviewer)?;
        let reviewer = actor.id;
        self.core
            .mutate(actor, id, "StartReview", |request| {
                request.start_review(reviewer, notes)
            })
            .await
    }

    /// Approve the request, making it convert-eligible
    pub async fn approve(
        &self,
        actor: &Actor,
        id: ProjectRequestId,
        notes: Option<String>,
    ) -> DomainResult<CommandOutcome> {
        ensure_role(actor, Role::Approver)?;
        let approver = actor.id;
        self.core
            .mutate(actor, id, "Approve", |request| {
                request.approve(approver, notes)
            })
            .await
    }

    /// Deny the request with a reason
    pub async fn deny(
        &self,
        actor: &Actor,
        id: ProjectRequestId,
        reason: String,
    ) -> DomainResult<CommandOutcome> {
        ensure_role(actor, Role::Approver)?;
        let denier = actor.id;
        self.core
            .mutate(actor, id, "Deny", |request| request.deny(denier, reason))
            .await
    }

    /// Cancel the request
    pub async fn cancel(
        &self,
        actor: &Actor,
        id: ProjectRequestId,
        reason: Option<String>,
    ) -> DomainResult<CommandOutcome> {
        self.core
            .mutate(actor, id, "Cancel", |request| request.cancel(reason))
            .await
    }

    /// Edit the request while its status permits
    pub async fn update_details(
        &self,
        actor: &Actor,
        id: ProjectRequestId,
        title: Option<String>,
        description: Option<String>,
        priority: Option<Priority>,
    ) -> DomainResult<CommandOutcome> {
        self.core
            .mutate(actor, id, "UpdateDetails", |request| {
                request.update_details(title, description, priority)
            })
            .await
    }
}

/// Commands over [`Project`] aggregates
pub struct ProjectCommandHandler {
    core: HandlerCore<Project>,
}

impl ProjectCommandHandler {
    /// Create a handler over the given ports
    pub fn new(
        repository: Arc<dyn WorkItemRepository<Project>>,
        dispatcher: Arc<dyn EventDispatcher>,
    ) -> Self {
        Self {
            core: HandlerCore::new(repository, dispatcher),
        }
    }

    /// Create a project owned by the actor's tenant
    pub async fn create(&self, actor: &Actor, command: CreateProject) -> DomainResult<ProjectId> {
        let mut project = Project::create(
            actor.tenant_id,
            command.name,
            command.description,
            command.priority,
            actor.id,
        )?;
        let id = project.id();
        self.core.insert(&mut project).await?;
        Ok(id)
    }

    /// Read a tenant-guarded snapshot
    pub async fn get(&self, actor: &Actor, id: ProjectId) -> DomainResult<ProjectSnapshot> {
        Ok(self.core.load_for(actor, id).await?.snapshot())
    }

    /// Assign or replace the project manager
    pub async fn assign_manager(
        &self,
        actor: &Actor,
        id: ProjectId,
        manager: UserId,
    ) -> DomainResult<CommandOutcome> {
        ensure_role(actor, Role::Manager)?;
        self.core
            .mutate(actor, id, "AssignManager", |project| {
                project.assign_manager(manager)
            })
            .await
    }

    /// Move the project from planning into delivery
    pub async fn start(&self, actor: &Actor, id: ProjectId) -> DomainResult<CommandOutcome> {
        self.core
            .mutate(actor, id, "Start", |project| project.start())
            .await
    }

    /// Put the active project on hold
    pub async fn put_on_hold(
        &self,
        actor: &Actor,
        id: ProjectId,
        reason: String,
    ) -> DomainResult<CommandOutcome> {
        self.core
            .mutate(actor, id, "PutOnHold", |project| project.put_on_hold(reason))
            .await
    }

    /// Resume the on-hold project
    pub async fn resume(&self, actor: &Actor, id: ProjectId) -> DomainResult<CommandOutcome> {
        self.core
            .mutate(actor, id, "Resume", |project| project.resume())
            .await
    }

    /// Complete the active project
    pub async fn complete(&self, actor: &Actor, id: ProjectId) -> DomainResult<CommandOutcome> {
        self.core
            .mutate(actor, id, "Complete", |project| project.complete())
            .await
    }

    /// Cancel the project
    pub async fn cancel(
        &self,
        actor: &Actor,
        id: ProjectId,
        reason: Option<String>,
    ) -> DomainResult<CommandOutcome> {
        self.core
            .mutate(actor, id, "Cancel", |project| project.cancel(reason))
            .await
    }

    /// Edit the project while still planning
    pub async fn update_details(
        &self,
        actor: &Actor,
        id: ProjectId,
        name: Option<String>,
        description: Option<String>,
        priority: Option<Priority>,
    ) -> DomainResult<CommandOutcome> {
        self.core
            .mutate(actor, id, "UpdateDetails", |project| {
                project.update_details(name, description, priority)
            })
            .await
    }
}

/// Commands over [`ChangeRequest`] aggregates
pub struct ChangeRequestCommandHandler {
    core: HandlerCore<ChangeRequest>,
}

impl ChangeRequestCommandHandler {
    /// Create a handler over the given ports
    pub fn new(
        repository: Arc<dyn WorkItemRepository<ChangeRequest>>,
        dispatcher: Arc<dyn EventDispatcher>,
    ) -> Self {
        Self {
            core: HandlerCore::new(repository, dispatcher),
        }
    }

    /// Create a change request owned by the actor's tenant
    pub async fn create(
        &self,
        actor: &Actor,
        command: CreateChangeRequest,
    ) -> DomainResult<ChangeRequestId> {
        let mut change = ChangeRequest::create(
            actor.tenant_id,
            command.title,
            command.description,
            command.priority,
            command.risk_level,
            command.change_type,
            command.impact_assessment,
            command.rollback_plan,
            command.affected_systems,
            actor.id,
        )?;
        let id = change.id();
        self.core.insert(&mut change).await?;
        Ok(id)
    }

    /// Read a tenant-guarded snapshot
    pub async fn get(
        &self,
        actor: &Actor,
        id: ChangeRequestId,
    ) -> DomainResult<ChangeRequestSnapshot> {
        Ok(self.core.load_for(actor, id).await?.snapshot())
    }

    /// Submit the draft to the change advisory board
    pub async fn submit(&self, actor: &Actor, id: ChangeRequestId) -> DomainResult<CommandOutcome> {
        self.core
            .mutate(actor, id, "Submit", |change| change.submit())
            .await
    }

    /// Pick the change up for CAB review
    pub async fn start_review(
        &self,
        actor: &Actor,
        id: ChangeRequestId,
        notes: Option<String>,
    ) -> DomainResult<CommandOutcome> {
        ensure_role(actor, Role::Reviewer)?;
        let reviewer = actor.id;
        self.core
            .mutate(actor, id, "StartReview", |change| {
                change.start_review(reviewer, notes)
            })
            .await
    }

    /// Approve the change on behalf of the CAB
    pub async fn approve(
        &self,
        actor: &Actor,
        id: ChangeRequestId,
        notes: Option<String>,
    ) -> DomainResult<CommandOutcome> {
        ensure_role(actor, Role::Approver)?;
        let approver = actor.id;
        self.core
            .mutate(actor, id, "Approve", |change| change.approve(approver, notes))
            .await
    }

    /// Deny the change with a reason
    pub async fn deny(
        &self,
        actor: &Actor,
        id: ChangeRequestId,
        reason: String,
    ) -> DomainResult<CommandOutcome> {
        ensure_role(actor, Role::Approver)?;
        let denier = actor.id;
        self.core
            .mutate(actor, id, "Deny", |change| change.deny(denier, reason))
            .await
    }

    /// Schedule the approved change into an execution window
    pub async fn schedule(
        &self,
        actor: &Actor,
        id: ChangeRequestId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<CommandOutcome> {
        self.core
            .mutate(actor, id, "Schedule", |change| change.schedule(start, end))
            .await
    }

    /// Begin executing the scheduled change
    pub async fn start_execution(
        &self,
        actor: &Actor,
        id: ChangeRequestId,
    ) -> DomainResult<CommandOutcome> {
        self.core
            .mutate(actor, id, "StartExecution", |change| change.start_execution())
            .await
    }

    /// Record successful execution
    pub async fn complete(
        &self,
        actor: &Actor,
        id: ChangeRequestId,
    ) -> DomainResult<CommandOutcome> {
        self.core
            .mutate(actor, id, "Complete", |change| change.complete())
            .await
    }

    /// Record a failed execution
    pub async fn mark_as_failed(
        &self,
        actor: &Actor,
        id: ChangeRequestId,
        reason: String,
    ) -> DomainResult<CommandOutcome> {
        self.core
            .mutate(actor, id, "MarkAsFailed", |change| {
                change.mark_as_failed(reason)
            })
            .await
    }

    /// Record that the change was rolled back
    pub async fn rollback(
        &self,
        actor: &Actor,
        id: ChangeRequestId,
        reason: String,
    ) -> DomainResult<CommandOutcome> {
        self.core
            .mutate(actor, id, "Rollback", |change| change.rollback(reason))
            .await
    }

    /// Withdraw the change before execution
    pub async fn cancel(
        &self,
        actor: &Actor,
        id: ChangeRequestId,
        reason: Option<String>,
    ) -> DomainResult<CommandOutcome> {
        self.core
            .mutate(actor, id, "Cancel", |change| change.cancel(reason))
            .await
    }
}

/// Commands over [`Task`] aggregates
pub struct TaskCommandHandler {
    core: HandlerCore<Task>,
}

impl TaskCommandHandler {
    /// Create a handler over the given ports
    pub fn new(
        repository: Arc<dyn WorkItemRepository<Task>>,
        dispatcher: Arc<dyn EventDispatcher>,
    ) -> Self {
        Self {
            core: HandlerCore::new(repository, dispatcher),
        }
    }

    /// Create a task owned by the actor's tenant
    pub async fn create(&self, actor: &Actor, command: CreateTask) -> DomainResult<TaskId> {
        let mut task = Task::create(
            actor.tenant_id,
            command.title,
            command.description,
            command.priority,
            command.estimated_hours,
            actor.id,
        )?;
        let id = task.id();
        self.core.insert(&mut task).await?;
        Ok(id)
    }

    /// Read a tenant-guarded snapshot
    pub async fn get(&self, actor: &Actor, id: TaskId) -> DomainResult<TaskSnapshot> {
        Ok(self.core.load_for(actor, id).await?.snapshot())
    }

    /// Assign the task to a user
    pub async fn assign_to_user(
        &self,
        actor: &Actor,
        id: TaskId,
        user: UserId,
    ) -> DomainResult<CommandOutcome> {
        self.core
            .mutate(actor, id, "AssignToUser", |task| task.assign_to_user(user))
            .await
    }

    /// Assign the task to a department queue
    pub async fn assign_to_department(
        &self,
        actor: &Actor,
        id: TaskId,
        department: DepartmentId,
    ) -> DomainResult<CommandOutcome> {
        self.core
            .mutate(actor, id, "AssignToDepartment", |task| {
                task.assign_to_department(department)
            })
            .await
    }

    /// Claim a department-assigned task for the acting user
    ///
    /// Membership-based on purpose: any authenticated member of the task's
    /// tenant may claim; no role is checked.
    pub async fn claim(&self, actor: &Actor, id: TaskId) -> DomainResult<CommandOutcome> {
        let claimer = actor.id;
        self.core
            .mutate(actor, id, "ClaimTask", |task| task.claim(claimer))
            .await
    }

    /// Begin work on the task
    pub async fn start(&self, actor: &Actor, id: TaskId) -> DomainResult<CommandOutcome> {
        self.core
            .mutate(actor, id, "Start", |task| task.start())
            .await
    }

    /// Block the task with a reason
    pub async fn block(
        &self,
        actor: &Actor,
        id: TaskId,
        reason: String,
    ) -> DomainResult<CommandOutcome> {
        self.core
            .mutate(actor, id, "Block", |task| task.block(reason))
            .await
    }

    /// Clear the blocked toggle
    pub async fn unblock(&self, actor: &Actor, id: TaskId) -> DomainResult<CommandOutcome> {
        self.core
            .mutate(actor, id, "Unblock", |task| task.unblock())
            .await
    }

    /// Log hours worked against the task
    pub async fn log_time(
        &self,
        actor: &Actor,
        id: TaskId,
        hours: f32,
    ) -> DomainResult<CommandOutcome> {
        let worker = actor.id;
        self.core
            .mutate(actor, id, "LogTime", |task| task.log_time(hours, worker))
            .await
    }

    /// Append a checklist item, returning its id
    pub async fn add_checklist_item(
        &self,
        actor: &Actor,
        id: TaskId,
        description: String,
    ) -> DomainResult<ChecklistItemId> {
        let (_, item_id) = self
            .core
            .mutate_with(actor, id, "AddChecklistItem", |task| {
                task.add_checklist_item(description)
            })
            .await?;
        Ok(item_id)
    }

    /// Tick off a checklist item
    pub async fn complete_checklist_item(
        &self,
        actor: &Actor,
        id: TaskId,
        item_id: ChecklistItemId,
    ) -> DomainResult<CommandOutcome> {
        let completer = actor.id;
        self.core
            .mutate(actor, id, "CompleteChecklistItem", |task| {
                task.complete_checklist_item(item_id, completer)
            })
            .await
    }

    /// Complete the task
    pub async fn complete(&self, actor: &Actor, id: TaskId) -> DomainResult<CommandOutcome> {
        self.core
            .mutate(actor, id, "Complete", |task| task.complete())
            .await
    }

    /// Cancel the task
    pub async fn cancel(
        &self,
        actor: &Actor,
        id: TaskId,
        reason: Option<String>,
    ) -> DomainResult<CommandOutcome> {
        self.core
            .mutate(actor, id, "Cancel", |task| task.cancel(reason))
            .await
    }

    /// Edit the task while its status permits
    pub async fn update_details(
        &self,
        actor: &Actor,
        id: TaskId,
        title: Option<String>,
        description: Option<String>,
        priority: Option<Priority>,
        estimated_hours: Option<f32>,
    ) -> DomainResult<CommandOutcome> {
        self.core
            .mutate(actor, id, "UpdateDetails", |task| {
                task.update_details(title, description, priority, estimated_hours)
            })
            .await
    }
}
