//! Cross-aggregate workflows
//!
//! Each workflow spans operations on more than one aggregate inside one
//! commit: every touched aggregate is persisted before any event of either
//! is dispatched.

use crate::commit::{CommitPipeline, EventDispatcher, WorkItemRepository};
use crate::errors::DomainResult;
use crate::guards;
use crate::handlers::HandlerCore;
use crate::identifiers::{ProjectId, ProjectRequestId, UserId};
use crate::project::Project;
use crate::project_request::ProjectRequest;
use crate::tenant::Actor;
use crate::work_item::WorkItem;
use std::sync::Arc;
use tracing::info;

/// Converts an approved [`ProjectRequest`] into a [`Project`]
///
/// The conversion happens at most once per request: marking the request
/// `Converted` is terminal, so a second attempt fails its guard and no
/// second project is created.
pub struct ProjectConversionWorkflow {
    requests: HandlerCore<ProjectRequest>,
    projects: Arc<dyn WorkItemRepository<Project>>,
    pipeline: CommitPipeline,
}

impl ProjectConversionWorkflow {
    /// Create a workflow over both repositories and the dispatcher
    pub fn new(
        project_requests: Arc<dyn WorkItemRepository<ProjectRequest>>,
        projects: Arc<dyn WorkItemRepository<Project>>,
        dispatcher: Arc<dyn EventDispatcher>,
    ) -> Self {
        Self {
            requests: HandlerCore::new(project_requests, dispatcher.clone()),
            projects,
            pipeline: CommitPipeline::new(dispatcher),
        }
    }

    /// Convert the approved request, optionally assigning a manager
    ///
    /// Seeds the project from the request's fields, marks the request
    /// `Converted` with a back-reference, and commits both aggregates
    /// together; their events dispatch in one batch after both persists.
    pub async fn convert(
        &self,
        actor: &Actor,
        id: ProjectRequestId,
        manager: Option<UserId>,
    ) -> DomainResult<ProjectId> {
        let mut request = self.requests.load_for(actor, id).await?;
        let mut project = convert_to_project(&mut request, actor.id, manager)?;
        let project_id = project.id();

        self.pipeline
            .commit_pair(
                self.requests.repository(),
                &mut request,
                self.projects.as_ref(),
                &mut project,
            )
            .await?;

        info!(
            project_request = %id,
            project = %project_id,
            "project request converted"
        );
        Ok(project_id)
    }
}

/// Pure conversion step: seed a project from the request and link the two
///
/// The request's eligibility is guarded before the project is created, so a
/// failed guard leaves nothing behind.
pub fn convert_to_project(
    request: &mut ProjectRequest,
    converted_by: UserId,
    manager: Option<UserId>,
) -> DomainResult<Project> {
    guards::ensure_capability(
        ProjectRequest::KIND,
        "MarkAsConverted",
        request.status(),
        |caps| caps.can_convert_to_project,
    )?;

    let mut project = Project::create_from_request(
        request.tenant_id(),
        request.id(),
        request.title().to_string(),
        request.description().to_string(),
        request.priority(),
        converted_by,
    )?;
    if let Some(manager) = manager {
        project.assign_manager(manager)?;
    }
    request.mark_as_converted(project.id())?;
    Ok(project)
}
