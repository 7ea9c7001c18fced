//! # Workdesk Domain
//!
//! Workflow core for Workdesk: multi-tenant work item tracking through
//! approval and execution lifecycles.
//!
//! Five work item kinds - [`Request`], [`ProjectRequest`], [`Project`],
//! [`ChangeRequest`], and [`Task`] - each move through a guarded
//! finite-state machine:
//! - **Status catalog**: closed, per-kind status enums carrying capability
//!   flags; legality of an operation depends solely on the current status
//!   plus these flags.
//! - **Guards**: pure predicates that reject illegal operations with a typed
//!   error and leave the aggregate untouched.
//! - **Event journal**: every successful mutation appends exactly one domain
//!   event, dispatched after the persistence commit and then cleared.
//! - **Tenant isolation**: every work item and actor belongs to exactly one
//!   tenant; cross-tenant access fails `Forbidden`, never `NotFound`.
//!
//! ## Design principles
//!
//! 1. **Composition over inheritance**: aggregates compose identity, tenant
//!    reference, status, and audit block; no shared mutable base state.
//! 2. **Explicit context**: tenant and actor are threaded as parameters
//!    through every command; nothing is resolved ambiently.
//! 3. **Errors as values**: guard and validation failures are returned, not
//!    thrown; only contract violations surface as unexpected faults.
//! 4. **Ports at the seams**: persistence and event dispatch are async
//!    traits consumed by the handlers; the core performs no I/O itself.

#![warn(missing_docs)]

mod audit;
mod change_request;
mod commands;
mod commit;
mod errors;
mod events;
mod guards;
mod handlers;
mod identifiers;
mod journal;
mod project;
mod project_request;
mod request;
mod status;
mod task;
mod tenant;
mod validate;
mod work_item;
mod workflows;

pub use audit::AuditBlock;
pub use change_request::{ChangeRequest, ChangeRequestSnapshot, ScheduledWindow};
pub use commands::{
    CreateChangeRequest, CreateProject, CreateProjectRequest, CreateRequest, CreateTask,
};
pub use commit::{
    CommitPipeline, EventDispatcher, InMemoryWorkItemRepository, RecordingDispatcher,
    WorkItemRepository,
};
pub use errors::{DomainError, DomainResult};
pub use events::{DomainEvent, WorkItemEvent};
pub use guards::{ensure, ensure_capability, ensure_exact};
pub use handlers::{
    ChangeRequestCommandHandler, CommandOutcome, ProjectCommandHandler,
    ProjectRequestCommandHandler, RequestCommandHandler, TaskCommandHandler,
};
pub use identifiers::{
    ChangeRequestId, ChecklistItemId, DepartmentId, ProjectId, ProjectRequestId, RequestId, TaskId,
    TenantId, UserId,
};
pub use journal::EventJournal;
pub use project::{Project, ProjectSnapshot};
pub use project_request::{ProjectRequest, ProjectRequestSnapshot};
pub use request::{Request, RequestSnapshot};
pub use status::{
    ChangeRequestStatus, ChangeType, Priority, ProjectRequestStatus, ProjectStatus, RequestStatus,
    RiskLevel, Status, StatusCaps, TaskStatus, WorkItemKind,
};
pub use task::{ActivityLogEntry, ChecklistItem, Task, TaskAssignment, TaskSnapshot};
pub use tenant::{ensure_role, ensure_same_tenant, Actor, Role};
pub use work_item::WorkItem;
pub use workflows::{convert_to_project, ProjectConversionWorkflow};
