//! The shared surface of all work item aggregates
//!
//! Kinds share no mutable base state; each aggregate composes identity,
//! tenant reference, status, audit block, and journal itself, and exposes
//! that composition through this trait so the commit pipeline and tenant
//! guard can treat every kind uniformly.

use crate::identifiers::TenantId;
use crate::journal::EventJournal;
use crate::status::WorkItemKind;
use uuid::Uuid;

/// Trait implemented by every work item aggregate root
pub trait WorkItem: Send + Sync {
    /// The typed identifier of this kind
    type Id: Copy + Eq + std::hash::Hash + Into<Uuid> + Send + Sync + 'static;

    /// The kind of this work item
    const KIND: WorkItemKind;

    /// The aggregate's identifier
    fn id(&self) -> Self::Id;

    /// The owning tenant; immutable after creation
    fn tenant_id(&self) -> TenantId;

    /// Display name of the current status
    fn status_name(&self) -> &'static str;

    /// Whether the aggregate has reached a terminal status
    fn is_terminal(&self) -> bool;

    /// Optimistic-concurrency version token
    ///
    /// Bumped by the repository on every successful save; a save against a
    /// stale token fails with a concurrency conflict instead of silently
    /// losing the other writer's update.
    fn version(&self) -> u64;

    /// Bump the version token; called by repositories on save
    fn increment_version(&mut self);

    /// Read-only view of the pending event journal
    fn journal(&self) -> &EventJournal;

    /// Mutable journal access for the commit pipeline
    fn journal_mut(&mut self) -> &mut EventJournal;
}
