//! Persistence and dispatch ports, plus the commit pipeline
//!
//! One logical operation is one load, one or more guarded mutations, one
//! persist, one dispatch, executed sequentially. Suspension happens only at
//! the port boundaries; the core itself never blocks on anything.

use crate::errors::{DomainError, DomainResult};
use crate::events::{DomainEvent, WorkItemEvent};
use crate::identifiers::TenantId;
use crate::work_item::WorkItem;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use tracing::warn;

/// Persistence port for one work item kind
///
/// `save` is the atomic commit boundary: implementations must compare the
/// stored version token with the incoming aggregate's and fail with
/// [`DomainError::ConcurrencyConflict`] on a mismatch, then bump the token.
/// Without the check, two concurrent writers would silently lose one
/// writer's update.
#[async_trait]
pub trait WorkItemRepository<A: WorkItem>: Send + Sync {
    /// Load an aggregate by id, `None` if absent
    async fn load(&self, id: A::Id) -> DomainResult<Option<A>>;

    /// Persist the aggregate, checking and bumping the version token
    async fn save(&self, aggregate: &mut A) -> DomainResult<()>;
}

/// Event dispatch port
///
/// Fire-and-forget relative to the primary transaction: a dispatch failure
/// must never fail the operation that produced the event.
#[async_trait]
pub trait EventDispatcher: Send + Sync {
    /// Deliver one event to its handlers
    async fn dispatch(&self, event: &WorkItemEvent) -> DomainResult<()>;
}

/// Runs the unit-of-work boundary: persist, then dispatch, then clear
///
/// Dispatch failure does not roll back already-persisted state - events are
/// a best-effort side channel, not part of the transactional guarantee.
/// There is no retry and no dead-letter here; an adapter wanting stronger
/// delivery puts an outbox behind the [`EventDispatcher`] port.
#[derive(Clone)]
pub struct CommitPipeline {
    dispatcher: Arc<dyn EventDispatcher>,
}

impl CommitPipeline {
    /// Create a pipeline over a dispatcher
    pub fn new(dispatcher: Arc<dyn EventDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Commit a single aggregate: persist, dispatch pending events in order,
    /// clear the journal
    pub async fn commit<A: WorkItem>(
        &self,
        repository: &dyn WorkItemRepository<A>,
        aggregate: &mut A,
    ) -> DomainResult<()> {
        repository.save(aggregate).await?;
        self.dispatch_pending(aggregate).await;
        Ok(())
    }

    /// Commit two aggregates touched by one cross-aggregate workflow
    ///
    /// Both saves form one storage transaction in a real adapter; events of
    /// both aggregates are dispatched together only after both persists
    /// succeed.
    pub async fn commit_pair<A: WorkItem, B: WorkItem>(
        &self,
        repository_a: &dyn WorkItemRepository<A>,
        aggregate_a: &mut A,
        repository_b: &dyn WorkItemRepository<B>,
        aggregate_b: &mut B,
    ) -> DomainResult<()> {
        repository_a.save(aggregate_a).await?;
        repository_b.save(aggregate_b).await?;
        self.dispatch_pending(aggregate_a).await;
        self.dispatch_pending(aggregate_b).await;
        Ok(())
    }

    async fn dispatch_pending<A: WorkItem>(&self, aggregate: &mut A) {
        for event in aggregate.journal_mut().drain() {
            if let Err(error) = self.dispatcher.dispatch(&event).await {
                // Swallowed on purpose: the state change is already durable.
                warn!(
                    event_type = event.event_type(),
                    aggregate_id = %event.aggregate_id(),
                    %error,
                    "event dispatch failed"
                );
            }
        }
    }
}

/// In-memory repository for tests and examples
pub struct InMemoryWorkItemRepository<A: WorkItem + Clone> {
    storage: Arc<RwLock<HashMap<A::Id, A>>>,
}

impl<A: WorkItem + Clone> Default for InMemoryWorkItemRepository<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: WorkItem + Clone> InMemoryWorkItemRepository<A> {
    /// Create an empty repository
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// All stored aggregates of one tenant
    ///
    /// The tenant filter runs before any other predicate a caller might
    /// apply, so cross-tenant rows never leave the repository.
    pub fn find_by_tenant(&self, tenant_id: TenantId) -> Vec<A> {
        self.storage
            .read()
            .unwrap()
            .values()
            .filter(|aggregate| aggregate.tenant_id() == tenant_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl<A: WorkItem + Clone + 'static> WorkItemRepository<A> for InMemoryWorkItemRepository<A> {
    async fn load(&self, id: A::Id) -> DomainResult<Option<A>> {
        Ok(self.storage.read().unwrap().get(&id).cloned())
    }

    async fn save(&self, aggregate: &mut A) -> DomainResult<()> {
        let mut storage = self.storage.write().unwrap();
        if let Some(stored) = storage.get(&aggregate.id()) {
            if stored.version() != aggregate.version() {
                return Err(DomainError::ConcurrencyConflict {
                    expected: aggregate.version(),
                    actual: stored.version(),
                });
            }
        }
        aggregate.increment_version();
        // The stored snapshot must not carry undispatched events; pending
        // events live only on the instance the pipeline is about to drain.
        let mut snapshot = aggregate.clone();
        snapshot.journal_mut().clear();
        storage.insert(snapshot.id(), snapshot);
        Ok(())
    }
}

/// Dispatcher that records every event, for test verification
#[derive(Clone, Default)]
pub struct RecordingDispatcher {
    dispatched: Arc<Mutex<Vec<WorkItemEvent>>>,
}

impl RecordingDispatcher {
    /// Create an empty recording dispatcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event dispatched so far, in order
    pub fn dispatched(&self) -> Vec<WorkItemEvent> {
        self.dispatched.lock().unwrap().clone()
    }

    /// Event type names dispatched so far, in order
    pub fn dispatched_types(&self) -> Vec<&'static str> {
        self.dispatched
            .lock()
            .unwrap()
            .iter()
            .map(DomainEvent::event_type)
            .collect()
    }
}

#[async_trait]
impl EventDispatcher for RecordingDispatcher {
    async fn dispatch(&self, event: &WorkItemEvent) -> DomainResult<()> {
        self.dispatched.lock().unwrap().push(event.clone());
        Ok(())
    }
}
