//! Per-aggregate journal of pending domain events
//!
//! Every aggregate owns exactly one journal. Mutations append to it; the
//! commit pipeline drains it once after a successful persist. The journal is
//! externally readable but only the crate can append to or drain it.

use crate::events::WorkItemEvent;
use serde::{Deserialize, Serialize};

/// Ordered, append-only list of events awaiting dispatch
///
/// Not persisted with the aggregate - pending events exist only between the
/// mutation and the dispatch that follows the commit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventJournal {
    pending: Vec<WorkItemEvent>,
}

impl EventJournal {
    /// Create an empty journal
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event; called by aggregate mutations only
    pub(crate) fn record(&mut self, event: WorkItemEvent) {
        self.pending.push(event);
    }

    /// The events captured since the last commit, in order
    pub fn pending(&self) -> &[WorkItemEvent] {
        &self.pending
    }

    /// Number of pending events
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether the journal has nothing to dispatch
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return all pending events; called once per commit
    pub(crate) fn drain(&mut self) -> Vec<WorkItemEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Drop pending events without dispatching them
    ///
    /// Used by repository doubles that store a snapshot of the aggregate:
    /// the stored copy must not carry undispatched events.
    pub(crate) fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::DomainEvent;
    use crate::identifiers::RequestId;

    #[test]
    fn journal_preserves_order_and_drains_once() {
        let id = RequestId::new();
        let mut journal = EventJournal::new();
        journal.record(WorkItemEvent::RequestSubmitted { id });
        journal.record(WorkItemEvent::RequestCompleted { id });

        assert_eq!(journal.len(), 2);
        assert_eq!(journal.pending()[0].event_type(), "RequestSubmitted");

        let drained = journal.drain();
        assert_eq!(drained.len(), 2);
        assert!(journal.is_empty());
        assert!(journal.drain().is_empty());
    }

    #[test]
    fn clear_discards_without_returning() {
        let mut journal = EventJournal::new();
        journal.record(WorkItemEvent::RequestSubmitted {
            id: RequestId::new(),
        });
        journal.clear();
        assert!(journal.is_empty());
    }
}
