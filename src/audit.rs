//! Audit fields composed into every aggregate
//!
//! Aggregates are built by composition - identity, tenant reference, status,
//! and this audit block - rather than through a shared mutable base class.

use crate::identifiers::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Creation and modification stamps shared by all work item kinds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditBlock {
    /// Who created the work item
    pub created_by: UserId,
    /// When the work item was created
    pub created_at: DateTime<Utc>,
    /// When the work item was last mutated
    pub last_modified_at: DateTime<Utc>,
}

impl AuditBlock {
    /// Stamp a freshly created work item
    pub fn new(created_by: UserId) -> Self {
        let now = Utc::now();
        Self {
            created_by,
            created_at: now,
            last_modified_at: now,
        }
    }

    /// Stamp a successful mutation
    pub fn touch(&mut self) {
        self.last_modified_at = Utc::now();
    }
}
