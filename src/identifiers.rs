//! Identifier types for tenants, actors, and work items
//!
//! Every work item kind gets its own identifier type so that, for example, a
//! `TaskId` can never be passed where a `ProjectId` is expected. Identifiers
//! are generated once at creation and never reused.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create from a UUID
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Get the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl From<&$name> for Uuid {
            fn from(id: &$name) -> Self {
                id.0
            }
        }
    };
}

uuid_id! {
    /// Opaque tenant identifier
    ///
    /// Every work item and actor carries exactly one. Tenants are compared by
    /// identity and never ordered.
    TenantId
}

uuid_id! {
    /// Identifier of an individual user within a tenant
    UserId
}

uuid_id! {
    /// Identifier of a department within a tenant
    DepartmentId
}

uuid_id! {
    /// Identifier of a generic [`Request`](crate::Request)
    RequestId
}

uuid_id! {
    /// Identifier of a [`ProjectRequest`](crate::ProjectRequest)
    ProjectRequestId
}

uuid_id! {
    /// Identifier of a [`Project`](crate::Project)
    ProjectId
}

uuid_id! {
    /// Identifier of a [`ChangeRequest`](crate::ChangeRequest)
    ChangeRequestId
}

uuid_id! {
    /// Identifier of a [`Task`](crate::Task)
    TaskId
}

uuid_id! {
    /// Identifier of a checklist item owned by a [`Task`](crate::Task)
    ///
    /// Checklist items are not entities - they only exist inside their parent
    /// task and cascade with it.
    ChecklistItemId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_uniqueness() {
        let a = TaskId::new();
        let b = TaskId::new();
        assert_ne!(a, b);
        assert!(!a.as_uuid().is_nil());
    }

    #[test]
    fn test_id_from_uuid_round_trip() {
        let uuid = Uuid::new_v4();
        let id = ProjectId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), &uuid);
        assert_eq!(Uuid::from(id), uuid);
        assert_eq!(format!("{id}"), format!("{uuid}"));
    }

    #[test]
    fn test_id_serde() {
        let original = TenantId::new();
        let json = serde_json::to_string(&original).unwrap();
        let deserialized: TenantId = serde_json::from_str(&json).unwrap();
        assert_eq!(original, deserialized);
    }

    #[test]
    fn test_id_as_map_key() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        let id1 = ChecklistItemId::new();
        let id2 = ChecklistItemId::new();
        map.insert(id1, "first");
        map.insert(id2, "second");

        assert_eq!(map.get(&id1), Some(&"first"));
        assert_eq!(map.len(), 2);
    }
}
