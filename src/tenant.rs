//! Tenant isolation and actor identity
//!
//! Every work item and every actor belongs to exactly one tenant. Before any
//! mutation or read exposure the caller's resolved tenant is compared to the
//! aggregate's stored tenant; a mismatch yields [`DomainError::Forbidden`],
//! which is distinct from `NotFound` so that "exists but not yours" never
//! reads as "does not exist".
//!
//! The core never relies on ambient context: tenant and actor always arrive
//! as explicit parameters.

use crate::errors::{DomainError, DomainResult};
use crate::identifiers::{TenantId, UserId};
use serde::{Deserialize, Serialize};

/// Roles an actor can hold within their tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Ordinary tenant member; may create, submit, and claim work
    Member,
    /// May pick up items for review
    Reviewer,
    /// May approve or deny items under review
    Approver,
    /// May run projects and assign work
    Manager,
    /// Holds every role implicitly
    Admin,
}

/// A resolved caller: identity, tenant, and roles
///
/// Resolution (token validation, directory lookup) happens outside the core;
/// by the time an `Actor` reaches a command it is already authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The acting user
    pub id: UserId,
    /// The tenant the actor belongs to
    pub tenant_id: TenantId,
    /// Roles held within the tenant
    pub roles: Vec<Role>,
}

impl Actor {
    /// Create an actor holding only the `Member` role
    pub fn member(id: UserId, tenant_id: TenantId) -> Self {
        Self {
            id,
            tenant_id,
            roles: vec![Role::Member],
        }
    }

    /// Create an actor with an explicit role set
    pub fn with_roles(id: UserId, tenant_id: TenantId, roles: Vec<Role>) -> Self {
        Self {
            id,
            tenant_id,
            roles,
        }
    }

    /// Check whether the actor holds a role (`Admin` implies all)
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role) || self.roles.contains(&Role::Admin)
    }
}

/// Require that the actor and the aggregate share a tenant
///
/// Applied before every mutation and before exposing aggregate state.
pub fn ensure_same_tenant(actor: &Actor, aggregate_tenant: TenantId) -> DomainResult<()> {
    if actor.tenant_id == aggregate_tenant {
        Ok(())
    } else {
        Err(DomainError::Forbidden(
            "work item belongs to another tenant".to_string(),
        ))
    }
}

/// Require that the actor holds `role`
pub fn ensure_role(actor: &Actor, role: Role) -> DomainResult<()> {
    if actor.has_role(role) {
        Ok(())
    } else {
        Err(DomainError::Forbidden(format!(
            "actor {} is missing role {role:?}",
            actor.id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_tenant_passes_other_tenant_is_forbidden() {
        let tenant = TenantId::new();
        let actor = Actor::member(UserId::new(), tenant);

        assert!(ensure_same_tenant(&actor, tenant).is_ok());

        let err = ensure_same_tenant(&actor, TenantId::new()).unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[test]
    fn role_check_respects_admin() {
        let tenant = TenantId::new();
        let member = Actor::member(UserId::new(), tenant);
        let admin = Actor::with_roles(UserId::new(), tenant, vec![Role::Admin]);
        let approver =
            Actor::with_roles(UserId::new(), tenant, vec![Role::Member, Role::Approver]);

        assert!(ensure_role(&member, Role::Approver).is_err());
        assert!(ensure_role(&approver, Role::Approver).is_ok());
        assert!(ensure_role(&admin, Role::Approver).is_ok());
        assert!(ensure_role(&admin, Role::Manager).is_ok());
    }
}
