//! Authenticated caller supplied by the identity collaborator.

use super::{TenantId, UserId};
use serde::{Deserialize, Serialize};

/// Role of an authenticated staff member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorRole {
    /// Tenant administrator.
    Admin,
    /// Store or service supervisor.
    Supervisor,
    /// Schedules field work.
    Dispatcher,
    /// Sales staff owning the customer relationship.
    Sales,
    /// Measurer or installer.
    Worker,
}

impl ActorRole {
    /// Whether the role may create tasks.
    #[must_use]
    pub const fn can_create_tasks(self) -> bool {
        !matches!(self, Self::Worker)
    }

    /// Whether the role may assign and cancel tasks.
    #[must_use]
    pub const fn can_dispatch(self) -> bool {
        matches!(self, Self::Admin | Self::Supervisor | Self::Dispatcher)
    }

    /// Whether the role may confirm or reject completed work.
    #[must_use]
    pub const fn can_confirm(self) -> bool {
        matches!(
            self,
            Self::Admin | Self::Supervisor | Self::Dispatcher | Self::Sales
        )
    }

    /// Whether the role may settle fee negotiations.
    #[must_use]
    pub const fn can_approve_fees(self) -> bool {
        matches!(self, Self::Admin | Self::Supervisor)
    }
}

/// Authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    /// Calling user.
    pub id: UserId,
    /// Tenant the caller is signed in to.
    pub tenant_id: TenantId,
    /// Caller's role.
    pub role: ActorRole,
}

impl Actor {
    /// Creates an actor.
    #[must_use]
    pub const fn new(id: UserId, tenant_id: TenantId, role: ActorRole) -> Self {
        Self {
            id,
            tenant_id,
            role,
        }
    }
}
