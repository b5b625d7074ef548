//! Read-only ports onto collaborators owning workers, commercial records,
//! purchase orders and tenant scheduling policy.

use crate::dispatch::domain::{CommercialRecord, ConflictPolicy, PurchaseOrder, WorkerProfile};
use crate::task::domain::{CommercialRecordId, TenantId, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for directory lookups.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Worker profiles owned by the HR collaborator.
#[async_trait]
pub trait WorkerDirectory: Send + Sync {
    /// Finds one worker within a tenant.
    async fn find(
        &self,
        tenant_id: TenantId,
        worker_id: UserId,
    ) -> DirectoryResult<Option<WorkerProfile>>;

    /// Lists every worker of a tenant.
    async fn list(&self, tenant_id: TenantId) -> DirectoryResult<Vec<WorkerProfile>>;
}

/// Commercial records owned by the lead/quote/order pipeline.
#[async_trait]
pub trait CommercialRecordSource: Send + Sync {
    /// Finds a record within a tenant.
    async fn find(
        &self,
        tenant_id: TenantId,
        record_id: CommercialRecordId,
    ) -> DirectoryResult<Option<CommercialRecord>>;
}

/// Purchase orders owned by the supply chain.
#[async_trait]
pub trait LogisticsSource: Send + Sync {
    /// Lists the orders placed for a commercial record. An unknown record has
    /// none.
    async fn purchase_orders(
        &self,
        tenant_id: TenantId,
        record_id: CommercialRecordId,
    ) -> DirectoryResult<Vec<PurchaseOrder>>;
}

/// Tenant-configurable soft conflict thresholds.
#[async_trait]
pub trait ConflictPolicySource: Send + Sync {
    /// Returns the policy in force for a tenant.
    async fn policy_for(&self, tenant_id: TenantId) -> DirectoryResult<ConflictPolicy>;
}

/// Errors returned by directory adapters.
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    /// The collaborator could not be reached.
    #[error("directory unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl DirectoryError {
    /// Wraps a collaborator failure.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
