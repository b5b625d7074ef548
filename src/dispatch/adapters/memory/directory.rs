//! In-memory worker, commercial record, purchase order and policy sources
//! for tests and local runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::dispatch::{
    domain::{CommercialRecord, ConflictPolicy, PurchaseOrder, WorkerProfile},
    ports::{
        CommercialRecordSource, ConflictPolicySource, DirectoryError, DirectoryResult,
        LogisticsSource, WorkerDirectory,
    },
};
use crate::task::domain::{CommercialRecordId, TenantId, UserId};

fn lock_poisoned(err: impl ToString) -> DirectoryError {
    DirectoryError::unavailable(std::io::Error::other(err.to_string()))
}

/// Thread-safe in-memory worker directory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkerDirectory {
    workers: Arc<RwLock<HashMap<(TenantId, UserId), WorkerProfile>>>,
}

impl InMemoryWorkerDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a worker.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Unavailable`] when the lock is poisoned.
    pub fn upsert(&self, worker: WorkerProfile) -> DirectoryResult<()> {
        let mut workers = self.workers.write().map_err(lock_poisoned)?;
        workers.insert((worker.tenant_id(), worker.id()), worker);
        Ok(())
    }
}

#[async_trait]
impl WorkerDirectory for InMemoryWorkerDirectory {
    async fn find(
        &self,
        tenant_id: TenantId,
        worker_id: UserId,
    ) -> DirectoryResult<Option<WorkerProfile>> {
        let workers = self.workers.read().map_err(lock_poisoned)?;
        Ok(workers.get(&(tenant_id, worker_id)).cloned())
    }

    async fn list(&self, tenant_id: TenantId) -> DirectoryResult<Vec<WorkerProfile>> {
        let workers = self.workers.read().map_err(lock_poisoned)?;
        Ok(workers
            .values()
            .filter(|worker| worker.tenant_id() == tenant_id)
            .cloned()
            .collect())
    }
}

/// Thread-safe in-memory commercial record store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCommercialRecords {
    records: Arc<RwLock<HashMap<CommercialRecordId, CommercialRecord>>>,
}

impl InMemoryCommercialRecords {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a record.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Unavailable`] when the lock is poisoned.
    pub fn upsert(&self, record: CommercialRecord) -> DirectoryResult<()> {
        let mut records = self.records.write().map_err(lock_poisoned)?;
        records.insert(record.id, record);
        Ok(())
    }
}

#[async_trait]
impl CommercialRecordSource for InMemoryCommercialRecords {
    async fn find(
        &self,
        tenant_id: TenantId,
        record_id: CommercialRecordId,
    ) -> DirectoryResult<Option<CommercialRecord>> {
        let records = self.records.read().map_err(lock_poisoned)?;
        Ok(records
            .get(&record_id)
            .filter(|record| record.tenant_id == tenant_id)
            .copied())
    }
}

/// Thread-safe in-memory purchase order store. Records without orders are
/// ready for installation.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLogisticsSource {
    orders: Arc<RwLock<HashMap<(TenantId, CommercialRecordId), Vec<PurchaseOrder>>>>,
}

impl InMemoryLogisticsSource {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the orders placed for a record.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Unavailable`] when the lock is poisoned.
    pub fn set_orders(
        &self,
        tenant_id: TenantId,
        record_id: CommercialRecordId,
        orders: Vec<PurchaseOrder>,
    ) -> DirectoryResult<()> {
        let mut stored = self.orders.write().map_err(lock_poisoned)?;
        stored.insert((tenant_id, record_id), orders);
        Ok(())
    }
}

#[async_trait]
impl LogisticsSource for InMemoryLogisticsSource {
    async fn purchase_orders(
        &self,
        tenant_id: TenantId,
        record_id: CommercialRecordId,
    ) -> DirectoryResult<Vec<PurchaseOrder>> {
        let stored = self.orders.read().map_err(lock_poisoned)?;
        Ok(stored
            .get(&(tenant_id, record_id))
            .cloned()
            .unwrap_or_default())
    }
}

/// Policy source with one fallback policy and optional per-tenant overrides.
#[derive(Debug, Clone, Default)]
pub struct StaticConflictPolicies {
    fallback: ConflictPolicy,
    overrides: Arc<RwLock<HashMap<TenantId, ConflictPolicy>>>,
}

impl StaticConflictPolicies {
    /// Creates a source answering `fallback` for every tenant.
    #[must_use]
    pub fn new(fallback: ConflictPolicy) -> Self {
        Self {
            fallback,
            overrides: Arc::default(),
        }
    }

    /// Sets a tenant-specific policy.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Unavailable`] when the lock is poisoned.
    pub fn set_tenant_policy(
        &self,
        tenant_id: TenantId,
        policy: ConflictPolicy,
    ) -> DirectoryResult<()> {
        let mut overrides = self.overrides.write().map_err(lock_poisoned)?;
        overrides.insert(tenant_id, policy);
        Ok(())
    }
}

#[async_trait]
impl ConflictPolicySource for StaticConflictPolicies {
    async fn policy_for(&self, tenant_id: TenantId) -> DirectoryResult<ConflictPolicy> {
        let overrides = self.overrides.read().map_err(lock_poisoned)?;
        Ok(overrides.get(&tenant_id).copied().unwrap_or(self.fallback))
    }
}
