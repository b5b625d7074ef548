//! Shared fixtures for in-memory integration tests.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use fieldops::dispatch::{
    adapters::memory::{
        InMemoryCommercialRecords, InMemoryLogisticsSource, InMemoryWorkerDirectory,
        StaticConflictPolicies,
    },
    domain::{
        CommercialRecord, ConflictPolicy, DepositState, FeeWaiverState, SkillTag,
        TaskCreationRequest, WorkerProfile,
    },
    services::{DispatchService, DispatchSources},
};
use fieldops::task::{
    adapters::memory::{
        InMemoryTaskRepository, RecordingAuditSink, RecordingLedgerPoster,
        RecordingNotificationSink,
    },
    domain::{
        Actor, ActorRole, CommercialRecordId, FieldTask, GeoPoint, Money, ScheduledVisit,
        SiteAddress, TaskKind, TenantId, TimeSlot, UserId,
    },
    services::{OutboundPorts, TaskLifecycleService},
};
use mockable::Clock;
use rstest::fixture;

/// Dispatch service type used by the integration tests.
pub type TestDispatchService = DispatchService<InMemoryTaskRepository, FixedClock>;
/// Lifecycle service type used by the integration tests.
pub type TestLifecycleService = TaskLifecycleService<InMemoryTaskRepository, FixedClock>;

/// Clock frozen at a chosen instant, movable by tests.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl FixedClock {
    /// Creates a clock reading `now`.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().expect("clock lock") = now;
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}

/// Visit date used throughout the integration tests.
pub fn visit_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date")
}

/// Instant on the visit date.
pub fn on_visit_day(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, hour, minute, 0)
        .single()
        .expect("valid timestamp")
}

/// Visit on the test date.
pub fn visit(label: &str) -> ScheduledVisit {
    ScheduledVisit::new(visit_day(), TimeSlot::try_from(label).expect("valid slot"))
}

/// Site with a known coordinate.
pub fn lake_site() -> SiteAddress {
    SiteAddress::new("1 Lake Road")
        .expect("valid address")
        .with_coordinate(GeoPoint::new(31.2304, 121.4737).expect("valid coordinate"))
}

/// Site roughly 40 km from [`lake_site`].
pub fn north_site() -> SiteAddress {
    SiteAddress::new("88 North Ring Road")
        .expect("valid address")
        .with_coordinate(GeoPoint::new(31.5904, 121.4737).expect("valid coordinate"))
}

/// One tenant's staff, services and recording collaborators.
pub struct Fixture {
    pub tenant: TenantId,
    pub admin: Actor,
    pub dispatcher: Actor,
    pub second_dispatcher: Actor,
    pub sales: Actor,
    pub worker: Actor,
    pub backup_worker: Actor,
    pub paid_record: CommercialRecordId,
    pub records: InMemoryCommercialRecords,
    pub logistics: InMemoryLogisticsSource,
    pub repository: Arc<InMemoryTaskRepository>,
    pub dispatch: Arc<TestDispatchService>,
    pub lifecycle: Arc<TestLifecycleService>,
    pub audit: RecordingAuditSink,
    pub ledger: RecordingLedgerPoster,
    pub notifications: RecordingNotificationSink,
    pub clock: Arc<FixedClock>,
}

impl Fixture {
    /// Builds a fixture whose clock reads `now`.
    pub fn at(now: DateTime<Utc>) -> Self {
        let tenant = TenantId::new();
        let member = |role| Actor::new(UserId::new(), tenant, role);
        let worker = member(ActorRole::Worker);
        let backup_worker = member(ActorRole::Worker);

        let workers = InMemoryWorkerDirectory::new();
        workers
            .upsert(WorkerProfile::new(worker.id, tenant, "Chen", [SkillTag::Curtain]))
            .expect("upsert worker");
        workers
            .upsert(
                WorkerProfile::new(backup_worker.id, tenant, "Wu", [SkillTag::All])
                    .with_active_task_count(2),
            )
            .expect("upsert worker");

        let records = InMemoryCommercialRecords::new();
        let paid = CommercialRecord {
            id: CommercialRecordId::new(),
            tenant_id: tenant,
            deposit: DepositState::Paid,
            fee_waiver: FeeWaiverState::NotRequested,
        };
        records.upsert(paid).expect("upsert record");

        let repository = Arc::new(InMemoryTaskRepository::new());
        let audit = RecordingAuditSink::new();
        let ledger = RecordingLedgerPoster::new();
        let notifications = RecordingNotificationSink::new();
        let outbound = OutboundPorts::new(
            Arc::new(audit.clone()),
            Arc::new(ledger.clone()),
            Arc::new(notifications.clone()),
        );
        let clock = Arc::new(FixedClock::at(now));
        let logistics = InMemoryLogisticsSource::new();
        let sources = DispatchSources {
            workers: Arc::new(workers),
            records: Arc::new(records.clone()),
            policies: Arc::new(StaticConflictPolicies::new(ConflictPolicy::default())),
            logistics: Arc::new(logistics.clone()),
        };

        Self {
            tenant,
            admin: member(ActorRole::Admin),
            dispatcher: member(ActorRole::Dispatcher),
            second_dispatcher: member(ActorRole::Dispatcher),
            sales: member(ActorRole::Sales),
            worker,
            backup_worker,
            paid_record: paid.id,
            records,
            logistics,
            dispatch: Arc::new(DispatchService::new(
                Arc::clone(&repository),
                sources,
                outbound.clone(),
                Arc::clone(&clock),
            )),
            lifecycle: Arc::new(TaskLifecycleService::new(
                Arc::clone(&repository),
                outbound,
                Arc::clone(&clock),
            )),
            repository,
            audit,
            ledger,
            notifications,
            clock,
        }
    }

    /// Measurement request against the paid record.
    pub fn request(&self, site: SiteAddress) -> TaskCreationRequest {
        self.request_of(TaskKind::Measurement, site)
    }

    /// Request of `kind` against the paid record.
    pub fn request_of(&self, kind: TaskKind, site: SiteAddress) -> TaskCreationRequest {
        TaskCreationRequest::new(kind, "CURTAIN_FABRIC", site, self.paid_record)
            .with_labor_fee(Money::from_minor_units(15_000).expect("valid amount"))
    }

    /// Creates an admitted measurement task at `site` as the sales user.
    pub async fn create_task(&self, site: SiteAddress) -> FieldTask {
        self.create_task_of(TaskKind::Measurement, site).await
    }

    /// Creates an admitted task of `kind` at `site` as the sales user.
    pub async fn create_task_of(&self, kind: TaskKind, site: SiteAddress) -> FieldTask {
        self.dispatch
            .create_task(&self.sales, self.request_of(kind, site))
            .await
            .expect("task admitted")
            .task
    }
}

/// Fixture with the clock two days before the visit date.
#[fixture]
pub fn fixture() -> Fixture {
    Fixture::at(
        Utc.with_ymd_and_hms(2024, 5, 30, 9, 0, 0)
            .single()
            .expect("valid timestamp"),
    )
}
