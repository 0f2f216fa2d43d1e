//! In-process stand-ins for the hosted backend, used by unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};

use crate::core::config::FirebaseConfig;
use crate::core::error::{AppError, Result};
use crate::features::app::models::AppSnapshot;
use crate::features::app::services::AppShellHandle;
use crate::features::reports::models::{NewReport, Report, ReportId, ReportPatch, ReportStatus};
use crate::features::reports::ReportStore;
use crate::features::session::models::Identity;
use crate::features::session::IdentityProvider;
use crate::shared::subscription::Subscription;

/// Pending report with the given creation time in epoch millis
pub fn report_at(id: &str, created_at_millis: Option<i64>) -> Report {
    Report {
        id: id.to_string(),
        description: format!("report {}", id),
        location: "Main St".to_string(),
        category: "Infrastructure".to_string(),
        status: ReportStatus::Pending,
        created_at: created_at_millis.and_then(DateTime::<Utc>::from_timestamp_millis),
        resolved_at: None,
    }
}

/// Firebase config with every base URL pointed at a local stub server
pub fn test_firebase_config(base_url: &str) -> FirebaseConfig {
    FirebaseConfig {
        api_key: "test-api-key".to_string(),
        project_id: "civic-eye".to_string(),
        auth_base_url: format!("{}/identitytoolkit.googleapis.com", base_url),
        token_base_url: format!("{}/securetoken.googleapis.com", base_url),
        firestore_base_url: base_url.to_string(),
        collection: "reports".to_string(),
        poll_interval: Duration::from_millis(50),
    }
}

/// Serve a router on an ephemeral local port and return its base URL
pub async fn spawn_stub_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Wait until a published snapshot satisfies the predicate
pub async fn wait_for_snapshot(
    handle: &AppShellHandle,
    predicate: impl Fn(&AppSnapshot) -> bool,
) -> AppSnapshot {
    let mut snapshots = handle.watch();
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            {
                let current = snapshots.borrow_and_update();
                if predicate(&current) {
                    return current.clone();
                }
            }
            snapshots.changed().await.unwrap();
        }
    })
    .await
    .expect("snapshot condition not reached")
}

/// Identity provider that signs in instantly (or fails on demand)
pub struct FakeIdentityProvider {
    identity: watch::Sender<Option<Identity>>,
    failing: AtomicBool,
    sign_in_calls: AtomicUsize,
}

impl FakeIdentityProvider {
    pub fn new() -> Self {
        let (identity, _) = watch::channel(None);
        Self {
            identity,
            failing: AtomicBool::new(false),
            sign_in_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        let provider = Self::new();
        provider.set_failing(true);
        provider
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sign_in_calls(&self) -> usize {
        self.sign_in_calls.load(Ordering::SeqCst)
    }

    pub fn sign_out(&self) {
        self.identity.send_replace(None);
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn sign_in_anonymously(&self) -> Result<()> {
        let call = self.sign_in_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::ExternalServiceError(
                "identity service unreachable".to_string(),
            ));
        }
        self.identity
            .send_replace(Some(Identity::anonymous(format!("anon-{}", call))));
        Ok(())
    }

    fn on_identity_change(&self) -> Subscription<Option<Identity>> {
        Subscription::from_watch(self.identity.subscribe())
    }
}

#[derive(Default)]
struct FakeStoreInner {
    reports: Vec<Report>,
    subscribers: Vec<mpsc::UnboundedSender<Vec<Report>>>,
    fail_writes: bool,
    create_calls: usize,
    update_calls: usize,
}

impl FakeStoreInner {
    /// Push the full collection to every live subscriber
    fn broadcast(&mut self) {
        let reports = self.reports.clone();
        self.subscribers
            .retain(|subscriber| subscriber.send(reports.clone()).is_ok());
    }
}

/// Report store kept in memory that pushes a full snapshot on every change
#[derive(Default)]
pub struct FakeReportStore {
    inner: Mutex<FakeStoreInner>,
}

impl FakeReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.inner.lock().unwrap().fail_writes = fail;
    }

    /// Insert a record as if another client had written it
    pub fn seed(&self, id: &str, created_at_millis: Option<i64>, status: ReportStatus) {
        let mut inner = self.inner.lock().unwrap();
        let mut report = report_at(id, created_at_millis);
        if status == ReportStatus::Resolved {
            report.resolved_at = Some(Utc::now());
        }
        report.status = status;
        inner.reports.push(report);
        inner.broadcast();
    }

    pub fn reports(&self) -> Vec<Report> {
        self.inner.lock().unwrap().reports.clone()
    }

    pub fn create_calls(&self) -> usize {
        self.inner.lock().unwrap().create_calls
    }

    pub fn update_calls(&self) -> usize {
        self.inner.lock().unwrap().update_calls
    }

    pub fn subscriber_count(&self) -> usize {
        let mut inner = self.inner.lock().unwrap();
        inner.subscribers.retain(|subscriber| !subscriber.is_closed());
        inner.subscribers.len()
    }
}

#[async_trait]
impl ReportStore for FakeReportStore {
    async fn create(&self, _collection: &str, report: NewReport) -> Result<ReportId> {
        let mut inner = self.inner.lock().unwrap();
        inner.create_calls += 1;
        if inner.fail_writes {
            return Err(AppError::ExternalServiceError("write rejected".to_string()));
        }

        let id = format!("report-{}", inner.create_calls);
        inner.reports.push(Report {
            id: id.clone(),
            description: report.description,
            location: report.location,
            category: report.category,
            status: report.status,
            created_at: Some(Utc::now()),
            resolved_at: None,
        });
        inner.broadcast();
        Ok(id)
    }

    async fn update(&self, _collection: &str, id: &str, patch: ReportPatch) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.update_calls += 1;
        if inner.fail_writes {
            return Err(AppError::ExternalServiceError("write rejected".to_string()));
        }

        let report = inner
            .reports
            .iter_mut()
            .find(|report| report.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;
        match patch {
            ReportPatch::Resolve => {
                report.status = ReportStatus::Resolved;
                report.resolved_at = Some(Utc::now());
            }
        }
        inner.broadcast();
        Ok(())
    }

    fn subscribe(&self, _collection: &str) -> Subscription<Vec<Report>> {
        let (sender, subscription) = Subscription::channel();
        let mut inner = self.inner.lock().unwrap();
        if sender.send(inner.reports.clone()).is_ok() {
            inner.subscribers.push(sender);
        }
        subscription
    }
}
