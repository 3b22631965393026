//! Shared fixtures for coordinator integration tests.
//!
//! [`FakeStorage`] and [`FakeExporter`] keep their state behind
//! `std::sync::Mutex`. Locks are always released before any `.await`.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{Duration as ChronoDuration, TimeZone, Utc};

use elecmate_bulk::{
    BulkActionCoordinator, CoordinatorConfig, ExportReport, ExportService, ProgressFn,
    ReportStorage, Session,
};
use elecmate_core::bulk::{ExportDelivery, ExportProgress, RemoteError};
use elecmate_core::collection::ReportCollectionStore;
use elecmate_core::report::{CollectionPage, ReportStatus, ReportSummary, ReportType};
use elecmate_core::types::ReportId;
use elecmate_events::{BulkActionNotice, EventBus};
use tokio::sync::broadcast;

pub const USER_ID: &str = "user-1";
pub const PAGE_SIZE: u32 = 10;

/// Long enough to trip any test timeout.
pub const HANG: Duration = Duration::from_secs(3600);

pub type TestCoordinator = BulkActionCoordinator<FakeStorage, FakeExporter>;

pub fn session() -> Session {
    Session::new(USER_ID)
}

/// Report `id` updated `age_days` before a fixed reference time.
pub fn summary(id: &str, age_days: i64) -> ReportSummary {
    let base = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let ts = base - ChronoDuration::days(age_days);
    ReportSummary {
        id: id.to_string(),
        report_type: ReportType::Eicr,
        status: ReportStatus::Draft,
        client_name: Some(format!("Client {id}")),
        address: None,
        updated_at: ts,
        created_at: ts,
    }
}

/// `r1..=rN`, newest first.
pub fn seeded_reports(count: usize) -> Vec<ReportSummary> {
    (1..=count)
        .map(|n| summary(&format!("r{n}"), n as i64))
        .collect()
}

pub fn ids(values: &[&str]) -> Vec<ReportId> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Build a coordinator over fresh fakes and subscribe to its notices.
pub fn coordinator(
    storage: FakeStorage,
    exporter: FakeExporter,
) -> (TestCoordinator, broadcast::Receiver<BulkActionNotice>) {
    let bus = Arc::new(EventBus::default());
    let rx = bus.subscribe();
    let config = CoordinatorConfig {
        page_size: PAGE_SIZE,
        request_timeout: Duration::from_secs(5),
    };
    (BulkActionCoordinator::new(storage, exporter, bus, config), rx)
}

/// Load every page into a new store, enter selection mode and select `selected`.
pub async fn loaded_store(coordinator: &TestCoordinator, selected: &[&str]) -> ReportCollectionStore {
    let session = session();
    let mut store = ReportCollectionStore::new();
    coordinator
        .load_first_page(Some(&session), &mut store)
        .await
        .expect("first page should load");
    while coordinator
        .load_next_page(Some(&session), &mut store)
        .await
        .expect("next page should load")
    {}
    store.enter_selection_mode();
    for id in selected {
        assert!(store.toggle_select(id), "{id} should be selectable");
    }
    store
}

/// Drain every notice currently buffered.
pub fn drain(rx: &mut broadcast::Receiver<BulkActionNotice>) -> Vec<BulkActionNotice> {
    let mut notices = Vec::new();
    while let Ok(notice) = rx.try_recv() {
        notices.push(notice);
    }
    notices
}

// ---------------------------------------------------------------------------
// FakeStorage
// ---------------------------------------------------------------------------

/// In-memory report store with failure injection.
#[derive(Default)]
pub struct FakeStorage {
    rows: Mutex<Vec<ReportSummary>>,
    delete_failures: Mutex<HashMap<ReportId, RemoteError>>,
    hanging_deletes: Mutex<HashSet<ReportId>>,
    delete_delay: Mutex<Option<Duration>>,
    update_failure: Mutex<Option<RemoteError>>,
    fetch_fails: AtomicBool,
    pub fetch_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub update_calls: Mutex<Vec<Vec<ReportId>>>,
}

impl FakeStorage {
    pub fn with_reports(rows: Vec<ReportSummary>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Default::default()
        }
    }

    pub fn fail_delete(&self, id: &str, message: &str) {
        self.delete_failures
            .lock()
            .unwrap()
            .insert(id.to_string(), RemoteError::new(message).with_code("55P03"));
    }

    pub fn hang_delete(&self, id: &str) {
        self.hanging_deletes.lock().unwrap().insert(id.to_string());
    }

    pub fn delay_deletes(&self, delay: Duration) {
        *self.delete_delay.lock().unwrap() = Some(delay);
    }

    pub fn fail_update(&self, message: &str) {
        *self.update_failure.lock().unwrap() = Some(RemoteError::new(message));
    }

    pub fn fail_fetches(&self, fail: bool) {
        self.fetch_fails.store(fail, Ordering::SeqCst);
    }

    pub fn row_ids(&self) -> Vec<ReportId> {
        self.rows.lock().unwrap().iter().map(|r| r.id.clone()).collect()
    }

    pub fn status_of(&self, id: &str) -> Option<ReportStatus> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.status)
    }

    fn page(&self, page_number: u32, page_size: u32) -> CollectionPage {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        let total = rows.len() as u64;
        let items = rows
            .into_iter()
            .skip(((page_number - 1) * page_size) as usize)
            .take(page_size as usize)
            .collect();
        CollectionPage::new(items, total, page_number, page_size)
    }

    fn delete_plan(&self, id: &str) -> (Option<Duration>, Option<RemoteError>) {
        let delay = if self.hanging_deletes.lock().unwrap().contains(id) {
            Some(HANG)
        } else {
            *self.delete_delay.lock().unwrap()
        };
        let failure = self.delete_failures.lock().unwrap().get(id).cloned();
        (delay, failure)
    }

    fn remove_row(&self, id: &str) -> Result<(), RemoteError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.id != id);
        if rows.len() == before {
            return Err(RemoteError::new(format!("Report {id} not found")));
        }
        Ok(())
    }

    fn apply_status(&self, report_ids: &[ReportId], status: ReportStatus) -> Result<(), RemoteError> {
        self.update_calls.lock().unwrap().push(report_ids.to_vec());
        if let Some(err) = self.update_failure.lock().unwrap().clone() {
            return Err(err);
        }
        let mut rows = self.rows.lock().unwrap();
        for row in rows.iter_mut().filter(|r| report_ids.contains(&r.id)) {
            row.status = status;
        }
        Ok(())
    }
}

impl ReportStorage for FakeStorage {
    async fn fetch_page(
        &self,
        _user_id: &str,
        page_number: u32,
        page_size: u32,
    ) -> Result<CollectionPage, RemoteError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fetch_fails.load(Ordering::SeqCst) {
            return Err(RemoteError::transport("connection reset"));
        }
        Ok(self.page(page_number, page_size))
    }

    async fn soft_delete(&self, report_id: &str, _user_id: &str) -> Result<(), RemoteError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        let (delay, failure) = self.delete_plan(report_id);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match failure {
            Some(err) => Err(err),
            None => self.remove_row(report_id),
        }
    }

    async fn update_status(
        &self,
        report_ids: &[ReportId],
        _user_id: &str,
        status: ReportStatus,
    ) -> Result<(), RemoteError> {
        self.apply_status(report_ids, status)
    }
}

// ---------------------------------------------------------------------------
// FakeExporter
// ---------------------------------------------------------------------------

/// Document generator that completes reports in reverse submission order.
#[derive(Default)]
pub struct FakeExporter {
    failing: Mutex<HashSet<ReportId>>,
    unavailable: Mutex<Option<RemoteError>>,
    /// Overrides the `current` value sent with each progress update.
    progress_counts: Mutex<Option<Vec<usize>>>,
    pub calls: Mutex<Vec<(Vec<ReportId>, ExportDelivery)>>,
}

impl FakeExporter {
    pub fn fail_report(&self, id: &str) {
        self.failing.lock().unwrap().insert(id.to_string());
    }

    pub fn make_unavailable(&self, message: &str) {
        *self.unavailable.lock().unwrap() = Some(RemoteError::new(message));
    }

    pub fn script_progress(&self, counts: Vec<usize>) {
        *self.progress_counts.lock().unwrap() = Some(counts);
    }

    fn run(
        &self,
        report_ids: &[ReportId],
        delivery: ExportDelivery,
        on_progress: ProgressFn<'_>,
    ) -> Result<ExportReport, RemoteError> {
        self.calls
            .lock()
            .unwrap()
            .push((report_ids.to_vec(), delivery));
        if let Some(err) = self.unavailable.lock().unwrap().clone() {
            return Err(err);
        }

        let failing = self.failing.lock().unwrap().clone();
        let scripted = self.progress_counts.lock().unwrap().clone();
        let total = report_ids.len();
        let mut report = ExportReport::default();

        for (done, id) in report_ids.iter().rev().enumerate() {
            if failing.contains(id) {
                report.failed += 1;
                report.errors.push(format!("{id}: PDF generation failed"));
            } else {
                report.successful += 1;
            }
            let current = scripted
                .as_ref()
                .and_then(|counts| counts.get(done).copied())
                .unwrap_or(done + 1);
            on_progress(ExportProgress {
                current,
                total,
                report_id: id.clone(),
            });
        }
        Ok(report)
    }
}

impl ExportService for FakeExporter {
    async fn generate_bulk_export(
        &self,
        report_ids: &[ReportId],
        _user_id: &str,
        delivery: ExportDelivery,
        on_progress: ProgressFn<'_>,
    ) -> Result<ExportReport, RemoteError> {
        self.run(report_ids, delivery, on_progress)
    }
}
