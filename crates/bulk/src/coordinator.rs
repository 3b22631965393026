//! Bulk delete, export and status change over the current selection.
//!
//! The coordinator never owns the collection. Every operation borrows the
//! [`ReportCollectionStore`] mutably for its whole run, so the store stays
//! the single writer of collection and selection state while remote calls
//! are in flight.

use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use serde_json::json;

use elecmate_core::bulk::{
    BulkActionKind, BulkActionState, BulkResultKind, DeleteOutcome, ExportDelivery,
    ExportOutcome, ExportProgress, RemoteError, StatusChangeOutcome,
};
use elecmate_core::collection::ReportCollectionStore;
use elecmate_core::error::CoreError;
use elecmate_core::report::{CollectionPage, ReportStatus, FIRST_PAGE};
use elecmate_core::types::ReportId;
use elecmate_events::{BulkActionNotice, EventBus};

use crate::config::CoordinatorConfig;
use crate::error::BulkError;
use crate::guard::InFlightRegistry;
use crate::progress::ProgressTracker;
use crate::session::Session;
use crate::storage::{ExportReport, ExportService, ReportStorage};

/// Runs bulk actions against a [`ReportStorage`] and an [`ExportService`].
pub struct BulkActionCoordinator<S, E> {
    storage: S,
    exporter: E,
    bus: Arc<EventBus>,
    config: CoordinatorConfig,
    in_flight: InFlightRegistry,
}

impl<S, E> BulkActionCoordinator<S, E>
where
    S: ReportStorage,
    E: ExportService,
{
    pub fn new(storage: S, exporter: E, bus: Arc<EventBus>, config: CoordinatorConfig) -> Self {
        Self {
            storage,
            exporter,
            bus,
            config,
            in_flight: InFlightRegistry::new(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn exporter(&self) -> &E {
        &self.exporter
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Whether an action of `kind` is currently running. Callers use this to
    /// disable the control that triggers it.
    pub fn state(&self, kind: BulkActionKind) -> BulkActionState {
        self.in_flight.state(kind)
    }

    // -----------------------------------------------------------------------
    // Paging
    // -----------------------------------------------------------------------

    /// Fetch page 1, replacing whatever the store holds.
    pub async fn load_first_page(
        &self,
        session: Option<&Session>,
        store: &mut ReportCollectionStore,
    ) -> Result<(), BulkError> {
        let session = session.ok_or(BulkError::Unauthenticated)?;
        let page = self.fetch(session, FIRST_PAGE).await?;
        store.append_page(page)?;
        Ok(())
    }

    /// Fetch and append the next page. Returns `false` without a request
    /// when the store already holds every page.
    pub async fn load_next_page(
        &self,
        session: Option<&Session>,
        store: &mut ReportCollectionStore,
    ) -> Result<bool, BulkError> {
        let session = session.ok_or(BulkError::Unauthenticated)?;
        if store.pages_loaded() > 0 && !store.has_more() {
            return Ok(false);
        }
        let page = self.fetch(session, store.next_page_number()).await?;
        store.append_page(page)?;
        Ok(true)
    }

    /// Re-fetch the authoritative collection from page 1 up to the depth the
    /// store had loaded. The store is only touched once every page arrived.
    pub async fn reload(
        &self,
        session: &Session,
        store: &mut ReportCollectionStore,
    ) -> Result<(), BulkError> {
        let depth = store.pages_loaded().max(FIRST_PAGE);
        let mut pages = Vec::with_capacity(depth as usize);
        for page_number in FIRST_PAGE..=depth {
            let page = self.fetch(session, page_number).await?;
            let has_more = page.has_more;
            pages.push(page);
            if !has_more {
                break;
            }
        }

        tracing::debug!(
            user_id = %session.user_id,
            pages = pages.len(),
            "Reloaded report collection"
        );
        for page in pages {
            store.append_page(page)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Bulk delete
    // -----------------------------------------------------------------------

    /// Soft-delete every selected report.
    ///
    /// Selected rows are hidden at once and the selection mode closes. One
    /// request per id runs concurrently. When all succeed the rows are
    /// dropped; when any fail the collection is reloaded.
    pub async fn bulk_delete(
        &self,
        session: Option<&Session>,
        store: &mut ReportCollectionStore,
    ) -> Result<DeleteOutcome, BulkError> {
        self.bulk_delete_with(session, store, |_| {}).await
    }

    /// [`bulk_delete`](Self::bulk_delete), calling `on_hidden` with the store
    /// once the selected rows are hidden and before any request is sent.
    /// Callers holding the store for the whole run use it to render the
    /// optimistic state.
    pub async fn bulk_delete_with<H>(
        &self,
        session: Option<&Session>,
        store: &mut ReportCollectionStore,
        on_hidden: H,
    ) -> Result<DeleteOutcome, BulkError>
    where
        H: FnOnce(&ReportCollectionStore),
    {
        let kind = BulkActionKind::Delete;
        let _guard = self.in_flight.begin(kind)?;
        let result = self.run_delete(session, store, on_hidden).await;
        self.announce(kind, session, &result);
        result
    }

    async fn run_delete<H>(
        &self,
        session: Option<&Session>,
        store: &mut ReportCollectionStore,
        on_hidden: H,
    ) -> Result<DeleteOutcome, BulkError>
    where
        H: FnOnce(&ReportCollectionStore),
    {
        let session = session.ok_or(BulkError::Unauthenticated)?;
        let ids = store.selected_ids();
        if ids.is_empty() {
            return Err(BulkError::EmptySelection(BulkActionKind::Delete));
        }

        store.hide_pending(&ids);
        store.exit_selection_mode();
        on_hidden(store);

        tracing::info!(user_id = %session.user_id, count = ids.len(), "Starting bulk delete");

        let results = join_all(
            ids.iter()
                .map(|id| self.timed(self.storage.soft_delete(id, &session.user_id))),
        )
        .await;

        let mut succeeded: Vec<ReportId> = Vec::with_capacity(ids.len());
        let mut failed: Vec<ReportId> = Vec::new();
        let mut first_error: Option<RemoteError> = None;
        for (id, result) in ids.into_iter().zip(results) {
            match result {
                Ok(()) => succeeded.push(id),
                Err(err) => {
                    tracing::warn!(report_id = %id, error = %err, "Report delete failed");
                    first_error.get_or_insert(err);
                    failed.push(id);
                }
            }
        }

        if failed.is_empty() {
            store.remove_confirmed(&succeeded);
            tracing::info!(count = succeeded.len(), "Bulk delete completed");
            return Ok(DeleteOutcome {
                success_count: succeeded.len(),
                fail_count: 0,
                first_error_message: None,
                reconciled: true,
            });
        }

        let reconciled = match self.reload(session, store).await {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(
                    error = %err,
                    "Reload after partial delete failed; applying confirmed results locally"
                );
                store.remove_confirmed(&succeeded);
                store.unhide(&failed);
                false
            }
        };

        Ok(DeleteOutcome {
            success_count: succeeded.len(),
            fail_count: failed.len(),
            first_error_message: first_error.map(|e| e.representative_message()),
            reconciled,
        })
    }

    // -----------------------------------------------------------------------
    // Bulk export
    // -----------------------------------------------------------------------

    /// Generate documents for every selected report.
    ///
    /// `on_progress` receives one update per completed document, with a
    /// `current` count that never decreases. The selection is cleared
    /// whatever the result; stored data is never touched.
    pub async fn bulk_export<F>(
        &self,
        session: Option<&Session>,
        store: &mut ReportCollectionStore,
        on_progress: F,
    ) -> Result<ExportOutcome, BulkError>
    where
        F: Fn(ExportProgress) + Send + Sync,
    {
        let kind = BulkActionKind::Export;
        let _guard = self.in_flight.begin(kind)?;
        let result = self.run_export(session, store, on_progress).await;
        self.announce(kind, session, &result);
        result
    }

    async fn run_export<F>(
        &self,
        session: Option<&Session>,
        store: &mut ReportCollectionStore,
        on_progress: F,
    ) -> Result<ExportOutcome, BulkError>
    where
        F: Fn(ExportProgress) + Send + Sync,
    {
        let session = session.ok_or(BulkError::Unauthenticated)?;
        let ids = store.selected_ids();
        if ids.is_empty() {
            return Err(BulkError::EmptySelection(BulkActionKind::Export));
        }

        let total = ids.len();
        let delivery = ExportDelivery::for_selection(total);
        tracing::info!(
            user_id = %session.user_id,
            delivery = delivery.as_str(),
            "{}",
            delivery.start_message(total)
        );

        let tracker = ProgressTracker::new(on_progress);
        let forward = |progress: ExportProgress| {
            tracing::debug!(
                report_id = %progress.report_id,
                "{}",
                delivery.progress_message(progress.current, progress.total)
            );
            tracker.report(progress);
        };

        let report = match self
            .exporter
            .generate_bulk_export(&ids, &session.user_id, delivery, &forward)
            .await
        {
            Ok(report) => report,
            Err(err) => {
                tracing::error!(error = %err, "Bulk export could not run");
                ExportReport {
                    successful: 0,
                    failed: total,
                    errors: vec![err.representative_message()],
                }
            }
        };

        store.exit_selection_mode();

        Ok(ExportOutcome {
            successful: report.successful,
            failed: report.failed,
            errors: report.errors,
            delivery,
        })
    }

    // -----------------------------------------------------------------------
    // Bulk status change
    // -----------------------------------------------------------------------

    /// Move every selected report to `status` in one batched request.
    ///
    /// On failure nothing local changes and the selection stays. On success
    /// the collection is reloaded and the selection mode closes.
    pub async fn bulk_change_status(
        &self,
        session: Option<&Session>,
        store: &mut ReportCollectionStore,
        status: ReportStatus,
    ) -> Result<StatusChangeOutcome, BulkError> {
        let kind = BulkActionKind::StatusChange;
        let _guard = self.in_flight.begin(kind)?;
        let result = self.run_status_change(session, store, status).await;
        self.announce(kind, session, &result);
        result
    }

    async fn run_status_change(
        &self,
        session: Option<&Session>,
        store: &mut ReportCollectionStore,
        status: ReportStatus,
    ) -> Result<StatusChangeOutcome, BulkError> {
        let session = session.ok_or(BulkError::Unauthenticated)?;
        if !status.is_assignable() {
            return Err(CoreError::Validation(format!(
                "Reports cannot be moved to status '{}'",
                status.as_str()
            ))
            .into());
        }
        let ids = store.selected_ids();
        if ids.is_empty() {
            return Err(BulkError::EmptySelection(BulkActionKind::StatusChange));
        }

        tracing::info!(
            user_id = %session.user_id,
            count = ids.len(),
            status = status.as_str(),
            "Starting bulk status change"
        );

        self.timed(self.storage.update_status(&ids, &session.user_id, status))
            .await
            .map_err(BulkError::BatchFailure)?;

        let reconciled = match self.reload(session, store).await {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(error = %err, "Reload after status change failed");
                false
            }
        };
        store.exit_selection_mode();

        Ok(StatusChangeOutcome {
            updated: ids.len(),
            status,
            reconciled,
        })
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn fetch(&self, session: &Session, page_number: u32) -> Result<CollectionPage, BulkError> {
        self.timed(
            self.storage
                .fetch_page(&session.user_id, page_number, self.config.page_size),
        )
        .await
        .map_err(BulkError::Fetch)
    }

    /// Bound a remote call by the configured request timeout.
    async fn timed<T>(
        &self,
        request: impl Future<Output = Result<T, RemoteError>>,
    ) -> Result<T, RemoteError> {
        match tokio::time::timeout(self.config.request_timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::timeout(self.config.request_timeout.as_secs())),
        }
    }

    /// Publish exactly one notice for a settled action.
    fn announce<T: Settled>(
        &self,
        kind: BulkActionKind,
        session: Option<&Session>,
        result: &Result<T, BulkError>,
    ) {
        let notice = match result {
            Ok(outcome) => outcome.notice(),
            Err(err) => BulkActionNotice::new(kind, BulkResultKind::TotalFailure, err.to_string()),
        };
        let notice = match session {
            Some(session) => notice.with_actor(session.user_id.clone()),
            None => notice,
        };
        self.bus.publish(notice);
    }
}

// ---------------------------------------------------------------------------
// Notices
// ---------------------------------------------------------------------------

/// Outcome types that can be announced on the event bus.
trait Settled {
    fn notice(&self) -> BulkActionNotice;
}

impl Settled for DeleteOutcome {
    fn notice(&self) -> BulkActionNotice {
        BulkActionNotice::new(BulkActionKind::Delete, self.result_kind(), self.summary())
            .with_counts(self.success_count, self.fail_count)
            .with_payload(json!({
                "reconciled": self.reconciled,
                "first_error": self.first_error_message,
            }))
    }
}

impl Settled for ExportOutcome {
    fn notice(&self) -> BulkActionNotice {
        BulkActionNotice::new(BulkActionKind::Export, self.result_kind(), self.summary())
            .with_counts(self.successful, self.failed)
            .with_payload(json!({
                "delivery": self.delivery.as_str(),
                "errors": self.errors,
            }))
    }
}

impl Settled for StatusChangeOutcome {
    fn notice(&self) -> BulkActionNotice {
        BulkActionNotice::new(
            BulkActionKind::StatusChange,
            BulkResultKind::Success,
            self.summary(),
        )
        .with_counts(self.updated, 0)
        .with_payload(json!({
            "status": self.status.as_str(),
            "reconciled": self.reconciled,
        }))
    }
}
