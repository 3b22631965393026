//! Seams to the remote report store and the document generator.
//!
//! Implementations live in `elecmate-cloud`; tests supply in-memory fakes.

use std::future::Future;

use elecmate_core::bulk::{ExportDelivery, ExportProgress, RemoteError};
use elecmate_core::report::{CollectionPage, ReportStatus};
use elecmate_core::types::ReportId;

/// Progress callback handed to an [`ExportService`]. Called once per
/// completed document, in completion order.
pub type ProgressFn<'a> = &'a (dyn Fn(ExportProgress) + Send + Sync);

/// Paged, user-scoped access to report summaries.
pub trait ReportStorage: Send + Sync {
    /// Fetch one page of the user's live (not soft-deleted) reports.
    fn fetch_page(
        &self,
        user_id: &str,
        page_number: u32,
        page_size: u32,
    ) -> impl Future<Output = Result<CollectionPage, RemoteError>> + Send;

    /// Soft-delete one report.
    fn soft_delete(
        &self,
        report_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Set the status of every listed report in a single request. Either all
    /// rows change or none do.
    fn update_status(
        &self,
        report_ids: &[ReportId],
        user_id: &str,
        status: ReportStatus,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;
}

/// Raw result of a bulk document export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub successful: usize,
    pub failed: usize,
    /// One message per failed document.
    pub errors: Vec<String>,
}

/// Generates printable documents for a set of reports.
pub trait ExportService: Send + Sync {
    /// Generate documents for `report_ids`, delivered as `delivery`.
    ///
    /// Returns `Err` only when the export could not run at all; individual
    /// document failures are counted in the [`ExportReport`].
    fn generate_bulk_export(
        &self,
        report_ids: &[ReportId],
        user_id: &str,
        delivery: ExportDelivery,
        on_progress: ProgressFn<'_>,
    ) -> impl Future<Output = Result<ExportReport, RemoteError>> + Send;
}
