use elecmate_core::bulk::{BulkActionKind, RemoteError};
use elecmate_core::error::CoreError;

/// Errors that stop a bulk action or a page load before it settles normally.
///
/// Per-item failures inside an accepted delete or export are not errors;
/// they are counted in the action's outcome.
#[derive(Debug, thiserror::Error)]
pub enum BulkError {
    #[error("You must be signed in to manage reports")]
    Unauthenticated,

    #[error("No reports selected for {0}")]
    EmptySelection(BulkActionKind),

    #[error("A bulk {0} is already in progress")]
    AlreadyInFlight(BulkActionKind),

    /// A single-request batch (status change) was rejected as a whole.
    #[error("Failed to update reports: {}", .0.representative_message())]
    BatchFailure(RemoteError),

    /// Fetching a page of summaries failed.
    #[error("Failed to load reports: {}", .0.representative_message())]
    Fetch(RemoteError),

    #[error(transparent)]
    Core(#[from] CoreError),
}
