//! Bulk action types, thresholds and summary wording.
//!
//! Pure data shared by the bulk coordinator and its callers. The coordinator
//! lives in `elecmate-bulk`; everything here is I/O free.

use serde::{Deserialize, Serialize};

use crate::report::ReportStatus;
use crate::types::ReportId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Selections of at least this many reports are exported as one ZIP archive;
/// smaller selections are delivered as individual downloads.
pub const EXPORT_ARCHIVE_THRESHOLD: usize = 5;

/// Action kind strings used in logs and notices.
pub const ACTION_DELETE: &str = "delete";
pub const ACTION_EXPORT: &str = "export";
pub const ACTION_STATUS_CHANGE: &str = "status_change";

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The three bulk actions available in selection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkActionKind {
    Delete,
    Export,
    StatusChange,
}

impl BulkActionKind {
    pub const ALL: [BulkActionKind; 3] = [Self::Delete, Self::Export, Self::StatusChange];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delete => ACTION_DELETE,
            Self::Export => ACTION_EXPORT,
            Self::StatusChange => ACTION_STATUS_CHANGE,
        }
    }

    /// Stable index into per-kind tables.
    pub fn index(&self) -> usize {
        match self {
            Self::Delete => 0,
            Self::Export => 1,
            Self::StatusChange => 2,
        }
    }
}

impl std::fmt::Display for BulkActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-kind lifecycle: `Idle -> InFlight -> Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkActionState {
    Idle,
    InFlight,
}

/// How a settled bulk action went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkResultKind {
    Success,
    PartialFailure,
    TotalFailure,
}

impl BulkResultKind {
    /// Classify from success and failure counts.
    pub fn classify(succeeded: usize, failed: usize) -> Self {
        match (succeeded, failed) {
            (_, 0) => Self::Success,
            (0, _) => Self::TotalFailure,
            _ => Self::PartialFailure,
        }
    }
}

/// How exported documents reach the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportDelivery {
    /// One ZIP archive containing every document.
    Archive,
    /// One download per report.
    Individual,
}

impl ExportDelivery {
    /// Pick the delivery mode for a selection size.
    pub fn for_selection(selection_size: usize) -> Self {
        if selection_size >= EXPORT_ARCHIVE_THRESHOLD {
            Self::Archive
        } else {
            Self::Individual
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Archive => "archive",
            Self::Individual => "individual",
        }
    }

    /// Message shown when the export starts.
    pub fn start_message(&self, total: usize) -> String {
        match self {
            Self::Archive => format!("Generating {total} PDFs for ZIP archive..."),
            Self::Individual => format!("Generating {total} PDFs for individual downloads..."),
        }
    }

    /// Message shown after each document completes.
    pub fn progress_message(&self, current: usize, total: usize) -> String {
        match self {
            Self::Archive => format!("Adding PDF {current} of {total} to ZIP archive"),
            Self::Individual => format!("Downloading PDF {current} of {total}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Remote error shape
// ---------------------------------------------------------------------------

/// Normalized error from the remote report store.
///
/// Application-level `{code, message, details, hint}` bodies and transport
/// failures are both represented this way before they are surfaced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteError {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Transport-level failure (network, DNS, TLS, non-JSON response).
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::new(format!("Network error: {err}")).with_code("transport")
    }

    /// The collaborator did not answer within the request timeout.
    pub fn timeout(after_secs: u64) -> Self {
        Self::new(format!("Request timed out after {after_secs}s")).with_code("timeout")
    }

    /// Single-line message shown to the user.
    pub fn representative_message(&self) -> String {
        match self.hint.as_deref().filter(|h| !h.is_empty()) {
            Some(hint) => format!("{} ({hint})", self.message),
            None => self.message.clone(),
        }
    }
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "[{code}] {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for RemoteError {}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Export progress after one document completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportProgress {
    pub current: usize,
    pub total: usize,
    pub report_id: ReportId,
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Settled bulk delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub success_count: usize,
    pub fail_count: usize,
    pub first_error_message: Option<String>,
    /// `false` when a partial failure could not be reconciled by reloading.
    pub reconciled: bool,
}

impl DeleteOutcome {
    pub fn result_kind(&self) -> BulkResultKind {
        BulkResultKind::classify(self.success_count, self.fail_count)
    }

    pub fn summary(&self) -> String {
        match self.result_kind() {
            BulkResultKind::Success => {
                format!("Deleted {}", plural(self.success_count, "report"))
            }
            BulkResultKind::PartialFailure => format!(
                "Deleted {} of {} reports. {} failed: {}",
                self.success_count,
                self.success_count + self.fail_count,
                self.fail_count,
                self.first_error_message.as_deref().unwrap_or("unknown error"),
            ),
            BulkResultKind::TotalFailure => format!(
                "Failed to delete {}: {}",
                plural(self.fail_count, "report"),
                self.first_error_message.as_deref().unwrap_or("unknown error"),
            ),
        }
    }
}

/// Settled bulk export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOutcome {
    pub successful: usize,
    pub failed: usize,
    pub errors: Vec<String>,
    pub delivery: ExportDelivery,
}

impl ExportOutcome {
    pub fn result_kind(&self) -> BulkResultKind {
        BulkResultKind::classify(self.successful, self.failed)
    }

    pub fn summary(&self) -> String {
        let target = match self.delivery {
            ExportDelivery::Archive => "as ZIP archive",
            ExportDelivery::Individual => "as individual downloads",
        };
        match self.result_kind() {
            BulkResultKind::Success => {
                format!("Exported {} {target}", plural(self.successful, "report"))
            }
            BulkResultKind::PartialFailure => format!(
                "Exported {} of {} reports {target}. {} failed: {}",
                self.successful,
                self.successful + self.failed,
                self.failed,
                self.errors.first().map(String::as_str).unwrap_or("unknown error"),
            ),
            BulkResultKind::TotalFailure => format!(
                "Failed to export {}: {}",
                plural(self.failed, "report"),
                self.errors.first().map(String::as_str).unwrap_or("unknown error"),
            ),
        }
    }
}

/// Settled bulk status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChangeOutcome {
    pub updated: usize,
    pub status: ReportStatus,
    /// `false` when the post-update reload failed and the list is stale.
    pub reconciled: bool,
}

impl StatusChangeOutcome {
    pub fn summary(&self) -> String {
        format!(
            "Marked {} as {}",
            plural(self.updated, "report"),
            self.status.as_str()
        )
    }
}

/// `"1 report"`, `"3 reports"`.
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
