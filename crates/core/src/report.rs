//! Report summary data model.
//!
//! A [`ReportSummary`] is the lightweight list-view record for one inspection
//! certificate. Pages of summaries arrive from the remote report store as
//! [`CollectionPage`]s and accumulate in the collection store.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{ReportId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Report type strings (stored in the `report_type` column).
pub const TYPE_EICR: &str = "eicr";
pub const TYPE_EIC: &str = "eic";
pub const TYPE_MINOR_WORKS: &str = "minor-works";

/// All valid report type strings.
pub const VALID_REPORT_TYPES: &[&str] = &[TYPE_EICR, TYPE_EIC, TYPE_MINOR_WORKS];

/// Report status strings (stored in the `status` column).
pub const STATUS_DRAFT: &str = "draft";
pub const STATUS_IN_PROGRESS: &str = "in-progress";
pub const STATUS_COMPLETED: &str = "completed";

/// All status strings a report may be moved to.
pub const VALID_STATUSES: &[&str] = &[STATUS_DRAFT, STATUS_IN_PROGRESS, STATUS_COMPLETED];

/// First page number. Fetching this page replaces the collection.
pub const FIRST_PAGE: u32 = 1;

/// Default number of summaries per fetched page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Upper bound for a caller-supplied page size.
pub const MAX_PAGE_SIZE: u32 = 100;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Certificate kinds produced by the inspection tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportType {
    #[serde(rename = "eicr")]
    Eicr,
    #[serde(rename = "eic")]
    Eic,
    #[serde(rename = "minor-works")]
    MinorWorks,
}

impl ReportType {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            TYPE_EICR => Ok(Self::Eicr),
            TYPE_EIC => Ok(Self::Eic),
            TYPE_MINOR_WORKS => Ok(Self::MinorWorks),
            _ => Err(CoreError::Validation(format!(
                "Invalid report type '{s}'. Must be one of: {}",
                VALID_REPORT_TYPES.join(", ")
            ))),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eicr => TYPE_EICR,
            Self::Eic => TYPE_EIC,
            Self::MinorWorks => TYPE_MINOR_WORKS,
        }
    }
}

/// Lifecycle status of a report.
///
/// `Unknown` absorbs any status string the store returns that this client
/// does not recognise. It sorts last and can never be a target status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportStatus {
    #[serde(rename = "draft")]
    Draft,
    #[serde(rename = "in-progress")]
    InProgress,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "unknown", other)]
    Unknown,
}

impl ReportStatus {
    /// Parse a target status. Only the three known statuses are accepted.
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            STATUS_DRAFT => Ok(Self::Draft),
            STATUS_IN_PROGRESS => Ok(Self::InProgress),
            STATUS_COMPLETED => Ok(Self::Completed),
            _ => Err(CoreError::Validation(format!(
                "Invalid status '{s}'. Must be one of: {}",
                VALID_STATUSES.join(", ")
            ))),
        }
    }

    /// Lenient conversion used when reading rows: unrecognised values map
    /// to [`ReportStatus::Unknown`].
    pub fn from_db_value(s: &str) -> Self {
        Self::from_str_value(s).unwrap_or(Self::Unknown)
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => STATUS_DRAFT,
            Self::InProgress => STATUS_IN_PROGRESS,
            Self::Completed => STATUS_COMPLETED,
            Self::Unknown => "unknown",
        }
    }

    /// Fixed rank used by the `status-order` sort. Unknown ranks last.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Draft => 0,
            Self::InProgress => 1,
            Self::Completed => 2,
            Self::Unknown => 3,
        }
    }

    /// Whether a bulk status change may move reports to this status.
    pub fn is_assignable(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// List-view metadata for one inspection report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub id: ReportId,
    #[serde(rename = "type")]
    pub report_type: ReportType,
    pub status: ReportStatus,
    pub client_name: Option<String>,
    pub address: Option<String>,
    pub updated_at: Timestamp,
    pub created_at: Timestamp,
}

impl AsRef<ReportSummary> for ReportSummary {
    fn as_ref(&self) -> &ReportSummary {
        self
    }
}

/// One fetched page of report summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionPage {
    pub items: Vec<ReportSummary>,
    pub total_count: u64,
    pub has_more: bool,
    pub page_number: u32,
}

impl CollectionPage {
    /// Build a page and derive `has_more` from the running total.
    ///
    /// `page_size` is the requested size; the page is the last one when the
    /// items seen so far (including this page) reach `total_count`.
    pub fn new(items: Vec<ReportSummary>, total_count: u64, page_number: u32, page_size: u32) -> Self {
        let fetched = items.len();
        Self::from_fetched(items, fetched, total_count, page_number, page_size)
    }

    /// Like [`new`](Self::new), for pages where some fetched rows were
    /// dropped while mapping. `fetched_rows` counts every row the store
    /// returned, so skipped rows still advance the running total.
    pub fn from_fetched(
        items: Vec<ReportSummary>,
        fetched_rows: usize,
        total_count: u64,
        page_number: u32,
        page_size: u32,
    ) -> Self {
        let seen = u64::from(page_number.saturating_sub(1)) * u64::from(page_size)
            + fetched_rows.max(items.len()) as u64;
        Self {
            has_more: seen < total_count,
            items,
            total_count,
            page_number,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation functions
// ---------------------------------------------------------------------------

/// Clamp a requested page size into `1..=MAX_PAGE_SIZE`, falling back to the
/// default when absent.
pub fn clamp_page_size(requested: Option<u32>) -> u32 {
    requested
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE)
}

/// Validate that a page number is 1-based.
pub fn validate_page_number(page_number: u32) -> Result<(), CoreError> {
    if page_number < FIRST_PAGE {
        return Err(CoreError::Validation(format!(
            "Page number must be at least {FIRST_PAGE}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
