//! Visible-subset filtering for the report list.
//!
//! A [`FilterState`] is a pure predicate over [`ReportSummary`]. All active
//! clauses must match. It never mutates the collection it is applied to.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::report::{ReportStatus, ReportSummary, ReportType};

/// Sentinel accepted in place of a status or type to disable that clause.
pub const FILTER_ALL: &str = "all";

/// Active list filters.
///
/// `None` for `status` or `report_type` means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub search_term: String,
    pub status: Option<ReportStatus>,
    pub report_type: Option<ReportType>,
}

impl FilterState {
    /// Build a filter from request-style parameters, where absent values and
    /// the literal `"all"` disable the clause.
    pub fn from_params(
        search_term: Option<&str>,
        status: Option<&str>,
        report_type: Option<&str>,
    ) -> Result<Self, CoreError> {
        let status = match status {
            None | Some(FILTER_ALL) => None,
            Some(s) => Some(ReportStatus::from_str_value(s)?),
        };
        let report_type = match report_type {
            None | Some(FILTER_ALL) => None,
            Some(t) => Some(ReportType::from_str_value(t)?),
        };
        Ok(Self {
            search_term: search_term.unwrap_or_default().to_string(),
            status,
            report_type,
        })
    }

    /// Returns `true` when no clause is active.
    pub fn is_empty(&self) -> bool {
        self.search_term.trim().is_empty() && self.status.is_none() && self.report_type.is_none()
    }

    /// Evaluate the predicate against one summary.
    pub fn matches(&self, report: &ReportSummary) -> bool {
        self.matches_search(report)
            && self.status.map_or(true, |s| report.status == s)
            && self.report_type.map_or(true, |t| report.report_type == t)
    }

    /// Case-insensitive substring match against id, client name and address.
    fn matches_search(&self, report: &ReportSummary) -> bool {
        let needle = self.search_term.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let contains = |field: &str| field.to_lowercase().contains(&needle);
        contains(&report.id)
            || report.client_name.as_deref().is_some_and(contains)
            || report.address.as_deref().is_some_and(contains)
    }
}
