//! Sort keys and comparison rules for the report list.
//!
//! [`comparator`] maps a [`SortKey`] to a total order over
//! [`ReportSummary`]. Callers must use a stable sort so that ties keep their
//! accumulation order; [`sort_reports`] does that.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::report::ReportSummary;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const SORT_DATE_ASC: &str = "date-asc";
pub const SORT_DATE_DESC: &str = "date-desc";
pub const SORT_ID_ASC: &str = "id-asc";
pub const SORT_ID_DESC: &str = "id-desc";
pub const SORT_CLIENT_ASC: &str = "client-asc";
pub const SORT_CLIENT_DESC: &str = "client-desc";
pub const SORT_STATUS_ORDER: &str = "status-order";

/// All valid sort key strings.
pub const VALID_SORT_KEYS: &[&str] = &[
    SORT_DATE_ASC,
    SORT_DATE_DESC,
    SORT_ID_ASC,
    SORT_ID_DESC,
    SORT_CLIENT_ASC,
    SORT_CLIENT_DESC,
    SORT_STATUS_ORDER,
];

// ---------------------------------------------------------------------------
// SortKey
// ---------------------------------------------------------------------------

/// Closed set of list orderings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    DateAsc,
    #[default]
    DateDesc,
    IdAsc,
    IdDesc,
    ClientAsc,
    ClientDesc,
    StatusOrder,
}

impl SortKey {
    /// Convert from a request string value.
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            SORT_DATE_ASC => Ok(Self::DateAsc),
            SORT_DATE_DESC => Ok(Self::DateDesc),
            SORT_ID_ASC => Ok(Self::IdAsc),
            SORT_ID_DESC => Ok(Self::IdDesc),
            SORT_CLIENT_ASC => Ok(Self::ClientAsc),
            SORT_CLIENT_DESC => Ok(Self::ClientDesc),
            SORT_STATUS_ORDER => Ok(Self::StatusOrder),
            _ => Err(CoreError::Validation(format!(
                "Invalid sort key '{s}'. Must be one of: {}",
                VALID_SORT_KEYS.join(", ")
            ))),
        }
    }

    /// Convert to the request string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DateAsc => SORT_DATE_ASC,
            Self::DateDesc => SORT_DATE_DESC,
            Self::IdAsc => SORT_ID_ASC,
            Self::IdDesc => SORT_ID_DESC,
            Self::ClientAsc => SORT_CLIENT_ASC,
            Self::ClientDesc => SORT_CLIENT_DESC,
            Self::StatusOrder => SORT_STATUS_ORDER,
        }
    }
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

/// Comparison function produced by [`comparator`].
pub type Comparator = fn(&ReportSummary, &ReportSummary) -> Ordering;

/// Map a sort key to its comparison rule.
pub fn comparator(key: SortKey) -> Comparator {
    match key {
        SortKey::DateAsc => |a, b| a.updated_at.cmp(&b.updated_at),
        SortKey::DateDesc => |a, b| b.updated_at.cmp(&a.updated_at),
        SortKey::IdAsc => |a, b| locale_compare(&a.id, &b.id),
        SortKey::IdDesc => |a, b| locale_compare(&b.id, &a.id),
        SortKey::ClientAsc => |a, b| compare_client(a, b, false),
        SortKey::ClientDesc => |a, b| compare_client(a, b, true),
        SortKey::StatusOrder => |a, b| a.status.rank().cmp(&b.status.rank()),
    }
}

/// Stable sort of `reports` by `key`. Ties keep their prior relative order.
pub fn sort_reports<T>(reports: &mut [T], key: SortKey)
where
    T: AsRef<ReportSummary>,
{
    let cmp = comparator(key);
    reports.sort_by(|a, b| cmp(a.as_ref(), b.as_ref()));
}

/// Client-name ordering. Empty or missing names sort last in both
/// directions; only present names are reversed for descending order.
fn compare_client(a: &ReportSummary, b: &ReportSummary, descending: bool) -> Ordering {
    let name = |r: &ReportSummary| {
        r.client_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_owned)
    };
    match (name(a), name(b)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) if descending => locale_compare(&y, &x),
        (Some(x), Some(y)) => locale_compare(&x, &y),
    }
}

/// Locale-style string comparison.
///
/// Letters compare case-insensitively first. When two strings are equal
/// ignoring case, lowercase sorts before uppercase at the first differing
/// character, and raw byte order settles anything left.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    if folded != Ordering::Equal {
        return folded;
    }

    for (ca, cb) in a.chars().zip(b.chars()) {
        if ca != cb {
            return match (ca.is_lowercase(), cb.is_lowercase()) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => ca.cmp(&cb),
            };
        }
    }
    a.cmp(b)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
