//! [`ReportStorage`] over the PostgREST API of the `reports` table.
//!
//! Rows are always scoped to the calling user and soft-deleted rows
//! (`deleted_at` set) are never listed.

use chrono::Utc;
use serde::Deserialize;

use elecmate_bulk::ReportStorage;
use elecmate_core::bulk::RemoteError;
use elecmate_core::report::{CollectionPage, ReportStatus, ReportSummary, ReportType};
use elecmate_core::types::{ReportId, Timestamp};

use crate::config::CloudConfig;
use crate::error::CloudError;

const REPORTS_TABLE: &str = "reports";

/// Columns fetched for the list view.
const SUMMARY_COLUMNS: &str =
    "report_id,report_type,status,client_name,installation_address,created_at,updated_at";

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

/// One row of the `reports` table as returned by the list query.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportRow {
    pub report_id: ReportId,
    pub report_type: String,
    pub status: String,
    pub client_name: Option<String>,
    pub installation_address: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ReportRow {
    /// Convert to a summary. Rows of an unknown report type are rejected;
    /// unknown statuses are kept as [`ReportStatus::Unknown`].
    pub fn into_summary(self) -> Result<ReportSummary, elecmate_core::error::CoreError> {
        Ok(ReportSummary {
            report_type: ReportType::from_str_value(&self.report_type)?,
            status: ReportStatus::from_db_value(&self.status),
            id: self.report_id,
            client_name: self.client_name,
            address: self.installation_address,
            updated_at: self.updated_at,
            created_at: self.created_at,
        })
    }
}

/// Total row count from a `Content-Range` header such as `0-19/57` or
/// `*/0`. Returns `None` when the total is unknown (`0-19/*`).
pub fn parse_content_range_total(header: &str) -> Option<u64> {
    header.rsplit_once('/')?.1.trim().parse().ok()
}

/// PostgREST `in` filter value: `in.("a","b")`.
pub fn in_filter(ids: &[ReportId]) -> String {
    let quoted: Vec<String> = ids
        .iter()
        .map(|id| format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect();
    format!("in.({})", quoted.join(","))
}

// ---------------------------------------------------------------------------
// RestReportStorage
// ---------------------------------------------------------------------------

/// Report store backed by the hosted REST API.
pub struct RestReportStorage {
    client: reqwest::Client,
    table_url: String,
    anon_key: String,
    bearer: String,
}

impl RestReportStorage {
    pub fn new(client: reqwest::Client, config: &CloudConfig) -> Self {
        Self {
            client,
            table_url: format!("{}/rest/v1/{REPORTS_TABLE}", config.base_url),
            anon_key: config.anon_key.clone(),
            bearer: config.bearer().to_string(),
        }
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        self.client
            .request(method, &self.table_url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.bearer)
    }

    async fn get_page(
        &self,
        user_id: &str,
        page_number: u32,
        page_size: u32,
    ) -> Result<CollectionPage, CloudError> {
        let offset = u64::from(page_number.saturating_sub(1)) * u64::from(page_size);
        let response = self
            .request(reqwest::Method::GET)
            .header("Prefer", "count=exact")
            .query(&[
                ("select", SUMMARY_COLUMNS.to_string()),
                ("user_id", format!("eq.{user_id}")),
                ("deleted_at", "is.null".to_string()),
                ("order", "updated_at.desc".to_string()),
                ("offset", offset.to_string()),
                ("limit", page_size.to_string()),
            ])
            .send()
            .await?;
        let response = check_status(response).await?;

        let total = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total);
        let rows: Vec<ReportRow> = response.json().await?;

        let fetched_rows = rows.len();
        let fetched = fetched_rows as u64;
        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.report_id.clone();
            match row.into_summary() {
                Ok(summary) => items.push(summary),
                Err(err) => tracing::warn!(report_id = %id, error = %err, "Skipping unreadable report row"),
            }
        }

        // Without a count, assume another page exists only if this one was full.
        let total = total.unwrap_or(offset + fetched + u64::from(fetched == u64::from(page_size)));

        tracing::debug!(user_id, page_number, fetched, total, "Fetched report page");
        Ok(CollectionPage::from_fetched(
            items,
            fetched_rows,
            total,
            page_number,
            page_size,
        ))
    }

    async fn patch_deleted(&self, report_id: &str, user_id: &str) -> Result<(), CloudError> {
        let response = self
            .request(reqwest::Method::PATCH)
            .header("Prefer", "return=representation")
            .query(&[
                ("report_id", format!("eq.{report_id}")),
                ("user_id", format!("eq.{user_id}")),
                ("select", "report_id".to_string()),
            ])
            .json(&serde_json::json!({ "deleted_at": Utc::now() }))
            .send()
            .await?;
        let response = check_status(response).await?;

        let touched: Vec<serde_json::Value> = response.json().await?;
        if touched.is_empty() {
            return Err(CloudError::Remote(
                RemoteError::new(format!("Report {report_id} not found")).with_code("not_found"),
            ));
        }
        Ok(())
    }

    async fn patch_status(
        &self,
        report_ids: &[ReportId],
        user_id: &str,
        status: ReportStatus,
    ) -> Result<(), CloudError> {
        if !status.is_assignable() {
            return Err(CloudError::Config(format!(
                "Status '{}' cannot be written",
                status.as_str()
            )));
        }
        let response = self
            .request(reqwest::Method::PATCH)
            .header("Prefer", "return=minimal")
            .query(&[
                ("report_id", in_filter(report_ids)),
                ("user_id", format!("eq.{user_id}")),
            ])
            .json(&serde_json::json!({
                "status": status.as_str(),
                "updated_at": Utc::now(),
            }))
            .send()
            .await?;
        check_status(response).await?;
        tracing::debug!(user_id, count = report_ids.len(), status = status.as_str(), "Updated report status");
        Ok(())
    }
}

impl ReportStorage for RestReportStorage {
    async fn fetch_page(
        &self,
        user_id: &str,
        page_number: u32,
        page_size: u32,
    ) -> Result<CollectionPage, RemoteError> {
        Ok(self.get_page(user_id, page_number, page_size).await?)
    }

    async fn soft_delete(&self, report_id: &str, user_id: &str) -> Result<(), RemoteError> {
        Ok(self.patch_deleted(report_id, user_id).await?)
    }

    async fn update_status(
        &self,
        report_ids: &[ReportId],
        user_id: &str,
        status: ReportStatus,
    ) -> Result<(), RemoteError> {
        Ok(self.patch_status(report_ids, user_id, status).await?)
    }
}

/// Pass 2xx responses through; turn anything else into a [`CloudError`].
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, CloudError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(CloudError::from_response_body(status.as_u16(), &body))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn row(report_type: &str, status: &str) -> ReportRow {
        serde_json::from_value(serde_json::json!({
            "report_id": "EICR-2024-001",
            "report_type": report_type,
            "status": status,
            "client_name": "Acme Ltd",
            "installation_address": null,
            "created_at": "2024-03-01T09:00:00Z",
            "updated_at": "2024-03-02T10:30:00+00:00",
        }))
        .unwrap()
    }

    fn config() -> CloudConfig {
        CloudConfig::from_lookup(|key| match key {
            "SUPABASE_URL" => Some("https://project.supabase.co".into()),
            "SUPABASE_ANON_KEY" => Some("anon".into()),
            _ => None,
        })
        .unwrap()
    }

    // -- Row mapping ----------------------------------------------------------

    #[test]
    fn row_maps_to_summary() {
        let summary = row("minor-works", "in-progress").into_summary().unwrap();
        assert_eq!(summary.id, "EICR-2024-001");
        assert_eq!(summary.report_type, ReportType::MinorWorks);
        assert_eq!(summary.status, ReportStatus::InProgress);
        assert_eq!(summary.client_name.as_deref(), Some("Acme Ltd"));
        assert!(summary.address.is_none());
        assert!(summary.updated_at > summary.created_at);
    }

    #[test]
    fn unknown_status_is_kept_unknown_type_is_rejected() {
        assert_eq!(
            row("eic", "archived").into_summary().unwrap().status,
            ReportStatus::Unknown
        );
        assert!(row("pat-testing", "draft").into_summary().is_err());
    }

    // -- Query helpers --------------------------------------------------------

    #[test]
    fn content_range_total() {
        assert_eq!(parse_content_range_total("0-19/57"), Some(57));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("0-19/*"), None);
        assert_eq!(parse_content_range_total("garbage"), None);
    }

    #[test]
    fn in_filter_quotes_each_id() {
        let ids = vec!["a-1".to_string(), "b,2".to_string(), "c\"3".to_string()];
        assert_eq!(in_filter(&ids), r#"in.("a-1","b,2","c\"3")"#);
    }

    #[test]
    fn table_url_is_built_from_base() {
        let storage = RestReportStorage::new(reqwest::Client::new(), &config());
        assert_eq!(storage.table_url, "https://project.supabase.co/rest/v1/reports");
        assert_eq!(storage.bearer, "anon");
    }
}
