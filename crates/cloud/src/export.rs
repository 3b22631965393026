//! [`ExportService`] backed by the hosted PDF generation function.

use futures::stream::{self, Stream, StreamExt};
use serde::Serialize;

use elecmate_bulk::{ExportReport, ExportService, ProgressFn};
use elecmate_core::bulk::{ExportDelivery, ExportProgress, RemoteError};
use elecmate_core::types::ReportId;

use crate::config::CloudConfig;
use crate::error::CloudError;
use crate::rest::check_status;

/// Request body for one document.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    report_id: &'a str,
    user_id: &'a str,
    delivery: ExportDelivery,
}

/// Calls the generation function once per report, a few at a time.
pub struct EdgeFunctionExporter {
    client: reqwest::Client,
    function_url: String,
    anon_key: String,
    bearer: String,
    concurrency: usize,
}

impl EdgeFunctionExporter {
    pub fn new(client: reqwest::Client, config: &CloudConfig) -> Self {
        Self {
            client,
            function_url: format!("{}/functions/v1/{}", config.base_url, config.export_function),
            anon_key: config.anon_key.clone(),
            bearer: config.bearer().to_string(),
            concurrency: config.export_concurrency.max(1),
        }
    }

    async fn generate_one(
        &self,
        report_id: &str,
        user_id: &str,
        delivery: ExportDelivery,
    ) -> Result<(), CloudError> {
        let response = self
            .client
            .post(&self.function_url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.bearer)
            .json(&GenerateRequest {
                report_id,
                user_id,
                delivery,
            })
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

impl ExportService for EdgeFunctionExporter {
    async fn generate_bulk_export(
        &self,
        report_ids: &[ReportId],
        user_id: &str,
        delivery: ExportDelivery,
        on_progress: ProgressFn<'_>,
    ) -> Result<ExportReport, RemoteError> {
        let pending = stream::iter(report_ids.iter().cloned())
            .map(|id: ReportId| async move {
                let result = self.generate_one(&id, user_id, delivery).await;
                (id, result)
            })
            .buffer_unordered(self.concurrency);

        Ok(collect_results(pending, report_ids.len(), on_progress).await)
    }
}

/// Tally per-document results in completion order, reporting progress after
/// each one.
pub async fn collect_results<S>(
    results: S,
    total: usize,
    on_progress: ProgressFn<'_>,
) -> ExportReport
where
    S: Stream<Item = (ReportId, Result<(), CloudError>)>,
{
    let mut results = std::pin::pin!(results);
    let mut report = ExportReport::default();
    while let Some((id, result)) = results.next().await {
        match result {
            Ok(()) => report.successful += 1,
            Err(err) => {
                let remote = RemoteError::from(err);
                tracing::warn!(report_id = %id, error = %remote, "PDF generation failed");
                report.failed += 1;
                report
                    .errors
                    .push(format!("{id}: {}", remote.representative_message()));
            }
        }
        on_progress(ExportProgress {
            current: report.successful + report.failed,
            total,
            report_id: id,
        });
    }
    report
}
