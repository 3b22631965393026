//! Command handlers. Each one loads the collection, selects the requested
//! ids through the store and hands the store to the coordinator.

use anyhow::Context;
use tokio::sync::broadcast;

use elecmate_bulk::{BulkActionCoordinator, ExportService, ReportStorage, Session};
use elecmate_core::collection::ReportCollectionStore;
use elecmate_core::filter::FilterState;
use elecmate_core::report::{ReportStatus, ReportSummary};
use elecmate_core::sort::SortKey;
use elecmate_events::BulkActionNotice;

use crate::cli::Commands;

/// Shared context for command handlers.
pub struct Runner<'a, S, E> {
    pub coordinator: &'a BulkActionCoordinator<S, E>,
    pub notices: broadcast::Receiver<BulkActionNotice>,
    pub session: Option<&'a Session>,
    pub json: bool,
}

impl<S, E> Runner<'_, S, E>
where
    S: ReportStorage,
    E: ExportService,
{
    pub async fn run(&mut self, command: Commands) -> anyhow::Result<()> {
        match command {
            Commands::List {
                search,
                status,
                report_type,
                sort,
                pages,
            } => {
                let filter = FilterState::from_params(
                    Some(search.as_str()),
                    Some(status.as_str()),
                    Some(report_type.as_str()),
                )?;
                let sort = SortKey::from_str_value(&sort)?;
                self.list(filter, sort, pages).await
            }
            Commands::Delete { ids } => {
                let mut store = self.select(&ids).await?;
                let result = self.coordinator.bulk_delete(self.session, &mut store).await;
                self.print_notices()?;
                result?;
                Ok(())
            }
            Commands::Export { ids } => {
                let mut store = self.select(&ids).await?;
                let result = self
                    .coordinator
                    .bulk_export(self.session, &mut store, |p| {
                        eprintln!("  [{}/{}] {}", p.current, p.total, p.report_id);
                    })
                    .await;
                self.print_notices()?;
                result?;
                Ok(())
            }
            Commands::Status { status, ids } => {
                let status = ReportStatus::from_str_value(&status)?;
                let mut store = self.select(&ids).await?;
                let result = self
                    .coordinator
                    .bulk_change_status(self.session, &mut store, status)
                    .await;
                self.print_notices()?;
                result?;
                Ok(())
            }
        }
    }

    async fn list(&self, filter: FilterState, sort: SortKey, pages: u32) -> anyhow::Result<()> {
        let mut store = ReportCollectionStore::new();
        self.coordinator
            .load_first_page(self.session, &mut store)
            .await
            .context("loading reports")?;
        for _ in 1..pages.max(1) {
            if !self.coordinator.load_next_page(self.session, &mut store).await? {
                break;
            }
        }

        store.set_filter(filter);
        store.set_sort(sort);
        let visible = store.get_visible();
        for report in &visible {
            println!("{}", format_row(report));
        }

        let counts = store.status_counts();
        println!(
            "{} shown, {} loaded of {} ({} draft, {} in progress, {} completed)",
            visible.len(),
            store.len(),
            store.total_count(),
            counts.draft,
            counts.in_progress,
            counts.completed,
        );
        Ok(())
    }

    /// Load every page and select `ids`. Ids that are not loaded are skipped.
    async fn select(&self, ids: &[String]) -> anyhow::Result<ReportCollectionStore> {
        let mut store = ReportCollectionStore::new();
        if self.session.is_some() {
            self.coordinator
                .load_first_page(self.session, &mut store)
                .await
                .context("loading reports")?;
            while self.coordinator.load_next_page(self.session, &mut store).await? {}
        }

        store.enter_selection_mode();
        for id in ids {
            if !store.toggle_select(id) {
                tracing::warn!(report_id = %id, "Report not found, skipping");
            }
        }
        Ok(store)
    }

    fn print_notices(&mut self) -> anyhow::Result<()> {
        while let Ok(notice) = self.notices.try_recv() {
            if self.json {
                println!("{}", serde_json::to_string(&notice)?);
            } else {
                println!("{}", notice.message);
            }
        }
        Ok(())
    }
}

/// One tab-separated list line.
pub fn format_row(report: &ReportSummary) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}",
        report.id,
        report.report_type.as_str(),
        report.status.as_str(),
        report.client_name.as_deref().unwrap_or("-"),
        report.updated_at.format("%Y-%m-%d %H:%M"),
    )
}

#[cfg(test)]
mod tests {
    use elecmate_core::report::ReportType;

    use super::*;

    #[test]
    fn row_shows_dash_for_missing_client() {
        let ts = "2024-05-01T08:15:00Z".parse().unwrap();
        let report = ReportSummary {
            id: "EIC-7".to_string(),
            report_type: ReportType::Eic,
            status: ReportStatus::Completed,
            client_name: None,
            address: None,
            updated_at: ts,
            created_at: ts,
        };
        assert_eq!(
            format_row(&report),
            "EIC-7\teic\tcompleted\t-\t2024-05-01 08:15"
        );
    }
}
