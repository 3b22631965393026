//! Bulk action coordination for the report list.
//!
//! [`BulkActionCoordinator`] runs delete, export and status-change actions
//! over the selection held in a
//! [`ReportCollectionStore`](elecmate_core::collection::ReportCollectionStore),
//! talking to the remote store through the [`ReportStorage`] and
//! [`ExportService`] seams and announcing each settled action on the
//! [`EventBus`](elecmate_events::EventBus).

pub mod config;
pub mod coordinator;
pub mod error;
pub mod guard;
pub mod progress;
pub mod session;
pub mod storage;

pub use config::CoordinatorConfig;
pub use coordinator::BulkActionCoordinator;
pub use error::BulkError;
pub use session::Session;
pub use storage::{ExportReport, ExportService, ProgressFn, ReportStorage};
