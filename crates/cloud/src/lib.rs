//! Hosted backend adapters for the bulk coordinator.
//!
//! [`RestReportStorage`] speaks to the `reports` table through the PostgREST
//! API and [`EdgeFunctionExporter`] calls the PDF generation function. Both
//! share one HTTP client built from [`CloudConfig`].

pub mod config;
pub mod error;
pub mod export;
pub mod rest;

pub use config::CloudConfig;
pub use error::CloudError;
pub use export::EdgeFunctionExporter;
pub use rest::RestReportStorage;

/// Build both adapters over a shared HTTP client.
pub fn connect(config: &CloudConfig) -> Result<(RestReportStorage, EdgeFunctionExporter), CloudError> {
    let client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()?;
    Ok((
        RestReportStorage::new(client.clone(), config),
        EdgeFunctionExporter::new(client, config),
    ))
}
