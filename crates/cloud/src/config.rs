use std::time::Duration;

use elecmate_bulk::config::DEFAULT_REQUEST_TIMEOUT_SECS;
use elecmate_bulk::CoordinatorConfig;
use elecmate_core::report::{clamp_page_size, DEFAULT_PAGE_SIZE};

use crate::error::CloudError;

/// Default name of the PDF generation function.
pub const DEFAULT_EXPORT_FUNCTION: &str = "generate-report-pdf";

/// Default number of documents generated at once.
pub const DEFAULT_EXPORT_CONCURRENCY: usize = 3;

/// Hosted backend configuration loaded from environment variables.
#[derive(Clone)]
pub struct CloudConfig {
    /// Project base URL, without a trailing slash.
    pub base_url: String,
    /// Public API key sent as the `apikey` header.
    pub anon_key: String,
    /// Signed-in user's bearer token. Falls back to the anon key.
    pub access_token: Option<String>,
    pub page_size: u32,
    pub request_timeout: Duration,
    pub export_function: String,
    pub export_concurrency: usize,
}

impl CloudConfig {
    /// Load configuration from the process environment, reading `.env`
    /// first when present.
    ///
    /// | Env Var                 | Default               |
    /// |-------------------------|-----------------------|
    /// | `SUPABASE_URL`          | required              |
    /// | `SUPABASE_ANON_KEY`     | required              |
    /// | `SUPABASE_ACCESS_TOKEN` | none                  |
    /// | `REPORTS_PAGE_SIZE`     | `20`                  |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                  |
    /// | `EXPORT_FUNCTION`       | `generate-report-pdf` |
    /// | `EXPORT_CONCURRENCY`    | `3`                   |
    pub fn from_env() -> Result<Self, CloudError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CloudError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| CloudError::Config(format!("{key} must be set")))
        };

        let base_url = required("SUPABASE_URL")?.trim_end_matches('/').to_string();
        let anon_key = required("SUPABASE_ANON_KEY")?;
        let access_token = lookup("SUPABASE_ACCESS_TOKEN").filter(|v| !v.trim().is_empty());

        let page_size: u32 = parse_or(&lookup, "REPORTS_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        let request_timeout_secs: u64 =
            parse_or(&lookup, "REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;
        let export_concurrency: usize =
            parse_or(&lookup, "EXPORT_CONCURRENCY", DEFAULT_EXPORT_CONCURRENCY)?;

        let export_function =
            lookup("EXPORT_FUNCTION").unwrap_or_else(|| DEFAULT_EXPORT_FUNCTION.into());

        Ok(Self {
            base_url,
            anon_key,
            access_token,
            page_size: clamp_page_size(Some(page_size)),
            request_timeout: Duration::from_secs(request_timeout_secs.max(1)),
            export_function,
            export_concurrency: export_concurrency.max(1),
        })
    }

    /// Coordinator tuning derived from this configuration.
    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            page_size: self.page_size,
            request_timeout: self.request_timeout,
        }
    }

    /// Bearer token for requests: the session token, else the anon key.
    pub fn bearer(&self) -> &str {
        self.access_token.as_deref().unwrap_or(&self.anon_key)
    }
}

impl std::fmt::Debug for CloudConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudConfig")
            .field("base_url", &self.base_url)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("page_size", &self.page_size)
            .field("request_timeout", &self.request_timeout)
            .field("export_function", &self.export_function)
            .field("export_concurrency", &self.export_concurrency)
            .finish_non_exhaustive()
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, CloudError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| CloudError::Config(format!("{key} must be a valid number, got '{raw}'"))),
        None => Ok(default),
    }
}
