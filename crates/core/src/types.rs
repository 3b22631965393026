/// Report identifiers are the certificate numbers shown in list views
/// (e.g. `EICR-2024-0012`). They are the selection key.
pub type ReportId = String;

/// Authenticated user identifier as issued by the auth provider.
pub type UserId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
