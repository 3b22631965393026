//! Notification bus for settled bulk actions.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`BulkActionNotice`]: the single summary notification emitted when a
//!   bulk action settles.

pub mod bus;

pub use bus::{BulkActionNotice, EventBus};
