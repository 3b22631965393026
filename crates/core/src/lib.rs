//! Domain types and pure logic for the report list.
//!
//! No I/O and no async: everything here is evaluated against data passed in
//! by the caller, so it can be unit tested without a store or network.

pub mod bulk;
pub mod collection;
pub mod error;
pub mod filter;
pub mod report;
pub mod sort;
pub mod types;
