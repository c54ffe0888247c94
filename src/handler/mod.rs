//! Request handler module
//!
//! Responsible for request routing dispatch and the relay endpoints:
//! status, create/update, and fetch.

pub mod fetch;
pub mod router;
pub mod stats;
pub mod update;

// Re-export main entry point
pub use router::handle_request;
