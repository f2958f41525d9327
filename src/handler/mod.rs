//! Request handler module
//!
//! Method validation, health probes and the platform redirect endpoint.

pub mod redirect;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
