//! HTTP protocol layer module
//!
//! Response builders shared by the redirect endpoint and the health probes,
//! decoupled from the platform decision.

pub mod response;

// Re-export commonly used types
pub use response::{
    build_405_response, build_health_response, build_html_response, build_options_response,
    build_redirect_response,
};
