//! Logger module
//!
//! Provides logging utilities for the redirect server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Leveled error, warning and info logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use crate::platform::{DecisionLog, Severity};
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    let threshold = level_threshold(&config.logging.level);
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
        threshold.as_ref().map_or(Severity::Info, |level| *level),
    )?;

    if let Err(message) = threshold {
        log_warning(&message);
    }
    Ok(())
}

/// Resolve `logging.level`; unknown names fall back to info with a warning
fn level_threshold(level: &str) -> Result<Severity, String> {
    Severity::parse(level).ok_or_else(|| {
        format!("Unknown logging.level '{level}' (expected error, warn or info), using info")
    })
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

fn write_warn(message: &str) {
    match writer::get() {
        Some(w) => w.write_warn(message),
        None => eprintln!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

/// Write to access log specifically
fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

/// Forwards redirect decisions to the global writer
pub struct ServerLog;

impl DecisionLog for ServerLog {
    fn log(&self, severity: Severity, message: &str) {
        let line = format!("[{severity}] {message}");
        match severity {
            Severity::Info => write_info(&line),
            Severity::Warn => write_warn(&line),
            Severity::Error => write_error(&line),
        }
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("Platform redirect server started");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(max_conn) = config.performance.max_connections {
        write_info(&format!("Max connections: {max_conn}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    if config.health.enabled {
        write_info(&format!(
            "Health probes: {} {}",
            config.health.liveness_path, config.health.readiness_path
        ));
    }
    write_info("======================================\n");
}

pub fn log_info(message: &str) {
    write_info(&format!("[INFO] {message}"));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_info(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_warn(&format!("[WARN] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}

pub fn log_shutdown(reason: &str) {
    write_info(&format!("\n[Shutdown] {reason}, no longer accepting connections"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_threshold_known_names() {
        assert_eq!(level_threshold("warn"), Ok(Severity::Warn));
        assert_eq!(level_threshold(" ERROR "), Ok(Severity::Error));
        assert_eq!(level_threshold("info"), Ok(Severity::Info));
    }

    #[test]
    fn test_level_threshold_unknown_name_is_reported() {
        let message = level_threshold("loud").unwrap_err();
        assert!(message.contains("'loud'"));
        assert!(message.ends_with("using info"));
    }
}
