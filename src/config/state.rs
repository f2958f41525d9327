// Application state module
// Shared, read-only runtime state handed to every connection

use super::types::Config;

/// Application state
pub struct AppState {
    pub config: Config,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub const fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}
