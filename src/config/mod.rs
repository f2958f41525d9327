// Configuration module entry point
// Loads startup configuration and holds the shared application state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
pub use types::{Config, HealthConfig};

/// Default config file name (extension resolved by the `config` crate)
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Prefix of environment overrides, e.g. `REDIRECT_SERVER__PORT`
const ENV_PREFIX: &str = "REDIRECT";

/// Environment source: `REDIRECT_` prefix, `__` between nested keys
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// The file is optional; `REDIRECT_*` environment variables override it,
    /// e.g. `REDIRECT_SERVER__PORT=9000`.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_with_env(config_path, environment())
    }

    fn load_with_env(
        config_path: &str,
        env: config::Environment,
    ) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(env)
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "platform-redirect")?
            .set_default("http.enable_cors", false)?
            .build()?;

        settings.try_deserialize()
    }

    /// Defaults only, isolated from the process environment
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self::load_with_env(
            "does-not-exist/redirect-test-config",
            environment().source(Some(config::Map::new())),
        )
        .unwrap()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_vars(vars: &[(&str, &str)]) -> config::Environment {
        let map = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        environment().source(Some(map))
    }

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::for_tests();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 8080);
        assert!(cfg.server.workers.is_none());
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.logging.access_log);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert_eq!(cfg.performance.read_timeout, 30);
        assert!(cfg.performance.max_connections.is_none());
        assert_eq!(cfg.http.server_name, "platform-redirect");
        assert!(cfg.health.enabled);
        assert_eq!(cfg.health.liveness_path, "/healthz");
        assert_eq!(cfg.health.readiness_path, "/readyz");
    }

    #[test]
    fn test_env_overrides_nested_keys() {
        let env = with_vars(&[
            ("REDIRECT_SERVER__PORT", "9000"),
            ("REDIRECT_HTTP__SERVER_NAME", "edge"),
            ("REDIRECT_LOGGING__LEVEL", "warn"),
        ]);
        let cfg = Config::load_with_env("does-not-exist/redirect-test-config", env).unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.http.server_name, "edge");
        assert_eq!(cfg.logging.level, "warn");
    }

    #[test]
    fn test_env_double_underscore_prefix_ignored() {
        let env = with_vars(&[("REDIRECT__SERVER__PORT", "9100")]);
        let cfg = Config::load_with_env("does-not-exist/redirect-test-config", env).unwrap();
        assert_eq!(cfg.server.port, 8080);
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = Config::for_tests();
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "127.0.0.1:8080".parse::<SocketAddr>().unwrap()
        );

        cfg.server.host = "not a host".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }

    #[test]
    fn test_state_reads_access_log_flag() {
        let mut cfg = Config::for_tests();
        cfg.logging.access_log = false;
        let state = AppState::new(&cfg);
        assert!(!state.access_log_enabled());
    }
}
