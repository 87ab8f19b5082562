//! Scenario configuration.
//!
//! Defaults target an in-memory SQLite database so the reproduction runs
//! without any external service; every field can be overridden through
//! `SSCCE_*` environment variables (e.g. `SSCCE_DSN=postgres://...` to test
//! another backend, with the matching `db-*` cargo feature enabled).

use std::time::Duration;

use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::ReproError;

pub const DEFAULT_DSN: &str = "sqlite::memory:";

const ENV_PREFIX: &str = "SSCCE_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReproConfig {
    /// Database DSN the scenario runs against.
    pub dsn: String,

    /// Log every SQL statement the ORM issues (at sqlx's default level).
    pub log_queries: bool,

    /// Pool size for file- or server-backed databases. Ignored for
    /// in-memory SQLite, which is pinned to a single connection.
    pub max_connections: u32,

    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
}

impl Default for ReproConfig {
    fn default() -> Self {
        Self {
            dsn: DEFAULT_DSN.to_owned(),
            log_queries: true,
            max_connections: 5,
            connect_timeout: Duration::from_secs(5),
        }
    }
}

/// Loads the configuration: defaults merged with `SSCCE_*` env overrides.
pub fn load() -> Result<ReproConfig, ReproError> {
    let cfg = Figment::from(Serialized::defaults(ReproConfig::default()))
        .merge(Env::prefixed(ENV_PREFIX))
        .extract()?;
    Ok(cfg)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_in_memory_sqlite() {
        let cfg = ReproConfig::default();
        assert_eq!(cfg.dsn, DEFAULT_DSN);
        assert!(cfg.log_queries);
        assert_eq!(cfg.max_connections, 5);
        assert_eq!(cfg.connect_timeout, Duration::from_secs(5));
    }

    #[test]
    fn later_layers_override_defaults() {
        let cfg: ReproConfig = Figment::from(Serialized::defaults(ReproConfig::default()))
            .merge(Serialized::default("dsn", "sqlite://repro.db?mode=rwc"))
            .merge(Serialized::default("log_queries", false))
            .extract()
            .unwrap();

        assert_eq!(cfg.dsn, "sqlite://repro.db?mode=rwc");
        assert!(!cfg.log_queries);
        // untouched fields keep their defaults
        assert_eq!(cfg.max_connections, 5);
    }

    #[test]
    fn connect_timeout_round_trips_as_humantime() {
        let cfg: ReproConfig = Figment::from(Serialized::defaults(ReproConfig::default()))
            .merge(Serialized::default("connect_timeout", "30s"))
            .extract()
            .unwrap();

        assert_eq!(cfg.connect_timeout, Duration::from_secs(30));
    }
}
