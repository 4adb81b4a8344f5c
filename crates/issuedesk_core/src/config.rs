//! Runtime configuration resolved from the process environment.
//!
//! # Invariants
//! - Blank variables fall back to defaults, never to empty paths.
//! - Resolution never fails; `init_logging` validates the level later.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "ISSUEDESK_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "ISSUEDESK_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "ISSUEDESK_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "issuedesk.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "issuedesk-logs";

/// Effective core settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl CoreConfig {
    /// Resolves settings from `ISSUEDESK_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through `lookup`, which maps a variable name to
    /// its raw value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: read(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            log_level: read(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(LOG_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME)),
        }
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, DB_PATH_ENV, LOG_LEVEL_ENV};
    use crate::logging::default_log_level;
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[test]
    fn defaults_live_in_temp_dir() {
        let config = CoreConfig::default();
        assert_eq!(
            config.db_path,
            std::env::temp_dir().join("issuedesk.sqlite3")
        );
        assert_eq!(config.log_level, default_log_level());
        assert!(config.log_dir.starts_with(std::env::temp_dir()));
    }

    #[test]
    fn explicit_values_are_trimmed_and_blank_ones_ignored() {
        let vars = HashMap::from([
            (DB_PATH_ENV, "  /var/lib/issuedesk/db.sqlite3 ".to_string()),
            (LOG_LEVEL_ENV, "   ".to_string()),
        ]);
        let config = CoreConfig::from_lookup(|key| vars.get(key).cloned());
        assert_eq!(
            config.db_path,
            PathBuf::from("/var/lib/issuedesk/db.sqlite3")
        );
        assert_eq!(config.log_level, default_log_level());
    }
}
