//! Configuration management.

use serde::Deserialize;
use std::path::Path;

use crate::{Error, Result};

/// Main configuration for eventsift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventsiftConfig {
    /// Safety cap applied when a query names no limit, offset, or `select *`.
    pub default_query_limit: usize,
    /// Cap on distinct `event_name` values in catalogs.
    pub catalog_event_name_cap: usize,
    /// Maximum query-cache entries.
    pub cache_max_entries: usize,
    /// Query-cache entry time-to-live, in seconds.
    pub cache_ttl_secs: u64,
    /// Session store entry time-to-live, in seconds. `None` keeps sessions
    /// until explicitly removed.
    pub session_ttl_secs: Option<u64>,
}

impl Default for EventsiftConfig {
    fn default() -> Self {
        Self {
            default_query_limit: 100,
            catalog_event_name_cap: 50,
            cache_max_entries: 100,
            cache_ttl_secs: 300,
            session_ttl_secs: Some(3600),
        }
    }
}

impl EventsiftConfig {
    /// Loads configuration from a TOML file, filling gaps with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read config".to_string(),
            cause: e.to_string(),
        })?;
        let file: ConfigFile = toml::from_str(&text)
            .map_err(|e| Error::InvalidInput(format!("invalid config file: {e}")))?;
        Ok(Self::from_file(file))
    }

    /// Merges a parsed config file over the defaults.
    fn from_file(file: ConfigFile) -> Self {
        let defaults = Self::default();
        Self {
            default_query_limit: file.default_query_limit.unwrap_or(defaults.default_query_limit),
            catalog_event_name_cap: file
                .catalog_event_name_cap
                .unwrap_or(defaults.catalog_event_name_cap),
            cache_max_entries: file
                .cache
                .as_ref()
                .and_then(|c| c.max_entries)
                .unwrap_or(defaults.cache_max_entries),
            cache_ttl_secs: file
                .cache
                .as_ref()
                .and_then(|c| c.ttl_secs)
                .unwrap_or(defaults.cache_ttl_secs),
            session_ttl_secs: file
                .session
                .and_then(|s| s.ttl_secs)
                .map_or(defaults.session_ttl_secs, Some),
        }
    }
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    /// Default query limit.
    default_query_limit: Option<usize>,
    /// Catalog event-name cap.
    catalog_event_name_cap: Option<usize>,
    /// Query cache section.
    cache: Option<ConfigFileCache>,
    /// Session store section.
    session: Option<ConfigFileSession>,
}

/// Cache section in config file.
#[derive(Debug, Deserialize, Default)]
struct ConfigFileCache {
    /// Maximum entries.
    max_entries: Option<usize>,
    /// Entry TTL in seconds.
    ttl_secs: Option<u64>,
}

/// Session section in config file.
#[derive(Debug, Deserialize, Default)]
struct ConfigFileSession {
    /// Entry TTL in seconds.
    ttl_secs: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EventsiftConfig::default();
        assert_eq!(config.default_query_limit, 100);
        assert_eq!(config.catalog_event_name_cap, 50);
        assert_eq!(config.cache_max_entries, 100);
        assert_eq!(config.cache_ttl_secs, 300);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "default_query_limit = 25\n\n[cache]\nttl_secs = 60"
        )
        .unwrap();
        let config = EventsiftConfig::load(file.path()).unwrap();
        assert_eq!(config.default_query_limit, 25);
        assert_eq!(config.cache_ttl_secs, 60);
        // Everything else keeps defaults.
        assert_eq!(config.catalog_event_name_cap, 50);
        assert_eq!(config.cache_max_entries, 100);
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_query_limit = \"not a number\"").unwrap();
        let err = EventsiftConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("invalid config file"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = EventsiftConfig::load(Path::new("/nonexistent/eventsift.toml")).unwrap_err();
        assert!(err.to_string().contains("read config"));
    }
}
