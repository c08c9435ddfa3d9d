//! Table mapper configuration

use crate::error::{MapperError, Result};
use serde::{Deserialize, Serialize};

/// Default SQLite table holding AUTOINCREMENT counters
pub const DEFAULT_SEQUENCE_TABLE: &str = "sqlite_sequence";

fn default_sequence_table() -> String {
    DEFAULT_SEQUENCE_TABLE.to_string()
}

fn default_log_statements() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapperConfig {
    /// Table queried to recover generated keys on embedded-file backends
    #[serde(default = "default_sequence_table")]
    pub sequence_table: String,

    /// Emit each statement at debug level
    #[serde(default = "default_log_statements")]
    pub log_statements: bool,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            sequence_table: default_sequence_table(),
            log_statements: default_log_statements(),
        }
    }
}

impl MapperConfig {
    pub fn with_sequence_table(mut self, table: impl Into<String>) -> Self {
        self.sequence_table = table.into();
        self
    }

    pub fn with_log_statements(mut self, enabled: bool) -> Self {
        self.log_statements = enabled;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let valid = !self.sequence_table.is_empty()
            && self
                .sequence_table
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
        if !valid {
            return Err(MapperError::InvalidConfiguration(format!(
                "sequence_table '{}' is not a plain table name",
                self.sequence_table
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = MapperConfig::default();
        assert_eq!(config.sequence_table, "sqlite_sequence");
        assert!(config.log_statements);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serde_defaults() {
        let config: MapperConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, MapperConfig::default());

        let config: MapperConfig = serde_json::from_str(r#"{"log_statements": false}"#).unwrap();
        assert!(!config.log_statements);
        assert_eq!(config.sequence_table, "sqlite_sequence");
    }

    #[test]
    fn test_config_rejects_injected_table() {
        let config = MapperConfig::default().with_sequence_table("seq; DROP TABLE x");
        assert!(matches!(
            config.validate(),
            Err(MapperError::InvalidConfiguration(_))
        ));

        let config = MapperConfig::default().with_sequence_table("");
        assert!(config.validate().is_err());
    }
}
