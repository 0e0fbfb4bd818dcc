use std::{env, fmt, str::FromStr};

use thiserror::Error;

/// Errors raised while loading configuration. All of them are fatal at boot.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Which record variant the service stores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnitModel {
    /// Attribute bags validated against a named JSON schema.
    #[default]
    Dynamic,
    /// The statically typed commercial vehicle record.
    Fixed,
}

impl FromStr for UnitModel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dynamic" => Ok(Self::Dynamic),
            "fixed" => Ok(Self::Fixed),
            _ => Err(()),
        }
    }
}

impl fmt::Display for UnitModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dynamic => f.write_str("dynamic"),
            Self::Fixed => f.write_str("fixed"),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(()),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// DynamoDB table holding the units (required)
    pub table_name: String,
    /// AWS region for the SDK client (default: "us-east-1")
    pub aws_region: String,
    /// Default tracing level when `RUST_LOG` is unset (default: "info")
    pub log_level: String,
    /// Log output format (default: text)
    pub log_format: LogFormat,
    /// Record variant served by this deployment (default: dynamic)
    pub unit_model: UnitModel,
    /// Global index keyed by `id` (default: "id-index")
    pub id_index_name: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `TABLE_NAME` - DynamoDB table name (required)
    /// - `AWS_REGION` - AWS region (default: "us-east-1")
    /// - `LOG_LEVEL` - default log level (default: "info")
    /// - `LOG_FORMAT` - `text` or `json` (default: "text")
    /// - `UNIT_MODEL` - `dynamic` or `fixed` (default: "dynamic")
    /// - `ID_INDEX_NAME` - name of the id index (default: "id-index")
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let table_name = var("TABLE_NAME").ok_or(ConfigError::Missing("TABLE_NAME"))?;

        Ok(Self {
            table_name,
            aws_region: var("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            log_level: var("LOG_LEVEL")
                .map(|v| v.to_ascii_lowercase())
                .unwrap_or_else(|| "info".to_string()),
            log_format: parse_or_default(var("LOG_FORMAT"), "LOG_FORMAT")?,
            unit_model: parse_or_default(var("UNIT_MODEL"), "UNIT_MODEL")?,
            id_index_name: var("ID_INDEX_NAME").unwrap_or_else(|| "id-index".to_string()),
        })
    }
}

fn parse_or_default<T: FromStr + Default>(
    value: Option<String>,
    name: &'static str,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(T::default()),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = load(&[("TABLE_NAME", "units")]).unwrap();

        assert_eq!(config.table_name, "units");
        assert_eq!(config.aws_region, "us-east-1");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.unit_model, UnitModel::Dynamic);
        assert_eq!(config.id_index_name, "id-index");
    }

    #[test]
    fn test_table_name_is_required() {
        assert_eq!(load(&[]), Err(ConfigError::Missing("TABLE_NAME")));
        assert_eq!(
            load(&[("TABLE_NAME", "  ")]),
            Err(ConfigError::Missing("TABLE_NAME"))
        );
        assert_eq!(
            ConfigError::Missing("TABLE_NAME").to_string(),
            "TABLE_NAME environment variable is required"
        );
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("TABLE_NAME", "units-prod"),
            ("AWS_REGION", "eu-west-1"),
            ("LOG_LEVEL", "DEBUG"),
            ("LOG_FORMAT", "json"),
            ("UNIT_MODEL", "Fixed"),
            ("ID_INDEX_NAME", "gsi-id"),
        ])
        .unwrap();

        assert_eq!(config.aws_region, "eu-west-1");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.unit_model, UnitModel::Fixed);
        assert_eq!(config.id_index_name, "gsi-id");
    }

    #[test]
    fn test_invalid_unit_model() {
        assert_eq!(
            load(&[("TABLE_NAME", "units"), ("UNIT_MODEL", "hybrid")]),
            Err(ConfigError::Invalid {
                name: "UNIT_MODEL",
                value: "hybrid".to_string()
            })
        );
    }
}
