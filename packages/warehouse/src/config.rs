//! Warehouse connection configuration.
//!
//! Credentials live in a TOML file outside the repository (the deployment
//! mounts it as a secret). The file path comes from `GENTRIMAP_CONFIG`
//! (default `config.toml`); `GENTRIMAP_WAREHOUSE_TOKEN` overrides the
//! token so CI never writes it to disk.

use serde::Deserialize;

use crate::WarehouseError;

/// Environment variable naming the config file path.
pub const CONFIG_PATH_ENV: &str = "GENTRIMAP_CONFIG";

/// Environment variable overriding the access token.
pub const TOKEN_ENV: &str = "GENTRIMAP_WAREHOUSE_TOKEN";

/// Default config file path relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Connection settings for the warehouse statement API.
#[derive(Debug, Clone, Deserialize)]
pub struct WarehouseConfig {
    /// Account identifier (forms the API hostname).
    pub account: String,
    /// User the statements run as.
    pub user: String,
    /// Bearer token for the statement API.
    pub token: String,
    /// Virtual warehouse to execute on.
    pub warehouse: String,
    /// Database holding the result tables.
    pub database: String,
    /// Schema holding the result tables.
    pub schema: String,
    /// Role to assume.
    pub role: String,
    /// Full endpoint override (tests point this at a local mock server).
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl WarehouseConfig {
    /// Loads the configuration from the file named by `GENTRIMAP_CONFIG`
    /// (default `config.toml`), applying the token env override.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError::Config`] if the file cannot be read or
    /// parsed.
    pub fn from_env() -> Result<Self, WarehouseError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let contents = std::fs::read_to_string(&path).map_err(|e| WarehouseError::Config {
            message: format!("failed to read {path}: {e}"),
        })?;

        let mut config = Self::from_toml_str(&contents)?;

        if let Ok(token) = std::env::var(TOKEN_ENV) {
            config.token = token;
        }

        Ok(config)
    }

    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError::Config`] if the TOML is malformed or a
    /// required field is missing.
    pub fn from_toml_str(contents: &str) -> Result<Self, WarehouseError> {
        toml::de::from_str(contents).map_err(|e| WarehouseError::Config {
            message: e.to_string(),
        })
    }

    /// The statement API URL for this configuration.
    #[must_use]
    pub fn statement_url(&self) -> String {
        self.endpoint.as_ref().map_or_else(
            || {
                format!(
                    "https://{}.snowflakecomputing.com/api/v2/statements",
                    self.account
                )
            },
            |endpoint| format!("{}/api/v2/statements", endpoint.trim_end_matches('/')),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
account = "xy12345.ap-northeast-2"
user = "DASHBOARD"
token = "secret"
warehouse = "ANALYTICS_WH"
database = "RESULT_DB"
schema = "RESULT"
role = "DASHBOARD_READER"
"#;

    #[test]
    fn parses_sample_config() {
        let config = WarehouseConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.account, "xy12345.ap-northeast-2");
        assert_eq!(config.database, "RESULT_DB");
        assert_eq!(config.endpoint, None);
        assert_eq!(
            config.statement_url(),
            "https://xy12345.ap-northeast-2.snowflakecomputing.com/api/v2/statements"
        );
    }

    #[test]
    fn endpoint_override_wins() {
        let mut config = WarehouseConfig::from_toml_str(SAMPLE).unwrap();
        config.endpoint = Some("http://localhost:9000/".to_string());
        assert_eq!(
            config.statement_url(),
            "http://localhost:9000/api/v2/statements"
        );
    }

    #[test]
    fn missing_field_is_a_config_error() {
        let err = WarehouseConfig::from_toml_str("account = \"only\"").unwrap_err();
        assert!(matches!(err, WarehouseError::Config { .. }));
    }
}
