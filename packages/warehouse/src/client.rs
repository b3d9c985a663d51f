//! Statement API client.
//!
//! One POST per statement; the response carries column metadata plus
//! positional row data, decoded here into a [`Table`]. The API returns
//! every cell as a JSON scalar (usually a string), so [`Table`] keeps
//! [`serde_json::Value`] cells and leaves typing to the decoders in
//! [`crate::queries`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{WarehouseConfig, WarehouseError};

/// A typed bind variable for a statement.
///
/// Values always travel as bindings, never spliced into statement text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "UPPERCASE")]
pub enum Binding {
    /// A text value.
    Text(String),
}

/// A decoded result set: column names plus positional rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    /// Column names in result order.
    pub columns: Vec<String>,
    /// Row cells, positionally matching `columns`.
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl Table {
    /// The position of a named column, if present.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// The cell at (`row`, `column name`), if both exist.
    #[must_use]
    pub fn value(&self, row: usize, column: &str) -> Option<&serde_json::Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }
}

#[derive(Serialize)]
struct StatementRequest<'a> {
    statement: &'a str,
    warehouse: &'a str,
    database: &'a str,
    schema: &'a str,
    role: &'a str,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    bindings: BTreeMap<String, &'a Binding>,
}

#[derive(Deserialize)]
struct StatementResponse {
    #[serde(rename = "resultSetMetaData")]
    meta: ResultSetMetaData,
    #[serde(default)]
    data: Vec<Vec<serde_json::Value>>,
}

#[derive(Deserialize)]
struct ResultSetMetaData {
    #[serde(rename = "rowType")]
    row_type: Vec<ColumnMeta>,
}

#[derive(Deserialize)]
struct ColumnMeta {
    name: String,
}

#[derive(Deserialize)]
struct StatementErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Client for the warehouse statement API.
pub struct WarehouseClient {
    config: WarehouseConfig,
    http: reqwest::Client,
}

impl WarehouseClient {
    /// Connects to the warehouse and verifies the session with a
    /// `SELECT 1` round trip.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError::Unavailable`] if the API cannot be
    /// reached or rejects the credentials.
    pub async fn connect(config: WarehouseConfig) -> Result<Self, WarehouseError> {
        let http = reqwest::Client::builder().build()?;
        let client = Self { config, http };

        client.execute("SELECT 1", &[]).await?;
        log::info!("Warehouse session established for {}", client.config.user);

        Ok(client)
    }

    /// The configuration this client was built with.
    #[must_use]
    pub const fn config(&self) -> &WarehouseConfig {
        &self.config
    }

    /// Executes one statement and decodes the result set.
    ///
    /// Bindings are positional: the first element binds `?` number 1.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError::Unavailable`] on any transport, auth, or
    /// statement failure.
    pub async fn execute(
        &self,
        statement: &str,
        bindings: &[Binding],
    ) -> Result<Table, WarehouseError> {
        let request = StatementRequest {
            statement,
            warehouse: &self.config.warehouse,
            database: &self.config.database,
            schema: &self.config.schema,
            role: &self.config.role,
            bindings: bindings
                .iter()
                .enumerate()
                .map(|(i, b)| ((i + 1).to_string(), b))
                .collect(),
        };

        log::debug!("Executing statement: {statement}");

        let response = self
            .http
            .post(self.config.statement_url())
            .bearer_auth(&self.config.token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<StatementErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| format!("statement API returned {status}"));
            return Err(WarehouseError::Unavailable { message });
        }

        let body: StatementResponse =
            response
                .json()
                .await
                .map_err(|e| WarehouseError::Unavailable {
                    message: format!("malformed statement response: {e}"),
                })?;

        let columns: Vec<String> = body.meta.row_type.into_iter().map(|c| c.name).collect();

        log::debug!(
            "Statement returned {} rows x {} columns",
            body.data.len(),
            columns.len()
        );

        Ok(Table {
            columns,
            rows: body.data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bindings_serialize_as_typed_values() {
        let binding = Binding::Text("중구".to_string());
        let json = serde_json::to_value(&binding).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "TEXT", "value": "중구" }));
    }

    #[test]
    fn table_lookups() {
        let table = Table {
            columns: vec!["REGION_NAME".to_string(), "FINAL_SCORE".to_string()],
            rows: vec![vec![
                serde_json::json!("중구"),
                serde_json::json!("0.512"),
            ]],
        };

        assert_eq!(table.column_index("FINAL_SCORE"), Some(1));
        assert_eq!(table.column_index("MISSING"), None);
        assert_eq!(
            table.value(0, "REGION_NAME"),
            Some(&serde_json::json!("중구"))
        );
        assert_eq!(table.value(1, "REGION_NAME"), None);
        assert_eq!(table.value(0, "MISSING"), None);
    }

    #[test]
    fn statement_response_decodes() {
        let raw = serde_json::json!({
            "resultSetMetaData": {
                "rowType": [
                    { "name": "REGION_NAME", "type": "text" },
                    { "name": "FINAL_SCORE", "type": "real" }
                ]
            },
            "data": [["중구", "0.512"], ["서초구", "0.701"]]
        });

        let response: StatementResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(response.meta.row_type.len(), 2);
        assert_eq!(response.meta.row_type[0].name, "REGION_NAME");
        assert_eq!(response.data.len(), 2);
    }
}
