//! Warehouse-hosted completion provider.
//!
//! The warehouse exposes a SQL completion function, so the report call
//! rides the same statement API as the data queries, with no separate
//! service credentials. The prompt travels as a bind variable; it is
//! never spliced into the statement text.

use std::sync::Arc;

use gentrimap_warehouse::{Binding, WarehouseClient};

use super::LlmProvider;
use crate::AiError;

/// Provider backed by `SNOWFLAKE.CORTEX.COMPLETE`.
pub struct CortexProvider {
    client: Arc<WarehouseClient>,
    model: String,
}

impl CortexProvider {
    /// Creates a new warehouse-backed provider.
    #[must_use]
    pub fn new(client: Arc<WarehouseClient>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait::async_trait]
impl LlmProvider for CortexProvider {
    async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        let table = self
            .client
            .execute(
                "SELECT SNOWFLAKE.CORTEX.COMPLETE(?, ?) AS SUMMARY",
                &[
                    Binding::Text(self.model.clone()),
                    Binding::Text(prompt.to_string()),
                ],
            )
            .await?;

        table
            .value(0, "SUMMARY")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| AiError::Provider {
                message: "Completion returned no text".to_string(),
            })
    }

    fn name(&self) -> &'static str {
        "cortex"
    }
}
