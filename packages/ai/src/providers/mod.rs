//! LLM provider abstraction and implementations.
//!
//! Supports the warehouse's hosted completion function, Anthropic Claude,
//! and `OpenAI` via a common trait. Every provider takes one prompt and
//! returns one text block; a failure is terminal for that interaction.

pub mod anthropic;
pub mod cortex;
pub mod openai;

use std::sync::Arc;

use gentrimap_warehouse::WarehouseClient;

use crate::AiError;

/// Trait for text-completion providers.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Sends a single completion request.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] if the request fails or the response carries
    /// no usable text.
    async fn complete(&self, prompt: &str) -> Result<String, AiError>;

    /// A short provider name for logging.
    fn name(&self) -> &'static str;
}

/// Creates an LLM provider based on environment variables.
///
/// If `AI_PROVIDER` is explicitly set, uses that provider. Otherwise
/// auto-detects from available credentials:
///
/// 1. `ANTHROPIC_API_KEY` set -> Anthropic Claude
/// 2. `OPENAI_API_KEY` set -> `OpenAI`
/// 3. A warehouse client is available -> the warehouse completion
///    function (no extra credentials needed)
///
/// `AI_MODEL` overrides each provider's default model.
///
/// # Errors
///
/// Returns [`AiError::Config`] if no provider can be configured or the
/// explicitly requested one is missing its credentials.
pub fn create_provider_from_env(
    warehouse: Option<Arc<WarehouseClient>>,
) -> Result<Box<dyn LlmProvider>, AiError> {
    let provider = std::env::var("AI_PROVIDER").unwrap_or_else(|_| detect_provider(&warehouse));

    match provider.to_lowercase().as_str() {
        "anthropic" | "claude" => {
            let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| AiError::Config {
                message: "ANTHROPIC_API_KEY environment variable not set".to_string(),
            })?;
            let model = std::env::var("AI_MODEL")
                .unwrap_or_else(|_| "claude-sonnet-4-20250514".to_string());
            Ok(Box::new(anthropic::AnthropicProvider::new(api_key, model)))
        }
        "openai" | "gpt" => {
            let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| AiError::Config {
                message: "OPENAI_API_KEY environment variable not set".to_string(),
            })?;
            let model = std::env::var("AI_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());
            Ok(Box::new(openai::OpenAiProvider::new(api_key, model)))
        }
        "cortex" | "warehouse" => {
            let client = warehouse.ok_or_else(|| AiError::Config {
                message: "Warehouse completion requested but no warehouse client is connected"
                    .to_string(),
            })?;
            let model =
                std::env::var("AI_MODEL").unwrap_or_else(|_| "claude-3-5-sonnet".to_string());
            Ok(Box::new(cortex::CortexProvider::new(client, model)))
        }
        other => Err(AiError::Config {
            message: format!("Unknown AI_PROVIDER: {other}"),
        }),
    }
}

fn detect_provider(warehouse: &Option<Arc<WarehouseClient>>) -> String {
    if std::env::var("ANTHROPIC_API_KEY").is_ok() {
        "anthropic".to_string()
    } else if std::env::var("OPENAI_API_KEY").is_ok() {
        "openai".to_string()
    } else if warehouse.is_some() {
        "cortex".to_string()
    } else {
        // Fails in create_provider_from_env with a useful message.
        "anthropic".to_string()
    }
}
