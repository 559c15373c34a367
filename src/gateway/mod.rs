// src/gateway/mod.rs
//! The three model-backed operations: filter extraction, boolean query
//! synthesis and keyword suggestion.

pub mod gemini_client;
pub mod model_client;
pub mod prompts;

pub use gemini_client::GeminiClient;
pub use model_client::{LanguageModel, ModelRequest};

use anyhow::{Context, Result};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::types::FilterState;

const LIST_FIELDS: [&str; 4] = ["jobTypes", "experienceLevels", "workplaceTypes", "companyTypes"];

/// Opaque per-call failure. The cause is logged, never surfaced.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Could not process the prompt with the AI model.")]
    Extraction,
    #[error("Could not generate boolean query with the AI model.")]
    QuerySynthesis,
    #[error("Could not generate keywords with the AI model.")]
    Suggestion,
}

#[derive(Clone)]
pub struct PromptGateway {
    model: Arc<dyn LanguageModel>,
}

impl PromptGateway {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Free text to a complete filter set.
    pub async fn extract_filters(&self, prompt: &str) -> Result<FilterState, GatewayError> {
        let request = ModelRequest::text(prompts::EXTRACTION_INSTRUCTION, prompt)
            .with_json_schema(prompts::extraction_schema());

        let outcome = async {
            let text = self.model.generate(request).await?;
            parse_extraction(&text)
        }
        .await;

        outcome.map_err(|e| {
            error!("Filter extraction failed: {:#}", e);
            GatewayError::Extraction
        })
    }

    /// Filter set to a boolean expression for the keywords field.
    pub async fn synthesize_query(&self, filters: &FilterState) -> Result<String, GatewayError> {
        let outcome = async {
            let contents = prompts::query_contents(filters)?;
            let text = self
                .model
                .generate(ModelRequest::text(prompts::QUERY_INSTRUCTION, contents))
                .await?;
            Ok::<_, anyhow::Error>(text.trim().to_string())
        }
        .await;

        outcome.map_err(|e| {
            error!("Boolean query generation failed: {:#}", e);
            GatewayError::QuerySynthesis
        })
    }

    /// New comma-separated keywords for `prompt`, given the current filters.
    pub async fn suggest_keywords(
        &self,
        prompt: &str,
        filters: &FilterState,
    ) -> Result<String, GatewayError> {
        let request = ModelRequest::text(
            prompts::suggestion_instruction(filters),
            prompts::suggestion_contents(prompt),
        );

        match self.model.generate(request).await {
            Ok(text) => {
                let suggested = text.trim().to_string();
                info!("Model suggested keywords: {}", suggested);
                Ok(suggested)
            }
            Err(e) => {
                error!("Keyword suggestion failed: {:#}", e);
                Err(GatewayError::Suggestion)
            }
        }
    }
}

/// Append suggested keywords to the existing list. No deduplication.
pub fn merge_keywords(existing: &str, suggested: &str) -> String {
    let suggested = suggested.trim();
    if suggested.is_empty() {
        existing.to_string()
    } else if existing.trim().is_empty() {
        suggested.to_string()
    } else {
        format!("{}, {}", existing, suggested).trim().to_string()
    }
}

/// Validate and decode an extraction response.
pub(crate) fn parse_extraction(text: &str) -> Result<FilterState> {
    let value: Value = serde_json::from_str(strip_code_fences(text))
        .context("Model response is not valid JSON")?;
    let object = value
        .as_object()
        .context("Model response is not a JSON object")?;

    match object.get("keywords").and_then(Value::as_str) {
        Some(keywords) if !keywords.trim().is_empty() => {}
        _ => anyhow::bail!("Model response has no keywords"),
    }
    for field in LIST_FIELDS {
        if !object.get(field).map_or(false, Value::is_array) {
            anyhow::bail!("Model response field '{}' is not a list", field);
        }
    }

    let mut filters: FilterState =
        serde_json::from_value(value).context("Model response does not match filter shape")?;

    for rejected in filters.retain_known_codes() {
        warn!(
            "Dropping unknown {} code from model response: {:?}",
            rejected.field, rejected.code
        );
    }

    Ok(filters)
}

fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.strip_suffix("```").unwrap_or(rest);
    // Drop an info string such as `json` on the opening fence line.
    match body.split_once('\n') {
        Some((info, inner)) if !info.trim_start().starts_with('{') => inner.trim(),
        _ => body.trim(),
    }
}
