// src/gateway/model_client.rs
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// One single-shot exchange with a hosted language model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub system_instruction: String,
    pub contents: String,
    /// When set, the model is asked for JSON matching this schema.
    pub response_schema: Option<Value>,
}

impl ModelRequest {
    pub fn text(system_instruction: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            contents: contents.into(),
            response_schema: None,
        }
    }

    pub fn with_json_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }
}

/// Prompt in, text out. Output is untrusted and may not follow instructions.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, request: ModelRequest) -> Result<String>;
}
