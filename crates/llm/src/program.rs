//! Typed completion programs.
//!
//! A `JsonProgram` sends a rendered prompt to an LLM, expects the reply to
//! contain a JSON object, and deserializes it into a caller-chosen type.
//! Models often wrap JSON in markdown code fences or chat around it, so the
//! reply is cleaned before parsing.

use crate::client::{LlmClient, LlmRequest};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;
use tabletalk_core::{AppError, AppResult};

/// A completion program that parses the LLM reply into a typed value.
pub struct JsonProgram<T> {
    client: Arc<dyn LlmClient>,
    model: String,
    _output: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonProgram<T> {
    /// Create a program bound to a client and model.
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            _output: PhantomData,
        }
    }

    /// Run the program: complete the prompt and parse the reply as JSON.
    pub async fn run(&self, prompt: String) -> AppResult<T> {
        // Temperature 0 keeps structured output stable across runs.
        let request = LlmRequest::new(prompt, &self.model).with_temperature(0.0);
        let response = self.client.complete(&request).await?;

        parse_json_reply(&response.content)
    }
}

/// Parse a JSON value out of an LLM reply.
///
/// Strips markdown code fences first; if the remainder still fails to parse,
/// falls back to the substring between the first `{` and the last `}`.
pub fn parse_json_reply<T: DeserializeOwned>(content: &str) -> AppResult<T> {
    let cleaned = strip_code_fences(content);

    match serde_json::from_str(cleaned) {
        Ok(value) => Ok(value),
        Err(first_err) => {
            let start = cleaned.find('{');
            let end = cleaned.rfind('}');
            if let (Some(start), Some(end)) = (start, end) {
                if start < end {
                    if let Ok(value) = serde_json::from_str(&cleaned[start..=end]) {
                        return Ok(value);
                    }
                }
            }
            Err(AppError::Llm(format!(
                "Failed to parse JSON from LLM reply: {}",
                first_err
            )))
        }
    }
}

/// Strip surrounding markdown code fences from a reply.
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();

    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop an optional language tag on the opening fence.
    let inner = inner
        .strip_prefix("json")
        .or_else(|| inner.strip_prefix("sql"))
        .unwrap_or(inner);

    inner.strip_suffix("```").unwrap_or(inner).trim()
}
