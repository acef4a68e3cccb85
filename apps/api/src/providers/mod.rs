//! Chat-completion provider adapters.
//!
//! ARCHITECTURAL RULE: no other module may call a provider API directly.
//! Both supported providers speak the OpenAI-shaped chat-completion protocol,
//! so the adapters share one request/response codec and differ only in
//! endpoint and name. A call is a single attempt: fallback behavior on
//! failure belongs to the generator, not this layer.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};
use uuid::Uuid;

use crate::generation::prompt_builder::BuiltPrompt;
use crate::models::settings::{AiProvider, AiSettingsRow};

mod groq;
mod openai;

pub use groq::GroqProvider;
pub use openai::OpenAiProvider;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("provider response missing choices[0].message.content")]
    MissingContent,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// One chat-completion backend. The default `complete` covers both shipped
/// providers; tests substitute their own implementations to simulate failures.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn endpoint(&self) -> &'static str;

    /// Sends the assembled prompt pair and returns the raw completion text,
    /// unparsed. Single attempt, no retry.
    async fn complete(
        &self,
        client: &Client,
        settings: &AiSettingsRow,
        prompt: &BuiltPrompt,
        plan_id: Option<Uuid>,
    ) -> Result<String, ProviderError> {
        let body = ChatRequest {
            model: &settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user_prompt,
                },
            ],
            temperature: settings.temperature,
            max_tokens: settings.max_tokens.max(0) as u32,
        };

        debug!(
            provider = self.name(),
            model = %settings.model,
            ?plan_id,
            "sending chat completion request"
        );

        let response = client
            .post(self.endpoint())
            .bearer_auth(&settings.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                provider = self.name(),
                status = status.as_u16(),
                ?plan_id,
                "chat completion request failed"
            );
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(ProviderError::MissingContent)?;

        debug!(
            provider = self.name(),
            ?plan_id,
            response_chars = content.len(),
            "chat completion succeeded"
        );

        Ok(content)
    }
}

/// Resolves the adapter for the configured provider.
pub fn provider_for(provider: AiProvider) -> &'static dyn ChatProvider {
    match provider {
        AiProvider::OpenAi => &OpenAiProvider,
        AiProvider::Groq => &GroqProvider,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_dispatch() {
        assert_eq!(provider_for(AiProvider::OpenAi).name(), "openai");
        assert_eq!(provider_for(AiProvider::Groq).name(), "groq");
    }

    #[test]
    fn test_endpoints_are_chat_completions() {
        for provider in [AiProvider::OpenAi, AiProvider::Groq] {
            let adapter = provider_for(provider);
            assert!(adapter.endpoint().ends_with("/chat/completions"));
        }
    }

    #[test]
    fn test_chat_response_extracts_first_choice() {
        let json = r#"{
            "choices": [
                {"message": {"content": "první"}},
                {"message": {"content": "druhá"}}
            ]
        }"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content);
        assert_eq!(content.as_deref(), Some("první"));
    }

    #[test]
    fn test_chat_response_without_choices_is_missing_content() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
        assert!(parsed.choices.is_empty());
    }
}
