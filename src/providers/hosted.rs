use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::config::GuidanceConfig;
use crate::error::GuidanceError;
use crate::prompts::PromptPair;

/// Client for an OpenRouter-style hosted chat-completions API.
pub struct HostedClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    temperature: f64,
    timeout: Duration,
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

impl HostedClient {
    pub fn new(client: Client, config: &GuidanceConfig) -> Self {
        Self {
            client,
            base_url: config.openrouter_base_url.clone(),
            api_key: config.openrouter_api_key.clone(),
            model: config.openrouter_model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout: config.request_timeout,
        }
    }

    /// One timed POST to `{base}/chat/completions`. A missing credential is a
    /// local failure with no network attempt.
    pub async fn call(&self, prompt: &PromptPair) -> Result<String, GuidanceError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(GuidanceError::CredentialMissing)?;

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.user}
            ],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
        });

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GuidanceError::Upstream {
                provider: "OpenRouter".to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| GuidanceError::InvalidResponse(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                GuidanceError::InvalidResponse("empty choices or null content".to_string())
            })?;

        Ok(content.trim().to_string())
    }

    pub fn credential_present(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Curated hosted model identifiers offered in configuration. The hosted
    /// API exposes thousands of models; these are the ones the tool supports.
    pub fn known_models() -> Vec<String> {
        [
            "anthropic/claude-3.5-sonnet",
            "anthropic/claude-3-haiku",
            "openai/gpt-4-turbo",
            "openai/gpt-4o",
            "meta-llama/llama-3.1-70b-instruct",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }
}
