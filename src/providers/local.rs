use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::config::GuidanceConfig;
use crate::error::GuidanceError;
use crate::prompts::PromptPair;

/// Client for an Ollama-style local generation daemon. The daemon takes a
/// single prompt string rather than role-tagged turns, so the system and user
/// instructions are folded into one blob with a trailing assistant cue.
pub struct LocalClient {
    client: Client,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
    timeout: Duration,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TaggedModel>,
}

#[derive(Deserialize)]
struct TaggedModel {
    name: String,
}

impl LocalClient {
    pub fn new(client: Client, config: &GuidanceConfig) -> Self {
        Self {
            client,
            base_url: config.ollama_base_url.clone(),
            model: config.ollama_model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout: config.request_timeout,
        }
    }

    /// One timed POST to `{base}/api/generate` with streaming disabled.
    /// A refused connection maps to the dedicated "daemon unreachable" error
    /// so the caller can tell "not running" apart from "request rejected".
    pub async fn call(&self, prompt: &PromptPair) -> Result<String, GuidanceError> {
        let combined = format!("{}\n\nUser: {}\n\nAssistant:", prompt.system, prompt.user);

        let body = serde_json::json!({
            "model": self.model,
            "prompt": combined,
            "stream": false,
            "options": {
                "temperature": self.temperature,
                "num_predict": self.max_tokens,
            }
        });

        let url = format!("{}/api/generate", self.base_url);
        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GuidanceError::Upstream {
                provider: "Ollama".to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GuidanceError::InvalidResponse(e.to_string()))?;

        Ok(generated.response.trim().to_string())
    }

    /// Model names the daemon currently serves, from `GET {base}/api/tags`.
    pub async fn list_models(&self) -> Result<Vec<String>, GuidanceError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GuidanceError::Upstream {
                provider: "Ollama".to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| GuidanceError::InvalidResponse(e.to_string()))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    fn map_transport_error(&self, e: reqwest::Error) -> GuidanceError {
        if e.is_connect() {
            GuidanceError::DaemonUnreachable {
                url: self.base_url.clone(),
            }
        } else {
            GuidanceError::Request(e)
        }
    }
}
