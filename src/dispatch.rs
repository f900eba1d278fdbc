use std::sync::Mutex;

use chrono::Utc;
use serde::Serialize;

use crate::cache::{ResponseCache, cache_key};
use crate::config::{GuidanceConfig, Provider};
use crate::error::GuidanceError;
use crate::limiter::RateLimiter;
use crate::prompts::{Phase, PromptPair, phase_prompt};
use crate::providers::{HostedClient, LocalClient, build_http_client};
use crate::session::{ConversationMessage, ConversationRecord};

/// Successful outcome of a guidance request. `conversation` is `None` for
/// cache hits — a record is only produced when a provider was invoked.
#[derive(Debug)]
pub struct GuidanceReply {
    pub text: String,
    pub conversation: Option<ConversationRecord>,
}

/// Read-only provider/limiter/cache snapshot for the status surface.
#[derive(Debug, Serialize)]
pub struct ProviderStatus {
    pub primary_provider: Provider,
    pub fallback_provider: Provider,
    pub openrouter_configured: bool,
    pub ollama_available: bool,
    pub rate_limit_remaining: usize,
    pub cache_enabled: bool,
    pub cached_responses: usize,
}

/// Orchestrates one guidance request end to end: admission, cache lookup,
/// prompt rendering, retrying provider call, fallback, and bookkeeping.
///
/// Owns the limiter and cache for the process lifetime. Both sit behind
/// mutexes so concurrent requests are safe; no lock is held across an await.
pub struct GuidanceDispatcher {
    config: GuidanceConfig,
    hosted: HostedClient,
    local: LocalClient,
    limiter: Mutex<RateLimiter>,
    cache: Mutex<ResponseCache>,
}

impl GuidanceDispatcher {
    pub fn new(config: GuidanceConfig) -> Self {
        let client = build_http_client();
        let hosted = HostedClient::new(client.clone(), &config);
        let local = LocalClient::new(client, &config);
        let limiter = Mutex::new(RateLimiter::per_minute(config.max_requests_per_minute));
        let cache = Mutex::new(ResponseCache::new(config.cache_enabled, config.cache_ttl));
        Self {
            config,
            hosted,
            local,
            limiter,
            cache,
        }
    }

    pub fn config(&self) -> &GuidanceConfig {
        &self.config
    }

    /// Ask the configured provider for follow-up guidance on one question.
    ///
    /// The rate check deliberately precedes the cache lookup, so an exhausted
    /// window blocks even a cached answer. That ordering is long-standing
    /// observed behavior of this tool; do not reorder without revisiting the
    /// admission semantics.
    pub async fn request_guidance(
        &self,
        phase_key: &str,
        question_text: &str,
        current_answer: &str,
        conversation_id: Option<String>,
    ) -> Result<GuidanceReply, GuidanceError> {
        if self.config.provider == Provider::Disabled {
            return Err(GuidanceError::NotConfigured);
        }

        {
            // Poison recovery: limiter/cache state stays usable even if a
            // concurrent request panicked while holding the lock.
            let mut limiter = self.limiter.lock().unwrap_or_else(|e| e.into_inner());
            if !limiter.can_admit() {
                return Err(GuidanceError::RateLimited);
            }
        }

        let phase = Phase::from_key(phase_key);
        let prompt = phase_prompt(phase, question_text, current_answer);

        // Cache keys are bound to the primary identity, even when the fallback
        // ends up producing the answer.
        let key = cache_key(&prompt.user, self.config.provider.as_str());
        {
            let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(text) = cache.get(&key) {
                tracing::debug!(phase = %phase, "guidance served from cache");
                return Ok(GuidanceReply {
                    text,
                    conversation: None,
                });
            }
        }

        let mut answered_by = self.config.provider;
        let mut outcome = self.call_with_retry(answered_by, &prompt).await;

        if outcome.is_err() && self.config.fallback_provider != Provider::Disabled {
            tracing::warn!(
                primary = %self.config.provider,
                fallback = %self.config.fallback_provider,
                "primary provider failed, trying fallback"
            );
            answered_by = self.config.fallback_provider;
            outcome = self.call_with_retry(answered_by, &prompt).await;
        }

        let text = outcome?;

        {
            let mut limiter = self.limiter.lock().unwrap_or_else(|e| e.into_inner());
            limiter.record();
        }
        {
            let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            cache.put(&key, &text);
        }

        let conversation = self.build_conversation(conversation_id, phase, &prompt, &text, answered_by);

        Ok(GuidanceReply {
            text,
            conversation: Some(conversation),
        })
    }

    /// Retry loop for one provider. Transport-level errors and malformed
    /// success bodies back off and retry; clean failures (missing credential,
    /// any HTTP status error, an unreachable daemon) return on the first
    /// attempt.
    async fn call_with_retry(
        &self,
        provider: Provider,
        prompt: &PromptPair,
    ) -> Result<String, GuidanceError> {
        let attempts = self.config.max_retries.max(1);

        for attempt in 0..attempts {
            match self.call_provider(provider, prompt).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() => {
                    if attempt + 1 == attempts {
                        return Err(GuidanceError::RetriesExhausted {
                            attempts,
                            last_error: e.user_message(),
                        });
                    }
                    let delay = self.config.retry_base_delay * 2u32.pow(attempt);
                    tracing::warn!(
                        provider = %provider,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient provider failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }

        // attempts >= 1, so the loop always returns.
        unreachable!("retry loop exited without a result")
    }

    async fn call_provider(
        &self,
        provider: Provider,
        prompt: &PromptPair,
    ) -> Result<String, GuidanceError> {
        match provider {
            Provider::OpenRouter => self.hosted.call(prompt).await,
            Provider::Ollama => self.local.call(prompt).await,
            Provider::Disabled => Err(GuidanceError::NotConfigured),
        }
    }

    fn build_conversation(
        &self,
        conversation_id: Option<String>,
        phase: Phase,
        prompt: &PromptPair,
        response_text: &str,
        answered_by: Provider,
    ) -> ConversationRecord {
        let now = Utc::now();
        let id = conversation_id.unwrap_or_else(|| format!("ai_{}", now.timestamp()));
        ConversationRecord {
            id,
            phase,
            messages: vec![
                ConversationMessage {
                    role: "user".to_string(),
                    content: prompt.user.clone(),
                    timestamp: now,
                    model: None,
                },
                ConversationMessage {
                    role: "assistant".to_string(),
                    content: response_text.to_string(),
                    timestamp: now,
                    model: Some(answered_by.as_str().to_string()),
                },
            ],
            created_at: now,
            updated_at: now,
        }
    }

    /// Pure read of the current provider/limiter/cache state.
    pub fn provider_status(&self) -> ProviderStatus {
        let rate_limit_remaining = self
            .limiter
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remaining();
        let cached_responses = self.cache.lock().unwrap_or_else(|e| e.into_inner()).len();

        ProviderStatus {
            primary_provider: self.config.provider,
            fallback_provider: self.config.fallback_provider,
            openrouter_configured: self.hosted.credential_present(),
            ollama_available: self.config.provider == Provider::Ollama
                || self.config.fallback_provider == Provider::Ollama,
            rate_limit_remaining,
            cache_enabled: self.config.cache_enabled,
            cached_responses,
        }
    }

    /// Model identifiers usable with the active primary provider.
    pub async fn list_available_models(&self) -> Result<Vec<String>, GuidanceError> {
        match self.config.provider {
            Provider::OpenRouter => Ok(HostedClient::known_models()),
            Provider::Ollama => self.local.list_models().await,
            Provider::Disabled => Err(GuidanceError::NotConfigured),
        }
    }
}
