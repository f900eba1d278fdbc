use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Backend identity for a guidance request. `Disabled` means no usable
/// provider was detected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenRouter,
    Ollama,
    Disabled,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenRouter => "openrouter",
            Provider::Ollama => "ollama",
            Provider::Disabled => "disabled",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable configuration for the guidance core, loaded once at startup.
/// The primary/fallback selection never changes afterwards; the fallback path
/// threads the effective provider through the call stack instead of mutating
/// this struct.
#[derive(Debug, Clone)]
pub struct GuidanceConfig {
    pub provider: Provider,
    pub fallback_provider: Provider,

    pub openrouter_api_key: Option<String>,
    pub openrouter_model: String,
    pub openrouter_base_url: String,

    pub ollama_base_url: String,
    pub ollama_model: String,

    pub max_requests_per_minute: usize,
    pub max_retries: u32,
    pub retry_base_delay: Duration,

    pub max_tokens: u32,
    pub temperature: f64,
    pub request_timeout: Duration,

    pub cache_enabled: bool,
    pub cache_ttl: Duration,
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Disabled,
            fallback_provider: Provider::Disabled,
            openrouter_api_key: None,
            openrouter_model: "anthropic/claude-3-haiku".to_string(),
            openrouter_base_url: "https://openrouter.ai/api/v1".to_string(),
            ollama_base_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3".to_string(),
            max_requests_per_minute: 20,
            max_retries: 3,
            retry_base_delay: Duration::from_secs(1),
            max_tokens: 1000,
            temperature: 0.7,
            request_timeout: Duration::from_secs(30),
            cache_enabled: true,
            cache_ttl: Duration::from_secs(3600),
        }
    }
}

impl GuidanceConfig {
    /// Read tunables and credentials from the environment. Providers are left
    /// `Disabled` here; call [`with_detected_providers`] once daemon
    /// reachability is known, or use [`detect`] to do both.
    ///
    /// [`with_detected_providers`]: GuidanceConfig::with_detected_providers
    /// [`detect`]: GuidanceConfig::detect
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let openrouter_api_key = env::var("OPENROUTER_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        if openrouter_api_key.is_none() {
            tracing::warn!("OPENROUTER_API_KEY not set — hosted guidance unavailable");
        }

        Self {
            provider: Provider::Disabled,
            fallback_provider: Provider::Disabled,
            openrouter_api_key,
            openrouter_model: env_or("OPENROUTER_MODEL", defaults.openrouter_model),
            openrouter_base_url: env_or("OPENROUTER_BASE_URL", defaults.openrouter_base_url),
            ollama_base_url: env_or("OLLAMA_BASE_URL", defaults.ollama_base_url),
            ollama_model: env_or("OLLAMA_MODEL", defaults.ollama_model),
            max_requests_per_minute: env_parsed(
                "AI_MAX_REQUESTS_PER_MINUTE",
                defaults.max_requests_per_minute,
            ),
            max_retries: env_parsed("AI_MAX_RETRIES", defaults.max_retries),
            retry_base_delay: env_duration_secs("AI_RETRY_DELAY", 1.0),
            max_tokens: env_parsed("AI_MAX_TOKENS", defaults.max_tokens),
            temperature: env_parsed("AI_TEMPERATURE", defaults.temperature),
            request_timeout: env_duration_secs("AI_TIMEOUT", 30.0),
            cache_enabled: env_parsed("AI_CACHE_ENABLED", true),
            cache_ttl: Duration::from_secs(env_parsed("AI_CACHE_TTL", 3600_u64)),
        }
    }

    /// Apply the provider selection rules given what is actually reachable:
    /// a hosted key makes OpenRouter primary (with Ollama as fallback when the
    /// daemon answers); a reachable daemon alone makes Ollama primary; neither
    /// leaves guidance disabled.
    pub fn with_detected_providers(mut self, daemon_reachable: bool) -> Self {
        if self.openrouter_api_key.is_some() {
            self.provider = Provider::OpenRouter;
            if daemon_reachable {
                self.fallback_provider = Provider::Ollama;
            }
        } else if daemon_reachable {
            self.provider = Provider::Ollama;
        }

        if self.provider == Provider::Disabled {
            tracing::warn!("no AI provider configured — guidance requests will be rejected");
        } else {
            tracing::info!(
                primary = %self.provider,
                fallback = %self.fallback_provider,
                "AI providers selected"
            );
        }
        self
    }

    /// Load from the environment and probe the local daemon in one step.
    pub async fn detect() -> Self {
        let config = Self::from_env();
        let daemon_reachable = crate::providers::probe_daemon(&config.ollama_base_url).await;
        config.with_detected_providers(daemon_reachable)
    }
}

fn env_or(name: &str, default: String) -> String {
    env::var(name).ok().filter(|v| !v.is_empty()).unwrap_or(default)
}

/// Seconds-valued tunable. `Duration::from_secs_f64` panics on negative or
/// non-finite input, so those are rejected here with the same warn-and-default
/// treatment as an unparseable value.
fn env_duration_secs(name: &str, default_secs: f64) -> Duration {
    let secs: f64 = env_parsed(name, default_secs);
    if secs.is_finite() && secs >= 0.0 {
        Duration::from_secs_f64(secs)
    } else {
        tracing::warn!("invalid value for {name}: {secs}, using default");
        Duration::from_secs_f64(default_secs)
    }
}

fn env_parsed<T: std::str::FromStr + Copy>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("invalid value for {name}: {raw:?}, using default");
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tool_baseline() {
        let config = GuidanceConfig::default();
        assert_eq!(config.provider, Provider::Disabled);
        assert_eq!(config.fallback_provider, Provider::Disabled);
        assert_eq!(config.max_requests_per_minute, 20);
        assert_eq!(config.max_retries, 3);
        assert!(config.cache_enabled);
        assert_eq!(config.cache_ttl, Duration::from_secs(3600));
    }

    #[test]
    fn hosted_key_selects_openrouter_with_ollama_fallback() {
        let config = GuidanceConfig {
            openrouter_api_key: Some("test-key".to_string()),
            ..Default::default()
        }
        .with_detected_providers(true);

        assert_eq!(config.provider, Provider::OpenRouter);
        assert_eq!(config.fallback_provider, Provider::Ollama);
    }

    #[test]
    fn daemon_only_selects_ollama_without_fallback() {
        let config = GuidanceConfig::default().with_detected_providers(true);
        assert_eq!(config.provider, Provider::Ollama);
        assert_eq!(config.fallback_provider, Provider::Disabled);
    }

    #[test]
    fn nothing_reachable_stays_disabled() {
        let config = GuidanceConfig::default().with_detected_providers(false);
        assert_eq!(config.provider, Provider::Disabled);
        assert_eq!(config.fallback_provider, Provider::Disabled);
    }

    #[test]
    fn hostile_duration_env_values_fall_back_to_defaults() {
        // set_var is unsafe in edition 2024; no other test reads these vars.
        unsafe {
            env::set_var("AI_RETRY_DELAY", "-1");
            env::set_var("AI_TIMEOUT", "nan");
        }
        let config = GuidanceConfig::from_env();
        unsafe {
            env::remove_var("AI_RETRY_DELAY");
            env::remove_var("AI_TIMEOUT");
        }

        assert_eq!(config.retry_base_delay, Duration::from_secs(1));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn provider_strings_are_stable() {
        assert_eq!(Provider::OpenRouter.as_str(), "openrouter");
        assert_eq!(Provider::Ollama.as_str(), "ollama");
        assert_eq!(Provider::Disabled.as_str(), "disabled");
    }
}
