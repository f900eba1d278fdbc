use thiserror::Error;

#[derive(Debug, Error)]
pub enum GuidanceError {
    #[error(
        "AI assistance is not configured. Set OPENROUTER_API_KEY or ensure Ollama is running."
    )]
    NotConfigured,

    #[error("Rate limit exceeded. Please wait before making another request.")]
    RateLimited,

    #[error("OpenRouter API key not configured")]
    CredentialMissing,

    #[error("{provider} API error ({status}): {body}")]
    Upstream {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("Cannot connect to Ollama. Make sure Ollama is running on {url}")]
    DaemonUnreachable { url: String },

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("AI request failed after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    #[error("malformed provider response: {0}")]
    InvalidResponse(String),
}

impl GuidanceError {
    /// Returns true for failures that may succeed on retry: transport-level
    /// errors (connection, timeout) and a malformed success body. HTTP status
    /// failures (401, 429, 5xx alike), a missing credential, and an
    /// unreachable daemon are clean results and are never retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::InvalidResponse(_))
    }

    /// Sanitized message for display to the end user. Transport errors don't
    /// leak request internals; upstream bodies are kept because they are the
    /// only diagnostic the backend gives us.
    pub fn user_message(&self) -> String {
        match self {
            Self::Request(e) if e.is_timeout() => "AI request timed out".to_string(),
            Self::Request(_) => "request to AI provider failed".to_string(),
            other => other.to_string(),
        }
    }
}
