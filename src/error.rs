//! Error taxonomy for the classification core: the categories a failed
//! provider call or response-parse can fall into, and whether the
//! Failover Coordinator should try the next provider.

use thiserror::Error;

/// The stage at which a classification call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    OpenAiRequest,
    ClaudeRequest,
    OllamaRequest,
    ResponseParsing,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::OpenAiRequest => "openai_request",
            Stage::ClaudeRequest => "claude_request",
            Stage::OllamaRequest => "ollama_request",
            Stage::ResponseParsing => "response_parsing",
        };
        f.write_str(s)
    }
}

/// Coordinator-visible error category. Every category is either
/// fallbackable (the coordinator tries the next provider) or not
/// (authentication and malformed-request errors short-circuit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    QuotaExceeded,
    RateLimit,
    InsufficientQuota,
    ApiServerError,
    Timeout,
    NetworkError,
    ResponseParseError,
    ApiAuthError,
    ApiBadRequest,
    UnknownError,
}

impl ErrorCategory {
    pub fn is_fallbackable(self) -> bool {
        !matches!(self, ErrorCategory::ApiAuthError | ErrorCategory::ApiBadRequest)
    }

    /// Classifies a lowercased error message by substring match against the
    /// canonical markers. First match wins; auth and bad-request rules are
    /// checked ahead of the generic 4xx/5xx bucket.
    pub fn classify(message: &str) -> Self {
        let m = message.to_lowercase();

        if m.contains("status 401") || m.contains("unauthorized") {
            return ErrorCategory::ApiAuthError;
        }
        if m.contains("status 400") || m.contains("bad request") {
            return ErrorCategory::ApiBadRequest;
        }
        if m.contains("quota") {
            return ErrorCategory::QuotaExceeded;
        }
        if m.contains("rate limit") || m.contains("status 429") {
            return ErrorCategory::RateLimit;
        }
        if m.contains("insufficient_quota") {
            return ErrorCategory::InsufficientQuota;
        }
        if m.contains("status 5") {
            return ErrorCategory::ApiServerError;
        }
        if m.contains("timeout") || m.contains("context deadline") {
            return ErrorCategory::Timeout;
        }
        if m.contains("connection") || m.contains("network") {
            return ErrorCategory::NetworkError;
        }
        if m.contains("json") || m.contains("unmarshal") {
            return ErrorCategory::ResponseParseError;
        }
        ErrorCategory::UnknownError
    }
}

#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("{stage}: {message}")]
    Provider {
        stage: Stage,
        message: String,
        #[source]
        cause: Option<anyhow::Error>,
    },

    #[error("response_parsing: {0}")]
    ResponseParsing(String),

    #[error("validation: {0}")]
    Validation(String),

    #[error("all providers failed: {0}")]
    AllProvidersFailed(String),

    #[error("no provider is configured")]
    NoProviderConfigured,
}

impl ClassificationError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ClassificationError::Provider { message, .. } => ErrorCategory::classify(message),
            ClassificationError::ResponseParsing(_) => ErrorCategory::ResponseParseError,
            ClassificationError::Validation(_) => ErrorCategory::UnknownError,
            ClassificationError::AllProvidersFailed(_) => ErrorCategory::UnknownError,
            ClassificationError::NoProviderConfigured => ErrorCategory::UnknownError,
        }
    }

    pub fn is_fallbackable(&self) -> bool {
        self.category().is_fallbackable()
    }

    pub fn stage(stage: Stage, message: impl Into<String>) -> Self {
        ClassificationError::Provider {
            stage,
            message: message.into(),
            cause: None,
        }
    }

    pub fn stage_with_cause(stage: Stage, message: impl Into<String>, cause: anyhow::Error) -> Self {
        ClassificationError::Provider {
            stage,
            message: message.into(),
            cause: Some(cause),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_auth_before_generic_4xx() {
        assert_eq!(
            ErrorCategory::classify("request failed with status 401: unauthorized"),
            ErrorCategory::ApiAuthError
        );
    }

    #[test]
    fn classifies_bad_request_before_generic_4xx() {
        assert_eq!(
            ErrorCategory::classify("status 400 bad request: missing field"),
            ErrorCategory::ApiBadRequest
        );
    }

    #[test]
    fn classifies_rate_limit() {
        assert_eq!(
            ErrorCategory::classify("received status 429 rate limit exceeded"),
            ErrorCategory::RateLimit
        );
    }

    #[test]
    fn classifies_server_error() {
        assert_eq!(
            ErrorCategory::classify("upstream returned status 503"),
            ErrorCategory::ApiServerError
        );
    }

    #[test]
    fn classifies_timeout() {
        assert_eq!(
            ErrorCategory::classify("operation timeout after 60s"),
            ErrorCategory::Timeout
        );
    }

    #[test]
    fn classifies_parse_error() {
        assert_eq!(
            ErrorCategory::classify("failed to unmarshal json body"),
            ErrorCategory::ResponseParseError
        );
    }

    #[test]
    fn unknown_falls_back_to_unknown_error_and_is_fallbackable() {
        let cat = ErrorCategory::classify("the cat knocked over the server rack");
        assert_eq!(cat, ErrorCategory::UnknownError);
        assert!(cat.is_fallbackable());
    }

    #[test]
    fn auth_and_bad_request_are_not_fallbackable() {
        assert!(!ErrorCategory::ApiAuthError.is_fallbackable());
        assert!(!ErrorCategory::ApiBadRequest.is_fallbackable());
    }

    #[test]
    fn everything_else_is_fallbackable() {
        assert!(ErrorCategory::QuotaExceeded.is_fallbackable());
        assert!(ErrorCategory::RateLimit.is_fallbackable());
        assert!(ErrorCategory::ApiServerError.is_fallbackable());
        assert!(ErrorCategory::Timeout.is_fallbackable());
        assert!(ErrorCategory::NetworkError.is_fallbackable());
        assert!(ErrorCategory::ResponseParseError.is_fallbackable());
    }
}
