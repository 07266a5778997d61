use thiserror::Error;

/// Provider error classification derived from the HTTP status of a LINE API response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorCode {
    BadRequest,
    Unauthorized,
    Forbidden,
    /// A request with the same retry key was already accepted
    Conflict,
    TooManyRequests,
    InternalServerError,
    Other(u16),
}

impl ProviderErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => ProviderErrorCode::BadRequest,
            401 => ProviderErrorCode::Unauthorized,
            403 => ProviderErrorCode::Forbidden,
            409 => ProviderErrorCode::Conflict,
            429 => ProviderErrorCode::TooManyRequests,
            500 => ProviderErrorCode::InternalServerError,
            other => ProviderErrorCode::Other(other),
        }
    }
}

impl std::fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderErrorCode::BadRequest => write!(f, "bad_request"),
            ProviderErrorCode::Unauthorized => write!(f, "unauthorized"),
            ProviderErrorCode::Forbidden => write!(f, "forbidden"),
            ProviderErrorCode::Conflict => write!(f, "conflict"),
            ProviderErrorCode::TooManyRequests => write!(f, "too_many_requests"),
            ProviderErrorCode::InternalServerError => write!(f, "internal_server_error"),
            ProviderErrorCode::Other(status) => write!(f, "status_{}", status),
        }
    }
}

/// Coarse error kind, matched by callers instead of inspecting messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushErrorKind {
    Provider,
    Transport,
    Decode,
}

/// Errors returned by a push provider.
#[derive(Debug, Error)]
pub enum PushError {
    /// The provider answered with a non-success status.
    #[error("LINE API error ({code}, status {status}): {message}")]
    Provider {
        code: ProviderErrorCode,
        status: u16,
        message: String,
    },

    /// The request never produced a response (connect failure, timeout, ...).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider answered 2xx with a body we could not read.
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl PushError {
    pub fn provider(status: u16, message: impl Into<String>) -> Self {
        PushError::Provider {
            code: ProviderErrorCode::from_status(status),
            status,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> PushErrorKind {
        match self {
            PushError::Provider { .. } => PushErrorKind::Provider,
            PushError::Transport(_) => PushErrorKind::Transport,
            PushError::Decode(_) => PushErrorKind::Decode,
        }
    }

    pub fn provider_code(&self) -> Option<ProviderErrorCode> {
        match self {
            PushError::Provider { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Only rate limiting and provider-side internal errors are retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.provider_code(),
            Some(ProviderErrorCode::TooManyRequests | ProviderErrorCode::InternalServerError)
        )
    }
}
