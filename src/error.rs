//! Centralized error types for bouncewatch.

use thiserror::Error;

/// All errors produced by the bouncewatch library.
///
/// Malformed message records are never an error: the model layer defaults
/// missing fields instead. Errors only come from configuration, user input,
/// and the provider transport.
#[derive(Error, Debug)]
pub enum BounceWatchError {
    /// Configuration is missing something required (e.g. the API key).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The user supplied an empty or otherwise unusable value.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The address is not a plausible `local@domain` address.
    #[error("Not a valid email address: '{0}'")]
    InvalidAddress(String),

    /// The request never produced an HTTP response (DNS, TLS, timeout...).
    #[error("Could not reach the provider: {0}")]
    Transport(String),

    /// The provider answered with a non-success status.
    #[error("Provider returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// The provider answered 2xx but the body was not what we expected.
    #[error("Unexpected provider response: {0}")]
    Decode(String),
}

/// Convenience alias for `Result<T, BounceWatchError>`.
pub type Result<T> = std::result::Result<T, BounceWatchError>;

impl BounceWatchError {
    /// Whether this error came from talking to the provider, as opposed to
    /// local configuration or input problems.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Api { .. } | Self::Decode(_)
        )
    }
}
