//! # Client Error Types
//!
//! Error types for the I/O layer.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Permission     │  │   Transport     │  │     Configuration       │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Denied         │  │  Transport      │  │  InvalidConfig          │ │
//! │  │  Unavailable    │  │  Timeout        │  │  InvalidUrl             │ │
//! │  │                 │  │                 │  │  ConfigLoadFailed       │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  NOTE: non-success responses and unparseable bodies are NOT errors     │
//! │  here - the classification rules in scantrace-core fold them into      │
//! │  LookupOutcome::Failure so they can never unwind past resolve().       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Propagation Policy
//! Every variant is terminal for the current submission - nothing is retried
//! automatically. The user re-triggers by rescanning or re-submitting. No
//! error is fatal to the process.

use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Client error type covering permission, transport, and config failures.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Permission Errors
    // =========================================================================
    /// The host refused camera access.
    #[error("Camera permission denied")]
    PermissionDenied,

    /// The host has no usable camera.
    #[error("Camera unavailable: {0}")]
    CameraUnavailable(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The lookup service could not be reached or the exchange broke down
    /// (unreachable host, DNS, malformed framing).
    #[error("Lookup request failed: {0}")]
    Transport(String),

    /// The lookup request ran past its deadline.
    #[error("Lookup request timed out after {0} seconds")]
    Timeout(u64),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configured base URL is not a usable http(s) URL.
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    /// Failed to load the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save the config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Pipeline misuse reported by the core (empty submission, bad transition).
    #[error(transparent)]
    Core(#[from] scantrace_core::CoreError),

    /// Internal client error.
    #[error("Internal error: {0}")]
    Internal(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    /// Returns true if this error came from the permission gate.
    pub fn is_permission_error(&self) -> bool {
        matches!(
            self,
            ClientError::PermissionDenied | ClientError::CameraUnavailable(_)
        )
    }

    /// Returns true if this error is a transport-level fault.
    pub fn is_transport_error(&self) -> bool {
        matches!(self, ClientError::Transport(_) | ClientError::Timeout(_))
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidConfig(_)
                | ClientError::InvalidUrl(_)
                | ClientError::ConfigLoadFailed(_)
                | ClientError::ConfigSaveFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorization() {
        assert!(ClientError::PermissionDenied.is_permission_error());
        assert!(ClientError::Transport("refused".into()).is_transport_error());
        assert!(ClientError::Timeout(10).is_transport_error());
        assert!(ClientError::InvalidUrl("nope".into()).is_config_error());

        assert!(!ClientError::PermissionDenied.is_transport_error());
        assert!(!ClientError::Transport("refused".into()).is_config_error());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ClientError::PermissionDenied.to_string(),
            "Camera permission denied"
        );
        assert_eq!(
            ClientError::Timeout(10).to_string(),
            "Lookup request timed out after 10 seconds"
        );
    }

    #[test]
    fn test_core_error_passes_through() {
        let err: ClientError = scantrace_core::CoreError::EmptyInput.into();
        assert_eq!(err.to_string(), "Nothing to look up: input is empty");
    }
}
