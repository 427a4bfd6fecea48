//! # Error Types
//!
//! Domain-specific error types for scantrace-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  scantrace-core errors (this file)                                     │
//! │  └── CoreError        - Submission validation / session misuse         │
//! │                                                                         │
//! │  scantrace-client errors (separate crate)                              │
//! │  └── ClientError      - Permission / transport / response / config     │
//! │                                                                         │
//! │  Flow: CoreError → ClientError → Failure message → Presenter           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Note that remote lookup failures are NOT errors at this level: the six
//! classification rules in [`crate::outcome`] fold them into
//! `LookupOutcome::Failure` so a bad response can never unwind the pipeline.
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (session state, event name)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core pipeline errors.
///
/// These represent misuse of the pipeline at the submission boundary, not
/// remote failures. They should be caught and translated to user-facing
/// messages by the caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A submission was attempted with empty (or whitespace-only) text.
    ///
    /// ## When This Occurs
    /// - Manual entry submitted before anything was typed
    /// - A scanner delivered an empty detection payload
    #[error("Nothing to look up: input is empty")]
    EmptyInput,

    /// A session event arrived in a state that does not accept it.
    ///
    /// ## When This Occurs
    /// - `grant()` without a preceding `start()`
    /// - A detection delivered while the session is not Active
    #[error("Scan session is {state}, cannot handle '{event}'")]
    InvalidTransition { state: String, event: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CoreError::EmptyInput.to_string(),
            "Nothing to look up: input is empty"
        );

        let err = CoreError::InvalidTransition {
            state: "Idle".to_string(),
            event: "detected".to_string(),
        };
        assert_eq!(err.to_string(), "Scan session is Idle, cannot handle 'detected'");
    }
}
