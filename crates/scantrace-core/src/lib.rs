//! # scantrace-core: Pure Pipeline Logic for ScanTrace
//!
//! This crate is the **heart** of ScanTrace. It contains the logic of the
//! scan→resolve→render pipeline as pure functions and value types with zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       ScanTrace Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     Front-end (CLI / host UI)                   │   │
//! │  │     Scan trigger ──► Manual entry ──► Result display            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   scantrace-client                              │   │
//! │  │     ScanController, PermissionGate, ResolutionClient, Config    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ scantrace-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │ normalize │  │  session  │  │  outcome  │  │  present  │  │   │
//! │  │   │ RawInput  │  │ScanSession│  │ classify  │  │ ScanView  │  │   │
//! │  │   │ Canonical │  │ debounce  │  │ 6 rules   │  │ rendering │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO CAMERA • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`normalize`] - Raw input → canonical lookup key (three-tier policy)
//! - [`session`] - Scan session state machine with detection debounce
//! - [`outcome`] - Lookup outcomes and response classification
//! - [`present`] - Mutually-exclusive view selection and JSON rendering
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Network, camera, file system access is FORBIDDEN here
//! 3. **Opaque Payloads**: Lookup results are arbitrary JSON values, never a
//!    fixed schema - the remote payload shape is not under our control
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use scantrace_core::normalize::{normalize, InputOrigin, RawInput};
//!
//! // A scanned QR code that encodes a product URL
//! let raw = RawInput::new("https://host/p/abc123", InputOrigin::Camera);
//! let key = normalize(&raw);
//!
//! // The lookup key is the last path segment
//! assert_eq!(key.as_str(), "abc123");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod normalize;
pub mod outcome;
pub mod present;
pub mod session;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use scantrace_core::LookupOutcome` instead of
// `use scantrace_core::outcome::LookupOutcome`

pub use error::{CoreError, CoreResult};
pub use normalize::{normalize, CanonicalKey, InputOrigin, RawInput};
pub use outcome::{classify_response, LookupOutcome};
pub use present::{view, ScanView};
pub use session::{DetectionDisposition, PermissionState, ScanSession, SessionState};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Debounce window for repeated detections of the same payload.
///
/// ## Why a constant?
/// Camera scanners fire repeatedly for a stationary code (several events per
/// second). A payload identical to the previously accepted one is ignored
/// within this window, including across an immediate session restart.
pub const DETECTION_DEBOUNCE: std::time::Duration = std::time::Duration::from_millis(750);

/// Field name consulted by the normalizer's JSON tier.
///
/// QR payloads produced by the lookup service embed the record under an
/// `"id"` field; when a scanned payload is a JSON object carrying this
/// field, that value is the lookup key.
pub const ID_FIELD: &str = "id";

/// Field name used to wrap a 2xx response body that is not valid JSON.
///
/// A success body is never silently discarded: if it fails to parse, the
/// raw text is surfaced under this key (classification rule 6).
pub const RAW_BODY_FIELD: &str = "raw";
