//! # Identifier Normalizer
//!
//! Converts raw scanned or pasted text into the canonical lookup key.
//!
//! ## Normalization Policy (three tiers, in order)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Normalization Tiers                                 │
//! │                                                                         │
//! │  Raw text: "  {\"id\":\"xyz\"}  "                                      │
//! │       │                                                                 │
//! │       ▼ trim                                                            │
//! │  ┌───────────────────────────────────────────┐                         │
//! │  │ Tier 1: JSON object with an "id" field?   │──► YES: key = "xyz"     │
//! │  └───────────────────┬───────────────────────┘                         │
//! │                      │ no                                               │
//! │  ┌───────────────────▼───────────────────────┐                         │
//! │  │ Tier 2: http(s) URL with a path segment?  │──► YES: last segment    │
//! │  └───────────────────┬───────────────────────┘                         │
//! │                      │ no                                               │
//! │  ┌───────────────────▼───────────────────────┐                         │
//! │  │ Tier 3: trimmed text verbatim             │                         │
//! │  └───────────────────────────────────────────┘                         │
//! │                                                                         │
//! │  The order is load-bearing: a payload that is both valid JSON and a    │
//! │  plausible URL path must always resolve through the JSON tier.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why These Tiers
//! QR codes in the field encode the record in one of two shapes: the full
//! record as JSON (offline-printable labels) or a public product-page URL
//! ending in the record id. Manual entry is usually the bare id. All three
//! funnel into the same lookup key.

use serde_json::Value;
use url::Url;

use crate::error::{CoreError, CoreResult};
use crate::ID_FIELD;

// =============================================================================
// Raw Input
// =============================================================================

/// Where a piece of raw input came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOrigin {
    /// Delivered by the camera scanner.
    Camera,

    /// Typed or pasted into the manual entry field.
    ManualPaste,
}

impl std::fmt::Display for InputOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputOrigin::Camera => write!(f, "camera"),
            InputOrigin::ManualPaste => write!(f, "manual-paste"),
        }
    }
}

/// Opaque text acquired from the scanner or the manual entry field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInput {
    text: String,
    origin: InputOrigin,
}

impl RawInput {
    /// Creates a raw input without validation.
    ///
    /// Total by design: the normalizer accepts anything. Use
    /// [`RawInput::submitted`] at the submission boundary, where empty
    /// input must be rejected.
    pub fn new(text: impl Into<String>, origin: InputOrigin) -> Self {
        RawInput {
            text: text.into(),
            origin,
        }
    }

    /// Creates a raw input for submission, rejecting empty text.
    ///
    /// ## Invariant
    /// A submitted RawInput is never empty (whitespace-only counts as empty).
    pub fn submitted(text: impl Into<String>, origin: InputOrigin) -> CoreResult<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(CoreError::EmptyInput);
        }
        Ok(RawInput { text, origin })
    }

    /// Returns the raw text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the origin tag.
    pub fn origin(&self) -> InputOrigin {
        self.origin
    }
}

// =============================================================================
// Canonical Key
// =============================================================================

/// The normalized identifier string used for remote lookup.
///
/// ## Invariants
/// - Deterministic function of the raw input
/// - Trimmed of surrounding whitespace
/// - Non-empty whenever the raw input had non-whitespace content
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the key, returning the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Normalization
// =============================================================================

/// Derives the canonical lookup key from raw input.
///
/// Pure and total: never fails, never panics. Empty input produces an empty
/// key; rejecting that is the submission boundary's job, not this one's.
pub fn normalize(raw: &RawInput) -> CanonicalKey {
    let trimmed = raw.text().trim();

    // Tier 1: JSON object carrying the identifier field
    if let Some(key) = extract_json_id(trimmed) {
        return CanonicalKey(key);
    }

    // Tier 2: http(s) URL - use the last non-empty path segment
    if let Some(key) = extract_url_segment(trimmed) {
        return CanonicalKey(key);
    }

    // Tier 3: trimmed text verbatim
    CanonicalKey(trimmed.to_string())
}

/// Tier 1: extracts the `"id"` field from a JSON object payload.
///
/// Only scalar id values are usable as keys; an object/array/null id falls
/// through to the next tier.
fn extract_json_id(text: &str) -> Option<String> {
    let value: Value = serde_json::from_str(text).ok()?;
    match value.get(ID_FIELD)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Tier 2: extracts the last non-empty path segment from an http(s) URL.
///
/// Non-http schemes and host-only URLs fall through: `mailto:x` or
/// `https://host/` are not product links.
fn extract_url_segment(text: &str) -> Option<String> {
    let url = Url::parse(text).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.path_segments()?
        .filter(|s| !s.is_empty())
        .last()
        .map(str::to_string)
}

// =============================================================================
// Unit Tests
// =============================================================================
