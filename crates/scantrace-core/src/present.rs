//! # Result Presenter
//!
//! Pure rendering policy: exactly one of {loading indicator, error text,
//! structured-result view} is shown at a time, chosen by the current
//! [`LookupOutcome`] tag.
//!
//! This is deliberately NOT business logic. The presenter never inspects
//! payload contents beyond pretty-printing them; the remote payload shape
//! is not under our control, so rendering must handle arbitrary nesting
//! without assuming a schema.

use serde_json::Value;

use crate::outcome::LookupOutcome;

// =============================================================================
// Scan View
// =============================================================================

/// The single view the front-end should display.
///
/// Mutual exclusion is structural: the enum can only be one variant, so a
/// stale spinner can never linger behind an error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanView {
    /// Resolution in flight - show the loading indicator.
    Loading,

    /// The lookup failed - show the short error text.
    Error(String),

    /// The lookup succeeded - show the rendered payload.
    Result(String),
}

/// Selects the view for the current outcome.
pub fn view(outcome: &LookupOutcome) -> ScanView {
    match outcome {
        LookupOutcome::Loading => ScanView::Loading,
        LookupOutcome::Failure(msg) => ScanView::Error(msg.clone()),
        LookupOutcome::Success(payload) => ScanView::Result(render_payload(payload)),
    }
}

/// Renders an arbitrary JSON payload with human-readable indentation.
fn render_payload(payload: &Value) -> String {
    // to_string_pretty only fails for non-string map keys, which Value
    // cannot contain; fall back to the compact form regardless.
    serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_view_is_mutually_exclusive_by_tag() {
        assert_eq!(view(&LookupOutcome::Loading), ScanView::Loading);
        assert_eq!(
            view(&LookupOutcome::Failure("no".into())),
            ScanView::Error("no".into())
        );
        assert!(matches!(
            view(&LookupOutcome::Success(json!({}))),
            ScanView::Result(_)
        ));
    }

    #[test]
    fn test_nested_payload_renders_indented() {
        let payload = json!({
            "id": "herb_1",
            "origin": { "farmer": "Asha", "location": "Pune" },
            "batches": [1, 2, 3]
        });
        let rendered = match view(&LookupOutcome::Success(payload)) {
            ScanView::Result(text) => text,
            other => panic!("expected result view, got {:?}", other),
        };

        // Human-readable: multi-line with indentation, all fields present
        assert!(rendered.contains('\n'));
        assert!(rendered.contains("  \"origin\""));
        assert!(rendered.contains("\"farmer\": \"Asha\""));
        assert!(rendered.contains("\"batches\""));
    }

    #[test]
    fn test_scalar_payload_renders() {
        let rendered = match view(&LookupOutcome::Success(json!("bare"))) {
            ScanView::Result(text) => text,
            other => panic!("expected result view, got {:?}", other),
        };
        assert_eq!(rendered, "\"bare\"");
    }
}
