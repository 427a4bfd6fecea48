//! # Scan Session State Machine
//!
//! Owns the scanning on/off lifecycle and accepts exactly one detection per
//! Active period.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Scan Session Lifecycle                             │
//! │                                                                         │
//! │            start()              granted()                               │
//! │   ┌──────┐ ──────► ┌────────────────────┐ ──────► ┌────────┐           │
//! │   │ Idle │         │ AwaitingPermission │         │ Active │           │
//! │   └──────┘ ◄────── └────────────────────┘         └───┬────┘           │
//! │      ▲      denied()                                   │                │
//! │      │                                detected / stop()│                │
//! │      │               reset()          ┌────────────────▼──┐             │
//! │      └─────────────────────────────── │     Completed     │             │
//! │                                       └───────────────────┘             │
//! │                                                                         │
//! │  • start() is idempotent while AwaitingPermission or Active             │
//! │  • exactly ONE detection is accepted per Active period                  │
//! │  • after stop() returns, no detection is ever accepted                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Detection Debounce
//! Hardware scanners fire several events per second for a stationary code.
//! The first acceptance completes the session, which already swallows the
//! burst; the debounce additionally covers the restart case, where the same
//! code is still in frame when the next session activates. A payload equal
//! to the previously accepted one is ignored within
//! [`DETECTION_DEBOUNCE`](crate::DETECTION_DEBOUNCE) of that acceptance.
//!
//! ## Purity
//! This type performs no I/O and reads no clock: detection timestamps are
//! passed in by the caller, which keeps every debounce scenario testable
//! with synthetic instants.

use std::time::Instant;

use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::normalize::{InputOrigin, RawInput};
use crate::DETECTION_DEBOUNCE;

// =============================================================================
// Permission State
// =============================================================================

/// Camera authorization state, owned exclusively by the permission gate.
///
/// The session controller reads this before activating the camera; nobody
/// else writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionState {
    /// The host has never been asked.
    #[default]
    Unknown,

    /// The host refused camera access.
    Denied,

    /// The host granted camera access.
    Granted,
}

impl std::fmt::Display for PermissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PermissionState::Unknown => write!(f, "unknown"),
            PermissionState::Denied => write!(f, "denied"),
            PermissionState::Granted => write!(f, "granted"),
        }
    }
}

// =============================================================================
// Session State
// =============================================================================

/// The scan session's position in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No scan in progress.
    #[default]
    Idle,

    /// `start()` was called; waiting for the permission gate.
    AwaitingPermission,

    /// Camera is live; waiting for one detection.
    Active,

    /// A detection was accepted or the scan was stopped.
    Completed,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Idle => write!(f, "Idle"),
            SessionState::AwaitingPermission => write!(f, "AwaitingPermission"),
            SessionState::Active => write!(f, "Active"),
            SessionState::Completed => write!(f, "Completed"),
        }
    }
}

// =============================================================================
// Detection Disposition
// =============================================================================

/// What the session decided to do with a detection event.
///
/// Detections are never errors: a burst from a stationary code is expected
/// traffic, so ignored events carry a reason instead of unwinding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionDisposition {
    /// First detection of this Active period - the session is now Completed
    /// and the contained input should be submitted for resolution.
    Accepted(RawInput),

    /// The session is not Active (already completed, stopped, or idle).
    IgnoredInactive,

    /// Same payload as the previous acceptance, within the debounce window.
    IgnoredDebounced,

    /// Blank payload (some scanners emit empty reads); the session stays
    /// Active awaiting a real detection.
    IgnoredEmpty,
}

// =============================================================================
// Scan Session
// =============================================================================

/// One activation-to-deactivation lifecycle of the camera scanner.
///
/// ## Invariants
/// - Exactly one `RawInput` is accepted per Active period
/// - An accepted `RawInput` is never empty (blank reads keep the session
///   Active)
/// - No detection is accepted once the state is Completed
/// - The debounce memory survives `reset()` so a stationary code cannot
///   double-submit across back-to-back sessions
#[derive(Debug, Clone)]
pub struct ScanSession {
    /// Session id, regenerated on every `start()` (used for log correlation).
    id: Uuid,

    state: SessionState,

    /// Payload and timestamp of the most recent acceptance.
    last_accepted: Option<(String, Instant)>,
}

impl ScanSession {
    /// Creates an idle session.
    pub fn new() -> Self {
        ScanSession {
            id: Uuid::new_v4(),
            state: SessionState::Idle,
            last_accepted: None,
        }
    }

    /// Returns the current session id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Begins a scan cycle.
    ///
    /// ## Idempotency
    /// A no-op while AwaitingPermission or Active - pressing "Start Scan"
    /// twice must not restart the camera. From Idle or Completed a fresh
    /// cycle begins with a new session id.
    ///
    /// Returns `true` if a new cycle actually started.
    pub fn start(&mut self) -> bool {
        match self.state {
            SessionState::AwaitingPermission | SessionState::Active => false,
            SessionState::Idle | SessionState::Completed => {
                self.id = Uuid::new_v4();
                self.state = SessionState::AwaitingPermission;
                true
            }
        }
    }

    /// Records that the permission gate granted access; the camera may go live.
    pub fn granted(&mut self) -> CoreResult<()> {
        match self.state {
            SessionState::AwaitingPermission => {
                self.state = SessionState::Active;
                Ok(())
            }
            other => Err(CoreError::InvalidTransition {
                state: other.to_string(),
                event: "granted".to_string(),
            }),
        }
    }

    /// Records that the permission gate denied access.
    ///
    /// The camera never activated, so the cycle folds straight back to Idle
    /// and the caller surfaces a user-visible message.
    pub fn denied(&mut self) -> CoreResult<()> {
        match self.state {
            SessionState::AwaitingPermission => {
                self.state = SessionState::Idle;
                Ok(())
            }
            other => Err(CoreError::InvalidTransition {
                state: other.to_string(),
                event: "denied".to_string(),
            }),
        }
    }

    /// Handles one detection event from the scanner.
    ///
    /// `at` is the caller-observed timestamp of the event; it drives the
    /// debounce comparison against the previous acceptance.
    pub fn detection(&mut self, payload: &str, at: Instant) -> DetectionDisposition {
        if self.state != SessionState::Active {
            return DetectionDisposition::IgnoredInactive;
        }

        // An acceptance always carries a usable payload: blank reads must
        // not complete the session or reach the submission boundary.
        if payload.trim().is_empty() {
            return DetectionDisposition::IgnoredEmpty;
        }

        if let Some((ref last, accepted_at)) = self.last_accepted {
            if last == payload && at.duration_since(accepted_at) < DETECTION_DEBOUNCE {
                return DetectionDisposition::IgnoredDebounced;
            }
        }

        self.last_accepted = Some((payload.to_string(), at));
        self.state = SessionState::Completed;
        DetectionDisposition::Accepted(RawInput::new(payload, InputOrigin::Camera))
    }

    /// Forces the session to Completed.
    ///
    /// Synchronous with respect to the caller: once this returns, every
    /// subsequent detection reports [`DetectionDisposition::IgnoredInactive`].
    /// A no-op outside AwaitingPermission/Active.
    pub fn stop(&mut self) {
        if matches!(
            self.state,
            SessionState::AwaitingPermission | SessionState::Active
        ) {
            self.state = SessionState::Completed;
        }
    }

    /// Returns the session to Idle, keeping the debounce memory.
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
    }
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn active_session() -> ScanSession {
        let mut s = ScanSession::new();
        assert!(s.start());
        s.granted().unwrap();
        s
    }

    #[test]
    fn test_start_is_idempotent_while_pending_or_active() {
        let mut s = ScanSession::new();
        assert!(s.start());
        let first_id = s.id();
        assert!(!s.start()); // AwaitingPermission: no-op
        s.granted().unwrap();
        assert!(!s.start()); // Active: no-op
        assert_eq!(s.id(), first_id);
    }

    #[test]
    fn test_granted_requires_awaiting_permission() {
        let mut s = ScanSession::new();
        let err = s.granted().unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
    }

    #[test]
    fn test_denied_folds_back_to_idle() {
        let mut s = ScanSession::new();
        s.start();
        s.denied().unwrap();
        assert_eq!(s.state(), SessionState::Idle);
    }

    #[test]
    fn test_exactly_one_detection_accepted_per_active_period() {
        let mut s = active_session();
        let t = Instant::now();

        let first = s.detection("herb_1", t);
        assert!(matches!(first, DetectionDisposition::Accepted(_)));
        assert_eq!(s.state(), SessionState::Completed);

        // Scanner refires for the stationary code - already Completed
        let second = s.detection("herb_1", t + Duration::from_millis(50));
        assert_eq!(second, DetectionDisposition::IgnoredInactive);
    }

    #[test]
    fn test_accepted_input_carries_camera_origin() {
        let mut s = active_session();
        match s.detection("herb_1", Instant::now()) {
            DetectionDisposition::Accepted(raw) => {
                assert_eq!(raw.text(), "herb_1");
                assert_eq!(raw.origin(), InputOrigin::Camera);
            }
            other => panic!("expected acceptance, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_detection_keeps_session_active() {
        let mut s = active_session();
        let t = Instant::now();

        // Empty reads from the scanner never complete the session
        assert_eq!(s.detection("", t), DetectionDisposition::IgnoredEmpty);
        assert_eq!(
            s.detection("   \n", t + Duration::from_millis(10)),
            DetectionDisposition::IgnoredEmpty
        );
        assert_eq!(s.state(), SessionState::Active);

        // A real payload afterwards is still accepted
        let real = s.detection("herb_1", t + Duration::from_millis(20));
        assert!(matches!(real, DetectionDisposition::Accepted(_)));
        assert_eq!(s.state(), SessionState::Completed);
    }

    #[test]
    fn test_stop_completes_and_blocks_later_detections() {
        let mut s = active_session();
        s.stop();
        assert_eq!(s.state(), SessionState::Completed);
        assert_eq!(
            s.detection("herb_1", Instant::now()),
            DetectionDisposition::IgnoredInactive
        );
    }

    #[test]
    fn test_stop_is_a_noop_when_idle() {
        let mut s = ScanSession::new();
        s.stop();
        assert_eq!(s.state(), SessionState::Idle);
    }

    #[test]
    fn test_same_payload_debounced_across_restart() {
        let mut s = active_session();
        let t = Instant::now();
        assert!(matches!(
            s.detection("herb_1", t),
            DetectionDisposition::Accepted(_)
        ));

        // Immediate restart while the same code is still in frame
        s.reset();
        s.start();
        s.granted().unwrap();
        assert_eq!(
            s.detection("herb_1", t + Duration::from_millis(100)),
            DetectionDisposition::IgnoredDebounced
        );

        // Well past the window the same payload is a deliberate rescan
        let late = s.detection("herb_1", t + DETECTION_DEBOUNCE + Duration::from_millis(1));
        assert!(matches!(late, DetectionDisposition::Accepted(_)));
    }

    #[test]
    fn test_different_payload_not_debounced() {
        let mut s = active_session();
        let t = Instant::now();
        assert!(matches!(
            s.detection("herb_1", t),
            DetectionDisposition::Accepted(_)
        ));

        s.reset();
        s.start();
        s.granted().unwrap();
        let other = s.detection("herb_2", t + Duration::from_millis(100));
        assert!(matches!(other, DetectionDisposition::Accepted(_)));
    }

    #[test]
    fn test_restart_after_completion_issues_new_id() {
        let mut s = active_session();
        let first_id = s.id();
        s.detection("herb_1", Instant::now());
        assert!(s.start());
        assert_ne!(s.id(), first_id);
        assert_eq!(s.state(), SessionState::AwaitingPermission);
    }
}
