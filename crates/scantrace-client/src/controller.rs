//! # Scan Controller
//!
//! Orchestrates the whole pipeline: permission gate → camera session →
//! normalization → resolution → presentation.
//!
//! ## Control Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Scan Controller Flow                              │
//! │                                                                         │
//! │  start_scan()                          submit_manual(text)             │
//! │       │                                      │                          │
//! │       ▼                                      │                          │
//! │  PermissionGate.request() ── Denied ──► Failure shown, back to Idle    │
//! │       │ Granted                              │                          │
//! │       ▼                                      │                          │
//! │  camera activate, await ONE detection        │                          │
//! │  (debounced; stop() cancels the wait)        │                          │
//! │       │ RawInput                             │ RawInput                 │
//! │       └──────────────┬───────────────────────┘                          │
//! │                      ▼                                                  │
//! │              normalize() → CanonicalKey                                │
//! │                      ▼                                                  │
//! │              seq = next submission number                              │
//! │              display := (seq, Loading)                                 │
//! │                      ▼                                                  │
//! │              Resolver.resolve(key)  .... suspends ....                  │
//! │                      ▼                                                  │
//! │              apply outcome IF seq is still the latest issued           │
//! │              (older in-flight results are discarded - last             │
//! │               submission wins, enforced by number, not by luck)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Resource Rules
//! - The camera is exclusively owned by the controller while Active and is
//!   released on: explicit stop, accepted detection, scanner exhaustion.
//! - `stop_scan()` completes the session synchronously; a detection already
//!   queued behind the lock is ignored by the state machine afterwards.
//! - Stopping never cancels an in-flight resolution; its outcome still
//!   passes through the sequence guard like any other.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use scantrace_core::{
    normalize, present, DetectionDisposition, InputOrigin, LookupOutcome, PermissionState,
    RawInput, ScanSession, ScanView, SessionState,
};

use crate::error::{ClientError, ClientResult};
use crate::gate::PermissionGate;
use crate::resolver::Resolver;

// =============================================================================
// Camera Scanner Seam
// =============================================================================

/// The camera capture session, as the controller sees it.
///
/// Implemented by the embedding front-end (a real camera, or a line source
/// in the CLI). All methods take `&self` so the scanner can be shared with
/// the task driving the scan loop.
#[async_trait]
pub trait CameraScanner: Send + Sync {
    /// Brings the capture session up.
    async fn activate(&self) -> ClientResult<()>;

    /// Suspends until the scanner fires, returning the detected payload.
    /// `None` means the source is exhausted (camera torn down).
    async fn next_detection(&self) -> Option<String>;

    /// Tears the capture session down. Must be safe to call repeatedly.
    fn release(&self);
}

// =============================================================================
// Display State
// =============================================================================

/// Sequence-guarded display state.
///
/// `issued` is the number of the newest submission; an outcome may only be
/// applied while its own number still equals `issued`. This is the explicit
/// last-submission-wins rule - a slow response from an old submission can
/// never overwrite a newer one, regardless of scheduling.
#[derive(Debug, Default)]
struct DisplayState {
    issued: u64,
    current: Option<(u64, LookupOutcome)>,
}

// =============================================================================
// Scan Controller
// =============================================================================

/// Coordinates one scan/lookup pipeline instance.
pub struct ScanController {
    session: Mutex<ScanSession>,
    gate: Arc<PermissionGate>,
    resolver: Arc<dyn Resolver>,
    display: Mutex<DisplayState>,

    /// Cancellation signal for the scan loop currently awaiting a detection.
    cancel: Mutex<Option<watch::Sender<bool>>>,
}

impl ScanController {
    /// Creates a controller over a permission gate and a resolver.
    pub fn new(gate: Arc<PermissionGate>, resolver: Arc<dyn Resolver>) -> Self {
        ScanController {
            session: Mutex::new(ScanSession::new()),
            gate,
            resolver,
            display: Mutex::new(DisplayState::default()),
            cancel: Mutex::new(None),
        }
    }

    // =========================================================================
    // Read Side
    // =========================================================================

    /// Returns the scan session state.
    pub fn session_state(&self) -> SessionState {
        self.session.lock().expect("session poisoned").state()
    }

    /// Returns the camera permission state (owned by the gate).
    pub fn permission_state(&self) -> PermissionState {
        self.gate.state()
    }

    /// Returns the current lookup outcome, if any submission happened yet.
    pub fn outcome(&self) -> Option<LookupOutcome> {
        self.display
            .lock()
            .expect("display poisoned")
            .current
            .as_ref()
            .map(|(_, outcome)| outcome.clone())
    }

    /// Returns the view to display for the current outcome.
    pub fn view(&self) -> Option<ScanView> {
        self.outcome().map(|outcome| present::view(&outcome))
    }

    // =========================================================================
    // Scan Side
    // =========================================================================

    /// Runs one scan session: permission, camera, one detection, resolution.
    ///
    /// Idempotent: returns immediately if a session is already pending or
    /// active. Resolves (or fails) the detection before returning; callers
    /// that need a responsive UI drive this from its own task and use
    /// [`stop_scan`](Self::stop_scan) to interrupt the detection wait.
    pub async fn start_scan(&self, scanner: Arc<dyn CameraScanner>) -> ClientResult<()> {
        let cancel_rx = {
            let mut session = self.session.lock().expect("session poisoned");
            if !session.start() {
                debug!(state = %session.state(), "start_scan ignored: session already running");
                return Ok(());
            }
            info!(session_id = %session.id(), "Scan session starting");

            // Install the cancel channel before any suspension so stop_scan()
            // always has something to signal.
            let (tx, rx) = watch::channel(false);
            *self.cancel.lock().expect("cancel poisoned") = Some(tx);
            rx
        };

        // Permission first; the camera must not activate without it
        match self.gate.request().await {
            PermissionState::Granted => {}
            _ => {
                self.abort_awaiting_permission();
                *self.cancel.lock().expect("cancel poisoned") = None;
                let seq = self.begin_submission();
                self.apply_outcome(
                    seq,
                    LookupOutcome::Failure(ClientError::PermissionDenied.to_string()),
                );
                return Err(ClientError::PermissionDenied);
            }
        }

        {
            let mut session = self.session.lock().expect("session poisoned");
            if session.state() != SessionState::AwaitingPermission {
                // stop_scan() won the race while we waited on the gate
                debug!("Scan stopped while awaiting permission");
                drop(session);
                *self.cancel.lock().expect("cancel poisoned") = None;
                return Ok(());
            }
            session.granted().map_err(ClientError::from)?;
        }

        if let Err(err) = scanner.activate().await {
            warn!(error = %err, "Camera activation failed");
            self.session.lock().expect("session poisoned").stop();
            *self.cancel.lock().expect("cancel poisoned") = None;
            let seq = self.begin_submission();
            self.apply_outcome(seq, LookupOutcome::Failure(err.to_string()));
            return Err(err);
        }

        let accepted = self.await_detection(scanner.as_ref(), cancel_rx).await;

        // Camera release on every exit path: stop, acceptance, exhaustion
        scanner.release();
        *self.cancel.lock().expect("cancel poisoned") = None;
        self.session.lock().expect("session poisoned").stop();

        if let Some(raw) = accepted {
            self.submit_input(raw).await;
        }
        Ok(())
    }

    /// Waits for the first accepted detection, honoring debounce and stop.
    async fn await_detection(
        &self,
        scanner: &dyn CameraScanner,
        mut cancel_rx: watch::Receiver<bool>,
    ) -> Option<RawInput> {
        loop {
            tokio::select! {
                _ = cancel_rx.changed() => {
                    debug!("Detection wait cancelled");
                    return None;
                }
                detection = scanner.next_detection() => {
                    let payload = detection?;
                    let disposition = self
                        .session
                        .lock()
                        .expect("session poisoned")
                        .detection(&payload, Instant::now());
                    match disposition {
                        DetectionDisposition::Accepted(raw) => {
                            info!(origin = %raw.origin(), "Detection accepted");
                            return Some(raw);
                        }
                        DetectionDisposition::IgnoredDebounced => {
                            debug!("Detection debounced (stationary code refire)");
                        }
                        DetectionDisposition::IgnoredEmpty => {
                            debug!("Blank detection ignored");
                        }
                        DetectionDisposition::IgnoredInactive => return None,
                    }
                }
            }
        }
    }

    /// Stops the active scan session.
    ///
    /// Synchronous guarantee: the session is Completed before this returns,
    /// so no detection arriving afterwards can be accepted. The camera wait
    /// is woken and releases the capture session; an in-flight resolution is
    /// deliberately left to finish (the sequence guard handles its outcome).
    pub fn stop_scan(&self) {
        self.session.lock().expect("session poisoned").stop();
        if let Some(tx) = self.cancel.lock().expect("cancel poisoned").take() {
            let _ = tx.send(true);
        }
    }

    /// Returns the session to Idle, ready for the next cycle.
    pub fn reset(&self) {
        self.session.lock().expect("session poisoned").reset();
    }

    // =========================================================================
    // Submission Side
    // =========================================================================

    /// Submits manually entered text for resolution.
    ///
    /// Empty (or whitespace-only) text is rejected here, at the submission
    /// boundary - the normalizer itself stays total.
    pub async fn submit_manual(&self, text: &str) -> ClientResult<()> {
        let raw = RawInput::submitted(text, InputOrigin::ManualPaste)?;
        self.submit_input(raw).await;
        Ok(())
    }

    /// Normalizes and resolves one input, applying the outcome under the
    /// sequence guard.
    async fn submit_input(&self, raw: RawInput) {
        let key = normalize(&raw);
        let seq = self.begin_submission();
        info!(seq, origin = %raw.origin(), key = %key, "Submitting lookup");

        let outcome = self.resolver.resolve(&key).await;

        if !self.apply_outcome(seq, outcome) {
            debug!(seq, "Discarding outcome superseded by a newer submission");
        }
    }

    /// Issues the next submission number and shows Loading for it.
    fn begin_submission(&self) -> u64 {
        let mut display = self.display.lock().expect("display poisoned");
        display.issued += 1;
        let seq = display.issued;
        display.current = Some((seq, LookupOutcome::Loading));
        seq
    }

    /// Applies an outcome if its submission is still the latest issued.
    fn apply_outcome(&self, seq: u64, outcome: LookupOutcome) -> bool {
        let mut display = self.display.lock().expect("display poisoned");
        if seq == display.issued {
            display.current = Some((seq, outcome));
            true
        } else {
            false
        }
    }

    /// Folds an AwaitingPermission session back to Idle after a denial.
    fn abort_awaiting_permission(&self) {
        let mut session = self.session.lock().expect("session poisoned");
        if session.state() == SessionState::AwaitingPermission {
            // denied() cannot fail from AwaitingPermission
            let _ = session.denied();
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
