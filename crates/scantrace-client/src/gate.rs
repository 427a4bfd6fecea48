//! # Permission Gate
//!
//! Tracks and requests camera authorization from the host.
//!
//! ## Request Coalescing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Permission Request Flow                              │
//! │                                                                         │
//! │  Caller A: request() ──► acquire prompt lock ──► state Unknown         │
//! │                                │                     │                  │
//! │  Caller B: request() ──► (parked on lock)            ▼                  │
//! │                                │              host prompt (ONE dialog)  │
//! │                                │                     │                  │
//! │                                │              state := Granted          │
//! │                                ▼                     │                  │
//! │            acquires lock, sees Granted ◄─────────────┘                  │
//! │            returns WITHOUT prompting                                    │
//! │                                                                         │
//! │  INVARIANTS                                                            │
//! │  • At most one host prompt is in flight at any moment                  │
//! │  • A resolved request() never leaves the state Unknown                 │
//! │  • After Denied with can_ask_again=false, request() returns Denied     │
//! │    without prompting again (the host advised not to re-ask)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The gate is the sole owner of [`PermissionState`]; the scan controller
//! reads it through the gate before activating the camera.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::{debug, info};

use scantrace_core::PermissionState;

// =============================================================================
// Permission Host
// =============================================================================

/// The host's answer to a permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptResponse {
    /// Whether camera access was granted.
    pub granted: bool,

    /// Whether the host is willing to show the prompt again later.
    /// When false after a denial, the gate stops re-prompting.
    pub can_ask_again: bool,
}

impl PromptResponse {
    /// A granted response.
    pub fn granted() -> Self {
        PromptResponse {
            granted: true,
            can_ask_again: true,
        }
    }

    /// A denial; `can_ask_again` controls whether later requests re-prompt.
    pub fn denied(can_ask_again: bool) -> Self {
        PromptResponse {
            granted: false,
            can_ask_again,
        }
    }
}

/// Host-side permission prompt.
///
/// Implemented by the embedding front-end; tests inject fakes to script
/// grant/deny sequences.
#[async_trait]
pub trait PermissionHost: Send + Sync {
    /// Shows the host permission prompt and suspends until the user answers.
    async fn prompt(&self) -> PromptResponse;
}

// =============================================================================
// Permission Gate
// =============================================================================

#[derive(Debug, Clone, Copy)]
struct GateSnapshot {
    state: PermissionState,
    can_ask_again: bool,
}

/// Tracks camera authorization and serializes host prompts.
pub struct PermissionGate {
    host: Arc<dyn PermissionHost>,

    /// Serializes prompts: only the lock holder may talk to the host.
    prompt_lock: tokio::sync::Mutex<()>,

    /// Readable snapshot for synchronous `state()` queries.
    snapshot: Mutex<GateSnapshot>,
}

impl PermissionGate {
    /// Creates a gate over the given host, starting from Unknown.
    pub fn new(host: Arc<dyn PermissionHost>) -> Self {
        PermissionGate {
            host,
            prompt_lock: tokio::sync::Mutex::new(()),
            snapshot: Mutex::new(GateSnapshot {
                state: PermissionState::Unknown,
                can_ask_again: true,
            }),
        }
    }

    /// Returns the current permission state.
    pub fn state(&self) -> PermissionState {
        self.snapshot.lock().expect("gate snapshot poisoned").state
    }

    /// Requests camera authorization, prompting the host if needed.
    ///
    /// Suspends until the host responds. Concurrent calls are serialized:
    /// a caller that acquires the lock after another caller resolved the
    /// state returns that state without a second prompt. Never returns
    /// Unknown.
    pub async fn request(&self) -> PermissionState {
        let _prompting = self.prompt_lock.lock().await;

        // Re-read after acquiring the lock: a concurrent caller may have
        // just resolved the state for us.
        let current = *self.snapshot.lock().expect("gate snapshot poisoned");
        match current.state {
            PermissionState::Granted => return PermissionState::Granted,
            PermissionState::Denied if !current.can_ask_again => {
                debug!("Permission previously denied and host advised not to re-ask");
                return PermissionState::Denied;
            }
            _ => {}
        }

        debug!("Prompting host for camera permission");
        let response = self.host.prompt().await;

        let state = if response.granted {
            PermissionState::Granted
        } else {
            PermissionState::Denied
        };
        info!(%state, can_ask_again = response.can_ask_again, "Permission prompt resolved");

        *self.snapshot.lock().expect("gate snapshot poisoned") = GateSnapshot {
            state,
            can_ask_again: response.can_ask_again,
        };
        state
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Scripted host: answers from a queue and counts prompts.
    struct ScriptedHost {
        responses: Mutex<Vec<PromptResponse>>,
        prompts: AtomicUsize,
        delay: Duration,
    }

    impl ScriptedHost {
        fn new(responses: Vec<PromptResponse>) -> Arc<Self> {
            Arc::new(ScriptedHost {
                responses: Mutex::new(responses),
                prompts: AtomicUsize::new(0),
                delay: Duration::from_millis(20),
            })
        }

        fn prompt_count(&self) -> usize {
            self.prompts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PermissionHost for ScriptedHost {
        async fn prompt(&self) -> PromptResponse {
            self.prompts.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(PromptResponse::denied(false))
        }
    }

    #[tokio::test]
    async fn test_request_resolves_unknown_to_granted() {
        let host = ScriptedHost::new(vec![PromptResponse::granted()]);
        let gate = PermissionGate::new(host.clone());

        assert_eq!(gate.state(), PermissionState::Unknown);
        assert_eq!(gate.request().await, PermissionState::Granted);
        assert_eq!(gate.state(), PermissionState::Granted);
        assert_eq!(host.prompt_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_requests_prompt_once() {
        let host = ScriptedHost::new(vec![PromptResponse::granted()]);
        let gate = Arc::new(PermissionGate::new(host.clone()));

        let a = tokio::spawn({
            let gate = gate.clone();
            async move { gate.request().await }
        });
        let b = tokio::spawn({
            let gate = gate.clone();
            async move { gate.request().await }
        });

        assert_eq!(a.await.unwrap(), PermissionState::Granted);
        assert_eq!(b.await.unwrap(), PermissionState::Granted);
        assert_eq!(host.prompt_count(), 1);
    }

    #[tokio::test]
    async fn test_denied_without_reask_does_not_prompt_again() {
        let host = ScriptedHost::new(vec![PromptResponse::denied(false)]);
        let gate = PermissionGate::new(host.clone());

        assert_eq!(gate.request().await, PermissionState::Denied);
        // Second request must not throw and must not re-prompt
        assert_eq!(gate.request().await, PermissionState::Denied);
        assert_eq!(host.prompt_count(), 1);
    }

    #[tokio::test]
    async fn test_denied_with_reask_may_recover() {
        // First answer: denied but re-askable; second answer: granted.
        // (The script is popped from the back.)
        let host = ScriptedHost::new(vec![PromptResponse::granted(), PromptResponse::denied(true)]);
        let gate = PermissionGate::new(host.clone());

        assert_eq!(gate.request().await, PermissionState::Denied);
        assert_eq!(gate.request().await, PermissionState::Granted);
        assert_eq!(host.prompt_count(), 2);
    }

    #[tokio::test]
    async fn test_granted_state_short_circuits() {
        let host = ScriptedHost::new(vec![PromptResponse::granted()]);
        let gate = PermissionGate::new(host.clone());

        gate.request().await;
        gate.request().await;
        gate.request().await;
        assert_eq!(host.prompt_count(), 1);
    }

    #[tokio::test]
    async fn test_request_never_leaves_unknown() {
        let host = ScriptedHost::new(vec![PromptResponse::denied(true)]);
        let gate = PermissionGate::new(host);

        let resolved = gate.request().await;
        assert_ne!(resolved, PermissionState::Unknown);
        assert_ne!(gate.state(), PermissionState::Unknown);
    }
}
