//! # Resolution Client
//!
//! Sends a canonical key to the remote lookup service and classifies the
//! answer.
//!
//! ## Resolution Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Resolution Flow                                  │
//! │                                                                         │
//! │  CanonicalKey "herb_9c1"                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  POST {base}/scan                                                      │
//! │  Content-Type: application/json                                        │
//! │  Authorization: Bearer <token>        (only if the login collaborator  │
//! │  {"data": "herb_9c1"}                  supplied one)                   │
//! │       │                                                                 │
//! │       ├── transport fault ───► Failure(fault description)              │
//! │       │   (unreachable, DNS, timeout, broken framing)                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  read full body as text                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  classify_response(status.is_success(), body)   ◄── scantrace-core     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  LookupOutcome::{Success, Failure}                                     │
//! │                                                                         │
//! │  INVARIANT: resolve() never returns Err - every fault becomes a        │
//! │  displayable Failure outcome.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use scantrace_core::{classify_response, CanonicalKey, LookupOutcome};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

// =============================================================================
// Resolver Trait
// =============================================================================

/// The seam between the controller and the network.
///
/// Production code uses [`ResolutionClient`]; controller tests inject fakes
/// with scripted delays to exercise the last-submission-wins guard.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Resolves a canonical key to a lookup outcome. Never fails: transport
    /// faults come back as `LookupOutcome::Failure`.
    async fn resolve(&self, key: &CanonicalKey) -> LookupOutcome;
}

// =============================================================================
// Wire Types
// =============================================================================

/// Request body for `POST {base}/scan`.
#[derive(Debug, Serialize)]
struct ScanRequest<'a> {
    data: &'a str,
}

// =============================================================================
// Resolution Client
// =============================================================================

/// HTTP client for the remote lookup service.
pub struct ResolutionClient {
    http: reqwest::Client,
    endpoint: String,
    auth_token: Option<String>,
    timeout_secs: u64,
}

impl ResolutionClient {
    /// Creates a resolution client from configuration.
    ///
    /// The base address comes entirely from config (override, environment,
    /// file, or deploy-target default) - this component never computes it.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::Internal(format!("HTTP client build failed: {}", e)))?;

        let base = config.base_url().trim_end_matches('/');

        Ok(ResolutionClient {
            http,
            endpoint: format!("{}/scan", base),
            auth_token: config.auth_token().map(String::from),
            timeout_secs: config.lookup.timeout_secs,
        })
    }

    /// Returns the full resolution endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Describes a transport fault in user-displayable form.
    fn describe_fault(&self, err: &reqwest::Error) -> String {
        if err.is_timeout() {
            ClientError::Timeout(self.timeout_secs).to_string()
        } else if err.is_connect() {
            format!("Could not reach the lookup service: {}", err)
        } else {
            err.to_string()
        }
    }
}

#[async_trait]
impl Resolver for ResolutionClient {
    async fn resolve(&self, key: &CanonicalKey) -> LookupOutcome {
        debug!(key = %key, endpoint = %self.endpoint, "Resolving key");

        let mut request = self
            .http
            .post(&self.endpoint)
            .json(&ScanRequest { data: key.as_str() });

        if let Some(ref token) = self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                let message = self.describe_fault(&err);
                warn!(key = %key, error = %message, "Transport fault during resolution");
                return LookupOutcome::Failure(message);
            }
        };

        let status_success = response.status().is_success();
        let status = response.status();

        // Read the full body as text first; classification decides whether
        // it is structured data (rules 1-6 in scantrace-core)
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                let message = self.describe_fault(&err);
                warn!(key = %key, error = %message, "Failed to read response body");
                return LookupOutcome::Failure(message);
            }
        };

        let outcome = classify_response(status_success, &body);
        match &outcome {
            LookupOutcome::Success(_) => debug!(key = %key, %status, "Lookup succeeded"),
            LookupOutcome::Failure(msg) => {
                debug!(key = %key, %status, message = %msg, "Lookup failed")
            }
            LookupOutcome::Loading => unreachable!("classify_response never yields Loading"),
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeployTarget;

    #[test]
    fn test_endpoint_is_base_plus_scan() {
        let mut config = ClientConfig::default();
        config.lookup.base_url = Some("http://192.168.1.50:3000".to_string());
        let client = ResolutionClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://192.168.1.50:3000/scan");
    }

    #[test]
    fn test_endpoint_tolerates_trailing_slash() {
        let mut config = ClientConfig::default();
        config.lookup.base_url = Some("http://host:3000/".to_string());
        let client = ResolutionClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://host:3000/scan");
    }

    #[test]
    fn test_endpoint_follows_deploy_target_default() {
        let mut config = ClientConfig::default();
        config.deploy.target = DeployTarget::AndroidEmulator;
        let client = ResolutionClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://10.0.2.2:3000/scan");
    }

    #[test]
    fn test_invalid_config_is_rejected_at_construction() {
        let mut config = ClientConfig::default();
        config.lookup.base_url = Some("ftp://host".to_string());
        assert!(ResolutionClient::new(&config).is_err());
    }

    #[test]
    fn test_scan_request_wire_shape() {
        let body = serde_json::to_string(&ScanRequest { data: "herb_9c1" }).unwrap();
        assert_eq!(body, r#"{"data":"herb_9c1"}"#);
    }
}
