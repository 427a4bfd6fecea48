//! # Client Configuration
//!
//! Configuration for the resolution endpoint and deploy target.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Explicit override (highest priority)                               │
//! │     --base-url on the CLI, or base_url set programmatically            │
//! │                                                                         │
//! │  2. Environment Variables                                              │
//! │     SCANTRACE_BASE_URL=http://192.168.1.50:3000                        │
//! │     SCANTRACE_TARGET=android-emulator                                  │
//! │     SCANTRACE_TIMEOUT_SECS=10                                          │
//! │     SCANTRACE_AUTH_TOKEN=...                                           │
//! │                                                                         │
//! │  3. TOML Config File                                                   │
//! │     ~/.config/scantrace/scantrace.toml (Linux)                         │
//! │     ~/Library/Application Support/com.scantrace.app/... (macOS)        │
//! │                                                                         │
//! │  4. Platform Default (lowest priority)                                 │
//! │     android-emulator target → http://10.0.2.2:3000                     │
//! │     everything else         → http://localhost:3000                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # scantrace.toml
//! [lookup]
//! base_url = "http://192.168.1.50:3000"
//! timeout_secs = 10
//! # auth_token = "..."   # optional, supplied by the login collaborator
//!
//! [deploy]
//! target = "host"  # host | android-emulator
//! ```
//!
//! The resolution logic never computes the base address itself - swapping
//! targets or pointing at a different deployment never requires a rebuild.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};

// =============================================================================
// Deploy Target
// =============================================================================

/// Which deployment this client is running against.
///
/// The emulated-Android target cannot reach the developer machine through
/// `localhost` (that is the emulator itself); Android's emulator exposes the
/// host loopback under the `10.0.2.2` alias instead, so that target carries
/// a distinct default base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeployTarget {
    /// Running directly on the host (desktop, CI, a real device on the LAN).
    #[default]
    Host,

    /// Running inside an emulated Android deployment.
    AndroidEmulator,
}

impl DeployTarget {
    /// Returns the default lookup base URL for this target.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            DeployTarget::Host => "http://localhost:3000",
            DeployTarget::AndroidEmulator => "http://10.0.2.2:3000",
        }
    }
}

impl std::fmt::Display for DeployTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeployTarget::Host => write!(f, "host"),
            DeployTarget::AndroidEmulator => write!(f, "android-emulator"),
        }
    }
}

impl std::str::FromStr for DeployTarget {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "host" | "default" => Ok(DeployTarget::Host),
            "android-emulator" | "emulator" => Ok(DeployTarget::AndroidEmulator),
            other => Err(ClientError::InvalidConfig(format!(
                "Unknown deploy target: '{}'. Valid options: host, android-emulator",
                other
            ))),
        }
    }
}

// =============================================================================
// Lookup Settings
// =============================================================================

/// Settings for the remote lookup service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupSettings {
    /// Explicit base URL override. When unset, the deploy target's default
    /// applies.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Request deadline (seconds).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Bearer token from the login collaborator. Optional - the core works
    /// without any session.
    #[serde(default)]
    pub auth_token: Option<String>,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for LookupSettings {
    fn default() -> Self {
        LookupSettings {
            base_url: None,
            timeout_secs: default_timeout_secs(),
            auth_token: None,
        }
    }
}

// =============================================================================
// Deploy Settings
// =============================================================================

/// Deployment settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeploySettings {
    /// Deploy target for this client.
    #[serde(default)]
    pub target: DeployTarget,
}

// =============================================================================
// Main Client Configuration
// =============================================================================

/// Complete client configuration.
///
/// ## Example Config File
/// ```toml
/// [lookup]
/// base_url = "http://192.168.1.50:3000"
/// timeout_secs = 10
///
/// [deploy]
/// target = "android-emulator"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Remote lookup settings.
    #[serde(default)]
    pub lookup: LookupSettings,

    /// Deployment settings.
    #[serde(default)]
    pub deploy: DeploySettings,
}

impl ClientConfig {
    /// Creates a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (scantrace.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        // Try to load from config file
        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        // Override with environment variables
        config.apply_env_overrides();

        // Validate the configuration
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load client config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::ConfigSaveFailed("No config path available".into()))?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Client config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        // If a base URL override is set, it must be a usable http(s) URL
        if let Some(ref base) = self.lookup.base_url {
            let url = Url::parse(base)?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(ClientError::InvalidUrl(format!(
                    "Base URL must be http or https, got: {}",
                    base
                )));
            }
        }

        if self.lookup.timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // Base URL
        if let Ok(base) = std::env::var("SCANTRACE_BASE_URL") {
            debug!(base_url = %base, "Overriding base URL from environment");
            self.lookup.base_url = Some(base);
        }

        // Deploy target
        if let Ok(target) = std::env::var("SCANTRACE_TARGET") {
            match target.parse() {
                Ok(parsed) => {
                    debug!(target = %target, "Overriding deploy target from environment");
                    self.deploy.target = parsed;
                }
                Err(_) => warn!(target = %target, "Unknown deploy target in environment"),
            }
        }

        // Request timeout
        if let Ok(timeout) = std::env::var("SCANTRACE_TIMEOUT_SECS") {
            if let Ok(t) = timeout.parse::<u64>() {
                self.lookup.timeout_secs = t;
            }
        }

        // Auth token (login collaborator)
        if let Ok(token) = std::env::var("SCANTRACE_AUTH_TOKEN") {
            self.lookup.auth_token = Some(token);
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "scantrace", "app").map(|dirs| {
            let config_dir = dirs.config_dir();
            config_dir.join("scantrace.toml")
        })
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the effective lookup base URL: the explicit override when set,
    /// otherwise the deploy target's default.
    pub fn base_url(&self) -> &str {
        self.lookup
            .base_url
            .as_deref()
            .unwrap_or_else(|| self.deploy.target.default_base_url())
    }

    /// Returns the request timeout.
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.lookup.timeout_secs)
    }

    /// Returns the auth token if the login collaborator supplied one.
    pub fn auth_token(&self) -> Option<&str> {
        self.lookup.auth_token.as_deref()
    }
}
