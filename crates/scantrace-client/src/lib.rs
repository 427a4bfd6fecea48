//! # scantrace-client: Resolution & Host Interaction for ScanTrace
//!
//! This crate owns everything that touches the outside world: the HTTP
//! resolution client, the host permission prompt, the camera seam, and the
//! configuration that points them at a deployment.
//!
//! ## Module Organization
//! ```text
//! scantrace_client/
//! ├── lib.rs          ◄─── You are here (exports)
//! ├── controller.rs   ◄─── ScanController: pipeline orchestration,
//! │                        last-submission-wins sequence guard
//! ├── resolver.rs     ◄─── ResolutionClient: POST {base}/scan + classify
//! ├── gate.rs         ◄─── PermissionGate: coalesced host prompts
//! ├── config.rs       ◄─── Layered config (override > env > file > default)
//! └── error.rs        ◄─── ClientError taxonomy
//! ```
//!
//! ## Trait Seams
//! Three traits isolate the host so the whole pipeline runs under test
//! without a camera, a permission dialog, or a server:
//!
//! - [`CameraScanner`] - the capture session (real camera, or a line source)
//! - [`PermissionHost`] - the host permission dialog
//! - [`Resolver`] - the network resolution (faked with scripted delays to
//!   exercise submission ordering)
//!
//! ## Quick Start
//! ```rust,no_run
//! use std::sync::Arc;
//! use scantrace_client::{ClientConfig, PermissionGate, ResolutionClient, ScanController};
//! # use scantrace_client::gate::{PermissionHost, PromptResponse};
//! # struct AlwaysGranted;
//! # #[async_trait::async_trait]
//! # impl PermissionHost for AlwaysGranted {
//! #     async fn prompt(&self) -> PromptResponse { PromptResponse::granted() }
//! # }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::load_or_default(None);
//! let resolver = Arc::new(ResolutionClient::new(&config)?);
//! let gate = Arc::new(PermissionGate::new(Arc::new(AlwaysGranted)));
//! let controller = ScanController::new(gate, resolver);
//!
//! controller.submit_manual("https://host/p/abc123").await?;
//! println!("{:?}", controller.view());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod gate;
pub mod resolver;

pub use config::{ClientConfig, DeployTarget};
pub use controller::{CameraScanner, ScanController};
pub use error::{ClientError, ClientResult};
pub use gate::{PermissionGate, PermissionHost, PromptResponse};
pub use resolver::{ResolutionClient, Resolver};
