//! # ScanTrace CLI Entry Point
//!
//! Thin terminal front-end for the scan→resolve→render pipeline.
//!
//! ## Usage
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         scantrace CLI                                   │
//! │                                                                         │
//! │  One-shot manual lookup (the "paste" path):                            │
//! │    $ scantrace resolve 'https://host/p/abc123'                         │
//! │                                                                         │
//! │  Line-source scanning (each stdin line = one detection event):         │
//! │    $ qr-reader | scantrace scan                                        │
//! │                                                                         │
//! │  Point at a different deployment without rebuilding:                   │
//! │    $ scantrace --base-url http://192.168.1.50:3000 resolve herb_42     │
//! │    $ scantrace --target android-emulator resolve herb_42               │
//! │                                                                         │
//! │  Make the override stick for future runs:                              │
//! │    $ scantrace --base-url http://192.168.1.50:3000 --save-config \     │
//! │        resolve herb_42                                                 │
//! │                                                                         │
//! │  RUST_LOG=scantrace=debug for pipeline tracing.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Load config (file + env), apply flag overrides
//! 3. Build PermissionGate, ResolutionClient, ScanController
//! 4. Run the requested command and render the final view

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use scantrace_client::gate::{PermissionHost, PromptResponse};
use scantrace_client::{
    CameraScanner, ClientConfig, ClientResult, PermissionGate, ResolutionClient, ScanController,
};
use scantrace_core::ScanView;

// =============================================================================
// CLI Definition
// =============================================================================

#[derive(Debug, Parser)]
#[command(name = "scantrace", about = "Resolve scanned identifiers against a lookup service")]
struct Cli {
    /// Override the lookup base URL (beats env, file, and target default)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Deploy target: host | android-emulator
    #[arg(long, global = true)]
    target: Option<String>,

    /// Bearer token for the lookup service (from the login collaborator)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Config file path (default: platform config dir / scantrace.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Persist the effective settings (after flag overrides) to the
    /// config file, so future runs pick them up without flags
    #[arg(long, global = true)]
    save_config: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve one identifier entered manually
    Resolve {
        /// Raw text: a bare id, a product URL, or a JSON payload
        input: String,
    },

    /// Treat each stdin line as a scanner detection and resolve them
    Scan,
}

// =============================================================================
// Host Adapters
// =============================================================================

/// Terminal permission host: there is no OS camera dialog to show, so the
/// "camera" (stdin) is always available.
struct TerminalHost;

#[async_trait]
impl PermissionHost for TerminalHost {
    async fn prompt(&self) -> PromptResponse {
        PromptResponse::granted()
    }
}

/// Line-source scanner: each stdin line is one detection event.
struct LineScanner {
    lines: tokio::sync::Mutex<Lines<BufReader<Stdin>>>,
    exhausted: AtomicBool,
}

impl LineScanner {
    fn new() -> Arc<Self> {
        Arc::new(LineScanner {
            lines: tokio::sync::Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
            exhausted: AtomicBool::new(false),
        })
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CameraScanner for LineScanner {
    async fn activate(&self) -> ClientResult<()> {
        debug!("Line scanner active; waiting for input");
        Ok(())
    }

    async fn next_detection(&self) -> Option<String> {
        let mut lines = self.lines.lock().await;
        match lines.next_line().await {
            Ok(Some(line)) => Some(line),
            Ok(None) | Err(_) => {
                self.exhausted.store(true, Ordering::SeqCst);
                None
            }
        }
    }

    fn release(&self) {
        debug!("Line scanner released");
    }
}

// =============================================================================
// Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {}", err);
            return ExitCode::FAILURE;
        }
    };
    if cli.save_config {
        if let Err(err) = config.save(cli.config.clone()) {
            eprintln!("configuration error: {}", err);
            return ExitCode::FAILURE;
        }
    }
    info!(base_url = %config.base_url(), "ScanTrace starting");

    let resolver = match ResolutionClient::new(&config) {
        Ok(resolver) => Arc::new(resolver),
        Err(err) => {
            eprintln!("configuration error: {}", err);
            return ExitCode::FAILURE;
        }
    };
    let gate = Arc::new(PermissionGate::new(Arc::new(TerminalHost)));
    let controller = ScanController::new(gate, resolver);

    match cli.command {
        Command::Resolve { input } => run_resolve(&controller, &input).await,
        Command::Scan => run_scan(&controller).await,
    }
}

/// Loads the layered config and applies CLI flag overrides on top.
fn build_config(cli: &Cli) -> ClientResult<ClientConfig> {
    let mut config = ClientConfig::load(cli.config.clone())?;

    if let Some(ref target) = cli.target {
        config.deploy.target = target.parse()?;
    }
    if let Some(ref base) = cli.base_url {
        config.lookup.base_url = Some(base.clone());
    }
    if let Some(ref token) = cli.token {
        config.lookup.auth_token = Some(token.clone());
    }

    config.validate()?;
    Ok(config)
}

/// One manual submission, rendered to stdout/stderr.
async fn run_resolve(controller: &ScanController, input: &str) -> ExitCode {
    if let Err(err) = controller.submit_manual(input).await {
        eprintln!("{}", err);
        return ExitCode::FAILURE;
    }
    render(controller.view())
}

/// Reads detections from stdin until it runs dry, resolving each one.
async fn run_scan(controller: &ScanController) -> ExitCode {
    let scanner = LineScanner::new();
    let mut status = ExitCode::SUCCESS;

    loop {
        if let Err(err) = controller.start_scan(scanner.clone()).await {
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
        if scanner.is_exhausted() {
            break;
        }
        status = render(controller.view());
        controller.reset();
    }
    status
}

/// Renders the final view: payload to stdout, failures to stderr.
fn render(view: Option<ScanView>) -> ExitCode {
    match view {
        Some(ScanView::Result(payload)) => {
            println!("{}", payload);
            ExitCode::SUCCESS
        }
        Some(ScanView::Error(message)) => {
            eprintln!("lookup failed: {}", message);
            ExitCode::FAILURE
        }
        // A finished submission is never still Loading; no submission at
        // all (EOF before any detection) is a quiet success.
        Some(ScanView::Loading) | None => ExitCode::SUCCESS,
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=scantrace=trace` - Show trace for scantrace crates only
/// - Default: WARN (stdout belongs to the rendered payload)
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
