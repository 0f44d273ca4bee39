// crates/claim-gate-server/src/main.rs
// ============================================================================
// Module: Claim Gate Binary
// Description: Command-line entrypoint for the authorization gateway.
// Purpose: Load configuration, wire backends, and run the server.
// Dependencies: clap, tokio, claim-gate-config, claim-gate-providers
// ============================================================================

//! ## Overview
//! The binary loads and validates configuration, builds the HTTP clients for
//! the policy decision service and the user directory, and serves until
//! interrupted. Startup failures print one line to standard error and exit
//! nonzero; nothing is served on a partial wiring.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use claim_gate_config::ClaimGateConfig;
use claim_gate_providers::HttpDirectoryClient;
use claim_gate_providers::HttpDirectoryClientConfig;
use claim_gate_providers::HttpPolicyClient;
use claim_gate_providers::HttpPolicyClientConfig;
use claim_gate_server::AppState;
use claim_gate_server::LogDecisionAuditSink;
use claim_gate_server::NoopGatewayMetrics;
use claim_gate_server::TokenDecoder;
use claim_gate_server::serve;

// ============================================================================
// SECTION: Command Line
// ============================================================================

/// Command-line arguments for the gateway binary.
#[derive(Debug, Parser)]
#[command(name = "claim-gate", about = "Bearer-token authorization gateway")]
struct Cli {
    /// Path to a TOML configuration file; defaults plus environment
    /// overrides apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Entrypoint
// ============================================================================

/// Binary entrypoint.
#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            writeln!(io::stderr(), "claim-gate: {message}").ok();
            ExitCode::FAILURE
        }
    }
}

/// Loads configuration, wires backends, and serves until interrupted.
async fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let config = ClaimGateConfig::load(cli.config.as_deref()).map_err(|err| err.to_string())?;
    let decoder =
        TokenDecoder::from_mode(&config.auth.verification).map_err(|err| err.to_string())?;
    let policy = HttpPolicyClient::new(&HttpPolicyClientConfig {
        endpoint: config.policy.endpoint.clone(),
        timeout_ms: config.policy.timeout_ms,
        allow_http: config.policy.allow_http,
        ..HttpPolicyClientConfig::default()
    })
    .map_err(|err| err.to_string())?;
    let directory = HttpDirectoryClient::new(&HttpDirectoryClientConfig {
        endpoint: config.directory.endpoint.clone(),
        timeout_ms: config.directory.timeout_ms,
        allow_http: config.directory.allow_http,
        user_pool_id: config.directory.user_pool_id.clone(),
        ..HttpDirectoryClientConfig::default()
    })
    .map_err(|err| err.to_string())?;
    let state = AppState::new(
        config,
        Arc::new(policy),
        Arc::new(directory),
        decoder,
        Arc::new(NoopGatewayMetrics),
        Arc::new(LogDecisionAuditSink::stderr()),
    );
    serve(Arc::new(state)).await.map_err(|err| err.to_string())
}
