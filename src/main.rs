use credit_sync::adapters::{ConsoleDisplaySink, ReqwestHttpClient};
use credit_sync::cli::{parse_args, run_cli_command, CliCommand};
use credit_sync::client::{CreditSyncClient, InitOutcome};
use credit_sync::config::SyncConfig;
use credit_sync::display::format_credits;

use color_eyre::eyre::{eyre, Result};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}

fn build_client(config: SyncConfig) -> Result<CreditSyncClient> {
    let http = ReqwestHttpClient::with_timeout(config.request_timeout)?;
    Ok(CreditSyncClient::new(
        config,
        Arc::new(http),
        Arc::new(ConsoleDisplaySink),
    ))
}

/// Load the session, reconcile once and print where things stand.
async fn run_once(client: &CreditSyncClient) -> Result<()> {
    let outcome = client.initialize().await;
    client.stop();

    match outcome {
        InitOutcome::Ready => {
            let session = client
                .session()
                .ok_or_else(|| eyre!("session missing after initialization"))?;
            let remaining = session
                .balance
                .map(format_credits)
                .unwrap_or_else(|| "unknown balance".to_string());
            println!(
                "user {}: {} remaining, {} used of {}",
                session.user_id,
                remaining,
                session.credits_used_total,
                session.credits_original
            );
            Ok(())
        }
        InitOutcome::Disabled => {
            println!("Not signed in; nothing to sync");
            Ok(())
        }
        InitOutcome::Deferred => Err(eyre!(
            "could not reach the session endpoint at {}",
            client.config().session_status_url
        )),
        InitOutcome::AlreadyInitialized => Ok(()),
    }
}

/// Keep the balance in sync until Ctrl-C.
async fn run_until_interrupted(client: &CreditSyncClient) -> Result<()> {
    match client.initialize().await {
        InitOutcome::Disabled => {
            println!("Not signed in; nothing to sync");
            return Ok(());
        }
        InitOutcome::Deferred => {
            tracing::warn!("Session endpoint unreachable, retrying on every refresh");
        }
        InitOutcome::Ready | InitOutcome::AlreadyInitialized => {}
    }

    tracing::info!(
        "Syncing every {:?}; press Ctrl-C to stop",
        client.config().sync_interval
    );
    tokio::signal::ctrl_c().await?;
    client.stop();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let command = parse_args(std::env::args());
    if run_cli_command(&command) {
        return Ok(());
    }

    color_eyre::install()?;
    init_tracing();

    let config = SyncConfig::from_env();
    tracing::debug!(
        "Ledger at {} (mirror: {}, cache: {:?})",
        config.session_status_url,
        config.mirror_url.as_deref().unwrap_or("none"),
        config.cache_path
    );
    let client = build_client(config)?;

    match command {
        CliCommand::Once => run_once(&client).await,
        _ => run_until_interrupted(&client).await,
    }
}
