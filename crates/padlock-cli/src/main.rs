//! `padlock` command-line tool
//!
//! Locks or unlocks a known Bluetooth padlock and reports the resulting
//! state to the configured notification endpoint.

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use padlock_client::LockClient;
use padlock_core::{DeviceAddress, DeviceStatus};
use padlock_notify::{LockEvent, NotifyClient};
use padlock_transport::BtleTransport;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::CliConfig;

#[derive(Parser)]
#[command(name = "padlock")]
#[command(about = "Lock and unlock Bluetooth padlocks")]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "padlock.toml")]
    config: PathBuf,

    /// Device address, overrides `[device] address`
    #[arg(short, long)]
    device: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the shackle
    Unlock {
        /// Six-digit password, overrides `[device] password`
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Close the shackle and verify it latched
    Lock,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether the operation produced a device status.
async fn run(cli: Cli) -> Result<bool> {
    let config = CliConfig::load(&cli.config)?;
    let address = config.resolve_address(cli.device.as_deref())?;

    let transport = match BtleTransport::new().await {
        Ok(transport) => transport,
        Err(e) => {
            warn!("Radio gate closed: {}", e);
            println!("Bluetooth unavailable");
            return Ok(false);
        }
    };

    let client = LockClient::new(transport, config.client.clone())
        .context("invalid [client] configuration")?;

    let (event, status) = match &cli.command {
        Commands::Unlock { password } => {
            let password = config.resolve_password(password.as_deref());
            let status = client.unlock(&address, password).await?;
            (LockEvent::Unlocked, status)
        }
        Commands::Lock => (LockEvent::Locked, client.lock(&address).await?),
    };

    let Some(status) = status else {
        println!("{}: no result", address);
        return Ok(false);
    };
    println!("{}: {}", address, status);

    if event.confirmed_by(&status) {
        report(&config, event, &address, &status).await;
    }
    Ok(true)
}

async fn report(config: &CliConfig, event: LockEvent, address: &DeviceAddress, status: &DeviceStatus) {
    let Some(notify_config) = &config.notify else {
        info!("No [notify] section, skipping {} report", event.path());
        return;
    };

    match NotifyClient::new(notify_config) {
        Ok(notifier) => {
            let outcome = notifier.notify(event, address, status).await;
            println!("notify: {}", outcome);
        }
        Err(e) => {
            warn!("Notification client unavailable: {}", e);
            println!("notify: not sent ({})", e);
        }
    }
}
