//! keepalived-notify binary

use anyhow::Context;
use clap::Parser;
use clap::error::ErrorKind;
use hcloud::{ClientConfig, HcloudClient};
use keepalived_notify::{Cli, Config, LoggingConfig, hook};
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => Some(cli),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            eprint!("{}", e);
            None
        }
    };

    // Logging comes first so configuration problems end up in the log file
    let logging = LoggingConfig::from_env().unwrap_or_default();
    if let Err(e) = common::logging::init_with(logging.format, logging.path.as_deref()) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    info!(args = ?std::env::args().skip(1).collect::<Vec<_>>(), "Called with args");

    let Some(cli) = cli else {
        error!("Not enough args given, expected TYPE NAME STATE [PRIORITY]");
        return ExitCode::FAILURE;
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let state = cli.state();
    let config = Config::from_env()?;

    let floating_ips: Vec<String> = config.floating_ips.iter().map(ToString::to_string).collect();
    info!(
        node = %config.node_name,
        ?floating_ips,
        health_check_path = %config.health_check_path.display(),
        "Configuration loaded"
    );

    let client = HcloudClient::with_config(
        config.token.clone(),
        ClientConfig::new(config.endpoint.clone()),
    )
    .context("unable to create cloud API client")?;

    hook::run(&config, &state, &client).await?;

    info!(%state, kind = %cli.kind, name = %cli.name, "Notification handled");
    Ok(())
}
