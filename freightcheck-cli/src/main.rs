//! freightcheck -- end-to-end workflow checks for the logistics REST API.

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use freightcheck_cli::cli::{Cli, Commands};
use freightcheck_cli::commands;
use freightcheck_cli::error::CliError;
use freightcheck_cli::logging;
use freightcheck_cli::output::OutputWriter;
use freightcheck_cli::scenarios::ScenarioEnv;
use freightcheck_core::config::{FreightcheckConfig, GeneralConfig};
use freightcheck_core::transport::ReqwestTransport;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("error: {e}");
            e.exit_code()
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);

    match cli.command {
        Commands::Config(args) => {
            // config commands report load failures themselves
            let mut general = GeneralConfig::default();
            if let Some(level) = cli.log_level {
                general.log_level = level;
            }
            init_tracing(&general)?;
            commands::config::execute(args, &cli.config, &writer).await
        }
        command => {
            let config = load_config(&cli.config, cli.log_level).await?;
            init_tracing(&config.general)?;
            info!(config = %cli.config.display(), base_url = %config.base_url(), "freightcheck starting");

            let transport = Arc::new(ReqwestTransport::from_config(&config)?);
            let cancel = CancellationToken::new();
            spawn_ctrl_c(cancel.clone());
            let env = ScenarioEnv::from_config(transport, &config, cancel);

            match command {
                Commands::Login(args) => commands::login::execute(args, env.cache(), &writer).await,
                Commands::Scenario(args) => {
                    commands::scenario::execute(args, &env, &writer).await
                }
                Commands::Config(_) => Ok(()),
            }
        }
    }
}

async fn load_config(path: &Path, log_level: Option<String>) -> Result<FreightcheckConfig, CliError> {
    let mut config = FreightcheckConfig::load_or_default(path).await?;
    if let Some(level) = log_level {
        config.general.log_level = level;
    }
    Ok(config)
}

fn init_tracing(general: &GeneralConfig) -> Result<(), CliError> {
    logging::init_tracing(general).map_err(|e| CliError::Config(e.to_string()))
}

/// Cancels in-flight polling on Ctrl-C.
fn spawn_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("interrupt received, cancelling");
                cancel.cancel();
            }
            Err(e) => warn!(error = %e, "failed to listen for ctrl-c"),
        }
    });
}
