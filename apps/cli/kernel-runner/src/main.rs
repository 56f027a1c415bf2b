use kernel_runner::cli::{Cli, Command, RunArgs};
use kernel_runner::error::RunnerError;
use kernel_runner::logger::initialize as LoggerInitialize;
use kernel_runner::output::render_event;

use kernel_core::config::{RunnerConfig, load_dotenv};
use kernel_core::kernelspec::list_kernels;
use kernel_core::runner::KernelRunner;

use common::ErrorLocation;

use std::fs::create_dir_all;
use std::panic::Location;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), RunnerError> {
    let log_dir = cli.log_dir();
    create_dir_all(&log_dir).map_err(|e| RunnerError::Runner {
        message: format!("Failed to create log directory {}: {e}", log_dir.display()),
        location: ErrorLocation::from(Location::caller()),
    })?;

    // Initialize logger FIRST
    LoggerInitialize(&log_dir)?;
    info!("Log directory: {}", log_dir.display());

    load_dotenv();

    match &cli.command {
        Command::Run(args) => run_code(args, &cli.config_dir()).await,
        Command::List => {
            list();
            Ok(())
        }
    }
}

async fn run_code(args: &RunArgs, config_dir: &Path) -> Result<(), RunnerError> {
    let mut config = RunnerConfig::load(config_dir)?.with_env_overrides();
    if let Some(kernel_dir) = &args.kernel_dir {
        config.kernel.kernel_dir = kernel_dir.clone();
    }
    info!("Kernel directory: {}", config.kernel.kernel_dir.display());

    let runner = KernelRunner::new(config);

    let token = runner.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping kernel");
            token.cancel();
        }
    });

    let outcome = runner
        .run(&args.code, |event| println!("{}", render_event(event)))
        .await?;

    info!(
        "Run finished in state {:?} with {} result(s)",
        outcome.final_state,
        outcome.results.len()
    );
    Ok(())
}

fn list() {
    let kernels = list_kernels(None);
    if kernels.is_empty() {
        println!("No kernels found");
        return;
    }

    for (dir, spec) in kernels {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        println!("{name:<20} {:<30} {}", spec.display_name, dir.display());
    }
}
