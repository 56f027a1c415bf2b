use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub const DEFAULT_CODE: &str = "print(99 * 10 + 1)";
const APP_DIR_NAME: &str = "kernel-runner";
const LOG_DIR_NAME: &str = "logs";

/// Launch a kernel, run code on it, and print what it broadcasts.
#[derive(Debug, Parser)]
#[command(name = "kernel-runner", version, about)]
pub struct Cli {
    /// Directory holding config.json [default: platform config dir]
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// Directory for kernel-runner.log [default: platform data dir]
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one piece of code on a kernel
    Run(RunArgs),

    /// List installed kernel specs
    List,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Kernel directory containing kernel.json (overrides config and KERNEL_DIR)
    #[arg(long)]
    pub kernel_dir: Option<PathBuf>,

    /// Code to execute
    #[arg(long, default_value = DEFAULT_CODE)]
    pub code: String,
}

impl Cli {
    pub fn config_dir(&self) -> PathBuf {
        self.config_dir.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(APP_DIR_NAME)
        })
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(APP_DIR_NAME)
                .join(LOG_DIR_NAME)
        })
    }
}
