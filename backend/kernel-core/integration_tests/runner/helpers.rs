use kernel_core::config::{InboundVerification, RunnerConfig};
use kernel_core::kernelspec::KernelSpec;
use kernel_core::runner::KernelRunner;

use std::collections::BTreeMap;
use std::path::Path;

use tempfile::TempDir;

pub const STUB_KERNEL: &str = env!("CARGO_BIN_EXE_stub-kernel");

/// A kernel spec that launches the stub kernel with extra flags.
pub fn stub_spec(flags: &[&str]) -> KernelSpec {
    let mut argv = vec![
        STUB_KERNEL.to_string(),
        "-f".to_string(),
        "{connection_file}".to_string(),
    ];
    argv.extend(flags.iter().map(|f| f.to_string()));

    KernelSpec {
        argv,
        display_name: "Stub".to_string(),
        language: "none".to_string(),
        interrupt_mode: Default::default(),
        env: BTreeMap::new(),
    }
}

/// A runner writing connection files into `runtime_dir` with a short run timeout.
pub fn runner(runtime_dir: &Path, run_timeout_ms: u64) -> KernelRunner {
    let mut config = RunnerConfig::default();
    config.kernel.runtime_dir = Some(runtime_dir.to_path_buf());
    config.timing.run_timeout_ms = run_timeout_ms;
    config.timing.terminate_timeout_ms = 2_000;
    config.security.inbound_verification = InboundVerification::Reject;
    KernelRunner::new(config)
}

pub fn runtime_dir() -> TempDir {
    TempDir::new().unwrap()
}

/// Connection files left in `dir`.
pub fn leftover_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}
