use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const RUNNER: &str = env!("CARGO_BIN_EXE_kernel-runner");

/// The stub kernel binary of `kernel-core`, built into the same target directory.
fn stub_kernel() -> PathBuf {
    Path::new(RUNNER).with_file_name(format!("stub-kernel{}", std::env::consts::EXE_SUFFIX))
}

fn runner(args: &[&str], data_dir: &Path, log_dir: &Path) -> Output {
    Command::new(RUNNER)
        .args(args)
        .arg("--log-dir")
        .arg(log_dir)
        .env("JUPYTER_PATH", data_dir)
        .env("JUPYTER_DATA_DIR", data_dir)
        .env_remove("KERNEL_DIR")
        .output()
        .unwrap()
}

/// **VALUE**: Verifies `list` shows kernels found on `JUPYTER_PATH`.
#[test]
fn given_kernel_on_jupyter_path_when_listed_then_printed() {
    // GIVEN: A data dir with one kernel spec
    let data = TempDir::new().unwrap();
    let logs = TempDir::new().unwrap();
    let kernel_dir = data.path().join("kernels").join("stub-kernel");
    std::fs::create_dir_all(&kernel_dir).unwrap();
    std::fs::write(
        kernel_dir.join("kernel.json"),
        r#"{ "argv": ["stub", "-f", "{connection_file}"], "display_name": "Stub Kernel" }"#,
    )
    .unwrap();

    // WHEN: Listing
    let output = runner(&["list"], data.path(), logs.path());

    // THEN: Success, kernel printed, log file written
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("stub-kernel"), "{stdout}");
    assert!(stdout.contains("Stub Kernel"), "{stdout}");
    assert!(logs.path().join("kernel-runner.log").exists());
}

/// **VALUE**: Verifies a missing kernel directory fails cleanly with a kernel spec read error.
///
/// **BUG THIS CATCHES**: Would catch a panic or a zero exit status when the kernel spec
/// cannot be read.
#[test]
fn given_missing_kernel_dir_when_run_then_failure_exit_and_message() {
    // GIVEN: A kernel dir that does not exist and an empty config dir
    let data = TempDir::new().unwrap();
    let logs = TempDir::new().unwrap();
    let config = TempDir::new().unwrap();
    let missing = data.path().join("nope");

    // WHEN: Running
    let output = runner(
        &[
            "run",
            "--kernel-dir",
            missing.to_str().unwrap(),
            "--config-dir",
            config.path().to_str().unwrap(),
        ],
        data.path(),
        logs.path(),
    );

    // THEN: Non-zero exit with the kernel spec error on stderr
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Kernel Spec Read Error"), "{stderr}");
}

/// **VALUE**: Verifies a corrupt config file stops the run before anything is launched.
#[test]
fn given_corrupt_config_when_run_then_config_error() {
    let data = TempDir::new().unwrap();
    let logs = TempDir::new().unwrap();
    let config = TempDir::new().unwrap();
    std::fs::write(config.path().join("config.json"), "{ broken").unwrap();

    let output = runner(
        &["run", "--config-dir", config.path().to_str().unwrap()],
        data.path(),
        logs.path(),
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Config Parse Error"), "{stderr}");
}

/// **VALUE**: Verifies `run` prints the kernel's busy status, result and idle status.
///
/// **WHY THIS MATTERS**: Printing the payload is the whole user-visible contract of the
/// command. The pieces are unit tested; this checks they are wired together.
///
/// **BUG THIS CATCHES**: Would catch events going to the log instead of stdout, or the
/// process exiting before the idle status is printed.
#[test]
fn given_stub_kernel_when_run_then_result_printed_between_busy_and_idle() {
    // GIVEN: A kernel dir launching the stub kernel and a private runtime dir
    let stub = stub_kernel();
    assert!(stub.exists(), "stub kernel not built at {}", stub.display());
    let data = TempDir::new().unwrap();
    let logs = TempDir::new().unwrap();
    let config = TempDir::new().unwrap();
    let runtime = TempDir::new().unwrap();
    let kernel_dir = data.path().join("stub");
    std::fs::create_dir_all(&kernel_dir).unwrap();
    let spec = serde_json::json!({
        "argv": [stub.to_string_lossy(), "-f", "{connection_file}"],
        "display_name": "Stub Kernel",
    });
    std::fs::write(kernel_dir.join("kernel.json"), spec.to_string()).unwrap();

    // WHEN: Running the default code
    let output = Command::new(RUNNER)
        .arg("run")
        .arg("--kernel-dir")
        .arg(&kernel_dir)
        .arg("--config-dir")
        .arg(config.path())
        .arg("--log-dir")
        .arg(logs.path())
        .env("JUPYTER_RUNTIME_DIR", runtime.path())
        .env_remove("KERNEL_DIR")
        .output()
        .unwrap();

    // THEN: Success with busy, 991, idle on stdout in that order
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stdout: {stdout}\nstderr: {stderr}");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec!["Kernel state: busy", "991", "Kernel state: idle"],
        "{stdout}"
    );

    // AND: The connection file was cleaned up
    assert_eq!(std::fs::read_dir(runtime.path()).unwrap().count(), 0);
}
