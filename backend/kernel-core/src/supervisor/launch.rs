use crate::CONNECTION_FILE_PLACEHOLDER;
use crate::error::launch::LaunchError;
use crate::supervisor::interpreter::RecognizedInterpreter;

use common::ErrorLocation;

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use log::{debug, info, trace, warn};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child as TokioChild;
use tokio::process::Command as TokioCommand;
use tokio::spawn as TokioSpawn;

/// Everything besides the argument list that shapes the kernel process.
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    /// Replacement for a recognized interpreter name in `argv[0]`.
    /// `None` leaves the argument as written.
    pub runtime: Option<PathBuf>,

    /// Extra environment, layered over the inherited environment.
    pub env: BTreeMap<String, String>,
}

/// A running (or exited but not yet observed) kernel process.
///
/// Dropping the handle kills the process.
#[derive(Debug)]
pub struct KernelProcess {
    pub(crate) child: TokioChild,
    pid: Option<u32>,
    program: String,
    pub(crate) exit_status: Option<ExitStatus>,
}

impl KernelProcess {
    /// OS process id, if the process was still running when spawned.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// The executable that was launched, after substitution.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Exit status once the process has been reaped.
    pub fn exit_status(&self) -> Option<ExitStatus> {
        self.exit_status
    }

    /// Non-blocking liveness check. Reaps the process if it has exited.
    pub fn is_running(&mut self) -> bool {
        if self.exit_status.is_some() {
            return false;
        }
        match self.child.try_wait() {
            Ok(Some(status)) => {
                debug!("Kernel {:?} exited with {status}", self.pid);
                self.exit_status = Some(status);
                false
            }
            Ok(None) => true,
            Err(e) => {
                warn!("Failed to poll kernel {:?}: {e}", self.pid);
                false
            }
        }
    }
}

/// Build the final launch arguments.
///
/// Every occurrence of `{connection_file}` in an argument becomes `connection_file`.
/// The first argument is replaced with `runtime` when it is a recognized
/// interpreter name and a runtime was supplied.
pub fn substitute_argv(
    argv: &[String],
    connection_file: &Path,
    runtime: Option<&Path>,
) -> Vec<String> {
    let connection_file = connection_file.to_string_lossy();

    argv.iter()
        .enumerate()
        .map(|(index, arg)| {
            if arg.contains(CONNECTION_FILE_PLACEHOLDER) {
                return arg.replace(CONNECTION_FILE_PLACEHOLDER, &connection_file);
            }
            if index == 0
                && let Some(runtime) = runtime
                && RecognizedInterpreter::recognize(arg).is_some()
            {
                trace!("Replacing interpreter '{arg}' with {}", runtime.display());
                return runtime.to_string_lossy().to_string();
            }
            arg.clone()
        })
        .collect()
}

/// Start the kernel described by `argv`.
///
/// Standard output and error are piped and forwarded to the trace log.
///
/// # Errors
///
/// - [`LaunchError::Arguments`] if `argv` is empty
/// - [`LaunchError::Spawn`] if the executable cannot be started
#[track_caller]
pub fn launch(
    argv: &[String],
    connection_file: &Path,
    options: &LaunchOptions,
) -> Result<KernelProcess, LaunchError> {
    let args = substitute_argv(argv, connection_file, options.runtime.as_deref());

    let Some((program, rest)) = args.split_first() else {
        return Err(LaunchError::Arguments {
            message: "kernel argv is empty".to_string(),
            location: ErrorLocation::from(Location::caller()),
        });
    };

    debug!("Launching kernel: {}", args.join(" "));

    let mut child = TokioCommand::new(program)
        .args(rest)
        .envs(&options.env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            let message = match e.kind() {
                ErrorKind::NotFound => format!("Kernel executable not found: {program}"),
                ErrorKind::PermissionDenied => {
                    format!("Kernel executable not permitted: {program}")
                }
                _ => format!("Failed to spawn {program}: {e}"),
            };
            LaunchError::Spawn {
                message,
                location: ErrorLocation::from(Location::caller()),
                source: Box::new(e),
            }
        })?;

    let pid = child.id();
    info!("Spawned kernel {program} (PID: {pid:?})");

    if let Some(stdout) = child.stdout.take() {
        forward_output(stdout, "stdout", pid);
    }
    if let Some(stderr) = child.stderr.take() {
        forward_output(stderr, "stderr", pid);
    }

    Ok(KernelProcess {
        child,
        pid,
        program: program.clone(),
        exit_status: None,
    })
}

fn forward_output<R>(reader: R, stream: &'static str, pid: Option<u32>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    TokioSpawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            trace!("Kernel {pid:?} {stream}: {line}");
        }
    });
}
