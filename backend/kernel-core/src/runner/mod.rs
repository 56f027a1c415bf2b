//! One complete kernel run.
//!
//! This module provides functionality for:
//! - Writing the connection file and launching the kernel
//! - Sending a single `execute_request` on the request channel
//! - Draining the broadcast channel until the kernel is idle again
//! - Terminating the kernel and removing the connection file, on every path

mod drain;

use crate::config::RunnerConfig;
use crate::connection::{ConnectionFile, resolve_runtime_dir};
use crate::error::RunError;
use crate::execution::{ExecutionOutcome, KernelEvent};
use crate::kernelspec::KernelSpec;
use crate::session::Session;
use crate::supervisor::interpreter::{RecognizedInterpreter, resolve_runtime};
use crate::supervisor::{KernelProcess, LaunchOptions, kill, launch, terminate};
use crate::transport::{BroadcastChannel, RequestChannel};
use crate::wire::{ExecuteRequest, KernelMessageType, MessageCodec};

use log::{debug, error, info, warn};
use tokio_util::sync::CancellationToken;

/// Runs code on a kernel described by a [`RunnerConfig`].
#[derive(Debug, Clone)]
pub struct KernelRunner {
    config: RunnerConfig,
    cancel: CancellationToken,
}

impl KernelRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Token that aborts an in-flight run when cancelled. The kernel is killed.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run `code` on the kernel in the configured kernel directory.
    ///
    /// `on_event` sees every broadcast event as it arrives.
    ///
    /// # Errors
    ///
    /// See [`KernelRunner::run_spec`]; additionally [`RunError::KernelSpec`]
    /// if the kernel spec cannot be loaded.
    pub async fn run<F>(&self, code: &str, on_event: F) -> Result<ExecutionOutcome, RunError>
    where
        F: FnMut(&KernelEvent),
    {
        let spec = KernelSpec::load(&self.config.kernel.kernel_dir)?;
        self.run_spec(&spec, code, on_event).await
    }

    /// Run `code` on the kernel described by `spec`.
    ///
    /// # Errors
    ///
    /// - [`RunError::Descriptor`] if the connection file cannot be written
    /// - [`RunError::Launch`] if the kernel cannot be started
    /// - [`RunError::Transport`] if the channels cannot be connected
    /// - [`RunError::Timeout`] if the kernel is not idle before the run timeout
    /// - [`RunError::Cancelled`] if the cancellation token fires
    /// - [`RunError::KernelDied`] if the kernel exits or reports itself dead
    /// - [`RunError::Termination`] if the kernel cannot be stopped afterwards
    pub async fn run_spec<F>(
        &self,
        spec: &KernelSpec,
        code: &str,
        on_event: F,
    ) -> Result<ExecutionOutcome, RunError>
    where
        F: FnMut(&KernelEvent),
    {
        let runtime_dir = resolve_runtime_dir(self.config.kernel.runtime_dir.as_deref())?;
        let connection_file = ConnectionFile::generate(&runtime_dir)?;

        let result = self.launch_and_execute(spec, &connection_file, code, on_event).await;

        connection_file.remove();
        result
    }

    async fn launch_and_execute<F>(
        &self,
        spec: &KernelSpec,
        connection_file: &ConnectionFile,
        code: &str,
        on_event: F,
    ) -> Result<ExecutionOutcome, RunError>
    where
        F: FnMut(&KernelEvent),
    {
        let runtime = spec
            .argv
            .first()
            .and_then(|program| RecognizedInterpreter::recognize(program))
            .and_then(|_| resolve_runtime(self.config.kernel.interpreter.as_deref()));

        let options = LaunchOptions {
            runtime,
            env: spec.env.clone(),
        };
        let mut process = launch(&spec.argv, connection_file.path(), &options)?;
        info!(
            "Kernel '{}' running as {} (PID: {:?}, interrupt mode: {:?})",
            spec.display_name,
            process.program(),
            process.pid(),
            spec.interrupt_mode
        );

        let result = self.execute(connection_file, &mut process, code, on_event).await;

        match result {
            Ok(outcome) => {
                terminate(&mut process, self.config.timing.terminate_timeout()).await?;
                Ok(outcome)
            }
            Err(e) => {
                error!("Run failed: {e}");
                let stopped = if e.requires_forced_termination() {
                    kill(&mut process).await
                } else {
                    terminate(&mut process, self.config.timing.terminate_timeout()).await
                };
                if let Err(stop_error) = stopped {
                    warn!("Failed to stop kernel after error: {stop_error}");
                }
                Err(e)
            }
        }
    }

    async fn execute<F>(
        &self,
        connection_file: &ConnectionFile,
        process: &mut KernelProcess,
        code: &str,
        on_event: F,
    ) -> Result<ExecutionOutcome, RunError>
    where
        F: FnMut(&KernelEvent),
    {
        let descriptor = connection_file.descriptor();
        let connect_timeout = self.config.timing.connect_timeout();

        let codec = MessageCodec::new(Session::new(descriptor.key.clone()))?;

        // Subscribe before sending so the busy status is not missed.
        let mut broadcast =
            BroadcastChannel::connect(&descriptor.broadcast_endpoint(), connect_timeout).await?;
        let mut request =
            match RequestChannel::connect(&descriptor.shell_endpoint(), connect_timeout).await {
                Ok(request) => request,
                Err(e) => {
                    broadcast.close().await;
                    return Err(e.into());
                }
            };

        let sent = match codec.encode(
            KernelMessageType::ExecuteRequest,
            &ExecuteRequest::new(code),
            None,
            None,
        ) {
            Ok(encoded) => {
                let msg_id = encoded.header.msg_id.clone();
                request
                    .send(encoded.frames)
                    .await
                    .map(|()| msg_id)
                    .map_err(RunError::from)
            }
            Err(e) => Err(e.into()),
        };

        let result = match sent {
            Ok(msg_id) => {
                info!("Sent execute_request {msg_id}");
                drain::drain(
                    &codec,
                    &mut broadcast,
                    process,
                    &self.config,
                    &self.cancel,
                    on_event,
                )
                .await
            }
            Err(e) => Err(e),
        };

        request.close().await;
        broadcast.close().await;
        debug!("Channels closed");
        result
    }
}
