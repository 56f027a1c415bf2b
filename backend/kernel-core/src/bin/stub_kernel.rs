//! Minimal kernel used by the integration tests.
//!
//! Reads a connection file, binds ROUTER on the shell port and PUB on the
//! iopub port, and answers each `execute_request` with:
//!
//! ```text
//! status: busy -> execute_result ("991") -> status: idle
//! ```
//!
//! See [`Options`] for the flags that change this behavior.

use kernel_core::connection::ConnectionDescriptor;
use kernel_core::session::Session;
use kernel_core::wire::{
    ExecuteResult, KernelHeader, KernelMessageType, KernelStatus, MessageCodec, Status,
};

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use bytes::Bytes;
use clap::Parser;
use log::{LevelFilter, debug, error, info, warn};
use serde_json::json;
use tokio::time::sleep;
use zeromq::{PubSocket, RouterSocket, Socket, SocketRecv, SocketSend, ZmqMessage};

/// Lets the client's subscription reach the PUB socket before publishing.
const SUBSCRIBER_GRACE: Duration = Duration::from_millis(250);
const STUB_USERNAME: &str = "stub-kernel";
const RESULT_TEXT: &str = "991";

/// Minimal kernel answering `execute_request` on the shell socket.
#[derive(Debug, Parser)]
#[command(name = "stub-kernel", about)]
struct Options {
    /// Connection file written by the client
    #[arg(short = 'f', long = "file")]
    connection_file: PathBuf,

    /// Publish `busy` and never return to idle
    #[arg(long)]
    never_idle: bool,

    /// Exit as soon as a request arrives
    #[arg(long)]
    exit_on_request: bool,

    /// Publish `busy` then `dead`
    #[arg(long)]
    dead: bool,

    /// Also publish an unknown message type and a badly signed status
    #[arg(long)]
    noise: bool,
}

/// Log to stderr; stdout belongs to the kernel's own output.
fn init_logging() -> Result<(), String> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("stub-kernel [{}] {message}", record.level()))
        })
        .level(LevelFilter::Debug)
        .chain(std::io::stderr())
        .apply()
        .map_err(|e| e.to_string())
}

struct StubKernel {
    codec: MessageCodec,
    shell: RouterSocket,
    iopub: PubSocket,
    options: Options,
}

impl StubKernel {
    async fn publish<T: serde::Serialize>(
        &mut self,
        msg_type: KernelMessageType,
        content: &T,
        parent: &KernelHeader,
    ) -> Result<(), String> {
        let encoded = self
            .codec
            .encode(msg_type, content, Some(parent), None)
            .map_err(|e| e.to_string())?;
        self.send_iopub(encoded.frames).await
    }

    async fn send_iopub(&mut self, frames: Vec<Bytes>) -> Result<(), String> {
        let message = ZmqMessage::try_from(frames).map_err(|e| e.to_string())?;
        self.iopub.send(message).await.map_err(|e| e.to_string())
    }

    async fn publish_status(
        &mut self,
        state: KernelStatus,
        parent: &KernelHeader,
    ) -> Result<(), String> {
        let status = Status {
            execution_state: state,
        };
        self.publish(KernelMessageType::Status, &status, parent).await
    }

    async fn publish_noise(&mut self, parent: &KernelHeader) -> Result<(), String> {
        self.publish(
            KernelMessageType::Other("comm_open".to_string()),
            &json!({ "comm_id": "stub", "target_name": "stub" }),
            parent,
        )
        .await?;

        // A correctly shaped message with a corrupted signature.
        let mut frames = self
            .codec
            .encode(
                KernelMessageType::Status,
                &Status {
                    execution_state: KernelStatus::Busy,
                },
                Some(parent),
                None,
            )
            .map_err(|e| e.to_string())?
            .frames;
        frames[1] = Bytes::from_static(b"00");
        self.send_iopub(frames).await
    }

    async fn handle(&mut self, frames: Vec<Bytes>) -> Result<bool, String> {
        let Some(identity) = frames.first().cloned() else {
            return Err("empty request".to_string());
        };

        if let Err(e) = self.codec.verify(&frames) {
            warn!("Unverified request: {e}");
        }
        let request = MessageCodec::decode(frames).map_err(|e| e.to_string())?;
        debug!("Received {}", request.header.msg_type);

        if self.options.exit_on_request {
            return Ok(false);
        }

        sleep(SUBSCRIBER_GRACE).await;
        let parent = request.header;

        self.publish_status(KernelStatus::Busy, &parent).await?;

        if self.options.dead {
            self.publish_status(KernelStatus::Dead, &parent).await?;
            return Ok(true);
        }
        if self.options.never_idle {
            return Ok(true);
        }
        if self.options.noise {
            self.publish_noise(&parent).await?;
        }

        let result = ExecuteResult {
            execution_count: 1,
            data: BTreeMap::from([(
                ExecuteResult::PLAIN_TEXT_MIME.to_string(),
                json!(RESULT_TEXT),
            )]),
            metadata: BTreeMap::new(),
        };
        self.publish(KernelMessageType::ExecuteResult, &result, &parent)
            .await?;
        self.publish_status(KernelStatus::Idle, &parent).await?;

        let reply = self
            .codec
            .encode(
                KernelMessageType::ExecuteReply,
                &json!({ "status": "ok", "execution_count": 1, "user_expressions": {} }),
                Some(&parent),
                None,
            )
            .map_err(|e| e.to_string())?;
        let mut reply_frames = vec![identity];
        reply_frames.extend(reply.frames);
        let reply = ZmqMessage::try_from(reply_frames).map_err(|e| e.to_string())?;
        self.shell.send(reply).await.map_err(|e| e.to_string())?;

        Ok(true)
    }
}

async fn serve(options: Options) -> Result<(), String> {
    let descriptor =
        ConnectionDescriptor::read(&options.connection_file).map_err(|e| e.to_string())?;

    let session = Session::with_username(descriptor.key.clone(), STUB_USERNAME);
    let codec = MessageCodec::new(session).map_err(|e| e.to_string())?;

    let mut shell = RouterSocket::new();
    shell
        .bind(&descriptor.shell_endpoint())
        .await
        .map_err(|e| e.to_string())?;
    let mut iopub = PubSocket::new();
    iopub
        .bind(&descriptor.broadcast_endpoint())
        .await
        .map_err(|e| e.to_string())?;

    info!(
        "Listening shell={} iopub={}",
        descriptor.shell_endpoint(),
        descriptor.broadcast_endpoint()
    );

    let mut kernel = StubKernel {
        codec,
        shell,
        iopub,
        options,
    };

    loop {
        let message = kernel.shell.recv().await.map_err(|e| e.to_string())?;
        if !kernel.handle(message.into_vec()).await? {
            return Ok(());
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let options = Options::parse();

    if let Err(e) = init_logging() {
        eprintln!("stub-kernel: failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match serve(options).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
