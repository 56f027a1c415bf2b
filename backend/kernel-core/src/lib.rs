pub mod config;
pub mod connection;
pub mod error;
pub mod execution;
pub mod kernelspec;
pub mod runner;
pub mod session;
pub mod supervisor;
pub mod transport;
pub mod wire;

#[cfg(test)]
mod tests;

pub const KERNEL_IP: &str = "127.0.0.1";
pub const KERNEL_TRANSPORT: &str = "tcp";
pub const KERNEL_EPHEMERAL_BIND: &str = const_format::concatcp!(KERNEL_IP, ":0");
pub const SIGNATURE_SCHEME: &str = "hmac-sha256";
pub const PROTOCOL_VERSION: &str = "5.4";
pub const CONNECTION_FILE_PLACEHOLDER: &str = "{connection_file}";
