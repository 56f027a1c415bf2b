//! Kernel process supervision.
//!
//! This module provides functionality for:
//! - Building the kernel command line from a kernel spec and connection file
//! - Swapping a bare interpreter name for a concrete interpreter path
//! - Spawning the kernel with its output forwarded to the logger
//! - Stopping the kernel: graceful first, forced after a grace period, always reaped

pub mod interpreter;
pub mod launch;
pub mod terminate;

pub use interpreter::RecognizedInterpreter;
pub use launch::{KernelProcess, LaunchOptions, launch, substitute_argv};
pub use terminate::{Termination, kill, terminate};
