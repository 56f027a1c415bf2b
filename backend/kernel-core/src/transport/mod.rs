//! Socket channels to a running kernel.
//!
//! Two channels are used:
//!
//! - **Request** ([`RequestChannel`]): DEALER socket connected to the kernel's
//!   shell port. Ordered, point-to-point.
//! - **Broadcast** ([`BroadcastChannel`]): SUB socket connected to the kernel's
//!   iopub port, subscribed to every topic.
//!
//! Both wrap a [`Channel`], which adds bounded connection retry and a
//! non-destructive [`Channel::pollable`] check on top of the raw socket.

mod channel;
mod connect;

pub use channel::{BroadcastChannel, Channel, RequestChannel};
pub use connect::DEFAULT_CONNECT_TIMEOUT;
