//! fdpass - pass open file descriptors over UNIX domain sockets
//!
//! Two operations, [`send_fd`] and [`recv_fd`], move one descriptor at a time
//! between processes using `SCM_RIGHTS` control messages (the BSD 4.3+
//! convention). Each call performs a single `sendmsg` or `recvmsg` and never
//! retries.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::fs::File;
//! use std::io::Read;
//! use std::os::unix::net::UnixStream;
//!
//! fn main() -> fdpass::Result<()> {
//!     let (parent, child) = UnixStream::pair()?;
//!
//!     let zero = File::open("/dev/zero")?;
//!     fdpass::send_fd(&child, &zero, b"foobar")?;
//!
//!     let received = fdpass::recv_fd(&parent, 4096)?;
//!     assert_eq!(received.payload(), b"foobar");
//!
//!     let mut buf = [1u8; 512];
//!     received.into_file().read_exact(&mut buf)?;
//!     assert!(buf.iter().all(|&b| b == 0));
//!     Ok(())
//! }
//! ```
//!
//! # Framing
//!
//! At least one payload byte always travels with the descriptor. When the
//! caller's payload is empty, [`PLACEHOLDER_BYTE`] is sent instead; the
//! sender reports `0` bytes and the receiver sees a one-byte payload.
//!
//! A descriptor attached to a message that the peer consumes with a plain
//! `read`/`recv` is discarded by the kernel. Do not mix plain and
//! descriptor-carrying sends on one socket unless the receiver knows which
//! to expect.

#![cfg(unix)]

mod config;
mod error;
#[cfg(feature = "async")]
mod nonblocking;
mod recv;
mod send;
mod sys;
mod validate;

pub use config::{
    DEFAULT_MAX_PAYLOAD, DEFAULT_PAYLOAD, PLACEHOLDER_BYTE, RecvConfig, RecvConfigBuilder,
    SendConfig, SendConfigBuilder,
};
pub use error::{Error, Result};
#[cfg(feature = "async")]
pub use nonblocking::{
    recv_fd_async, recv_fd_async_with_config, send_fd_async, send_fd_async_with_config,
    send_fd_default_async,
};
pub use recv::{ReceivedFd, recv_fd, recv_fd_default, recv_fd_with_config};
pub use send::{send_fd, send_fd_default, send_fd_with_config};
pub use validate::{FdRef, SocketLike, SocketRef, validate_fd, validate_socket};

/// Re-export so callers can name families in [`SocketLike`] impls.
pub use nix::sys::socket::AddressFamily;
