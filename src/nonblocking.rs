//! Async adapters for sockets registered with `async-io`
//!
//! Each call still performs exactly one successful `sendmsg`/`recvmsg`.
//! `EWOULDBLOCK` is the only outcome that parks the task; everything else,
//! classification errors included, is returned to the caller untouched.
//!
//! ```rust,ignore
//! use async_io::Async;
//! use std::os::unix::net::UnixStream;
//!
//! let (a, b) = Async::<UnixStream>::pair()?;
//! fdpass::send_fd_async(&a, &file, b"hello").await?;
//! let received = fdpass::recv_fd_async(&b, 4096).await?;
//! ```

use std::io;

use async_io::Async;

use crate::config::{DEFAULT_PAYLOAD, RecvConfig, SendConfig};
use crate::error::{Error, Result};
use crate::recv::{ReceivedFd, recv_validated};
use crate::send::send_validated;
use crate::validate::{FdRef, SocketLike, SocketRef, validate_fd, validate_socket};

/// Async version of [`send_fd`](crate::send_fd)
///
/// # Errors
///
/// Same as [`send_fd`](crate::send_fd), except that `EWOULDBLOCK` is never
/// returned.
pub async fn send_fd_async<'f, T: SocketLike>(
    socket: &Async<T>,
    fd: impl Into<FdRef<'f>>,
    payload: &[u8],
) -> Result<usize> {
    send_fd_async_with_config(socket, fd, payload, &SendConfig::default()).await
}

/// Async version of [`send_fd_default`](crate::send_fd_default)
///
/// # Errors
///
/// Same as [`send_fd_async`].
pub async fn send_fd_default_async<'f, T: SocketLike>(
    socket: &Async<T>,
    fd: impl Into<FdRef<'f>>,
) -> Result<usize> {
    send_fd_async(socket, fd, DEFAULT_PAYLOAD).await
}

/// Async version of [`send_fd_with_config`](crate::send_fd_with_config)
///
/// # Errors
///
/// Same as [`send_fd_async`].
pub async fn send_fd_async_with_config<'f, T: SocketLike>(
    socket: &Async<T>,
    fd: impl Into<FdRef<'f>>,
    payload: &[u8],
    config: &SendConfig,
) -> Result<usize> {
    let raw_socket = validate_socket(SocketRef::from(socket))?;
    let fd = validate_fd(fd.into())?;

    socket
        .write_with(|_| park_on_would_block(send_validated(raw_socket, fd, payload, config)))
        .await?
}

/// Async version of [`recv_fd`](crate::recv_fd)
///
/// # Errors
///
/// Same as [`recv_fd`](crate::recv_fd), except that `EWOULDBLOCK` is never
/// returned.
pub async fn recv_fd_async<T: SocketLike>(
    socket: &Async<T>,
    max_payload: usize,
) -> Result<ReceivedFd> {
    recv_fd_async_with_config(socket, &RecvConfig::with_max_payload(max_payload)).await
}

/// Async version of [`recv_fd_with_config`](crate::recv_fd_with_config)
///
/// # Errors
///
/// Same as [`recv_fd_async`].
pub async fn recv_fd_async_with_config<T: SocketLike>(
    socket: &Async<T>,
    config: &RecvConfig,
) -> Result<ReceivedFd> {
    let raw_socket = validate_socket(SocketRef::from(socket))?;

    socket
        .read_with(|_| park_on_would_block(recv_validated(raw_socket, config)))
        .await?
}

/// Hand `EWOULDBLOCK` back to the reactor, wrap every other outcome
fn park_on_would_block<R>(result: Result<R>) -> io::Result<Result<R>> {
    match result {
        Err(Error::Os(e)) if e.kind() == io::ErrorKind::WouldBlock => Err(e),
        other => Ok(other),
    }
}
