//! Sending side
//!
//! A descriptor always travels with at least one payload byte. An empty
//! payload is replaced on the wire by [`SendConfig::placeholder`], but the
//! count reported back to the caller is still zero.

use std::os::fd::RawFd;

use crate::config::{DEFAULT_PAYLOAD, SendConfig};
use crate::error::Result;
use crate::sys;
use crate::validate::{FdRef, SocketRef, validate_fd, validate_socket};

/// Send `payload` together with a copy of `fd` over a UNIX domain socket
///
/// Returns the number of payload bytes sent, not counting the descriptor or
/// the control data. If `payload` is empty, a single placeholder byte is put
/// on the wire and `0` is returned.
///
/// Nothing is retried: sending again could hand the peer a second copy of
/// the descriptor.
///
/// # Errors
///
/// - [`Error::InvalidDomain`](crate::Error::InvalidDomain) if `socket` is
///   known not to be `AF_UNIX`
/// - [`Error::InvalidArgument`](crate::Error::InvalidArgument) if either
///   descriptor is negative
/// - [`Error::Os`](crate::Error::Os) for any failure of `sendmsg`, including
///   `fd` not being open and the peer having gone away
pub fn send_fd<'s, 'f>(
    socket: impl Into<SocketRef<'s>>,
    fd: impl Into<FdRef<'f>>,
    payload: &[u8],
) -> Result<usize> {
    send_fd_with_config(socket, fd, payload, &SendConfig::default())
}

/// [`send_fd`] with [`DEFAULT_PAYLOAD`] as the message
///
/// # Errors
///
/// Same as [`send_fd`].
pub fn send_fd_default<'s, 'f>(
    socket: impl Into<SocketRef<'s>>,
    fd: impl Into<FdRef<'f>>,
) -> Result<usize> {
    send_fd(socket, fd, DEFAULT_PAYLOAD)
}

/// [`send_fd`] with explicit options
///
/// # Errors
///
/// Same as [`send_fd`].
pub fn send_fd_with_config<'s, 'f>(
    socket: impl Into<SocketRef<'s>>,
    fd: impl Into<FdRef<'f>>,
    payload: &[u8],
    config: &SendConfig,
) -> Result<usize> {
    let socket = validate_socket(socket.into())?;
    let fd = validate_fd(fd.into())?;
    send_validated(socket, fd, payload, config)
}

pub(crate) fn send_validated(
    socket: RawFd,
    fd: RawFd,
    payload: &[u8],
    config: &SendConfig,
) -> Result<usize> {
    let placeholder = [config.placeholder()];
    let wire = if payload.is_empty() {
        &placeholder[..]
    } else {
        payload
    };

    tracing::trace!(socket, fd, len = wire.len(), "sending descriptor");
    let sent = sys::send_with_descriptor(socket, fd, wire, config.no_signal())?;

    let sent = if payload.is_empty() { 0 } else { sent };
    tracing::debug!(socket, fd, bytes = sent, "descriptor sent");
    Ok(sent)
}
