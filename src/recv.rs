//! Receiving side

use std::fs::File;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, FromRawFd, OwnedFd, RawFd};

use nix::fcntl::{FcntlArg, fcntl};

use crate::config::RecvConfig;
use crate::error::{Error, Result};
use crate::sys;
use crate::validate::{SocketRef, validate_socket};

/// A descriptor received from a peer, with the payload that carried it
///
/// The descriptor is owned: dropping this value closes it.
#[derive(Debug)]
pub struct ReceivedFd {
    fd: OwnedFd,
    payload: Vec<u8>,
    truncated: bool,
}

impl ReceivedFd {
    /// Borrow the received descriptor
    pub fn fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }

    /// The payload bytes actually read
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Whether a datagram payload was cut at the receive limit
    ///
    /// Always `false` on stream sockets, where excess bytes stay queued.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Split into the descriptor and the payload
    pub fn into_parts(self) -> (OwnedFd, Vec<u8>) {
        (self.fd, self.payload)
    }

    /// Take ownership of the descriptor, discarding the payload
    pub fn into_fd(self) -> OwnedFd {
        self.fd
    }

    /// Treat the received descriptor as a file
    pub fn into_file(self) -> File {
        File::from(self.fd)
    }
}

impl AsFd for ReceivedFd {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

impl AsRawFd for ReceivedFd {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }
}

/// Receive a descriptor and up to `max_payload` bytes of payload
///
/// Exactly one `recvmsg` is issued. On a stream socket, payload beyond
/// `max_payload` stays queued for the next read.
///
/// # Errors
///
/// - [`Error::InvalidDomain`] if `socket` is known not to be `AF_UNIX`
/// - [`Error::InvalidArgument`] if `socket` is negative or `max_payload` is 0
/// - [`Error::Os`] if `recvmsg` fails
/// - [`Error::MalformedTransfer`] if the message did not carry exactly one
///   descriptor
/// - [`Error::InvalidTransferredDescriptor`] if the descriptor is not open
pub fn recv_fd<'s>(socket: impl Into<SocketRef<'s>>, max_payload: usize) -> Result<ReceivedFd> {
    recv_fd_with_config(socket, &RecvConfig::with_max_payload(max_payload))
}

/// [`recv_fd`] with [`DEFAULT_MAX_PAYLOAD`](crate::DEFAULT_MAX_PAYLOAD)
///
/// # Errors
///
/// Same as [`recv_fd`].
pub fn recv_fd_default<'s>(socket: impl Into<SocketRef<'s>>) -> Result<ReceivedFd> {
    recv_fd_with_config(socket, &RecvConfig::default())
}

/// [`recv_fd`] with explicit options
///
/// # Errors
///
/// Same as [`recv_fd`].
pub fn recv_fd_with_config<'s>(
    socket: impl Into<SocketRef<'s>>,
    config: &RecvConfig,
) -> Result<ReceivedFd> {
    let socket = validate_socket(socket.into())?;
    recv_validated(socket, config)
}

pub(crate) fn recv_validated(socket: RawFd, config: &RecvConfig) -> Result<ReceivedFd> {
    if config.max_payload() == 0 {
        return Err(Error::InvalidArgument(
            "max_payload must be greater than zero",
        ));
    }

    let mut payload = vec![0u8; config.max_payload()];

    tracing::trace!(socket, max_payload = config.max_payload(), "receiving descriptor");
    let message = sys::receive_with_descriptor(socket, &mut payload, config.close_on_exec())?;

    if message.control_truncated || message.fds.len() != 1 {
        tracing::warn!(
            socket,
            descriptors = message.fds.len(),
            control_truncated = message.control_truncated,
            bytes = message.bytes,
            "message did not carry exactly one descriptor"
        );
        for fd in message.fds {
            drop(claim(fd));
        }
        return Err(Error::MalformedTransfer);
    }

    let raw = message.fds[0];
    let Some(fd) = claim(raw) else {
        tracing::warn!(socket, fd = raw, "received descriptor is not open");
        return Err(Error::InvalidTransferredDescriptor(raw));
    };

    payload.truncate(message.bytes);
    tracing::debug!(
        socket,
        fd = raw,
        bytes = message.bytes,
        truncated = message.payload_truncated,
        "descriptor received"
    );

    Ok(ReceivedFd {
        fd,
        payload,
        truncated: message.payload_truncated,
    })
}

/// Take ownership of a descriptor the kernel installed for us, if it is open
fn claim(raw: RawFd) -> Option<OwnedFd> {
    if raw < 0 || fcntl(raw, FcntlArg::F_GETFD).is_err() {
        return None;
    }
    // Installed by this recvmsg and not yet handed to anyone else.
    Some(unsafe { OwnedFd::from_raw_fd(raw) })
}
