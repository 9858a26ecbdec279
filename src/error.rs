use std::io;
use std::os::fd::RawFd;

use nix::sys::socket::AddressFamily;
use thiserror::Error;

/// Result type for descriptor passing operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur while passing a descriptor
///
/// Every failure is reported as exactly one of these variants. Validation
/// errors ([`InvalidDomain`](Error::InvalidDomain),
/// [`InvalidArgument`](Error::InvalidArgument)) are raised before any
/// syscall; the rest are raised after the single send or receive completes.
#[derive(Error, Debug)]
pub enum Error {
    #[error("descriptors can only be passed over AF_UNIX sockets, got {0:?}")]
    InvalidDomain(AddressFamily),

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("socket operation failed: {0}")]
    Os(#[from] io::Error),

    #[error("the message received did not contain exactly one file descriptor")]
    MalformedTransfer,

    #[error("the received file descriptor {0} is not valid")]
    InvalidTransferredDescriptor(RawFd),
}

impl Error {
    /// The errno carried by an [`Error::Os`], if any
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Error::Os(e) => e.raw_os_error(),
            _ => None,
        }
    }

    /// Whether the socket is non-blocking and the operation would have blocked
    pub fn is_would_block(&self) -> bool {
        matches!(self, Error::Os(e) if e.kind() == io::ErrorKind::WouldBlock)
    }
}

impl From<nix::Error> for Error {
    fn from(errno: nix::Error) -> Self {
        Error::Os(io::Error::from(errno))
    }
}
