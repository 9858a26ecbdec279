//! Argument normalisation
//!
//! Both operations accept either a raw descriptor or a borrowed object that
//! owns one. The validators below collapse those into plain [`RawFd`]s before
//! anything touches the kernel.

use std::net::{SocketAddr, TcpListener, TcpStream, UdpSocket};
use std::os::fd::{AsRawFd, BorrowedFd, OwnedFd, RawFd};
use std::os::unix::net::{UnixDatagram, UnixListener, UnixStream};

use nix::sys::socket::AddressFamily;

use crate::error::{Error, Result};

/// A socket that can report its address family
///
/// Implementations that cannot know their family return `None`; such sockets
/// are accepted and left for the kernel to judge.
pub trait SocketLike: AsRawFd {
    /// The address family the socket was created with, if known
    fn family(&self) -> Option<AddressFamily>;
}

impl SocketLike for UnixStream {
    fn family(&self) -> Option<AddressFamily> {
        Some(AddressFamily::Unix)
    }
}

impl SocketLike for UnixDatagram {
    fn family(&self) -> Option<AddressFamily> {
        Some(AddressFamily::Unix)
    }
}

impl SocketLike for UnixListener {
    fn family(&self) -> Option<AddressFamily> {
        Some(AddressFamily::Unix)
    }
}

fn inet_family(addr: std::io::Result<SocketAddr>) -> Option<AddressFamily> {
    match addr.ok()? {
        SocketAddr::V4(_) => Some(AddressFamily::Inet),
        SocketAddr::V6(_) => Some(AddressFamily::Inet6),
    }
}

impl SocketLike for TcpStream {
    fn family(&self) -> Option<AddressFamily> {
        inet_family(self.local_addr())
    }
}

impl SocketLike for TcpListener {
    fn family(&self) -> Option<AddressFamily> {
        inet_family(self.local_addr())
    }
}

impl SocketLike for UdpSocket {
    fn family(&self) -> Option<AddressFamily> {
        inet_family(self.local_addr())
    }
}

impl SocketLike for OwnedFd {
    fn family(&self) -> Option<AddressFamily> {
        None
    }
}

impl SocketLike for BorrowedFd<'_> {
    fn family(&self) -> Option<AddressFamily> {
        None
    }
}

#[cfg(feature = "async")]
impl<T: SocketLike> SocketLike for async_io::Async<T> {
    fn family(&self) -> Option<AddressFamily> {
        self.get_ref().family()
    }
}

/// The socket argument of [`send_fd`](crate::send_fd) and [`recv_fd`](crate::recv_fd)
#[derive(Clone, Copy)]
pub enum SocketRef<'a> {
    /// A bare descriptor, assumed to be an `AF_UNIX` socket
    Raw(RawFd),
    /// A borrowed socket whose family is checked
    Owner(&'a dyn SocketLike),
}

impl From<RawFd> for SocketRef<'_> {
    fn from(fd: RawFd) -> Self {
        SocketRef::Raw(fd)
    }
}

impl<'a, T: SocketLike> From<&'a T> for SocketRef<'a> {
    fn from(socket: &'a T) -> Self {
        SocketRef::Owner(socket)
    }
}

impl std::fmt::Debug for SocketRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SocketRef::Raw(fd) => f.debug_tuple("Raw").field(fd).finish(),
            SocketRef::Owner(socket) => f
                .debug_struct("Owner")
                .field("fd", &socket.as_raw_fd())
                .field("family", &socket.family())
                .finish(),
        }
    }
}

/// The descriptor argument of [`send_fd`](crate::send_fd)
#[derive(Clone, Copy)]
pub enum FdRef<'a> {
    Raw(RawFd),
    Owner(&'a dyn AsRawFd),
}

impl From<RawFd> for FdRef<'_> {
    fn from(fd: RawFd) -> Self {
        FdRef::Raw(fd)
    }
}

impl<'a, T: AsRawFd> From<&'a T> for FdRef<'a> {
    fn from(owner: &'a T) -> Self {
        FdRef::Owner(owner)
    }
}

impl std::fmt::Debug for FdRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FdRef::Raw(fd) => f.debug_tuple("Raw").field(fd).finish(),
            FdRef::Owner(owner) => f.debug_tuple("Owner").field(&owner.as_raw_fd()).finish(),
        }
    }
}

/// Resolve a socket argument to a descriptor
///
/// Fails with [`Error::InvalidDomain`] when the socket reports a family other
/// than `AF_UNIX`, and with [`Error::InvalidArgument`] when the descriptor
/// cannot name an open file.
pub fn validate_socket(socket: SocketRef<'_>) -> Result<RawFd> {
    let fd = match socket {
        SocketRef::Raw(fd) => fd,
        SocketRef::Owner(socket) => {
            if let Some(family) = socket.family() {
                if family != AddressFamily::Unix {
                    return Err(Error::InvalidDomain(family));
                }
            }
            socket.as_raw_fd()
        }
    };

    if fd < 0 {
        return Err(Error::InvalidArgument(
            "a socket object or file descriptor was expected",
        ));
    }
    Ok(fd)
}

/// Resolve the descriptor to transfer
pub fn validate_fd(fd: FdRef<'_>) -> Result<RawFd> {
    let fd = match fd {
        FdRef::Raw(fd) => fd,
        FdRef::Owner(owner) => owner.as_raw_fd(),
    };

    if fd < 0 {
        return Err(Error::InvalidArgument(
            "a file object or file descriptor was expected",
        ));
    }
    Ok(fd)
}
