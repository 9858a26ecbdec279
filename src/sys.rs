//! `sendmsg`/`recvmsg` with a single `SCM_RIGHTS` control message
//!
//! This is the only place that knows about control-message layout. Callers
//! get plain descriptors and byte counts back and do their own
//! classification.

use std::io::{IoSlice, IoSliceMut};
use std::mem;
use std::os::fd::RawFd;

use nix::cmsg_space;
use nix::errno::Errno;
use nix::libc;
use nix::sys::socket::{self, ControlMessage, ControlMessageOwned, MsgFlags};

/// What a single `recvmsg` produced
#[derive(Debug)]
pub(crate) struct RawMessage {
    /// Payload bytes written into the caller's buffer
    pub bytes: usize,
    /// Descriptors installed by the kernel, not yet owned by anyone
    pub fds: Vec<RawFd>,
    /// `MSG_TRUNC`: the datagram was longer than the buffer
    pub payload_truncated: bool,
    /// `MSG_CTRUNC`: the control data did not fit
    pub control_truncated: bool,
}

pub(crate) fn send_with_descriptor(
    socket: RawFd,
    fd: RawFd,
    payload: &[u8],
    no_signal: bool,
) -> nix::Result<usize> {
    let iov = [IoSlice::new(payload)];
    let fds = [fd];
    let cmsgs = [ControlMessage::ScmRights(&fds)];

    socket::sendmsg::<()>(socket, &iov, &cmsgs, send_flags(no_signal), None)
}

pub(crate) fn receive_with_descriptor(
    socket: RawFd,
    buf: &mut [u8],
    close_on_exec: bool,
) -> nix::Result<RawMessage> {
    let capacity = buf.len();
    let mut iov = [IoSliceMut::new(buf)];
    let mut cmsg_buf = cmsg_space!([RawFd; 1]);
    // zero-filled so a truncated buffer can be walked after the fact
    cmsg_buf.resize(cmsg_buf.capacity(), 0);

    let (bytes, flags, mut fds, control_truncated) = {
        let msg = socket::recvmsg::<()>(
            socket,
            &mut iov,
            Some(&mut cmsg_buf),
            recv_flags(close_on_exec),
        )?;

        let mut fds = Vec::new();
        let control_truncated = match msg.cmsgs() {
            Ok(cmsgs) => {
                for cmsg in cmsgs {
                    if let ControlMessageOwned::ScmRights(received) = cmsg {
                        fds.extend_from_slice(&received);
                    }
                }
                false
            }
            // nix refuses to walk a truncated control buffer
            Err(Errno::ENOBUFS) => true,
            Err(errno) => return Err(errno),
        };

        (msg.bytes, msg.flags, fds, control_truncated)
    };

    // The kernel still installs whatever descriptors fit before setting
    // MSG_CTRUNC; they must be reported so the caller can close them.
    if control_truncated {
        fds = rights_in_control(&cmsg_buf);
    }

    Ok(RawMessage {
        bytes: bytes.min(capacity),
        fds,
        payload_truncated: flags.contains(MsgFlags::MSG_TRUNC),
        control_truncated,
    })
}

/// Collect every `SCM_RIGHTS` descriptor written into a control buffer
fn rights_in_control(control: &[u8]) -> Vec<RawFd> {
    let mut fds = Vec::new();
    let end = control.as_ptr() as usize + control.len();

    let mut mhdr: libc::msghdr = unsafe { mem::zeroed() };
    mhdr.msg_control = control.as_ptr() as *mut libc::c_void;
    mhdr.msg_controllen = control.len() as _;

    let mut cmsg = unsafe { libc::CMSG_FIRSTHDR(&mhdr) };
    while !cmsg.is_null() {
        let header = unsafe { cmsg.read_unaligned() };
        if (header.cmsg_len as usize) < mem::size_of::<libc::cmsghdr>() {
            break;
        }

        if header.cmsg_level == libc::SOL_SOCKET && header.cmsg_type == libc::SCM_RIGHTS {
            let data = unsafe { libc::CMSG_DATA(cmsg) } as *const RawFd;
            let data_len = (header.cmsg_len as usize)
                .saturating_sub(data as usize - cmsg as usize)
                .min(end.saturating_sub(data as usize));
            for i in 0..data_len / mem::size_of::<RawFd>() {
                fds.push(unsafe { data.add(i).read_unaligned() });
            }
        }

        cmsg = unsafe { libc::CMSG_NXTHDR(&mhdr, cmsg) };
    }

    fds
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn send_flags(no_signal: bool) -> MsgFlags {
    if no_signal {
        MsgFlags::MSG_NOSIGNAL
    } else {
        MsgFlags::empty()
    }
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn send_flags(_no_signal: bool) -> MsgFlags {
    MsgFlags::empty()
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn recv_flags(close_on_exec: bool) -> MsgFlags {
    if close_on_exec {
        MsgFlags::MSG_CMSG_CLOEXEC
    } else {
        MsgFlags::empty()
    }
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn recv_flags(_close_on_exec: bool) -> MsgFlags {
    MsgFlags::empty()
}
