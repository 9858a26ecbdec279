//! Descriptor passing between a forked child and its parent

use std::fs::File;
use std::io::{Read, Write};
use std::os::unix::net::{UnixDatagram, UnixStream};

use fdpass::{Error, PLACEHOLDER_BYTE, ReceivedFd, recv_fd, recv_fd_default, send_fd};
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::{ForkResult, fork};

/// Run `child` in a forked process and `parent` here, then reap the child
///
/// The child reports failure through its exit code and never returns into
/// the test harness.
fn run_forked(child: impl FnOnce() -> bool, parent: impl FnOnce()) {
    match unsafe { fork() }.unwrap() {
        ForkResult::Child => {
            let ok = std::panic::catch_unwind(std::panic::AssertUnwindSafe(child)).unwrap_or(false);
            unsafe { nix::libc::_exit(if ok { 0 } else { 1 }) };
        }
        ForkResult::Parent { child } => {
            parent();
            assert_eq!(waitpid(child, None).unwrap(), WaitStatus::Exited(child, 0));
        }
    }
}

fn assert_reads_zeros(received: ReceivedFd) {
    let mut file = received.into_file();
    let mut buf = [0xffu8; 512];
    file.read_exact(&mut buf).unwrap();
    assert!(buf.iter().all(|&b| b == 0));
}

/// One-byte handshake so each message is consumed before the next is sent
fn signal_go(mut sock: &UnixStream) {
    sock.write_all(b"a").unwrap();
}

fn wait_go(mut sock: &UnixStream) -> bool {
    let mut go = [0u8; 1];
    sock.read_exact(&mut go).is_ok()
}

#[test]
fn test_child_sends_dev_zero() {
    let (parent_sock, child_sock) = UnixStream::pair().unwrap();

    run_forked(
        move || {
            let Ok(zero) = File::open("/dev/zero") else {
                return false;
            };
            matches!(send_fd(&child_sock, &zero, b"foobar"), Ok(6))
        },
        || {
            let received = recv_fd_default(&parent_sock).unwrap();
            assert_eq!(received.payload(), b"foobar");
            assert_reads_zeros(received);
        },
    );
}

fn child_sequence(sock: &UnixStream) -> bool {
    let Ok(zero) = File::open("/dev/zero") else {
        return false;
    };
    let step = |payload: &[u8], expected: usize| {
        wait_go(sock) && matches!(send_fd(sock, &zero, payload), Ok(n) if n == expected)
    };

    step(b"", 0)
        && step(b"a", 1)
        && step(b"\0", 1)
        && step(b"foobar", 6)
        && step(b"long string is long", 19)
        && step(b"foobar", 6)
        && wait_go(sock)
        && { sock }.write_all(b"barbaz").is_ok()
}

#[test]
fn test_stream_sequence() {
    let (parent_sock, child_sock) = UnixStream::pair().unwrap();

    run_forked(
        move || child_sequence(&child_sock),
        || {
            signal_go(&parent_sock);
            let received = recv_fd_default(&parent_sock).unwrap();
            assert_eq!(received.payload(), &[PLACEHOLDER_BYTE]);
            assert_reads_zeros(received);

            for expected in [&b"a"[..], b"\0", b"foobar"] {
                signal_go(&parent_sock);
                let received = recv_fd_default(&parent_sock).unwrap();
                assert_eq!(received.payload(), expected);
                assert_reads_zeros(received);
            }

            signal_go(&parent_sock);
            let received = recv_fd(&parent_sock, 11).unwrap();
            assert_eq!(received.payload(), b"long string");
            assert_reads_zeros(received);
            let mut rest = [0u8; 8];
            (&parent_sock).read_exact(&mut rest).unwrap();
            assert_eq!(&rest, b" is long");

            // consumed with a plain read, so the attached descriptor is dropped
            signal_go(&parent_sock);
            let mut plain = [0u8; 6];
            (&parent_sock).read_exact(&mut plain).unwrap();
            assert_eq!(&plain, b"foobar");

            signal_go(&parent_sock);
            assert!(matches!(
                recv_fd_default(&parent_sock),
                Err(Error::MalformedTransfer)
            ));
        },
    );
}

#[test]
fn test_datagram_child_sends() {
    let (parent_sock, child_sock) = UnixDatagram::pair().unwrap();

    run_forked(
        move || {
            let Ok(zero) = File::open("/dev/zero") else {
                return false;
            };
            matches!(send_fd(&child_sock, &zero, b"a"), Ok(1))
                && matches!(send_fd(&child_sock, &zero, b"full write"), Ok(10))
                && child_sock.send(b"mismatch").is_ok()
        },
        || {
            let received = recv_fd_default(&parent_sock).unwrap();
            assert_eq!(received.payload(), b"a");
            assert_reads_zeros(received);

            let received = recv_fd_default(&parent_sock).unwrap();
            assert_eq!(received.payload(), b"full write");
            assert_reads_zeros(received);

            assert!(matches!(
                recv_fd_default(&parent_sock),
                Err(Error::MalformedTransfer)
            ));
        },
    );
}
