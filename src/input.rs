//! User-abort polling
//!
//! The verifier checks for a pending keystroke at fixed points instead of
//! installing signal handlers. A check never blocks.

use log::{info, warn};
use std::io;

/// End of text, sent by a terminal on Ctrl-C
pub const ETX: u8 = 0x03;

/// Escape key
pub const ESC: u8 = 0x1b;

/// Non-blocking source of single input bytes
pub trait InputSource {
    /// Consume one pending byte, or return `None` right away if nothing is pending
    fn poll_byte(&mut self) -> io::Result<Option<u8>>;
}

/// Input source for unattended runs, never has anything pending
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInput;

impl InputSource for NoInput {
    fn poll_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(None)
    }
}

/// Whether a byte requests the test to stop
pub fn is_interrupt_byte(byte: u8) -> bool {
    matches!(byte, ETX | ESC | b'c' | b'q')
}

/// Check whether the user asked to abort
///
/// Consumes at most one byte. Bytes outside the interrupt set are dropped.
/// A failing poll counts as "no abort" so an odd stdin never ends a run.
pub fn check_user_abort<I: InputSource + ?Sized>(input: &mut I) -> bool {
    match input.poll_byte() {
        Ok(Some(byte)) if is_interrupt_byte(byte) => {
            info!("Abort requested (input byte {:#04x})", byte);
            true
        }
        Ok(_) => false,
        Err(e) => {
            warn!("Failed to poll for user input: {}", e);
            false
        }
    }
}

#[cfg(unix)]
pub use self::fd::FdInput;

#[cfg(unix)]
mod fd {
    use super::InputSource;
    use std::io;
    use std::os::fd::RawFd;

    /// Input polled straight from a file descriptor with a zero timeout
    ///
    /// Reads bypass `std::io::Stdin` buffering so exactly one byte is consumed.
    #[derive(Debug, Clone, Copy)]
    pub struct FdInput {
        fd: RawFd,
    }

    impl FdInput {
        pub fn stdin() -> Self {
            Self {
                fd: libc::STDIN_FILENO,
            }
        }

        /// The descriptor must stay open for as long as the source is polled
        pub fn from_raw_fd(fd: RawFd) -> Self {
            Self { fd }
        }
    }

    impl InputSource for FdInput {
        fn poll_byte(&mut self) -> io::Result<Option<u8>> {
            let mut pfd = libc::pollfd {
                fd: self.fd,
                events: libc::POLLIN,
                revents: 0,
            };

            let ret = unsafe { libc::poll(&mut pfd, 1, 0) };
            if ret < 0 {
                return Err(io::Error::last_os_error());
            }
            if ret == 0 || pfd.revents & libc::POLLIN == 0 {
                return Ok(None);
            }

            let mut byte = 0u8;
            let n = unsafe { libc::read(self.fd, (&mut byte as *mut u8).cast::<libc::c_void>(), 1) };
            match n {
                n if n < 0 => Err(io::Error::last_os_error()),
                0 => Ok(None), // EOF
                _ => Ok(Some(byte)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct Scripted(VecDeque<u8>);

    impl InputSource for Scripted {
        fn poll_byte(&mut self) -> io::Result<Option<u8>> {
            Ok(self.0.pop_front())
        }
    }

    struct Broken;

    impl InputSource for Broken {
        fn poll_byte(&mut self) -> io::Result<Option<u8>> {
            Err(io::Error::other("bad fd"))
        }
    }

    #[test]
    fn test_interrupt_set() {
        for byte in [0x03, 0x1b, b'c', b'q'] {
            assert!(is_interrupt_byte(byte));
        }
        for byte in [b'Q', b'C', b' ', b'\n', 0x00, 0x04] {
            assert!(!is_interrupt_byte(byte));
        }
    }

    #[test]
    fn test_other_bytes_are_consumed_one_at_a_time() {
        let mut input = Scripted(VecDeque::from(vec![b'x', b'q']));
        assert!(!check_user_abort(&mut input));
        assert_eq!(input.0.len(), 1);
        assert!(check_user_abort(&mut input));
        assert!(input.0.is_empty());
        assert!(!check_user_abort(&mut input));
    }

    #[test]
    fn test_poll_error_is_not_an_abort() {
        assert!(!check_user_abort(&mut Broken));
        assert!(!check_user_abort(&mut NoInput));
    }

    #[cfg(unix)]
    mod pipe {
        use super::super::*;
        use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};

        fn pipe() -> (OwnedFd, OwnedFd) {
            let mut fds = [0; 2];
            assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
            unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) }
        }

        fn send(fd: &OwnedFd, bytes: &[u8]) {
            let n = unsafe { libc::write(fd.as_raw_fd(), bytes.as_ptr().cast(), bytes.len()) };
            assert_eq!(n, bytes.len() as isize);
        }

        #[test]
        fn test_empty_pipe_does_not_block() {
            let (rx, _tx) = pipe();
            let mut input = FdInput::from_raw_fd(rx.as_raw_fd());
            assert_eq!(input.poll_byte().unwrap(), None);
            assert!(!check_user_abort(&mut input));
        }

        #[test]
        fn test_consumes_exactly_one_byte() {
            let (rx, tx) = pipe();
            send(&tx, b"aq");
            let mut input = FdInput::from_raw_fd(rx.as_raw_fd());

            assert!(!check_user_abort(&mut input));
            assert!(check_user_abort(&mut input));
            assert_eq!(input.poll_byte().unwrap(), None);
        }

        #[test]
        fn test_closed_writer_reads_as_nothing_pending() {
            let (rx, tx) = pipe();
            drop(tx);
            let mut input = FdInput::from_raw_fd(rx.as_raw_fd());
            assert_eq!(input.poll_byte().unwrap(), None);
        }
    }
}
