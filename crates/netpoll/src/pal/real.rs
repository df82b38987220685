// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::io;
use std::os::fd::RawFd;

use crate::pal::Bindings;

/// FFI bindings that target the real operating system that the build is targeting.
///
/// You would only use different bindings in unit tests that need to simulate syscall failures.
/// Even then, whenever possible, unit tests should use real bindings for maximum realism.
#[derive(Debug, Default)]
pub struct BuildTargetBindings;

impl Bindings for BuildTargetBindings {
    #[cfg_attr(test, mutants::skip)] // Real syscalls are exercised by the integration tests.
    fn set_nonblocking(&self, fd: RawFd) -> io::Result<()> {
        // SAFETY: No safety requirements. F_GETFL on an invalid descriptor fails with EBADF.
        let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
        if flags == -1 {
            return Err(io::Error::last_os_error());
        }

        if flags & libc::O_NONBLOCK != 0 {
            return Ok(());
        }

        // SAFETY: No safety requirements. We only add O_NONBLOCK to the flags we just read.
        let result = unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) };
        if result == -1 {
            return Err(io::Error::last_os_error());
        }

        Ok(())
    }

    #[cfg_attr(test, mutants::skip)] // Real syscalls are exercised by the integration tests.
    fn close(&self, fd: RawFd) -> io::Result<()> {
        // SAFETY: No safety requirements. Closing a descriptor twice is logically invalid but
        // does not violate Rust language rules, so it is not a safety concern. Ownership of
        // the descriptor is tracked by the caller.
        let result = unsafe { libc::close(fd) };
        if result == -1 {
            return Err(io::Error::last_os_error());
        }

        Ok(())
    }
}
