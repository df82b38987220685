// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::Debug;
use std::io;
use std::os::fd::RawFd;

/// Bindings for the descriptor syscalls issued by this crate.
///
/// All descriptor FFI calls must go through this trait, enabling them to be mocked.
#[cfg_attr(test, mockall::automock)]
pub trait Bindings: Debug + Send + Sync + 'static {
    /// Switches the descriptor into non-blocking mode, preserving its other status flags.
    fn set_nonblocking(&self, fd: RawFd) -> io::Result<()>;

    /// Closes the descriptor. The descriptor number is invalid afterwards even if an error
    /// is returned.
    fn close(&self, fd: RawFd) -> io::Result<()>;
}
