// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::cell::OnceCell;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, FromRawFd, IntoRawFd, OwnedFd, RawFd};

use tracing::{Level, event};

use crate::pal::{Bindings, BindingsFacade};
use crate::{Error, Event, Result};

/// A network descriptor prepared for use with an [`EventPoll`][crate::EventPoll] implementation.
///
/// A `Desc` owns a file descriptor that is in non-blocking mode and carries the [`Event`]
/// interest the multiplexer is asked to watch for. The interest is fixed for the lifetime of
/// the instance.
///
/// You can obtain instances from [`handle()`][crate::handle] and its shorthands, from
/// [`handle_listener()`][crate::handle_listener] or directly from a descriptor you own via
/// [`Desc::new()`] and [`Desc::from_raw_fd()`].
///
/// # Resource management
///
/// The owned descriptor is a duplicate when created from a network object, so closing the
/// `Desc` never closes the source object. Note that duplicates share the open file description
/// with the source, which means the non-blocking flag set during construction is observed
/// through the source as well.
///
/// Call [`close()`][Self::close] to release the descriptor and observe the result of the
/// `close(2)` syscall. Dropping an unclosed `Desc` releases the descriptor and ignores errors.
/// Either way, stop the descriptor in the multiplexer first: the kernel may reuse the
/// descriptor number as soon as it is released.
///
/// # Thread safety
///
/// This type is thread-mobile. It is not `Sync`; callers must serialize access to a single
/// instance themselves.
#[derive(derive_more::Debug)]
pub struct Desc {
    file: OwnedFd,
    event: Event,

    // Descriptor number handed to the multiplexer. Known up front when the caller supplied a
    // raw descriptor, otherwise resolved on first use.
    desc: OnceCell<RawFd>,

    #[debug(ignore)]
    bindings: BindingsFacade,
}

impl Desc {
    /// Creates a descriptor from an owned file descriptor, switching it to non-blocking mode.
    ///
    /// No duplication is performed: ownership of `fd` is transferred to the new `Desc`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SetNonblocking`] if the descriptor cannot be switched to non-blocking
    /// mode. The descriptor is closed in that case.
    pub fn new(fd: OwnedFd, event: Event) -> Result<Self> {
        Self::with_bindings(fd, event, OnceCell::new(), BindingsFacade::real())
    }

    /// Creates a descriptor from a raw file descriptor, switching it to non-blocking mode.
    ///
    /// No duplication is performed: the caller transfers ownership of `fd` to the new `Desc`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SetNonblocking`] if the descriptor cannot be switched to non-blocking
    /// mode. The descriptor is closed in that case.
    ///
    /// # Safety
    ///
    /// The same requirements as [`OwnedFd::from_raw_fd()`] apply: `fd` must be open and
    /// must not be owned by anything else.
    pub unsafe fn from_raw_fd(fd: RawFd, event: Event) -> Result<Self> {
        // SAFETY: Forwarding safety requirements.
        let file = unsafe { OwnedFd::from_raw_fd(fd) };

        Self::with_bindings(file, event, OnceCell::from(fd), BindingsFacade::real())
    }

    /// Takes ownership of `file`, forcing it into non-blocking mode. On failure the descriptor
    /// is closed before the error is returned, so no partially constructed `Desc` escapes.
    pub(crate) fn with_bindings(
        file: OwnedFd,
        event: Event,
        desc: OnceCell<RawFd>,
        bindings: BindingsFacade,
    ) -> Result<Self> {
        if let Err(e) = bindings.set_nonblocking(file.as_raw_fd()) {
            // Close errors are superseded by the coercion error.
            _ = bindings.close(file.into_raw_fd());
            return Err(Error::SetNonblocking(e));
        }

        event!(Level::TRACE, message = "new descriptor", fd = file.as_raw_fd(), event = %event);

        Ok(Self {
            file,
            event,
            desc,
            bindings,
        })
    }

    /// Returns the descriptor number used for multiplexer registration.
    ///
    /// The number is stable for the lifetime of the `Desc`.
    #[must_use]
    pub fn fd(&self) -> RawFd {
        *self.desc.get_or_init(|| self.file.as_raw_fd())
    }

    /// Returns the event interest the descriptor was created with.
    #[must_use]
    pub const fn event(&self) -> Event {
        self.event
    }

    /// Releases the descriptor.
    ///
    /// The descriptor number must be considered invalid after this returns, regardless of
    /// the result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Close`] if the `close(2)` syscall reports an error.
    pub fn close(self) -> Result<()> {
        let Self { file, bindings, .. } = self;
        let fd = file.into_raw_fd();

        event!(Level::TRACE, message = "closing descriptor", fd);

        bindings.close(fd).map_err(Error::Close)
    }
}

impl AsFd for Desc {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.file.as_fd()
    }
}

impl AsRawFd for Desc {
    fn as_raw_fd(&self) -> RawFd {
        self.fd()
    }
}
