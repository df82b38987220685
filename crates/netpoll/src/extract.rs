// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::any::Any;
use std::io;
use std::net::{TcpListener, TcpStream, UdpSocket};
use std::os::fd::{AsFd, OwnedFd};
use std::os::unix::net::{UnixDatagram, UnixListener, UnixStream};
use std::sync::Arc;

/// Objects that can produce an independently owned copy of their underlying file descriptor.
///
/// This is the only capability the descriptor factory requires from a network object, so
/// it never depends on concrete connection or listener types.
///
/// # Contract
///
/// The returned descriptor must be a new duplicate. Closing it must never close or otherwise
/// affect the object it was extracted from. Implementations over [`AsFd`] types should use
/// [`BorrowedFd::try_clone_to_owned()`][std::os::fd::BorrowedFd::try_clone_to_owned], which
/// duplicates with the close-on-exec flag set.
///
/// Extraction may fail with resource exhaustion (`EMFILE`) or because the object is already
/// closed. Such errors are reported verbatim and are never retried.
pub trait Extract {
    /// Returns a freshly duplicated descriptor referring to the same kernel object as `self`.
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying duplication syscall.
    fn extract(&self) -> io::Result<OwnedFd>;
}

macro_rules! impl_extract_via_as_fd {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Extract for $ty {
                fn extract(&self) -> io::Result<OwnedFd> {
                    self.as_fd().try_clone_to_owned()
                }
            }
        )+
    };
}

impl_extract_via_as_fd!(
    TcpStream,
    TcpListener,
    UdpSocket,
    UnixStream,
    UnixListener,
    UnixDatagram,
);

impl<T: Extract + ?Sized> Extract for &T {
    fn extract(&self) -> io::Result<OwnedFd> {
        (**self).extract()
    }
}

impl<T: Extract + ?Sized> Extract for Box<T> {
    fn extract(&self) -> io::Result<OwnedFd> {
        (**self).extract()
    }
}

impl<T: Extract + ?Sized> Extract for Arc<T> {
    fn extract(&self) -> io::Result<OwnedFd> {
        (**self).extract()
    }
}

/// Projects a type-erased object onto the extractor capability, if its concrete type has it.
///
/// Only the standard library network types are recognized, since `Any` cannot be queried
/// for trait implementations.
pub(crate) fn as_extract(source: &dyn Any) -> Option<&dyn Extract> {
    macro_rules! try_downcast {
        ($($ty:ty),+ $(,)?) => {
            $(
                if let Some(value) = source.downcast_ref::<$ty>() {
                    return Some(value as &dyn Extract);
                }
            )+
        };
    }

    try_downcast!(
        TcpStream,
        TcpListener,
        UdpSocket,
        UnixStream,
        UnixListener,
        UnixDatagram,
    );

    None
}
