// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use thiserror::Error;

/// Any error that may arise while turning network objects into pollable descriptors or while
/// constructing an event multiplexer.
///
/// Callers can branch on [`Error::NotExtractable`] to tell "wrong kind of object" apart from
/// operating system failures, which are carried as `std::io::Error` inside the other variants.
///
/// # Thread safety
///
/// This type is thread-safe.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The source object cannot produce an independently owned copy of its file descriptor.
    ///
    /// No operating system resource was touched when this is returned.
    #[error("object is not able to produce a copy of its file descriptor")]
    NotExtractable,

    /// Duplicating the file descriptor of the source object failed, e.g. because the descriptor
    /// table is exhausted or the object is already closed.
    #[error("extract descriptor: {0}")]
    Extract(#[source] std::io::Error),

    /// The duplicated descriptor could not be switched to non-blocking mode. The duplicate has
    /// already been closed by the time this is returned.
    #[error("setnonblock: {0}")]
    SetNonblocking(#[source] std::io::Error),

    /// Releasing the descriptor failed. The descriptor number must not be used afterwards.
    #[error("close: {0}")]
    Close(#[source] std::io::Error),

    /// The build target has no kernel readiness facility that a multiplexer can be built on.
    #[error("poller is not supported on this operating system")]
    Unsupported,

    /// We are forwarding an error received from the standard library's I/O APIs.
    #[error(transparent)]
    StdIo(#[from] std::io::Error),

    /// We are forwarding an error of unknown type from an unspecified source, typically a
    /// multiplexer implementation.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// A specialized `Result` for use with descriptor and multiplexer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents the error as a standard I/O error, for callers that interoperate with libraries
/// expecting standard I/O errors.
impl From<Error> for std::io::Error {
    fn from(value: Error) -> Self {
        match value {
            Error::StdIo(error) | Error::Extract(error) => error,
            Error::Unsupported => Self::new(std::io::ErrorKind::Unsupported, value),
            _ => Self::other(value),
        }
    }
}
