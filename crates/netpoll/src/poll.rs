// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{self, Debug};
use std::sync::Arc;

use crate::{Desc, Error, Event, Result};

/// Callback invoked by an [`EventPoll`] implementation when a started descriptor becomes ready.
///
/// The argument is the delivered [`Event`], which may contain delivered-only flags such as
/// [`Event::HUP`] or [`Event::POLLER_CLOSED`].
pub type CallbackFn = Box<dyn Fn(Event) + Send + Sync + 'static>;

type WaitErrorFn = Arc<dyn Fn(&Error) + Send + Sync + 'static>;

/// Configuration for constructing an [`EventPoll`] implementation.
#[derive(Clone, Default)]
#[non_exhaustive]
pub struct Config {
    on_wait_error: Option<WaitErrorFn>,
}

impl Config {
    /// Sets the callback invoked when the multiplexer's wait loop fails.
    ///
    /// Waiting continues after the callback returns. Without a callback, wait errors are
    /// dropped by the multiplexer.
    #[must_use]
    pub fn with_on_wait_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        self.on_wait_error = Some(Arc::new(f));
        self
    }

    /// Reports a wait error to the configured callback, if any.
    ///
    /// Called by multiplexer implementations.
    pub fn on_wait_error(&self, error: &Error) {
        if let Some(f) = &self.on_wait_error {
            f(error);
        }
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("on_wait_error", &self.on_wait_error.is_some())
            .finish()
    }
}

/// A readiness-based event multiplexer (epoll, kqueue or similar) operating on [`Desc`]s.
///
/// This crate does not provide an implementation for any kernel facility. Implementations are
/// supplied by the application at its composition root through [`EventPollFactory`].
pub trait EventPoll: Debug + Send + Sync {
    /// Adds `desc` to the watched set with the interest it was created with. `cb` is invoked
    /// for every delivered notification.
    ///
    /// # Errors
    ///
    /// Returns the error of the registration syscall.
    fn start(&self, desc: &Desc, cb: CallbackFn) -> Result<()>;

    /// Removes `desc` from the watched set. Must be called before the descriptor is closed.
    ///
    /// # Errors
    ///
    /// Returns the error of the deregistration syscall.
    fn stop(&self, desc: &Desc) -> Result<()>;

    /// Re-arms a descriptor started with [`Event::ONE_SHOT`] after a notification was
    /// delivered.
    ///
    /// # Errors
    ///
    /// Returns the error of the re-arm syscall.
    fn resume(&self, desc: &Desc) -> Result<()>;
}

/// Constructs [`EventPoll`] instances from a [`Config`].
pub trait EventPollFactory {
    /// The multiplexer type produced by this factory.
    type Poll: EventPoll;

    /// Creates a multiplexer.
    ///
    /// # Errors
    ///
    /// Returns an error if the multiplexer cannot be created. No partially initialized
    /// instance is ever returned.
    fn new_event_poll(&self, config: Config) -> Result<Self::Poll>;
}

/// Factory for build targets without a supported kernel readiness facility.
///
/// Always fails with [`Error::Unsupported`].
#[derive(Clone, Copy, Debug, Default)]
pub struct UnsupportedFactory;

/// The multiplexer of build targets without a supported kernel readiness facility.
///
/// This type has no values, so an instance can never exist.
#[derive(Debug)]
pub enum Unsupported {}

impl EventPoll for Unsupported {
    fn start(&self, _desc: &Desc, _cb: CallbackFn) -> Result<()> {
        match *self {}
    }

    fn stop(&self, _desc: &Desc) -> Result<()> {
        match *self {}
    }

    fn resume(&self, _desc: &Desc) -> Result<()> {
        match *self {}
    }
}

impl EventPollFactory for UnsupportedFactory {
    type Poll = Unsupported;

    fn new_event_poll(&self, _config: Config) -> Result<Self::Poll> {
        Err(Error::Unsupported)
    }
}
