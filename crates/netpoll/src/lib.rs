// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Pollable descriptor handles for readiness-based I/O multiplexers (epoll, kqueue and similar).
//!
//! A multiplexer needs three things from the network objects it watches: a file descriptor it
//! may register and later forget about without affecting the object's owner, a guarantee that the
//! descriptor is in non-blocking mode, and the interest (readable, writable, edge-triggered,
//! one-shot) to register it with. This crate turns network objects into such descriptors.
//!
//! The crate consists of the following components:
//!
//! 1. [`Event`] is the interest model: composable flags describing which readiness classes to
//!    watch and how notifications are delivered.
//! 1. [`Extract`] is the single capability a network object needs: producing an independently
//!    owned duplicate of its descriptor. It is implemented for the standard library sockets.
//! 1. [`Desc`] wraps one duplicated, non-blocking descriptor together with its interest. This is
//!    the unit registered with and removed from a multiplexer.
//! 1. [`handle()`] and friends create a [`Desc`] from a network object, rolling back (closing the
//!    duplicate) if the descriptor cannot be prepared.
//! 1. [`EventPoll`] is the contract a multiplexer implementation satisfies. Implementations are
//!    provided by the application through [`EventPollFactory`]. On build targets without a
//!    supported kernel readiness facility, `netpoll::new()` always fails with [`Error::Unsupported`].
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> netpoll::Result<()> {
//! use std::net::TcpStream;
//!
//! use netpoll::Event;
//!
//! let conn = TcpStream::connect("127.0.0.1:8080")?;
//!
//! // Watch for readability, re-arming manually after each notification.
//! let desc = netpoll::handle_read_once(&conn)?;
//! assert_eq!(desc.event(), Event::READ | Event::ONE_SHOT);
//!
//! // ... start/resume/stop `desc` on a multiplexer ...
//!
//! desc.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! This crate does not wait for readiness itself, does not implement timers and never looks at
//! the data flowing through the descriptors.

#[cfg(not(unix))]
compile_error!("netpoll only supports Unix platforms.");

pub(crate) mod pal;

mod desc;
mod error;
mod event;
mod extract;
mod handle;
mod poll;

pub use desc::*;
pub use error::*;
pub use event::*;
pub use extract::Extract;
pub use handle::*;
pub use poll::*;

/// Creates the multiplexer of the build target.
///
/// This build target has no supported kernel readiness facility, so this always fails.
///
/// # Errors
///
/// Always returns [`Error::Unsupported`].
#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd",
)))]
pub fn new(config: Config) -> Result<Unsupported> {
    UnsupportedFactory.new_event_poll(config)
}
