// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::any::Any;
use std::cell::OnceCell;
use std::os::fd::AsRawFd;

use tracing::{Level, event};

use crate::extract::as_extract;
use crate::pal::BindingsFacade;
use crate::{Desc, Error, Event, Extract, Result};

/// Interest used by [`handle_read()`].
pub const READ: Event = Event::READ.union(Event::EDGE_TRIGGERED);

/// Interest used by [`handle_read_once()`].
pub const READ_ONCE: Event = Event::READ.union(Event::ONE_SHOT);

/// Interest used by [`handle_write()`].
pub const WRITE: Event = Event::WRITE.union(Event::EDGE_TRIGGERED);

/// Interest used by [`handle_write_once()`].
pub const WRITE_ONCE: Event = Event::WRITE.union(Event::ONE_SHOT);

/// Interest used by [`handle_read_write()`].
pub const READ_WRITE: Event = Event::READ.union(Event::WRITE).union(Event::EDGE_TRIGGERED);

/// Creates a [`Desc`] for a connection, for further use with [`EventPoll`][crate::EventPoll]
/// methods.
///
/// The connection's descriptor is duplicated and the duplicate is switched to non-blocking
/// mode, so the returned `Desc` can be closed without affecting `conn`. Because the duplicate
/// shares the open file description with `conn`, the non-blocking flag is visible through
/// `conn` as well.
///
/// # Errors
///
/// * [`Error::Extract`] if duplicating the descriptor fails.
/// * [`Error::SetNonblocking`] if the duplicate cannot be switched to non-blocking mode. The
///   duplicate is closed before this is returned.
pub fn handle<C>(conn: &C, event: Event) -> Result<Desc>
where
    C: Extract + ?Sized,
{
    construct(Some(&conn), event, BindingsFacade::real())
}

/// Creates a read descriptor for a connection.
///
/// Same as `handle(conn, Event::READ | Event::EDGE_TRIGGERED)`.
///
/// # Errors
///
/// See [`handle()`].
pub fn handle_read<C>(conn: &C) -> Result<Desc>
where
    C: Extract + ?Sized,
{
    handle(conn, READ)
}

/// Creates a read descriptor for a connection.
///
/// Same as `handle(conn, Event::READ | Event::ONE_SHOT)`.
///
/// # Errors
///
/// See [`handle()`].
pub fn handle_read_once<C>(conn: &C) -> Result<Desc>
where
    C: Extract + ?Sized,
{
    handle(conn, READ_ONCE)
}

/// Creates a write descriptor for a connection.
///
/// Same as `handle(conn, Event::WRITE | Event::EDGE_TRIGGERED)`.
///
/// # Errors
///
/// See [`handle()`].
pub fn handle_write<C>(conn: &C) -> Result<Desc>
where
    C: Extract + ?Sized,
{
    handle(conn, WRITE)
}

/// Creates a write descriptor for a connection.
///
/// Same as `handle(conn, Event::WRITE | Event::ONE_SHOT)`.
///
/// # Errors
///
/// See [`handle()`].
pub fn handle_write_once<C>(conn: &C) -> Result<Desc>
where
    C: Extract + ?Sized,
{
    handle(conn, WRITE_ONCE)
}

/// Creates a read and write descriptor for a connection.
///
/// Same as `handle(conn, Event::READ | Event::WRITE | Event::EDGE_TRIGGERED)`.
///
/// # Errors
///
/// See [`handle()`].
pub fn handle_read_write<C>(conn: &C) -> Result<Desc>
where
    C: Extract + ?Sized,
{
    handle(conn, READ_WRITE)
}

/// Creates a [`Desc`] for a listener.
///
/// Listeners are normally only watched for [`Event::READ`] (incoming connections), but any
/// interest is accepted.
///
/// # Errors
///
/// See [`handle()`].
pub fn handle_listener<L>(listener: &L, event: Event) -> Result<Desc>
where
    L: Extract + ?Sized,
{
    construct(Some(&listener), event, BindingsFacade::real())
}

/// Creates a [`Desc`] for a type-erased network object.
///
/// The standard library sockets (`TcpStream`, `TcpListener`, `UdpSocket`, `UnixStream`,
/// `UnixListener`, `UnixDatagram`) are recognized.
///
/// # Errors
///
/// * [`Error::NotExtractable`] if `source` is of any other type. Nothing is duplicated.
/// * Otherwise, see [`handle()`].
pub fn handle_any(source: &dyn Any, event: Event) -> Result<Desc> {
    construct(as_extract(source), event, BindingsFacade::real())
}

/// Unwraps the result of a descriptor constructor, panicking on error.
///
/// Intended for initialization code that treats a failure to create a descriptor as
/// unrecoverable:
///
/// ```no_run
/// # fn main() -> std::io::Result<()> {
/// let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
/// let desc = netpoll::must(netpoll::handle_listener(&listener, netpoll::Event::READ));
/// # Ok(())
/// # }
/// ```
///
/// # Panics
///
/// Panics if `result` is an error.
#[must_use]
#[track_caller]
#[expect(clippy::panic, reason = "fail-fast helper, panicking is the whole point")]
pub fn must(result: Result<Desc>) -> Desc {
    match result {
        Ok(desc) => desc,
        Err(e) => panic!("failed to create descriptor: {e}"),
    }
}

fn construct(source: Option<&dyn Extract>, event: Event, bindings: BindingsFacade) -> Result<Desc> {
    let source = source.ok_or(Error::NotExtractable)?;

    let file = source.extract().map_err(Error::Extract)?;

    event!(Level::TRACE, message = "extracted descriptor", fd = file.as_raw_fd(), event = %event);

    Desc::with_bindings(file, event, OnceCell::new(), bindings)
}
