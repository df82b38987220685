// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Shared helpers for the integration tests.

#![allow(dead_code, reason = "each test crate uses a different subset of the helpers")]

use std::io;
use std::net::{TcpListener, TcpStream};

/// Installs a console subscriber that emits all trace events. Subsequent calls are no-ops,
/// so every test can call this without coordinating with the others.
pub fn log_to_console() {
    _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

/// Returns both ends of a loopback TCP connection, in blocking mode.
pub fn tcp_pair() -> io::Result<(TcpStream, TcpStream)> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let client = TcpStream::connect(listener.local_addr()?)?;
    let (server, _) = listener.accept()?;
    Ok((client, server))
}
