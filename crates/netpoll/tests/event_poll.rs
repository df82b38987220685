// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(not(miri))] // Miri cannot talk to real OS.

//! Exercises the multiplexer contract with an in-memory multiplexer supplied at the composition
//! root, the way an application injects its platform implementation.

use std::collections::HashMap;
use std::os::fd::RawFd;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use netpoll::{
    CallbackFn, Config, Desc, Error, Event, EventPoll, EventPollFactory, Result, UnsupportedFactory,
};

mod util;

use util::{log_to_console, tcp_pair};

struct Registration {
    event: Event,
    armed: bool,
    cb: CallbackFn,
}

/// Delivers notifications only when told to via `notify()`, honoring one-shot semantics.
struct FakePoll {
    registrations: Mutex<HashMap<RawFd, Registration>>,
    config: Config,
}

impl std::fmt::Debug for FakePoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakePoll").finish_non_exhaustive()
    }
}

impl FakePoll {
    /// Simulates the kernel reporting `ready` on `fd`. Returns whether a callback was invoked.
    fn notify(&self, fd: RawFd, ready: Event) -> bool {
        let mut registrations = self.registrations.lock().unwrap();

        let Some(registration) = registrations.get_mut(&fd) else {
            return false;
        };

        let delivered = ready & (registration.event | Event::HUP | Event::ERR | Event::READ_HUP);
        if !registration.armed || delivered.is_empty() {
            return false;
        }

        if registration.event.contains(Event::ONE_SHOT) {
            registration.armed = false;
        }

        (registration.cb)(delivered);
        true
    }

    fn fail_wait(&self) {
        self.config
            .on_wait_error(&Error::StdIo(std::io::Error::from(std::io::ErrorKind::Interrupted)));
    }
}

impl EventPoll for FakePoll {
    fn start(&self, desc: &Desc, cb: CallbackFn) -> Result<()> {
        let mut registrations = self.registrations.lock().unwrap();
        if registrations.contains_key(&desc.fd()) {
            return Err(std::io::Error::from(std::io::ErrorKind::AlreadyExists).into());
        }

        registrations.insert(
            desc.fd(),
            Registration {
                event: desc.event(),
                armed: true,
                cb,
            },
        );
        Ok(())
    }

    fn stop(&self, desc: &Desc) -> Result<()> {
        self.registrations
            .lock()
            .unwrap()
            .remove(&desc.fd())
            .map(|_| ())
            .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::NotFound).into())
    }

    fn resume(&self, desc: &Desc) -> Result<()> {
        let mut registrations = self.registrations.lock().unwrap();
        let registration = registrations
            .get_mut(&desc.fd())
            .ok_or_else(|| Error::from(std::io::Error::from(std::io::ErrorKind::NotFound)))?;

        registration.armed = true;
        Ok(())
    }
}

struct FakeFactory;

impl EventPollFactory for FakeFactory {
    type Poll = FakePoll;

    fn new_event_poll(&self, config: Config) -> Result<Self::Poll> {
        Ok(FakePoll {
            registrations: Mutex::default(),
            config,
        })
    }
}

fn counting_callback(count: &Arc<AtomicUsize>) -> CallbackFn {
    let count = Arc::clone(count);
    Box::new(move |event| {
        assert!(event.contains(Event::READ));
        count.fetch_add(1, Ordering::Relaxed);
    })
}

#[test]
fn one_shot_requires_resume() -> Result<()> {
    log_to_console();

    let poll = FakeFactory.new_event_poll(Config::default())?;
    let (client, _server) = tcp_pair()?;
    let desc = netpoll::handle_read_once(&client)?;
    let count = Arc::new(AtomicUsize::new(0));

    poll.start(&desc, counting_callback(&count))?;

    assert!(poll.notify(desc.fd(), Event::READ));
    assert!(!poll.notify(desc.fd(), Event::READ));
    assert_eq!(count.load(Ordering::Relaxed), 1);

    poll.resume(&desc)?;
    assert!(poll.notify(desc.fd(), Event::READ));
    assert_eq!(count.load(Ordering::Relaxed), 2);

    poll.stop(&desc)?;
    desc.close()
}

#[test]
fn edge_triggered_stays_armed() -> Result<()> {
    let poll = FakeFactory.new_event_poll(Config::default())?;
    let (client, _server) = tcp_pair()?;
    let desc = netpoll::handle_read(&client)?;
    let count = Arc::new(AtomicUsize::new(0));

    poll.start(&desc, counting_callback(&count))?;

    assert!(poll.notify(desc.fd(), Event::READ));
    assert!(poll.notify(desc.fd(), Event::READ | Event::WRITE));
    assert!(!poll.notify(desc.fd(), Event::WRITE));
    assert_eq!(count.load(Ordering::Relaxed), 2);

    poll.stop(&desc)?;
    assert!(!poll.notify(desc.fd(), Event::READ));
    desc.close()
}

#[test]
fn double_start_is_rejected() -> Result<()> {
    let poll = FakeFactory.new_event_poll(Config::default())?;
    let (client, _server) = tcp_pair()?;
    let desc = netpoll::handle_read(&client)?;

    poll.start(&desc, Box::new(|_| {}))?;
    let error = poll.start(&desc, Box::new(|_| {})).unwrap_err();

    let io_error: std::io::Error = error.into();
    assert_eq!(io_error.kind(), std::io::ErrorKind::AlreadyExists);

    poll.stop(&desc)?;
    desc.close()
}

#[test]
fn wait_errors_reach_config_callback() -> Result<()> {
    let errors = Arc::new(AtomicUsize::new(0));
    let config = Config::default().with_on_wait_error({
        let errors = Arc::clone(&errors);
        move |_| {
            errors.fetch_add(1, Ordering::Relaxed);
        }
    });

    let poll = FakeFactory.new_event_poll(config)?;
    poll.fail_wait();
    poll.fail_wait();

    assert_eq!(errors.load(Ordering::Relaxed), 2);
    Ok(())
}

#[test]
fn unsupported_factory_reports_error() {
    let result = UnsupportedFactory.new_event_poll(Config::default());

    let error = result.unwrap_err();
    assert!(
        error
            .to_string()
            .contains("not supported on this operating system")
    );
}
