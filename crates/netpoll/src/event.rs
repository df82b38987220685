// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{self, Display};

use derive_more::{BitAnd, BitAndAssign, BitOr, BitOrAssign};

/// A set of readiness conditions and delivery modes.
///
/// An `Event` serves two purposes:
///
/// * As **interest**, it is attached to a [`Desc`][crate::Desc] when the descriptor is created
///   and tells the multiplexer which readiness classes to watch ([`READ`][Self::READ],
///   [`WRITE`][Self::WRITE]) and how to deliver them ([`EDGE_TRIGGERED`][Self::EDGE_TRIGGERED],
///   [`ONE_SHOT`][Self::ONE_SHOT]). Without `EDGE_TRIGGERED`, delivery is level-triggered.
/// * As **notification**, it is passed to the callback registered with
///   [`EventPoll::start()`][crate::EventPoll::start]. Notifications may additionally carry the
///   delivered-only flags [`READ_HUP`][Self::READ_HUP], [`HUP`][Self::HUP], [`ERR`][Self::ERR]
///   and [`POLLER_CLOSED`][Self::POLLER_CLOSED].
///
/// Values compose with `|` and are queried with [`contains()`][Self::contains]:
///
/// ```
/// use netpoll::Event;
///
/// let event = Event::READ | Event::WRITE | Event::ONE_SHOT;
///
/// assert!(event.contains(Event::READ));
/// assert!(!event.contains(Event::EDGE_TRIGGERED));
/// ```
#[derive(BitAnd, BitAndAssign, BitOr, BitOrAssign, Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Event(u16);

impl Event {
    /// No readiness condition.
    pub const NONE: Self = Self(0);

    /// The descriptor is ready to be read from.
    pub const READ: Self = Self(0x1);

    /// The descriptor is ready to be written to.
    pub const WRITE: Self = Self(0x2);

    /// Interest is disabled after one delivery until it is re-armed via
    /// [`EventPoll::resume()`][crate::EventPoll::resume].
    ///
    /// This prevents the same readiness from being delivered to several worker threads at once.
    pub const ONE_SHOT: Self = Self(0x4);

    /// Readiness is reported only when the descriptor transitions into the ready state.
    ///
    /// The consumer must drain all available I/O before waiting again, otherwise the next
    /// notification only arrives with the next transition.
    pub const EDGE_TRIGGERED: Self = Self(0x8);

    /// (Delivered only) The peer closed its writing half of the connection.
    pub const READ_HUP: Self = Self(0x10);

    /// (Delivered only) The descriptor was hung up.
    pub const HUP: Self = Self(0x20);

    /// (Delivered only) An error condition happened on the descriptor.
    pub const ERR: Self = Self(0x40);

    /// (Delivered only) The multiplexer was closed and no more notifications follow.
    pub const POLLER_CLOSED: Self = Self(0x8000);

    const NAMES: [(Self, &'static str); 8] = [
        (Self::READ, "READ"),
        (Self::WRITE, "WRITE"),
        (Self::ONE_SHOT, "ONE_SHOT"),
        (Self::EDGE_TRIGGERED, "EDGE_TRIGGERED"),
        (Self::READ_HUP, "READ_HUP"),
        (Self::HUP, "HUP"),
        (Self::ERR, "ERR"),
        (Self::POLLER_CLOSED, "POLLER_CLOSED"),
    ];

    /// Creates an event from raw bits, keeping bits that have no named flag.
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Returns the raw bits of the event.
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Composes two events. Equivalent to `self | other`, usable in const contexts.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether every flag of `other` is also set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether `self` and `other` share at least one flag.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether no flag is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NONE");
        }

        let mut remaining = self.0;
        let mut first = true;

        for (flag, name) in Self::NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                remaining &= !flag.0;
                first = false;
            }
        }

        if remaining != 0 {
            if !first {
                f.write_str("|")?;
            }
            write!(f, "{remaining:#x}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composition_is_bitwise() {
        let event = Event::READ | Event::WRITE | Event::ONE_SHOT;

        assert!(event.contains(Event::READ));
        assert!(event.contains(Event::WRITE | Event::ONE_SHOT));
        assert!(!event.contains(Event::EDGE_TRIGGERED));
        assert!(!event.contains(Event::READ | Event::EDGE_TRIGGERED));
        assert!(event.intersects(Event::READ | Event::EDGE_TRIGGERED));
        assert_eq!(event.bits(), 0x7);
        assert_eq!(event, Event::READ.union(Event::WRITE).union(Event::ONE_SHOT));
    }

    #[test]
    fn level_triggered_by_default() {
        assert!(!Event::READ.contains(Event::EDGE_TRIGGERED));
        assert!(Event::default().is_empty());
        assert_eq!(Event::default(), Event::NONE);
    }

    #[test]
    fn assign_operators() {
        let mut event = Event::READ;
        event |= Event::HUP;
        assert_eq!(event, Event::READ | Event::HUP);

        event &= Event::HUP;
        assert_eq!(event, Event::HUP);
        assert_eq!(Event::READ & Event::WRITE, Event::NONE);
    }

    #[test]
    fn flags_do_not_overlap() {
        for (i, (a, _)) in Event::NAMES.iter().enumerate() {
            for (b, _) in &Event::NAMES[i + 1..] {
                assert!(!a.intersects(*b), "{a} overlaps {b}");
            }
        }
    }

    #[test]
    fn display() {
        assert_eq!(Event::NONE.to_string(), "NONE");
        assert_eq!(Event::READ.to_string(), "READ");
        assert_eq!(
            (Event::READ | Event::WRITE | Event::EDGE_TRIGGERED).to_string(),
            "READ|WRITE|EDGE_TRIGGERED"
        );
        assert_eq!(
            (Event::POLLER_CLOSED | Event::ERR).to_string(),
            "ERR|POLLER_CLOSED"
        );
        assert_eq!(Event::from_bits(0x101).to_string(), "READ|0x100");
        assert_eq!(Event::from_bits(0x200).to_string(), "0x200");
    }
}
