//! Link quality estimation from send-completion events.
//!
//! The radio reports every datagram's fate asynchronously. Those reports are queued as
//! [`CompletionEvent`]s and applied to the estimator by the control loop, which keeps all link
//! state single-owner. The estimator turns the event stream into:
//!
//! - `connected`: the outcome of the most recent completion
//! - `signal_level`: a 0..=5 bar count that moves one step per window toward the current
//!   `connected` state, and never more than once per window regardless of event rate
//! - `latency_ms`: time from a send to its successful completion
//!
//! The transport completes datagrams in send order, so each report is matched against the
//! oldest outstanding send timestamp.

use heapless::Deque;

use crate::config::{MAX_SIGNAL_STRENGTH, SIGNAL_UPDATE_INTERVAL_MS};
use crate::radio::MacAddress;
use crate::schedule::IntervalGate;

// =============================================================================
// Events
// =============================================================================

/// Delivery result reported by the radio for one datagram.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendOutcome {
    Success,
    Failure,
}

impl SendOutcome {
    #[inline]
    pub const fn is_success(self) -> bool { matches!(self, Self::Success) }
}

/// One asynchronous send-completion report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CompletionEvent {
    pub peer: MacAddress,
    pub outcome: SendOutcome,
    /// Time the report was received.
    pub at_ms: u64,
}

// =============================================================================
// State
// =============================================================================

/// Snapshot of the link as seen by the transmitter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkState {
    pub connected: bool,
    pub signal_level: u8,
    pub last_signal_update_ms: u64,
    pub last_send_ms: u64,
    /// Round trip of the most recent successful datagram.
    pub latency_ms: Option<u32>,
}

/// Sends awaiting a completion report. Older ones are forgotten when full.
pub const MAX_IN_FLIGHT: usize = 8;

/// Smoothed link indicator driven by [`CompletionEvent`]s.
#[derive(Clone, Debug)]
pub struct LinkQualityEstimator {
    state: LinkState,
    in_flight: Deque<u64, MAX_IN_FLIGHT>,
    gate: IntervalGate,
    delivered: u32,
    lost: u32,
}

impl LinkQualityEstimator {
    pub const fn new(update_interval_ms: u64) -> Self {
        Self {
            state: LinkState {
                connected: false,
                signal_level: 0,
                last_signal_update_ms: 0,
                last_send_ms: 0,
                latency_ms: None,
            },
            in_flight: Deque::new(),
            gate: IntervalGate::new(update_interval_ms),
            delivered: 0,
            lost: 0,
        }
    }

    /// Note that the transport accepted a datagram at `now_ms`.
    pub fn record_send(
        &mut self,
        now_ms: u64,
    ) {
        if self.in_flight.is_full() {
            self.in_flight.pop_front();
        }
        self.in_flight.push_back(now_ms).ok();
        self.state.last_send_ms = now_ms;
    }

    /// Apply one completion report. Returns the new level if this event moved it.
    pub fn apply(
        &mut self,
        event: &CompletionEvent,
    ) -> Option<u8> {
        self.state.connected = event.outcome.is_success();
        let sent_ms = self.in_flight.pop_front();

        if self.state.connected {
            self.delivered = self.delivered.wrapping_add(1);
            if let Some(sent_ms) = sent_ms {
                self.state.latency_ms = Some(event.at_ms.saturating_sub(sent_ms) as u32);
            }
        } else {
            self.lost = self.lost.wrapping_add(1);
        }

        if !self.gate.try_fire(event.at_ms) {
            return None;
        }

        let previous = self.state.signal_level;
        self.state.signal_level = if self.state.connected {
            (previous + 1).min(MAX_SIGNAL_STRENGTH)
        } else {
            previous.saturating_sub(1)
        };
        self.state.last_signal_update_ms = event.at_ms;

        (self.state.signal_level != previous).then_some(self.state.signal_level)
    }

    /// Apply every queued report.
    pub fn drain<I>(
        &mut self,
        events: I,
    ) -> usize
    where
        I: IntoIterator<Item = CompletionEvent>,
    {
        let mut applied = 0;
        for event in events {
            self.apply(&event);
            applied += 1;
        }
        applied
    }

    #[inline]
    pub const fn state(&self) -> &LinkState { &self.state }

    #[inline]
    pub const fn signal_level(&self) -> u8 { self.state.signal_level }

    #[inline]
    pub const fn is_connected(&self) -> bool { self.state.connected }

    /// Sends still waiting for their report.
    #[inline]
    pub fn in_flight(&self) -> usize { self.in_flight.len() }

    /// Successful and failed completions since boot.
    #[inline]
    pub const fn counters(&self) -> (u32, u32) { (self.delivered, self.lost) }
}

impl Default for LinkQualityEstimator {
    fn default() -> Self { Self::new(SIGNAL_UPDATE_INTERVAL_MS) }
}

// =============================================================================
// Status LED
// =============================================================================

/// Half-period of the slow "searching" blink.
pub const SLOW_BLINK_MS: u64 = 500;

/// Half-period of the fast "fault" blink.
pub const FAST_BLINK_MS: u64 = 100;

/// What the status LED should show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkIndicator {
    /// Solid on: last datagram was delivered.
    Connected,
    /// Slow blink: link up but datagrams are not getting through.
    Searching,
    /// Fast blink: the radio failed to initialise.
    Fault,
}

impl LinkIndicator {
    pub const fn from_link(
        state: &LinkState,
        faulted: bool,
    ) -> Self {
        if faulted {
            Self::Fault
        } else if state.connected {
            Self::Connected
        } else {
            Self::Searching
        }
    }

    /// LED level at `now_ms`.
    pub const fn is_lit(
        self,
        now_ms: u64,
    ) -> bool {
        match self {
            Self::Connected => true,
            Self::Searching => (now_ms / SLOW_BLINK_MS) % 2 == 0,
            Self::Fault => (now_ms / FAST_BLINK_MS) % 2 == 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::vec::Vec;

    use super::*;

    const PEER: MacAddress = MacAddress([1, 2, 3, 4, 5, 6]);

    fn event(
        outcome: SendOutcome,
        at_ms: u64,
    ) -> CompletionEvent {
        CompletionEvent {
            peer: PEER,
            outcome,
            at_ms,
        }
    }

    #[test]
    fn test_successes_every_1200ms_saturate_at_five() {
        let mut estimator = LinkQualityEstimator::default();
        let levels: Vec<u8> = (1..=10u64)
            .map(|k| {
                estimator.apply(&event(SendOutcome::Success, k * 1200));
                estimator.signal_level()
            })
            .collect();
        assert_eq!(levels, [1, 2, 3, 4, 5, 5, 5, 5, 5, 5]);
    }

    #[test]
    fn test_level_changes_at_most_once_per_window() {
        let mut estimator = LinkQualityEstimator::default();
        let mut changes = Vec::new();
        for t in (1000..5000u64).step_by(20) {
            if let Some(level) = estimator.apply(&event(SendOutcome::Success, t)) {
                changes.push((t, level));
            }
        }
        assert_eq!(changes, [(1000, 1), (2000, 2), (3000, 3), (4000, 4)]);
    }

    #[test]
    fn test_failures_decay_to_zero_floor() {
        let mut estimator = LinkQualityEstimator::default();
        for k in 1..=3u64 {
            estimator.apply(&event(SendOutcome::Success, k * 1000));
        }
        assert_eq!(estimator.signal_level(), 3);

        for k in 4..=10u64 {
            estimator.apply(&event(SendOutcome::Failure, k * 1000));
            assert!(estimator.signal_level() <= 5);
        }
        assert_eq!(estimator.signal_level(), 0);
        assert!(!estimator.is_connected());
    }

    #[test]
    fn test_connected_tracks_latest_outcome_inside_window() {
        let mut estimator = LinkQualityEstimator::default();
        estimator.apply(&event(SendOutcome::Success, 1000));
        assert!(estimator.is_connected());
        assert_eq!(estimator.apply(&event(SendOutcome::Failure, 1010)), None);
        assert!(!estimator.is_connected());
        assert_eq!(estimator.signal_level(), 1);
    }

    #[test]
    fn test_latency_from_last_send() {
        let mut estimator = LinkQualityEstimator::default();
        estimator.record_send(980);
        estimator.apply(&event(SendOutcome::Success, 984));
        assert_eq!(estimator.state().latency_ms, Some(4));
        assert_eq!(estimator.state().last_send_ms, 980);

        estimator.record_send(1000);
        estimator.apply(&event(SendOutcome::Failure, 1009));
        assert_eq!(estimator.state().latency_ms, Some(4));
    }

    #[test]
    fn test_latency_matches_oldest_outstanding_send() {
        let mut estimator = LinkQualityEstimator::default();
        estimator.record_send(1000);
        estimator.record_send(1020);
        assert_eq!(estimator.in_flight(), 2);

        estimator.apply(&event(SendOutcome::Success, 1025));
        assert_eq!(estimator.state().latency_ms, Some(25));

        estimator.apply(&event(SendOutcome::Success, 1031));
        assert_eq!(estimator.state().latency_ms, Some(11));
        assert_eq!(estimator.in_flight(), 0);
    }

    #[test]
    fn test_failed_completion_consumes_its_send() {
        let mut estimator = LinkQualityEstimator::default();
        estimator.record_send(1000);
        estimator.record_send(1020);
        estimator.apply(&event(SendOutcome::Failure, 1030));
        estimator.apply(&event(SendOutcome::Success, 1032));
        assert_eq!(estimator.state().latency_ms, Some(12));
    }

    #[test]
    fn test_unmatched_completion_keeps_latency() {
        let mut estimator = LinkQualityEstimator::default();
        estimator.apply(&event(SendOutcome::Success, 1000));
        assert_eq!(estimator.state().latency_ms, None);
        assert!(estimator.is_connected());
    }

    #[test]
    fn test_in_flight_window_drops_oldest() {
        let mut estimator = LinkQualityEstimator::default();
        for k in 0..=MAX_IN_FLIGHT as u64 {
            estimator.record_send(k * 20);
        }
        assert_eq!(estimator.in_flight(), MAX_IN_FLIGHT);

        // The send at 0 was forgotten; the oldest left is 20
        estimator.apply(&event(SendOutcome::Success, 50));
        assert_eq!(estimator.state().latency_ms, Some(30));
    }

    #[test]
    fn test_drain_counts_outcomes() {
        let mut estimator = LinkQualityEstimator::default();
        let applied = estimator.drain([
            event(SendOutcome::Success, 1000),
            event(SendOutcome::Failure, 1020),
            event(SendOutcome::Success, 1040),
        ]);
        assert_eq!(applied, 3);
        assert_eq!(estimator.counters(), (2, 1));
        assert_eq!(estimator.state().last_signal_update_ms, 1000);
    }

    #[test]
    fn test_indicator_patterns() {
        let mut state = LinkState::default();
        assert_eq!(LinkIndicator::from_link(&state, false), LinkIndicator::Searching);
        assert_eq!(LinkIndicator::from_link(&state, true), LinkIndicator::Fault);
        state.connected = true;
        assert_eq!(LinkIndicator::from_link(&state, false), LinkIndicator::Connected);

        assert!(LinkIndicator::Connected.is_lit(12_345));
        assert!(LinkIndicator::Searching.is_lit(499));
        assert!(!LinkIndicator::Searching.is_lit(500));
        assert!(LinkIndicator::Fault.is_lit(0));
        assert!(!LinkIndicator::Fault.is_lit(150));
        assert!(LinkIndicator::Fault.is_lit(200));
    }
}
