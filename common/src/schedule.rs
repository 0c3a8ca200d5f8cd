//! Interval gates that bound how often the control loop transmits and renders.
//!
//! The control loop itself runs as fast as it can and samples input every iteration. Costly
//! actions poll a gate instead of sleeping: a closed gate means "skip this iteration", and the
//! caller simply asks again on the next one.
//!
//! Each gate holds nothing but the timestamp of its last fire, starting at 0 ms (boot).

use crate::config::{DISPLAY_UPDATE_INTERVAL_MS, SEND_INTERVAL_MS};

/// Stateful predicate that permits an action at most once per fixed interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntervalGate {
    interval_ms: u64,
    last_fire_ms: u64,
}

impl IntervalGate {
    pub const fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_fire_ms: 0,
        }
    }

    /// Fire if at least one interval has passed since the last fire.
    ///
    /// A timestamp earlier than the last fire never opens the gate.
    pub fn try_fire(
        &mut self,
        now_ms: u64,
    ) -> bool {
        if now_ms.saturating_sub(self.last_fire_ms) >= self.interval_ms && now_ms >= self.last_fire_ms {
            self.last_fire_ms = now_ms;
            true
        } else {
            false
        }
    }

    /// Check without consuming.
    #[inline]
    pub const fn is_open(
        &self,
        now_ms: u64,
    ) -> bool {
        now_ms >= self.last_fire_ms && now_ms - self.last_fire_ms >= self.interval_ms
    }

    #[inline]
    pub const fn interval_ms(&self) -> u64 { self.interval_ms }

    #[inline]
    pub const fn last_fire_ms(&self) -> u64 { self.last_fire_ms }
}

/// Which of the scheduler's gates to poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gate {
    /// Outbound datagram transmission.
    Send,
    /// Display refresh.
    Display,
}

/// The two independent gates of the control loop.
#[derive(Clone, Copy, Debug)]
pub struct Scheduler {
    send: IntervalGate,
    display: IntervalGate,
}

impl Scheduler {
    pub const fn new(
        send_interval_ms: u64,
        display_interval_ms: u64,
    ) -> Self {
        Self {
            send: IntervalGate::new(send_interval_ms),
            display: IntervalGate::new(display_interval_ms),
        }
    }

    pub fn try_fire(
        &mut self,
        gate: Gate,
        now_ms: u64,
    ) -> bool {
        self.gate_mut(gate).try_fire(now_ms)
    }

    pub const fn gate(
        &self,
        gate: Gate,
    ) -> &IntervalGate {
        match gate {
            Gate::Send => &self.send,
            Gate::Display => &self.display,
        }
    }

    fn gate_mut(
        &mut self,
        gate: Gate,
    ) -> &mut IntervalGate {
        match gate {
            Gate::Send => &mut self.send,
            Gate::Display => &mut self.display,
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self { Self::new(SEND_INTERVAL_MS, DISPLAY_UPDATE_INTERVAL_MS) }
}
