//! Wall-clock helpers for the simulator.
//!
//! The core takes plain millisecond timestamps; this maps `std::time::Instant` onto them.

use std::time::{Duration, Instant};

/// Sleep between control-loop iterations.
pub const LOOP_TICK: Duration = Duration::from_millis(1);

/// Receiver view refresh spacing (25 FPS).
pub const RECEIVER_FRAME_MS: u64 = 40;

/// Milliseconds since the simulator started.
pub struct Clock {
    start: Instant,
}

impl Clock {
    pub fn start() -> Self { Self { start: Instant::now() } }

    pub fn now_ms(&self) -> u64 { self.start.elapsed().as_millis() as u64 }
}

/// Blocking `DelayNs` for calibration sampling.
pub struct ThreadDelay;

impl embedded_hal::delay::DelayNs for ThreadDelay {
    fn delay_ns(
        &mut self,
        ns: u32,
    ) {
        std::thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}
