//! Timestamped ring buffer of short status lines.
//!
//! Used by the desktop build for its on-screen log pane (and echoed to stdout). Firmware logs go
//! straight to defmt instead.
//!
//! # Usage
//!
//! ```ignore
//! let mut log = DebugLog::new();
//! log.push_at(1234, "Radio up");
//!
//! for line in log.iter() {
//!     println!("{line}"); // "1.234 Radio up"
//! }
//! ```

use core::fmt::Write;

use heapless::{Deque, String};

/// Lines kept in the ring.
pub const LOG_BUFFER_SIZE: usize = 8;

/// Characters per line (one full row of the small font on a 240 px panel).
pub const LOG_LINE_LENGTH: usize = 40;

pub type LogLine = String<LOG_LINE_LENGTH>;

/// Ring buffer holding the newest [`LOG_BUFFER_SIZE`] lines.
pub struct DebugLog {
    buffer: Deque<LogLine, LOG_BUFFER_SIZE>,
}

impl DebugLog {
    pub const fn new() -> Self { Self { buffer: Deque::new() } }

    /// Append a line, dropping the oldest when full. Long messages are truncated.
    pub fn push(
        &mut self,
        msg: &str,
    ) {
        let mut line = LogLine::new();
        push_truncated(&mut line, msg);
        self.push_line(line);
    }

    /// Append `msg` prefixed with `seconds.millis`.
    pub fn push_at(
        &mut self,
        now_ms: u64,
        msg: &str,
    ) {
        let mut line = LogLine::new();
        let _ = write!(line, "{}.{:03} ", now_ms / 1000, now_ms % 1000);
        push_truncated(&mut line, msg);
        self.push_line(line);
    }

    fn push_line(
        &mut self,
        line: LogLine,
    ) {
        if self.buffer.is_full() {
            self.buffer.pop_front();
        }
        self.buffer.push_back(line).ok();
    }

    /// Lines, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> { self.buffer.iter().map(heapless::string::StringInner::as_str) }

    /// Most recent line.
    pub fn latest(&self) -> Option<&str> { self.buffer.back().map(heapless::string::StringInner::as_str) }

    #[inline]
    pub fn len(&self) -> usize { self.buffer.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.buffer.is_empty() }
}

impl Default for DebugLog {
    fn default() -> Self { Self::new() }
}

fn push_truncated(
    line: &mut LogLine,
    msg: &str,
) {
    for c in msg.chars() {
        if line.push(c).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_drops_oldest() {
        let mut log = DebugLog::new();
        assert!(log.is_empty());

        for i in 0..=LOG_BUFFER_SIZE {
            let mut msg: String<16> = String::new();
            let _ = write!(msg, "{i}");
            log.push(&msg);
        }
        assert_eq!(log.len(), LOG_BUFFER_SIZE);
        assert_eq!(log.iter().next(), Some("1"));
        assert_eq!(log.latest(), Some("8"));
    }

    #[test]
    fn test_timestamp_prefix() {
        let mut log = DebugLog::new();
        log.push_at(1234, "Radio up");
        log.push_at(5007, "Calibrated");
        log.push_at(0, "Boot");
        let lines: std::vec::Vec<&str> = log.iter().collect();
        assert_eq!(lines, ["1.234 Radio up", "5.007 Calibrated", "0.000 Boot"]);
    }

    #[test]
    fn test_long_lines_truncated() {
        let mut log = DebugLog::new();
        log.push_at(1, "This message is far longer than a single row of the panel");
        assert_eq!(log.latest().map(str::len), Some(LOG_LINE_LENGTH));
    }
}
