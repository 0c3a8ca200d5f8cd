//! Press detection for the Display Pack's active-low buttons.

/// Contact bounce window.
pub const DEBOUNCE_MS: u64 = 50;

/// Reports each press once, ignoring level flips within [`DEBOUNCE_MS`] of the last accepted one.
#[derive(Clone, Copy, Debug, Default)]
pub struct Debouncer {
    down: bool,
    changed_at_ms: Option<u64>,
}

impl Debouncer {
    pub const fn new() -> Self {
        Self {
            down: false,
            changed_at_ms: None,
        }
    }

    /// Feed the pin level (`is_low()`) sampled at `now_ms`. True on an accepted press.
    pub fn pressed(
        &mut self,
        is_low: bool,
        now_ms: u64,
    ) -> bool {
        let settled = self
            .changed_at_ms
            .is_none_or(|at| now_ms.saturating_sub(at) >= DEBOUNCE_MS);
        if is_low == self.down || !settled {
            return false;
        }

        self.down = is_low;
        self.changed_at_ms = Some(now_ms);
        is_low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_reported_once() {
        let mut button = Debouncer::new();
        assert!(button.pressed(true, 100));
        assert!(!button.pressed(true, 120));
        assert!(!button.pressed(true, 500));
    }

    #[test]
    fn test_bounce_ignored() {
        let mut button = Debouncer::new();
        assert!(button.pressed(true, 100));
        // Release and re-press inside the window
        assert!(!button.pressed(false, 110));
        assert!(!button.pressed(true, 120));

        assert!(!button.pressed(false, 150));
        assert!(button.pressed(true, 200));
    }

    #[test]
    fn test_release_is_not_a_press() {
        let mut button = Debouncer::new();
        assert!(!button.pressed(false, 0));
        button.pressed(true, 10);
        assert!(!button.pressed(false, 100));
    }
}
