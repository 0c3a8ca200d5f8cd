//! Main-stack high-water mark for the RP2350.
//!
//! Embassy runs every task on the single main stack, which grows down from the top of striped
//! RAM. The firmware feeds MSP readings from the control loop; the deepest one seen is reported
//! with the periodic link summary.

/// Striped SRAM0-7.
pub const RAM_START: u32 = 0x2000_0000;
pub const RAM_SIZE: u32 = 512 * 1024;
pub const RAM_END: u32 = RAM_START + RAM_SIZE;

/// Deepest stack pointer observed so far.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub struct StackWatermark {
    lowest_sp: u32,
}

impl StackWatermark {
    pub const fn new() -> Self { Self { lowest_sp: RAM_END } }

    /// Record one MSP reading. Values outside RAM are ignored.
    pub const fn record(
        &mut self,
        sp: u32,
    ) {
        if sp >= RAM_START && sp < self.lowest_sp {
            self.lowest_sp = sp;
        }
    }

    /// Peak stack use in bytes.
    #[inline]
    pub const fn peak_bytes(&self) -> u32 { RAM_END - self.lowest_sp }
}

impl Default for StackWatermark {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_watermark_is_empty() {
        assert_eq!(StackWatermark::new().peak_bytes(), 0);
    }

    #[test]
    fn test_keeps_deepest_reading() {
        let mut mark = StackWatermark::new();
        mark.record(RAM_END - 2048);
        mark.record(RAM_END - 512);
        assert_eq!(mark.peak_bytes(), 2048);

        mark.record(RAM_END - 6000);
        assert_eq!(mark.peak_bytes(), 6000);
    }

    #[test]
    fn test_ignores_readings_outside_ram() {
        let mut mark = StackWatermark::new();
        mark.record(0x1000_0000);
        mark.record(RAM_END + 4);
        assert_eq!(mark.peak_bytes(), 0);
    }
}
