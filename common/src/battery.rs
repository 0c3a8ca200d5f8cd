//! Single-cell Li-ion battery gauge.
//!
//! The Pico 2 exposes VSYS through a 1:3 divider on ADC3. Charge is approximated linearly
//! between the cut-off and full-charge voltages; good enough for a three-colour gauge.

use embedded_graphics::pixelcolor::Rgb565;

use crate::colors::{AMBER, CRITICAL, GREEN};

/// Empty cell.
pub const BATTERY_EMPTY_MV: u32 = 3300;

/// Full cell.
pub const BATTERY_FULL_MV: u32 = 4200;

/// ADC reference voltage.
pub const ADC_REF_MV: u32 = 3300;

/// VSYS divider ratio.
pub const VSYS_DIVIDER: u32 = 3;

/// Convert a raw 12-bit VSYS/3 reading to millivolts at VSYS.
pub const fn vsys_millivolts(raw: u16) -> u32 { raw as u32 * VSYS_DIVIDER * ADC_REF_MV / 4096 }

/// Charge estimate, clamped to `0..=100`.
pub const fn percent_from_millivolts(mv: u32) -> u8 {
    if mv <= BATTERY_EMPTY_MV {
        0
    } else if mv >= BATTERY_FULL_MV {
        100
    } else {
        ((mv - BATTERY_EMPTY_MV) * 100 / (BATTERY_FULL_MV - BATTERY_EMPTY_MV)) as u8
    }
}

/// Gauge colour: green above 50 %, amber from 20 to 50 %, red below 20 %.
pub const fn battery_color(percent: u8) -> Rgb565 {
    if percent > 50 {
        GREEN
    } else if percent >= 20 {
        AMBER
    } else {
        CRITICAL
    }
}
