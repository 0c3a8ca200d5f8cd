//! Colour theme for the controller display.
//!
//! ## Rgb565 Color Format
//!
//! Rgb565 uses 16 bits per pixel: 5 bits red, 6 bits green, 5 bits blue. The theme is defined
//! as packed RGB565 words (the format the ST7789 consumes) and unpacked into channels with
//! `const` arithmetic so every colour is still a compile-time constant.

use embedded_graphics::pixelcolor::{Rgb565, RgbColor};

/// Unpack a raw RGB565 word into an [`Rgb565`] at compile time.
pub const fn from_raw(raw: u16) -> Rgb565 { Rgb565::new((raw >> 11) as u8, ((raw >> 5) & 0x3F) as u8, (raw & 0x1F) as u8) }

// =============================================================================
// Theme
// =============================================================================

/// Accent colour: signal bars, separators, active direction wedges, mode label.
pub const GREEN: Rgb565 = from_raw(0x5E0A);

/// Center rings of the joystick visual.
pub const BLUE: Rgb565 = from_raw(0x04DF);

/// Header/footer background, crosshair and inactive wedges.
pub const DARK: Rgb565 = from_raw(0x0200);

/// Body text.
pub const TEXT: Rgb565 = from_raw(0xBFFA);

/// Faults and low battery.
pub const CRITICAL: Rgb565 = from_raw(0xF800);

/// Battery between 20 and 50 percent.
pub const AMBER: Rgb565 = from_raw(0xFD20);

// =============================================================================
// Standard Colors
// =============================================================================

pub const BLACK: Rgb565 = Rgb565::BLACK;

#[cfg(test)]
mod tests {
    use embedded_graphics::pixelcolor::raw::{RawData, RawU16};

    use super::*;

    fn raw(color: Rgb565) -> u16 { RawU16::from(color).into_inner() }

    #[test]
    fn test_theme_round_trips_to_raw_words() {
        assert_eq!(raw(GREEN), 0x5E0A);
        assert_eq!(raw(BLUE), 0x04DF);
        assert_eq!(raw(DARK), 0x0200);
        assert_eq!(raw(TEXT), 0xBFFA);
        assert_eq!(raw(CRITICAL), 0xF800);
        assert_eq!(raw(AMBER), 0xFD20);
    }

    #[test]
    fn test_critical_is_pure_red() {
        assert_eq!(CRITICAL, Rgb565::RED);
    }
}
