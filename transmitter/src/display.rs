//! Pico Display Pack wiring (PIM543: 1.14" 240x135 ST7789, four buttons, RGB LED).
//!
//! | Signal | GPIO |
//! |--------|------|
//! | DC / CS / SCK / MOSI | 16 / 17 / 18 / 19 (SPI0) |
//! | Backlight | 20 |
//! | Buttons A / B / X / Y | 12 / 13 / 14 / 15, active-low |
//! | LED R / G / B | 6 / 7 / 8, active-low |

use embassy_rp::spi::Config as SpiConfig;

/// ST7789 write clock ceiling.
pub const SPI_FREQUENCY_HZ: u32 = 62_500_000;

pub fn display_spi_config() -> SpiConfig {
    let mut config = SpiConfig::default();
    config.frequency = SPI_FREQUENCY_HZ;
    config
}
