//! Controller configuration: compile-time defaults plus the runtime [`ControllerConfig`].
//!
//! # Pre-computed Layout Constants
//!
//! Region heights and offsets are `const` so the compositor never recomputes them per frame.
//! Compile-time assertions check that the three regions tile the physical surface exactly.

use crate::radio::{MacAddress, PeerConfig};

// =============================================================================
// Joystick / ADC
// =============================================================================

/// Lowest raw value the 12-bit ADC reports.
pub const JOYSTICK_RAW_MIN: i32 = 0;

/// Highest raw value the 12-bit ADC reports.
pub const JOYSTICK_RAW_MAX: i32 = 4095;

/// Lower bound of a conditioned axis.
pub const JOYSTICK_MIN_RANGE: i32 = -255;

/// Upper bound of a conditioned axis.
pub const JOYSTICK_MAX_RANGE: i32 = 255;

/// Mapped values with a magnitude below this are forced to zero.
pub const JOYSTICK_DEADZONE: i32 = 50;

/// Number of samples averaged per axis during calibration.
pub const NUM_CALIBRATIONS: u32 = 20;

/// Spacing between calibration samples.
pub const CALIBRATION_SPACING_MS: u32 = 10;

const _: () = assert!(JOYSTICK_RAW_MIN < JOYSTICK_RAW_MAX);
const _: () = assert!(JOYSTICK_MIN_RANGE < 0 && JOYSTICK_MAX_RANGE > 0);
const _: () = assert!(JOYSTICK_DEADZONE >= 0 && JOYSTICK_DEADZONE < JOYSTICK_MAX_RANGE);

// =============================================================================
// Rate Gates
// =============================================================================

/// Minimum spacing between outbound datagrams.
pub const SEND_INTERVAL_MS: u64 = 20;

/// Minimum spacing between display refreshes.
pub const DISPLAY_UPDATE_INTERVAL_MS: u64 = 50;

/// Minimum spacing between signal level changes.
pub const SIGNAL_UPDATE_INTERVAL_MS: u64 = 1000;

/// Highest signal level (number of bars).
pub const MAX_SIGNAL_STRENGTH: u8 = 5;

// =============================================================================
// Display Layout
// =============================================================================

/// Physical surface width (landscape).
pub const SCREEN_WIDTH: u32 = 240;

/// Physical surface height (landscape).
pub const SCREEN_HEIGHT: u32 = 135;

/// Header region: signal bars and status text.
pub const HEADER_HEIGHT: u32 = 25;

/// Joystick region: crosshair, direction wedges, position marker and speed.
pub const JOYSTICK_AREA_HEIGHT: u32 = 85;

/// Footer region: mode label and battery.
pub const FOOTER_HEIGHT: u32 = 25;

/// Vertical offset of the joystick region on the surface.
pub const JOYSTICK_AREA_Y: i32 = HEADER_HEIGHT as i32;

/// Vertical offset of the footer region on the surface.
pub const FOOTER_Y: i32 = (HEADER_HEIGHT + JOYSTICK_AREA_HEIGHT) as i32;

const _: () = assert!(HEADER_HEIGHT + JOYSTICK_AREA_HEIGHT + FOOTER_HEIGHT == SCREEN_HEIGHT);

/// Byte length of an RGB565 region buffer.
pub const fn region_len(height: u32) -> usize { (SCREEN_WIDTH * height * 2) as usize }

pub const HEADER_BUF_LEN: usize = region_len(HEADER_HEIGHT);
pub const JOYSTICK_BUF_LEN: usize = region_len(JOYSTICK_AREA_HEIGHT);
pub const FOOTER_BUF_LEN: usize = region_len(FOOTER_HEIGHT);

// =============================================================================
// Joystick Visualization
// =============================================================================

pub const JOYSTICK_CENTER_X: i32 = 120;
pub const JOYSTICK_CENTER_Y: i32 = 42;

/// Divisor from conditioned axis value to marker offset in pixels.
pub const JOYSTICK_SCALE: i32 = 8;
pub const JOYSTICK_CIRCLE_RADIUS: u32 = 15;
pub const JOYSTICK_DOT_RADIUS: u32 = 5;
pub const JOYSTICK_POINTER_SIZE: u32 = 8;

// =============================================================================
// Signal Bars
// =============================================================================

pub const SIGNAL_BAR_WIDTH: u32 = 6;
pub const SIGNAL_BAR_SPACING: i32 = 8;
pub const SIGNAL_BAR_X_START: i32 = 65;

// =============================================================================
// Identity
// =============================================================================

/// Mode label shown in the footer until something else is configured.
pub const DEFAULT_MODE: &str = "RACE";

/// Receiver address used when nothing else is configured.
pub const DEFAULT_PEER: MacAddress = MacAddress([0x3C, 0x61, 0x05, 0x12, 0x34, 0x56]);

// =============================================================================
// Runtime Configuration
// =============================================================================

/// Tunables read by the control loop.
///
/// `Default` yields the compile-time constants above; binaries override single fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControllerConfig {
    pub deadzone: i32,
    pub out_min: i32,
    pub out_max: i32,
    pub calibration_samples: u32,
    pub calibration_spacing_ms: u32,
    pub send_interval_ms: u64,
    pub display_interval_ms: u64,
    pub signal_interval_ms: u64,
    pub visual_scale: i32,
    pub mode: &'static str,
    pub peer: PeerConfig,
}

impl ControllerConfig {
    pub const fn new() -> Self {
        Self {
            deadzone: JOYSTICK_DEADZONE,
            out_min: JOYSTICK_MIN_RANGE,
            out_max: JOYSTICK_MAX_RANGE,
            calibration_samples: NUM_CALIBRATIONS,
            calibration_spacing_ms: CALIBRATION_SPACING_MS,
            send_interval_ms: SEND_INTERVAL_MS,
            display_interval_ms: DISPLAY_UPDATE_INTERVAL_MS,
            signal_interval_ms: SIGNAL_UPDATE_INTERVAL_MS,
            visual_scale: JOYSTICK_SCALE,
            mode: DEFAULT_MODE,
            peer: PeerConfig::new(DEFAULT_PEER),
        }
    }

    /// Replace the receiver address, keeping channel and encryption defaults.
    #[must_use]
    pub const fn with_peer(
        mut self,
        address: MacAddress,
    ) -> Self {
        self.peer = PeerConfig::new(address);
        self
    }

    #[must_use]
    pub const fn with_mode(
        mut self,
        mode: &'static str,
    ) -> Self {
        self.mode = mode;
        self
    }
}

impl Default for ControllerConfig {
    fn default() -> Self { Self::new() }
}
