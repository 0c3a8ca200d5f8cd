//! Analog joystick conditioning: calibration, piecewise range mapping, deadzone and speed.
//!
//! # Mapping
//!
//! Each axis maps through two linear segments that meet at the calibrated center:
//!
//! ```text
//! raw:  min ........ center ........ max
//! out:  out_min ....   0   .... out_max
//! ```
//!
//! so a stick resting at its (possibly off-midpoint) center always reads exactly 0. Small
//! magnitudes are then zeroed by the deadzone. Y is inverted so pushing the stick away from
//! the user is positive.

use embedded_hal::delay::DelayNs;

use crate::config::{ControllerConfig, JOYSTICK_RAW_MAX, JOYSTICK_RAW_MIN};

// =============================================================================
// Hardware Boundary
// =============================================================================

/// One raw ADC reading of both axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawAxes {
    pub x: i32,
    pub y: i32,
}

/// Two analog axes plus a pull-up push button.
pub trait JoystickPort {
    type Error;

    /// Read both axes once.
    fn read_axes(&mut self) -> Result<RawAxes, Self::Error>;

    /// Level of the button line. Pull-up wiring: low means pressed.
    fn button_is_low(&mut self) -> bool;
}

// =============================================================================
// Data
// =============================================================================

/// Raw range and rest position of one axis.
///
/// `min_raw <= center_raw <= max_raw` always holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisCalibration {
    pub min_raw: i32,
    pub max_raw: i32,
    pub center_raw: i32,
}

impl AxisCalibration {
    /// Full ADC range with the center at the nominal midpoint.
    pub const fn nominal() -> Self {
        Self {
            min_raw: JOYSTICK_RAW_MIN,
            max_raw: JOYSTICK_RAW_MAX,
            center_raw: (JOYSTICK_RAW_MIN + JOYSTICK_RAW_MAX) / 2,
        }
    }

    /// Same range, new center (clamped into the range).
    #[must_use]
    pub const fn with_center(
        self,
        center_raw: i32,
    ) -> Self {
        let center_raw = if center_raw < self.min_raw {
            self.min_raw
        } else if center_raw > self.max_raw {
            self.max_raw
        } else {
            center_raw
        };
        Self { center_raw, ..self }
    }
}

impl Default for AxisCalibration {
    fn default() -> Self { Self::nominal() }
}

/// Conditioned joystick state for one loop iteration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputSample {
    /// Left/right, `[-255, 255]`.
    pub x: i32,
    /// Back/forward, `[-255, 255]`, forward positive.
    pub y: i32,
    pub button: bool,
    /// `[0, 100]`, from `|y|`.
    pub speed_percent: i32,
}

impl InputSample {
    pub const fn neutral() -> Self {
        Self {
            x: 0,
            y: 0,
            button: false,
            speed_percent: 0,
        }
    }
}

// =============================================================================
// Pure Mapping Functions
// =============================================================================

/// Integer linear re-mapping of `value` from `[in_min, in_max]` to `[out_min, out_max]`.
///
/// Truncates toward zero. A zero-width input range yields `out_min`.
pub const fn map_range(
    value: i32,
    in_min: i32,
    in_max: i32,
    out_min: i32,
    out_max: i32,
) -> i32 {
    if in_max == in_min {
        return out_min;
    }
    let scaled = (value as i64 - in_min as i64) * (out_max as i64 - out_min as i64) / (in_max as i64 - in_min as i64);
    (scaled + out_min as i64) as i32
}

/// Two-segment mapping about the calibrated center. Raw values outside the calibrated range
/// are clamped first, so the result always lies in `[out_min, out_max]`.
pub const fn map_axis(
    raw: i32,
    cal: &AxisCalibration,
    out_min: i32,
    out_max: i32,
) -> i32 {
    let raw = if raw < cal.min_raw {
        cal.min_raw
    } else if raw > cal.max_raw {
        cal.max_raw
    } else {
        raw
    };

    if raw < cal.center_raw {
        map_range(raw, cal.min_raw, cal.center_raw, out_min, 0)
    } else {
        map_range(raw, cal.center_raw, cal.max_raw, 0, out_max)
    }
}

/// Zero any value whose magnitude is below `deadzone`; pass everything else through.
#[inline]
pub const fn apply_deadzone(
    value: i32,
    deadzone: i32,
) -> i32 {
    if value.abs() < deadzone { 0 } else { value }
}

/// Speed readout from the conditioned Y axis.
#[inline]
pub const fn speed_percent(
    y: i32,
    out_max: i32,
) -> i32 {
    map_range(y.abs(), 0, out_max, 0, 100)
}

// =============================================================================
// Conditioner
// =============================================================================

/// Turns raw ADC readings into [`InputSample`]s.
#[derive(Clone, Copy, Debug)]
pub struct InputConditioner {
    x: AxisCalibration,
    y: AxisCalibration,
    deadzone: i32,
    out_min: i32,
    out_max: i32,
    samples: u32,
    spacing_ms: u32,
}

impl InputConditioner {
    /// Uncalibrated conditioner (centers at the nominal ADC midpoint).
    pub const fn new(config: &ControllerConfig) -> Self {
        Self {
            x: AxisCalibration::nominal(),
            y: AxisCalibration::nominal(),
            deadzone: config.deadzone,
            out_min: config.out_min,
            out_max: config.out_max,
            samples: config.calibration_samples,
            spacing_ms: config.calibration_spacing_ms,
        }
    }

    /// Average a burst of readings into new axis centers.
    ///
    /// Blocks for `samples * spacing_ms`. The stick must be at rest. Min and max stay at the
    /// ADC's full scale. On a read error the previous calibration is kept.
    pub fn calibrate<P, D>(
        &mut self,
        port: &mut P,
        delay: &mut D,
    ) -> Result<(AxisCalibration, AxisCalibration), P::Error>
    where
        P: JoystickPort,
        D: DelayNs,
    {
        let samples = self.samples.max(1);
        let mut sum_x: i64 = 0;
        let mut sum_y: i64 = 0;

        for _ in 0..samples {
            let raw = port.read_axes()?;
            sum_x += i64::from(raw.x);
            sum_y += i64::from(raw.y);
            delay.delay_ms(self.spacing_ms);
        }

        self.x = self.x.with_center((sum_x / i64::from(samples)) as i32);
        self.y = self.y.with_center((sum_y / i64::from(samples)) as i32);
        Ok((self.x, self.y))
    }

    /// Read and condition one sample. Does not block.
    pub fn read<P: JoystickPort>(
        &self,
        port: &mut P,
    ) -> Result<InputSample, P::Error> {
        let raw = port.read_axes()?;
        let button_low = port.button_is_low();
        Ok(self.condition(raw, button_low))
    }

    /// Condition an already acquired reading.
    pub const fn condition(
        &self,
        raw: RawAxes,
        button_low: bool,
    ) -> InputSample {
        let mapped_x = map_axis(raw.x, &self.x, self.out_min, self.out_max);
        let mapped_y = -map_axis(raw.y, &self.y, self.out_min, self.out_max);

        let x = apply_deadzone(mapped_x, self.deadzone);
        let y = apply_deadzone(mapped_y, self.deadzone);

        InputSample {
            x,
            y,
            button: button_low,
            speed_percent: speed_percent(y, self.out_max),
        }
    }

    #[inline]
    pub const fn x_calibration(&self) -> &AxisCalibration { &self.x }

    #[inline]
    pub const fn y_calibration(&self) -> &AxisCalibration { &self.y }

    /// Install a known calibration (e.g. restored or simulated).
    pub const fn set_calibration(
        &mut self,
        x: AxisCalibration,
        y: AxisCalibration,
    ) {
        self.x = x;
        self.y = y;
    }

    #[inline]
    pub const fn deadzone(&self) -> i32 { self.deadzone }
}

#[cfg(test)]
mod tests {
    use std::vec::Vec;

    use super::*;

    struct ScriptedPort {
        readings: Vec<RawAxes>,
        next: usize,
        button_low: bool,
    }

    impl ScriptedPort {
        fn steady(
            x: i32,
            y: i32,
        ) -> Self {
            Self {
                readings: std::vec![RawAxes { x, y }],
                next: 0,
                button_low: false,
            }
        }
    }

    impl JoystickPort for ScriptedPort {
        type Error = ();

        fn read_axes(&mut self) -> Result<RawAxes, ()> {
            let raw = self.readings[self.next % self.readings.len()];
            self.next += 1;
            Ok(raw)
        }

        fn button_is_low(&mut self) -> bool { self.button_low }
    }

    struct FailingPort;

    impl JoystickPort for FailingPort {
        type Error = &'static str;

        fn read_axes(&mut self) -> Result<RawAxes, Self::Error> { Err("adc") }

        fn button_is_low(&mut self) -> bool { false }
    }

    #[derive(Default)]
    struct CountingDelay {
        total_ns: u64,
    }

    impl DelayNs for CountingDelay {
        fn delay_ns(
            &mut self,
            ns: u32,
        ) {
            self.total_ns += u64::from(ns);
        }
    }

    fn calibrated(
        center_x: i32,
        center_y: i32,
    ) -> InputConditioner {
        let mut conditioner = InputConditioner::new(&ControllerConfig::default());
        conditioner.set_calibration(
            AxisCalibration::nominal().with_center(center_x),
            AxisCalibration::nominal().with_center(center_y),
        );
        conditioner
    }

    #[test]
    fn test_map_range_matches_integer_map() {
        assert_eq!(map_range(0, 0, 4095, -255, 255), -255);
        assert_eq!(map_range(4095, 0, 4095, -255, 255), 255);
        assert_eq!(map_range(128, 0, 255, 0, 100), 50);
        assert_eq!(map_range(255, 0, 255, 0, 100), 100);
    }

    #[test]
    fn test_map_range_zero_width_returns_out_min() {
        assert_eq!(map_range(4095, 4095, 4095, 0, 255), 0);
        assert_eq!(map_range(7, 7, 7, -255, 0), -255);
    }

    #[test]
    fn test_map_axis_zero_at_center_for_any_center() {
        for center in [0, 1, 1000, 2047, 3000, 4094, 4095] {
            let cal = AxisCalibration::nominal().with_center(center);
            assert_eq!(map_axis(center, &cal, -255, 255), 0, "center {center}");
        }
    }

    #[test]
    fn test_map_axis_stays_in_output_range() {
        let cal = AxisCalibration::nominal().with_center(1900);
        for raw in (0..=4095).step_by(7) {
            let out = map_axis(raw, &cal, -255, 255);
            assert!((-255..=255).contains(&out), "raw {raw} -> {out}");
        }
        assert_eq!(map_axis(0, &cal, -255, 255), -255);
        assert_eq!(map_axis(4095, &cal, -255, 255), 255);
    }

    #[test]
    fn test_map_axis_clamps_out_of_range_raw() {
        let cal = AxisCalibration::nominal();
        assert_eq!(map_axis(-40, &cal, -255, 255), -255);
        assert_eq!(map_axis(9000, &cal, -255, 255), 255);
    }

    #[test]
    fn test_degenerate_center_at_max() {
        let cal = AxisCalibration::nominal().with_center(4095);
        assert_eq!(map_axis(4095, &cal, -255, 255), 0);
        assert_eq!(map_axis(0, &cal, -255, 255), -255);
    }

    #[test]
    fn test_degenerate_center_at_min() {
        let cal = AxisCalibration::nominal().with_center(0);
        assert_eq!(map_axis(0, &cal, -255, 255), 0);
        assert_eq!(map_axis(4095, &cal, -255, 255), 255);
    }

    #[test]
    fn test_deadzone_threshold() {
        assert_eq!(apply_deadzone(49, 50), 0);
        assert_eq!(apply_deadzone(-49, 50), 0);
        assert_eq!(apply_deadzone(50, 50), 50);
        assert_eq!(apply_deadzone(-50, 50), -50);
        assert_eq!(apply_deadzone(200, 50), 200);
    }

    #[test]
    fn test_center_plus_noise_reads_neutral() {
        let conditioner = calibrated(2000, 2100);
        let sample = conditioner.condition(RawAxes { x: 2000, y: 2102 }, false);
        assert_eq!(sample, InputSample::neutral());
    }

    #[test]
    fn test_y_is_inverted() {
        let conditioner = calibrated(2047, 2047);
        let pushed_away = conditioner.condition(RawAxes { x: 2047, y: 0 }, false);
        assert_eq!(pushed_away.y, 255);
        assert_eq!(pushed_away.speed_percent, 100);

        let pulled_back = conditioner.condition(RawAxes { x: 2047, y: 4095 }, false);
        assert_eq!(pulled_back.y, -255);
        assert_eq!(pulled_back.speed_percent, 100);
    }

    #[test]
    fn test_x_is_not_inverted() {
        let conditioner = calibrated(2047, 2047);
        assert_eq!(conditioner.condition(RawAxes { x: 4095, y: 2047 }, false).x, 255);
        assert_eq!(conditioner.condition(RawAxes { x: 0, y: 2047 }, false).x, -255);
    }

    #[test]
    fn test_speed_ignores_x() {
        let conditioner = calibrated(2047, 2047);
        let sample = conditioner.condition(RawAxes { x: 4095, y: 2047 }, false);
        assert_eq!(sample.speed_percent, 0);
    }

    #[test]
    fn test_button_is_active_low() {
        let conditioner = calibrated(2047, 2047);
        let mut port = ScriptedPort::steady(2047, 2047);
        assert!(!conditioner.read(&mut port).unwrap().button);
        port.button_low = true;
        assert!(conditioner.read(&mut port).unwrap().button);
    }

    #[test]
    fn test_calibrate_averages_samples() {
        let mut conditioner = InputConditioner::new(&ControllerConfig::default());
        let mut port = ScriptedPort {
            readings: std::vec![RawAxes { x: 1900, y: 2200 }, RawAxes { x: 1910, y: 2210 }],
            next: 0,
            button_low: false,
        };
        let mut delay = CountingDelay::default();

        let (x, y) = conditioner.calibrate(&mut port, &mut delay).unwrap();

        assert_eq!(x.center_raw, 1905);
        assert_eq!(y.center_raw, 2205);
        assert_eq!(x.min_raw, 0);
        assert_eq!(x.max_raw, 4095);
        assert_eq!(port.next, 20);
        assert_eq!(delay.total_ns, 20 * 10 * 1_000_000);
    }

    #[test]
    fn test_calibrate_error_keeps_previous_centers() {
        let mut conditioner = calibrated(1500, 2500);
        assert_eq!(conditioner.calibrate(&mut FailingPort, &mut CountingDelay::default()), Err("adc"));
        assert_eq!(conditioner.x_calibration().center_raw, 1500);
        assert_eq!(conditioner.y_calibration().center_raw, 2500);
    }

    #[test]
    fn test_with_center_clamps() {
        assert_eq!(AxisCalibration::nominal().with_center(-5).center_raw, 0);
        assert_eq!(AxisCalibration::nominal().with_center(5000).center_raw, 4095);
    }
}
