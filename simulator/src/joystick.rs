//! Keyboard-driven stand-in for the analog joystick.
//!
//! `W`/`A`/`S`/`D` push the stick to full deflection, holding `H` halves it, `E` is the push
//! button.
//! The resting position is deliberately off the nominal ADC center so calibration has something
//! to correct.

use core::convert::Infallible;

use embedded_graphics_simulator::sdl2::Keycode;
use rc_link_common::config::{JOYSTICK_RAW_MAX, JOYSTICK_RAW_MIN};
use rc_link_common::input::{JoystickPort, RawAxes};

/// Resting raw position, a typical off-center reading for a cheap thumb stick.
pub const REST: RawAxes = RawAxes { x: 2110, y: 1985 };

#[derive(Debug, Default)]
pub struct SimJoystick {
    left: bool,
    right: bool,
    up: bool,
    down: bool,
    half: bool,
    button: bool,
}

impl SimJoystick {
    pub fn new() -> Self { Self::default() }

    /// Track key state. Returns `true` if the key belongs to the stick.
    pub fn key(
        &mut self,
        keycode: Keycode,
        down: bool,
    ) -> bool {
        let slot = match keycode {
            Keycode::A => &mut self.left,
            Keycode::D => &mut self.right,
            Keycode::W => &mut self.up,
            Keycode::S => &mut self.down,
            Keycode::H => &mut self.half,
            Keycode::E => &mut self.button,
            _ => return false,
        };
        *slot = down;
        true
    }

    fn axis(
        rest: i32,
        low: bool,
        high: bool,
        half: bool,
    ) -> i32 {
        let (to_low, to_high) = (rest - JOYSTICK_RAW_MIN, JOYSTICK_RAW_MAX - rest);
        let deflection = match (low, high) {
            (true, false) => -to_low,
            (false, true) => to_high,
            _ => 0,
        };
        rest + if half { deflection / 2 } else { deflection }
    }
}

impl JoystickPort for SimJoystick {
    type Error = Infallible;

    fn read_axes(&mut self) -> Result<RawAxes, Self::Error> {
        // Pushing the stick up lowers the raw Y reading on the wired-up hardware
        Ok(RawAxes {
            x: Self::axis(REST.x, self.left, self.right, self.half),
            y: Self::axis(REST.y, self.up, self.down, self.half),
        })
    }

    fn button_is_low(&mut self) -> bool { self.button }
}
