//! ADC front end: joystick axes, joystick push button and the VSYS battery sense.
//!
//! Pin mapping:
//! - Joystick X: GPIO26 (ADC0)
//! - Joystick Y: GPIO27 (ADC1)
//! - Joystick button: GPIO22 (active-low, internal pull-up)
//! - VSYS / 3: GPIO29 (ADC3)

use embassy_rp::adc::{Adc, Async, Channel, Error as AdcError};
use embassy_rp::gpio::Input;
use rc_link_common::battery::{percent_from_millivolts, vsys_millivolts};
use rc_link_common::input::{JoystickPort, RawAxes};

/// Samples averaged per battery reading.
const BATTERY_SAMPLES: u32 = 4;

pub struct AnalogInputs<'d> {
    adc: Adc<'d, Async>,
    x: Channel<'d>,
    y: Channel<'d>,
    vsys: Channel<'d>,
    button: Input<'d>,
}

impl<'d> AnalogInputs<'d> {
    pub fn new(
        adc: Adc<'d, Async>,
        x: Channel<'d>,
        y: Channel<'d>,
        vsys: Channel<'d>,
        button: Input<'d>,
    ) -> Self {
        Self { adc, x, y, vsys, button }
    }

    /// Battery charge from the averaged VSYS reading. `None` if the ADC faults.
    pub fn battery_percent(&mut self) -> Option<u8> {
        let mut sum = 0u32;
        for _ in 0..BATTERY_SAMPLES {
            sum += u32::from(self.adc.blocking_read(&mut self.vsys).ok()?);
        }
        let raw = (sum / BATTERY_SAMPLES) as u16;
        Some(percent_from_millivolts(vsys_millivolts(raw)))
    }
}

impl JoystickPort for AnalogInputs<'_> {
    type Error = AdcError;

    fn read_axes(&mut self) -> Result<RawAxes, Self::Error> {
        let x = self.adc.blocking_read(&mut self.x)?;
        let y = self.adc.blocking_read(&mut self.y)?;
        Ok(RawAxes {
            x: i32::from(x),
            y: i32::from(y),
        })
    }

    fn button_is_low(&mut self) -> bool { self.button.is_low() }
}
