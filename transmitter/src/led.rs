//! Display Pack RGB LED as the link status indicator (active-low: Low = ON).
//!
//! - green, solid: link up
//! - blue, slow blink: searching
//! - red, fast blink: radio fault

use embassy_rp::gpio::{Level, Output};
use rc_link_common::link::LinkIndicator;

pub struct StatusLed<'d> {
    red: Output<'d>,
    green: Output<'d>,
    blue: Output<'d>,
}

impl<'d> StatusLed<'d> {
    pub fn new(
        red: Output<'d>,
        green: Output<'d>,
        blue: Output<'d>,
    ) -> Self {
        let mut led = Self { red, green, blue };
        led.off();
        led
    }

    pub fn show(
        &mut self,
        indicator: LinkIndicator,
        now_ms: u64,
    ) {
        let lit = indicator.is_lit(now_ms);
        let (r, g, b) = match indicator {
            LinkIndicator::Connected => (false, lit, false),
            LinkIndicator::Searching => (false, false, lit),
            LinkIndicator::Fault => (lit, false, false),
        };
        self.red.set_level(Level::from(!r));
        self.green.set_level(Level::from(!g));
        self.blue.set_level(Level::from(!b));
    }

    pub fn off(&mut self) {
        self.red.set_high();
        self.green.set_high();
        self.blue.set_high();
    }
}
