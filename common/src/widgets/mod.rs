//! Region widgets for the controller display.
//!
//! Each widget redraws one whole region from scratch and is generic over
//! `DrawTarget<Color = Rgb565>`, so it renders into a [`crate::display::Region`] on the device
//! and into a simulator window on the desktop alike.

mod footer;
mod header;
mod joystick;

pub use footer::draw_footer;
pub use header::{draw_header, signal_bar};
pub use joystick::{Direction, draw_joystick_visual, marker_position};
