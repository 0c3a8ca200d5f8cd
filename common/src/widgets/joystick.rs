//! Joystick region: crosshair, eight direction wedges, position marker and speed readout.

use core::fmt::Write;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, Line, PrimitiveStyle, Triangle};
use embedded_graphics::text::Text;
use heapless::String;

use crate::colors::{BLACK, BLUE, DARK, GREEN, TEXT};
use crate::config::{
    JOYSTICK_CENTER_X,
    JOYSTICK_CENTER_Y,
    JOYSTICK_CIRCLE_RADIUS,
    JOYSTICK_DOT_RADIUS,
    JOYSTICK_POINTER_SIZE,
};
use crate::input::InputSample;
use crate::styles::{LARGE_TEXT, SMALL_TEXT, TOP_LEFT};

const CENTER: Point = Point::new(JOYSTICK_CENTER_X, JOYSTICK_CENTER_Y);

const CROSSHAIR_V_START: Point = Point::new(JOYSTICK_CENTER_X, 10);
const CROSSHAIR_V_END: Point = Point::new(JOYSTICK_CENTER_X, 74);
const CROSSHAIR_H_START: Point = Point::new(70, JOYSTICK_CENTER_Y);
const CROSSHAIR_H_END: Point = Point::new(170, JOYSTICK_CENTER_Y);

const SPEED_LABEL_POS: Point = Point::new(180, 35);
const SPEED_VALUE_POS: Point = Point::new(180, 50);

const ACTIVE_STYLE: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_fill(GREEN);
const INACTIVE_STYLE: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_stroke(DARK, 1);
const CROSSHAIR_STYLE: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_stroke(DARK, 1);
const RING_STYLE: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_stroke(BLUE, 1);
const POINTER_FILL: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_fill(GREEN);
const POINTER_OUTLINE: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_stroke(TEXT, 1);

/// Circle of `radius` around `center` (diameter `2r + 1`).
fn circle(
    center: Point,
    radius: u32,
) -> Circle {
    Circle::with_center(center, radius * 2 + 1)
}

// =============================================================================
// Direction Wedges
// =============================================================================

/// One of the eight direction indicators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
    ForwardLeft,
    ForwardRight,
    BackwardLeft,
    BackwardRight,
}

impl Direction {
    pub const ALL: [Self; 8] = [
        Self::Forward,
        Self::Backward,
        Self::Left,
        Self::Right,
        Self::ForwardLeft,
        Self::ForwardRight,
        Self::BackwardLeft,
        Self::BackwardRight,
    ];

    /// Whether the stick points this way. Each involved axis must strictly exceed the deadzone;
    /// diagonals need both axes at once.
    pub const fn is_active(
        self,
        x: i32,
        y: i32,
        deadzone: i32,
    ) -> bool {
        let fwd = y > deadzone;
        let back = y < -deadzone;
        let left = x < -deadzone;
        let right = x > deadzone;

        match self {
            Self::Forward => fwd,
            Self::Backward => back,
            Self::Left => left,
            Self::Right => right,
            Self::ForwardLeft => fwd && left,
            Self::ForwardRight => fwd && right,
            Self::BackwardLeft => back && left,
            Self::BackwardRight => back && right,
        }
    }

    /// Wedge outline in region coordinates.
    pub fn wedge(self) -> Triangle {
        let (a, b, c) = match self {
            Self::Forward => ((120, 10), (115, 20), (125, 20)),
            Self::Backward => ((120, 74), (115, 64), (125, 64)),
            Self::Left => ((70, 42), (80, 37), (80, 47)),
            Self::Right => ((170, 42), (160, 37), (160, 47)),
            Self::ForwardLeft => ((90, 20), (95, 15), (100, 25)),
            Self::ForwardRight => ((150, 20), (145, 15), (140, 25)),
            Self::BackwardLeft => ((90, 64), (95, 69), (100, 59)),
            Self::BackwardRight => ((150, 64), (145, 69), (140, 59)),
        };
        Triangle::new(Point::new(a.0, a.1), Point::new(b.0, b.1), Point::new(c.0, c.1))
    }
}

/// Marker position for a conditioned sample. Screen Y grows downward, stick Y grows forward.
pub const fn marker_position(
    sample: &InputSample,
    scale: i32,
) -> Point {
    let scale = if scale == 0 { 1 } else { scale };
    Point::new(JOYSTICK_CENTER_X + sample.x / scale, JOYSTICK_CENTER_Y - sample.y / scale)
}

// =============================================================================
// Region
// =============================================================================

/// Draw the full joystick region.
pub fn draw_joystick_visual<D>(
    display: &mut D,
    sample: &InputSample,
    deadzone: i32,
    scale: i32,
) where
    D: DrawTarget<Color = Rgb565>,
{
    display.clear(BLACK).ok();

    Line::new(CROSSHAIR_V_START, CROSSHAIR_V_END)
        .into_styled(CROSSHAIR_STYLE)
        .draw(display)
        .ok();
    Line::new(CROSSHAIR_H_START, CROSSHAIR_H_END)
        .into_styled(CROSSHAIR_STYLE)
        .draw(display)
        .ok();

    for direction in Direction::ALL {
        let style = if direction.is_active(sample.x, sample.y, deadzone) {
            ACTIVE_STYLE
        } else {
            INACTIVE_STYLE
        };
        direction.wedge().into_styled(style).draw(display).ok();
    }

    circle(CENTER, JOYSTICK_CIRCLE_RADIUS)
        .into_styled(RING_STYLE)
        .draw(display)
        .ok();
    circle(CENTER, JOYSTICK_DOT_RADIUS)
        .into_styled(RING_STYLE)
        .draw(display)
        .ok();

    let marker = marker_position(sample, scale);
    circle(marker, JOYSTICK_POINTER_SIZE)
        .into_styled(POINTER_FILL)
        .draw(display)
        .ok();
    circle(marker, JOYSTICK_POINTER_SIZE)
        .into_styled(POINTER_OUTLINE)
        .draw(display)
        .ok();

    draw_speed(display, sample.speed_percent);
}

fn draw_speed<D>(
    display: &mut D,
    speed_percent: i32,
) where
    D: DrawTarget<Color = Rgb565>,
{
    Text::with_text_style("SPEED:", SPEED_LABEL_POS, SMALL_TEXT, TOP_LEFT)
        .draw(display)
        .ok();

    let mut value: String<8> = String::new();
    let _ = write!(value, "{speed_percent}");
    let next = Text::with_text_style(&value, SPEED_VALUE_POS, LARGE_TEXT, TOP_LEFT)
        .draw(display)
        .unwrap_or(SPEED_VALUE_POS);

    Text::with_text_style(" %", next, SMALL_TEXT, TOP_LEFT)
        .draw(display)
        .ok();
}
