//! Header region: signal bars, link status and separator.

use core::fmt::Write;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle};
use embedded_graphics::text::Text;
use heapless::String;

use crate::colors::{DARK, GREEN};
use crate::config::{
    HEADER_HEIGHT,
    MAX_SIGNAL_STRENGTH,
    SCREEN_WIDTH,
    SIGNAL_BAR_SPACING,
    SIGNAL_BAR_WIDTH,
    SIGNAL_BAR_X_START,
};
use crate::styles::{SMALL_CRITICAL, SMALL_TEXT, TOP_LEFT, TOP_RIGHT};

const SIGNAL_LABEL_POS: Point = Point::new(5, 8);
const STATUS_POS: Point = Point::new((SCREEN_WIDTH - 5) as i32, 8);

/// Bottom edge shared by every bar.
const BAR_BASELINE: i32 = 18;

const SEPARATOR_START: Point = Point::new(0, HEADER_HEIGHT as i32 - 1);
const SEPARATOR_END: Point = Point::new(SCREEN_WIDTH as i32 - 1, HEADER_HEIGHT as i32 - 1);

const BAR_FILL: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_fill(GREEN);
const BAR_OUTLINE: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_stroke(GREEN, 1);
const SEPARATOR_STYLE: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_stroke(GREEN, 1);

/// Bounds of signal bar `i`: each bar is two pixels taller than the previous, bottoms aligned.
pub const fn signal_bar(i: u8) -> Rectangle {
    let i = i as i32;
    let height = 3 + i * 2;
    Rectangle::new(
        Point::new(SIGNAL_BAR_X_START + i * SIGNAL_BAR_SPACING, BAR_BASELINE - height),
        Size::new(SIGNAL_BAR_WIDTH, height as u32),
    )
}

/// Draw the full header region.
///
/// Bar `i` is filled when `i < signal_level`, outlined otherwise. The right side shows the last
/// round-trip latency, or `NO LINK` when the radio failed to start.
pub fn draw_header<D>(
    display: &mut D,
    signal_level: u8,
    latency_ms: Option<u32>,
    link_fault: bool,
) where
    D: DrawTarget<Color = Rgb565>,
{
    display.clear(DARK).ok();

    Text::with_text_style("SIGNAL:", SIGNAL_LABEL_POS, SMALL_TEXT, TOP_LEFT)
        .draw(display)
        .ok();

    for i in 0..MAX_SIGNAL_STRENGTH {
        let style = if i < signal_level { BAR_FILL } else { BAR_OUTLINE };
        signal_bar(i).into_styled(style).draw(display).ok();
    }

    if link_fault {
        Text::with_text_style("NO LINK", STATUS_POS, SMALL_CRITICAL, TOP_RIGHT)
            .draw(display)
            .ok();
    } else {
        let mut status: String<12> = String::new();
        match latency_ms {
            Some(ms) => {
                let _ = write!(status, "{ms}ms");
            }
            None => {
                let _ = status.push_str("--ms");
            }
        }
        Text::with_text_style(&status, STATUS_POS, SMALL_TEXT, TOP_RIGHT)
            .draw(display)
            .ok();
    }

    Line::new(SEPARATOR_START, SEPARATOR_END)
        .into_styled(SEPARATOR_STYLE)
        .draw(display)
        .ok();
}
