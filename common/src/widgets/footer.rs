//! Footer region: separator, mode label and battery gauge.

use core::fmt::Write;

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle};
use embedded_graphics::text::Text;
use heapless::String;

use crate::battery::battery_color;
use crate::colors::{DARK, GREEN};
use crate::config::SCREEN_WIDTH;
use crate::styles::{SMALL_CRITICAL, SMALL_FONT, SMALL_GREEN, SMALL_TEXT, TOP_LEFT, TOP_RIGHT};

const MODE_LABEL_POS: Point = Point::new(10, 8);
const BATTERY_POS: Point = Point::new((SCREEN_WIDTH - 10) as i32, 8);

const SEPARATOR_START: Point = Point::new(0, 0);
const SEPARATOR_END: Point = Point::new(SCREEN_WIDTH as i32 - 1, 0);
const SEPARATOR_STYLE: PrimitiveStyle<Rgb565> = PrimitiveStyle::with_stroke(GREEN, 1);

/// Draw the full footer region.
///
/// With `link_fault` set the mode label is replaced by `LINK FAULT`.
pub fn draw_footer<D>(
    display: &mut D,
    mode: &str,
    battery_percent: Option<u8>,
    link_fault: bool,
) where
    D: DrawTarget<Color = Rgb565>,
{
    display.clear(DARK).ok();

    Line::new(SEPARATOR_START, SEPARATOR_END)
        .into_styled(SEPARATOR_STYLE)
        .draw(display)
        .ok();

    let next = Text::with_text_style("MODE: ", MODE_LABEL_POS, SMALL_TEXT, TOP_LEFT)
        .draw(display)
        .unwrap_or(MODE_LABEL_POS);

    let (label, style) = if link_fault {
        ("LINK FAULT", SMALL_CRITICAL)
    } else {
        (mode, SMALL_GREEN)
    };
    Text::with_text_style(label, next, style, TOP_LEFT)
        .draw(display)
        .ok();

    if let Some(percent) = battery_percent {
        let mut text: String<12> = String::new();
        let _ = write!(text, "BAT {percent}%");
        let style = MonoTextStyle::new(SMALL_FONT, battery_color(percent));
        Text::with_text_style(&text, BATTERY_POS, style, TOP_RIGHT)
            .draw(display)
            .ok();
    }
}

#[cfg(test)]
mod tests {
    use embedded_graphics::primitives::{PointsIter, Rectangle};

    use super::*;
    use crate::colors::{AMBER, CRITICAL};
    use crate::config::FOOTER_BUF_LEN;
    use crate::display::Region;

    /// Whether any pixel of `color` lies inside `area`.
    fn contains_color(
        region: &Region<FOOTER_BUF_LEN>,
        area: Rectangle,
        color: Rgb565,
    ) -> bool {
        area.points().any(|p| region.pixel(p) == Some(color))
    }

    const LABEL_AREA: Rectangle = Rectangle::new(Point::new(46, 8), Size::new(60, 10));
    const BATTERY_AREA: Rectangle = Rectangle::new(Point::new(160, 8), Size::new(70, 10));

    #[test]
    fn test_mode_label_in_accent_colour() {
        let mut region = Region::<FOOTER_BUF_LEN>::new(110);
        draw_footer(&mut region, "RACE", None, false);
        assert!(contains_color(&region, LABEL_AREA, GREEN));
        assert!(!contains_color(&region, LABEL_AREA, CRITICAL));
        assert_eq!(region.pixel(Point::new(120, 0)), Some(GREEN));
    }

    #[test]
    fn test_fault_replaces_mode_label() {
        let mut region = Region::<FOOTER_BUF_LEN>::new(110);
        draw_footer(&mut region, "RACE", None, true);
        assert!(contains_color(&region, LABEL_AREA, CRITICAL));
        assert!(!contains_color(&region, LABEL_AREA, GREEN));
    }

    #[test]
    fn test_battery_colour_follows_charge() {
        let mut region = Region::<FOOTER_BUF_LEN>::new(110);
        draw_footer(&mut region, "RACE", Some(35), false);
        assert!(contains_color(&region, BATTERY_AREA, AMBER));

        draw_footer(&mut region, "RACE", Some(10), false);
        assert!(contains_color(&region, BATTERY_AREA, CRITICAL));
        assert!(!contains_color(&region, BATTERY_AREA, AMBER));
    }

    #[test]
    fn test_battery_hidden_when_unknown() {
        let mut region = Region::<FOOTER_BUF_LEN>::new(110);
        draw_footer(&mut region, "RACE", None, false);
        assert!(!contains_color(&region, BATTERY_AREA, GREEN));
    }
}
