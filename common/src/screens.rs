//! Full-screen frames shown outside the control loop: boot progress, ready, radio fault.
//!
//! Pure draw functions; the caller owns the timing:
//!
//! ```ignore
//! for step in 0..BOOT_STEPS {
//!     draw_boot_frame(&mut display, step);
//!     flush(&display);
//!     delay_ms(BOOT_STEP_MS);
//! }
//! draw_ready_screen(&mut display);
//! flush(&display);
//! delay_ms(READY_HOLD_MS);
//! ```

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Text;
use heapless::String;

use crate::colors::{BLACK, CRITICAL, GREEN, TEXT};
use crate::config::SCREEN_WIDTH;
use crate::styles::{BANNER_FONT, LARGE_GREEN, SMALL_FONT, SMALL_TEXT, TOP_CENTER, TOP_LEFT};

/// Progress steps on the boot screen.
pub const BOOT_STEPS: u8 = 10;

/// Time each boot step stays on screen.
pub const BOOT_STEP_MS: u64 = 100;

/// Time the ready screen stays on screen.
pub const READY_HOLD_MS: u64 = 500;

/// Time the fault screen stays on screen before the control loop starts.
pub const FAULT_HOLD_MS: u64 = 1500;

const BOOT_LINES: [(&str, Point); 3] = [
    ("NAZGHUL INDUSTRIES.", Point::new(10, 30)),
    ("REMOTE CONTROL SYSTEM", Point::new(10, 50)),
    ("INITIALIZING...", Point::new(10, 70)),
];
const PROGRESS_POS: Point = Point::new(10, 90);
const READY_POS: Point = Point::new(20, 60);

const FAULT_TITLE_POS: Point = Point::new((SCREEN_WIDTH / 2) as i32, 40);
const FAULT_DETAIL_POS: Point = Point::new((SCREEN_WIDTH / 2) as i32, 75);
const FAULT_HINT_POS: Point = Point::new((SCREEN_WIDTH / 2) as i32, 95);

const BOOT_STYLE: MonoTextStyle<'static, Rgb565> = MonoTextStyle::new(SMALL_FONT, GREEN);
const FAULT_TITLE_STYLE: MonoTextStyle<'static, Rgb565> = MonoTextStyle::new(BANNER_FONT, CRITICAL);

/// `PROGRESS: [===       ]` for `step` completed steps.
pub fn progress_bar(step: u8) -> String<24> {
    let step = step.min(BOOT_STEPS);
    let mut bar: String<24> = String::new();
    let _ = bar.push_str("PROGRESS: [");
    for i in 0..BOOT_STEPS {
        let _ = bar.push(if i < step { '=' } else { ' ' });
    }
    let _ = bar.push(']');
    bar
}

/// Draw boot step `step` (`0..BOOT_STEPS`).
pub fn draw_boot_frame<D>(
    display: &mut D,
    step: u8,
) where
    D: DrawTarget<Color = Rgb565>,
{
    display.clear(BLACK).ok();

    for (line, pos) in BOOT_LINES {
        Text::with_text_style(line, pos, BOOT_STYLE, TOP_LEFT)
            .draw(display)
            .ok();
    }

    Text::with_text_style(&progress_bar(step), PROGRESS_POS, BOOT_STYLE, TOP_LEFT)
        .draw(display)
        .ok();
}

pub fn draw_ready_screen<D>(display: &mut D)
where
    D: DrawTarget<Color = Rgb565>,
{
    display.clear(BLACK).ok();
    Text::with_text_style("SYSTEM READY", READY_POS, LARGE_GREEN, TOP_LEFT)
        .draw(display)
        .ok();
}

/// Radio bring-up failed. `detail` names the failed step.
pub fn draw_fault_screen<D>(
    display: &mut D,
    detail: &str,
) where
    D: DrawTarget<Color = Rgb565>,
{
    display.clear(BLACK).ok();
    Text::with_text_style("LINK FAULT", FAULT_TITLE_POS, FAULT_TITLE_STYLE, TOP_CENTER)
        .draw(display)
        .ok();
    Text::with_text_style(detail, FAULT_DETAIL_POS, SMALL_TEXT, TOP_CENTER)
        .draw(display)
        .ok();
    Text::with_text_style("TRANSMIT DISABLED", FAULT_HINT_POS, MonoTextStyle::new(SMALL_FONT, TEXT), TOP_CENTER)
        .draw(display)
        .ok();
}
