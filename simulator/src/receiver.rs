//! Receiver-side view: the car's end of the link.
//!
//! Decodes every delivered datagram and shows the last control packet. With the video relay
//! enabled it also plays a synthetic camera feed, fitted onto the pane the way the receiver
//! fits decoded JPEG blocks onto its panel, with a frame rate readout.

use core::fmt::Write;

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::Text;
use heapless::String;
use rc_link_common::colors::{BLACK, BLUE, CRITICAL, DARK, GREEN, TEXT};
use rc_link_common::styles::{SMALL_GREEN, SMALL_TEXT, TOP_LEFT, TOP_RIGHT};
use rc_link_common::video::{FitTransform, FrameRateMeter};
use rc_link_common::wire::{ControlPacket, WireError};

/// Synthetic camera frame size (QVGA, like the usual ESP32 camera setting).
const CAMERA_FRAME: Size = Size::new(320, 240);

/// Decoder output block (one JPEG MCU row segment).
const BLOCK: u32 = 16;

const TITLE_POS: Point = Point::new(5, 4);
const STATUS_POS: Point = Point::new(235, 4);
const PACKET_POS: Point = Point::new(5, 18);
const VIDEO_AREA: Rectangle = Rectangle::new(Point::new(0, 32), Size::new(240, 90));
const FPS_POS: Point = Point::new(4, 2);
const LOG_POS: Point = Point::new(5, 124);

const TITLE_STYLE: MonoTextStyle<'static, Rgb565> = MonoTextStyle::new(&profont::PROFONT_9_POINT, BLUE);

pub struct Receiver {
    last_packet: Option<ControlPacket>,
    packets: u32,
    decode_errors: u32,
    video: bool,
    fit: Option<FitTransform>,
    meter: FrameRateMeter,
    fps: u32,
    frame: u32,
}

impl Receiver {
    pub fn new() -> Self {
        Self {
            last_packet: None,
            packets: 0,
            decode_errors: 0,
            video: false,
            fit: FitTransform::fit(CAMERA_FRAME, VIDEO_AREA.size),
            meter: FrameRateMeter::new(),
            fps: 0,
            frame: 0,
        }
    }

    /// Decode one delivered datagram.
    pub fn receive(
        &mut self,
        datagram: &[u8],
    ) -> Result<ControlPacket, WireError> {
        match ControlPacket::decode(datagram) {
            Ok(packet) => {
                self.packets += 1;
                self.last_packet = Some(packet);
                Ok(packet)
            }
            Err(e) => {
                self.decode_errors += 1;
                Err(e)
            }
        }
    }

    /// Toggle the video relay. Returns the new state.
    pub fn toggle_video(&mut self) -> bool {
        self.video = !self.video;
        self.fps = 0;
        self.meter = FrameRateMeter::new();
        self.video
    }

    #[inline]
    pub const fn packets(&self) -> u32 { self.packets }

    /// Draw the whole pane. `log_line` goes in the bottom row.
    pub fn draw<D>(
        &mut self,
        display: &mut D,
        now_ms: u64,
        log_line: Option<&str>,
    ) where
        D: DrawTarget<Color = Rgb565>,
    {
        display.clear(BLACK).ok();

        Text::with_text_style("RECEIVER", TITLE_POS, TITLE_STYLE, TOP_LEFT)
            .draw(display)
            .ok();

        let mut status: String<24> = String::new();
        let _ = write!(status, "PKTS {}", self.packets);
        if self.decode_errors > 0 {
            let _ = write!(status, " ERR {}", self.decode_errors);
        }
        Text::with_text_style(&status, STATUS_POS, SMALL_TEXT, TOP_RIGHT)
            .draw(display)
            .ok();

        let mut line: String<40> = String::new();
        match self.last_packet {
            Some(p) => {
                let button = if p.button { "ON" } else { "OFF" };
                let _ = write!(line, "X:{:>4} Y:{:>4} BTN:{}", p.x, p.y, button);
            }
            None => {
                let _ = line.push_str("WAITING FOR LINK");
            }
        }
        Text::with_text_style(&line, PACKET_POS, SMALL_GREEN, TOP_LEFT)
            .draw(display)
            .ok();

        if self.video {
            self.draw_video(&mut display.cropped(&VIDEO_AREA), now_ms);
        } else {
            VIDEO_AREA
                .into_styled(PrimitiveStyle::with_fill(DARK))
                .draw(display)
                .ok();
        }

        if let Some(text) = log_line {
            Text::with_text_style(text, LOG_POS, SMALL_TEXT, TOP_LEFT)
                .draw(display)
                .ok();
        }
    }

    fn draw_video<D>(
        &mut self,
        display: &mut D,
        now_ms: u64,
    ) where
        D: DrawTarget<Color = Rgb565>,
    {
        let Some(fit) = self.fit else {
            return;
        };

        // Emit blocks in decoder order; stop at the first one that falls off the pane
        'frame: for by in 0..CAMERA_FRAME.height / BLOCK {
            for bx in 0..CAMERA_FRAME.width / BLOCK {
                let block = Rectangle::new(
                    Point::new((bx * BLOCK) as i32, (by * BLOCK) as i32),
                    Size::new(BLOCK, BLOCK),
                );
                let Some(placed) = fit.place_block(&block) else {
                    break 'frame;
                };
                placed
                    .into_styled(PrimitiveStyle::with_fill(test_pattern(bx, by, self.frame)))
                    .draw(display)
                    .ok();
            }
        }
        self.frame = self.frame.wrapping_add(1);

        if let Some(fps) = self.meter.frame(now_ms) {
            self.fps = fps;
        }
        let mut label: String<12> = String::new();
        let _ = write!(label, "{} FPS", self.fps);
        let color = if self.fps >= 20 { GREEN } else { CRITICAL };
        let style = MonoTextStyle::new(&profont::PROFONT_9_POINT, color);
        Text::with_text_style(&label, FPS_POS, style, TOP_LEFT)
            .draw(display)
            .ok();
    }
}

impl Default for Receiver {
    fn default() -> Self { Self::new() }
}

/// Moving diagonal colour bars.
fn test_pattern(
    bx: u32,
    by: u32,
    frame: u32,
) -> Rgb565 {
    const BARS: [Rgb565; 4] = [GREEN, BLUE, TEXT, DARK];
    BARS[((bx + by + frame / 4) % BARS.len() as u32) as usize]
}
