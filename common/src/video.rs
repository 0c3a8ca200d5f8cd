//! Receiver-side helpers for the video relay: fitting decoded frames onto the panel and
//! measuring the frame rate.
//!
//! The decoder emits a frame as a sequence of pixel blocks in image coordinates. Each block is
//! scaled by one uniform factor and shifted so the whole frame sits centred on the surface with
//! its aspect ratio preserved.

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

/// Uniform scale plus centring offsets for one image size on one surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitTransform {
    scale: f32,
    x_offset: i32,
    y_offset: i32,
    surface: Size,
}

impl FitTransform {
    /// Largest scale at which `image` still fits on `surface`. `None` for an empty image.
    pub fn fit(
        image: Size,
        surface: Size,
    ) -> Option<Self> {
        if image.width == 0 || image.height == 0 {
            return None;
        }

        let scale_w = surface.width as f32 / image.width as f32;
        let scale_h = surface.height as f32 / image.height as f32;
        let scale = scale_w.min(scale_h);

        Some(Self {
            scale,
            x_offset: ((surface.width as f32 - image.width as f32 * scale) / 2.0) as i32,
            y_offset: ((surface.height as f32 - image.height as f32 * scale) / 2.0) as i32,
            surface,
        })
    }

    #[inline]
    pub const fn scale(&self) -> f32 { self.scale }

    #[inline]
    pub const fn offset(&self) -> Point { Point::new(self.x_offset, self.y_offset) }

    /// Where a decoded block lands on the surface.
    ///
    /// Returns `None` once a block starts at or beyond the right or bottom edge; the decoder
    /// should stop emitting the rest of the frame.
    pub fn place_block(
        &self,
        block: &Rectangle,
    ) -> Option<Rectangle> {
        let x = self.x_offset + (block.top_left.x as f32 * self.scale) as i32;
        let y = self.y_offset + (block.top_left.y as f32 * self.scale) as i32;

        if y >= self.surface.height as i32 || x >= self.surface.width as i32 {
            return None;
        }

        let width = (block.size.width as f32 * self.scale) as u32;
        let height = (block.size.height as f32 * self.scale) as u32;
        Some(Rectangle::new(Point::new(x, y), Size::new(width, height)))
    }
}

/// Counts frames and reports the rate once per second.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameRateMeter {
    frames: u32,
    window_start_ms: u64,
}

/// Length of one measurement window.
pub const FPS_WINDOW_MS: u64 = 1000;

impl FrameRateMeter {
    pub const fn new() -> Self {
        Self {
            frames: 0,
            window_start_ms: 0,
        }
    }

    /// Count one frame at `now_ms`. Returns the frame count of the window that just closed.
    pub fn frame(
        &mut self,
        now_ms: u64,
    ) -> Option<u32> {
        self.frames += 1;
        if now_ms.saturating_sub(self.window_start_ms) < FPS_WINDOW_MS {
            return None;
        }
        let fps = self.frames;
        self.frames = 0;
        self.window_start_ms = now_ms;
        Some(fps)
    }
}
