//! Async ST7789 driver for the Pico Display Pack, double buffered.
//!
//! - [`FrameBuffers`]: two static 240x135 RGB565 frames (2 x 64,800 bytes), one drawn while the
//!   other is on its way to the panel
//! - [`St7789Renderer`]: `DrawTarget` and compositor [`Surface`] over one frame
//! - [`St7789Flusher`]: owns SPI0 and pushes whole frames via DMA
//!
//! The 1.14" panel is a window into the controller's 240x320 RAM, so every address carries a
//! fixed column/row offset.

use embassy_rp::gpio::Output;
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{Async, Spi};
use embassy_time::Timer;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PointsIter, Rectangle};
use rc_link_common::config::{SCREEN_HEIGHT, SCREEN_WIDTH};
use rc_link_common::display::Surface;

pub const WIDTH: usize = SCREEN_WIDTH as usize;
pub const HEIGHT: usize = SCREEN_HEIGHT as usize;
const FRAME_BYTES: usize = WIDTH * HEIGHT * 2;

/// Panel origin inside controller RAM (landscape).
const COLUMN_OFFSET: u16 = 40;
const ROW_OFFSET: u16 = 53;

static mut FRAMES: [[u8; FRAME_BYTES]; 2] = [[0u8; FRAME_BYTES]; 2];

// =============================================================================
// Controller Commands
// =============================================================================

const SWRESET: u8 = 0x01;
const SLPOUT: u8 = 0x11;
const NORON: u8 = 0x13;
const INVON: u8 = 0x21;
const DISPON: u8 = 0x29;
const CASET: u8 = 0x2A;
const RASET: u8 = 0x2B;
const RAMWR: u8 = 0x2C;
const MADCTL: u8 = 0x36;
const COLMOD: u8 = 0x3A;

/// MADCTL: column order mirrored, rows/columns exchanged, bottom-to-top refresh.
const LANDSCAPE: u8 = 0x40 | 0x20 | 0x10;

/// Power-up sequence: `(command, parameters, settle time in ms)`.
const INIT_SEQUENCE: [(u8, &[u8], u64); 6] = [
    (SWRESET, &[], 150),
    (SLPOUT, &[], 10),
    (COLMOD, &[0x55], 0), // 16 bpp
    (MADCTL, &[LANDSCAPE], 0),
    (INVON, &[], 10), // IPS panel
    (NORON, &[], 10),
];

// =============================================================================
// Frame Buffers
// =============================================================================

/// Tracks which of the two static frames is the back (drawing) buffer.
pub struct FrameBuffers {
    back: usize,
}

impl FrameBuffers {
    /// # Safety
    /// At most one instance may exist; it hands out the static frames.
    pub const unsafe fn new() -> Self { Self { back: 0 } }

    #[inline]
    pub const fn back_index(&self) -> usize { self.back }

    /// The frame to draw into.
    ///
    /// # Safety
    /// The flush task must not be reading this frame.
    #[inline]
    pub unsafe fn back(&mut self) -> &'static mut [u8] {
        unsafe { &mut (*core::ptr::addr_of_mut!(FRAMES))[self.back] }
    }

    /// Hand the back frame over for flushing. Returns its index; the other frame becomes the
    /// back buffer.
    #[inline]
    pub fn present(&mut self) -> usize {
        let finished = self.back;
        self.back ^= 1;
        finished
    }
}

/// Read-only view of frame `idx` for the flusher.
///
/// # Safety
/// Nothing may be drawing into that frame while the returned slice is in use.
#[inline]
pub unsafe fn frame(idx: usize) -> &'static [u8] { unsafe { &(*core::ptr::addr_of!(FRAMES))[idx & 1] } }

// =============================================================================
// Flusher
// =============================================================================

/// Owns SPI and the control pins. Lives in the flush task after boot.
pub struct St7789Flusher<'d> {
    spi: Spi<'d, SPI0, Async>,
    dc: Output<'d>,
    cs: Output<'d>,
}

impl<'d> St7789Flusher<'d> {
    pub fn new(
        spi: Spi<'d, SPI0, Async>,
        dc: Output<'d>,
        cs: Output<'d>,
    ) -> Self {
        Self { spi, dc, cs }
    }

    /// Wake the panel and address the whole screen.
    pub async fn init(&mut self) {
        for (command, params, settle_ms) in INIT_SEQUENCE {
            self.transfer(command, params).await;
            if settle_ms > 0 {
                Timer::after_millis(settle_ms).await;
            }
        }
        self.transfer(DISPON, &[]).await;
        Timer::after_millis(10).await;

        // Every flush is a full frame, so the window never changes
        let (x0, y0) = (COLUMN_OFFSET, ROW_OFFSET);
        let (x1, y1) = (x0 + WIDTH as u16 - 1, y0 + HEIGHT as u16 - 1);
        self.transfer(CASET, &span(x0, x1)).await;
        self.transfer(RASET, &span(y0, y1)).await;
    }

    /// One command with its parameters, each phase framed by CS.
    async fn transfer(
        &mut self,
        command: u8,
        params: &[u8],
    ) {
        self.cs.set_low();
        self.dc.set_low();
        self.spi.write(&[command]).await.ok();
        self.cs.set_high();

        if params.is_empty() {
            return;
        }
        self.cs.set_low();
        self.dc.set_high();
        self.spi.write(params).await.ok();
        self.cs.set_high();
    }

    /// Push one full frame to display RAM.
    pub async fn flush_buffer(
        &mut self,
        frame: &[u8],
    ) {
        self.cs.set_low();
        self.dc.set_low();
        // Single byte: a blocking write beats DMA setup
        self.spi.blocking_write(&[RAMWR]).ok();
        self.dc.set_high();
        self.spi.write(frame).await.ok();
        self.cs.set_high();
    }
}

/// CASET/RASET parameter bytes for an inclusive address range.
const fn span(
    start: u16,
    end: u16,
) -> [u8; 4] {
    let [s_hi, s_lo] = start.to_be_bytes();
    let [e_hi, e_lo] = end.to_be_bytes();
    [s_hi, s_lo, e_hi, e_lo]
}

// =============================================================================
// Renderer
// =============================================================================

/// Draws into one frame in panel byte order (big-endian RGB565).
pub struct St7789Renderer<'a> {
    frame: &'a mut [u8],
}

impl<'a> St7789Renderer<'a> {
    pub fn new(frame: &'a mut [u8]) -> Self { Self { frame } }

    /// Byte offset of `point`, `None` off-screen.
    #[inline]
    fn offset(point: Point) -> Option<usize> {
        let x = usize::try_from(point.x).ok().filter(|&x| x < WIDTH)?;
        let y = usize::try_from(point.y).ok().filter(|&y| y < HEIGHT)?;
        Some((y * WIDTH + x) * 2)
    }

    #[inline]
    fn put(
        &mut self,
        point: Point,
        color: Rgb565,
    ) {
        if let Some(at) = Self::offset(point) {
            self.frame[at..at + 2].copy_from_slice(&panel_bytes(color));
        }
    }
}

#[inline]
fn panel_bytes(color: Rgb565) -> [u8; 2] { RawU16::from(color).into_inner().to_be_bytes() }

impl OriginDimensions for St7789Renderer<'_> {
    fn size(&self) -> Size { Size::new(SCREEN_WIDTH, SCREEN_HEIGHT) }
}

impl DrawTarget for St7789Renderer<'_> {
    type Color = Rgb565;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(
        &mut self,
        pixels: I,
    ) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.put(point, color);
        }
        Ok(())
    }

    fn fill_contiguous<I>(
        &mut self,
        area: &Rectangle,
        colors: I,
    ) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        for (point, color) in area.points().zip(colors) {
            self.put(point, color);
        }
        Ok(())
    }

    fn fill_solid(
        &mut self,
        area: &Rectangle,
        color: Self::Color,
    ) -> Result<(), Self::Error> {
        let visible = area.intersection(&self.bounding_box());
        let Some(first) = Self::offset(visible.top_left).filter(|_| visible.size != Size::zero()) else {
            return Ok(());
        };

        let bytes = panel_bytes(color);
        let row_len = visible.size.width as usize * 2;
        for row in 0..visible.size.height as usize {
            let start = first + row * WIDTH * 2;
            for px in self.frame[start..start + row_len].chunks_exact_mut(2) {
                px.copy_from_slice(&bytes);
            }
        }
        Ok(())
    }

    fn clear(
        &mut self,
        color: Self::Color,
    ) -> Result<(), Self::Error> {
        let bytes = panel_bytes(color);
        for px in self.frame.chunks_exact_mut(2) {
            px.copy_from_slice(&bytes);
        }
        Ok(())
    }
}

/// Region pixels are already in panel byte order, so a blit is one copy per row.
impl Surface for St7789Renderer<'_> {
    type Error = core::convert::Infallible;

    fn blit(
        &mut self,
        top_left: Point,
        size: Size,
        pixels: &[u8],
    ) -> Result<(), Self::Error> {
        let visible = Rectangle::new(top_left, size).intersection(&self.bounding_box());
        let Some(first) = Self::offset(visible.top_left).filter(|_| visible.size != Size::zero()) else {
            return Ok(());
        };

        let src_stride = size.width as usize * 2;
        let src_skip = (visible.top_left.x - top_left.x) as usize * 2;
        let src_first_row = (visible.top_left.y - top_left.y) as usize;
        let row_len = visible.size.width as usize * 2;

        for row in 0..visible.size.height as usize {
            let src = (src_first_row + row) * src_stride + src_skip;
            let Some(src) = pixels.get(src..src + row_len) else {
                break;
            };
            let dst = first + row * WIDTH * 2;
            self.frame[dst..dst + row_len].copy_from_slice(src);
        }
        Ok(())
    }
}
