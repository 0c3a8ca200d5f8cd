//! Three-region display compositor.
//!
//! The screen is split into three full-width slices that tile it exactly:
//!
//! ```text
//! y   0 +---------------------------+
//!       | header    (signal, link)  |  25 rows
//! y  25 +---------------------------+
//!       | joystick  (wedges, speed) |  85 rows
//! y 110 +---------------------------+
//!       | footer    (mode, battery) |  25 rows
//! y 135 +---------------------------+
//! ```
//!
//! Every slice owns an off-screen [`Region`] buffer. When the display gate opens all three are
//! redrawn from scratch and blitted to the [`Surface`]; otherwise `update` does nothing.

mod region;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

pub use region::Region;

use crate::config::{
    ControllerConfig,
    FOOTER_BUF_LEN,
    FOOTER_Y,
    HEADER_BUF_LEN,
    JOYSTICK_AREA_Y,
    JOYSTICK_BUF_LEN,
};
use crate::input::InputSample;
use crate::link::LinkState;
use crate::schedule::{Gate, Scheduler};
use crate::widgets::{draw_footer, draw_header, draw_joystick_visual};

// =============================================================================
// Surface Boundary
// =============================================================================

/// Physical raster the compositor pushes finished regions to.
pub trait Surface {
    type Error;

    /// Copy a block of big-endian RGB565 pixels (row-major, `size.width` per row) to `top_left`.
    fn blit(
        &mut self,
        top_left: Point,
        size: Size,
        pixels: &[u8],
    ) -> Result<(), Self::Error>;
}

/// Adapts any `DrawTarget<Color = Rgb565>` into a [`Surface`].
pub struct DrawTargetSurface<'a, D>(pub &'a mut D);

impl<D> Surface for DrawTargetSurface<'_, D>
where
    D: DrawTarget<Color = Rgb565>,
{
    type Error = D::Error;

    fn blit(
        &mut self,
        top_left: Point,
        size: Size,
        pixels: &[u8],
    ) -> Result<(), Self::Error> {
        let colors = pixels
            .chunks_exact(2)
            .map(|px| Rgb565::from(RawU16::new(u16::from_be_bytes([px[0], px[1]]))));
        self.0.fill_contiguous(&Rectangle::new(top_left, size), colors)
    }
}

// =============================================================================
// Compositor
// =============================================================================

/// Everything the three regions show for one frame.
#[derive(Clone, Copy, Debug)]
pub struct StatusView<'a> {
    pub sample: InputSample,
    pub link: LinkState,
    pub mode: &'a str,
    /// Radio failed to start; header and footer show a fault instead of link data.
    pub link_fault: bool,
    pub battery_percent: Option<u8>,
}

/// Header, joystick and footer region buffers plus the visual tunables.
pub struct DisplayCompositor {
    header: Region<HEADER_BUF_LEN>,
    joystick: Region<JOYSTICK_BUF_LEN>,
    footer: Region<FOOTER_BUF_LEN>,
    deadzone: i32,
    visual_scale: i32,
    frames: u32,
}

impl DisplayCompositor {
    pub const fn new(config: &ControllerConfig) -> Self {
        Self {
            header: Region::new(0),
            joystick: Region::new(JOYSTICK_AREA_Y),
            footer: Region::new(FOOTER_Y),
            deadzone: config.deadzone,
            visual_scale: config.visual_scale,
            frames: 0,
        }
    }

    /// Redraw and blit all regions if the display gate is open at `now_ms`.
    ///
    /// Returns `Ok(false)` without touching anything while the gate is closed.
    pub fn update<S: Surface>(
        &mut self,
        scheduler: &mut Scheduler,
        now_ms: u64,
        view: &StatusView<'_>,
        surface: &mut S,
    ) -> Result<bool, S::Error> {
        if !scheduler.try_fire(Gate::Display, now_ms) {
            return Ok(false);
        }
        self.compose(view);
        self.blit(surface)?;
        Ok(true)
    }

    /// Redraw every region off-screen.
    pub fn compose(
        &mut self,
        view: &StatusView<'_>,
    ) {
        draw_header(&mut self.header, view.link.signal_level, view.link.latency_ms, view.link_fault);
        draw_joystick_visual(&mut self.joystick, &view.sample, self.deadzone, self.visual_scale);
        draw_footer(&mut self.footer, view.mode, view.battery_percent, view.link_fault);
        self.frames = self.frames.wrapping_add(1);
    }

    /// Push every region to its fixed offset.
    pub fn blit<S: Surface>(
        &self,
        surface: &mut S,
    ) -> Result<(), S::Error> {
        push(surface, &self.header)?;
        push(surface, &self.joystick)?;
        push(surface, &self.footer)
    }

    /// Frames composed since boot.
    #[inline]
    pub const fn frames(&self) -> u32 { self.frames }
}

fn push<S: Surface, const N: usize>(
    surface: &mut S,
    region: &Region<N>,
) -> Result<(), S::Error> {
    let area = region.area();
    surface.blit(area.top_left, area.size, region.bytes())
}

#[cfg(test)]
mod tests {
    use std::vec::Vec;

    use super::*;
    use crate::colors::{BLACK, DARK, GREEN};
    use crate::config::{SCREEN_HEIGHT, SCREEN_WIDTH};

    /// Records blits and keeps a full-screen copy.
    struct RecordingSurface {
        blits: Vec<(Point, Size)>,
        screen: Vec<u8>,
    }

    impl RecordingSurface {
        fn new() -> Self {
            Self {
                blits: Vec::new(),
                screen: std::vec![0; (SCREEN_WIDTH * SCREEN_HEIGHT * 2) as usize],
            }
        }

        fn pixel(
            &self,
            x: usize,
            y: usize,
        ) -> Rgb565 {
            let idx = (y * SCREEN_WIDTH as usize + x) * 2;
            RawU16::new(u16::from_be_bytes([self.screen[idx], self.screen[idx + 1]])).into()
        }
    }

    impl Surface for RecordingSurface {
        type Error = ();

        fn blit(
            &mut self,
            top_left: Point,
            size: Size,
            pixels: &[u8],
        ) -> Result<(), ()> {
            assert_eq!(pixels.len(), (size.width * size.height * 2) as usize);
            let start = top_left.y as usize * SCREEN_WIDTH as usize * 2;
            self.screen[start..start + pixels.len()].copy_from_slice(pixels);
            self.blits.push((top_left, size));
            Ok(())
        }
    }

    fn view() -> StatusView<'static> {
        StatusView {
            sample: InputSample::neutral(),
            link: LinkState {
                signal_level: 3,
                ..LinkState::default()
            },
            mode: "RACE",
            link_fault: false,
            battery_percent: Some(80),
        }
    }

    #[test]
    fn test_update_is_noop_while_gate_closed() {
        let mut compositor = DisplayCompositor::new(&ControllerConfig::default());
        let mut scheduler = Scheduler::default();
        let mut surface = RecordingSurface::new();

        assert_eq!(compositor.update(&mut scheduler, 49, &view(), &mut surface), Ok(false));
        assert!(surface.blits.is_empty());
        assert_eq!(compositor.frames(), 0);
    }

    #[test]
    fn test_update_blits_three_disjoint_regions() {
        let mut compositor = DisplayCompositor::new(&ControllerConfig::default());
        let mut scheduler = Scheduler::default();
        let mut surface = RecordingSurface::new();

        assert_eq!(compositor.update(&mut scheduler, 50, &view(), &mut surface), Ok(true));
        assert_eq!(
            surface.blits,
            [
                (Point::new(0, 0), Size::new(240, 25)),
                (Point::new(0, 25), Size::new(240, 85)),
                (Point::new(0, 110), Size::new(240, 25)),
            ]
        );
        assert_eq!(compositor.update(&mut scheduler, 60, &view(), &mut surface), Ok(false));
        assert_eq!(compositor.frames(), 1);
    }

    #[test]
    fn test_regions_land_at_their_offsets() {
        let mut compositor = DisplayCompositor::new(&ControllerConfig::default());
        let mut surface = RecordingSurface::new();
        compositor.compose(&view());
        compositor.blit(&mut surface).unwrap();

        // Header background, header separator, joystick background, footer separator.
        assert_eq!(surface.pixel(0, 0), DARK);
        assert_eq!(surface.pixel(0, 24), GREEN);
        assert_eq!(surface.pixel(0, 30), BLACK);
        assert_eq!(surface.pixel(0, 110), GREEN);
        assert_eq!(surface.pixel(0, 120), DARK);
    }

    #[test]
    fn test_draw_target_surface_writes_pixels() {
        use embedded_graphics::mock_display::MockDisplay;

        let mut display: MockDisplay<Rgb565> = MockDisplay::new();
        let pixels = [0x5E, 0x0A, 0x02, 0x00];
        DrawTargetSurface(&mut display)
            .blit(Point::new(1, 2), Size::new(2, 1), &pixels)
            .unwrap();
        assert_eq!(display.get_pixel(Point::new(1, 2)), Some(GREEN));
        assert_eq!(display.get_pixel(Point::new(2, 2)), Some(DARK));
    }
}
