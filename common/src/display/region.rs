//! Off-screen RGB565 buffer for one horizontal slice of the display.
//!
//! Pixels are stored big-endian, the byte order the ST7789 expects on the wire, so a region can
//! be copied into a framebuffer or streamed to the panel without conversion.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PointsIter, Rectangle};

use crate::config::SCREEN_WIDTH;

const WIDTH: usize = SCREEN_WIDTH as usize;

/// Full-width region buffer of `N` bytes (`N / (2 * SCREEN_WIDTH)` rows) placed at a fixed
/// vertical offset on the surface.
pub struct Region<const N: usize> {
    pixels: [u8; N],
    y_offset: i32,
}

impl<const N: usize> Region<N> {
    /// Rows in this region.
    pub const HEIGHT: u32 = (N / (WIDTH * 2)) as u32;

    const VALID: () = assert!(N > 0 && N % (WIDTH * 2) == 0);

    pub const fn new(y_offset: i32) -> Self {
        let () = Self::VALID;
        Self {
            pixels: [0u8; N],
            y_offset,
        }
    }

    /// Position of the region's top-left corner on the surface.
    #[inline]
    pub const fn origin(&self) -> Point { Point::new(0, self.y_offset) }

    /// Area the region covers on the surface.
    #[inline]
    pub const fn area(&self) -> Rectangle { Rectangle::new(self.origin(), Size::new(SCREEN_WIDTH, Self::HEIGHT)) }

    /// Raw big-endian RGB565 bytes, row-major.
    #[inline]
    pub const fn bytes(&self) -> &[u8] { &self.pixels }

    /// Read back one pixel (region-local coordinates).
    pub fn pixel(
        &self,
        point: Point,
    ) -> Option<Rgb565> {
        let idx = self.index(point.x, point.y)?;
        let raw = u16::from_be_bytes([self.pixels[idx], self.pixels[idx + 1]]);
        Some(RawU16::new(raw).into())
    }

    #[inline]
    fn index(
        &self,
        x: i32,
        y: i32,
    ) -> Option<usize> {
        if x >= 0 && x < WIDTH as i32 && y >= 0 && y < Self::HEIGHT as i32 {
            Some((y as usize * WIDTH + x as usize) * 2)
        } else {
            None
        }
    }

    #[inline]
    fn write(
        &mut self,
        idx: usize,
        color: Rgb565,
    ) {
        let raw: RawU16 = color.into();
        let bytes = raw.into_inner().to_be_bytes();
        self.pixels[idx] = bytes[0];
        self.pixels[idx + 1] = bytes[1];
    }
}

impl<const N: usize> OriginDimensions for Region<N> {
    fn size(&self) -> Size { Size::new(SCREEN_WIDTH, Self::HEIGHT) }
}

impl<const N: usize> DrawTarget for Region<N> {
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
            if let Some(idx) = self.index(point.x, point.y) {
                self.write(idx, color);
            }
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
        // Colours are ordered over the full `area`, so walk it and skip clipped pixels.
        let mut colors = colors.into_iter();
        for point in area.points() {
            let Some(color) = colors.next() else {
                break;
            };
            if let Some(idx) = self.index(point.x, point.y) {
                self.write(idx, color);
            }
        }
        Ok(())
    }

    fn fill_solid(
        &mut self,
        area: &Rectangle,
        color: Self::Color,
    ) -> Result<(), Self::Error> {
        let drawable_area = area.intersection(&self.bounding_box());
        if drawable_area.size == Size::zero() {
            return Ok(());
        }

        let raw: RawU16 = color.into();
        let pixel = raw.into_inner().to_be_bytes();
        let x_start = drawable_area.top_left.x as usize;
        let width = drawable_area.size.width as usize;

        for y in drawable_area.rows() {
            let row_start = (y as usize * WIDTH + x_start) * 2;
            for chunk in self.pixels[row_start..row_start + width * 2].chunks_exact_mut(2) {
                chunk.copy_from_slice(&pixel);
            }
        }
        Ok(())
    }

    fn clear(
        &mut self,
        color: Self::Color,
    ) -> Result<(), Self::Error> {
        let raw: RawU16 = color.into();
        let pixel = raw.into_inner().to_be_bytes();
        for chunk in self.pixels.chunks_exact_mut(2) {
            chunk.copy_from_slice(&pixel);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use embedded_graphics::primitives::PrimitiveStyle;

    use super::*;
    use crate::colors::{DARK, GREEN};
    use crate::config::{HEADER_BUF_LEN, JOYSTICK_BUF_LEN};

    #[test]
    fn test_height_from_buffer_length() {
        assert_eq!(Region::<HEADER_BUF_LEN>::HEIGHT, 25);
        assert_eq!(Region::<JOYSTICK_BUF_LEN>::HEIGHT, 85);
    }

    #[test]
    fn test_pixels_are_big_endian() {
        let mut region = Region::<HEADER_BUF_LEN>::new(0);
        Pixel(Point::new(1, 0), GREEN).draw(&mut region).unwrap();
        assert_eq!(&region.bytes()[2..4], &[0x5E, 0x0A]);
        assert_eq!(region.pixel(Point::new(1, 0)), Some(GREEN));
    }

    #[test]
    fn test_drawing_is_clipped_to_region() {
        let mut region = Region::<HEADER_BUF_LEN>::new(0);
        region.clear(DARK).unwrap();
        Rectangle::new(Point::new(230, 20), Size::new(40, 40))
            .into_styled(PrimitiveStyle::with_fill(GREEN))
            .draw(&mut region)
            .unwrap();
        assert_eq!(region.pixel(Point::new(239, 24)), Some(GREEN));
        assert_eq!(region.pixel(Point::new(229, 24)), Some(DARK));
        assert_eq!(region.pixel(Point::new(240, 24)), None);
    }

    #[test]
    fn test_fill_contiguous_skips_clipped_pixels() {
        let mut region = Region::<HEADER_BUF_LEN>::new(0);
        let area = Rectangle::new(Point::new(-1, 0), Size::new(2, 1));
        region.fill_contiguous(&area, [DARK, GREEN]).unwrap();
        assert_eq!(region.pixel(Point::new(0, 0)), Some(GREEN));
    }

    #[test]
    fn test_area_on_surface() {
        let region = Region::<JOYSTICK_BUF_LEN>::new(25);
        assert_eq!(region.area(), Rectangle::new(Point::new(0, 25), Size::new(240, 85)));
    }
}
