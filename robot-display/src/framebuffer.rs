use embedded_graphics::{pixelcolor::Rgb565, prelude::*};

/// In-memory RGB565 draw target, used for offscreen frames and tests.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    size: Size,
    pixels: Vec<Rgb565>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Size::new(width, height),
            pixels: vec![Rgb565::BLACK; width as usize * height as usize],
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb565> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Number of pixels with exactly `color`.
    pub fn count(&self, color: Rgb565) -> usize {
        self.pixels.iter().filter(|&&p| p == color).count()
    }

    pub fn pixels(&self) -> &[Rgb565] {
        &self.pixels
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.size.width && y < self.size.height {
            Some(y as usize * self.size.width as usize + x as usize)
        } else {
            None
        }
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Rgb565;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            if let Some(i) = self.index(point.x as u32, point.y as u32) {
                self.pixels[i] = color;
            }
        }
        Ok(())
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        self.size
    }
}
