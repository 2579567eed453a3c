use crate::paint::Color;

/// Row-major RGBA target for the reference rasterizer. Row 0 is the top.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl FrameBuffer {
    /// Transparent framebuffer of `width * height` pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Color::TRANSPARENT)
    }

    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        self.offset(x, y).map(|i| self.pixels[i])
    }

    pub fn get_mut(&mut self, x: u32, y: u32) -> Option<&mut Color> {
        let i = self.offset(x, y)?;
        self.pixels.get_mut(i)
    }

    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// Packs to RGBA8 with straight alpha, clamping each channel.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|c| c.to_array())
            .map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_access_is_none() {
        let mut fb = FrameBuffer::new(2, 3);
        assert_eq!(fb.get(1, 2), Some(Color::TRANSPARENT));
        assert_eq!(fb.get(2, 0), None);
        assert!(fb.get_mut(0, 3).is_none());
    }

    #[test]
    fn rows_are_contiguous() {
        let mut fb = FrameBuffer::new(3, 2);
        *fb.get_mut(0, 1).unwrap() = Color::WHITE;
        assert_eq!(fb.pixels()[3], Color::WHITE);
    }

    #[test]
    fn to_rgba8_clamps() {
        let mut fb = FrameBuffer::filled(1, 1, Color::new(2.0, 0.5, -1.0, 1.0));
        assert_eq!(fb.to_rgba8(), vec![255, 128, 0, 255]);
        fb.clear(Color::TRANSPARENT);
        assert_eq!(fb.to_rgba8(), vec![0, 0, 0, 0]);
    }
}
