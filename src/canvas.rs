use image::{GrayImage, ImageBuffer, Luma, Rgba, RgbaImage};
use image::imageops::flip_vertical;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Struct, representing raw rgba8 pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 {
    return 255;
}

pub const WHITE: Color =  Color { r: 255, g: 255, b: 255, a: 255 };
pub const BLACK: Color =  Color { r: 0,   g: 0,   b: 0,   a: 255 };
pub const RED: Color =    Color { r: 255, g: 0,   b: 0,   a: 255 };

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Color {
        return Color { r, g, b, a: 255 };
    }

    /// Scales the color channels by an intensity, leaving alpha alone.
    /// Float to u8 casts saturate, so intensities above 1.0 clip at 255 and negative ones at 0.
    pub fn scale(self, intensity: f32) -> Color {
        return Color {
            r: (self.r as f32 * intensity) as u8,
            g: (self.g as f32 * intensity) as u8,
            b: (self.b as f32 * intensity) as u8,
            a: self.a,
        };
    }
}

impl From<Rgba<u8>> for Color {
    fn from(pixel: Rgba<u8>) -> Color {
        let [r, g, b, a] = pixel.0;
        return Color { r, g, b, a };
    }
}

impl From<Color> for Rgba<u8> {
    fn from(color: Color) -> Rgba<u8> {
        return Rgba([color.r, color.g, color.b, color.a]);
    }
}

/// Translates a signed pixel coordinate into an unsigned one if it lies inside `width` x `height`.
/// Signed coordinates let callers address pixels outside of the buffer without casts.
fn checked_coord(width: u32, height: u32, x: i32, y: i32) -> Option<(u32, u32)> {
    if x < 0 || y < 0 || x as u32 >= width || y as u32 >= height {
        return None;
    }
    return Some((x as u32, y as u32));
}

/// Color buffer with the origin in the bottom left corner. Writes outside of the buffer are
/// ignored.
pub struct FrameBuffer {
    pixels: RgbaImage,
}

impl FrameBuffer {
    /// Generates a zeroed frame buffer with specified width and height.
    pub fn new(width: u32, height: u32) -> FrameBuffer {
        return FrameBuffer { pixels: ImageBuffer::new(width, height) };
    }

    pub fn width(&self) -> u32 {
        return self.pixels.width();
    }

    pub fn height(&self) -> u32 {
        return self.pixels.height();
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Color> {
        let (x, y) = checked_coord(self.width(), self.height(), x, y)?;
        return Some(Color::from(*self.pixels.get_pixel(x, y)));
    }

    /// Sets pixel to a color, returns false if the coordinate is outside of the buffer.
    pub fn set(&mut self, x: i32, y: i32, color: Color) -> bool {
        match checked_coord(self.width(), self.height(), x, y) {
            Some((x, y)) => {
                self.pixels.put_pixel(x, y, color.into());
                return true;
            }
            None => return false,
        }
    }

    /// Sets all pixels to (0, 0, 0, 0).
    /// Copy of the buffer with the usual top left origin, ready to be saved.
    pub fn to_image(&self) -> RgbaImage {
        return flip_vertical(&self.pixels);
    }
}

/// 8-bit depth buffer. Initialized to the minimum, larger values are nearer to the camera.
pub struct DepthBuffer {
    depth: GrayImage,
}

impl DepthBuffer {
    pub fn new(width: u32, height: u32) -> DepthBuffer {
        return DepthBuffer { depth: ImageBuffer::new(width, height) };
    }

    pub fn width(&self) -> u32 {
        return self.depth.width();
    }

    pub fn height(&self) -> u32 {
        return self.depth.height();
    }

    pub fn get(&self, x: i32, y: i32) -> Option<u8> {
        let (x, y) = checked_coord(self.width(), self.height(), x, y)?;
        return Some(self.depth.get_pixel(x, y).0[0]);
    }

    pub fn set(&mut self, x: i32, y: i32, z: u8) -> bool {
        match checked_coord(self.width(), self.height(), x, y) {
            Some((x, y)) => {
                self.depth.put_pixel(x, y, Luma([z]));
                return true;
            }
            None => return false,
        }
    }

    /// Grayscale picture of the buffer, brighter is nearer.
    pub fn to_image(&self) -> GrayImage {
        return flip_vertical(&self.depth);
    }
}

/// Read-only texture map. A missing map is represented by an empty texture, which samples as black.
pub struct Texture {
    image: Option<RgbaImage>,
}

impl Texture {
    /// Wraps an image whose first row is v = 0, i.e. already flipped from file order.
    pub fn new(image: RgbaImage) -> Texture {
        return Texture { image: Some(image) };
    }

    pub fn empty() -> Texture {
        return Texture { image: None };
    }

    pub fn is_empty(&self) -> bool {
        return self.image.is_none();
    }

    pub fn width(&self) -> u32 {
        return self.image.as_ref().map_or(0, |image| image.width());
    }

    pub fn height(&self) -> u32 {
        return self.image.as_ref().map_or(0, |image| image.height());
    }

    /// Texel at an integer coordinate, black when the texture is missing or the coordinate is
    /// outside of it.
    pub fn get(&self, x: i32, y: i32) -> Color {
        let Some(image) = &self.image else {
            return BLACK;
        };
        match checked_coord(image.width(), image.height(), x, y) {
            Some((x, y)) => return Color::from(*image.get_pixel(x, y)),
            None => return BLACK,
        }
    }

    /// Nearest texel for uv in [0, 1], truncating towards the origin.
    pub fn sample(&self, uv: Vector2<f32>) -> Color {
        let x = (uv.x * self.width() as f32) as i32;
        let y = (uv.y * self.height() as f32) as i32;
        return self.get(x, y);
    }
}

impl Default for Texture {
    fn default() -> Texture {
        return Texture::empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    #[test]
    fn out_of_range_access_is_a_no_op() {
        let mut frame = FrameBuffer::new(4, 3);
        assert!(!frame.set(4, 0, RED));
        assert!(!frame.set(0, -1, RED));
        assert!(frame.set(3, 2, RED));
        assert_eq!(frame.get(3, 2), Some(RED));
        assert_eq!(frame.get(-1, 0), None);

        let mut depth = DepthBuffer::new(4, 3);
        assert!(!depth.set(0, 3, 10));
        assert_eq!(depth.get(0, 0), Some(0));
        assert_eq!(depth.get(0, 3), None);
    }

    #[test]
    fn exported_frame_has_top_left_origin() {
        let mut frame = FrameBuffer::new(2, 2);
        frame.set(0, 0, Color::new(0, 255, 0));
        let image = frame.to_image();
        assert_eq!(image.get_pixel(0, 1), &Rgba([0, 255, 0, 255]));
        assert_eq!(image.get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn scale_clips_to_channel_range() {
        let c = Color::new(200, 100, 10);
        assert_eq!(c.scale(0.5), Color::new(100, 50, 5));
        assert_eq!(c.scale(2.0), Color::new(255, 200, 20));
        assert_eq!(c.scale(-1.0), Color::new(0, 0, 0));
    }

    #[test]
    fn missing_texture_samples_black() {
        let texture = Texture::empty();
        assert!(texture.is_empty());
        assert_eq!(texture.width(), 0);
        assert_eq!(texture.sample(vector![0.5, 0.5]), BLACK);
    }

    #[test]
    fn texture_sampling_truncates_uv() {
        let mut image = RgbaImage::new(4, 2);
        image.put_pixel(2, 1, Rgba([1, 2, 3, 255]));
        let texture = Texture::new(image);
        assert_eq!(texture.sample(vector![0.6, 0.9]), Color::new(1, 2, 3));
        // u = 1.0 lands one past the last column.
        assert_eq!(texture.sample(vector![1.0, 0.0]), BLACK);
    }
}
