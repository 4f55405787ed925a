use crate::error::Result;
use crate::hashing::{combine, hash_bytes};
use image::RgbaImage;

/// A decoded, possibly-trimmed sprite ready for packing.
#[derive(Debug)]
pub struct Bitmap {
    pub name: String,
    pub width: i32,
    pub height: i32,
    pub frame_x: i32,
    pub frame_y: i32,
    pub frame_w: i32,
    pub frame_h: i32,
    pub data: Vec<u8>,
    pub content_hash: u64,
}

impl Bitmap {
    pub fn new(image: RgbaImage, name: String, premultiply: bool, trim: bool) -> Self {
        let w = image.width() as i32;
        let h = image.height() as i32;
        let mut pixels = image.into_vec();

        if premultiply {
            premultiply_pixels(&mut pixels, w, h);
        }

        let (min_x, min_y, max_x, max_y) = if trim {
            match tight_alpha_bounds(&pixels, w, h) {
                Some(bounds) => bounds,
                None => {
                    log::warn!("image is completely transparent: {}", &name);
                    return Self::fully_transparent(name, w, h);
                }
            }
        } else {
            (0, 0, w - 1, h - 1)
        };

        let width = (max_x - min_x) + 1;
        let height = (max_y - min_y) + 1;
        let frame_w = w;
        let frame_h = h;

        let (frame_x, frame_y, data) = if width == w && height == h {
            (0, 0, pixels)
        } else {
            let mut data = vec![0u8; (width * height) as usize * 4];
            for y in min_y..=max_y {
                for x in min_x..=max_x {
                    for channel in 0..4 {
                        data[((y - min_y) * width + (x - min_x)) as usize * 4 + channel] =
                            pixels[(y * w + x) as usize * 4 + channel];
                    }
                }
            }
            (min_x, min_y, data)
        };

        let content_hash = content_hash_of(width, height, &data);

        Self {
            name,
            width,
            height,
            frame_x,
            frame_y,
            frame_w,
            frame_h,
            data,
            content_hash,
        }
    }

    /// A 1x1 transparent bitmap, used when an image has no opaque pixels at all.
    /// `frame_w`/`frame_h` preserve the original, untrimmed dimensions.
    fn fully_transparent(name: String, frame_w: i32, frame_h: i32) -> Self {
        let data = vec![0u8; 4];
        let content_hash = content_hash_of(1, 1, &data);
        Self {
            name,
            width: 1,
            height: 1,
            frame_x: 0,
            frame_y: 0,
            frame_w,
            frame_h,
            data,
            content_hash,
        }
    }

    pub fn blank(width: i32, height: i32) -> Self {
        Self {
            name: String::new(),
            width,
            height,
            frame_x: 0,
            frame_y: 0,
            frame_w: width,
            frame_h: height,
            data: vec![0u8; (width * height) as usize * 4],
            content_hash: 0,
        }
    }

    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_vec(self.width as u32, self.height as u32, self.data.clone()).unwrap()
    }

    pub fn save_as<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        self.to_image().save(path)?;
        Ok(())
    }

    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32, channel: usize) -> u8 {
        self.data[(y * self.width + x) as usize * 4 + channel]
    }

    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, channel: usize, value: u8) {
        self.data[(y * self.width + x) as usize * 4 + channel] = value;
    }

    /// Blits `src` at `(tx, ty)`, unrotated.
    pub fn blit(&mut self, src: &Bitmap, tx: i32, ty: i32) {
        for y in 0..src.height {
            for x in 0..src.width {
                for channel in 0..4 {
                    self.set_pixel(tx + x, ty + y, channel, src.get_pixel(x, y, channel));
                }
            }
        }
    }

    /// Blits `src` at `(tx, ty)`, rotated 90 degrees clockwise: the source's
    /// columns become the destination's rows.
    pub fn blit_rotated(&mut self, src: &Bitmap, tx: i32, ty: i32) {
        let r = src.height - 1;
        for y in 0..src.width {
            for x in 0..src.height {
                for channel in 0..4 {
                    self.set_pixel(tx + x, ty + y, channel, src.get_pixel(y, r - x, channel));
                }
            }
        }
    }
}

impl PartialEq for Bitmap {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height && self.data == other.data
    }
}

impl Eq for Bitmap {}

fn premultiply_pixels(pixels: &mut [u8], w: i32, h: i32) {
    let count = (w as usize) * (h as usize);
    for i in 0..count {
        let r = pixels[i * 4];
        let g = pixels[i * 4 + 1];
        let b = pixels[i * 4 + 2];
        let a = pixels[i * 4 + 3] as f32 / 255.0;

        pixels[i * 4] = (r as f32 * a).round() as u8;
        pixels[i * 4 + 1] = (g as f32 * a).round() as u8;
        pixels[i * 4 + 2] = (b as f32 * a).round() as u8;
    }
}

/// Returns the tight `(min_x, min_y, max_x, max_y)` bounding box of pixels
/// with nonzero alpha, or `None` if every pixel is fully transparent.
fn tight_alpha_bounds(pixels: &[u8], w: i32, h: i32) -> Option<(i32, i32, i32, i32)> {
    let mut min_x = w;
    let mut min_y = h;
    let mut max_x = -1;
    let mut max_y = -1;

    for y in 0..h {
        for x in 0..w {
            let a = pixels[(y * w + x) as usize * 4 + 3];
            if a != 0 {
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
            }
        }
    }

    if max_x < min_x || max_y < min_y {
        None
    } else {
        Some((min_x, min_y, max_x, max_y))
    }
}

fn content_hash_of(width: i32, height: i32, data: &[u8]) -> u64 {
    let h = combine(0, width as u64);
    let h = combine(h, height as u64);
    combine(h, hash_bytes(data))
}
