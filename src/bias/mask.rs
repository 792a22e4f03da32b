//! Hue-band color masks.
//!
//! A mask marks every pixel whose hue lies within a tolerance window of a
//! target hue and whose saturation and value both clear a minimum. The
//! minimums keep near-white and near-black background pixels from aliasing
//! into a hue bucket.
//!
//! Hue uses the 8-bit cylindrical scale `0..=179` (degrees halved), while
//! saturation and value use `0..=255`.

use super::palette::{ChannelOrder, MarkerPalette};
use image::{DynamicImage, RgbImage};

/// A pixel converted to 8-bit HSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsv {
    /// Hue in `0..=179`.
    pub h: u8,
    /// Saturation in `0..=255`.
    pub s: u8,
    /// Value (brightness) in `0..=255`.
    pub v: u8,
}

/// Convert one RGB pixel to 8-bit HSV.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let s = if max == 0.0 {
        0.0
    } else {
        255.0 * delta / max
    };

    let mut h = if delta == 0.0 {
        0.0
    } else if max == rf {
        60.0 * (gf - bf) / delta
    } else if max == gf {
        120.0 + 60.0 * (bf - rf) / delta
    } else {
        240.0 + 60.0 * (rf - gf) / delta
    };
    if h < 0.0 {
        h += 360.0;
    }

    Hsv {
        h: ((h / 2.0).round() as u16 % 180) as u8,
        s: s.round() as u8,
        v: max as u8,
    }
}

/// Boolean grid with the same dimensions as the image it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    width: u32,
    height: u32,
    on: Vec<bool>,
}

impl BinaryMask {
    /// An all-off mask.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            on: vec![false; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the pixel at `(x, y)` is on. Out-of-bounds pixels are off.
    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.on[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        let i = self.index(x, y);
        self.on[i] = value;
    }

    /// Number of on pixels.
    pub fn count(&self) -> usize {
        self.on.iter().filter(|&&p| p).count()
    }

    /// Iterate the coordinates of on pixels in row-major order.
    pub fn on_pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let width = self.width as usize;
        self.on
            .iter()
            .enumerate()
            .filter(|(_, on)| **on)
            .map(move |(i, _)| ((i % width) as u32, (i / width) as u32))
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// Normalize any decoded layout (gray, RGB, RGBA, 16-bit) to 8-bit RGB.
///
/// Alpha is dropped, not composited.
pub fn normalize(image: &DynamicImage) -> RgbImage {
    image.to_rgb8()
}

/// Circular distance between two hues on the `0..=179` scale.
fn hue_distance(a: u8, b: u8) -> u8 {
    let d = (a as i16 - b as i16).rem_euclid(180);
    d.min(180 - d) as u8
}

/// Build the mask of pixels falling in the hue band around `hue`.
///
/// A pixel is on when its hue is within `palette.hue_tolerance` of `hue`
/// (wrapping at 180) and both saturation and value are at least the
/// palette minimums.
pub fn hsv_mask(image: &RgbImage, hue: u8, palette: &MarkerPalette) -> BinaryMask {
    let mut mask = BinaryMask::new(image.width(), image.height());
    for (x, y, pixel) in image.enumerate_pixels() {
        let [r, g, b] = palette.channel_order.arrange(pixel.0);
        let hsv = rgb_to_hsv(r, g, b);
        let in_band = hue_distance(hsv.h, hue) <= palette.hue_tolerance;
        if in_band && hsv.s >= palette.saturation_min && hsv.v >= palette.value_min {
            mask.set(x, y, true);
        }
    }
    mask
}

impl ChannelOrder {
    /// Reorder an RGB pixel into the layout the palette hues were measured in.
    pub fn arrange(self, [r, g, b]: [u8; 3]) -> [u8; 3] {
        match self {
            ChannelOrder::Rgb => [r, g, b],
            ChannelOrder::Bgr => [b, g, r],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgba, RgbaImage};

    #[test]
    fn test_rgb_to_hsv_primaries() {
        assert_eq!(rgb_to_hsv(255, 0, 0), Hsv { h: 0, s: 255, v: 255 });
        assert_eq!(rgb_to_hsv(0, 255, 0), Hsv { h: 60, s: 255, v: 255 });
        assert_eq!(rgb_to_hsv(0, 0, 255), Hsv { h: 120, s: 255, v: 255 });
        assert_eq!(rgb_to_hsv(255, 255, 0), Hsv { h: 30, s: 255, v: 255 });
        assert_eq!(rgb_to_hsv(0, 255, 255), Hsv { h: 90, s: 255, v: 255 });
    }

    #[test]
    fn test_rgb_to_hsv_grays_have_no_saturation() {
        assert_eq!(rgb_to_hsv(255, 255, 255), Hsv { h: 0, s: 0, v: 255 });
        assert_eq!(rgb_to_hsv(0, 0, 0), Hsv { h: 0, s: 0, v: 0 });
        assert_eq!(rgb_to_hsv(128, 128, 128).s, 0);
    }

    #[test]
    fn test_rgb_to_hsv_wraps_near_360() {
        // Hue of 359 degrees rounds up to 180 and wraps to 0.
        let hsv = rgb_to_hsv(255, 0, 2);
        assert!(hsv.h == 0 || hsv.h == 179, "got {}", hsv.h);
    }

    #[test]
    fn test_hue_distance_is_circular() {
        assert_eq!(hue_distance(179, 0), 1);
        assert_eq!(hue_distance(5, 175), 10);
        assert_eq!(hue_distance(92, 90), 2);
    }

    #[test]
    fn test_arrange_swaps_red_and_blue() {
        assert_eq!(ChannelOrder::Bgr.arrange([1, 2, 3]), [3, 2, 1]);
        assert_eq!(ChannelOrder::Rgb.arrange([1, 2, 3]), [1, 2, 3]);
    }

    #[test]
    fn test_hsv_mask_default_palette_matches_pure_markers() {
        let palette = MarkerPalette::default();
        let mut img = RgbImage::from_pixel(4, 1, Rgb([255, 255, 255]));
        img.put_pixel(0, 0, Rgb([0, 0, 255])); // blue
        img.put_pixel(1, 0, Rgb([255, 0, 0])); // red
        img.put_pixel(2, 0, Rgb([255, 255, 0])); // yellow

        let blue = hsv_mask(&img, palette.blue_hue, &palette);
        let red = hsv_mask(&img, palette.red_hue, &palette);
        let yellow = hsv_mask(&img, palette.yellow_hue, &palette);

        assert_eq!(blue.on_pixels().collect::<Vec<_>>(), vec![(0, 0)]);
        assert_eq!(red.on_pixels().collect::<Vec<_>>(), vec![(1, 0)]);
        assert_eq!(yellow.on_pixels().collect::<Vec<_>>(), vec![(2, 0)]);
    }

    #[test]
    fn test_hsv_mask_rejects_dark_and_pale_pixels() {
        let palette = MarkerPalette::default();
        let mut img = RgbImage::new(3, 1);
        img.put_pixel(0, 0, Rgb([0, 0, 100])); // too dark
        img.put_pixel(1, 0, Rgb([200, 200, 255])); // too pale
        img.put_pixel(2, 0, Rgb([0, 0, 120])); // exactly at the value floor

        let mask = hsv_mask(&img, palette.blue_hue, &palette);
        assert!(!mask.get(0, 0));
        assert!(!mask.get(1, 0));
        assert!(mask.get(2, 0));
    }

    #[test]
    fn test_hsv_mask_honors_tolerance() {
        let palette = MarkerPalette {
            channel_order: ChannelOrder::Rgb,
            ..MarkerPalette::default()
        };
        // Green is hue 60; a band around 75 with tolerance 10 misses it.
        let img = RgbImage::from_pixel(1, 1, Rgb([0, 255, 0]));
        assert_eq!(hsv_mask(&img, 75, &palette).count(), 0);
        assert_eq!(hsv_mask(&img, 70, &palette).count(), 1);
    }

    #[test]
    fn test_normalize_drops_alpha() {
        let rgba = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 0]));
        let rgb = normalize(&DynamicImage::ImageRgba8(rgba));
        assert_eq!(rgb.get_pixel(1, 1), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_binary_mask_get_out_of_bounds_is_off() {
        let mut mask = BinaryMask::new(2, 2);
        mask.set(1, 1, true);
        assert!(mask.get(1, 1));
        assert!(!mask.get(2, 1));
        assert!(!mask.get(1, 5));
        assert_eq!(mask.count(), 1);
    }
}
