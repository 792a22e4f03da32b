//! Bias extraction from left-right spectrum chart images.
//!
//! Each outlet page embeds a chart with three markers: a blue marker at the
//! far left, a red marker at the far right, and a yellow "you are here"
//! marker somewhere between them. The bias score is the yellow marker's
//! horizontal position between the blue and red markers, mapped onto
//! `[-50, 50]`.
//!
//! # Pipeline
//!
//! 1. Normalize the decoded image to 8-bit RGB.
//! 2. Build one hue-band mask per marker ([`mask::hsv_mask`]).
//! 3. Take the yellow centroid x, the blue leftmost x and the red rightmost x
//!    ([`geometry`]).
//! 4. Interpolate and clamp ([`interpolate`]).
//!
//! The extractor is stateless and performs no I/O, so a single instance can
//! be shared freely between callers.

pub mod geometry;
pub mod mask;
pub mod palette;

use geometry::{ScanDirection, centroid, extreme_pixel};
use image::DynamicImage;
use itertools::Itertools;
use mask::{hsv_mask, normalize};
use palette::MarkerPalette;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Lowest possible score (yellow marker on the blue marker).
pub const BIAS_MIN: i32 = -50;
/// Highest possible score (yellow marker on the red marker).
pub const BIAS_MAX: i32 = 50;

/// One of the three chart markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MarkerColor {
    Blue,
    Red,
    Yellow,
}

impl fmt::Display for MarkerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MarkerColor::Blue => "blue",
            MarkerColor::Red => "red",
            MarkerColor::Yellow => "yellow",
        })
    }
}

/// Why a chart could not be turned into a score.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BiasError {
    #[error("no pixels matched the {} marker hue band", .channels.iter().join(", "))]
    InvalidMask { channels: Vec<MarkerColor> },
    #[error("blue and red markers both end at x = {x}; cannot interpolate")]
    DegenerateDomain { x: u32 },
}

/// Left-right bias in `[-50, 50]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct BiasScore(i32);

impl BiasScore {
    /// Build a score, clamping into `[-50, 50]`.
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(BIAS_MIN as i64, BIAS_MAX as i64) as i32)
    }

    pub fn value(self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for BiasScore {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        if (BIAS_MIN..=BIAS_MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(format!("bias score {value} outside [{BIAS_MIN}, {BIAS_MAX}]"))
        }
    }
}

impl From<BiasScore> for i32 {
    fn from(score: BiasScore) -> Self {
        score.0
    }
}

impl fmt::Display for BiasScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Horizontal marker positions found in one chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerPositions {
    /// Leftmost x of the blue marker.
    pub left: u32,
    /// Centroid x of the yellow marker.
    pub center: u32,
    /// Rightmost x of the red marker.
    pub right: u32,
}

/// Map marker positions onto a score.
///
/// `ratio = (center - left) / (right - left)`, then
/// `round(ratio * 100) - 50` with ties rounded to even, clamped into
/// `[-50, 50]`. Fails when `left == right`.
pub fn interpolate(positions: MarkerPositions) -> Result<BiasScore, BiasError> {
    let MarkerPositions {
        left,
        center,
        right,
    } = positions;
    if left == right {
        return Err(BiasError::DegenerateDomain { x: left });
    }
    let ratio = (center as f64 - left as f64) / (right as f64 - left as f64);
    let score = (ratio * 100.0).round_ties_even() as i64 - 50;
    Ok(BiasScore::clamped(score))
}

/// Turns chart images into bias scores using a fixed palette.
#[derive(Debug, Clone, Default)]
pub struct BiasExtractor {
    palette: MarkerPalette,
}

impl BiasExtractor {
    pub fn new(palette: MarkerPalette) -> Self {
        Self { palette }
    }

    pub fn palette(&self) -> &MarkerPalette {
        &self.palette
    }

    /// Locate the three markers.
    ///
    /// Every marker whose mask comes up empty is reported in one
    /// [`BiasError::InvalidMask`].
    pub fn locate(&self, image: &DynamicImage) -> Result<MarkerPositions, BiasError> {
        let rgb = normalize(image);
        let palette = &self.palette;

        let blue = hsv_mask(&rgb, palette.blue_hue, palette);
        let red = hsv_mask(&rgb, palette.red_hue, palette);
        let yellow = hsv_mask(&rgb, palette.yellow_hue, palette);

        let left = extreme_pixel(&blue, ScanDirection::LeftToRight);
        let right = extreme_pixel(&red, ScanDirection::RightToLeft);
        let center = centroid(&yellow);
        debug!(
            blue = blue.count(),
            red = red.count(),
            yellow = yellow.count(),
            "Marker mask sizes"
        );

        match (left, center, right) {
            (Some(left), Some(center), Some(right)) => Ok(MarkerPositions {
                left: left.x,
                center: center.x,
                right: right.x,
            }),
            _ => {
                let channels = [
                    (MarkerColor::Blue, left.is_none()),
                    (MarkerColor::Red, right.is_none()),
                    (MarkerColor::Yellow, center.is_none()),
                ]
                .into_iter()
                .filter_map(|(color, missing)| missing.then_some(color))
                .collect();
                Err(BiasError::InvalidMask { channels })
            }
        }
    }

    /// Score one chart image.
    pub fn extract(&self, image: &DynamicImage) -> Result<BiasScore, BiasError> {
        interpolate(self.locate(image)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use proptest::prelude::*;

    const BLUE: Rgb<u8> = Rgb([0, 0, 255]);
    const RED: Rgb<u8> = Rgb([255, 0, 0]);
    const YELLOW: Rgb<u8> = Rgb([255, 255, 0]);
    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    /// 100x50 chart: one-pixel-wide blue bar in rows 5..10, red bar in rows
    /// 10..15 and a 5x11 yellow block centered at `yellow_x` in rows 20..31.
    fn chart(blue_x: u32, red_x: u32, yellow_x: u32) -> RgbImage {
        let mut img = RgbImage::from_pixel(100, 50, WHITE);
        for y in 5..10 {
            img.put_pixel(blue_x, y, BLUE);
            img.put_pixel(red_x, y + 5, RED);
        }
        for x in yellow_x.saturating_sub(2)..=(yellow_x + 2).min(99) {
            for y in 20..31 {
                img.put_pixel(x, y, YELLOW);
            }
        }
        img
    }

    fn score(img: RgbImage) -> Result<BiasScore, BiasError> {
        BiasExtractor::default().extract(&DynamicImage::ImageRgb8(img))
    }

    #[test]
    fn test_centered_marker_scores_zero() {
        let extractor = BiasExtractor::default();
        let img = DynamicImage::ImageRgb8(chart(10, 90, 50));
        assert_eq!(
            extractor.locate(&img),
            Ok(MarkerPositions {
                left: 10,
                center: 50,
                right: 90
            })
        );
        assert_eq!(extractor.extract(&img).map(BiasScore::value), Ok(0));
    }

    #[test]
    fn test_marker_on_blue_scores_minus_fifty() {
        assert_eq!(score(chart(10, 90, 10)).map(BiasScore::value), Ok(-50));
    }

    #[test]
    fn test_marker_on_red_scores_fifty() {
        assert_eq!(score(chart(10, 90, 90)).map(BiasScore::value), Ok(50));
    }

    #[test]
    fn test_blocks_use_outer_edges() {
        let mut img = RgbImage::from_pixel(100, 50, WHITE);
        for x in 8..=12 {
            for y in 5..15 {
                img.put_pixel(x, y, BLUE);
                img.put_pixel(x + 80, y, RED);
            }
        }
        for x in 48..=52 {
            for y in 20..30 {
                img.put_pixel(x, y, YELLOW);
            }
        }
        let positions = BiasExtractor::default()
            .locate(&DynamicImage::ImageRgb8(img))
            .unwrap();
        assert_eq!(positions.left, 8);
        assert_eq!(positions.right, 92);
        assert_eq!(positions.center, 50);
        assert_eq!(interpolate(positions).map(BiasScore::value), Ok(0));
    }

    #[test]
    fn test_alpha_channel_is_ignored() {
        let rgb = chart(10, 90, 30);
        let mut rgba = RgbaImage::new(rgb.width(), rgb.height());
        for (x, y, p) in rgb.enumerate_pixels() {
            rgba.put_pixel(x, y, Rgba([p[0], p[1], p[2], 128]));
        }
        let extractor = BiasExtractor::default();
        assert_eq!(
            extractor.extract(&DynamicImage::ImageRgba8(rgba)),
            extractor.extract(&DynamicImage::ImageRgb8(rgb))
        );
    }

    #[test]
    fn test_blank_image_names_every_channel() {
        let img = RgbImage::from_pixel(100, 50, WHITE);
        assert_eq!(
            score(img),
            Err(BiasError::InvalidMask {
                channels: vec![MarkerColor::Blue, MarkerColor::Red, MarkerColor::Yellow]
            })
        );
    }

    #[test]
    fn test_missing_yellow_names_only_yellow() {
        let mut img = chart(10, 90, 50);
        for x in 48..=52 {
            for y in 20..31 {
                img.put_pixel(x, y, WHITE);
            }
        }
        let err = score(img).unwrap_err();
        assert_eq!(
            err,
            BiasError::InvalidMask {
                channels: vec![MarkerColor::Yellow]
            }
        );
        assert_eq!(
            err.to_string(),
            "no pixels matched the yellow marker hue band"
        );
    }

    #[test]
    fn test_error_message_lists_channels() {
        let err = BiasError::InvalidMask {
            channels: vec![MarkerColor::Blue, MarkerColor::Red],
        };
        assert_eq!(
            err.to_string(),
            "no pixels matched the blue, red marker hue band"
        );
    }

    #[test]
    fn test_coinciding_markers_are_degenerate() {
        assert_eq!(
            score(chart(40, 40, 60)),
            Err(BiasError::DegenerateDomain { x: 40 })
        );
        assert_eq!(
            interpolate(MarkerPositions {
                left: 7,
                center: 7,
                right: 7
            }),
            Err(BiasError::DegenerateDomain { x: 7 })
        );
    }

    #[test]
    fn test_rounding_ties_to_even() {
        // 0.125 * 100 = 12.5 -> 12
        let low = MarkerPositions {
            left: 0,
            center: 1,
            right: 8,
        };
        assert_eq!(interpolate(low).map(BiasScore::value), Ok(-38));
        // 0.375 * 100 = 37.5 -> 38
        let high = MarkerPositions {
            left: 0,
            center: 3,
            right: 8,
        };
        assert_eq!(interpolate(high).map(BiasScore::value), Ok(-12));
    }

    #[test]
    fn test_out_of_range_ratio_is_clamped() {
        let beyond = MarkerPositions {
            left: 10,
            center: 300,
            right: 20,
        };
        assert_eq!(interpolate(beyond).map(BiasScore::value), Ok(50));
        let before = MarkerPositions {
            left: 100,
            center: 0,
            right: 120,
        };
        assert_eq!(interpolate(before).map(BiasScore::value), Ok(-50));
    }

    #[test]
    fn test_bias_score_rejects_out_of_range() {
        assert!(BiasScore::try_from(51).is_err());
        assert!(BiasScore::try_from(-51).is_err());
        assert_eq!(BiasScore::try_from(-50).map(BiasScore::value), Ok(-50));
        assert_eq!(BiasScore::clamped(i64::MAX).value(), 50);
    }

    proptest! {
        #[test]
        fn prop_score_always_in_range(
            left in 0u32..10_000,
            center in 0u32..10_000,
            right in 0u32..10_000,
        ) {
            prop_assume!(left != right);
            let score = interpolate(MarkerPositions { left, center, right }).unwrap();
            prop_assert!((BIAS_MIN..=BIAS_MAX).contains(&score.value()));
        }

        #[test]
        fn prop_mirrored_chart_negates_score(yellow_x in 12u32..=87) {
            // The blue bar at 10 and red bar at 89 are mirror images in a
            // 100-pixel-wide chart.
            let original = score(chart(10, 89, yellow_x)).unwrap().value();
            let mirrored = score(chart(10, 89, 99 - yellow_x)).unwrap().value();
            prop_assert!((original + mirrored).abs() <= 1, "{original} vs {mirrored}");
        }
    }
}
