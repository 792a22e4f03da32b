//! Geometric queries on binary masks.
//!
//! Both queries return `None` for a mask with no on pixels; the caller decides
//! which marker that failure belongs to.

use super::mask::BinaryMask;

/// Integer pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

/// Column scan order for [`extreme_pixel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDirection {
    /// Leftmost column first.
    LeftToRight,
    /// Rightmost column first.
    RightToLeft,
}

/// Arithmetic mean of the on-pixel coordinates, truncated to integers.
pub fn centroid(mask: &BinaryMask) -> Option<Point> {
    let (count, sum_x, sum_y) = mask
        .on_pixels()
        .fold((0u64, 0u64, 0u64), |(n, sx, sy), (x, y)| {
            (n + 1, sx + x as u64, sy + y as u64)
        });
    if count == 0 {
        return None;
    }
    Some(Point {
        x: (sum_x / count) as u32,
        y: (sum_y / count) as u32,
    })
}

/// First on pixel found scanning columns in `direction`, rows top to bottom.
///
/// When several on pixels share the extreme column, the topmost one wins.
pub fn extreme_pixel(mask: &BinaryMask, direction: ScanDirection) -> Option<Point> {
    let (width, height) = (mask.width(), mask.height());
    let columns: Box<dyn Iterator<Item = u32>> = match direction {
        ScanDirection::LeftToRight => Box::new(0..width),
        ScanDirection::RightToLeft => Box::new((0..width).rev()),
    };
    for x in columns {
        if let Some(y) = (0..height).find(|&y| mask.get(x, y)) {
            return Some(Point { x, y });
        }
    }
    None
}
