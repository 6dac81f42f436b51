//! Small geometric helpers shared by the tracker and the calibration code.

use image::imageops::{self, FilterType};
use image::RgbImage;
use serde::{Deserialize, Serialize};

/// A 2D point in image (screen) space or surface space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point2) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn midpoint(&self, other: &Point2) -> Point2 {
        Point2::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Four corners of a sampled surface.
pub type Quad = [Point2; 4];

/// Resize `frame` to `width` pixels wide, keeping the aspect ratio.
pub fn resize_to_width(frame: RgbImage, width: u32) -> RgbImage {
    if width == 0 || frame.width() == width || frame.width() == 0 {
        return frame;
    }

    let ratio = width as f32 / frame.width() as f32;
    let height = ((frame.height() as f32 * ratio).floor() as u32).max(1);

    imageops::resize(&frame, width, height, FilterType::Triangle)
}

/// Order four corners as top-left, top-right, bottom-right, bottom-left.
///
/// Points are ranked by row (ties broken by column), then each row pair is
/// ordered left-to-right on top and right-to-left on the bottom. The result
/// does not depend on the input order.
pub fn sort_corners(mut corners: Quad) -> Quad {
    corners.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));

    if corners[0].x > corners[1].x {
        corners.swap(0, 1);
    }
    if corners[2].x < corners[3].x {
        corners.swap(2, 3);
    }

    corners
}

/// Component-wise mean of a set of quadrilaterals, `None` when empty.
pub fn average_quads(quads: &[Quad]) -> Option<Quad> {
    if quads.is_empty() {
        return None;
    }

    let mut sum = [Point2::default(); 4];
    for quad in quads {
        for (acc, p) in sum.iter_mut().zip(quad.iter()) {
            acc.x += p.x;
            acc.y += p.y;
        }
    }

    let n = quads.len() as f64;
    for p in sum.iter_mut() {
        p.x /= n;
        p.y /= n;
    }

    Some(sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Quad {
        [
            Point2::new(10.0, 10.0),
            Point2::new(100.0, 10.0),
            Point2::new(100.0, 100.0),
            Point2::new(10.0, 100.0),
        ]
    }

    #[test]
    fn test_sort_corners_canonical_order() {
        let sorted = sort_corners([
            Point2::new(100.0, 100.0),
            Point2::new(10.0, 10.0),
            Point2::new(10.0, 100.0),
            Point2::new(100.0, 10.0),
        ]);
        assert_eq!(sorted, square());
    }

    #[test]
    fn test_sort_corners_ignores_cyclic_and_reflected_order() {
        let quad = [
            Point2::new(12.0, 8.0),
            Point2::new(95.0, 14.0),
            Point2::new(104.0, 97.0),
            Point2::new(6.0, 90.0),
        ];
        let expected = sort_corners(quad);

        for shift in 0..4 {
            let mut rotated = quad;
            rotated.rotate_left(shift);
            assert_eq!(sort_corners(rotated), expected);

            let mut reflected = rotated;
            reflected.reverse();
            assert_eq!(sort_corners(reflected), expected);
        }
    }

    #[test]
    fn test_sort_corners_diamond_is_deterministic() {
        let diamond = [
            Point2::new(50.0, 0.0),
            Point2::new(100.0, 50.0),
            Point2::new(50.0, 100.0),
            Point2::new(0.0, 50.0),
        ];
        let expected = sort_corners(diamond);
        let mut reflected = diamond;
        reflected.reverse();
        assert_eq!(sort_corners(reflected), expected);
    }

    #[test]
    fn test_average_identical_quads_is_identity() {
        let avg = average_quads(&[square(), square()]).unwrap();
        assert_eq!(avg, square());
        assert!(average_quads(&[]).is_none());
    }

    #[test]
    fn test_average_offsets() {
        let mut shifted = square();
        for p in shifted.iter_mut() {
            p.x += 2.0;
            p.y -= 4.0;
        }
        let avg = average_quads(&[square(), shifted]).unwrap();
        assert!((avg[0].x - 11.0).abs() < 1e-9);
        assert!((avg[0].y - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_resize_keeps_aspect_ratio() {
        let frame = RgbImage::new(960, 540);
        let resized = resize_to_width(frame, 480);
        assert_eq!(resized.dimensions(), (480, 270));

        let same = resize_to_width(RgbImage::new(480, 360), 480);
        assert_eq!(same.dimensions(), (480, 360));
    }
}
