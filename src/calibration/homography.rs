//! Perspective mapping from the camera image onto the unit surface square.
//!
//! Solved directly from the four calibrated corners. With the `opencv`
//! feature the matrix comes from `calib3d::find_homography` instead.

use imageproc::geometry::contour_area;
use imageproc::point::Point;
use nalgebra::{SMatrix, SVector};

use crate::geometry::Point2;

/// Surface coordinates of the sorted corners (top-left, top-right,
/// bottom-right, bottom-left).
pub const UNIT_SQUARE: [Point2; 4] = [
    Point2::new(0.0, 1.0),
    Point2::new(1.0, 1.0),
    Point2::new(1.0, 0.0),
    Point2::new(0.0, 0.0),
];

/// 3x3 projective transform (row-major).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography {
    pub matrix: [[f64; 3]; 3],
}

impl Default for Homography {
    fn default() -> Self {
        Self {
            matrix: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }
}

impl Homography {
    /// Transform taking the sorted screen corners onto [`UNIT_SQUARE`].
    pub fn from_corners(corners: &[Point2; 4]) -> Option<Self> {
        Self::from_correspondences(corners, &UNIT_SQUARE)
    }

    /// Exact transform for four point pairs, `None` when they are degenerate.
    #[cfg(not(feature = "opencv"))]
    pub fn from_correspondences(src: &[Point2; 4], dst: &[Point2; 4]) -> Option<Self> {
        solve_dlt(src, dst)
    }

    #[cfg(feature = "opencv")]
    pub fn from_correspondences(src: &[Point2; 4], dst: &[Point2; 4]) -> Option<Self> {
        match opencv_impl::find_homography(src, dst) {
            Ok(h) => Some(h),
            Err(e) => {
                log::warn!("OpenCV homography failed ({}), using direct solve", e);
                solve_dlt(src, dst)
            }
        }
    }

    /// Map a single point, `None` if it lands on the line at infinity.
    pub fn apply(&self, point: Point2) -> Option<Point2> {
        let h = &self.matrix;
        let w = h[2][0] * point.x + h[2][1] * point.y + h[2][2];
        if w.abs() < 1e-10 {
            return None;
        }
        let x = (h[0][0] * point.x + h[0][1] * point.y + h[0][2]) / w;
        let y = (h[1][0] * point.x + h[1][1] * point.y + h[1][2]) / w;
        Some(Point2::new(x, y))
    }
}

fn quad_area(quad: &[Point2; 4]) -> f64 {
    contour_area(&quad.map(|p| Point::new(p.x, p.y)))
}

/// Solve the eight unknowns of the transform with `h33 = 1`.
fn solve_dlt(src: &[Point2; 4], dst: &[Point2; 4]) -> Option<Homography> {
    if src.iter().chain(dst.iter()).any(|p| !p.is_valid()) {
        return None;
    }
    if quad_area(src) < 1e-9 || quad_area(dst) < 1e-9 {
        return None;
    }

    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();

    for (i, (s, d)) in src.iter().zip(dst.iter()).enumerate() {
        let r = 2 * i;
        a[(r, 0)] = s.x;
        a[(r, 1)] = s.y;
        a[(r, 2)] = 1.0;
        a[(r, 6)] = -d.x * s.x;
        a[(r, 7)] = -d.x * s.y;
        b[r] = d.x;

        a[(r + 1, 3)] = s.x;
        a[(r + 1, 4)] = s.y;
        a[(r + 1, 5)] = 1.0;
        a[(r + 1, 6)] = -d.y * s.x;
        a[(r + 1, 7)] = -d.y * s.y;
        b[r + 1] = d.y;
    }

    let h = a.lu().solve(&b)?;
    if h.iter().any(|v| !v.is_finite()) {
        return None;
    }

    Some(Homography {
        matrix: [[h[0], h[1], h[2]], [h[3], h[4], h[5]], [h[6], h[7], 1.0]],
    })
}

#[cfg(feature = "opencv")]
mod opencv_impl {
    use super::Homography;
    use crate::geometry::Point2;
    use opencv::calib3d;
    use opencv::core::{Mat, Point2f, Vector};
    use opencv::prelude::*;

    fn to_vector(points: &[Point2; 4]) -> Vector<Point2f> {
        points
            .iter()
            .map(|p| Point2f::new(p.x as f32, p.y as f32))
            .collect()
    }

    /// Least-squares fit (no RANSAC, all four points are trusted).
    pub fn find_homography(src: &[Point2; 4], dst: &[Point2; 4]) -> Result<Homography, String> {
        let mut mask = Mat::default();
        let homography = calib3d::find_homography_ext(
            &to_vector(src),
            &to_vector(dst),
            0,
            3.0,
            &mut mask,
            2000,
            0.995,
        )
        .map_err(|e| format!("OpenCV error: {}", e))?;

        if homography.empty() || homography.rows() != 3 || homography.cols() != 3 {
            return Err("Failed to compute homography".to_string());
        }

        let data: &[f64] = homography
            .data_typed()
            .map_err(|e| format!("Matrix data access error: {}", e))?;

        Ok(Homography {
            matrix: [
                [data[0], data[1], data[2]],
                [data[3], data[4], data[5]],
                [data[6], data[7], data[8]],
            ],
        })
    }
}
