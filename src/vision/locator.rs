//! Ball and surface search on thresholded frames.

use image::{GrayImage, RgbImage};
use imageproc::contours::{find_contours, BorderType};
use imageproc::geometry::{arc_length, contour_area};
use imageproc::point::Point;

use super::color::{in_range_mask, open_mask};
use super::contour::{approximate_closed, centroid, min_enclosing_circle, to_point2};
use crate::config::{BallDetectionParameters, ColorRange, ContourParameters, QUAD_APPROX_EPSILON};
use crate::geometry::{sort_corners, Point2, Quad};

/// The ball as seen in one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallCandidate {
    /// Center of the minimum enclosing circle.
    pub center: Point2,
    /// Area centroid of the outline; this is the tracked position.
    pub centroid: Point2,
    pub radius: f64,
}

/// Outcome of a ball search.
#[derive(Debug, Clone, Default)]
pub struct BallSearch {
    /// Set only when the enclosing radius exceeds the configured threshold.
    pub candidate: Option<BallCandidate>,
    /// Approximated outlines of every external contour, for preview.
    pub outlines: Vec<Vec<Point2>>,
}

/// Outcome of a surface search.
#[derive(Debug, Clone)]
pub struct QuadSearch {
    /// Corners sorted top-left, top-right, bottom-right, bottom-left.
    pub quad: Option<Quad>,
    pub mask: GrayImage,
}

/// Finds the ball and calibration quadrilaterals in colour-thresholded frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlobLocator {
    pub contour: ContourParameters,
}

impl BlobLocator {
    pub fn new(contour: ContourParameters) -> Self {
        Self { contour }
    }

    /// Locate the largest round blob inside the ball colour range.
    pub fn locate_ball(&self, frame: &RgbImage, params: &BallDetectionParameters) -> BallSearch {
        let mask = open_mask(&in_range_mask(frame, &params.range));

        let mut outlines = Vec::new();
        let mut largest: Option<(f64, Vec<Point<i32>>)> = None;

        for outline in external_outlines(&mask) {
            let epsilon = self.contour.epsilon_for(arc_length(&outline, true));
            let approx = approximate_closed(&outline, epsilon);
            let area = contour_area(&outline);
            let best_area = largest.as_ref().map_or(0.0, |(a, _)| *a);

            if area > best_area && approx.len() > self.contour.circle_contour_limit {
                largest = Some((area, outline));
            }
            outlines.push(approx.iter().map(to_point2).collect());
        }

        let candidate = largest.and_then(|(_, outline)| {
            let (center, radius) = min_enclosing_circle(&outline)?;
            let centroid = centroid(&outline).unwrap_or(center);
            if radius > params.radius_threshold as f64 {
                Some(BallCandidate {
                    center,
                    centroid,
                    radius,
                })
            } else {
                log::trace!("Blob of radius {:.1} below threshold", radius);
                None
            }
        });

        BallSearch {
            candidate,
            outlines,
        }
    }

    /// Locate the largest four-sided blob inside `range`.
    pub fn locate_quad(&self, frame: &RgbImage, range: &ColorRange) -> QuadSearch {
        let mask = in_range_mask(frame, range);

        let mut largest: Option<(f64, Quad)> = None;
        for outline in external_outlines(&mask) {
            let approx = approximate_closed(&outline, QUAD_APPROX_EPSILON);
            let Ok(corners) = <[Point<i32>; 4]>::try_from(approx.as_slice()) else {
                continue;
            };
            let area = contour_area(&corners);
            if largest.as_ref().map_or(true, |(a, _)| area > *a) {
                largest = Some((area, corners.map(|p| to_point2(&p))));
            }
        }

        QuadSearch {
            quad: largest.map(|(_, quad)| sort_corners(quad)),
            mask,
        }
    }
}

/// Outer borders of the top-level blobs in a binary mask.
fn external_outlines(mask: &GrayImage) -> Vec<Vec<Point<i32>>> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| c.points)
        .collect()
}
