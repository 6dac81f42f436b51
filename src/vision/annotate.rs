//! Preview overlays drawn onto processed frames.

use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut};

use super::locator::BallSearch;
use crate::geometry::Point2;
use crate::tracking::TrajectoryBuffer;

const OUTLINE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const CIRCLE_COLOR: Rgb<u8> = Rgb([0, 255, 255]);
const CENTROID_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const TRAIL_COLOR: Rgb<u8> = Rgb([255, 0, 255]);
const COLLISION_COLOR: Rgb<u8> = Rgb([255, 64, 0]);
const SURFACE_COLOR: Rgb<u8> = Rgb([0, 128, 255]);

fn to_pixel(p: Point2) -> (i32, i32) {
    (p.x.round() as i32, p.y.round() as i32)
}

/// Draw a polyline, joining the last point back to the first when `closed`.
pub fn draw_polyline(frame: &mut RgbImage, points: &[Point2], closed: bool, color: Rgb<u8>) {
    for pair in points.windows(2) {
        draw_line_segment_mut(
            frame,
            (pair[0].x as f32, pair[0].y as f32),
            (pair[1].x as f32, pair[1].y as f32),
            color,
        );
    }
    if closed && points.len() > 2 {
        if let (Some(first), Some(last)) = (points.first(), points.last()) {
            draw_line_segment_mut(
                frame,
                (last.x as f32, last.y as f32),
                (first.x as f32, first.y as f32),
                color,
            );
        }
    }
}

/// Blob outlines, the enclosing circle and the tracked centroid.
pub fn draw_ball(frame: &mut RgbImage, search: &BallSearch) {
    for outline in &search.outlines {
        draw_polyline(frame, outline, true, OUTLINE_COLOR);
    }
    if let Some(ball) = &search.candidate {
        draw_hollow_circle_mut(frame, to_pixel(ball.center), ball.radius.round() as i32, CIRCLE_COLOR);
        draw_filled_circle_mut(frame, to_pixel(ball.centroid), 2, CENTROID_COLOR);
    }
}

/// Recent trajectory, newest point first.
pub fn draw_trajectory(frame: &mut RgbImage, trajectory: &TrajectoryBuffer) {
    let points: Vec<Point2> = trajectory.iter().collect();
    draw_polyline(frame, &points, false, TRAIL_COLOR);
}

pub fn draw_collision(frame: &mut RgbImage, point: Point2) {
    draw_filled_circle_mut(frame, to_pixel(point), 6, COLLISION_COLOR);
}

/// Outline of the calibrated surface with its first corner highlighted.
pub fn draw_surface(frame: &mut RgbImage, corners: &[Point2; 4]) {
    draw_polyline(frame, corners, true, SURFACE_COLOR);
    draw_filled_circle_mut(frame, to_pixel(corners[0]), 3, SURFACE_COLOR);
}

/// Render a binary mask as a black and white colour frame.
pub fn mask_to_rgb(mask: &GrayImage) -> RgbImage {
    RgbImage::from_fn(mask.width(), mask.height(), |x, y| {
        let v = mask.get_pixel(x, y).0[0];
        Rgb([v, v, v])
    })
}
