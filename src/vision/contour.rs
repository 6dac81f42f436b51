//! Contour measurements that `imageproc::geometry` does not provide: the area
//! centroid and the minimum enclosing circle.

use imageproc::geometry::{approximate_polygon_dp, convex_hull, oriented_contour_area};
use imageproc::point::Point;

use crate::geometry::Point2;

pub fn to_point2(p: &Point<i32>) -> Point2 {
    Point2::new(p.x as f64, p.y as f64)
}

/// Douglas-Peucker simplification of a closed outline. A non-positive
/// `epsilon` keeps every point.
pub fn approximate_closed(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    if points.len() < 3 || epsilon <= 0.0 {
        return points.to_vec();
    }
    approximate_polygon_dp(points, epsilon, true)
}

/// Area centroid from the outline's first moments, `None` for degenerate outlines.
pub fn centroid(points: &[Point<i32>]) -> Option<Point2> {
    let m00 = oriented_contour_area(points);
    if m00.abs() < 1e-9 {
        return None;
    }

    let mut m10 = 0.0;
    let mut m01 = 0.0;
    let mut prev = to_point2(points.last()?);
    for p in points.iter().map(to_point2) {
        let cross = prev.x * p.y - p.x * prev.y;
        m10 += (prev.x + p.x) * cross;
        m01 += (prev.y + p.y) * cross;
        prev = p;
    }

    Some(Point2::new(m10 / (6.0 * m00), m01 / (6.0 * m00)))
}

/// Smallest circle containing every point, as (center, radius).
pub fn min_enclosing_circle(points: &[Point<i32>]) -> Option<(Point2, f64)> {
    let hull: Vec<Point2> = convex_hull(points.to_vec()).iter().map(to_point2).collect();
    let first = *hull.first()?;

    let mut center = first;
    let mut radius = 0.0;
    let inside = |c: Point2, r: f64, p: &Point2| c.distance(p) <= r + 1e-7;

    for i in 1..hull.len() {
        if inside(center, radius, &hull[i]) {
            continue;
        }
        center = hull[i];
        radius = 0.0;
        for j in 0..i {
            if inside(center, radius, &hull[j]) {
                continue;
            }
            center = hull[i].midpoint(&hull[j]);
            radius = hull[i].distance(&hull[j]) / 2.0;
            for k in 0..j {
                if inside(center, radius, &hull[k]) {
                    continue;
                }
                match circumcircle(hull[i], hull[j], hull[k]) {
                    Some((c, r)) => {
                        center = c;
                        radius = r;
                    }
                    None => {
                        // Collinear: the widest pair spans the other point.
                        let pairs = [(hull[i], hull[j]), (hull[i], hull[k]), (hull[j], hull[k])];
                        if let Some((a, b)) = pairs
                            .into_iter()
                            .max_by(|x, y| x.0.distance(&x.1).total_cmp(&y.0.distance(&y.1)))
                        {
                            center = a.midpoint(&b);
                            radius = a.distance(&b) / 2.0;
                        }
                    }
                }
            }
        }
    }

    Some((center, radius))
}

fn circumcircle(a: Point2, b: Point2, c: Point2) -> Option<(Point2, f64)> {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    if d.abs() < 1e-12 {
        return None;
    }
    let a2 = a.x * a.x + a.y * a.y;
    let b2 = b.x * b.x + b.y * b.y;
    let c2 = c.x * c.x + c.y * c.y;
    let center = Point2::new(
        (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d,
        (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d,
    );
    Some((center, center.distance(&a)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use imageproc::contours::find_contours;
    use imageproc::drawing::draw_filled_circle_mut;
    use imageproc::geometry::{arc_length, contour_area};

    fn square_outline(min: i32, max: i32) -> Vec<Point<i32>> {
        // Pixel-by-pixel outline, like a traced border.
        let mut points = Vec::new();
        points.extend((min..max).map(|v| Point::new(v, min)));
        points.extend((min..max).map(|v| Point::new(max, v)));
        points.extend((min + 1..=max).rev().map(|v| Point::new(v, max)));
        points.extend((min + 1..=max).rev().map(|v| Point::new(min, v)));
        points
    }

    fn traced_disc(cx: i32, cy: i32, r: i32) -> Vec<Point<i32>> {
        let mut mask = GrayImage::new(200, 200);
        draw_filled_circle_mut(&mut mask, (cx, cy), r, Luma([255]));
        find_contours::<i32>(&mask).remove(0).points
    }

    #[test]
    fn test_square_centroid() {
        let outline = square_outline(10, 100);
        assert!((contour_area(&outline) - 8100.0).abs() < 1e-6);

        let c = centroid(&outline).unwrap();
        assert!((c.x - 55.0).abs() < 1e-9);
        assert!((c.y - 55.0).abs() < 1e-9);
    }

    #[test]
    fn test_square_approximates_to_corners() {
        let approx = approximate_closed(&square_outline(10, 100), 3.0);
        assert_eq!(approx.len(), 4);
        for (x, y) in [(10, 10), (100, 10), (100, 100), (10, 100)] {
            assert!(approx.contains(&Point::new(x, y)));
        }
    }

    #[test]
    fn test_disc_keeps_many_vertices() {
        let outline = traced_disc(100, 100, 20);
        let eps = 6.0 / 1000.0 * arc_length(&outline, true);
        assert!(approximate_closed(&outline, eps).len() > 3);
        assert_eq!(approximate_closed(&outline, 0.0).len(), outline.len());
    }

    #[test]
    fn test_disc_centroid_and_enclosing_circle() {
        let outline = traced_disc(80, 60, 15);
        let c = centroid(&outline).unwrap();
        assert!((c.x - 80.0).abs() < 0.5);
        assert!((c.y - 60.0).abs() < 0.5);

        let (center, radius) = min_enclosing_circle(&outline).unwrap();
        assert!((center.x - 80.0).abs() < 1.0);
        assert!((center.y - 60.0).abs() < 1.0);
        assert!(radius > 14.0 && radius < 16.5);
    }

    #[test]
    fn test_enclosing_circle_of_square_and_single_point() {
        let (center, radius) = min_enclosing_circle(&square_outline(0, 10)).unwrap();
        assert!((center.x - 5.0).abs() < 1e-9);
        assert!((center.y - 5.0).abs() < 1e-9);
        assert!((radius - 50f64.sqrt()).abs() < 1e-9);

        assert!(min_enclosing_circle(&[]).is_none());
        let (center, radius) = min_enclosing_circle(&[Point::new(3, 4)]).unwrap();
        assert_eq!(center, Point2::new(3.0, 4.0));
        assert_eq!(radius, 0.0);
    }

    #[test]
    fn test_degenerate_outline_has_no_centroid() {
        let line = [Point::new(0, 0), Point::new(5, 0), Point::new(10, 0)];
        assert!(centroid(&line).is_none());
        assert_eq!(contour_area(&line), 0.0);
    }
}
