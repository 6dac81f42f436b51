//! Detection and behaviour parameters held by a session.

use serde::{Deserialize, Serialize};

/// Trajectory history length.
pub const TRAJECTORY_CAPACITY: usize = 100;
/// The trajectory must hold strictly more entries than this before collisions are evaluated.
pub const MIN_TRAJECTORY_FOR_COLLISION: usize = 3;
/// Offset of the older sample used for the previous direction.
pub const COLLISION_PAST_STEPS: usize = 1;
/// Frames the collision marker stays visible.
pub const COLLISION_MARKER_FRAMES: u32 = 20;
/// Frames the ball may go missing before the trajectory is discarded.
pub const LOST_BALL_GRACE_FRAMES: i32 = 7;
/// Frames discarded before a calibration sample so auto-exposure settles.
pub const CALIBRATION_WARMUP_FRAMES: usize = 20;
/// Fraction of the radius added towards the leading edge of the ball.
pub const RADIUS_LATERAL_FACTOR: f64 = 0.66;
/// Polygon approximation tolerance for surface quadrilaterals, in pixels.
pub const QUAD_APPROX_EPSILON: f64 = 3.0;
/// Saturation bounds forced after ball colour calibration.
pub const BALL_SATURATION_RANGE: (i32, i32) = (100, 255);
/// Value bounds forced after ball colour calibration.
pub const BALL_VALUE_RANGE: (i32, i32) = (30, 255);

/// Inclusive HSV range, OpenCV scale (H 0-179, S and V 0-255).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRange {
    pub low: [i32; 3],
    pub high: [i32; 3],
}

impl ColorRange {
    pub fn new(low: [i32; 3], high: [i32; 3]) -> Self {
        Self { low, high }
    }

    /// Range of `base ± tolerance` on every channel.
    pub fn around(base: [i32; 3], tolerance: [i32; 3]) -> Self {
        Self {
            low: [
                base[0] - tolerance[0],
                base[1] - tolerance[1],
                base[2] - tolerance[2],
            ],
            high: [
                base[0] + tolerance[0],
                base[1] + tolerance[1],
                base[2] + tolerance[2],
            ],
        }
    }

    /// Swap any channel whose low bound exceeds its high bound.
    pub fn reorder(&mut self) {
        for channel in 0..3 {
            if self.low[channel] > self.high[channel] {
                std::mem::swap(&mut self.low[channel], &mut self.high[channel]);
            }
        }
    }

    pub fn reordered(mut self) -> Self {
        self.reorder();
        self
    }

    /// Whether an HSV pixel lies inside the range.
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| {
            let v = hsv[c] as i32;
            v >= self.low[c] && v <= self.high[c]
        })
    }
}

/// Colour range and size threshold used to find the ball.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallDetectionParameters {
    pub range: ColorRange,
    /// Minimum enclosing-circle radius (pixels) accepted as the ball.
    pub radius_threshold: i32,
}

impl Default for BallDetectionParameters {
    // Tuned for a tennis ball.
    fn default() -> Self {
        Self {
            range: ColorRange::new([23, 30, 50], [43, 255, 255]),
            radius_threshold: 4,
        }
    }
}

impl BallDetectionParameters {
    pub fn reorder(&mut self) {
        self.range.reorder();
    }
}

/// Display and behaviour flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationParameters {
    /// Draw ball and collision markers on preview frames.
    pub show_collisions: bool,
    /// The source is a recording: a failed read ends the processing loop.
    pub use_file_source: bool,
    /// Live tuning controls requested by the host (rendered by the host, if at all).
    pub show_tuning_ui: bool,
    /// Send annotated frames to the preview sink.
    pub show_preview: bool,
    /// Internal processing width; frames are resized keeping the aspect ratio.
    pub target_width: u32,
}

impl Default for ConfigurationParameters {
    fn default() -> Self {
        Self {
            show_collisions: true,
            use_file_source: false,
            show_tuning_ui: true,
            show_preview: true,
            target_width: 480,
        }
    }
}

/// Contour heuristics for the ball search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContourParameters {
    /// Approximated polygons need more vertices than this to count as round.
    pub circle_contour_limit: usize,
    /// Approximation tolerance in thousandths of the contour perimeter.
    pub epsilon_multiplier: u32,
}

impl Default for ContourParameters {
    fn default() -> Self {
        Self {
            circle_contour_limit: 3,
            epsilon_multiplier: 6,
        }
    }
}

impl ContourParameters {
    pub fn epsilon_for(&self, perimeter: f64) -> f64 {
        self.epsilon_multiplier as f64 / 1000.0 * perimeter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reorder_swaps_only_inverted_channels() {
        let mut range = ColorRange::new([40, 10, 200], [20, 50, 100]);
        range.reorder();
        assert_eq!(range.low, [20, 10, 100]);
        assert_eq!(range.high, [40, 50, 200]);
    }

    #[test]
    fn test_contains_is_inclusive() {
        let range = ColorRange::new([10, 20, 30], [10, 40, 50]);
        assert!(range.contains([10, 20, 50]));
        assert!(!range.contains([11, 20, 50]));
        assert!(!range.contains([10, 19, 50]));
    }

    #[test]
    fn test_around_and_epsilon() {
        let range = ColorRange::around([30, 100, 100], [5, 60, 60]);
        assert_eq!(range.low, [25, 40, 40]);
        assert_eq!(range.high, [35, 160, 160]);

        let contour = ContourParameters::default();
        assert!((contour.epsilon_for(100.0) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_settings_round_trip_json() {
        let params = BallDetectionParameters::default();
        let json = serde_json::to_string(&params).unwrap();
        let back: BallDetectionParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(params, back);
    }
}
