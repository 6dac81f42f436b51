//! Bounce detection from horizontal direction reversals.

use super::trajectory::TrajectoryBuffer;
use crate::config::{
    COLLISION_MARKER_FRAMES, COLLISION_PAST_STEPS, LOST_BALL_GRACE_FRAMES,
    MIN_TRAJECTORY_FOR_COLLISION, RADIUS_LATERAL_FACTOR,
};
use crate::geometry::Point2;
use crate::vision::BallCandidate;

/// A detected bounce in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    /// Trajectory point at which the reversal happened.
    pub base: Point2,
    /// `base` shifted towards the leading edge of the ball.
    pub point: Point2,
    pub radius: f64,
}

/// Last collision and how long it stays marked.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollisionMemory {
    pub last: Option<Point2>,
    pub frames_remaining: u32,
}

impl CollisionMemory {
    pub fn arm(&mut self, point: Point2) {
        self.last = Some(point);
        self.frames_remaining = COLLISION_MARKER_FRAMES;
    }

    /// Advance one frame; returns the point to mark this frame, if any.
    pub fn tick(&mut self) -> Option<Point2> {
        if self.frames_remaining == 0 {
            return None;
        }
        self.frames_remaining -= 1;
        self.last
    }
}

/// Shift `base` by `radius * 0.66` along the direction of the prior motion.
pub fn lateral_correction(base: Point2, old_direction: f64, radius: f64) -> Point2 {
    let offset = radius * RADIUS_LATERAL_FACTOR;
    if old_direction > 0.0 {
        Point2::new(base.x + offset, base.y)
    } else {
        Point2::new(base.x - offset, base.y)
    }
}

/// Tracks the ball trajectory and reports bounces.
#[derive(Debug, Clone, Default)]
pub struct BounceDetector {
    trajectory: TrajectoryBuffer,
    lost_ball_frames: i32,
    had_ball_previous_frame: bool,
    memory: CollisionMemory,
}

impl BounceDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.trajectory.reset();
        self.lost_ball_frames = 0;
        self.had_ball_previous_frame = false;
        self.memory = CollisionMemory::default();
    }

    pub fn trajectory(&self) -> &TrajectoryBuffer {
        &self.trajectory
    }

    pub fn memory_mut(&mut self) -> &mut CollisionMemory {
        &mut self.memory
    }

    /// Feed this frame's ball detection (`None` when no ball passed the radius threshold).
    pub fn update(&mut self, candidate: Option<&BallCandidate>) -> Option<Collision> {
        let collision = candidate.and_then(|ball| self.detect(ball));

        match candidate {
            Some(ball) => {
                self.trajectory.insert(ball.centroid);
                self.had_ball_previous_frame = true;
            }
            None => {
                if self.had_ball_previous_frame {
                    self.lost_ball_frames = LOST_BALL_GRACE_FRAMES;
                } else if self.lost_ball_frames > 0 {
                    self.lost_ball_frames -= 1;
                } else {
                    if !self.trajectory.is_empty() {
                        log::debug!("Ball lost, discarding {} trajectory points", self.trajectory.len());
                    }
                    self.lost_ball_frames = -1;
                    self.trajectory.reset();
                }
                self.had_ball_previous_frame = false;
            }
        }

        collision
    }

    fn detect(&mut self, ball: &BallCandidate) -> Option<Collision> {
        let centroid = ball.centroid;
        if self.trajectory.len() <= MIN_TRAJECTORY_FOR_COLLISION
            || !centroid.x.is_finite()
            || centroid.x <= 0.0
        {
            return None;
        }

        // The reversal is attributed to the point before the newest one.
        let base = self.trajectory.at(1)?;
        let older = self.trajectory.at(1 + COLLISION_PAST_STEPS)?;

        let old_direction = base.x - older.x;
        let new_direction = centroid.x - base.x;

        if old_direction * new_direction >= 0.0 {
            return None;
        }

        let point = lateral_correction(base, old_direction, ball.radius);
        self.memory.arm(point);

        log::debug!(
            "Bounce at ({:.1}, {:.1}), corrected x {:.1}",
            base.x,
            base.y,
            point.x
        );

        Some(Collision {
            base,
            point,
            radius: ball.radius,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball(x: f64, radius: f64) -> BallCandidate {
        BallCandidate {
            center: Point2::new(x, 50.0),
            centroid: Point2::new(x, 50.0),
            radius,
        }
    }

    fn run(detector: &mut BounceDetector, xs: &[f64], radius: f64) -> Vec<(usize, Collision)> {
        xs.iter()
            .enumerate()
            .filter_map(|(i, &x)| detector.update(Some(&ball(x, radius))).map(|c| (i, c)))
            .collect()
    }

    #[test]
    fn test_single_bounce_with_correction() {
        let mut detector = BounceDetector::new();
        let hits = run(&mut detector, &[50.0, 40.0, 30.0, 20.0, 30.0, 40.0, 50.0], 5.0);

        assert_eq!(hits.len(), 1);
        let (index, collision) = hits[0];
        assert_eq!(index, 5);
        assert_eq!(collision.base.x, 20.0);
        assert!((collision.point.x - (20.0 - 3.3)).abs() < 1e-9);
        assert_eq!(collision.point.y, 50.0);
    }

    #[test]
    fn test_bounce_fires_once_per_reversal() {
        let mut detector = BounceDetector::new();
        let xs = [90.0, 80.0, 70.0, 60.0, 50.0, 40.0, 50.0, 60.0, 70.0, 80.0];
        let hits = run(&mut detector, &xs, 4.0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, 7);
        assert_eq!(hits[0].1.base.x, 40.0);
        assert!((hits[0].1.point.x - (40.0 - 2.64)).abs() < 1e-9);
    }

    #[test]
    fn test_pause_at_turning_point_still_bounces() {
        let mut detector = BounceDetector::new();
        let hits = run(&mut detector, &[50.0, 40.0, 30.0, 20.0, 20.0, 30.0, 40.0, 50.0], 5.0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, 5);
        assert_eq!(hits[0].1.base.x, 20.0);
    }

    #[test]
    fn test_rightward_reversal_corrects_to_the_right() {
        let mut detector = BounceDetector::new();
        let hits = run(&mut detector, &[10.0, 20.0, 30.0, 40.0, 30.0, 20.0, 10.0], 5.0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].1.base.x, 40.0);
        assert!((hits[0].1.point.x - 43.3).abs() < 1e-9);
    }

    #[test]
    fn test_monotonic_trajectories_never_bounce() {
        for len in 5..30 {
            let rising: Vec<f64> = (0..len).map(|i| 10.0 + 7.0 * i as f64).collect();
            let falling: Vec<f64> = rising.iter().rev().copied().collect();

            assert!(run(&mut BounceDetector::new(), &rising, 6.0).is_empty());
            assert!(run(&mut BounceDetector::new(), &falling, 6.0).is_empty());
        }
    }

    #[test]
    fn test_zero_step_is_not_a_reversal() {
        let mut detector = BounceDetector::new();
        let hits = run(&mut detector, &[50.0, 40.0, 30.0, 30.0, 30.0, 30.0], 5.0);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_lateral_correction_direction() {
        for radius in [0.0, 1.0, 5.0, 12.5] {
            let base = Point2::new(100.0, 20.0);
            let right = lateral_correction(base, 3.0, radius);
            let left = lateral_correction(base, -3.0, radius);
            assert!((right.x - (100.0 + radius * 0.66)).abs() < 1e-9);
            assert!((left.x - (100.0 - radius * 0.66)).abs() < 1e-9);
            assert_eq!(right.y, 20.0);
        }
    }

    #[test]
    fn test_short_gap_keeps_trajectory() {
        let mut detector = BounceDetector::new();
        for i in 0..10 {
            detector.update(Some(&ball(200.0 - 10.0 * i as f64, 5.0)));
        }
        for _ in 0..5 {
            assert!(detector.update(None).is_none());
        }
        assert_eq!(detector.trajectory().len(), 10);

        // 100 continues the descent, then the ball turns around.
        assert!(detector.update(Some(&ball(100.0, 5.0))).is_none());
        assert!(detector.update(Some(&ball(110.0, 5.0))).is_none());
        let collision = detector.update(Some(&ball(120.0, 5.0)));
        let collision = collision.expect("reversal across the gap");
        assert_eq!(collision.base.x, 100.0);
        assert!(detector.update(Some(&ball(130.0, 5.0))).is_none());
    }

    #[test]
    fn test_long_gap_discards_trajectory() {
        let mut detector = BounceDetector::new();
        for i in 0..10 {
            detector.update(Some(&ball(200.0 - 10.0 * i as f64, 5.0)));
        }
        // First miss arms the grace counter, seven more drain it, the next one resets.
        for _ in 0..(1 + LOST_BALL_GRACE_FRAMES) {
            detector.update(None);
        }
        assert_eq!(detector.trajectory().len(), 10);
        detector.update(None);
        assert!(detector.trajectory().is_empty());
    }

    #[test]
    fn test_memory_counts_down() {
        let mut detector = BounceDetector::new();
        run(&mut detector, &[50.0, 40.0, 30.0, 20.0, 30.0, 40.0], 5.0);
        let memory = detector.memory_mut();
        let mut marked = 0;
        while memory.tick().is_some() {
            marked += 1;
        }
        assert_eq!(marked, COLLISION_MARKER_FRAMES);
    }
}
