//! Surface calibration state machine.

use std::fmt;

use super::homography::Homography;
use super::settings::SurfaceCalibration;
use crate::error::{Result, TrackerError};
use crate::geometry::{average_quads, sort_corners, Point2, Quad};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceCalibrationState {
    #[default]
    Idle,
    Calibrating,
}

impl fmt::Display for SurfaceCalibrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceCalibrationState::Idle => write!(f, "Idle"),
            SurfaceCalibrationState::Calibrating => write!(f, "Calibrating"),
        }
    }
}

/// Collects sampled quadrilaterals and turns them into a homography.
#[derive(Debug, Clone, Default)]
pub struct SurfaceCalibrator {
    state: SurfaceCalibrationState,
    samples: Vec<Quad>,
    calibration: SurfaceCalibration,
    homography: Option<Homography>,
}

impl SurfaceCalibrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SurfaceCalibrationState {
        self.state
    }

    pub fn is_calibrating(&self) -> bool {
        self.state == SurfaceCalibrationState::Calibrating
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Begin a new calibration, discarding samples and the current homography.
    pub fn start(&mut self) {
        self.samples.clear();
        self.clear();
        self.state = SurfaceCalibrationState::Calibrating;
    }

    pub fn ensure_calibrating(&self) -> Result<()> {
        if self.is_calibrating() {
            Ok(())
        } else {
            Err(TrackerError::NotInCalibrationMode)
        }
    }

    /// Record one sorted quadrilateral.
    pub fn add_sample(&mut self, quad: Quad) -> Result<()> {
        self.ensure_calibrating()?;
        self.samples.push(quad);
        log::debug!("Surface sample {} recorded: {:?}", self.samples.len(), quad);
        Ok(())
    }

    /// Average the samples and compute the homography.
    ///
    /// Without samples the calibration is left absent and `CouldNotCalibrate`
    /// is returned.
    pub fn end(&mut self) -> Result<SurfaceCalibration> {
        self.state = SurfaceCalibrationState::Idle;
        let samples = std::mem::take(&mut self.samples);

        let Some(average) = average_quads(&samples) else {
            self.clear();
            return Err(TrackerError::CouldNotCalibrate("no surface samples".into()));
        };

        let corners = sort_corners(average);
        let Some(homography) = Homography::from_corners(&corners) else {
            self.clear();
            return Err(TrackerError::CouldNotCalibrate(
                "surface corners are degenerate".into(),
            ));
        };

        self.calibration = SurfaceCalibration::new(corners);
        self.homography = Some(homography);
        log::info!(
            "Surface calibrated from {} samples: {:?}",
            samples.len(),
            corners
        );

        Ok(self.calibration)
    }

    /// Install previously saved corners, recomputing the homography.
    ///
    /// An invalid record clears the calibration. Degenerate corners also clear
    /// it and are reported as `CouldNotCalibrate`.
    pub fn restore(&mut self, calibration: SurfaceCalibration) -> Result<()> {
        if !calibration.valid {
            self.clear();
            return Ok(());
        }
        match Homography::from_corners(&calibration.corners) {
            Some(homography) => {
                self.calibration = calibration;
                self.homography = Some(homography);
                Ok(())
            }
            None => {
                self.clear();
                Err(TrackerError::CouldNotCalibrate(
                    "surface corners are degenerate".into(),
                ))
            }
        }
    }

    pub fn snapshot(&self) -> SurfaceCalibration {
        self.calibration
    }

    pub fn homography(&self) -> Option<&Homography> {
        self.homography.as_ref()
    }

    /// Map a screen point into surface coordinates, if calibrated.
    pub fn map(&self, point: Point2) -> Option<Point2> {
        self.homography.as_ref()?.apply(point)
    }

    fn clear(&mut self) {
        self.calibration = SurfaceCalibration::invalid();
        self.homography = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Quad {
        [
            Point2::new(10.0, 10.0),
            Point2::new(100.0, 10.0),
            Point2::new(100.0, 100.0),
            Point2::new(10.0, 100.0),
        ]
    }

    #[test]
    fn test_sample_requires_start() {
        let mut calibrator = SurfaceCalibrator::new();
        assert!(matches!(
            calibrator.add_sample(quad()),
            Err(TrackerError::NotInCalibrationMode)
        ));
        assert_eq!(calibrator.sample_count(), 0);
    }

    #[test]
    fn test_end_without_samples_fails() {
        let mut calibrator = SurfaceCalibrator::new();
        calibrator.start();
        assert!(matches!(calibrator.end(), Err(TrackerError::CouldNotCalibrate(_))));
        assert!(!calibrator.snapshot().valid);
        assert!(calibrator.map(Point2::new(1.0, 1.0)).is_none());
        assert_eq!(calibrator.state(), SurfaceCalibrationState::Idle);
    }

    #[test]
    fn test_end_averages_samples() {
        let mut calibrator = SurfaceCalibrator::new();
        calibrator.start();
        let mut shifted = quad();
        for p in shifted.iter_mut() {
            p.x += 2.0;
        }
        calibrator.add_sample(quad()).unwrap();
        calibrator.add_sample(shifted).unwrap();

        let calibration = calibrator.end().unwrap();
        assert!(calibration.valid);
        assert_eq!(calibration.corners[0], Point2::new(11.0, 10.0));

        let center = calibrator.map(Point2::new(56.0, 55.0)).unwrap();
        assert!((center.x - 0.5).abs() < 1e-9);
        assert!((center.y - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_restart_clears_previous_calibration() {
        let mut calibrator = SurfaceCalibrator::new();
        calibrator.start();
        calibrator.add_sample(quad()).unwrap();
        calibrator.end().unwrap();

        calibrator.start();
        assert!(calibrator.homography().is_none());
        assert!(!calibrator.snapshot().valid);
    }

    #[test]
    fn test_restore() {
        let mut calibrator = SurfaceCalibrator::new();
        calibrator.restore(SurfaceCalibration::new(quad())).unwrap();
        let origin = calibrator.map(Point2::new(10.0, 100.0)).unwrap();
        assert!(origin.x.abs() < 1e-9 && origin.y.abs() < 1e-9);

        calibrator.restore(SurfaceCalibration::invalid()).unwrap();
        assert!(calibrator.homography().is_none());

        let p = Point2::new(3.0, 3.0);
        assert!(calibrator.restore(SurfaceCalibration::new([p, p, p, p])).is_err());
        assert!(!calibrator.snapshot().valid);
    }
}
