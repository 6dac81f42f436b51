//! Calibration records exchanged with the host and stored on disk.

use serde::{Deserialize, Serialize};

use crate::config::BallDetectionParameters;
use crate::geometry::Point2;

/// Screen-space corners of the calibrated surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceCalibration {
    /// Top-left, top-right, bottom-right, bottom-left.
    pub corners: [Point2; 4],
    /// False when no usable calibration exists; `corners` is then meaningless.
    pub valid: bool,
}

impl SurfaceCalibration {
    pub fn new(corners: [Point2; 4]) -> Self {
        Self {
            corners,
            valid: true,
        }
    }

    pub fn invalid() -> Self {
        Self::default()
    }
}

/// Everything needed to resume tracking without recalibrating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSettings {
    pub surface: SurfaceCalibration,
    pub ball: BallDetectionParameters,
}
