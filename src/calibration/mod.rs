//! Surface and ball colour calibration.

mod ball;
mod homography;
mod settings;
mod surface;

pub use ball::ball_range_from_samples;
pub use homography::{Homography, UNIT_SQUARE};
pub use settings::{CalibrationSettings, SurfaceCalibration};
pub use surface::{SurfaceCalibrationState, SurfaceCalibrator};
