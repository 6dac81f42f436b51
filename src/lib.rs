//! Bounce Tracker
//!
//! Tracks a coloured ball in a video stream and reports where it bounces off
//! a calibrated planar surface:
//! - HSV thresholding and contour search for the ball
//! - Direction-reversal bounce detection on the ball trajectory
//! - Surface calibration by colour sampling and a 4-point homography
//! - Ball colour calibration from clicked samples

pub mod calibration;
pub mod camera;
pub mod config;
pub mod error;
pub mod export;
pub mod geometry;
pub mod session;
pub mod tracking;
pub mod vision;

pub use calibration::{CalibrationSettings, SurfaceCalibration};
pub use error::{ErrorCode, Result, TrackerError};
pub use session::Session;
