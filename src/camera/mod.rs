//! Frame sources and interactive point picking.
//!
//! The session owns exactly one [`FrameSource`]. It is opened at the start of
//! a phase (tracking or calibration) and closed at its end.

mod directory;
mod picker;
mod sequence;
#[cfg(feature = "opencv")]
mod capture;

use image::RgbImage;
use thiserror::Error;

pub use directory::ImageDirectorySource;
pub use picker::{PointPicker, ScriptedPicker};
pub use sequence::FrameSequence;
#[cfg(feature = "opencv")]
pub use capture::VideoCaptureSource;

/// Frame source error type.
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("frame source has no frames")]
    NoFrames,

    #[error("camera device {0} could not be opened")]
    DeviceUnavailable(i32),

    #[error("frame source I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("capture backend error: {0}")]
    Backend(String),
}

/// A sequential supplier of colour frames.
pub trait FrameSource: Send {
    /// Acquire the source. Opening an already open source restarts it.
    fn open(&mut self) -> Result<(), CameraError>;

    /// Next frame, `None` when no frame could be read.
    fn read(&mut self) -> Option<RgbImage>;

    fn close(&mut self);

    fn is_open(&self) -> bool;
}
