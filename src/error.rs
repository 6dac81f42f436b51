//! Error types reported by the tracking session.

use thiserror::Error;

/// Numeric error codes delivered to the registered error sink.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The frame source could not be opened.
    UnableToOpenVideo = 1,
    /// A frame could not be read from an open source.
    CouldNotReadFrame = 2,
    /// A surface sample was requested outside a calibration bracket.
    NotInCalibrationMode = 3,
    /// Surface calibration ended without usable samples.
    CouldNotCalibrate = 4,
}

impl ErrorCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::UnableToOpenVideo => write!(f, "UNABLE_TO_OPEN_VIDEO"),
            ErrorCode::CouldNotReadFrame => write!(f, "COULD_NOT_READ_FRAME"),
            ErrorCode::NotInCalibrationMode => write!(f, "NOT_IN_CALIBRATION_MODE"),
            ErrorCode::CouldNotCalibrate => write!(f, "COULD_NOT_CALIBRATE"),
        }
    }
}

/// Errors returned by session operations.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("unable to open video source: {0}")]
    UnableToOpenVideo(String),

    #[error("could not read frame from video source")]
    CouldNotReadFrame,

    #[error("surface calibration has not been started")]
    NotInCalibrationMode,

    #[error("could not calibrate: {0}")]
    CouldNotCalibrate(String),

    #[error("processing loop is already running")]
    AlreadyRunning,

    #[error("frame source is in use by the processing loop")]
    Busy,

    #[error("no point picker registered for click calibration")]
    NoPointPicker,

    #[error("settings file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings serialization error: {0}")]
    Serialization(String),
}

impl TrackerError {
    /// Error code forwarded to the error sink, `None` for usage errors.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            TrackerError::UnableToOpenVideo(_) => Some(ErrorCode::UnableToOpenVideo),
            TrackerError::CouldNotReadFrame => Some(ErrorCode::CouldNotReadFrame),
            TrackerError::NotInCalibrationMode => Some(ErrorCode::NotInCalibrationMode),
            TrackerError::CouldNotCalibrate(_) => Some(ErrorCode::CouldNotCalibrate),
            TrackerError::AlreadyRunning
            | TrackerError::Busy
            | TrackerError::NoPointPicker
            | TrackerError::Io(_)
            | TrackerError::Serialization(_) => None,
        }
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(e: serde_json::Error) -> Self {
        TrackerError::Serialization(e.to_string())
    }
}

impl From<bincode::Error> for TrackerError {
    fn from(e: bincode::Error) -> Self {
        TrackerError::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
