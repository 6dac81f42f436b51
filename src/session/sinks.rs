//! Receivers for collision events, error codes and preview frames.
//!
//! Collision and error sinks run synchronously on the processing thread while
//! the session lock is held, so they must not call back into the session.

use image::RgbImage;

use crate::error::ErrorCode;

/// Receives collisions in surface coordinates (0..1 on both axes inside the surface).
pub trait CollisionSink: Send + Sync {
    fn on_collision(&self, x: f32, y: f32);
}

impl<F> CollisionSink for F
where
    F: Fn(f32, f32) + Send + Sync,
{
    fn on_collision(&self, x: f32, y: f32) {
        self(x, y)
    }
}

/// Receives the code of every reported failure.
pub trait ErrorSink: Send + Sync {
    fn on_error(&self, code: ErrorCode);
}

impl<F> ErrorSink for F
where
    F: Fn(ErrorCode) + Send + Sync,
{
    fn on_error(&self, code: ErrorCode) {
        self(code)
    }
}

/// Displays annotated frames.
pub trait PreviewSink: Send {
    fn show(&mut self, window: &str, frame: &RgbImage);
}
