//! In-memory frame source.

use image::RgbImage;

use super::{CameraError, FrameSource};

/// Replays a fixed list of frames, optionally forever.
#[derive(Debug, Clone, Default)]
pub struct FrameSequence {
    frames: Vec<RgbImage>,
    position: usize,
    looping: bool,
    open: bool,
}

impl FrameSequence {
    /// Frames played once, then reads fail.
    pub fn new(frames: Vec<RgbImage>) -> Self {
        Self {
            frames,
            ..Default::default()
        }
    }

    /// Frames repeated for as long as the source stays open.
    pub fn looping(frames: Vec<RgbImage>) -> Self {
        Self {
            frames,
            looping: true,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames handed out since the last `open`.
    pub fn position(&self) -> usize {
        self.position
    }
}

impl FrameSource for FrameSequence {
    fn open(&mut self) -> Result<(), CameraError> {
        if self.frames.is_empty() {
            return Err(CameraError::NoFrames);
        }
        self.position = 0;
        self.open = true;
        Ok(())
    }

    fn read(&mut self) -> Option<RgbImage> {
        if !self.open {
            return None;
        }
        let index = if self.looping {
            self.position % self.frames.len()
        } else {
            self.position
        };
        let frame = self.frames.get(index)?.clone();
        self.position += 1;
        Some(frame)
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }
}
