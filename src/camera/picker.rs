//! Click capture for interactive calibration.

use std::collections::VecDeque;

use image::RgbImage;

/// Supplies the pixel a user clicked on.
pub trait PointPicker: Send {
    /// Show `frame` with `prompt`; return the clicked pixel once there is one.
    ///
    /// Called once per frame until it returns `Some`.
    fn pick(&mut self, prompt: &str, frame: &RgbImage) -> Option<(u32, u32)>;
}

/// Replays a fixed queue of clicks, one per call.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPicker {
    clicks: VecDeque<(u32, u32)>,
    /// Frames shown before each click lands.
    frames_before_click: usize,
    waited: usize,
}

impl ScriptedPicker {
    pub fn new(clicks: impl IntoIterator<Item = (u32, u32)>) -> Self {
        Self {
            clicks: clicks.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Let `frames` frames go by before each click.
    pub fn with_delay(mut self, frames: usize) -> Self {
        self.frames_before_click = frames;
        self
    }

    pub fn remaining(&self) -> usize {
        self.clicks.len()
    }
}

impl PointPicker for ScriptedPicker {
    fn pick(&mut self, prompt: &str, _frame: &RgbImage) -> Option<(u32, u32)> {
        if self.waited < self.frames_before_click {
            self.waited += 1;
            return None;
        }
        let click = self.clicks.pop_front()?;
        self.waited = 0;
        log::debug!("{}: clicked ({}, {})", prompt, click.0, click.1);
        Some(click)
    }
}
