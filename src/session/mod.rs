//! Tracking session: configuration store, calibration entry points and the
//! frame-processing loop.
//!
//! One lock guards all mutable state. The processing loop holds it for the
//! whole of each frame, so configuration and calibration calls never observe a
//! half-processed frame. The frame source belongs to one phase at a time:
//! calibration calls are rejected with [`TrackerError::Busy`] while the loop runs.

mod sinks;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use image::RgbImage;
use parking_lot::{Condvar, Mutex, MutexGuard};

pub use sinks::{CollisionSink, ErrorSink, PreviewSink};

use crate::calibration::{
    ball_range_from_samples, CalibrationSettings, SurfaceCalibration, SurfaceCalibrator,
};
use crate::camera::{FrameSource, PointPicker};
use crate::config::{
    BallDetectionParameters, ColorRange, ConfigurationParameters, ContourParameters,
    CALIBRATION_WARMUP_FRAMES,
};
use crate::error::{Result, TrackerError};
use crate::geometry::resize_to_width;
use crate::tracking::{BounceDetector, Collision};
use crate::vision::annotate;
use crate::vision::color::sample_hsv;
use crate::vision::BlobLocator;

const TRACKING_WINDOW: &str = "Tracking";
const CALIBRATION_WINDOW: &str = "Calibration";
const MASK_WINDOW: &str = "Calibration mask";

const SURFACE_CLICK_PROMPT: &str = "Click on the projection";
const DARK_BALL_PROMPT: &str = "Click on dark version of the ball";
const LIT_BALL_PROMPT: &str = "Click on lit version of the ball";

/// Everything the lock protects.
struct SessionState {
    source: Box<dyn FrameSource>,
    picker: Option<Box<dyn PointPicker>>,
    ball: BallDetectionParameters,
    config: ConfigurationParameters,
    locator: BlobLocator,
    surface: SurfaceCalibrator,
    detector: BounceDetector,
    collision_sink: Option<Arc<dyn CollisionSink>>,
    error_sink: Option<Arc<dyn ErrorSink>>,
    preview: Option<Box<dyn PreviewSink>>,
}

/// A ball tracking session over one frame source.
pub struct Session {
    state: Mutex<SessionState>,
    stop_requested: AtomicBool,
    running: Mutex<bool>,
    running_changed: Condvar,
}

impl Session {
    pub fn new<S: FrameSource + 'static>(source: S) -> Self {
        Self {
            state: Mutex::new(SessionState {
                source: Box::new(source),
                picker: None,
                ball: BallDetectionParameters::default(),
                config: ConfigurationParameters::default(),
                locator: BlobLocator::default(),
                surface: SurfaceCalibrator::new(),
                detector: BounceDetector::new(),
                collision_sink: None,
                error_sink: None,
                preview: None,
            }),
            stop_requested: AtomicBool::new(false),
            running: Mutex::new(false),
            running_changed: Condvar::new(),
        }
    }

    /// Capability check for hosts loading the library dynamically.
    pub fn is_callable() -> bool {
        true
    }

    pub fn with_point_picker<P: PointPicker + 'static>(mut self, picker: P) -> Self {
        self.state.get_mut().picker = Some(Box::new(picker));
        self
    }

    pub fn set_point_picker<P: PointPicker + 'static>(&self, picker: P) {
        self.state.lock().picker = Some(Box::new(picker));
    }

    /// Reset the trajectory and check that the frame source opens and
    /// delivers. The source is released again afterwards.
    pub fn init(&self) -> Result<()> {
        let _idle = self.lock_idle()?;
        let mut state = self.state.lock();
        state.detector.reset();
        let result = state.check_source();
        state.source.close();
        state.reported(result)?;
        log::info!("Session initialised");
        Ok(())
    }

    /// Run the processing loop on the calling thread until [`Session::stop`]
    /// is called or, in file-source mode, the recording ends.
    pub fn launch(&self) -> Result<()> {
        {
            let mut running = self.running.lock();
            if *running {
                return Err(TrackerError::AlreadyRunning);
            }
            *running = true;
            self.stop_requested.store(false, Ordering::SeqCst);
        }

        let result = self.run();

        let mut running = self.running.lock();
        *running = false;
        self.running_changed.notify_all();
        result
    }

    fn run(&self) -> Result<()> {
        {
            let mut state = self.state.lock();
            let opened = state.open_source();
            state.reported(opened)?;
            state.detector.reset();
        }
        log::info!("Processing loop started");

        let mut frames: u64 = 0;
        while !self.stop_requested.load(Ordering::SeqCst) {
            let mut state = self.state.lock();
            match state.source.read() {
                Some(frame) => {
                    let stopping = self.stop_requested.load(Ordering::SeqCst);
                    state.process_frame(frame, stopping);
                    frames += 1;
                }
                None if state.config.use_file_source => {
                    log::info!("End of recording after {} frames", frames);
                    break;
                }
                None => state.report(&TrackerError::CouldNotReadFrame),
            }
        }

        self.state.lock().source.close();
        log::info!("Processing loop stopped after {} frames", frames);
        Ok(())
    }

    /// Ask the loop to finish and wait until it has. The frame in flight
    /// always completes. Must not be called from a sink.
    pub fn stop(&self) -> Result<()> {
        let mut running = self.running.lock();
        if !*running {
            return Ok(());
        }
        log::info!("Stop requested");
        self.stop_requested.store(true, Ordering::SeqCst);
        while *running {
            self.running_changed.wait(&mut running);
        }
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        *self.running.lock()
    }

    /// Hold the run flag so the loop cannot start during a calibration call.
    fn lock_idle(&self) -> Result<MutexGuard<'_, bool>> {
        let running = self.running.lock();
        if *running {
            return Err(TrackerError::Busy);
        }
        Ok(running)
    }

    pub fn set_ball_color_range(&self, low: [i32; 3], high: [i32; 3]) {
        let mut state = self.state.lock();
        state.ball.range = ColorRange::new(low, high).reordered();
        log::debug!("Ball range set to {:?}", state.ball.range);
    }

    pub fn set_ball_radius_threshold(&self, radius: i32) {
        self.state.lock().ball.radius_threshold = radius;
    }

    pub fn ball_parameters(&self) -> BallDetectionParameters {
        self.state.lock().ball
    }

    pub fn set_config(
        &self,
        show_collisions: bool,
        use_file_source: bool,
        show_tuning_ui: bool,
        show_preview: bool,
    ) {
        let mut state = self.state.lock();
        state.config.show_collisions = show_collisions;
        state.config.use_file_source = use_file_source;
        state.config.show_tuning_ui = show_tuning_ui;
        state.config.show_preview = show_preview;
        log::debug!("Configuration set to {:?}", state.config);
    }

    /// Replace every configuration flag, including the processing width.
    pub fn set_configuration(&self, config: ConfigurationParameters) {
        self.state.lock().config = config;
    }

    pub fn configuration(&self) -> ConfigurationParameters {
        self.state.lock().config
    }

    pub fn set_contour_parameters(&self, contour: ContourParameters) {
        self.state.lock().locator.contour = contour;
    }

    pub fn set_collision_sink<S: CollisionSink + 'static>(&self, sink: S) {
        self.state.lock().collision_sink = Some(Arc::new(sink));
    }

    pub fn set_error_sink<S: ErrorSink + 'static>(&self, sink: S) {
        self.state.lock().error_sink = Some(Arc::new(sink));
    }

    pub fn set_preview_sink<S: PreviewSink + 'static>(&self, sink: S) {
        self.state.lock().preview = Some(Box::new(sink));
    }

    /// Open the source and begin collecting surface samples. Any existing
    /// surface calibration is discarded.
    pub fn start_surface_calibration(&self) -> Result<()> {
        let _idle = self.lock_idle()?;
        let mut state = self.state.lock();
        let opened = state.open_source();
        state.reported(opened)?;
        state.surface.start();
        log::info!("Surface calibration started");
        Ok(())
    }

    /// Sample the surface colour at a clicked pixel, widened by `tolerance`,
    /// and record the quadrilateral found with it.
    pub fn sample_surface_by_click(&self, tolerance: [i32; 3]) -> Result<()> {
        let _idle = self.lock_idle()?;
        let mut state = self.state.lock();
        let result = state.sample_surface_by_click(tolerance);
        state.reported(result)
    }

    /// Record the quadrilateral found inside the given HSV range.
    pub fn sample_surface_by_range(&self, low: [i32; 3], high: [i32; 3]) -> Result<()> {
        let _idle = self.lock_idle()?;
        let mut state = self.state.lock();
        let result = state.sample_surface_by_range(ColorRange::new(low, high).reordered());
        state.reported(result)
    }

    /// Finish surface calibration and return the averaged corners.
    ///
    /// Failure is reported through the error sink and returned as an invalid
    /// calibration.
    pub fn end_surface_calibration(&self) -> SurfaceCalibration {
        let Ok(_idle) = self.lock_idle() else {
            log::warn!("Cannot end surface calibration while the processing loop runs");
            return SurfaceCalibration::invalid();
        };
        let mut state = self.state.lock();
        let result = state.surface.end();
        state.source.close();
        match state.reported(result) {
            Ok(calibration) => calibration,
            Err(_) => SurfaceCalibration::invalid(),
        }
    }

    /// Derive the ball colour range from two clicks, on the darkest and the
    /// most lit part of the ball.
    pub fn calibrate_ball_by_click(&self, tolerance: [i32; 3]) -> Result<()> {
        let _idle = self.lock_idle()?;
        let mut state = self.state.lock();
        if state.picker.is_none() {
            return Err(TrackerError::NoPointPicker);
        }
        let result = state.calibrate_ball_by_click(tolerance);
        state.source.close();
        state.reported(result)
    }

    pub fn calibration_settings(&self) -> CalibrationSettings {
        let state = self.state.lock();
        CalibrationSettings {
            surface: state.surface.snapshot(),
            ball: state.ball,
        }
    }

    /// Install saved settings; the homography is recomputed from the corners.
    pub fn set_calibration_settings(&self, settings: CalibrationSettings) -> Result<()> {
        let mut state = self.state.lock();
        state.ball = settings.ball;
        state.ball.reorder();
        let result = state.surface.restore(settings.surface);
        log::info!(
            "Calibration settings applied (surface valid: {})",
            state.surface.snapshot().valid
        );
        state.reported(result)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.state.get_mut().source.close();
    }
}

impl SessionState {
    /// Forward the error code of a failed result to the error sink.
    fn reported<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(error) = &result {
            self.report(error);
        }
        result
    }

    fn report(&self, error: &TrackerError) {
        let Some(code) = error.code() else {
            return;
        };
        log::warn!("{} ({})", error, code);
        if let Some(sink) = &self.error_sink {
            sink.on_error(code);
        }
    }

    fn open_source(&mut self) -> Result<()> {
        if self.source.is_open() {
            return Ok(());
        }
        self.source
            .open()
            .map_err(|e| TrackerError::UnableToOpenVideo(e.to_string()))?;
        log::info!("Frame source opened");
        Ok(())
    }

    fn check_source(&mut self) -> Result<()> {
        self.open_source()?;
        let frame = self.read_frame()?;
        log::debug!("Frame source delivers {}x{} frames", frame.width(), frame.height());
        Ok(())
    }

    fn read_frame(&mut self) -> Result<RgbImage> {
        self.source.read().ok_or(TrackerError::CouldNotReadFrame)
    }

    /// Discard frames while the camera exposure settles.
    fn warm_up(&mut self) -> Result<()> {
        for _ in 0..CALIBRATION_WARMUP_FRAMES {
            self.read_frame()?;
        }
        Ok(())
    }

    fn show(&mut self, window: &str, frame: &RgbImage) {
        if !self.config.show_preview {
            return;
        }
        if let Some(preview) = self.preview.as_mut() {
            preview.show(window, frame);
        }
    }

    /// Show frames until the picker clicks; returns the clicked HSV value.
    fn wait_for_click(&mut self, prompt: &str) -> Result<[u8; 3]> {
        let mut picker = self.picker.take().ok_or(TrackerError::NoPointPicker)?;
        let result = self.click_loop(&mut *picker, prompt);
        self.picker = Some(picker);
        result
    }

    fn click_loop(&mut self, picker: &mut dyn PointPicker, prompt: &str) -> Result<[u8; 3]> {
        loop {
            let frame = self.read_frame()?;
            self.show(CALIBRATION_WINDOW, &frame);

            let Some((x, y)) = picker.pick(prompt, &frame) else {
                continue;
            };
            match sample_hsv(&frame, x, y) {
                Some(hsv) => {
                    log::debug!("{}: sampled HSV {:?} at ({}, {})", prompt, hsv, x, y);
                    return Ok(hsv);
                }
                None => log::warn!("Click ({}, {}) is outside the frame", x, y),
            }
        }
    }

    fn sample_surface_by_click(&mut self, tolerance: [i32; 3]) -> Result<()> {
        self.surface.ensure_calibrating()?;
        if self.picker.is_none() {
            return Err(TrackerError::NoPointPicker);
        }
        self.warm_up()?;

        let hsv = self.wait_for_click(SURFACE_CLICK_PROMPT)?;
        let range = ColorRange::around(hsv.map(i32::from), tolerance).reordered();
        let frame = self.read_frame()?;
        self.record_surface(frame, &range)
    }

    fn sample_surface_by_range(&mut self, range: ColorRange) -> Result<()> {
        self.surface.ensure_calibrating()?;
        self.warm_up()?;
        let frame = self.read_frame()?;
        self.record_surface(frame, &range)
    }

    /// Search one frame for the surface; a miss adds no sample.
    fn record_surface(&mut self, frame: RgbImage, range: &ColorRange) -> Result<()> {
        let mut frame = resize_to_width(frame, self.config.target_width);
        let search = self.locator.locate_quad(&frame, range);

        if self.config.show_preview && self.preview.is_some() {
            if let Some(quad) = &search.quad {
                annotate::draw_surface(&mut frame, quad);
            }
            self.show(CALIBRATION_WINDOW, &frame);
            self.show(MASK_WINDOW, &annotate::mask_to_rgb(&search.mask));
        }

        match search.quad {
            Some(quad) => self.surface.add_sample(quad),
            None => {
                log::debug!("No surface quadrilateral in range {:?}", range);
                Ok(())
            }
        }
    }

    fn calibrate_ball_by_click(&mut self, tolerance: [i32; 3]) -> Result<()> {
        self.open_source()?;
        self.warm_up()?;

        let dark = self.wait_for_click(DARK_BALL_PROMPT)?;
        let lit = self.wait_for_click(LIT_BALL_PROMPT)?;

        self.ball.range = ball_range_from_samples(dark, lit, tolerance);
        log::info!("Ball calibrated: {:?}", self.ball.range);
        Ok(())
    }

    /// One iteration of the tracking loop.
    fn process_frame(&mut self, frame: RgbImage, stopping: bool) {
        let mut frame = resize_to_width(frame, self.config.target_width);
        let search = self.locator.locate_ball(&frame, &self.ball);

        if let Some(collision) = self.detector.update(search.candidate.as_ref()) {
            self.dispatch_collision(&collision, stopping);
        }
        // The marker only counts down while it is being drawn.
        let marker = if self.config.show_collisions {
            self.detector.memory_mut().tick()
        } else {
            None
        };

        if !self.config.show_preview || self.preview.is_none() {
            return;
        }
        if self.config.show_collisions {
            annotate::draw_ball(&mut frame, &search);
            annotate::draw_trajectory(&mut frame, self.detector.trajectory());
            if let Some(point) = marker {
                annotate::draw_collision(&mut frame, point);
            }
        }
        let surface = self.surface.snapshot();
        if surface.valid {
            annotate::draw_surface(&mut frame, &surface.corners);
        }
        self.show(TRACKING_WINDOW, &frame);
    }

    fn dispatch_collision(&self, collision: &Collision, stopping: bool) {
        let Some(mapped) = self.surface.map(collision.point) else {
            log::debug!("Collision at {:?} ignored, surface not calibrated", collision.point);
            return;
        };
        if stopping {
            return;
        }
        log::debug!("Collision mapped to ({:.3}, {:.3})", mapped.x, mapped.y);
        if let Some(sink) = &self.collision_sink {
            sink.on_collision(mapped.x as f32, mapped.y as f32);
        }
    }
}
