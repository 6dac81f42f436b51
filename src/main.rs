//! Bounce Tracker
//!
//! Replays a recorded frame directory through a tracking session and logs
//! every bounce in surface coordinates.
//!
//! Usage: `bounce-tracker <frames-dir> [settings-file]`

use std::path::PathBuf;
use std::process::ExitCode;

use bounce_tracker::camera::ImageDirectorySource;
use bounce_tracker::export::{default_settings_path, load_settings};
use bounce_tracker::{ErrorCode, Session};

fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut args = std::env::args().skip(1);
    let Some(frames_dir) = args.next().map(PathBuf::from) else {
        eprintln!("Usage: bounce-tracker <frames-dir> [settings-file]");
        return ExitCode::FAILURE;
    };
    let settings_path = args.next().map(PathBuf::from).or_else(default_settings_path);

    log::info!("Bounce Tracker starting...");

    let session = Session::new(ImageDirectorySource::new(&frames_dir));
    session.set_config(true, true, false, false);
    session.set_error_sink(|code: ErrorCode| log::error!("Tracker error {} ({})", code, code.as_i32()));
    session.set_collision_sink(|x: f32, y: f32| log::info!("Bounce at ({:.3}, {:.3})", x, y));

    match settings_path {
        Some(path) if path.exists() => match load_settings(&path) {
            Ok(settings) => {
                if let Err(e) = session.set_calibration_settings(settings) {
                    log::warn!("Calibration from {} not applied: {}", path.display(), e);
                }
            }
            Err(e) => {
                log::error!("Failed to load {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        _ => log::warn!("No calibration settings found, bounces will not be reported"),
    }

    if let Err(e) = session.launch() {
        log::error!("Processing failed: {}", e);
        return ExitCode::FAILURE;
    }

    log::info!("Bounce Tracker exiting");
    ExitCode::SUCCESS
}
