//! Calibration settings files.
//!
//! `.json` files are written as pretty JSON; any other extension uses bincode.

use std::path::{Path, PathBuf};

use crate::calibration::CalibrationSettings;
use crate::error::Result;

const APP_DIR: &str = "bounce-tracker";
const SETTINGS_FILE: &str = "calibration.json";

fn is_json(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Write `settings` to `path`, creating parent directories as needed.
pub fn save_settings(settings: &CalibrationSettings, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    if is_json(path) {
        let json = serde_json::to_string_pretty(settings)?;
        std::fs::write(path, json)?;
    } else {
        let bytes = bincode::serialize(settings)?;
        std::fs::write(path, bytes)?;
    }

    log::info!("Saved calibration settings to {}", path.display());
    Ok(())
}

/// Read settings written by [`save_settings`].
pub fn load_settings(path: &Path) -> Result<CalibrationSettings> {
    let settings = if is_json(path) {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents)?
    } else {
        let bytes = std::fs::read(path)?;
        bincode::deserialize(&bytes)?
    };

    log::info!("Loaded calibration settings from {}", path.display());
    Ok(settings)
}

/// `<config dir>/bounce-tracker/calibration.json`, if the platform has a config dir.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::SurfaceCalibration;
    use crate::error::TrackerError;
    use crate::geometry::Point2;

    fn settings() -> CalibrationSettings {
        let mut settings = CalibrationSettings {
            surface: SurfaceCalibration::new([
                Point2::new(12.5, 9.0),
                Point2::new(401.0, 14.25),
                Point2::new(398.0, 300.0),
                Point2::new(8.0, 296.5),
            ]),
            ..Default::default()
        };
        settings.ball.radius_threshold = 7;
        settings
    }

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("bounce-tracker-export-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_json_file() {
        let path = scratch("settings.json");
        save_settings(&settings(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"radius_threshold\": 7"));
        assert_eq!(load_settings(&path).unwrap(), settings());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_binary_file() {
        let path = scratch("settings.bin");
        save_settings(&settings(), &path).unwrap();
        assert_eq!(load_settings(&path).unwrap(), settings());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_errors() {
        assert!(matches!(
            load_settings(&scratch("missing.json")),
            Err(TrackerError::Io(_))
        ));

        let path = scratch("garbage.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            load_settings(&path),
            Err(TrackerError::Serialization(_))
        ));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_default_path_shape() {
        if let Some(path) = default_settings_path() {
            assert!(path.ends_with("bounce-tracker/calibration.json"));
        }
    }
}
