//! Recorded stream stored as a directory of still images.

use std::path::{Path, PathBuf};

use image::RgbImage;

use super::{CameraError, FrameSource};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

/// Reads image files in lexicographic file-name order.
#[derive(Debug, Clone)]
pub struct ImageDirectorySource {
    dir: PathBuf,
    files: Vec<PathBuf>,
    position: usize,
    open: bool,
}

impl ImageDirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            files: Vec::new(),
            position: 0,
            open: false,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of frames found by the last `open`.
    pub fn frame_count(&self) -> usize {
        self.files.len()
    }

    fn is_image(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
    }
}

impl FrameSource for ImageDirectorySource {
    fn open(&mut self) -> Result<(), CameraError> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_file() && Self::is_image(&path) {
                files.push(path);
            }
        }
        files.sort();

        if files.is_empty() {
            return Err(CameraError::NoFrames);
        }

        log::info!("Opened {} frames from {}", files.len(), self.dir.display());
        self.files = files;
        self.position = 0;
        self.open = true;
        Ok(())
    }

    fn read(&mut self) -> Option<RgbImage> {
        if !self.open {
            return None;
        }
        let path = self.files.get(self.position)?;
        self.position += 1;

        match image::open(path) {
            Ok(img) => Some(img.to_rgb8()),
            Err(e) => {
                log::warn!("Failed to decode {}: {}", path.display(), e);
                None
            }
        }
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("bounce-tracker-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_reads_images_in_name_order() {
        let dir = scratch_dir("frames");
        RgbImage::new(3, 2).save(dir.join("frame_002.png")).unwrap();
        RgbImage::new(5, 2).save(dir.join("frame_001.png")).unwrap();
        std::fs::write(dir.join("notes.txt"), "not a frame").unwrap();

        let mut source = ImageDirectorySource::new(&dir);
        source.open().unwrap();
        assert_eq!(source.frame_count(), 2);
        assert_eq!(source.read().unwrap().width(), 5);
        assert_eq!(source.read().unwrap().width(), 3);
        assert!(source.read().is_none());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_empty_directory_fails() {
        let dir = scratch_dir("empty");
        let mut source = ImageDirectorySource::new(&dir);
        assert!(matches!(source.open(), Err(CameraError::NoFrames)));
        std::fs::remove_dir_all(&dir).unwrap();

        let mut missing = ImageDirectorySource::new(dir.join("missing"));
        assert!(matches!(missing.open(), Err(CameraError::Io(_))));
    }
}
