use ball_capture_common::frame::capture_filename_now;
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Dataset images go out at high quality; they feed a training pipeline.
const JPEG_QUALITY: u8 = 95;

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("failed to create save directory {0}: {1}")]
    CreateDir(String, std::io::Error),
    #[error("failed to encode JPEG: {0}")]
    Encode(#[from] image::ImageError),
    #[error("failed to write {0}: {1}")]
    Write(String, std::io::Error),
}

/// Writes captured frames to the local dataset directory as quality-95 JPEGs.
///
/// Keeps its own filename sequence; the save counter shown to the operator is
/// tracked separately by the session.
pub struct LocalSaveWriter {
    dir: PathBuf,
    prefix: String,
    next_seq: u32,
}

impl LocalSaveWriter {
    /// Create the writer, making the save directory if it does not exist.
    pub fn new(dir: &Path, prefix: &str) -> Result<Self, SaveError> {
        std::fs::create_dir_all(dir)
            .map_err(|e| SaveError::CreateDir(dir.display().to_string(), e))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            prefix: prefix.to_string(),
            next_seq: 0,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Next generated filename, e.g. "ball_dataset_0001_20260830_142733_512.jpg".
    pub fn generate_filename(&mut self) -> String {
        self.next_seq += 1;
        capture_filename_now(&self.prefix, self.next_seq)
    }

    /// Encode the frame and write it under `filename` (generated when absent).
    /// Writing the same explicit filename twice overwrites the earlier file.
    pub fn save(&mut self, frame: &RgbImage, filename: Option<&str>) -> Result<PathBuf, SaveError> {
        let name = match filename {
            Some(n) => n.to_string(),
            None => self.generate_filename(),
        };
        let path = self.dir.join(name);

        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY).encode_image(frame)?;
        std::fs::write(&path, &jpeg)
            .map_err(|e| SaveError::Write(path.display().to_string(), e))?;

        debug!(path = %path.display(), bytes = jpeg.len(), "wrote local capture");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::sync::atomic::{AtomicU32, Ordering};

    static DIR_SEQ: AtomicU32 = AtomicU32::new(0);

    fn temp_save_dir() -> PathBuf {
        std::env::temp_dir().join(format!(
            "ball_capture_save_test_{}_{}",
            std::process::id(),
            DIR_SEQ.fetch_add(1, Ordering::Relaxed)
        ))
    }

    fn test_frame() -> RgbImage {
        RgbImage::from_pixel(8, 8, Rgb([120, 60, 200]))
    }

    #[test]
    fn creates_directory_and_writes_jpeg() {
        let dir = temp_save_dir();
        let mut writer = LocalSaveWriter::new(&dir, "ball_dataset").unwrap();
        let path = writer.save(&test_frame(), None).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        // JPEG SOI marker
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn generated_filenames_advance_the_sequence() {
        let dir = temp_save_dir();
        let mut writer = LocalSaveWriter::new(&dir, "ball_dataset").unwrap();
        let a = writer.generate_filename();
        let b = writer.generate_filename();
        assert!(a.starts_with("ball_dataset_0001_"));
        assert!(b.starts_with("ball_dataset_0002_"));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn explicit_filename_overwrites_not_duplicates() {
        let dir = temp_save_dir();
        let mut writer = LocalSaveWriter::new(&dir, "ball_dataset").unwrap();
        let first = writer.save(&test_frame(), Some("fixed.jpg")).unwrap();
        let second = writer.save(&test_frame(), Some("fixed.jpg")).unwrap();
        assert_eq!(first, second);

        let entries = std::fs::read_dir(&dir).unwrap().count();
        assert_eq!(entries, 1);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn reuses_existing_directory() {
        let dir = temp_save_dir();
        std::fs::create_dir_all(&dir).unwrap();
        assert!(LocalSaveWriter::new(&dir, "ball_dataset").is_ok());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
