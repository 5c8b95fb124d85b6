//! Import helpers: classify files by extension and open the right element.

use mediasyncer_core::{MediaElement, MediaKind, Result, SyncError};
use std::path::Path;

use crate::decoder::DecodeSettings;
use crate::element::{ImageElement, VideoElement};

const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "m4v", "mov", "mkv", "webm", "avi", "wmv", "flv", "mpg", "mpeg", "ts", "mts", "m2ts",
    "3gp", "ogv", "y4m",
];

const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "webp", "tif", "tiff",
];

/// Decide the media kind from the file extension.
pub fn classify_path(path: &Path) -> Result<MediaKind> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Ok(MediaKind::Video)
    } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Ok(MediaKind::Image)
    } else {
        Err(SyncError::UnsupportedFormat(format!(
            "{} is neither a video nor an image",
            path.display()
        )))
    }
}

/// File name shown on the media badge.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Open `path` as the element matching its kind. Loading continues in the
/// background; the element announces itself with `MediaEvent::Loaded`.
pub fn open_media(path: &Path, settings: DecodeSettings) -> Result<Box<dyn MediaElement>> {
    if !path.is_file() {
        return Err(SyncError::NotFound(path.display().to_string()));
    }
    Ok(match classify_path(path)? {
        MediaKind::Video => Box::new(VideoElement::open(path, settings)),
        MediaKind::Image => Box::new(ImageElement::open(path)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_classify_video_and_image() {
        assert_eq!(classify_path(Path::new("a/b/clip.MP4")).unwrap(), MediaKind::Video);
        assert_eq!(classify_path(Path::new("still.jpeg")).unwrap(), MediaKind::Image);
    }

    #[test]
    fn test_classify_rejects_other_files() {
        let err = classify_path(Path::new("notes.txt")).unwrap_err();
        assert!(matches!(err, SyncError::UnsupportedFormat(_)));
        assert!(classify_path(Path::new("no_extension")).is_err());
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(&PathBuf::from("/tmp/take_02.mov")), "take_02.mov");
    }

    #[test]
    fn test_open_missing_file() {
        let err = open_media(Path::new("/nope/clip.mp4"), DecodeSettings::default()).err();
        assert!(matches!(err, Some(SyncError::NotFound(_))));
    }
}
