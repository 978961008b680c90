use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

pub const SUBTITLES_EXTENSION: &str = "srt";

/// A media file split the way the classifier consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub path: PathBuf,
    /// Directory holding the file; the subtitle is written next to it.
    pub relative_path: PathBuf,
    pub filename_no_extension: String,
    pub parent_folder: Option<String>,
}

impl MediaFile {
    pub fn from_path(path: &Path) -> Option<Self> {
        let filename_no_extension = path.file_stem()?.to_string_lossy().into_owned();
        let relative_path = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let parent_folder = relative_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());

        Some(Self {
            path: path.to_path_buf(),
            relative_path,
            filename_no_extension,
            parent_folder,
        })
    }
}

/// `<filename_no_extension>.<language_code>.srt`
pub fn subtitle_file_name(filename_no_extension: &str, language_code: &str) -> String {
    format!("{filename_no_extension}.{language_code}.{SUBTITLES_EXTENSION}")
}

pub fn subtitle_destination(
    relative_path: &Path,
    filename_no_extension: &str,
    language_code: &str,
) -> PathBuf {
    relative_path.join(subtitle_file_name(filename_no_extension, language_code))
}

pub fn subtitles_already_exist(
    relative_path: &Path,
    filename_no_extension: &str,
    language_code: &str,
) -> bool {
    subtitle_destination(relative_path, filename_no_extension, language_code).exists()
}

pub fn has_media_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Every media file under `root`, sorted by path.
pub fn collect_media_files(root: &Path, extensions: &[String]) -> Vec<MediaFile> {
    let mut files: Vec<MediaFile> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                warn!("Skipping unreadable entry under '{}': {}", root.display(), e);
                None
            }
        })
        .filter(|e| e.file_type().is_file() && has_media_extension(e.path(), extensions))
        .filter_map(|e| MediaFile::from_path(e.path()))
        .collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));
    debug!("Found {} media files under '{}'", files.len(), root.display());
    files
}

pub async fn write_subtitle(destination: &Path, content: &[u8]) -> std::io::Result<()> {
    tracing::trace!("writing response to {}", destination.display());
    tokio::fs::write(destination, content).await
}
