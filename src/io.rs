use log::{error, warn};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, Result};
use crate::types::{VideoAnnotation, VideoPair};

pub const VIDEO_DIR: &str = "video";
pub const ANNOTATION_DIR: &str = "ann";

/// Sorted entries of `dir` that satisfy `keep`
fn sorted_entries(dir: &Path, keep: impl Fn(&Path) -> bool) -> std::io::Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| keep(path))
        .collect();
    entries.sort();
    Ok(entries)
}

/// The folder holding the per-video subfolders inside an extracted archive.
///
/// Archives are expected to contain a single top-level folder. When there are
/// several, the first one in lexicographic order is used.
pub fn find_dataset_root(extracted_dir: &Path) -> Result<PathBuf> {
    let mut dirs = sorted_entries(extracted_dir, Path::is_dir)?;
    if dirs.len() > 1 {
        warn!(
            "{} top-level folders in {}, using {}",
            dirs.len(),
            extracted_dir.display(),
            dirs[0].display()
        );
    }
    if dirs.is_empty() {
        return Err(ConvertError::EmptyArchive(extracted_dir.to_path_buf()));
    }
    Ok(dirs.swap_remove(0))
}

/// Immediate subdirectories of `directory`, one per video, sorted by name
pub fn list_folders(directory: &Path) -> Result<Vec<PathBuf>> {
    Ok(sorted_entries(directory, Path::is_dir)?)
}

/// First regular file in `dir`, or `None` if the directory is missing or has no files
fn first_file(dir: &Path) -> Option<PathBuf> {
    match sorted_entries(dir, Path::is_file) {
        Ok(files) => files.into_iter().next(),
        Err(_) => None,
    }
}

/// Locate the video and annotation file of one dataset folder
pub fn find_video_and_annotation(folder: &Path) -> VideoPair {
    VideoPair {
        folder: folder.to_path_buf(),
        video: first_file(&folder.join(VIDEO_DIR)),
        annotation: first_file(&folder.join(ANNOTATION_DIR)),
    }
}

/// Walk the dataset root and pair each folder's video with its annotation
pub fn collect_video_pairs(root: &Path) -> Result<Vec<VideoPair>> {
    Ok(list_folders(root)?
        .iter()
        .map(|folder| find_video_and_annotation(folder))
        .collect())
}

/// Read and validate an annotation document.
///
/// The JSON is parsed straight from a buffered file stream. Boxes that are
/// not exactly two points fail to deserialize, and zero frame dimensions are
/// rejected afterwards.
pub fn read_annotation(path: &Path) -> Result<VideoAnnotation> {
    let file = File::open(path).map_err(|e| {
        error!("Failed to open annotation file ({}): {:?}", path.display(), e);
        ConvertError::Io(e)
    })?;

    let annotation: VideoAnnotation = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| ConvertError::malformed(path, e.to_string()))?;

    if annotation.size.width == 0 || annotation.size.height == 0 {
        return Err(ConvertError::malformed(
            path,
            format!(
                "frame size {}x{} has a zero dimension",
                annotation.size.width, annotation.size.height
            ),
        ));
    }

    Ok(annotation)
}
