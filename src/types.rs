use serde::{Deserialize, Serialize};
use std::ops::AddAssign;
use std::path::PathBuf;

// Frame dimensions in pixels
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

// An annotated object, `key` is unique within a document, `class_title` is not
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationObject {
    pub key: String,
    pub class_title: String,
}

// Box corners: top-left then bottom-right, anything but two points fails to parse
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Points {
    pub exterior: [(f64, f64); 2],
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Geometry {
    pub points: Points,
}

// One box drawn on a frame, pointing back at its object through `object_key`
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Figure {
    pub object_key: String,
    pub geometry: Geometry,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AnnotatedFrame {
    pub index: usize,
    #[serde(default)]
    pub figures: Vec<Figure>,
}

// The annotation document describing a single video
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VideoAnnotation {
    pub size: FrameSize,
    pub objects: Vec<AnnotationObject>,
    pub frames: Vec<AnnotatedFrame>,
}

/// A YOLO box: center and size normalized to the frame dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YoloBox {
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
}

/// The video and annotation files found in one dataset folder.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoPair {
    pub folder: PathBuf,
    pub video: Option<PathBuf>,
    pub annotation: Option<PathBuf>,
}

impl VideoPair {
    /// Both files, or `None` when the folder is missing either of them.
    pub fn resolved(&self) -> Option<(&PathBuf, &PathBuf)> {
        match (&self.video, &self.annotation) {
            (Some(video), Some(annotation)) => Some((video, annotation)),
            _ => None,
        }
    }
}

// Counters collected while converting one video
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConversionStats {
    pub frames_written: usize,
    pub frames_out_of_range: usize,
    pub frames_decode_failed: usize,
    pub frames_write_failed: usize,
    pub figures_written: usize,
    pub figures_unmapped: usize,
}

impl ConversionStats {
    pub fn frames_skipped(&self) -> usize {
        self.frames_out_of_range + self.frames_decode_failed + self.frames_write_failed
    }

    pub fn print_summary(&self, name: &str) {
        log::info!(
            "{}: wrote {} frames with {} boxes",
            name,
            self.frames_written,
            self.figures_written
        );
        if self.frames_skipped() > 0 {
            log::warn!(
                "{}: skipped {} frames (out of range: {}, decode failed: {}, image write failed: {})",
                name,
                self.frames_skipped(),
                self.frames_out_of_range,
                self.frames_decode_failed,
                self.frames_write_failed
            );
        }
        if self.figures_unmapped > 0 {
            log::warn!(
                "{}: dropped {} boxes referencing unknown objects",
                name,
                self.figures_unmapped
            );
        }
    }
}

impl AddAssign<&ConversionStats> for ConversionStats {
    fn add_assign(&mut self, other: &ConversionStats) {
        self.frames_written += other.frames_written;
        self.frames_out_of_range += other.frames_out_of_range;
        self.frames_decode_failed += other.frames_decode_failed;
        self.frames_write_failed += other.frames_write_failed;
        self.figures_written += other.figures_written;
        self.figures_unmapped += other.figures_unmapped;
    }
}

// Outcome of a whole run
#[derive(Debug, Default, Clone)]
pub struct RunSummary {
    pub videos_found: usize,
    pub videos_converted: usize,
    pub videos_unresolved: usize,
    pub videos_failed: usize,
    pub totals: ConversionStats,
    pub archive_path: Option<PathBuf>,
}

impl RunSummary {
    pub fn print_summary(&self) {
        log::info!("=== Processing Summary ===");
        log::info!("Videos found: {}", self.videos_found);
        log::info!("Videos converted: {}", self.videos_converted);
        log::info!("Frames written: {}", self.totals.frames_written);
        log::info!("Boxes written: {}", self.totals.figures_written);
        if self.videos_unresolved > 0 {
            log::warn!(
                "Skipped {} folders without a video or annotation file",
                self.videos_unresolved
            );
        }
        if self.videos_failed > 0 {
            log::warn!("Failed to convert {} videos", self.videos_failed);
        }
        if self.totals.frames_skipped() > 0 || self.totals.figures_unmapped > 0 {
            log::warn!(
                "Total skipped: {} frames, {} boxes",
                self.totals.frames_skipped(),
                self.totals.figures_unmapped
            );
        }
        if let Some(path) = &self.archive_path {
            log::info!("Dataset archive: {}", path.display());
        }
    }
}
