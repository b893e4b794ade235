//! Annotated video archive to YOLO format converter
//!
//! This library unpacks a tar archive of videos with per-video box
//! annotations and writes one JPEG plus one YOLO label file per annotated
//! frame, then zips the produced dataset.

pub mod archive;
pub mod config;
pub mod conversion;
pub mod error;
pub mod io;
pub mod types;
pub mod utils;
pub mod video;
pub mod yolo_dataset;

// Re-export commonly used types and functions
pub use archive::{compress_folder, extract_archive};
pub use config::Args;
pub use conversion::{convert_to_yolo, create_yolo_labels, ClassMap};
pub use error::ConvertError;
pub use io::{find_video_and_annotation, list_folders, read_annotation};
pub use types::{ConversionStats, RunSummary, VideoAnnotation, VideoPair, YoloBox};
pub use video::{FrameGrab, FrameSource, VideoBackend};
pub use yolo_dataset::process_dataset;

#[cfg(feature = "opencv")]
pub use video::{OpenCvBackend, OpenCvVideo};
