use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Default directory the YOLO dataset is written to.
pub const DEFAULT_OUTPUT_ROOT: &str = "yolo_annotation";

/// Command-line arguments for converting an annotated video archive to YOLO format.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct Args {
    /// Tar archive holding one folder per video with `video/` and `ann/` children
    pub archive: PathBuf,

    /// Directory the archive is extracted into
    pub output_dir: PathBuf,

    /// Write each video's frames into its own subfolder ('true' or 'false')
    #[arg(action = ArgAction::Set, value_parser = parse_bool)]
    pub separate_folders: bool,

    /// Delete the extracted directory once processing is done ('true' or 'false')
    #[arg(action = ArgAction::Set, value_parser = parse_bool)]
    pub delete_extracted: bool,

    /// Delete the produced dataset directory after it has been zipped ('true' or 'false')
    #[arg(action = ArgAction::Set, value_parser = parse_bool)]
    pub delete_output: bool,

    /// Root directory of the produced YOLO dataset
    #[arg(long = "output_root", default_value = DEFAULT_OUTPUT_ROOT)]
    pub output_root: PathBuf,

    /// Remove the source archive after a successful extraction
    #[arg(long = "delete_archive")]
    pub delete_archive: bool,

    /// JPEG quality used for the extracted frames
    #[arg(long = "jpeg_quality", default_value_t = 95, value_parser = validate_quality)]
    pub jpeg_quality: i32,

    /// Process videos in parallel
    #[arg(long = "parallel")]
    pub parallel: bool,

    /// Write a dataset.yaml with the class names next to each images/labels pair
    #[arg(long = "dataset_yaml")]
    pub dataset_yaml: bool,
}

impl Args {
    /// Arguments for a run with every optional setting at its default.
    pub fn new(
        archive: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        separate_folders: bool,
        delete_extracted: bool,
        delete_output: bool,
    ) -> Self {
        Self {
            archive: archive.into(),
            output_dir: output_dir.into(),
            separate_folders,
            delete_extracted,
            delete_output,
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            delete_archive: false,
            jpeg_quality: 95,
            parallel: false,
            dataset_yaml: false,
        }
    }
}

// Accept 'true' / 'false' in any letter case
pub fn parse_bool(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(format!("expected 'true' or 'false', got '{}'", s)),
    }
}

// Validate that the JPEG quality is between 1 and 100
pub fn validate_quality(s: &str) -> Result<i32, String> {
    match s.parse::<i32>() {
        Ok(val) if (1..=100).contains(&val) => Ok(val),
        _ => Err("QUALITY must be between 1 and 100".to_string()),
    }
}
