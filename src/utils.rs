use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::Path;

/// Compression detected from the first bytes of an archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveCompression {
    Gzip,
    None,
}

/// Helper function to infer archive compression from its leading bytes
pub fn infer_archive_compression(header: &[u8]) -> ArchiveCompression {
    if header.starts_with(&[0x1F, 0x8B]) {
        ArchiveCompression::Gzip
    } else {
        ArchiveCompression::None
    }
}

/// File stem shared by a frame's image and label, zero-padded to four digits
pub fn frame_file_stem(index: usize) -> String {
    format!("frame_{:04}", index)
}

/// Render a label value the way Python's `repr` prints a float: shortest
/// round-trip digits, `.0` kept on integral values, and exponent notation
/// (`5e-05`, `1e+16`) below 1e-4 or from 1e16 up.
pub fn format_label_value(value: f64) -> String {
    let magnitude = value.abs();
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() || value == 0.0 {
        return format!("{:?}", value);
    }
    if magnitude < 1e-4 || magnitude >= 1e16 {
        let scientific = format!("{:e}", value);
        return match scientific.split_once('e') {
            Some((mantissa, exponent)) => {
                let exponent: i32 = exponent.parse().unwrap_or(0);
                let sign = if exponent < 0 { '-' } else { '+' };
                format!("{}e{}{:02}", mantissa, sign, exponent.abs())
            }
            None => scientific,
        };
    }
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Progress bar over the dataset folders; the message shows the folder being converted
pub fn create_progress_bar(len: u64, label: &str) -> ProgressBar {
    let template = format!(
        "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {{msg}}",
        label
    );
    let style = ProgressStyle::default_bar()
        .template(&template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    ProgressBar::new(len).with_style(style)
}

/// Make sure the dataset root exists. Files already inside it are kept, and
/// frames written by this run overwrite any with the same name.
pub fn ensure_output_directory(path: &Path) -> std::io::Result<()> {
    if path.is_dir() {
        log::info!("Writing into existing directory {}", path.display());
        return Ok(());
    }
    fs::create_dir_all(path)
}
