use std::path::PathBuf;

/// Errors raised while converting an annotated video archive.
///
/// `Extraction`, `EmptyArchive` and failures while preparing or zipping the
/// output tree abort the run. Everything else is reported against a single
/// video and the run moves on to the next one.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("Failed to extract archive {path}: {source}")]
    Extraction {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Archive extracted to {0} contains no top-level folder")]
    EmptyArchive(PathBuf),

    #[error("Malformed annotation {path}: {reason}")]
    MalformedAnnotation { path: PathBuf, reason: String },

    #[error("Failed to open video {0}")]
    VideoOpen(PathBuf),

    #[error("Video error: {0}")]
    Video(String),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    pub fn malformed(path: &std::path::Path, reason: impl Into<String>) -> Self {
        Self::MalformedAnnotation {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

#[cfg(feature = "opencv")]
impl From<opencv::Error> for ConvertError {
    fn from(e: opencv::Error) -> Self {
        Self::Video(e.to_string())
    }
}

pub type Result<T, E = ConvertError> = std::result::Result<T, E>;
