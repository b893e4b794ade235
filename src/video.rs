use std::path::Path;

use crate::error::Result;

/// Outcome of grabbing a single frame into an image file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameGrab {
    Written,
    /// Seeking worked but the decoder returned no data
    DecodeFailed,
    /// The frame decoded but the image encoder refused to write it
    WriteFailed,
}

/// An opened video that can be read frame by frame at random positions.
///
/// The underlying handle is released when the source is dropped.
pub trait FrameSource {
    /// Total number of frames reported by the container
    fn frame_count(&self) -> Result<usize>;

    /// Seek to `index`, decode one frame and write it as an image to `path`
    fn grab_frame(&mut self, index: usize, path: &Path) -> Result<FrameGrab>;
}

/// Opens video files as [`FrameSource`]s.
pub trait VideoBackend: Sync {
    type Source: FrameSource;

    fn open(&self, path: &Path) -> Result<Self::Source>;
}

#[cfg(feature = "opencv")]
pub use self::opencv_backend::{OpenCvBackend, OpenCvVideo};

#[cfg(feature = "opencv")]
mod opencv_backend {
    use log::debug;
    use opencv::{core, imgcodecs, prelude::*, videoio};
    use std::path::Path;

    use super::{FrameGrab, FrameSource, VideoBackend};
    use crate::error::{ConvertError, Result};

    /// Video decoding through OpenCV's `VideoCapture`
    #[derive(Debug, Clone, Copy)]
    pub struct OpenCvBackend {
        pub jpeg_quality: i32,
    }

    impl OpenCvBackend {
        pub fn new(jpeg_quality: i32) -> Self {
            Self { jpeg_quality }
        }
    }

    impl VideoBackend for OpenCvBackend {
        type Source = OpenCvVideo;

        fn open(&self, path: &Path) -> Result<OpenCvVideo> {
            OpenCvVideo::open(path, self.jpeg_quality)
        }
    }

    pub struct OpenCvVideo {
        capture: videoio::VideoCapture,
        frame: Mat,
        encode_params: core::Vector<i32>,
    }

    impl OpenCvVideo {
        pub fn open(path: &Path, jpeg_quality: i32) -> Result<Self> {
            let source = path
                .to_str()
                .ok_or_else(|| ConvertError::VideoOpen(path.to_path_buf()))?;
            let capture = videoio::VideoCapture::from_file(source, videoio::CAP_ANY)?;
            if !capture.is_opened()? {
                return Err(ConvertError::VideoOpen(path.to_path_buf()));
            }
            debug!("Opened video {}", path.display());

            Ok(Self {
                capture,
                frame: Mat::default(),
                encode_params: core::Vector::from_slice(&[
                    imgcodecs::IMWRITE_JPEG_QUALITY,
                    jpeg_quality,
                ]),
            })
        }
    }

    impl FrameSource for OpenCvVideo {
        fn frame_count(&self) -> Result<usize> {
            let count = self.capture.get(videoio::CAP_PROP_FRAME_COUNT)?;
            Ok(if count > 0.0 { count as usize } else { 0 })
        }

        fn grab_frame(&mut self, index: usize, path: &Path) -> Result<FrameGrab> {
            self.capture
                .set(videoio::CAP_PROP_POS_FRAMES, index as f64)?;
            if !self.capture.read(&mut self.frame)? || self.frame.empty() {
                return Ok(FrameGrab::DecodeFailed);
            }

            let target = path
                .to_str()
                .ok_or_else(|| ConvertError::Video(format!("non UTF-8 path {}", path.display())))?;
            if imgcodecs::imwrite(target, &self.frame, &self.encode_params)? {
                Ok(FrameGrab::Written)
            } else {
                Ok(FrameGrab::WriteFailed)
            }
        }
    }

    impl Drop for OpenCvVideo {
        fn drop(&mut self) {
            if let Err(e) = self.capture.release() {
                debug!("Failed to release video capture: {}", e);
            }
        }
    }
}
