#![allow(dead_code)]

use serde_json::{json, Value};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use video2yolo::error::Result;
use video2yolo::{ConvertError, FrameGrab, FrameSource, VideoBackend};

pub const FAKE_JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xD9];

/// In-memory video with a fixed number of frames
#[derive(Debug, Default)]
pub struct FakeVideo {
    pub frames: usize,
    pub undecodable: HashSet<usize>,
    pub grabbed: Vec<usize>,
}

impl FakeVideo {
    pub fn with_frames(frames: usize) -> Self {
        Self {
            frames,
            ..Self::default()
        }
    }
}

impl FrameSource for FakeVideo {
    fn frame_count(&self) -> Result<usize> {
        Ok(self.frames)
    }

    fn grab_frame(&mut self, index: usize, path: &Path) -> Result<FrameGrab> {
        self.grabbed.push(index);
        if self.undecodable.contains(&index) {
            return Ok(FrameGrab::DecodeFailed);
        }
        fs::write(path, FAKE_JPEG)?;
        Ok(FrameGrab::Written)
    }
}

/// Opens "videos" whose file content is their frame count
pub struct FakeBackend;

impl VideoBackend for FakeBackend {
    type Source = FakeVideo;

    fn open(&self, path: &Path) -> Result<FakeVideo> {
        let content = fs::read_to_string(path)?;
        let frames = content
            .trim()
            .parse()
            .map_err(|_| ConvertError::VideoOpen(path.to_path_buf()))?;
        Ok(FakeVideo::with_frames(frames))
    }
}

pub fn figure(object_key: &str, exterior: [[f64; 2]; 2]) -> Value {
    json!({
        "objectKey": object_key,
        "geometry": { "points": { "exterior": exterior, "interior": [] } },
    })
}

/// Annotation with a single "ball" object and one box per listed frame
pub fn ball_annotation(width: u32, height: u32, frame_indices: &[usize]) -> Value {
    let frames: Vec<Value> = frame_indices
        .iter()
        .map(|&index| {
            json!({
                "index": index,
                "figures": [figure("k1", [[10.0, 10.0], [30.0, 20.0]])],
            })
        })
        .collect();
    json!({
        "size": { "width": width, "height": height },
        "objects": [{ "key": "k1", "classTitle": "ball" }],
        "frames": frames,
        "framesCount": 10,
    })
}

/// Lay out `<root>/<name>/video/clip.mp4` and `<root>/<name>/ann/clip.mp4.json`
pub fn write_video_folder(root: &Path, name: &str, frames: usize, annotation: &Value) -> PathBuf {
    let folder = root.join(name);
    fs::create_dir_all(folder.join("video")).unwrap();
    fs::create_dir_all(folder.join("ann")).unwrap();
    fs::write(folder.join("video/clip.mp4"), frames.to_string()).unwrap();
    fs::write(
        folder.join("ann/clip.mp4.json"),
        serde_json::to_vec_pretty(annotation).unwrap(),
    )
    .unwrap();
    folder
}

/// Pack `source` into a tar at `archive` under a single `dataset/` folder
pub fn build_tar(source: &Path, archive: &Path) {
    let file = fs::File::create(archive).unwrap();
    let mut builder = tar::Builder::new(file);
    builder.append_dir_all("dataset", source).unwrap();
    builder.finish().unwrap();
}

/// Sorted file names in a directory, empty if it does not exist
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    };
    names.sort();
    names
}
