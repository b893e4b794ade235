use log::{debug, warn};
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::io::read_annotation;
use crate::types::{AnnotationObject, ConversionStats, FrameSize, VideoAnnotation, YoloBox};
use crate::utils::{format_label_value, frame_file_stem};
use crate::video::{FrameGrab, FrameSource};

pub const IMAGES_DIR: &str = "images";
pub const LABELS_DIR: &str = "labels";
pub const IMAGE_EXTENSION: &str = "jpg";
pub const LABEL_EXTENSION: &str = "txt";

/// Class ids for one annotation document.
///
/// Ids are positions in the `objects` list. Objects sharing a class title
/// collapse onto the id of the last one listed, so the id of a title is the
/// index of its last occurrence. An object key resolves through the first
/// object carrying that key.
#[derive(Debug, Clone, Default)]
pub struct ClassMap {
    by_title: HashMap<String, usize>,
    by_key: HashMap<String, usize>,
}

impl ClassMap {
    pub fn from_objects(objects: &[AnnotationObject]) -> Self {
        let by_title: HashMap<String, usize> = objects
            .iter()
            .enumerate()
            .map(|(idx, obj)| (obj.class_title.clone(), idx))
            .collect();

        let mut by_key = HashMap::with_capacity(objects.len());
        for obj in objects {
            if let Some(&id) = by_title.get(&obj.class_title) {
                by_key.entry(obj.key.clone()).or_insert(id);
            }
        }

        Self { by_title, by_key }
    }

    pub fn class_id_for_title(&self, class_title: &str) -> Option<usize> {
        self.by_title.get(class_title).copied()
    }

    pub fn class_id_for_key(&self, object_key: &str) -> Option<usize> {
        self.by_key.get(object_key).copied()
    }

    /// Class titles keyed by id, in id order
    pub fn names(&self) -> BTreeMap<usize, String> {
        self.by_title
            .iter()
            .map(|(title, &id)| (id, title.clone()))
            .collect()
    }
}

/// Convert a two-corner box to YOLO's normalized center/size form.
///
/// Values are not clamped: geometry reaching past the frame edge yields
/// coordinates outside `[0, 1]`.
pub fn convert_to_yolo(exterior: [(f64, f64); 2], size: FrameSize) -> YoloBox {
    let [(x_min, y_min), (x_max, y_max)] = exterior;
    let width = size.width as f64;
    let height = size.height as f64;

    YoloBox {
        center_x: (x_min + x_max) / 2.0 / width,
        center_y: (y_min + y_max) / 2.0 / height,
        width: (x_max - x_min) / width,
        height: (y_max - y_min) / height,
    }
}

/// One line of a YOLO label file, without the trailing newline
pub fn format_label_line(class_id: usize, bbox: &YoloBox) -> String {
    format!(
        "{} {} {} {} {}",
        class_id,
        format_label_value(bbox.center_x),
        format_label_value(bbox.center_y),
        format_label_value(bbox.width),
        format_label_value(bbox.height)
    )
}

/// Write the YOLO label file for every frame that decodes, plus its image.
///
/// Frames past the end of the video and frames that fail to decode produce no
/// files. Figures whose object key is unknown are dropped without affecting
/// the rest of the frame. `class_map` is expected to come from
/// `annotation.objects`.
pub fn create_yolo_labels<S: FrameSource>(
    source: &mut S,
    annotation: &VideoAnnotation,
    class_map: &ClassMap,
    output_base: &Path,
) -> Result<ConversionStats> {
    let images_dir = output_base.join(IMAGES_DIR);
    let labels_dir = output_base.join(LABELS_DIR);
    fs::create_dir_all(&images_dir)?;
    fs::create_dir_all(&labels_dir)?;

    let total_frames = source.frame_count()?;
    let mut stats = ConversionStats::default();

    for frame in &annotation.frames {
        if frame.index >= total_frames {
            debug!(
                "Frame {} is past the end of the video ({} frames), skipping",
                frame.index, total_frames
            );
            stats.frames_out_of_range += 1;
            continue;
        }

        let stem = frame_file_stem(frame.index);
        let image_path = images_dir.join(&stem).with_extension(IMAGE_EXTENSION);
        match source.grab_frame(frame.index, &image_path)? {
            FrameGrab::Written => {}
            FrameGrab::DecodeFailed => {
                debug!("Failed to decode frame {}, skipping", frame.index);
                stats.frames_decode_failed += 1;
                continue;
            }
            FrameGrab::WriteFailed => {
                warn!("Failed to write image {}", image_path.display());
                stats.frames_write_failed += 1;
                continue;
            }
        }

        let label_path = labels_dir.join(&stem).with_extension(LABEL_EXTENSION);
        let mut writer = BufWriter::new(File::create(&label_path)?);
        for figure in &frame.figures {
            let class_id = match class_map.class_id_for_key(&figure.object_key) {
                Some(class_id) => class_id,
                None => {
                    debug!(
                        "Frame {}: object key '{}' is not in the annotation, dropping box",
                        frame.index, figure.object_key
                    );
                    stats.figures_unmapped += 1;
                    continue;
                }
            };

            let bbox = convert_to_yolo(figure.geometry.points.exterior, annotation.size);
            writeln!(writer, "{}", format_label_line(class_id, &bbox))?;
            stats.figures_written += 1;
        }
        writer.flush()?;
        stats.frames_written += 1;
    }

    Ok(stats)
}

/// Convert one video: read its annotation, open it through `open` and write
/// the dataset files under `output_base`.
///
/// The video handle lives only for the duration of this call.
pub fn convert_video<S, F>(
    video_path: &Path,
    annotation_path: &Path,
    output_base: &Path,
    open: F,
) -> Result<(ConversionStats, ClassMap)>
where
    S: FrameSource,
    F: FnOnce(&Path) -> Result<S>,
{
    let annotation = read_annotation(annotation_path)?;
    let class_map = ClassMap::from_objects(&annotation.objects);
    let mut source = open(video_path)?;
    let stats = create_yolo_labels(&mut source, &annotation, &class_map, output_base)?;
    Ok((stats, class_map))
}
