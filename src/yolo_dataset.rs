use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use indicatif::ProgressBar;
use log::{error, info, warn};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::archive::{compress_folder, extract_archive, remove_path};
use crate::config::Args;
use crate::conversion::{convert_video, IMAGES_DIR};
use crate::error::Result;
use crate::io::{collect_video_pairs, find_dataset_root};
use crate::types::{ConversionStats, RunSummary, VideoPair};
use crate::utils::{create_progress_bar, ensure_output_directory};
use crate::video::VideoBackend;

pub const DATASET_YAML: &str = "dataset.yaml";

// What happened to a single dataset folder
enum VideoOutcome {
    Converted(ConversionStats),
    Unresolved,
    Failed,
}

/// Directory a folder's frames are written to
pub fn output_base_for(args: &Args, folder: &Path) -> PathBuf {
    if args.separate_folders {
        let name = folder
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        args.output_root.join(sanitize_filename::sanitize(name))
    } else {
        args.output_root.clone()
    }
}

/// Class title as a YAML scalar. JSON string syntax is valid YAML, so titles
/// holding `:`, `#` or quotes stay intact.
pub fn yaml_quote(title: &str) -> String {
    serde_json::to_string(title).unwrap_or_else(|_| format!("\"{}\"", title))
}

/// Create the dataset.yaml file for YOLO training inside `output_base`
pub fn create_dataset_yaml(
    output_base: &Path,
    names: &BTreeMap<usize, String>,
) -> std::io::Result<()> {
    let dataset_yaml_path = output_base.join(DATASET_YAML);
    let mut dataset_yaml = BufWriter::new(File::create(&dataset_yaml_path)?);
    let absolute_path = fs::canonicalize(output_base)?;
    let mut yaml_content = format!(
        "path: {}\ntrain: {}\nval: {}\n",
        absolute_path.to_string_lossy(),
        IMAGES_DIR,
        IMAGES_DIR
    );
    yaml_content.push_str("\nnames:\n");
    for (id, label) in names {
        yaml_content.push_str(&format!("    {}: {}\n", id, yaml_quote(label)));
    }
    dataset_yaml.write_all(yaml_content.as_bytes())?;
    dataset_yaml.flush()
}

/// Merge one video's class names into the shared registry.
///
/// The first title registered for an id is kept.
pub fn register_class_names(registry: &DashMap<usize, String>, names: BTreeMap<usize, String>) {
    for (id, title) in names {
        match registry.entry(id) {
            Entry::Occupied(existing) => {
                if existing.get() != &title {
                    warn!(
                        "Class id {} is '{}' in one video and '{}' in another, keeping '{}'",
                        id,
                        existing.get(),
                        title,
                        existing.get()
                    );
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(title);
            }
        }
    }
}

fn process_pair<B: VideoBackend>(
    position: usize,
    total: usize,
    pair: &VideoPair,
    args: &Args,
    backend: &B,
    class_names: &DashMap<usize, String>,
    pb: &ProgressBar,
) -> VideoOutcome {
    let Some((video, annotation)) = pair.resolved() else {
        warn!(
            "Skipping {}: missing video or annotation file",
            pair.folder.display()
        );
        return VideoOutcome::Unresolved;
    };

    info!("Processing Video {} of {}", position, total);
    pb.set_message(pair.folder.display().to_string());
    let output_base = output_base_for(args, &pair.folder);
    let name = pair
        .folder
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| pair.folder.display().to_string());

    let converted = convert_video(video, annotation, &output_base, |path| backend.open(path))
        .and_then(|(stats, class_map)| {
            if args.dataset_yaml {
                if args.separate_folders {
                    create_dataset_yaml(&output_base, &class_map.names())?;
                } else {
                    register_class_names(class_names, class_map.names());
                }
            }
            Ok(stats)
        });

    match converted {
        Ok(stats) => {
            stats.print_summary(&name);
            VideoOutcome::Converted(stats)
        }
        Err(e) => {
            error!("Failed to convert {}: {}", pair.folder.display(), e);
            VideoOutcome::Failed
        }
    }
}

/// Whether videos are converted concurrently.
///
/// Merged output always runs sequentially: two videos sharing a frame index
/// write the same image and label paths, and only a sequential run keeps the
/// image and label of such a frame from the same video.
pub fn runs_in_parallel(args: &Args) -> bool {
    args.parallel && args.separate_folders
}

fn convert_pairs<B: VideoBackend>(
    pairs: &[VideoPair],
    args: &Args,
    backend: &B,
    class_names: &DashMap<usize, String>,
    pb: &ProgressBar,
) -> Vec<VideoOutcome> {
    let total = pairs.len();
    let run = |(idx, pair): (usize, &VideoPair)| {
        let outcome = process_pair(idx + 1, total, pair, args, backend, class_names, pb);
        pb.inc(1);
        outcome
    };

    if runs_in_parallel(args) {
        pairs.par_iter().enumerate().map(run).collect()
    } else {
        pairs.iter().enumerate().map(run).collect()
    }
}

/// Main pipeline: extract, convert every video, zip the result and clean up
pub fn process_dataset<B: VideoBackend>(args: &Args, backend: &B) -> Result<RunSummary> {
    let extracted_dir = extract_archive(&args.archive, &args.output_dir, args.delete_archive)?;
    let dataset_root = find_dataset_root(&extracted_dir)?;
    let pairs = collect_video_pairs(&dataset_root)?;
    info!(
        "Found {} video folders in {}",
        pairs.len(),
        dataset_root.display()
    );

    if args.parallel && !args.separate_folders {
        warn!("Merged output is written sequentially, ignoring --parallel");
    }
    ensure_output_directory(&args.output_root)?;

    let class_names = DashMap::new();
    let pb = create_progress_bar(pairs.len() as u64, "Videos");
    let outcomes = convert_pairs(&pairs, args, backend, &class_names, &pb);
    pb.finish_with_message("Video processing complete");

    let mut summary = RunSummary {
        videos_found: pairs.len(),
        ..RunSummary::default()
    };
    for outcome in &outcomes {
        match outcome {
            VideoOutcome::Converted(stats) => {
                summary.videos_converted += 1;
                summary.totals += stats;
            }
            VideoOutcome::Unresolved => summary.videos_unresolved += 1,
            VideoOutcome::Failed => summary.videos_failed += 1,
        }
    }

    if args.dataset_yaml && !args.separate_folders {
        info!("Creating dataset.yaml file...");
        let names: BTreeMap<usize, String> = class_names.into_iter().collect();
        create_dataset_yaml(&args.output_root, &names)?;
    }

    summary.archive_path = Some(compress_folder(&args.output_root)?);

    if args.delete_extracted {
        remove_path(&extracted_dir, "extracted folder")?;
    }
    // The output root may have lived inside the extracted folder
    if args.delete_output && args.output_root.exists() {
        remove_path(&args.output_root, "output folder after compression")?;
    }

    Ok(summary)
}
