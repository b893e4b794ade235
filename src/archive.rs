//! Archive handling around the conversion: unpacking the input tar and
//! zipping the produced dataset.

use flate2::read::GzDecoder;
use jwalk::WalkDir;
use log::info;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{ConvertError, Result};
use crate::utils::{infer_archive_compression, ArchiveCompression};

/// Unpack `archive_path` into `output_dir`, creating it if needed.
///
/// Plain and gzip-compressed tar archives are accepted. When `delete_archive`
/// is set the source archive is removed once extraction succeeded. Nothing
/// already written is cleaned up if extraction fails halfway.
pub fn extract_archive(
    archive_path: &Path,
    output_dir: &Path,
    delete_archive: bool,
) -> Result<PathBuf> {
    let extraction_error = |source: io::Error| ConvertError::Extraction {
        path: archive_path.to_path_buf(),
        source,
    };

    fs::create_dir_all(output_dir).map_err(extraction_error)?;

    let mut file = File::open(archive_path).map_err(extraction_error)?;
    let mut header = [0u8; 2];
    let read = file.read(&mut header).map_err(extraction_error)?;
    file.seek(SeekFrom::Start(0)).map_err(extraction_error)?;

    info!(
        "Extracting '{}' to '{}'.",
        archive_path.display(),
        output_dir.display()
    );
    let reader = BufReader::new(file);
    match infer_archive_compression(&header[..read]) {
        ArchiveCompression::Gzip => tar::Archive::new(GzDecoder::new(reader)).unpack(output_dir),
        ArchiveCompression::None => tar::Archive::new(reader).unpack(output_dir),
    }
    .map_err(extraction_error)?;

    if delete_archive {
        info!("Deleting archive: '{}'.", archive_path.display());
        fs::remove_file(archive_path)?;
    }

    Ok(output_dir.to_path_buf())
}

/// Path of the zip written for `folder`: the folder path with `.zip` appended
pub fn zip_path_for(folder: &Path) -> PathBuf {
    let mut name = folder.as_os_str().to_owned();
    name.push(".zip");
    PathBuf::from(name)
}

/// Zip the contents of `folder` into `<folder>.zip` beside it.
///
/// Entry names are relative to `folder` and use `/` separators. Entries are
/// written in sorted order so the same tree always gives the same archive.
pub fn compress_folder(folder: &Path) -> Result<PathBuf> {
    let zip_path = zip_path_for(folder);
    info!(
        "Compressing folder '{}' to '{}'.",
        folder.display(),
        zip_path.display()
    );

    let mut zip = ZipWriter::new(BufWriter::new(File::create(&zip_path)?));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in WalkDir::new(folder).sort(true).skip_hidden(false) {
        let entry = entry.map_err(|e| ConvertError::Io(io::Error::new(io::ErrorKind::Other, e)))?;
        if entry.depth == 0 {
            continue;
        }
        let path = entry.path();
        let name = entry_name(folder, &path);

        if entry.file_type().is_dir() {
            zip.add_directory(name, options)?;
        } else if entry.file_type().is_file() {
            zip.start_file(name, options)?;
            let mut source = File::open(&path)?;
            io::copy(&mut source, &mut zip)?;
        }
    }

    zip.finish()?;
    Ok(zip_path)
}

fn entry_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Recursively delete a directory tree, logging what is removed
pub fn remove_path(path: &Path, what: &str) -> Result<()> {
    info!("Deleting {}: '{}'.", what, path.display());
    fs::remove_dir_all(path)?;
    Ok(())
}
