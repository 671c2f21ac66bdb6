use std::path::{Path, PathBuf};

use crate::error::{Result, SicoError};

pub const DOWNLOAD_PATTERN: &str = "Dados_SICO_*.csv";

pub fn list_downloads(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = dir.join(DOWNLOAD_PATTERN);
    let mut found: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())?
        .filter_map(|entry| entry.ok())
        .filter(|p| p.is_file())
        .collect();
    found.sort();
    Ok(found)
}

/// The single download waiting in `dir`. Zero or several candidates are
/// errors; the directory has to be cleared by hand.
pub fn find_download(dir: &Path) -> Result<PathBuf> {
    let mut found = list_downloads(dir)?;
    match found.len() {
        0 => Err(SicoError::NoDownload { dir: dir.to_path_buf() }),
        1 => Ok(found.remove(0)),
        count => Err(SicoError::MultipleDownloads { dir: dir.to_path_buf(), count }),
    }
}

/// `<archive>/<output name without .csv>/<download file name>`
pub fn archive_destination(archive_dir: &Path, output_name: &str, source: &Path) -> Result<PathBuf> {
    let stem = output_name.strip_suffix(".csv").unwrap_or(output_name);
    let file_name = source
        .file_name()
        .ok_or_else(|| SicoError::Other(format!("Not a file: {}", source.display())))?;
    Ok(archive_dir.join(stem).join(file_name))
}

pub fn archive_download(source: &Path, archive_dir: &Path, output_name: &str) -> Result<PathBuf> {
    let dest = archive_destination(archive_dir, output_name, source)?;
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if std::fs::rename(source, &dest).is_err() {
        // Downloads and the data repo may sit on different filesystems.
        std::fs::copy(source, &dest)?;
        std::fs::remove_file(source)?;
    }
    tracing::debug!(from = %source.display(), to = %dest.display(), "archived download");
    Ok(dest)
}
