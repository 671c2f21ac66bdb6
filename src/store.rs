use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;

use crate::error::{Result, SicoError};
use crate::importer::ShapeKind;
use crate::models::LongRow;
use crate::reshaper::parse_total;

pub const DATE_HEADER: &str = "data";

fn parse_snapshot_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        // "YYYY-MM-DD HH:MM:SS" from older writers.
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date())
        })
        .map_err(|_| SicoError::InvalidDate(raw.to_string()))
}

/// Read the long table previously written for `kind`.
/// A missing file is an empty snapshot.
pub fn read_snapshot(path: &Path, kind: ShapeKind) -> Result<Vec<LongRow>> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "no previous snapshot");
        return Ok(Vec::new());
    }
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    let headers = rdr.headers()?.clone();
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}') == name)
            .ok_or_else(|| SicoError::MissingColumn(format!("{name} in {}", path.display())))
    };
    let date_idx = find(DATE_HEADER)?;
    let category_idx = kind.category_header().map(find).transpose()?;
    let total_idx = find(kind.total_header())?;

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let date = parse_snapshot_date(record.get(date_idx).unwrap_or(""))?;
        let category = category_idx.map(|i| record.get(i).unwrap_or("").to_string());
        let raw_total = record.get(total_idx).unwrap_or("");
        let total = parse_total(raw_total, &format!("{date} in {}", path.display()))?;
        rows.push(LongRow { date, category, total });
    }
    tracing::debug!(path = %path.display(), rows = rows.len(), "snapshot loaded");
    Ok(rows)
}

pub fn write_rows<W: Write>(writer: W, kind: ShapeKind, rows: &[LongRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut header = vec![DATE_HEADER];
    header.extend(kind.category_header());
    header.push(kind.total_header());
    wtr.write_record(&header)?;
    for row in rows {
        let date = row.date.format("%Y-%m-%d").to_string();
        let total = row.total.to_string();
        match (&row.category, kind.category_header()) {
            (Some(category), Some(_)) => wtr.write_record([&date, category, &total])?,
            _ => wtr.write_record([&date, &total])?,
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Replace `path` with the rendered rows. The file is written next to the
/// target and renamed, so a failed run leaves the old file untouched.
pub fn write_output(path: &Path, kind: ShapeKind, rows: &[LongRow]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| SicoError::Other(format!("No parent directory for {}", path.display())))?;
    std::fs::create_dir_all(dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    write_rows(&mut tmp, kind, rows)?;
    // The temp file is created owner-only; keep the target's mode instead.
    tmp.as_file().set_permissions(output_permissions(path)?)?;
    tmp.persist(path).map_err(|e| SicoError::Io(e.error))?;
    Ok(())
}

fn output_permissions(path: &Path) -> Result<std::fs::Permissions> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok(meta.permissions()),
        Err(_) => new_file_permissions(path),
    }
}

#[cfg(unix)]
fn new_file_permissions(_path: &Path) -> Result<std::fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Ok(std::fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions(path: &Path) -> Result<std::fs::Permissions> {
    let mut perms = std::fs::metadata(path.parent().unwrap_or(path))?.permissions();
    perms.set_readonly(false);
    Ok(perms)
}

/// Drop rows dated `today` (same-day counts are provisional).
/// Returns the kept rows and how many were removed.
pub fn drop_today(rows: Vec<LongRow>, today: NaiveDate) -> (Vec<LongRow>, usize) {
    let before = rows.len();
    let kept: Vec<LongRow> = rows.into_iter().filter(|r| r.date != today).collect();
    let removed = before - kept.len();
    if removed > 0 {
        tracing::info!(%today, removed, "dropped rows dated today");
    }
    (kept, removed)
}
