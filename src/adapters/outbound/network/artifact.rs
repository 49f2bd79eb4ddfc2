use crate::shared::error::FenceError;
use crate::shared::security::sanitize_archive_path;
use crate::shared::Result;
use anyhow::Context;
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};

/// Archive formats distribution artifacts are published in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// Wheels, eggs and zip sdists
    Zip,
    /// gzip-compressed tar sdists
    TarGz,
}

impl ArchiveFormat {
    /// Detects the format from an artifact file name
    pub fn from_filename(filename: &str) -> Option<Self> {
        let lower = filename.to_ascii_lowercase();
        if lower.ends_with(".whl") || lower.ends_with(".zip") || lower.ends_with(".egg") {
            Some(Self::Zip)
        } else if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
            Some(Self::TarGz)
        } else {
            None
        }
    }
}

/// Extracts an in-memory archive below `out_dir`
///
/// # Errors
/// Returns an error for corrupt archives and for entries whose path is
/// absolute or climbs out of `out_dir`
pub fn extract_archive(bytes: &[u8], format: ArchiveFormat, out_dir: &Path) -> Result<()> {
    match format {
        ArchiveFormat::Zip => extract_zip(bytes, out_dir),
        ArchiveFormat::TarGz => extract_tar_gz(bytes, out_dir),
    }
}

fn unsafe_entry(name: &str) -> FenceError {
    FenceError::SecurityError {
        path: PathBuf::from(name),
        reason: "archive entry escapes the extraction directory".to_string(),
        hint: "The distribution artifact may be malicious; it was not unpacked.".to_string(),
    }
}

fn extract_zip(bytes: &[u8], out_dir: &Path) -> Result<()> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).context("open zip")?;
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).context("zip entry")?;
        let name = file.name().to_string();
        let relative = sanitize_archive_path(&name).ok_or_else(|| unsafe_entry(&name))?;
        let out_path = out_dir.join(relative);
        if file.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out =
            File::create(&out_path).with_context(|| format!("create {}", out_path.display()))?;
        io::copy(&mut file, &mut out).with_context(|| format!("write {}", out_path.display()))?;
    }
    Ok(())
}

fn extract_tar_gz(bytes: &[u8], out_dir: &Path) -> Result<()> {
    let mut archive = tar::Archive::new(GzDecoder::new(Cursor::new(bytes)));
    for entry in archive.entries().context("read tar entries")? {
        let mut entry = entry.context("read tar entry")?;
        let entry_type = entry.header().entry_type();
        // links and devices carry no metadata we need
        if !entry_type.is_file() && !entry_type.is_dir() {
            continue;
        }
        let name = entry.path()?.to_string_lossy().into_owned();
        let relative = sanitize_archive_path(&name).ok_or_else(|| unsafe_entry(&name))?;
        let out_path = out_dir.join(relative);
        if entry_type.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out =
            File::create(&out_path).with_context(|| format!("create {}", out_path.display()))?;
        io::copy(&mut entry, &mut out).with_context(|| format!("write {}", out_path.display()))?;
    }
    Ok(())
}
