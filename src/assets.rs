//! Font asset staging.
//!
//! The charset mapping files are read from a directory. Either the user names
//! one, or the archive bundled into the binary is unpacked into a fresh
//! temporary directory. Entries are extracted in parallel on blocking threads,
//! at most [`StageConfig::max_concurrent_extractions`] at a time.

use crate::config::StageConfig;
use crate::error::{Error, IoContext, Result};
use bytes::Bytes;
use std::fs;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use zip::ZipArchive;

#[cfg(feature = "bundled-fonts")]
static BUNDLED_FONT_ARCHIVE: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/fontdir.zip"));

/// The font archive compiled into the binary, if any.
pub fn bundled_archive() -> Option<&'static [u8]> {
    #[cfg(feature = "bundled-fonts")]
    {
        Some(BUNDLED_FONT_ARCHIVE)
    }
    #[cfg(not(feature = "bundled-fonts"))]
    {
        None
    }
}

/// Directory holding the charset mapping files.
///
/// A staged directory is removed by [`FontDir::close`], or when dropped.
/// A directory named by the user is never touched.
#[derive(Debug)]
pub struct FontDir {
    path: PathBuf,
    temp: Option<tempfile::TempDir>,
}

impl FontDir {
    /// Use an existing directory as is.
    pub fn existing(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            temp: None,
        }
    }

    fn staged(temp: tempfile::TempDir) -> Self {
        Self {
            path: temp.path().to_path_buf(),
            temp: Some(temp),
        }
    }

    /// Directory path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the directory was created by staging.
    pub fn is_staged(&self) -> bool {
        self.temp.is_some()
    }

    /// Remove a staged directory; no-op for an existing one.
    pub fn close(self) -> Result<()> {
        match self.temp {
            Some(temp) => {
                let path = self.path;
                temp.close()
                    .context(|| format!("error removing font dir {:?}", path))?;
                log::debug!("removed font dir {:?}", path);
                Ok(())
            },
            None => Ok(()),
        }
    }
}

/// Outcome of an archive extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtractStats {
    /// Files written
    pub extracted: usize,
    /// Largest number of extraction tasks observed running at once
    pub peak_active: usize,
}

/// Resolve the font directory.
///
/// `fontdir` is used unmodified when given; otherwise the bundled archive is
/// staged into a temporary directory.
pub fn stage_font_dir(fontdir: Option<&Path>, config: &StageConfig) -> Result<FontDir> {
    if let Some(path) = fontdir {
        log::debug!("using font dir {:?}", path);
        return Ok(FontDir::existing(path));
    }

    let archive = bundled_archive().ok_or_else(|| {
        Error::NoFontAssets("built without the bundled-fonts feature".to_string())
    })?;
    let (dir, _stats) = stage_archive(Bytes::from_static(archive), config)?;
    Ok(dir)
}

/// Unpack `archive` into a new temporary directory.
///
/// On failure the directory is removed before the error is returned.
pub fn stage_archive(archive: Bytes, config: &StageConfig) -> Result<(FontDir, ExtractStats)> {
    let temp = tempfile::Builder::new()
        .prefix(&config.temp_prefix)
        .tempdir()
        .context(|| "cannot create temp dir for fonts")?;

    match extract_archive(archive, temp.path(), config.max_concurrent_extractions) {
        Ok(stats) => {
            log::info!(
                "extracted {} font files to {:?} (at most {} at once)",
                stats.extracted,
                temp.path(),
                stats.peak_active
            );
            Ok((FontDir::staged(temp), stats))
        },
        Err(err) => {
            if let Err(close_err) = temp.close() {
                log::warn!("error removing partially staged font dir: {}", close_err);
            }
            Err(err)
        },
    }
}

/// Extract every file entry of `archive` into `dest`.
///
/// Runs a small Tokio runtime; each entry is copied on a blocking thread once
/// it holds one of `max_concurrent` semaphore permits. All tasks are awaited
/// even after a failure, and the first failure is returned.
pub fn extract_archive(archive: Bytes, dest: &Path, max_concurrent: usize) -> Result<ExtractStats> {
    let zip = ZipArchive::new(Cursor::new(archive))?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("csv2pdf-extract")
        .max_blocking_threads(max_concurrent.max(1))
        .build()
        .context(|| "cannot start extraction runtime")?;

    runtime.block_on(extract_all(zip, dest.to_path_buf(), max_concurrent.max(1)))
}

/// Extraction task counters shared by all tasks.
#[derive(Debug, Default)]
struct Activity {
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl Activity {
    fn enter(&self) {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn extract_all(
    zip: ZipArchive<Cursor<Bytes>>,
    dest: PathBuf,
    max_concurrent: usize,
) -> Result<ExtractStats> {
    let semaphore = Arc::new(Semaphore::new(max_concurrent));
    let activity = Arc::new(Activity::default());
    let mut tasks = JoinSet::new();

    for index in 0..zip.len() {
        let semaphore = Arc::clone(&semaphore);
        let activity = Arc::clone(&activity);
        let mut zip = zip.clone();
        let dest = dest.clone();

        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.map_err(|_| Error::Extraction {
                entry: format!("#{}", index),
                reason: "extraction semaphore closed".to_string(),
            })?;
            tokio::task::spawn_blocking(move || {
                activity.enter();
                let result = extract_entry(&mut zip, index, &dest);
                activity.leave();
                result
            })
            .await
            .map_err(|e| Error::Extraction {
                entry: format!("#{}", index),
                reason: format!("task failed: {}", e),
            })?
        });
    }

    let mut stats = ExtractStats::default();
    let mut first_error: Option<Error> = None;
    while let Some(joined) = tasks.join_next().await {
        let outcome = joined.map_err(|e| Error::Extraction {
            entry: "?".to_string(),
            reason: format!("task failed: {}", e),
        });
        match outcome.and_then(|r| r) {
            Ok(true) => stats.extracted += 1,
            Ok(false) => {},
            Err(err) => {
                log::error!("{}", err);
                first_error.get_or_insert(err);
            },
        }
    }

    stats.peak_active = activity.peak.load(Ordering::SeqCst);
    match first_error {
        Some(err) => Err(err),
        None => Ok(stats),
    }
}

/// Copy one entry; `Ok(false)` for directory entries.
fn extract_entry(zip: &mut ZipArchive<Cursor<Bytes>>, index: usize, dest: &Path) -> Result<bool> {
    let mut entry = zip.by_index(index).map_err(|e| Error::Extraction {
        entry: format!("#{}", index),
        reason: e.to_string(),
    })?;
    let name = entry.name().to_string();
    if entry.is_dir() {
        return Ok(false);
    }

    let extraction_error = |reason: String| Error::Extraction {
        entry: name.clone(),
        reason,
    };
    let relative = entry
        .enclosed_name()
        .ok_or_else(|| extraction_error("path escapes the target directory".to_string()))?;
    let target = dest.join(relative);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| extraction_error(format!("error creating {:?}: {}", parent, e)))?;
    }

    let mut out = fs::File::create(&target)
        .map_err(|e| extraction_error(format!("error creating {:?}: {}", target, e)))?;
    log::debug!("copying {} to {:?}", name, target);
    io::copy(&mut entry, &mut out)
        .map_err(|e| extraction_error(format!("error copying: {}", e)))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn archive(entries: &[(&str, &[u8])]) -> Bytes {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut buf);
            for (name, data) in entries {
                if name.ends_with('/') {
                    zip.add_directory(*name, SimpleFileOptions::default()).unwrap();
                } else {
                    zip.start_file(*name, SimpleFileOptions::default()).unwrap();
                    zip.write_all(data).unwrap();
                }
            }
            zip.finish().unwrap();
        }
        Bytes::from(buf.into_inner())
    }

    #[test]
    fn test_existing_dir_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let font_dir = stage_font_dir(Some(dir.path()), &StageConfig::default()).unwrap();
        assert!(!font_dir.is_staged());
        assert_eq!(font_dir.path(), dir.path());
        font_dir.close().unwrap();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_extract_files_and_skip_dirs() {
        let dest = tempfile::tempdir().unwrap();
        let data = archive(&[("a.map", b"A"), ("sub/", b""), ("sub/b.map", b"BB")]);
        let stats = extract_archive(data, dest.path(), 4).unwrap();

        assert_eq!(stats.extracted, 2);
        assert_eq!(fs::read(dest.path().join("a.map")).unwrap(), b"A");
        assert_eq!(fs::read(dest.path().join("sub/b.map")).unwrap(), b"BB");
    }

    #[test]
    fn test_peak_bounded_by_permits() {
        let dest = tempfile::tempdir().unwrap();
        let names: Vec<String> = (0..12).map(|i| format!("f{}.map", i)).collect();
        let entries: Vec<(&str, &[u8])> = names.iter().map(|n| (n.as_str(), &b"x"[..])).collect();
        let stats = extract_archive(archive(&entries), dest.path(), 1).unwrap();

        assert_eq!(stats.extracted, 12);
        assert_eq!(stats.peak_active, 1);
    }

    #[test]
    fn test_stage_archive_failure_removes_dir() {
        let prefix = format!("csv2pdf-test-{}-", std::process::id());
        let config = StageConfig::default().with_temp_prefix(prefix.clone());
        let data = archive(&[("ok.map", b"1"), ("../evil.map", b"2")]);

        let err = stage_archive(data, &config).unwrap_err();
        assert!(matches!(err, Error::Extraction { ref entry, .. } if entry == "../evil.map"));

        let leftovers = fs::read_dir(std::env::temp_dir())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(&prefix))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_invalid_archive() {
        let dest = tempfile::tempdir().unwrap();
        let err = extract_archive(Bytes::from_static(b"not a zip"), dest.path(), 2).unwrap_err();
        assert!(matches!(err, Error::Archive(_)));
    }

    #[cfg(feature = "bundled-fonts")]
    #[test]
    fn test_bundled_archive_stages_maps() {
        let font_dir = stage_font_dir(None, &StageConfig::default()).unwrap();
        assert!(font_dir.is_staged());
        let path = font_dir.path().to_path_buf();
        assert!(path.join("iso-8859-2.map").is_file());
        assert!(path.join("windows-1252.map").is_file());

        font_dir.close().unwrap();
        assert!(!path.exists());
    }
}
