#![forbid(unsafe_code)]

//! Storage for the "has the user seen onboarding" flag.
//!
//! The flag is owned by the host, not by the tour. The walkthrough in
//! [`crate::onboarding`] reads it to decide whether to open on first run and
//! writes it when the user finishes or dismisses the walkthrough.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `TourError::Io` | File I/O failure | Returned; previous file untouched |
//! | `TourError::Corruption` | Unreadable JSON | Returned from `load` |
//! | Missing file | First run | `load` returns `false` |
//! | Format version mismatch | Older/newer build | Logged, treated as unseen |

use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{TourError, TourResult};

/// Pluggable backend for the seen flag.
pub trait SeenFlag: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Read the flag. Returns `false` when nothing was stored yet.
    fn load(&self) -> TourResult<bool>;

    fn store(&self, seen: bool) -> TourResult<()>;
}

/// In-memory flag for tests and hosts without persistence.
#[derive(Debug, Default)]
pub struct MemorySeenFlag {
    seen: AtomicBool,
}

impl MemorySeenFlag {
    #[must_use]
    pub fn new(seen: bool) -> Self {
        Self {
            seen: AtomicBool::new(seen),
        }
    }
}

impl SeenFlag for MemorySeenFlag {
    fn name(&self) -> &str {
        "MemorySeenFlag"
    }

    fn load(&self) -> TourResult<bool> {
        Ok(self.seen.load(Ordering::Acquire))
    }

    fn store(&self, seen: bool) -> TourResult<()> {
        self.seen.store(seen, Ordering::Release);
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct FlagFile {
    format_version: u32,
    onboarding_seen: bool,
}

impl FlagFile {
    const FORMAT_VERSION: u32 = 1;
}

/// JSON file backend.
///
/// ```json
/// { "format_version": 1, "onboarding_seen": true }
/// ```
///
/// Writes go to `{path}.tmp` first and are renamed into place, so a crash
/// mid-write leaves the previous file intact.
pub struct FileSeenFlag {
    path: PathBuf,
}

impl FileSeenFlag {
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// `$XDG_STATE_HOME/icl-tour/{app_name}/onboarding.json`, falling back
    /// to `~/.local/state` and then the current directory.
    #[must_use]
    pub fn default_for_app(app_name: &str) -> Self {
        let path = state_dir()
            .join("icl-tour")
            .join(app_name)
            .join("onboarding.json");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone();
        tmp.set_extension("json.tmp");
        tmp
    }
}

fn state_dir() -> PathBuf {
    if let Ok(state_home) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(state_home);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local").join("state");
    }
    PathBuf::from(".")
}

impl SeenFlag for FileSeenFlag {
    fn name(&self) -> &str {
        "FileSeenFlag"
    }

    fn load(&self) -> TourResult<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        let reader = BufReader::new(File::open(&self.path)?);
        let file: FlagFile = serde_json::from_reader(reader)
            .map_err(|e| TourError::Corruption(format!("{}: {e}", self.path.display())))?;
        if file.format_version != FlagFile::FORMAT_VERSION {
            warn!(
                stored = file.format_version,
                expected = FlagFile::FORMAT_VERSION,
                "onboarding flag format mismatch, treating as unseen"
            );
            return Ok(false);
        }
        Ok(file.onboarding_seen)
    }

    fn store(&self, seen: bool) -> TourResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = FlagFile {
            format_version: FlagFile::FORMAT_VERSION,
            onboarding_seen: seen,
        };
        let tmp_path = self.temp_path();
        {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            serde_json::to_writer_pretty(&mut writer, &file)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        debug!(path = %self.path.display(), seen, "stored onboarding flag");
        Ok(())
    }
}

impl fmt::Debug for FileSeenFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSeenFlag")
            .field("path", &self.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_flag_round_trip() {
        let flag = MemorySeenFlag::default();
        assert!(!flag.load().expect("load"));
        flag.store(true).expect("store");
        assert!(flag.load().expect("load"));
    }

    #[test]
    fn missing_file_means_unseen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let flag = FileSeenFlag::new(dir.path().join("nested").join("flag.json"));
        assert!(!flag.load().expect("load"));
    }

    #[test]
    fn file_flag_persists_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state").join("onboarding.json");
        FileSeenFlag::new(&path).store(true).expect("store");
        assert!(FileSeenFlag::new(&path).load().expect("load"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn garbage_file_is_corruption() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("onboarding.json");
        fs::write(&path, "not json").expect("write");
        let err = FileSeenFlag::new(&path).load().unwrap_err();
        assert!(matches!(err, TourError::Corruption(_)));
    }

    #[test]
    fn version_mismatch_reads_as_unseen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("onboarding.json");
        fs::write(&path, r#"{"format_version": 99, "onboarding_seen": true}"#).expect("write");
        assert!(!FileSeenFlag::new(&path).load().expect("load"));
    }
}
