//! Size-rotated log file used as the `tracing` output when a log file is
//! configured.
//!
//! When the file grows past its size limit it is shifted to `<name>.1`, earlier
//! backups move up by one (`.1` → `.2`, ...) and the oldest beyond the retention
//! count is dropped.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Default maximum file size before rotation (10 MB).
const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Default number of rotated backups kept.
const MAX_BACKUP_FILES: usize = 3;

struct Inner {
    file: Option<File>,
    written: u64,
}

/// A log file that rotates itself by size.
///
/// `&RotatingLog` implements [`Write`], so an `Arc<RotatingLog>` can be handed
/// straight to `tracing_subscriber::fmt().with_writer(..)`.
pub struct RotatingLog {
    path: PathBuf,
    max_bytes: u64,
    backups: usize,
    inner: Mutex<Inner>,
}

impl RotatingLog {
    /// Creates a log at `path` with the default limits. The file is opened on
    /// first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_limits(path, MAX_FILE_SIZE_BYTES, MAX_BACKUP_FILES)
    }

    /// Creates a log with explicit rotation limits.
    #[must_use]
    pub fn with_limits(path: impl Into<PathBuf>, max_bytes: u64, backups: usize) -> Self {
        Self {
            path: path.into(),
            max_bytes,
            backups,
            inner: Mutex::new(Inner { file: None, written: 0 }),
        }
    }

    /// Path of the live log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    fn open(&self, inner: &mut Inner) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        inner.written = file.metadata().map(|m| m.len()).unwrap_or(0);
        inner.file = Some(file);
        Ok(())
    }

    fn rotate(&self, inner: &mut Inner) -> io::Result<()> {
        inner.file = None;
        if self.backups == 0 {
            fs::remove_file(&self.path)?;
        } else {
            match fs::remove_file(self.backup_path(self.backups)) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e),
                _ => {}
            }
            for index in (1..self.backups).rev() {
                let from = self.backup_path(index);
                if from.exists() {
                    fs::rename(&from, self.backup_path(index + 1))?;
                }
            }
            fs::rename(&self.path, self.backup_path(1))?;
        }
        self.open(inner)
    }

    fn write_locked(&self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("log mutex poisoned: {e}")))?;

        if inner.file.is_none() {
            self.open(&mut inner)?;
        }
        if inner.written > 0 && inner.written + buf.len() as u64 > self.max_bytes {
            self.rotate(&mut inner)?;
        }

        let file = inner
            .file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "log file unavailable"))?;
        file.write_all(buf)?;
        inner.written += buf.len() as u64;
        Ok(buf.len())
    }
}

impl Write for &RotatingLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_locked(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("log mutex poisoned: {e}")))?;
        match inner.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for RotatingLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingLog")
            .field("path", &self.path)
            .field("max_bytes", &self.max_bytes)
            .field("backups", &self.backups)
            .finish_non_exhaustive()
    }
}
