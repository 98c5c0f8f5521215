//! Filesystem workload module
//!
//! Responsible for:
//! - Measuring the total size of a directory tree
//! - Emptying a directory while keeping the directory itself
//! - Appending size records to the destination log

use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::Path;

use crate::constants::SIZE_LOG_NAME;
use crate::models::LogRecord;

/// The work performed on each scheduler cycle.
///
/// Implementations must not assume they run concurrently with each other;
/// the scheduler calls them one at a time.
pub trait Workload {
    /// Total size in bytes of the regular files below `path`, counting
    /// symlinks to files by their target
    fn measure(&self, path: &Path) -> io::Result<u64>;

    /// Remove every entry directly inside `path`, keeping `path` itself
    fn purge(&self, path: &Path) -> io::Result<()>;
}

/// Workload operating on the local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectoryWorkload;

impl Workload for DirectoryWorkload {
    fn measure(&self, path: &Path) -> io::Result<u64> {
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(0),
            Err(err) => return Err(err),
        };

        if !metadata.is_dir() {
            return Ok(metadata.len());
        }

        directory_size(path)
    }

    fn purge(&self, path: &Path) -> io::Result<()> {
        let entries = match fs::read_dir(path) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(err),
        };

        let mut first_error = None;
        for entry in entries {
            let result = entry.and_then(|entry| {
                // file_type() does not follow symlinks, so a link to a
                // directory is unlinked rather than traversed
                if entry.file_type()?.is_dir() {
                    fs::remove_dir_all(entry.path())
                } else {
                    fs::remove_file(entry.path())
                }
            });

            if let Err(err) = result {
                log::warn!("Failed to remove entry in {}: {}", path.display(), err);
                first_error.get_or_insert(err);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Recursive size of a directory.
///
/// Only listing the root itself can fail; unreadable or vanished entries
/// below it are skipped so a busy source still yields a size.
fn directory_size(path: &Path) -> io::Result<u64> {
    tree_size(path, &|dir: &Path| fs::read_dir(dir))
}

fn tree_size<L>(path: &Path, list: &L) -> io::Result<u64>
where
    L: Fn(&Path) -> io::Result<fs::ReadDir>,
{
    let mut total = 0;

    for entry in list(path)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log::debug!("Skipping unreadable entry in {}: {}", path.display(), err);
                continue;
            }
        };

        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(_) => continue,
        };

        if file_type.is_dir() {
            match tree_size(&entry.path(), list) {
                Ok(size) => total += size,
                Err(err) => {
                    log::debug!("Skipping directory {}: {}", entry.path().display(), err);
                }
            }
        } else if file_type.is_file() {
            // Files can vanish between listing and stat
            if let Ok(metadata) = entry.metadata() {
                total += metadata.len();
            }
        } else if file_type.is_symlink() {
            // Links to files count the target; links to directories are not descended
            if let Ok(metadata) = fs::metadata(entry.path()) {
                if metadata.is_file() {
                    total += metadata.len();
                }
            }
        }
    }

    Ok(total)
}

/// Append one record line to `<dest_dir>/size.log`, creating the file if needed
pub fn append_record(dest_dir: &Path, record: &LogRecord) -> io::Result<()> {
    let log_path = dest_dir.join(SIZE_LOG_NAME);
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    writeln!(file, "{}", record)?;
    file.flush()
}
