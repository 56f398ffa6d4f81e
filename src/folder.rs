//! Folder Wiper.
//!
//! Post-order depth-first traversal: every regular file is overwritten
//! before any directory is removed, and directories are removed bottom-up
//! with the root last.

use crate::cancel::CancelToken;
use crate::error::{WipeError, WipeResult};
use crate::overwrite;
use crate::pattern::PatternSource;
use crate::progress::ProgressSink;
use crate::report::{FileWipeOutcome, WipeMethod};
use std::path::{Path, PathBuf};

pub struct FolderWipeResult {
    pub files: Vec<FileWipeOutcome>,
    pub directory_removed: bool,
    pub skipped_entries: Vec<String>,
    /// Regular files discovered during the walk, before any were wiped.
    pub items_discovered: u64,
    /// Set when the walk stopped early on cancellation; `files` then holds
    /// only the outcomes completed before the cancel was observed, and the
    /// root directory is left in place.
    pub cancelled: bool,
}

/// Walk `root` post-order: every regular file is overwritten before any
/// directory is removed, and directories are removed bottom-up, root last.
pub fn wipe_folder(
    root: &Path,
    method: WipeMethod,
    verify: bool,
    rng: &PatternSource,
    cancel: &CancelToken,
    progress: &mut dyn ProgressSink,
) -> WipeResult<FolderWipeResult> {
    if !root.is_dir() {
        return Err(WipeError::NotADirectory(root.display().to_string()));
    }

    let mut files = Vec::new();
    let mut dirs_bottom_up = Vec::new();
    let mut skipped = Vec::new();

    walk(root, &mut files, &mut dirs_bottom_up, &mut skipped)?;

    let items_discovered = files.len() as u64;
    let total = files.len().max(1);
    let mut outcomes = Vec::with_capacity(files.len());
    let mut was_cancelled = false;
    for (idx, file_path) in files.into_iter().enumerate() {
        if cancel.is_cancelled() {
            was_cancelled = true;
            break;
        }
        progress.on_progress(
            idx as f64 / total as f64 * 100.0,
            &format!("wiping {}", file_path.display()),
        );
        match overwrite::overwrite(&file_path, method, verify, rng, cancel, progress) {
            Ok(outcome) => {
                if outcome.status == crate::report::FileWipeStatus::Cancelled {
                    was_cancelled = true;
                    outcomes.push(outcome);
                    break;
                }
                outcomes.push(outcome);
            }
            Err(e) => {
                log::warn!("failed to wipe {}: {e}", file_path.display());
                skipped.push(file_path.display().to_string());
            }
        }
    }

    if was_cancelled {
        return Ok(FolderWipeResult {
            files: outcomes,
            directory_removed: false,
            skipped_entries: skipped,
            items_discovered,
            cancelled: true,
        });
    }

    // Remove directories bottom-up; permission denials are recorded, not fatal.
    for dir in &dirs_bottom_up {
        if dir == root {
            continue;
        }
        if let Err(e) = std::fs::remove_dir(dir) {
            log::warn!("could not remove directory {}: {e}", dir.display());
            skipped.push(dir.display().to_string());
        }
    }

    let directory_removed = match std::fs::remove_dir(root) {
        Ok(()) => true,
        Err(_) => !root.exists(),
    };

    if !directory_removed {
        return Err(WipeError::DirectoryNotRemoved(root.display().to_string()));
    }

    Ok(FolderWipeResult {
        files: outcomes,
        directory_removed,
        skipped_entries: skipped,
        items_discovered,
        cancelled: false,
    })
}

fn walk(
    dir: &Path,
    files: &mut Vec<PathBuf>,
    dirs_bottom_up: &mut Vec<PathBuf>,
    skipped: &mut Vec<String>,
) -> WipeResult<()> {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            log::warn!("could not read directory {}: {e}", dir.display());
            skipped.push(dir.display().to_string());
            dirs_bottom_up.push(dir.to_path_buf());
            return Ok(());
        }
    };

    let mut subdirs = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(_) => continue,
        };

        if file_type.is_dir() {
            subdirs.push(path);
        } else if file_type.is_file() {
            files.push(path);
        }
        // symlinks and other special entries are neither wiped nor walked.
    }

    for subdir in subdirs {
        walk(&subdir, files, dirs_bottom_up, skipped)?;
    }

    dirs_bottom_up.push(dir.to_path_buf());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullSink;
    use tempfile::tempdir;

    #[test]
    fn wipes_nested_files_and_removes_directory() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("payload");
        std::fs::create_dir_all(root.join("sub")).unwrap();
        std::fs::write(root.join("a.txt"), b"hello").unwrap();
        std::fs::write(root.join("sub/b.txt"), b"world").unwrap();
        std::fs::create_dir_all(root.join("empty_sub")).unwrap();

        let rng = PatternSource::new();
        let cancel = CancelToken::new();
        let mut sink = NullSink;
        let result = wipe_folder(&root, WipeMethod::Nist, true, &rng, &cancel, &mut sink).unwrap();

        assert!(result.directory_removed);
        assert_eq!(result.files.len(), 2);
        assert!(!root.exists());
    }

    #[test]
    fn empty_directory_is_removed() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("empty");
        std::fs::create_dir(&root).unwrap();

        let rng = PatternSource::new();
        let cancel = CancelToken::new();
        let mut sink = NullSink;
        let result = wipe_folder(&root, WipeMethod::Quick, false, &rng, &cancel, &mut sink).unwrap();

        assert!(result.directory_removed);
        assert!(result.files.is_empty());
    }

    #[test]
    fn non_directory_target_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("file.txt");
        std::fs::write(&path, b"x").unwrap();

        let rng = PatternSource::new();
        let cancel = CancelToken::new();
        let mut sink = NullSink;
        let result = wipe_folder(&path, WipeMethod::Quick, false, &rng, &cancel, &mut sink);
        assert!(matches!(result, Err(WipeError::NotADirectory(_))));
    }
}
