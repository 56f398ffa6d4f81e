//! Filesystem Drive Wiper.
//!
//! A thin composition of the Folder Wiper over a mount point, plus a
//! residual sweep that re-walks and force-unlinks anything missed on the
//! first pass. The mount point itself is never removed.

use crate::cancel::CancelToken;
use crate::error::WipeResult;
use crate::folder::{self, FolderWipeResult};
use crate::pattern::PatternSource;
use crate::progress::ProgressSink;
use crate::report::{FileWipeOutcome, WipeMethod};
use std::path::Path;

pub struct VolumeWipeResult {
    pub files: Vec<FileWipeOutcome>,
    pub skipped_entries: Vec<String>,
    pub items_discovered: u64,
    pub cancelled: bool,
}

pub fn wipe_volume(
    mount_point: &Path,
    method: WipeMethod,
    verify: bool,
    rng: &PatternSource,
    cancel: &CancelToken,
    progress: &mut dyn ProgressSink,
) -> WipeResult<VolumeWipeResult> {
    let mut files = Vec::new();
    let mut skipped = Vec::new();
    let mut discovered = 0u64;

    let cancelled =
        wipe_contents_in_place(mount_point, method, verify, rng, cancel, progress, &mut files, &mut skipped, &mut discovered)?;

    // Residual sweep: re-walk and force-unlink anything that reappeared or
    // was missed on the first pass (e.g. a file created concurrently, or
    // one skipped due to a transient permission error). Skipped once the
    // first pass was itself cancelled.
    let cancelled = cancelled
        || wipe_contents_in_place(mount_point, method, verify, rng, cancel, progress, &mut files, &mut skipped, &mut discovered)?;

    Ok(VolumeWipeResult {
        files,
        skipped_entries: skipped,
        items_discovered: discovered,
        cancelled,
    })
}

/// Returns `true` if the walk stopped early on cancellation.
#[allow(clippy::too_many_arguments)]
fn wipe_contents_in_place(
    mount_point: &Path,
    method: WipeMethod,
    verify: bool,
    rng: &PatternSource,
    cancel: &CancelToken,
    progress: &mut dyn ProgressSink,
    files: &mut Vec<FileWipeOutcome>,
    skipped: &mut Vec<String>,
    discovered: &mut u64,
) -> WipeResult<bool> {
    if cancel.is_cancelled() {
        return Ok(true);
    }

    let entries = match std::fs::read_dir(mount_point) {
        Ok(e) => e,
        Err(_) => return Ok(false),
    };

    for entry in entries.flatten() {
        if cancel.is_cancelled() {
            return Ok(true);
        }

        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(_) => continue,
        };

        if file_type.is_dir() {
            match folder::wipe_folder(&path, method, verify, rng, cancel, progress) {
                Ok(FolderWipeResult { files: mut outcomes, skipped_entries, items_discovered, cancelled, .. }) => {
                    *discovered += items_discovered;
                    files.append(&mut outcomes);
                    skipped.extend(skipped_entries);
                    if cancelled {
                        return Ok(true);
                    }
                }
                Err(e) => {
                    log::warn!("failed to wipe subdirectory {}: {e}", path.display());
                    skipped.push(path.display().to_string());
                }
            }
        } else if file_type.is_file() {
            *discovered += 1;
            match crate::overwrite::overwrite(&path, method, verify, rng, cancel, progress) {
                Ok(outcome) => {
                    let was_cancelled = outcome.status == crate::report::FileWipeStatus::Cancelled;
                    files.push(outcome);
                    if was_cancelled {
                        return Ok(true);
                    }
                }
                Err(e) => {
                    log::warn!("failed to wipe {}: {e}", path.display());
                    skipped.push(path.display().to_string());
                }
            }
        }
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullSink;
    use tempfile::tempdir;

    #[test]
    fn wipes_volume_contents_leaving_mount_point() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.bin"), b"data").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/b.bin"), b"more data").unwrap();

        let rng = PatternSource::new();
        let cancel = CancelToken::new();
        let mut sink = NullSink;
        let result = wipe_volume(dir.path(), WipeMethod::Quick, false, &rng, &cancel, &mut sink).unwrap();

        assert_eq!(result.files.len(), 2);
        assert!(dir.path().exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
