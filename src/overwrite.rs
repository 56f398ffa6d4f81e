//! File Overwriter.
//!
//! Overwrites a single regular file per the method's pass program, wipes
//! its slack space and filename best-effort, then unlinks it.

use crate::cancel::CancelToken;
use crate::digest::sha256_file;
use crate::error::{WipeError, WipeResult};
use crate::pattern::PatternSource;
use crate::progress::ProgressSink;
use crate::report::{FileWipeOutcome, FileWipeStatus, VerificationRecord, WipeMethod};
use crate::verify::verify_file;
use std::fs::OpenOptions;
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

const CHUNK_SIZE: usize = 1024 * 1024;
const RENAME_ATTEMPTS: usize = 3;

/// Overwrite and delete a single regular file per the method's pass
/// program, then optionally verify. Never returns `Err` for conditions the
/// outcome itself can describe (missing file, mid-pass failure); those are
/// folded into `FileWipeOutcome::status` so folder/volume walks can keep
/// going. `Err` is reserved for precondition violations the caller should
/// not have let through (not a file, not accessible).
pub fn overwrite(
    path: &Path,
    method: WipeMethod,
    verify: bool,
    rng: &PatternSource,
    cancel: &CancelToken,
    progress: &mut dyn ProgressSink,
) -> WipeResult<FileWipeOutcome> {
    let path_str = path.display().to_string();

    if !path.exists() {
        return Ok(not_found_outcome(path_str, method));
    }
    if !path.is_file() {
        return Err(WipeError::NotAFile(path_str));
    }

    let metadata = std::fs::metadata(path).map_err(|_| WipeError::NotAccessible(path_str.clone()))?;
    let size = metadata.len();

    // Step 1: make writable, best-effort.
    clear_readonly(path);

    // Step 2: original hash for verification.
    let original_hash = if verify {
        sha256_file(path).ok()
    } else {
        None
    };

    let program = method.pass_program();
    let mut passes_completed = 0u32;
    let mut pass_error: Option<String> = None;
    let mut was_cancelled = false;

    if size > 0 {
        'passes: for (idx, pattern) in program.iter().enumerate() {
            match run_pass(path, size, *pattern, rng, cancel, progress, idx, program.len()) {
                Ok(()) => passes_completed += 1,
                Err(WipeError::Cancelled) => {
                    was_cancelled = true;
                    break 'passes;
                }
                Err(e) => {
                    pass_error = Some(e.to_string());
                    break 'passes;
                }
            }
        }
    }

    // Cancellation leaves whatever bytes were already issued in place —
    // no rollback, no unlink.
    if was_cancelled {
        return Ok(FileWipeOutcome {
            path: path_str,
            original_hash,
            verified_changed: false,
            verification: None,
            method_used: method,
            passes_completed,
            status: FileWipeStatus::Cancelled,
            error: None,
        });
    }

    if let Some(err) = pass_error {
        // Write failed mid-pass: abort this path, attempt unlink anyway.
        let _ = std::fs::remove_file(path);
        return Ok(FileWipeOutcome {
            path: path_str,
            original_hash,
            verified_changed: false,
            verification: None,
            method_used: method,
            passes_completed,
            status: FileWipeStatus::Failed,
            error: Some(format!("overwrite failed: {err}")),
        });
    }

    // Step 4: slack space, best-effort.
    wipe_slack_space(path, size);

    // Step 5: obscure filename, best-effort.
    let final_path = secure_rename(path);

    // Step 6: unlink.
    let _ = std::fs::remove_file(&final_path);
    if final_path.exists() {
        return Err(WipeError::DeleteFailed(final_path.display().to_string()));
    }

    // Step 7: verify.
    let verification = if verify {
        Some(verify_file(&final_path, original_hash.as_deref(), method))
    } else {
        None
    };
    let verified_changed = verification.as_ref().map(|v| v.verified).unwrap_or(true);

    Ok(FileWipeOutcome {
        path: path_str,
        original_hash,
        verified_changed,
        verification,
        method_used: method,
        passes_completed,
        status: FileWipeStatus::Deleted,
        error: None,
    })
}

fn not_found_outcome(path: String, method: WipeMethod) -> FileWipeOutcome {
    FileWipeOutcome {
        path,
        original_hash: None,
        verified_changed: true,
        verification: Some(VerificationRecord {
            file_exists: false,
            file_accessible: false,
            samples_total: 0,
            samples_passed: 0,
            hash_changed: true,
            verified: true,
        }),
        method_used: method,
        passes_completed: 0,
        status: FileWipeStatus::NotFound,
        error: None,
    }
}

#[allow(clippy::too_many_arguments)]
fn run_pass(
    path: &Path,
    size: u64,
    pattern: crate::pattern::Pattern,
    rng: &PatternSource,
    cancel: &CancelToken,
    progress: &mut dyn ProgressSink,
    pass_idx: usize,
    total_passes: usize,
) -> WipeResult<()> {
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(WipeError::Io)?;

    file.seek(SeekFrom::Start(0)).map_err(WipeError::Io)?;

    let mut remaining = size;
    let mut written = 0u64;
    let mut buf = vec![0u8; CHUNK_SIZE];

    while remaining > 0 {
        if cancel.is_cancelled() {
            return Err(WipeError::Cancelled);
        }

        let n = CHUNK_SIZE.min(remaining as usize);
        rng.fill(&mut buf[..n], pattern)?;
        file.write_all(&buf[..n]).map_err(WipeError::Io)?;

        remaining -= n as u64;
        written += n as u64;

        let pass_fraction = written as f64 / size as f64;
        let overall = (pass_idx as f64 + pass_fraction) / total_passes as f64 * 100.0;
        progress.on_progress(overall, &format!("pass {}/{}", pass_idx + 1, total_passes));
    }

    file.flush().map_err(WipeError::Io)?;
    file.sync_data().map_err(WipeError::Io)?;
    Ok(())
}

fn clear_readonly(path: &Path) {
    if let Ok(metadata) = std::fs::metadata(path) {
        let mut perms = metadata.permissions();
        if perms.readonly() {
            perms.set_readonly(false);
            let _ = std::fs::set_permissions(path, perms);
        }
    }
}

/// Extend the file past its logical end, sync, then truncate back. Best
/// effort; uses a fixed 512-byte extension rather than querying the
/// filesystem's actual cluster size.
fn wipe_slack_space(path: &Path, original_size: u64) {
    if original_size == 0 {
        return;
    }
    let result: std::io::Result<()> = (|| {
        let mut file = OpenOptions::new().write(true).open(path)?;
        file.seek(SeekFrom::Start(original_size))?;
        file.write_all(&[0u8; 512])?;
        file.flush()?;
        file.sync_data()?;
        file.set_len(original_size)?;
        file.flush()?;
        file.sync_data()?;
        Ok(())
    })();
    let _ = result;
}

fn secure_rename(path: &Path) -> std::path::PathBuf {
    let Some(dir) = path.parent() else {
        return path.to_path_buf();
    };

    let mut current = path.to_path_buf();
    for _ in 0..RENAME_ATTEMPTS {
        let name = random_hex_name();
        let candidate = dir.join(name);
        match std::fs::rename(&current, &candidate) {
            Ok(()) => current = candidate,
            Err(_) => break,
        }
    }
    current
}

fn random_hex_name() -> String {
    use rand::Rng;
    const CHARS: &[u8] = b"0123456789ABCDEFabcdef";
    let mut rng = rand::thread_rng();
    (0..16)
        .map(|_| CHARS[rng.gen_range(0..CHARS.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullSink;
    use tempfile::tempdir;

    fn source() -> PatternSource {
        PatternSource::new()
    }

    #[test]
    fn wipes_a_small_file_with_quick_method() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("secret.txt");
        std::fs::write(&path, vec![0x41u8; 4096]).unwrap();

        let rng = source();
        let cancel = CancelToken::new();
        let mut sink = NullSink;
        let outcome = overwrite(&path, WipeMethod::Quick, true, &rng, &cancel, &mut sink).unwrap();

        assert_eq!(outcome.status, FileWipeStatus::Deleted);
        assert_eq!(outcome.passes_completed, 1);
        assert!(!path.exists());
    }

    #[test]
    fn dod_method_runs_three_passes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("secret.bin");
        std::fs::write(&path, vec![0u8; 8192]).unwrap();

        let rng = source();
        let cancel = CancelToken::new();
        let mut sink = NullSink;
        let outcome = overwrite(&path, WipeMethod::Dod, false, &rng, &cancel, &mut sink).unwrap();

        assert_eq!(outcome.passes_completed, 3);
    }

    #[test]
    fn empty_file_skips_passes_but_still_removes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.bin");
        std::fs::File::create(&path).unwrap();

        let rng = source();
        let cancel = CancelToken::new();
        let mut sink = NullSink;
        let outcome = overwrite(&path, WipeMethod::Dod, true, &rng, &cancel, &mut sink).unwrap();

        assert_eq!(outcome.passes_completed, 0);
        assert_eq!(outcome.status, FileWipeStatus::Deleted);
    }

    #[test]
    fn missing_file_reports_not_found() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gone.bin");

        let rng = source();
        let cancel = CancelToken::new();
        let mut sink = NullSink;
        let outcome = overwrite(&path, WipeMethod::Quick, true, &rng, &cancel, &mut sink).unwrap();

        assert_eq!(outcome.status, FileWipeStatus::NotFound);
    }

    #[test]
    fn cancellation_mid_pass_leaves_file_in_place() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.bin");
        std::fs::write(&path, vec![0u8; CHUNK_SIZE * 4]).unwrap();

        let rng = source();
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut sink = NullSink;
        let outcome = overwrite(&path, WipeMethod::Quick, false, &rng, &cancel, &mut sink).unwrap();

        assert_eq!(outcome.status, FileWipeStatus::Cancelled);
        assert!(path.exists(), "cancellation must not roll back or delete partial writes");
    }
}
