//! Dispatcher.
//!
//! Normalizes the target path, runs the Safety Guard, classifies the
//! target, and routes to the file / folder / volume / raw-device wiper.

use crate::cancel::CancelToken;
use crate::drives::{classify, DriveType};
use crate::error::{WipeError, WipeResult};
use crate::pattern::PatternSource;
use crate::privileges::has_elevated_privileges;
use crate::progress::{NullSink, ProgressSink};
use crate::report::{DeviceReport, FileReport, FileWipeStatus, FolderReport, FolderWipeStatus, WipeMethod, WipeReport};
use crate::safety::SafetyGuard;
use crate::{device, flash, folder, overwrite, volume};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

/// A request to wipe one target.
pub struct WipeRequest<'a> {
    pub target: PathBuf,
    pub method: WipeMethod,
    pub verify: bool,
    pub operator_id: Option<String>,
    pub progress_sink: Option<&'a mut dyn ProgressSink>,
    pub cancel: CancelToken,
    /// Caller opts in to raw device access when privileges are available;
    /// without this, a mounted flash volume takes the filesystem fallback.
    pub prefer_raw: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TargetKind {
    File,
    Directory,
    MountedVolume,
    RawDevice,
}

fn engine_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

/// Entry point: normalizes the path, runs the Safety Guard, classifies the
/// target and routes to the appropriate wiper. Rejects reentrant calls with
/// `Busy` — only one wipe runs per process at a time.
pub fn wipe(mut request: WipeRequest<'_>) -> WipeResult<WipeReport> {
    let _guard = engine_lock().try_lock().map_err(|_| WipeError::Busy)?;

    let target = request
        .target
        .canonicalize()
        .unwrap_or_else(|_| request.target.clone());

    SafetyGuard::check(&target)?;

    let start = Instant::now();
    let rng = PatternSource::new();
    let mut null_sink = NullSink;
    let progress: &mut dyn ProgressSink = request.progress_sink.take().unwrap_or(&mut null_sink);

    let kind = classify_target(&target);

    let report = match kind {
        TargetKind::File => wipe_file_target(&target, &request, &rng, progress, start)?,
        TargetKind::Directory => wipe_folder_target(&target, &request, &rng, progress, start)?,
        TargetKind::MountedVolume => {
            wipe_volume_target(&target, &request, &rng, progress, start)?
        }
        TargetKind::RawDevice => wipe_raw_target(&target, &request, &rng, progress, start)?,
    };

    Ok(report)
}

fn classify_target(target: &Path) -> TargetKind {
    if is_raw_device_node(target) {
        return TargetKind::RawDevice;
    }
    if target.is_file() {
        return TargetKind::File;
    }
    if is_mount_point(target) {
        return TargetKind::MountedVolume;
    }
    TargetKind::Directory
}

#[cfg(unix)]
fn is_raw_device_node(target: &Path) -> bool {
    use std::os::unix::fs::FileTypeExt;
    std::fs::metadata(target)
        .map(|m| m.file_type().is_block_device())
        .unwrap_or(false)
}

#[cfg(windows)]
fn is_raw_device_node(target: &Path) -> bool {
    target
        .to_str()
        .map(|s| s.to_lowercase().starts_with(r"\\.\physicaldrive"))
        .unwrap_or(false)
}

#[cfg(not(any(unix, windows)))]
fn is_raw_device_node(_target: &Path) -> bool {
    false
}

fn is_mount_point(target: &Path) -> bool {
    if !target.is_dir() {
        return false;
    }
    let disks = sysinfo::Disks::new_with_refreshed_list();
    disks.list().iter().any(|d| d.mount_point() == target)
}

fn wipe_file_target(
    target: &Path,
    request: &WipeRequest<'_>,
    rng: &PatternSource,
    progress: &mut dyn ProgressSink,
    start: Instant,
) -> WipeResult<WipeReport> {
    let outcome = overwrite::overwrite(target, request.method, request.verify, rng, &request.cancel, progress)?;
    if outcome.status == crate::report::FileWipeStatus::Cancelled {
        return Ok(WipeReport::Cancelled {
            target: target.display().to_string(),
            items_discovered: 1,
            items_completed: 0,
            duration: start.elapsed(),
        });
    }
    Ok(WipeReport::File(FileReport {
        target: target.display().to_string(),
        method: request.method,
        verify: request.verify,
        outcome,
        duration: start.elapsed(),
        operator_id: request.operator_id.clone(),
    }))
}

fn wipe_folder_target(
    target: &Path,
    request: &WipeRequest<'_>,
    rng: &PatternSource,
    progress: &mut dyn ProgressSink,
    start: Instant,
) -> WipeResult<WipeReport> {
    let result = folder::wipe_folder(target, request.method, request.verify, rng, &request.cancel, progress)?;
    if result.cancelled {
        return Ok(WipeReport::Cancelled {
            target: target.display().to_string(),
            items_discovered: result.items_discovered,
            items_completed: result.files.len() as u64,
            duration: start.elapsed(),
        });
    }
    let status = if result.directory_removed && result.skipped_entries.is_empty() && !has_failed_file(&result.files) {
        FolderWipeStatus::Success
    } else {
        FolderWipeStatus::Failed
    };
    Ok(WipeReport::Folder(FolderReport {
        target: target.display().to_string(),
        method: request.method,
        verify: request.verify,
        files: result.files,
        directory_removed: result.directory_removed,
        skipped_entries: result.skipped_entries,
        status,
        duration: start.elapsed(),
        operator_id: request.operator_id.clone(),
    }))
}

/// Success signal for a mount-point wipe (C8/C10), which never removes the
/// root and so can't use `directory_removed` as its success signal — a
/// clean pass has no failed files and no skipped entries.
fn has_failed_file(files: &[crate::report::FileWipeOutcome]) -> bool {
    files.iter().any(|f| f.status == FileWipeStatus::Failed)
}

fn wipe_volume_target(
    target: &Path,
    request: &WipeRequest<'_>,
    rng: &PatternSource,
    progress: &mut dyn ProgressSink,
    start: Instant,
) -> WipeResult<WipeReport> {
    let drive_type = classify(&target.display().to_string());

    if drive_type == DriveType::UsbFlash && !(request.prefer_raw && has_elevated_privileges()) {
        let outcome = flash::wipe_flash_volume(target, rng, &request.cancel, progress)?;
        let status = if outcome.steps.iter().all(|s| s.succeeded) {
            FolderWipeStatus::Success
        } else {
            FolderWipeStatus::Failed
        };
        return Ok(WipeReport::Folder(FolderReport {
            target: target.display().to_string(),
            method: request.method,
            verify: request.verify,
            files: Vec::new(),
            directory_removed: false,
            skipped_entries: outcome
                .steps
                .iter()
                .filter(|s| !s.succeeded)
                .map(|s| format!("{}: {}", s.step, s.detail))
                .collect(),
            status,
            duration: start.elapsed(),
            operator_id: request.operator_id.clone(),
        }));
    }

    if request.prefer_raw && has_elevated_privileges() {
        if let Some(device_path) = device_node_for_mount(target) {
            return wipe_raw_device(&device_path, request, rng, progress, start);
        }
    }

    let result = volume::wipe_volume(target, request.method, request.verify, rng, &request.cancel, progress)?;
    if result.cancelled {
        return Ok(WipeReport::Cancelled {
            target: target.display().to_string(),
            items_discovered: result.items_discovered,
            items_completed: result.files.len() as u64,
            duration: start.elapsed(),
        });
    }
    let status = if result.skipped_entries.is_empty() && !has_failed_file(&result.files) {
        FolderWipeStatus::Success
    } else {
        FolderWipeStatus::Failed
    };
    Ok(WipeReport::Folder(FolderReport {
        target: target.display().to_string(),
        method: request.method,
        verify: request.verify,
        files: result.files,
        directory_removed: false,
        skipped_entries: result.skipped_entries,
        status,
        duration: start.elapsed(),
        operator_id: request.operator_id.clone(),
    }))
}

fn wipe_raw_target(
    target: &Path,
    request: &WipeRequest<'_>,
    rng: &PatternSource,
    progress: &mut dyn ProgressSink,
    start: Instant,
) -> WipeResult<WipeReport> {
    wipe_raw_device(&target.display().to_string(), request, rng, progress, start)
}

fn wipe_raw_device(
    device_path: &str,
    request: &WipeRequest<'_>,
    rng: &PatternSource,
    progress: &mut dyn ProgressSink,
    start: Instant,
) -> WipeResult<WipeReport> {
    let outcome = device::wipe_device(device_path, request.method, request.verify, rng, &request.cancel, progress)?;
    if outcome.status == "cancelled" {
        let total_sectors = outcome.total_sectors;
        return Ok(WipeReport::Cancelled {
            target: device_path.to_string(),
            items_discovered: total_sectors,
            items_completed: 0,
            duration: start.elapsed(),
        });
    }
    Ok(WipeReport::Device(DeviceReport {
        target: device_path.to_string(),
        method: request.method,
        verify: request.verify,
        outcome,
        duration: start.elapsed(),
        operator_id: request.operator_id.clone(),
    }))
}

fn device_node_for_mount(target: &Path) -> Option<String> {
    let resolved = crate::io::resolve_device_node(&target.display().to_string());
    if resolved == target.display().to_string() {
        None
    } else {
        Some(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    #[serial]
    fn dispatches_a_plain_file_to_the_file_overwriter() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("note.txt");
        std::fs::write(&path, b"hello world").unwrap();

        let request = WipeRequest {
            target: path.clone(),
            method: WipeMethod::Quick,
            verify: true,
            operator_id: None,
            progress_sink: None,
            cancel: CancelToken::new(),
            prefer_raw: false,
        };

        let report = wipe(request).unwrap();
        assert!(matches!(report, WipeReport::File(_)));
        assert!(!path.exists());
    }

    #[test]
    #[serial]
    fn dispatches_a_plain_directory_to_the_folder_wiper() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("payload");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("a.txt"), b"x").unwrap();

        let request = WipeRequest {
            target: target.clone(),
            method: WipeMethod::Quick,
            verify: false,
            operator_id: None,
            progress_sink: None,
            cancel: CancelToken::new(),
            prefer_raw: false,
        };

        let report = wipe(request).unwrap();
        assert_eq!(report.status_str(), "success");
        assert!(matches!(report, WipeReport::Folder(_)));
        assert!(!target.exists());
    }

    #[test]
    fn mount_point_style_report_succeeds_without_directory_removal() {
        use crate::report::{FolderReport, FolderWipeStatus};

        let report = WipeReport::Folder(FolderReport {
            target: "/mnt/usb".to_string(),
            method: WipeMethod::Quick,
            verify: true,
            files: Vec::new(),
            directory_removed: false,
            skipped_entries: Vec::new(),
            status: FolderWipeStatus::Success,
            duration: std::time::Duration::from_secs(1),
            operator_id: None,
        });

        assert_eq!(report.status_str(), "success");
    }

    #[test]
    #[serial]
    fn rejects_a_denied_system_path() {
        let request = WipeRequest {
            target: PathBuf::from(if cfg!(windows) { "C:\\" } else { "/" }),
            method: WipeMethod::Quick,
            verify: false,
            operator_id: None,
            progress_sink: None,
            cancel: CancelToken::new(),
            prefer_raw: false,
        };

        let result = wipe(request);
        assert!(matches!(result, Err(WipeError::BlockedTarget(_))));
    }
}
