//! Raw Device Wiper.
//!
//! Overwrites every sector of a physical device with the method's pass
//! program via the `BlockDevice` capability. Requires elevated privileges;
//! the caller is expected to have checked this before invoking, but the
//! check is repeated here as the authoritative gate.

use crate::cancel::CancelToken;
use crate::error::{WipeError, WipeResult};
use crate::io::{self, BlockDevice, CHUNK_SIZE, SECTOR_SIZE};
use crate::pattern::PatternSource;
use crate::privileges::has_elevated_privileges;
use crate::progress::ProgressSink;
use crate::report::{DeviceVerification, DeviceWipeOutcome, WipeMethod};
use crate::verify;

/// Overwrite every sector of the physical device backing `device_path`
/// with the method's pass program.
pub fn wipe_device(
    device_path: &str,
    method: WipeMethod,
    verify_enabled: bool,
    rng: &PatternSource,
    cancel: &CancelToken,
    progress: &mut dyn ProgressSink,
) -> WipeResult<DeviceWipeOutcome> {
    if !has_elevated_privileges() {
        return Err(WipeError::PrivilegesRequired);
    }

    let resolved = io::strip_partition_suffix(&io::resolve_device_node(device_path));
    let mut device = io::open_block_device(&resolved)?;
    let total_size = device.size();
    let total_sectors = total_size / SECTOR_SIZE;

    let program = method.pass_program();
    let mut passes_completed = 0u32;

    for (idx, pattern) in program.iter().enumerate() {
        match run_pass(device.as_mut(), total_size, *pattern, rng, cancel, progress, idx, program.len()) {
            Ok(()) => {
                device.flush()?;
                passes_completed += 1;
            }
            Err(WipeError::Cancelled) => {
                // Leave whatever sectors were already written in place; no
                // verification runs against a cancelled, partial wipe.
                return Ok(DeviceWipeOutcome {
                    device_path: resolved,
                    total_size,
                    total_sectors,
                    passes_completed,
                    verification: None,
                    status: "cancelled".to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    let verification: Option<DeviceVerification> = if verify_enabled {
        Some(verify::verify_device(device.as_mut(), method))
    } else {
        None
    };

    Ok(DeviceWipeOutcome {
        device_path: resolved,
        total_size,
        total_sectors,
        passes_completed,
        verification,
        status: "success".to_string(),
    })
}

#[allow(clippy::too_many_arguments)]
fn run_pass(
    device: &mut dyn BlockDevice,
    total_size: u64,
    pattern: crate::pattern::Pattern,
    rng: &PatternSource,
    cancel: &CancelToken,
    progress: &mut dyn ProgressSink,
    pass_idx: usize,
    total_passes: usize,
) -> WipeResult<()> {
    let mut offset = 0u64;
    let mut buf = vec![0u8; CHUNK_SIZE];

    while offset < total_size {
        if cancel.is_cancelled() {
            return Err(WipeError::Cancelled);
        }

        let remaining = total_size - offset;
        let n = (CHUNK_SIZE as u64).min(remaining) as usize;
        rng.fill(&mut buf[..n], pattern)?;

        device.write_at(offset, &buf[..n]).map_err(|_| WipeError::DeviceWriteFailed {
            sector: offset / SECTOR_SIZE,
        })?;

        offset += n as u64;

        let fraction = offset as f64 / total_size as f64;
        let overall = (pass_idx as f64 + fraction) / total_passes as f64 * 100.0;
        progress.on_progress(overall, &format!("device pass {}/{}", pass_idx + 1, total_passes));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullSink;
    use tempfile::tempdir;

    // These tests exercise `io::open_block_device` against a regular file
    // standing in for a loopback device, via the `UnixBlockDevice`
    // size-fallback-to-metadata path.
    #[cfg(unix)]
    #[test]
    fn wipes_a_loopback_file_with_quick_method() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("loop.img");
        std::fs::write(&path, vec![0u8; 1024 * 1024]).unwrap();

        let rng = PatternSource::new();
        let cancel = CancelToken::new();
        let mut sink = NullSink;

        // SAFETY: this crosses the privilege gate only via the
        // `WIPE_ENGINE_FORCE_PRIVILEGED` test override in `privileges.rs`.
        std::env::set_var("WIPE_ENGINE_FORCE_PRIVILEGED", "1");
        let outcome = wipe_device(
            path.to_str().unwrap(),
            WipeMethod::Quick,
            true,
            &rng,
            &cancel,
            &mut sink,
        )
        .unwrap();
        std::env::remove_var("WIPE_ENGINE_FORCE_PRIVILEGED");

        assert_eq!(outcome.passes_completed, 1);
        assert_eq!(outcome.total_size, 1024 * 1024);
        assert!(outcome.verification.unwrap().samples_passed > 0);
    }

    #[test]
    fn without_privileges_fails_fast() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("loop.img");
        std::fs::write(&path, vec![0u8; 4096]).unwrap();

        let rng = PatternSource::new();
        let cancel = CancelToken::new();
        let mut sink = NullSink;

        std::env::remove_var("WIPE_ENGINE_FORCE_PRIVILEGED");
        let result = wipe_device(path.to_str().unwrap(), WipeMethod::Quick, false, &rng, &cancel, &mut sink);
        assert!(matches!(result, Err(WipeError::PrivilegesRequired)));
    }
}
