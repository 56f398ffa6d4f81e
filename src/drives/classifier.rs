//! Drive Classifier.
//!
//! Behind a `DriveProbe` trait, mirroring an `EntropySource`-style trait
//! abstraction (an interface so platform code is isolated and mockable in
//! tests). Only the ordered heuristic list (removable, rotational, media
//! hint, lexical fallback) is implemented; freeze/HPA-DCO/SED detection is
//! out of scope.

use super::DriveType;

/// Platform probe for the raw facts the classifier reasons over. Tests
/// supply a fake implementation instead of touching real hardware.
pub trait DriveProbe {
    fn is_removable(&self, path: &str) -> Option<bool>;
    /// `Some(true)` rotational (HDD), `Some(false)` non-rotational (SSD).
    fn is_rotational(&self, path: &str) -> Option<bool>;
    fn media_hint(&self, path: &str) -> Option<String>;
}

/// Classify a mount path or device node against an injected probe.
/// Advisory only: never fails, falling through to `DriveType::Unknown`
/// when nothing is conclusive. Tests exercise this directly with a fake
/// `DriveProbe`; the engine's public `classify(path)` wraps it with
/// `SystemDriveProbe`.
pub fn classify_with(path: &str, probe: &dyn DriveProbe) -> DriveType {
    if let Some(true) = probe.is_removable(path) {
        return DriveType::UsbFlash;
    }

    match probe.is_rotational(path) {
        Some(false) => return DriveType::Ssd,
        Some(true) => return DriveType::Hdd,
        None => {}
    }

    if let Some(hint) = probe.media_hint(path) {
        let hint = hint.to_lowercase();
        if hint.contains("nvme") || hint.contains("ssd") {
            return DriveType::Ssd;
        }
        if hint.contains("hdd") {
            return DriveType::Hdd;
        }
    }

    let lower = path.to_lowercase();
    if lower.contains("nvme") || lower.contains("ssd") {
        DriveType::Ssd
    } else if lower.contains("usb") || lower.contains("flash") {
        DriveType::UsbFlash
    } else if lower.contains("hdd") {
        DriveType::Hdd
    } else {
        DriveType::Unknown
    }
}

/// Real probe reading `/sys/block/<dev>/removable` and `.../queue/rotational`
/// on Linux.
pub struct SystemDriveProbe;

impl DriveProbe for SystemDriveProbe {
    #[cfg(target_os = "linux")]
    fn is_removable(&self, path: &str) -> Option<bool> {
        let name = sys_block_name(path)?;
        let contents = std::fs::read_to_string(format!("/sys/block/{name}/removable")).ok()?;
        Some(contents.trim() == "1")
    }

    #[cfg(not(target_os = "linux"))]
    fn is_removable(&self, _path: &str) -> Option<bool> {
        None
    }

    #[cfg(target_os = "linux")]
    fn is_rotational(&self, path: &str) -> Option<bool> {
        let name = sys_block_name(path)?;
        let contents =
            std::fs::read_to_string(format!("/sys/block/{name}/queue/rotational")).ok()?;
        Some(contents.trim() == "1")
    }

    #[cfg(not(target_os = "linux"))]
    fn is_rotational(&self, _path: &str) -> Option<bool> {
        None
    }

    fn media_hint(&self, _path: &str) -> Option<String> {
        None
    }
}

#[cfg(target_os = "linux")]
fn sys_block_name(path: &str) -> Option<String> {
    let stripped = crate::io::strip_partition_suffix(path);
    let name = stripped.strip_prefix("/dev/")?;
    Some(name.to_string())
}
