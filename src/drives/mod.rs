//! Drive Enumerator and Drive Classifier.
//!
//! Lists mountable volumes and classifies a target path as `hdd`, `ssd`,
//! `usb_flash`, or `unknown` for advisory use by the dispatcher.

mod classifier;
mod enumerator;

pub use classifier::{classify_with, DriveProbe, SystemDriveProbe};
pub use enumerator::enumerate_drives;

use serde::{Deserialize, Serialize};

/// Classify a path. Never fails, falling through to `DriveType::Unknown`.
/// Wraps `classify_with` against `SystemDriveProbe`; callers that need to
/// inject a fake probe (tests) use `classify_with` directly.
pub fn classify(path: &str) -> DriveType {
    classify_with(path, &SystemDriveProbe)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveType {
    Hdd,
    Ssd,
    UsbFlash,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveInfo {
    pub path: String,
    pub label: String,
    pub total: u64,
    pub free: u64,
    pub used: u64,
}
