//! Result types. `WipeReport` is a tagged union so a certificate writer or
//! log store can match on `kind` against a fixed schema per variant.

use crate::pattern::Pattern;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WipeMethod {
    Quick,
    Nist,
    Dod,
}

impl WipeMethod {
    /// The fixed, bit-exact pattern program for this method.
    pub fn pass_program(&self) -> &'static [Pattern] {
        match self {
            WipeMethod::Quick => &[Pattern::Random],
            WipeMethod::Nist => &[Pattern::Random],
            WipeMethod::Dod => &[Pattern::Zero, Pattern::One, Pattern::Random],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WipeMethod::Quick => "quick",
            WipeMethod::Nist => "nist",
            WipeMethod::Dod => "dod",
        }
    }
}

impl std::str::FromStr for WipeMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "quick" => Ok(WipeMethod::Quick),
            "nist" => Ok(WipeMethod::Nist),
            "dod" => Ok(WipeMethod::Dod),
            other => Err(format!("unsupported method: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub file_exists: bool,
    pub file_accessible: bool,
    pub samples_total: usize,
    pub samples_passed: usize,
    pub hash_changed: bool,
    pub verified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceVerification {
    pub samples_total: usize,
    pub samples_passed: usize,
    pub verified: bool,
    pub last_pattern: Pattern,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileWipeOutcome {
    pub path: String,
    pub original_hash: Option<String>,
    pub verified_changed: bool,
    pub verification: Option<VerificationRecord>,
    pub method_used: WipeMethod,
    pub passes_completed: u32,
    pub status: FileWipeStatus,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileWipeStatus {
    Deleted,
    NotFound,
    Failed,
    /// A pass was cancelled mid-write; the file may still exist, with
    /// whatever bytes were already issued left in place. No rollback is
    /// attempted.
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceWipeOutcome {
    pub device_path: String,
    pub total_size: u64,
    pub total_sectors: u64,
    pub passes_completed: u32,
    pub verification: Option<DeviceVerification>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub target: String,
    pub method: WipeMethod,
    pub verify: bool,
    pub outcome: FileWipeOutcome,
    pub duration: Duration,
    pub operator_id: Option<String>,
}

/// Outcome of a folder/volume/flash wipe, set by whichever dispatcher
/// branch builds the `FolderReport` — `directory_removed` is meaningless
/// for a mount point (C8/C10 never remove it by design), so success can't
/// be inferred from that field alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FolderWipeStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderReport {
    pub target: String,
    pub method: WipeMethod,
    pub verify: bool,
    pub files: Vec<FileWipeOutcome>,
    pub directory_removed: bool,
    pub skipped_entries: Vec<String>,
    pub status: FolderWipeStatus,
    pub duration: Duration,
    pub operator_id: Option<String>,
}

impl FolderReport {
    pub fn files_attempted(&self) -> usize {
        self.files.len()
    }

    pub fn files_wiped(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.status != FileWipeStatus::Failed)
            .count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceReport {
    pub target: String,
    pub method: WipeMethod,
    pub verify: bool,
    pub outcome: DeviceWipeOutcome,
    pub duration: Duration,
    pub operator_id: Option<String>,
}

/// Tagged union of the shapes a wipe can produce.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum WipeReport {
    File(FileReport),
    Folder(FolderReport),
    Device(DeviceReport),
    Cancelled {
        target: String,
        items_discovered: u64,
        items_completed: u64,
        duration: Duration,
    },
}

impl WipeReport {
    pub fn status_str(&self) -> &'static str {
        match self {
            WipeReport::File(r) => match r.outcome.status {
                FileWipeStatus::Deleted | FileWipeStatus::NotFound => "success",
                FileWipeStatus::Failed => "failed",
                FileWipeStatus::Cancelled => "cancelled",
            },
            WipeReport::Folder(r) => match r.status {
                FolderWipeStatus::Success => "success",
                FolderWipeStatus::Failed => "failed",
            },
            WipeReport::Device(r) => r.status.as_str(),
            WipeReport::Cancelled { .. } => "cancelled",
        }
    }
}
