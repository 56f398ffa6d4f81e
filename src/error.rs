//! Typed error surface for the wipe engine.
//!
//! A `thiserror::Error` enum with a hand-written `Clone` impl, since
//! `std::io::Error` isn't `Clone`, scoped to the variant set the wipe
//! engine actually needs.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WipeError {
    #[error("path not found: {0}")]
    PathNotFound(String),

    #[error("not a file: {0}")]
    NotAFile(String),

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("not accessible: {0}")]
    NotAccessible(String),

    #[error("refused to wipe protected target: {0}")]
    BlockedTarget(String),

    #[error("elevated privileges are required to wipe a raw device")]
    PrivilegesRequired,

    #[error("could not open device {path}: os error {os_code}")]
    DeviceOpenFailed { path: String, os_code: i32 },

    #[error("write to device failed at sector {sector}")]
    DeviceWriteFailed { sector: u64 },

    #[error("could not determine device size")]
    DeviceSizeUnknown,

    #[error("overwrite failed: {0}")]
    OverwriteFailed(String),

    #[error("could not delete {0}")]
    DeleteFailed(String),

    #[error("directory was not fully removed: {0}")]
    DirectoryNotRemoved(String),

    #[error("verification failed: {0}")]
    VerificationFailed(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("an engine operation is already running")]
    Busy,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Clone for WipeError {
    fn clone(&self) -> Self {
        match self {
            WipeError::PathNotFound(s) => WipeError::PathNotFound(s.clone()),
            WipeError::NotAFile(s) => WipeError::NotAFile(s.clone()),
            WipeError::NotADirectory(s) => WipeError::NotADirectory(s.clone()),
            WipeError::NotAccessible(s) => WipeError::NotAccessible(s.clone()),
            WipeError::BlockedTarget(s) => WipeError::BlockedTarget(s.clone()),
            WipeError::PrivilegesRequired => WipeError::PrivilegesRequired,
            WipeError::DeviceOpenFailed { path, os_code } => WipeError::DeviceOpenFailed {
                path: path.clone(),
                os_code: *os_code,
            },
            WipeError::DeviceWriteFailed { sector } => {
                WipeError::DeviceWriteFailed { sector: *sector }
            }
            WipeError::DeviceSizeUnknown => WipeError::DeviceSizeUnknown,
            WipeError::OverwriteFailed(s) => WipeError::OverwriteFailed(s.clone()),
            WipeError::DeleteFailed(s) => WipeError::DeleteFailed(s.clone()),
            WipeError::DirectoryNotRemoved(s) => WipeError::DirectoryNotRemoved(s.clone()),
            WipeError::VerificationFailed(s) => WipeError::VerificationFailed(s.clone()),
            WipeError::Cancelled => WipeError::Cancelled,
            WipeError::Busy => WipeError::Busy,
            WipeError::Io(e) => WipeError::Io(std::io::Error::new(e.kind(), e.to_string())),
        }
    }
}

pub type WipeResult<T> = Result<T, WipeError>;
