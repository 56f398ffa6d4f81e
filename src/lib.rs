//! Secure data erasure engine for files, folders and block devices.
//!
//! The public surface is deliberately small: `enumerate_drives`,
//! `classify`, and `dispatcher::wipe`. Everything else (`overwrite`,
//! `folder`, `volume`, `device`, `flash`, `verify`) is an internal
//! collaborator the dispatcher composes.

pub mod cancel;
pub mod device;
pub mod digest;
pub mod dispatcher;
pub mod drives;
pub mod error;
pub mod flash;
pub mod folder;
pub mod io;
pub mod overwrite;
pub mod pattern;
pub mod privileges;
pub mod progress;
pub mod report;
pub mod safety;
pub mod verify;
pub mod volume;

pub use cancel::CancelToken;
pub use dispatcher::{wipe, WipeRequest};
pub use drives::{classify, enumerate_drives, DriveInfo, DriveType};
pub use error::{WipeError, WipeResult};
pub use pattern::{Pattern, PatternSource};
pub use report::{WipeMethod, WipeReport};
