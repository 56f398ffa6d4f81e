//! Block device capability: upper layers (the raw device wiper, the device
//! verifier) depend only on this trait, not on `CreateFileW`/`O_DIRECT`
//! directly.

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

use crate::error::{WipeError, WipeResult};

pub const SECTOR_SIZE: u64 = 512;
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// A physical block device opened for unbuffered, write-through I/O.
pub trait BlockDevice: Send {
    fn size(&self) -> u64;
    fn write_at(&mut self, offset: u64, buf: &[u8]) -> WipeResult<()>;
    fn read_at(&mut self, offset: u64, len: usize) -> WipeResult<Vec<u8>>;
    fn flush(&mut self) -> WipeResult<()>;
}

#[cfg(unix)]
pub fn open_block_device(path: &str) -> WipeResult<Box<dyn BlockDevice>> {
    unix::UnixBlockDevice::open(path).map(|d| Box::new(d) as Box<dyn BlockDevice>)
}

#[cfg(windows)]
pub fn open_block_device(path: &str) -> WipeResult<Box<dyn BlockDevice>> {
    windows::WindowsBlockDevice::open(path).map(|d| Box::new(d) as Box<dyn BlockDevice>)
}

#[cfg(not(any(unix, windows)))]
pub fn open_block_device(_path: &str) -> WipeResult<Box<dyn BlockDevice>> {
    Err(WipeError::DeviceOpenFailed {
        path: _path.to_string(),
        os_code: -1,
    })
}

/// Resolve a mount path to its underlying device node.
///
/// On Linux, a mounted partition's device is looked up via `/proc/mounts`;
/// the partition suffix (`p1`, `1`, ...) is stripped to reach the whole
/// disk. On Windows, a drive letter maps to
/// `\\.\PhysicalDriveN` via the volume-to-disk extent query; this engine's
/// scope only requires direct device-node targets, so letter resolution is
/// best-effort and returns the input unchanged if it cannot be resolved.
pub fn resolve_device_node(mount_or_device: &str) -> String {
    #[cfg(target_os = "linux")]
    {
        if let Some(resolved) = unix::resolve_from_proc_mounts(mount_or_device) {
            return resolved;
        }
    }
    mount_or_device.to_string()
}

#[cfg(target_os = "linux")]
pub fn strip_partition_suffix(device: &str) -> String {
    unix::strip_partition_suffix(device)
}

#[cfg(not(target_os = "linux"))]
pub fn strip_partition_suffix(device: &str) -> String {
    device.to_string()
}
