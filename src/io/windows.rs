//! Windows raw block-device I/O via `CreateFileW`/`WriteFile` with
//! `FILE_FLAG_NO_BUFFERING | FILE_FLAG_WRITE_THROUGH`; device geometry is
//! queried via `DeviceIoControl`.

use super::BlockDevice;
use crate::error::{WipeError, WipeResult};
use std::ffi::OsStr;
use std::os::windows::ffi::OsStrExt;
use std::ptr::null_mut;
use winapi::shared::minwindef::DWORD;
use winapi::um::errhandlingapi::GetLastError;
use winapi::um::fileapi::{CreateFileW, ReadFile, SetFilePointerEx, WriteFile, OPEN_EXISTING};
use winapi::um::handleapi::{CloseHandle, INVALID_HANDLE_VALUE};
use winapi::um::ioapiset::DeviceIoControl;
use winapi::um::winioctl::{DISK_GEOMETRY_EX, IOCTL_DISK_GET_DRIVE_GEOMETRY_EX};
use winapi::um::winnt::{FILE_ATTRIBUTE_NORMAL, GENERIC_READ, GENERIC_WRITE, HANDLE};

const FILE_FLAG_NO_BUFFERING: DWORD = 0x20000000;
const FILE_FLAG_WRITE_THROUGH: DWORD = 0x80000000;
const FILE_SHARE_READ: DWORD = 0x00000001;
const FILE_SHARE_WRITE: DWORD = 0x00000002;

fn wide(path: &str) -> Vec<u16> {
    OsStr::new(path).encode_wide().chain(Some(0)).collect()
}

pub struct WindowsBlockDevice {
    handle: HANDLE,
    size: u64,
}

unsafe impl Send for WindowsBlockDevice {}

impl WindowsBlockDevice {
    pub fn open(path: &str) -> WipeResult<Self> {
        let wide_path = wide(path);
        let handle = unsafe {
            CreateFileW(
                wide_path.as_ptr(),
                GENERIC_READ | GENERIC_WRITE,
                FILE_SHARE_READ | FILE_SHARE_WRITE,
                null_mut(),
                OPEN_EXISTING,
                FILE_ATTRIBUTE_NORMAL | FILE_FLAG_NO_BUFFERING | FILE_FLAG_WRITE_THROUGH,
                null_mut(),
            )
        };

        if handle == INVALID_HANDLE_VALUE {
            let os_code = unsafe { GetLastError() } as i32;
            return Err(WipeError::DeviceOpenFailed {
                path: path.to_string(),
                os_code,
            });
        }

        let size = query_geometry_size(handle).ok_or(WipeError::DeviceSizeUnknown)?;

        Ok(Self { handle, size })
    }
}

fn query_geometry_size(handle: HANDLE) -> Option<u64> {
    unsafe {
        let mut geometry: DISK_GEOMETRY_EX = std::mem::zeroed();
        let mut bytes_returned: DWORD = 0;

        let ok = DeviceIoControl(
            handle,
            IOCTL_DISK_GET_DRIVE_GEOMETRY_EX,
            null_mut(),
            0,
            &mut geometry as *mut _ as *mut _,
            std::mem::size_of::<DISK_GEOMETRY_EX>() as DWORD,
            &mut bytes_returned,
            null_mut(),
        );

        if ok == 0 {
            return None;
        }

        Some(*geometry.DiskSize.QuadPart() as u64)
    }
}

impl BlockDevice for WindowsBlockDevice {
    fn size(&self) -> u64 {
        self.size
    }

    fn write_at(&mut self, offset: u64, buf: &[u8]) -> WipeResult<()> {
        unsafe {
            let mut distance = std::mem::zeroed();
            *(&mut distance as *mut _ as *mut i64) = offset as i64;
            if SetFilePointerEx(self.handle, distance, null_mut(), 0) == 0 {
                return Err(WipeError::Io(std::io::Error::last_os_error()));
            }

            let mut written: DWORD = 0;
            let ok = WriteFile(
                self.handle,
                buf.as_ptr() as *const _,
                buf.len() as DWORD,
                &mut written,
                null_mut(),
            );

            if ok == 0 || written as usize != buf.len() {
                return Err(WipeError::DeviceWriteFailed {
                    sector: offset / super::SECTOR_SIZE,
                });
            }
        }
        Ok(())
    }

    fn read_at(&mut self, offset: u64, len: usize) -> WipeResult<Vec<u8>> {
        unsafe {
            let mut distance = std::mem::zeroed();
            *(&mut distance as *mut _ as *mut i64) = offset as i64;
            if SetFilePointerEx(self.handle, distance, null_mut(), 0) == 0 {
                return Err(WipeError::Io(std::io::Error::last_os_error()));
            }

            let mut buf = vec![0u8; len];
            let mut read: DWORD = 0;
            let ok = ReadFile(
                self.handle,
                buf.as_mut_ptr() as *mut _,
                len as DWORD,
                &mut read,
                null_mut(),
            );

            if ok == 0 {
                return Err(WipeError::Io(std::io::Error::last_os_error()));
            }
            buf.truncate(read as usize);
            Ok(buf)
        }
    }

    fn flush(&mut self) -> WipeResult<()> {
        // Opened with FILE_FLAG_WRITE_THROUGH: every WriteFile already
        // commits to stable storage, so there is nothing left to flush.
        Ok(())
    }
}

impl Drop for WindowsBlockDevice {
    fn drop(&mut self) {
        unsafe {
            CloseHandle(self.handle);
        }
    }
}
