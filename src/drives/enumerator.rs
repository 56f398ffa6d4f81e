//! Drive Enumerator.
//!
//! Cross-platform mounted-volume listing via `sysinfo`, supplemented on
//! Linux with an `lsblk -J` probe so whole-disk device nodes with no
//! mounted filesystem still show up.

use super::DriveInfo;
use crate::error::WipeResult;
use sysinfo::Disks;

/// Every mountable volume on the system. Entries with missing usage figures
/// report zeroed size fields rather than being dropped; a genuine
/// enumeration failure is surfaced rather than silently truncating the
/// list.
pub fn enumerate_drives() -> WipeResult<Vec<DriveInfo>> {
    let disks = Disks::new_with_refreshed_list();
    let mut drives: Vec<DriveInfo> = disks
        .list()
        .iter()
        .map(|disk| {
            let total = disk.total_space();
            let free = disk.available_space();
            DriveInfo {
                path: disk.mount_point().to_string_lossy().to_string(),
                label: disk.name().to_string_lossy().to_string(),
                total,
                free,
                used: total.saturating_sub(free),
            }
        })
        .collect();

    #[cfg(target_os = "linux")]
    {
        drives.extend(lsblk_raw_devices(&drives));
    }

    Ok(drives)
}

#[cfg(target_os = "linux")]
fn lsblk_raw_devices(already_listed: &[DriveInfo]) -> Vec<DriveInfo> {
    use std::process::Command;

    let output = match Command::new("lsblk")
        .args(["-J", "-b", "-o", "NAME,TYPE,SIZE,MOUNTPOINT"])
        .output()
    {
        Ok(o) if o.status.success() => o,
        _ => return Vec::new(),
    };

    let json: serde_json::Value = match serde_json::from_slice(&output.stdout) {
        Ok(v) => v,
        Err(_) => return Vec::new(),
    };

    let mut out = Vec::new();
    let Some(devices) = json["blockdevices"].as_array() else {
        return out;
    };

    for device in devices {
        let Some(name) = device["name"].as_str() else {
            continue;
        };
        if device["type"].as_str() != Some("disk") {
            continue;
        }
        let path = format!("/dev/{name}");
        if already_listed.iter().any(|d| d.path == path) {
            continue;
        }
        let size = device["size"].as_u64().unwrap_or(0);
        out.push(DriveInfo {
            path,
            label: name.to_string(),
            total: size,
            free: 0,
            used: size,
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumerate_drives_does_not_error_on_a_normal_host() {
        let result = enumerate_drives();
        assert!(result.is_ok());
    }
}
