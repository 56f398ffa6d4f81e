//! Safety Guard.
//!
//! Rejects wipes of protected system paths before any side effect occurs.

use crate::error::{WipeError, WipeResult};
use std::path::Path;

/// Hard-coded deny set: the operating system's root volume and the
/// mount points a user could plausibly hand us by mistake.
fn deny_set() -> &'static [&'static str] {
    if cfg!(windows) {
        &["C:\\", "C:", "\\\\.\\C:", "\\\\.\\PhysicalDrive0"]
    } else {
        &["/", "/boot", "/home", "/etc", "/usr", "/var", "/bin", "/sbin"]
    }
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() {
        path.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Checks a target against the deny set. Comparison is case-insensitive,
/// matching case-insensitive filesystems (FAT/NTFS); rejection never has
/// side effects.
pub struct SafetyGuard;

impl SafetyGuard {
    pub fn check(target: &Path) -> WipeResult<()> {
        let target_str = normalize(&target.display().to_string());
        let target_lower = target_str.to_lowercase();

        for denied in deny_set() {
            let denied_norm = normalize(denied).to_lowercase();
            if target_lower == denied_norm {
                return Err(WipeError::BlockedTarget(target.display().to_string()));
            }
        }

        // Root filesystem under any name ("/" normalizes to empty string).
        if target_str.is_empty() || target_str == "\\" {
            return Err(WipeError::BlockedTarget(target.display().to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn rejects_root() {
        assert!(matches!(
            SafetyGuard::check(Path::new("/")),
            Err(WipeError::BlockedTarget(_))
        ));
    }

    #[test]
    #[cfg(unix)]
    fn rejects_home_case_insensitively() {
        assert!(matches!(
            SafetyGuard::check(Path::new("/HOME")),
            Err(WipeError::BlockedTarget(_))
        ));
    }

    #[test]
    fn allows_ordinary_path() {
        assert!(SafetyGuard::check(Path::new("/tmp/some/scratch/file.bin")).is_ok());
    }
}
