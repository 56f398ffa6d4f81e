//! Elevated-privilege check for the Raw Device Wiper: `geteuid() == 0` on
//! Unix, `IsUserAnAdmin` on Windows. An environment override lets tests
//! exercise the raw device path without actually running as root/admin.

#[cfg(unix)]
pub fn has_elevated_privileges() -> bool {
    if std::env::var_os("WIPE_ENGINE_FORCE_PRIVILEGED").is_some() {
        return true;
    }
    unsafe { libc::geteuid() == 0 }
}

#[cfg(windows)]
pub fn has_elevated_privileges() -> bool {
    if std::env::var_os("WIPE_ENGINE_FORCE_PRIVILEGED").is_some() {
        return true;
    }
    use winapi::um::shellapi::IsUserAnAdmin;
    unsafe { IsUserAnAdmin() != 0 }
}

#[cfg(not(any(unix, windows)))]
pub fn has_elevated_privileges() -> bool {
    std::env::var_os("WIPE_ENGINE_FORCE_PRIVILEGED").is_some()
}
