//! Process and platform information

/// Whether the process runs with an effective UID of 0.
/// dmidecode needs this to read /dev/mem or the SMBIOS tables in sysfs.
pub fn is_root() -> bool {
    // SAFETY: geteuid is always safe - it just returns the effective user ID of the process.
    unsafe { libc::geteuid() == 0 }
}

/// Whether the kernel exposes DMI attributes under the given sysfs root
pub fn has_dmi_sysfs(root: &std::path::Path) -> bool {
    !root.as_os_str().is_empty() && root.is_dir()
}
