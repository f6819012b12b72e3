//! Disk space of the filesystem holding a path.

use crate::progress::format_bytes;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskUsage {
    pub total: u64,
    pub used: u64,
    pub free: u64,
}

impl DiskUsage {
    pub fn used_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.used as f64 / self.total as f64 * 100.0
        }
    }
}

#[cfg(unix)]
pub fn disk_usage(path: &Path) -> Option<DiskUsage> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(path.as_os_str().as_bytes()).ok()?;
    let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };
    // SAFETY: c_path is NUL-terminated and stat is a valid out pointer.
    let rc = unsafe { libc::statvfs(c_path.as_ptr(), &mut stat) };
    if rc != 0 {
        return None;
    }

    let block = stat.f_frsize as u64;
    let total = stat.f_blocks as u64 * block;
    let free = stat.f_bavail as u64 * block;
    let used = total.saturating_sub(stat.f_bfree as u64 * block);
    Some(DiskUsage { total, used, free })
}

#[cfg(not(unix))]
pub fn disk_usage(_path: &Path) -> Option<DiskUsage> {
    None
}

/// Print total/used/free for `path`, or "Unknown" when it cannot be read.
pub fn display_disk_space(path: &Path) {
    println!("\n📊 Disk Space Information:");
    match disk_usage(path) {
        Some(usage) => {
            println!("   Total: {}", format_bytes(usage.total));
            println!(
                "   Used:  {} ({:.1}%)",
                format_bytes(usage.used),
                usage.used_percent()
            );
            println!("   Free:  {}", format_bytes(usage.free));
        }
        None => {
            tracing::debug!(path = %path.display(), "Disk usage unavailable");
            println!("   Total: Unknown");
            println!("   Used:  Unknown (Unknown)");
            println!("   Free:  Unknown");
        }
    }
}
