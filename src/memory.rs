//! Resident-set sampling for before/after memory measurements
//!
//! On Linux this reads `VmRSS` from `/proc/self/status`. The figure is a
//! whole-process working-set size: the allocator or another thread may move
//! it during the measured window, so callers treat it as a coarse signal
//! rather than an exact per-call attribution.

/// Current resident set size of this process in megabytes.
///
/// Returns 0.0 when the value cannot be determined (non-Linux hosts, or a
/// `/proc` read failure).
pub fn resident_mb() -> f64 {
    read_vm_rss_kb() as f64 / 1024.0
}

#[cfg(target_os = "linux")]
fn read_vm_rss_kb() -> u64 {
    if let Ok(status) = std::fs::read_to_string("/proc/self/status") {
        for line in status.lines() {
            if let Some(rest) = line.strip_prefix("VmRSS:") {
                let trimmed = rest.trim().trim_end_matches("kB").trim();
                if let Ok(kb) = trimmed.parse::<u64>() {
                    return kb;
                }
            }
        }
    }
    0
}

#[cfg(not(target_os = "linux"))]
fn read_vm_rss_kb() -> u64 {
    0
}
