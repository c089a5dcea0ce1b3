//! Free disk space probe.

use std::path::Path;

use nix::sys::statvfs::statvfs;

use crate::error::{MediaError, MediaResult};

/// Free space available to unprivileged writers at `path`, in megabytes.
pub fn free_space_mb(path: impl AsRef<Path>) -> MediaResult<u64> {
    let stat =
        statvfs(path.as_ref()).map_err(|e| MediaError::DiskProbe(format!("statvfs: {e}")))?;

    let free_bytes = stat.blocks_available() as u64 * stat.fragment_size() as u64;
    Ok(free_bytes / (1024 * 1024))
}
