//! Metadata-only source probe.

use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use tunedrop_models::SourceMetadata;

use crate::error::{MediaError, MediaResult};
use crate::tools::check_ytdlp;

/// Socket timeout for metadata probes (seconds).
const PROBE_SOCKET_TIMEOUT: u32 = 10;

/// Fetch source metadata without transferring any media.
///
/// Runs `yt-dlp --dump-json` with a short socket timeout and a single
/// retry, mirroring the cheap-probe/expensive-transfer split: the policy
/// gate runs on this output before any bytes move.
pub async fn fetch_metadata(url: &str) -> MediaResult<SourceMetadata> {
    check_ytdlp()?;

    debug!(url = %url, "Probing source metadata");

    let socket_timeout = PROBE_SOCKET_TIMEOUT.to_string();
    let output = Command::new("yt-dlp")
        .args([
            "--dump-json",
            "--no-download",
            "--no-playlist",
            "--no-warnings",
            "--socket-timeout",
            &socket_timeout,
            "--retries",
            "1",
        ])
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("yt-dlp probe stderr: {}", stderr);
        return Err(MediaError::download_failed(&stderr));
    }

    let metadata: SourceMetadata = serde_json::from_slice(&output.stdout)?;
    Ok(metadata)
}
