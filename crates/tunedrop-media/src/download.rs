//! Audio download and transcode using yt-dlp.

use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{MediaError, MediaResult};
use crate::progress::{parse_line, DownloadEvent};
use crate::tools::{check_ffmpeg, check_ytdlp};

/// Socket timeout for transfers (seconds).
const TRANSFER_SOCKET_TIMEOUT: u32 = 30;

/// Retry count delegated to the extractor. The service itself never retries.
const TRANSFER_RETRIES: u32 = 3;

/// One audio extraction request.
#[derive(Debug, Clone)]
pub struct AudioRequest {
    /// Source URL
    pub url: String,
    /// Output template, e.g. `/data/downloads/Title.%(ext)s`
    pub output_template: PathBuf,
    /// Transcode quality in kbps
    pub quality: String,
    /// Upper bound on the transferred file
    pub max_file_size_mb: u64,
}

/// Download a source and transcode it to MP3, emitting progress events.
///
/// The extractor's stdout is parsed line by line; each recognized line is
/// forwarded to `on_event`. stderr is collected and classified on failure.
pub async fn download_audio<F>(request: &AudioRequest, on_event: F) -> MediaResult<()>
where
    F: Fn(DownloadEvent) + Send + 'static,
{
    check_ytdlp()?;
    check_ffmpeg()?;

    info!(url = %request.url, quality = %request.quality, "Starting audio extraction");

    let max_filesize = format!("{}M", request.max_file_size_mb);
    let template = request.output_template.to_string_lossy().to_string();
    let socket_timeout = TRANSFER_SOCKET_TIMEOUT.to_string();
    let retries = TRANSFER_RETRIES.to_string();

    let args = [
        "-f",
        "bestaudio/best",
        "--extract-audio",
        "--audio-format",
        "mp3",
        "--audio-quality",
        &request.quality,
        "--newline",
        "--no-playlist",
        "--no-overwrites",
        "--no-warnings",
        "--socket-timeout",
        &socket_timeout,
        "--retries",
        &retries,
        "--max-filesize",
        &max_filesize,
        "--user-agent",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
        "-o",
        &template,
    ];

    let mut child = Command::new("yt-dlp")
        .args(args)
        .arg(&request.url)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let stdout = child.stdout.take().expect("stdout not captured");
    let mut stderr = child.stderr.take().expect("stderr not captured");

    // Parse progress lines as they arrive
    let progress_handle = tokio::spawn(async move {
        let mut reader = BufReader::new(stdout).lines();
        while let Ok(Some(line)) = reader.next_line().await {
            if let Some(event) = parse_line(&line) {
                on_event(event);
            }
        }
    });

    // Drain stderr concurrently so the child never blocks on a full pipe
    let stderr_handle = tokio::spawn(async move {
        let mut buf = String::new();
        let _ = stderr.read_to_string(&mut buf).await;
        buf
    });

    let status = child.wait().await?;
    let _ = progress_handle.await;
    let stderr_text = stderr_handle.await.unwrap_or_default();

    if !status.success() {
        debug!("yt-dlp stderr: {}", stderr_text);
        return Err(MediaError::download_failed(&stderr_text));
    }

    info!(url = %request.url, "Audio extraction finished");
    Ok(())
}
