//! Parsing of yt-dlp progress output.
//!
//! With `--newline` the extractor emits one progress line per update:
//!
//! ```text
//! [download] Destination: /data/downloads/Title.webm
//! [download]  42.5% of 10.23MiB at 512.00KiB/s ETA 00:42
//! [download] 100% of 10.23MiB in 00:05 at 2.10MiB/s
//! [ExtractAudio] Destination: /data/downloads/Title.mp3
//! ```

/// One structured progress event parsed from the extractor's output.
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadEvent {
    /// Transfer target chosen, bytes about to flow
    Started { destination: String },
    /// Transfer in progress
    Downloading {
        percent: f64,
        downloaded_bytes: u64,
        total_bytes: u64,
        speed: String,
        eta: String,
    },
    /// Raw transfer done, transcode starting
    Converting { destination: String },
}

/// Parse a single output line into an event, if it carries one.
pub fn parse_line(line: &str) -> Option<DownloadEvent> {
    let line = line.trim();

    if let Some(rest) = line.strip_prefix("[download]") {
        let rest = rest.trim();
        if let Some(dest) = rest.strip_prefix("Destination:") {
            return Some(DownloadEvent::Started {
                destination: dest.trim().to_string(),
            });
        }
        return parse_transfer_line(rest);
    }

    if let Some(rest) = line.strip_prefix("[ExtractAudio]") {
        if let Some(dest) = rest.trim().strip_prefix("Destination:") {
            return Some(DownloadEvent::Converting {
                destination: dest.trim().to_string(),
            });
        }
    }

    None
}

/// Parse the `pp.p% of SIZE at SPEED ETA T` body of a transfer line.
fn parse_transfer_line(rest: &str) -> Option<DownloadEvent> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();

    let percent_token = tokens.first()?.strip_suffix('%')?;
    let mut percent: f64 = percent_token.parse().ok()?;

    let mut total_bytes = 0u64;
    let mut speed = "0 B/s".to_string();
    let mut eta = "Unknown".to_string();

    let mut iter = tokens.iter().skip(1);
    while let Some(token) = iter.next() {
        match *token {
            "of" => {
                if let Some(size) = iter.next() {
                    total_bytes = parse_size(size.trim_start_matches('~')).unwrap_or(0);
                }
            }
            "at" => {
                if let Some(s) = iter.next() {
                    if *s != "Unknown" {
                        speed = (*s).to_string();
                    }
                }
            }
            "ETA" => {
                if let Some(e) = iter.next() {
                    eta = (*e).to_string();
                }
            }
            _ => {}
        }
    }

    // Unknown total: the percentage the tool prints is meaningless
    if total_bytes == 0 {
        percent = 0.0;
    }

    let downloaded_bytes = (percent / 100.0 * total_bytes as f64) as u64;

    Some(DownloadEvent::Downloading {
        percent,
        downloaded_bytes,
        total_bytes,
        speed,
        eta,
    })
}

/// Parse a human size like "10.23MiB" into bytes.
fn parse_size(s: &str) -> Option<u64> {
    let split = s
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(split);
    let value: f64 = number.parse().ok()?;

    let multiplier: f64 = match unit {
        "B" | "" => 1.0,
        "KiB" => 1024.0,
        "MiB" => 1024.0 * 1024.0,
        "GiB" => 1024.0 * 1024.0 * 1024.0,
        "TiB" => 1024.0 * 1024.0 * 1024.0 * 1024.0,
        "KB" => 1000.0,
        "MB" => 1000.0 * 1000.0,
        "GB" => 1000.0 * 1000.0 * 1000.0,
        _ => return None,
    };

    Some((value * multiplier) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_destination_line() {
        let event = parse_line("[download] Destination: /data/Title.webm").unwrap();
        assert_eq!(
            event,
            DownloadEvent::Started {
                destination: "/data/Title.webm".to_string()
            }
        );
    }

    #[test]
    fn test_parse_transfer_line() {
        let event = parse_line("[download]  42.5% of 10.00MiB at 512.00KiB/s ETA 00:42").unwrap();
        match event {
            DownloadEvent::Downloading {
                percent,
                downloaded_bytes,
                total_bytes,
                speed,
                eta,
            } => {
                assert!((percent - 42.5).abs() < 0.01);
                assert_eq!(total_bytes, 10 * 1024 * 1024);
                assert_eq!(downloaded_bytes, (0.425 * 10.0 * 1024.0 * 1024.0) as u64);
                assert_eq!(speed, "512.00KiB/s");
                assert_eq!(eta, "00:42");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_parse_estimated_total() {
        let event = parse_line("[download]  10.0% of ~20.00MiB at 1.00MiB/s ETA 00:18").unwrap();
        match event {
            DownloadEvent::Downloading { total_bytes, .. } => {
                assert_eq!(total_bytes, 20 * 1024 * 1024);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_parse_completed_transfer_line() {
        let event = parse_line("[download] 100% of 5.00MiB in 00:03 at 1.60MiB/s").unwrap();
        match event {
            DownloadEvent::Downloading { percent, eta, .. } => {
                assert!((percent - 100.0).abs() < 0.01);
                assert_eq!(eta, "Unknown");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_total_reports_zero_percent() {
        let event = parse_line("[download]  50.0% of Unknown at 1.00MiB/s ETA Unknown").unwrap();
        match event {
            DownloadEvent::Downloading {
                percent,
                total_bytes,
                ..
            } => {
                assert_eq!(percent, 0.0);
                assert_eq!(total_bytes, 0);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_parse_extract_audio_line() {
        let event = parse_line("[ExtractAudio] Destination: /data/Title.mp3").unwrap();
        assert_eq!(
            event,
            DownloadEvent::Converting {
                destination: "/data/Title.mp3".to_string()
            }
        );
    }

    #[test]
    fn test_irrelevant_lines_ignored() {
        assert!(parse_line("[youtube] abc: Downloading webpage").is_none());
        assert!(parse_line("").is_none());
        assert!(parse_line("[download] Got error, retrying").is_none());
    }

    #[test]
    fn test_parse_size_units() {
        assert_eq!(parse_size("512B"), Some(512));
        assert_eq!(parse_size("1.00KiB"), Some(1024));
        assert_eq!(parse_size("2MiB"), Some(2 * 1024 * 1024));
        assert_eq!(parse_size("1GB"), Some(1_000_000_000));
        assert_eq!(parse_size("bogus"), None);
    }
}
