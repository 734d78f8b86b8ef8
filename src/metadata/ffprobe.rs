// FFprobe wrapper for metadata extraction

use std::path::Path;
use std::process::Command;
use serde::Deserialize;
use crate::error::{RemixError, Result};
use crate::metadata::MediaMetadata;

#[derive(Debug, Deserialize)]
struct FFprobeOutput {
    streams: Option<Vec<FFprobeStream>>,
    format: Option<FFprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FFprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<i32>,
    height: Option<i32>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FFprobeFormat {
    duration: Option<String>,
}

/// Run ffprobe on a file and extract metadata
pub fn probe(path: &Path) -> Result<MediaMetadata> {
    if !path.exists() {
        return Err(RemixError::NotFound(path.to_string_lossy().to_string()));
    }

    let output = Command::new(crate::tools::ffprobe_path())
        .args([
            "-v", "quiet",
            "-print_format", "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .map_err(|e| RemixError::FFprobe(format!("Failed to run ffprobe: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RemixError::FFprobe(format!("ffprobe failed: {}", stderr)));
    }

    let probe_output: FFprobeOutput = serde_json::from_slice(&output.stdout)
        .map_err(|e| RemixError::FFprobe(format!("Failed to parse ffprobe output: {}", e)))?;

    let mut meta = MediaMetadata::default();

    // Extract video stream info
    if let Some(ref streams) = probe_output.streams {
        for stream in streams {
            if stream.codec_type.as_deref() == Some("video") {
                meta.codec = stream.codec_name.clone();
                meta.width = stream.width;
                meta.height = stream.height;
                if meta.duration_seconds.is_none() {
                    meta.duration_seconds = parse_duration(stream.duration.as_deref());
                }
            }
        }
    }

    // Fall back to format-level duration
    if let Some(ref format) = probe_output.format {
        if meta.duration_seconds.is_none() {
            meta.duration_seconds = parse_duration(format.duration.as_deref());
        }
    }

    Ok(meta)
}

/// Parse an ffprobe duration string to seconds
fn parse_duration(duration_str: Option<&str>) -> Option<f64> {
    let seconds: f64 = duration_str?.parse().ok()?;
    if seconds.is_finite() && seconds >= 0.0 {
        Some(seconds)
    } else {
        None
    }
}

/// Check if ffprobe is available
pub fn is_available() -> bool {
    crate::tools::is_tool_available("ffprobe")
}
