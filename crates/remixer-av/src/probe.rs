//! FFprobe-based media probing.

use crate::{Error, Result, ToolCommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What remixer needs to know about an input file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Path that was probed.
    pub file_path: PathBuf,
    /// Container format name as reported by the prober.
    pub container: String,
    /// Duration in seconds, if known.
    pub duration: Option<f64>,
    /// First video stream, if any.
    pub video: Option<VideoStream>,
    /// Whether at least one audio stream is present.
    pub has_audio: bool,
}

/// Primary video stream properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoStream {
    pub codec: String,
    pub width: u32,
    pub height: u32,
    pub frame_rate: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    format_name: String,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
    #[serde(default)]
    disposition: FfprobeDisposition,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeDisposition {
    #[serde(default)]
    attached_pic: u8,
}

/// Probe a media file using the ffprobe at `ffprobe`.
pub fn probe_with_ffprobe(ffprobe: &Path, path: &Path) -> Result<MediaInfo> {
    if !path.exists() {
        return Err(Error::file_not_found(path));
    }

    let output = ToolCommand::new(ffprobe.to_path_buf())
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .execute()?;

    parse_ffprobe_output(path, &output.stdout)
}

fn parse_ffprobe_output(path: &Path, json_str: &str) -> Result<MediaInfo> {
    let output: FfprobeOutput = serde_json::from_str(json_str)
        .map_err(|e| Error::parse_error("ffprobe", e.to_string()))?;

    // Cover art shows up as a video stream with the attached_pic disposition.
    let video = output
        .streams
        .iter()
        .find(|s| s.codec_type == "video" && s.disposition.attached_pic == 0);

    let duration = output
        .format
        .duration
        .as_deref()
        .and_then(parse_seconds)
        .or_else(|| video.and_then(|v| v.duration.as_deref()).and_then(parse_seconds));

    Ok(MediaInfo {
        file_path: path.to_path_buf(),
        container: output.format.format_name,
        duration,
        video: video.map(|s| VideoStream {
            codec: s.codec_name.clone().unwrap_or_default(),
            width: s.width.unwrap_or(0),
            height: s.height.unwrap_or(0),
            frame_rate: s.r_frame_rate.as_deref().and_then(parse_frame_rate),
        }),
        has_audio: output.streams.iter().any(|s| s.codec_type == "audio"),
    })
}

fn parse_seconds(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|d| d.is_finite() && *d >= 0.0)
}

fn parse_frame_rate(rate_str: &str) -> Option<f64> {
    let parts: Vec<&str> = rate_str.split('/').collect();
    if parts.len() == 2 {
        let num: f64 = parts[0].parse().ok()?;
        let den: f64 = parts[1].parse().ok()?;
        if den != 0.0 {
            return Some(num / den);
        }
        return None;
    }
    rate_str.parse().ok()
}
