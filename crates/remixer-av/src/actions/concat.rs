//! Final concatenation through the ffmpeg concat demuxer.

use crate::Result;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Audio handling for the final output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioMode {
    /// Drop all audio.
    Drop,
    /// Encode to AAC at the given bitrate in kbit/s.
    Aac { bitrate_kbps: u32 },
}

/// Concatenate `inputs` in order into `output`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcatJob {
    /// Where the ffconcat list file is written.
    pub list_file: PathBuf,
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    pub audio: AudioMode,
}

/// Render an `ffconcat version 1.0` list for the given files.
pub fn concat_list(inputs: &[PathBuf]) -> String {
    let mut list = String::from("ffconcat version 1.0\n");
    for input in inputs {
        let path = input.to_string_lossy();
        list.push_str(&format!("file '{}'\n", path.replace('\'', "'\\''")));
    }
    list
}

/// Write the list file for a concat job.
pub fn write_concat_list(job: &ConcatJob) -> Result<()> {
    std::fs::write(&job.list_file, concat_list(&job.inputs))?;
    Ok(())
}

/// Build the ffmpeg arguments for the final concatenation.
///
/// Video is stream-copied because every sample already has the target
/// geometry; audio bitrate is applied only here.
pub fn concat_args(job: &ConcatJob) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-y".into(),
        "-f".into(),
        "concat".into(),
        "-safe".into(),
        "0".into(),
        "-i".into(),
        job.list_file.clone().into(),
        "-map".into(),
        "0:v".into(),
        "-c:v".into(),
        "copy".into(),
    ];

    match job.audio {
        AudioMode::Drop => args.push("-an".into()),
        AudioMode::Aac { bitrate_kbps } => args.extend([
            "-map".into(),
            "0:a?".into(),
            "-c:a".into(),
            "aac".into(),
            "-b:a".into(),
            format!("{}k", bitrate_kbps).into(),
        ]),
    }

    if is_mp4_family(&job.output) {
        args.extend(["-movflags".into(), "+faststart".into()]);
    }

    args.push(job.output.clone().into());
    args
}

fn is_mp4_family(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref(),
        Some("mp4" | "m4v" | "mov")
    )
}
