//! Sample extraction.

use std::ffi::OsString;
use std::path::PathBuf;

/// Re-encoding parameters applied to every extracted sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeSettings {
    pub width: u32,
    pub height: u32,
    pub framerate: u32,
    /// libx264 constant rate factor.
    pub crf: u8,
}

/// How the video stream of a sample is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoMode {
    /// Stream copy, no re-encoding. Cuts land on the nearest keyframe.
    Copy,
    /// Re-encode with libx264 into a uniform size and framerate.
    Encode(EncodeSettings),
}

/// Where the audio stream of a sample comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleAudio {
    /// The first audio stream of the source, if it has one.
    Source,
    /// Generated silence, for sources without audio whose samples are
    /// concatenated with samples that have it.
    Silence,
    /// No audio stream.
    Drop,
}

/// One `[start, start + length)` slice of a source file.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractJob {
    pub source: PathBuf,
    pub start: f64,
    pub length: f64,
    pub output: PathBuf,
    pub video: VideoMode,
    pub audio: SampleAudio,
}

/// lavfi source matching the PCM layout of extracted samples.
const SILENCE_SOURCE: &str = "anullsrc=channel_layout=stereo:sample_rate=48000";

/// Build the ffmpeg arguments for an extraction.
///
/// Audio is written as PCM so that the final concatenation is the only lossy
/// audio encode. The intermediate container is Matroska, which accepts PCM
/// and any copied video codec.
pub fn extract_args(job: &ExtractJob) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-y".into(),
        "-ss".into(),
        format_seconds(job.start).into(),
        "-i".into(),
        job.source.clone().into(),
    ];
    if job.audio == SampleAudio::Silence {
        args.extend(["-f".into(), "lavfi".into(), "-i".into(), SILENCE_SOURCE.into()]);
    }
    args.extend([
        "-t".into(),
        format_seconds(job.length).into(),
        "-map".into(),
        "0:v:0".into(),
    ]);
    match job.audio {
        SampleAudio::Source => args.extend(["-map".into(), "0:a:0?".into()]),
        SampleAudio::Silence => args.extend(["-map".into(), "1:a:0".into()]),
        SampleAudio::Drop => args.push("-an".into()),
    }
    args.extend(["-sn".into(), "-dn".into()]);

    match job.video {
        VideoMode::Copy => {
            args.extend(["-c:v".into(), "copy".into()]);
            if job.audio != SampleAudio::Drop {
                args.extend(["-c:a".into(), "pcm_s16le".into()]);
            }
        }
        VideoMode::Encode(settings) => {
            args.extend([
                "-vf".into(),
                format!(
                    "scale={}:{},setsar=1,fps={}",
                    settings.width, settings.height, settings.framerate
                )
                .into(),
                "-c:v".into(),
                "libx264".into(),
                "-crf".into(),
                settings.crf.to_string().into(),
                "-pix_fmt".into(),
                "yuv420p".into(),
            ]);
            // Samples from different sources must agree on audio layout for
            // the concat demuxer.
            if job.audio != SampleAudio::Drop {
                args.extend([
                    "-c:a".into(),
                    "pcm_s16le".into(),
                    "-ar".into(),
                    "48000".into(),
                    "-ac".into(),
                    "2".into(),
                ]);
            }
        }
    }

    args.extend(["-f".into(), "matroska".into(), job.output.clone().into()]);
    args
}

/// Seconds with millisecond precision, the resolution ffmpeg seeks at anyway.
pub(crate) fn format_seconds(secs: f64) -> String {
    format!("{:.3}", secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(video: VideoMode) -> ExtractJob {
        ExtractJob {
            source: PathBuf::from("/videos/in.mp4"),
            start: 12.3456,
            length: 5.0,
            output: PathBuf::from("/tmp/ws/sample_00001.mkv"),
            video,
            audio: SampleAudio::Source,
        }
    }

    const ENCODE: VideoMode = VideoMode::Encode(EncodeSettings {
        width: 1920,
        height: 1080,
        framerate: 30,
        crf: 23,
    });

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_copy_mode_args() {
        let args = strings(extract_args(&job(VideoMode::Copy)));
        let joined = args.join(" ");
        assert!(joined.starts_with("-y -ss 12.346 -i /videos/in.mp4 -t 5.000"));
        assert!(joined.contains("-c:v copy"));
        assert!(!joined.contains("libx264"));
        assert!(!joined.contains("-vf"));
        assert_eq!(args.last().map(String::as_str), Some("/tmp/ws/sample_00001.mkv"));
    }

    #[test]
    fn test_encode_mode_args() {
        let args = strings(extract_args(&job(VideoMode::Encode(EncodeSettings {
            width: 1280,
            height: 720,
            framerate: 25,
            crf: 20,
        }))));
        let joined = args.join(" ");
        assert!(joined.contains("-vf scale=1280:720,setsar=1,fps=25"));
        assert!(joined.contains("-c:v libx264 -crf 20"));
        assert!(joined.contains("-ar 48000 -ac 2"));
    }

    #[test]
    fn test_seek_precedes_input() {
        let args = strings(extract_args(&job(VideoMode::Copy)));
        let ss = args.iter().position(|a| a == "-ss").unwrap();
        let input = args.iter().position(|a| a == "-i").unwrap();
        assert!(ss < input);
    }

    #[test]
    fn test_source_audio_is_optional_map() {
        let joined = strings(extract_args(&job(ENCODE))).join(" ");
        assert!(joined.contains("-map 0:v:0 -map 0:a:0?"));
        assert!(!joined.contains("lavfi"));
    }

    #[test]
    fn test_silence_fills_missing_audio() {
        let mut job = job(ENCODE);
        job.audio = SampleAudio::Silence;
        let args = strings(extract_args(&job));
        let joined = args.join(" ");
        assert!(joined.contains(
            "-i /videos/in.mp4 -f lavfi -i anullsrc=channel_layout=stereo:sample_rate=48000 -t 5.000"
        ));
        assert!(joined.contains("-map 0:v:0 -map 1:a:0"));
        assert!(!joined.contains("0:a:0"));
        assert!(joined.contains("-c:a pcm_s16le -ar 48000 -ac 2"));
    }

    #[test]
    fn test_dropped_audio() {
        let mut job = job(VideoMode::Copy);
        job.audio = SampleAudio::Drop;
        let joined = strings(extract_args(&job)).join(" ");
        assert!(joined.contains("-map 0:v:0 -an"));
        assert!(!joined.contains("-c:a"));
    }
}
