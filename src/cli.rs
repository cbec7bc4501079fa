use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// Two-letter single-dash flags accepted for compatibility, with the long
/// flag each one stands for. clap would otherwise read them as clusters of
/// one-letter flags, e.g. `-ab` as `-a -b`.
const LEGACY_FLAGS: [(&str, &str); 4] = [
    ("-qf", "--quiet-ffmpeg"),
    ("-nc", "--no-convert"),
    ("-na", "--no-audio"),
    ("-ab", "--audio-bitrate"),
];

/// Rewrite legacy two-letter flags to their long forms.
///
/// `-ab=192` becomes `--audio-bitrate=192`. Arguments after `--` are left
/// alone.
pub fn expand_legacy_flags<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut positional_only = false;
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if positional_only {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                positional_only = true;
                return arg;
            }
            for (short, long) in LEGACY_FLAGS {
                if text == short {
                    return OsString::from(long);
                }
                if let Some(value) = text.strip_prefix(short).and_then(|r| r.strip_prefix('=')) {
                    return OsString::from(format!("{}={}", long, value));
                }
            }
            arg
        })
        .collect()
}

impl Cli {
    /// Parse the process arguments, accepting the legacy two-letter flags.
    pub fn parse_args() -> Self {
        Self::parse_from(expand_legacy_flags(std::env::args_os()))
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "remixer")]
#[command(
    author,
    version,
    about = "Randomize videos by taking small random samples and merging them together"
)]
pub struct Cli {
    /// Input files
    #[arg(required_unless_present = "check_tools", num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Output video path (default: random_[time].mp4)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Duration of the output video in seconds
    #[arg(short, long, default_value_t = 60.0)]
    pub duration: f64,

    /// Duration of each sample in seconds
    #[arg(short, long, default_value_t = 1.0)]
    pub sample: f64,

    /// Output video height (default: 1080p)
    #[arg(short = 'p', long, value_parser = clap::value_parser!(u32).range(2..))]
    pub height: Option<u32>,

    /// Output video width (default: auto for 16:9)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(2..))]
    pub width: Option<u32>,

    /// Output video framerate (default: 30fps)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub framerate: Option<u32>,

    /// Input content to ignore at both start and end, in %
    #[arg(short, long, default_value_t = 10.0)]
    pub ignore: f64,

    /// Dry mode, compute and print the plan without producing a video
    #[arg(long)]
    pub dry: bool,

    /// Silent mode
    #[arg(short, long)]
    pub quiet: bool,

    /// Do not forward ffmpeg output
    #[arg(short = 'Q', long, visible_alias = "ffmpeg-quiet")]
    pub quiet_ffmpeg: bool,

    /// libx264 Constant Rate Factor
    #[arg(long, default_value_t = 23, value_parser = clap::value_parser!(u8).range(0..=51))]
    pub crf: u8,

    /// Random seed (default: random, printed so a run can be reproduced)
    #[arg(short = 'r', long)]
    pub seed: Option<u64>,

    /// Path to the ffmpeg executable (default: search PATH)
    #[arg(long)]
    pub ffmpeg: Option<PathBuf>,

    /// Path to the ffprobe executable (default: next to ffmpeg, then PATH)
    #[arg(long)]
    pub ffprobe: Option<PathBuf>,

    /// Never re-encode unless samples come from several files (default with a single input)
    #[arg(short = 'n', long, conflicts_with = "convert")]
    pub no_convert: bool,

    /// Re-encode even a single input to the output size and framerate
    #[arg(short = 'c', long)]
    pub convert: bool,

    /// Drop audio from the output
    #[arg(short = 'a', long)]
    pub no_audio: bool,

    /// Output audio bitrate in kbit/s
    #[arg(short = 'b', long, default_value_t = 128, value_parser = clap::value_parser!(u32).range(1..))]
    pub audio_bitrate: u32,

    /// Keep the temporary sample files after the run
    #[arg(long)]
    pub keep_temp: bool,

    /// Print the plan as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Check that ffmpeg and ffprobe are available, then exit
    #[arg(long)]
    pub check_tools: bool,

    /// Enable verbose logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,
}
