//! Run configuration.
//!
//! [`RenderConfig::derive`] turns parsed command-line options into the
//! immutable configuration of a run. Defaults that depend on the number of
//! inputs are resolved here rather than in the parser.

use crate::cli::Cli;
use crate::plan::{sample_count, too_many_samples, PlanSettings};
use crate::{Error, Result};
use remixer_av::actions::{AudioMode, EncodeSettings};
use serde::Serialize;
use std::path::PathBuf;

/// Output size used when neither width nor height is given.
pub const DEFAULT_SCALE: Scale = Scale {
    width: 1920,
    height: 1080,
};

/// Framerate used when none is given.
pub const DEFAULT_FRAMERATE: u32 = 30;

/// Output frame size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scale {
    pub width: u32,
    pub height: u32,
}

impl Scale {
    /// Resolve a frame size from optional dimensions, filling the missing
    /// side for a 16:9 aspect ratio.
    pub fn resolve(width: Option<u32>, height: Option<u32>) -> Self {
        match (width, height) {
            (None, None) => DEFAULT_SCALE,
            (Some(w), None) => Self {
                width: even(w as f64),
                height: even(w as f64 * 9.0 / 16.0),
            },
            (None, Some(h)) => Self {
                width: even(h as f64 * 16.0 / 9.0),
                height: even(h as f64),
            },
            (Some(w), Some(h)) => Self {
                width: even(w as f64),
                height: even(h as f64),
            },
        }
    }
}

impl std::fmt::Display for Scale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// libx264 with yuv420p needs even dimensions.
fn even(x: f64) -> u32 {
    (((x / 2.0).round() as u32) * 2).max(2)
}

/// Immutable configuration of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RenderConfig {
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    /// Requested output duration in seconds.
    pub total_duration: f64,
    /// Length of every sample in seconds.
    pub sample_duration: f64,
    pub scale: Scale,
    pub framerate: u32,
    /// Margin ignored at both ends of each input, in percent.
    pub ignore_percent: f64,
    pub crf: u8,
    pub audio: bool,
    /// Output audio bitrate in kbit/s.
    pub audio_bitrate: u32,
    /// Re-encode samples to `scale`/`framerate`. Samples are re-encoded
    /// regardless when the plan draws from more than one file.
    pub convert: bool,
    pub seed: u64,
    pub dry: bool,
    pub quiet: bool,
    pub quiet_ffmpeg: bool,
    pub keep_temp: bool,
    pub json: bool,
    pub ffmpeg: Option<PathBuf>,
    pub ffprobe: Option<PathBuf>,
}

impl RenderConfig {
    /// Derive the configuration using the current time and a fresh seed.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        Self::derive(cli, chrono::Utc::now().timestamp(), rand::random())
    }

    /// Derive the configuration from parsed options.
    ///
    /// `now` (unix seconds) names the default output and `fallback_seed` is
    /// used when no seed was given, which keeps this function pure.
    pub fn derive(cli: &Cli, now: i64, fallback_seed: u64) -> Result<Self> {
        if !(cli.duration.is_finite() && cli.duration > 0.0) {
            return Err(Error::Argument(format!(
                "duration must be a positive number of seconds, got {}",
                cli.duration
            )));
        }
        if !(cli.sample.is_finite() && cli.sample > 0.0) {
            return Err(Error::Argument(format!(
                "sample must be a positive number of seconds, got {}",
                cli.sample
            )));
        }
        if sample_count(cli.duration, cli.sample).is_none() {
            return Err(too_many_samples(cli.duration, cli.sample));
        }
        if !(0.0..50.0).contains(&cli.ignore) {
            return Err(Error::Argument(format!(
                "ignore must be at least 0 and below 50 percent, got {}",
                cli.ignore
            )));
        }
        if cli.files.is_empty() {
            return Err(Error::Argument("at least one input file is required".into()));
        }

        let explicit_geometry =
            cli.width.is_some() || cli.height.is_some() || cli.framerate.is_some();
        let convert = if cli.no_convert {
            false
        } else if cli.convert {
            true
        } else {
            cli.files.len() > 1 || explicit_geometry
        };

        let output = cli
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("random_{}.mp4", now)));

        Ok(Self {
            inputs: cli.files.clone(),
            output,
            total_duration: cli.duration,
            sample_duration: cli.sample,
            scale: Scale::resolve(cli.width, cli.height),
            framerate: cli.framerate.unwrap_or(DEFAULT_FRAMERATE),
            ignore_percent: cli.ignore,
            crf: cli.crf,
            audio: !cli.no_audio,
            audio_bitrate: cli.audio_bitrate,
            convert,
            seed: cli.seed.unwrap_or(fallback_seed),
            dry: cli.dry,
            quiet: cli.quiet,
            quiet_ffmpeg: cli.quiet || cli.quiet_ffmpeg,
            keep_temp: cli.keep_temp,
            json: cli.json,
            ffmpeg: cli.ffmpeg.clone(),
            ffprobe: cli.ffprobe.clone(),
        })
    }

    pub fn plan_settings(&self) -> PlanSettings {
        PlanSettings {
            total_duration: self.total_duration,
            sample_duration: self.sample_duration,
            ignore_percent: self.ignore_percent,
        }
    }

    pub fn encode_settings(&self) -> EncodeSettings {
        EncodeSettings {
            width: self.scale.width,
            height: self.scale.height,
            framerate: self.framerate,
            crf: self.crf,
        }
    }

    pub fn audio_mode(&self) -> AudioMode {
        if self.audio {
            AudioMode::Aac {
                bitrate_kbps: self.audio_bitrate,
            }
        } else {
            AudioMode::Drop
        }
    }
}
