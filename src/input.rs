//! Input videos and their usable windows.

use crate::{Error, Result};
use remixer_av::MediaTool;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A probed input video. Immutable once probed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputVideo {
    pub path: PathBuf,
    /// Duration in seconds.
    pub duration: f64,
    /// Whether the file has an audio stream.
    pub has_audio: bool,
}

/// The part of a video's timeline left after removing the ignore margin at
/// both ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UsableWindow {
    pub start: f64,
    pub end: f64,
}

impl UsableWindow {
    pub fn len(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0.0
    }

    /// Whether a sample of `length` seconds fits.
    pub fn fits(&self, length: f64) -> bool {
        self.len() >= length
    }
}

impl InputVideo {
    pub fn new(path: impl Into<PathBuf>, duration: f64) -> Self {
        Self {
            path: path.into(),
            duration,
            has_audio: true,
        }
    }

    pub fn with_audio(mut self, has_audio: bool) -> Self {
        self.has_audio = has_audio;
        self
    }

    /// Usable window for an ignore margin given in percent.
    pub fn usable_window(&self, ignore_percent: f64) -> UsableWindow {
        let ignore = ignore_percent / 100.0;
        UsableWindow {
            start: self.duration * ignore,
            end: self.duration * (1.0 - ignore),
        }
    }

    /// Probe one file.
    ///
    /// Missing files and files without a video stream are invalid input;
    /// a failing prober is a tool error.
    pub fn probe(tool: &dyn MediaTool, path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::InvalidInput(format!(
                "input file not found: {}",
                path.display()
            )));
        }

        let info = tool.probe(path)?;
        if info.video.is_none() {
            return Err(Error::InvalidInput(format!(
                "no video stream in {}",
                path.display()
            )));
        }
        let duration = info.duration.ok_or_else(|| {
            Error::InvalidInput(format!("unknown duration for {}", path.display()))
        })?;

        tracing::debug!(
            "Probed {:?}: {:.3}s ({}, audio: {})",
            path,
            duration,
            info.container,
            info.has_audio
        );
        Ok(Self::new(path, duration).with_audio(info.has_audio))
    }
}

/// Probe every input, in order, one call per file.
pub fn probe_inputs(tool: &dyn MediaTool, paths: &[PathBuf]) -> Result<Vec<InputVideo>> {
    paths.iter().map(|p| InputVideo::probe(tool, p)).collect()
}
