//! Shared test harness for integration tests.
//!
//! Provides [`FakeTool`], a [`MediaTool`] that records every call and writes
//! placeholder files instead of running ffmpeg, and [`Fixture`], a scratch
//! directory with input files and a config builder.

#![allow(dead_code)]

use clap::Parser;
use remixer::cli::Cli;
use remixer::config::RenderConfig;
use remixer_av::actions::{ConcatJob, ExtractJob};
use remixer_av::{Error, MediaInfo, MediaTool, Result, VideoStream};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// One recorded call on the fake tool.
#[derive(Debug, Clone)]
pub enum Call {
    Probe(PathBuf),
    Extract(ExtractJob),
    Concat(ConcatJob),
}

/// Recording stand-in for ffmpeg/ffprobe.
#[derive(Default)]
pub struct FakeTool {
    videos: HashMap<PathBuf, (f64, bool)>,
    fail_extract_at: Option<usize>,
    fail_concat: bool,
    calls: RefCell<Vec<Call>>,
}

impl FakeTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `duration` seconds when `path` is probed. Unknown paths fail
    /// to probe.
    pub fn with_video(mut self, path: &Path, duration: f64) -> Self {
        self.videos.insert(path.to_path_buf(), (duration, true));
        self
    }

    /// Like [`FakeTool::with_video`], for a file without an audio stream.
    pub fn with_silent_video(mut self, path: &Path, duration: f64) -> Self {
        self.videos.insert(path.to_path_buf(), (duration, false));
        self
    }

    /// Fail the extraction with zero-based index `index`.
    pub fn failing_extract_at(mut self, index: usize) -> Self {
        self.fail_extract_at = Some(index);
        self
    }

    pub fn failing_concat(mut self) -> Self {
        self.fail_concat = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn extracts(&self) -> Vec<ExtractJob> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Extract(job) => Some(job.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn concats(&self) -> Vec<ConcatJob> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Concat(job) => Some(job.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of extract and concat calls, i.e. everything but probes.
    pub fn render_calls(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| !matches!(c, Call::Probe(_)))
            .count()
    }
}

impl MediaTool for FakeTool {
    fn probe(&self, path: &Path) -> Result<MediaInfo> {
        self.calls.borrow_mut().push(Call::Probe(path.to_path_buf()));
        let (duration, has_audio) = self
            .videos
            .get(path)
            .copied()
            .ok_or_else(|| Error::tool_failed("ffprobe", Some(1), "Invalid data found"))?;
        Ok(MediaInfo {
            file_path: path.to_path_buf(),
            container: "mov,mp4,m4a,3gp,3g2,mj2".to_string(),
            duration: Some(duration),
            video: Some(VideoStream {
                codec: "h264".to_string(),
                width: 1920,
                height: 1080,
                frame_rate: Some(30.0),
            }),
            has_audio,
        })
    }

    fn run_extract(&self, job: &ExtractJob) -> Result<()> {
        let index = self.extracts().len();
        self.calls.borrow_mut().push(Call::Extract(job.clone()));
        if self.fail_extract_at == Some(index) {
            return Err(Error::tool_failed("ffmpeg", Some(1), "Conversion failed!"));
        }
        std::fs::write(&job.output, b"sample")?;
        Ok(())
    }

    fn run_concat(&self, job: &ConcatJob) -> Result<()> {
        self.calls.borrow_mut().push(Call::Concat(job.clone()));
        if self.fail_concat {
            return Err(Error::tool_failed("ffmpeg", Some(1), "Invalid data found"));
        }
        std::fs::write(&job.output, b"remix")?;
        Ok(())
    }
}

/// Scratch directory holding (empty) input files.
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create temp dir"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Create an input file and return its path.
    pub fn input(&self, name: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, b"").expect("failed to write input");
        path
    }

    /// Derive a config from command-line style arguments, with the output
    /// placed inside the fixture.
    pub fn config(&self, args: &[&str]) -> RenderConfig {
        let output = self.path("out.mp4");
        let output = output.to_string_lossy().to_string();
        let argv = ["remixer", "-o", output.as_str()]
            .into_iter()
            .chain(args.iter().copied());
        let cli = Cli::try_parse_from(argv).expect("invalid test arguments");
        RenderConfig::derive(&cli, 0, 0).expect("invalid test config")
    }

    /// Leftover workspace directories.
    pub fn workspaces(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.dir.path())
            .expect("failed to list fixture")
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.is_dir()
                    && p.file_name()
                        .map(|n| n.to_string_lossy().starts_with(".remixer-"))
                        .unwrap_or(false)
            })
            .collect()
    }
}
