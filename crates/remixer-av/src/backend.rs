//! The seam between remixer and the external media tools.

use crate::actions::{concat_args, extract_args, write_concat_list, ConcatJob, ExtractJob};
use crate::probe::{probe_with_ffprobe, MediaInfo};
use crate::{Result, ToolCommand, ToolPaths};
use std::path::Path;

/// Everything remixer asks of an external media tool.
///
/// The production implementation is [`Ffmpeg`]; tests substitute a fake that
/// records calls and never spawns a process.
pub trait MediaTool {
    /// Read the duration and stream layout of `path`.
    fn probe(&self, path: &Path) -> Result<MediaInfo>;

    /// Extract one sample into its own artifact.
    fn run_extract(&self, job: &ExtractJob) -> Result<()>;

    /// Concatenate the extracted artifacts into the final output.
    fn run_concat(&self, job: &ConcatJob) -> Result<()>;
}

/// [`MediaTool`] backed by the ffmpeg and ffprobe executables.
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    paths: ToolPaths,
    echo_output: bool,
}

impl Ffmpeg {
    pub fn new(paths: ToolPaths) -> Self {
        Self {
            paths,
            echo_output: true,
        }
    }

    /// Whether ffmpeg's own log output is forwarded to the terminal.
    pub fn with_echo_output(mut self, echo: bool) -> Self {
        self.echo_output = echo;
        self
    }

    fn ffmpeg_command(&self) -> ToolCommand {
        let mut cmd = ToolCommand::new(self.paths.ffmpeg.clone());
        cmd.args(["-hide_banner", "-nostdin"]);
        if !self.echo_output {
            cmd.arg("-nostats");
        }
        cmd.echo_stderr(self.echo_output);
        cmd
    }
}

impl MediaTool for Ffmpeg {
    fn probe(&self, path: &Path) -> Result<MediaInfo> {
        probe_with_ffprobe(&self.paths.ffprobe, path)
    }

    fn run_extract(&self, job: &ExtractJob) -> Result<()> {
        tracing::debug!(
            "Extracting {:?} [{:.3}s +{:.3}s] -> {:?}",
            job.source,
            job.start,
            job.length,
            job.output
        );
        self.ffmpeg_command().args(extract_args(job)).execute()?;
        Ok(())
    }

    fn run_concat(&self, job: &ConcatJob) -> Result<()> {
        tracing::debug!(
            "Concatenating {} samples -> {:?}",
            job.inputs.len(),
            job.output
        );
        write_concat_list(job)?;
        self.ffmpeg_command().args(concat_args(job)).execute()?;
        Ok(())
    }
}
