//! Render driver: turns a plan into external tool invocations.

use crate::config::RenderConfig;
use crate::input::InputVideo;
use crate::plan::{format_timestamp, Plan};
use crate::{Error, Result};
use remixer_av::actions::{ConcatJob, ExtractJob, SampleAudio, VideoMode};
use remixer_av::{MediaTool, Workspace};
use std::path::PathBuf;

/// Lifecycle of a run. `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    Probing,
    Planning,
    /// Extracting sample `index` (1-based) of `total`.
    Extracting { index: usize, total: usize },
    Concatenating,
    Done,
    Failed,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Done | RunState::Failed)
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::Init => write!(f, "init"),
            RunState::Probing => write!(f, "probing"),
            RunState::Planning => write!(f, "planning"),
            RunState::Extracting { index, total } => write!(f, "extracting {}/{}", index, total),
            RunState::Concatenating => write!(f, "concatenating"),
            RunState::Done => write!(f, "done"),
            RunState::Failed => write!(f, "failed"),
        }
    }
}

/// Progress callback type
pub type ProgressCallback<'a> = &'a dyn Fn(RunState);

/// Extracts every sample of a plan, then concatenates them.
///
/// Invocations are strictly sequential: each external call completes before
/// the next one is issued.
pub struct Renderer<'a> {
    tool: &'a dyn MediaTool,
    config: &'a RenderConfig,
    progress_callback: Option<ProgressCallback<'a>>,
}

impl<'a> Renderer<'a> {
    pub fn new(tool: &'a dyn MediaTool, config: &'a RenderConfig) -> Self {
        Self {
            tool,
            config,
            progress_callback: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback<'a>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn report(&self, state: RunState) {
        if let Some(cb) = self.progress_callback {
            cb(state);
        }
        tracing::debug!("State: {}", state);
    }

    /// How the samples of `plan` are encoded.
    ///
    /// Samples from different files never share codec parameters, so they
    /// are re-encoded even when conversion was turned off.
    pub fn video_mode(&self, plan: &Plan) -> VideoMode {
        let sources = plan.sources().len();
        if self.config.convert || sources > 1 {
            if !self.config.convert {
                tracing::info!(
                    "Re-encoding samples: the plan draws from {} different files",
                    sources
                );
            }
            VideoMode::Encode(self.config.encode_settings())
        } else {
            VideoMode::Copy
        }
    }

    /// Where the audio of samples comes from, per input.
    ///
    /// The concat demuxer needs every sample to have the same streams, so a
    /// source without audio gets silence when other sampled sources have
    /// audio.
    pub fn sample_audio(&self, plan: &Plan, inputs: &[InputVideo]) -> Vec<SampleAudio> {
        let any_audio = plan.sources().iter().any(|&i| inputs[i].has_audio);
        inputs
            .iter()
            .map(|input| match (self.config.audio, input.has_audio, any_audio) {
                (false, _, _) => SampleAudio::Drop,
                (true, true, _) => SampleAudio::Source,
                (true, false, true) => SampleAudio::Silence,
                (true, false, false) => SampleAudio::Drop,
            })
            .collect()
    }

    /// Render `plan` into the configured output path.
    ///
    /// On failure the temporary artifacts are removed, or kept when
    /// `keep_temp` is set, before the error is returned.
    pub fn render(&self, plan: &Plan, inputs: &[InputVideo]) -> Result<PathBuf> {
        if let Err(e) = Self::check_plan(plan, inputs) {
            self.report(RunState::Failed);
            return Err(e);
        }

        let workspace = match Workspace::new(&self.config.output) {
            Ok(ws) => ws,
            Err(e) => {
                self.report(RunState::Failed);
                return Err(e.into());
            }
        };
        tracing::debug!("Workspace: {:?}", workspace.temp_dir());

        let result = self.render_in(&workspace, plan, inputs);

        match result {
            Ok(output) => {
                self.release(workspace);
                self.report(RunState::Done);
                Ok(output)
            }
            Err(e) => {
                self.report(RunState::Failed);
                self.release(workspace);
                Err(e)
            }
        }
    }

    fn check_plan(plan: &Plan, inputs: &[InputVideo]) -> Result<()> {
        if plan.is_empty() {
            return Err(Error::InvalidInput("plan has no samples".into()));
        }
        if let Some(sample) = plan.iter().find(|s| s.source >= inputs.len()) {
            return Err(Error::InvalidInput(format!(
                "sample references input #{} but only {} inputs were given",
                sample.source,
                inputs.len()
            )));
        }
        Ok(())
    }

    fn render_in(&self, workspace: &Workspace, plan: &Plan, inputs: &[InputVideo]) -> Result<PathBuf> {
        let video = self.video_mode(plan);
        let audio = self.sample_audio(plan, inputs);
        let total = plan.len();
        let mut artifacts = Vec::with_capacity(total);

        for (i, sample) in plan.iter().enumerate() {
            self.report(RunState::Extracting {
                index: i + 1,
                total,
            });

            let source = &inputs[sample.source];
            tracing::info!(
                "[{}/{}] {} @ {} (+{:.3}s)",
                i + 1,
                total,
                source.path.display(),
                format_timestamp(sample.start),
                sample.length
            );

            let job = ExtractJob {
                source: source.path.clone(),
                start: sample.start,
                length: sample.length,
                output: workspace.sample_file(i),
                video,
                audio: audio[sample.source],
            };
            self.tool.run_extract(&job)?;
            artifacts.push(job.output);
        }

        self.report(RunState::Concatenating);
        tracing::info!(
            "Concatenating {} samples into {}",
            artifacts.len(),
            workspace.destination().display()
        );

        self.tool.run_concat(&ConcatJob {
            list_file: workspace.concat_list(),
            inputs: artifacts,
            output: workspace.output().to_path_buf(),
            audio: self.config.audio_mode(),
        })?;

        Ok(workspace.finalize()?)
    }

    fn release(&self, workspace: Workspace) {
        if self.config.keep_temp {
            let dir = workspace.keep();
            tracing::warn!("Temporary files kept in {}", dir.display());
        } else {
            workspace.cleanup();
        }
    }
}
