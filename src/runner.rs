//! One end-to-end run: probe, plan, render.

use crate::config::RenderConfig;
use crate::input::{probe_inputs, InputVideo};
use crate::plan::{build_plan, Plan};
use crate::render::{ProgressCallback, RunState, Renderer};
use crate::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use remixer_av::MediaTool;
use std::path::PathBuf;

/// What a successful run produced.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Dry mode: the plan was computed but nothing was rendered.
    DryRun { inputs: Vec<InputVideo>, plan: Plan },
    /// The output file was written.
    Rendered {
        inputs: Vec<InputVideo>,
        plan: Plan,
        output: PathBuf,
    },
}

impl Outcome {
    pub fn plan(&self) -> &Plan {
        match self {
            Outcome::DryRun { plan, .. } | Outcome::Rendered { plan, .. } => plan,
        }
    }

    pub fn inputs(&self) -> &[InputVideo] {
        match self {
            Outcome::DryRun { inputs, .. } | Outcome::Rendered { inputs, .. } => inputs,
        }
    }
}

/// Drives a run through its states.
pub struct Runner<'a> {
    tool: &'a dyn MediaTool,
    config: &'a RenderConfig,
    progress_callback: Option<ProgressCallback<'a>>,
}

impl<'a> Runner<'a> {
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

    fn failed<T>(&self, result: Result<T>) -> Result<T> {
        if result.is_err() {
            self.report(RunState::Failed);
        }
        result
    }

    pub fn run(&self) -> Result<Outcome> {
        self.report(RunState::Init);

        self.report(RunState::Probing);
        let inputs = self.failed(probe_inputs(self.tool, &self.config.inputs))?;

        self.report(RunState::Planning);
        tracing::info!("Random seed: {}", self.config.seed);
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let plan = self.failed(build_plan(&inputs, &self.config.plan_settings(), &mut rng))?;
        tracing::info!(
            "Planned {} samples of {:.3}s ({:.3}s total) from {} of {} inputs",
            plan.len(),
            plan.sample_duration,
            plan.total_duration(),
            plan.sources().len(),
            inputs.len()
        );

        if self.config.dry {
            tracing::info!("[DRY RUN] Would extract {} samples", plan.len());
            self.report(RunState::Done);
            return Ok(Outcome::DryRun { inputs, plan });
        }

        let mut renderer = Renderer::new(self.tool, self.config);
        if let Some(cb) = self.progress_callback {
            renderer = renderer.with_progress_callback(cb);
        }
        let output = renderer.render(&plan, &inputs)?;

        Ok(Outcome::Rendered {
            inputs,
            plan,
            output,
        })
    }
}
