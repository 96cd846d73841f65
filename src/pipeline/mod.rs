//! The request processing pipeline.
//!
//! A run is a fold over a fixed sequence of steps: each step consumes the
//! working file path (the token) plus the format context and returns the
//! next pair. The first error aborts the run.

pub mod classify;
pub mod command;
pub mod proxy;
pub mod steps;
pub mod workspace;

use std::path::PathBuf;

use anyhow::Result;

use crate::common::{ANIMATED_IMAGE_FORMAT, VIDEO_OUTPUT_FORMAT};
use crate::models::process_args::ProcessArgs;
use crate::observe::DiagnosticSink;
use crate::pipeline::classify::Classifier;
use crate::pipeline::steps::{Fetch, PostProcess, Preprocess, Transform};
use crate::pipeline::workspace::Workspace;

/// Format state threaded through a pipeline run.
///
/// `request_format` is the caller's intent and never changes. `format` is
/// the current best-known output format; preprocessing reassigns it when
/// the asset turns out to be animated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineContext {
    pub request_format: String,
    pub format: String,
}

impl PipelineContext {
    pub fn new(args: &ProcessArgs) -> Self {
        Self {
            request_format: args.request_format.clone(),
            format: args.format.clone(),
        }
    }
}

/// The one place that knows multi-frame assets must leave the pipeline as
/// [`ANIMATED_IMAGE_FORMAT`]: upstream format metadata cannot be trusted
/// for animated assets, so the observed frame count overrides it.
pub fn apply_animated_override(mut ctx: PipelineContext) -> PipelineContext {
    ctx.format = ANIMATED_IMAGE_FORMAT.to_string();
    ctx
}

/// Post-processing runs only when the caller asked for video out but the
/// asset turned out to be an animated image.
pub fn needs_video_conversion(ctx: &PipelineContext) -> bool {
    ctx.request_format == VIDEO_OUTPUT_FORMAT && ctx.format == ANIMATED_IMAGE_FORMAT
}

/// Everything a step may need besides the token and context.
pub struct PipelineEnv<'a> {
    pub args: &'a ProcessArgs,
    pub client: &'a reqwest::Client,
    pub classifier: &'a Classifier,
    pub sink: &'a dyn DiagnosticSink,
    pub convert_command: &'a str,
    pub ffmpeg_command: &'a str,
}

#[rocket::async_trait]
pub trait PipelineStep: Sync {
    fn name(&self) -> &'static str;

    async fn execute(
        &self,
        env: &PipelineEnv<'_>,
        workspace: &Workspace,
        token: PathBuf,
        ctx: PipelineContext,
    ) -> Result<(PathBuf, PipelineContext)>;
}

/// Run the full step sequence, stopping at the first error. Returns the
/// final working file, ready to serve.
pub async fn run_pipeline(env: &PipelineEnv<'_>, workspace: &Workspace) -> Result<PathBuf> {
    let steps: [&dyn PipelineStep; 4] = [&Fetch, &Preprocess, &Transform, &PostProcess];

    let mut token = PathBuf::new();
    let mut ctx = PipelineContext::new(env.args);
    for step in steps {
        (token, ctx) = step.execute(env, workspace, token, ctx).await?;
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(request_format: &str, format: &str) -> PipelineContext {
        PipelineContext {
            request_format: request_format.to_string(),
            format: format.to_string(),
        }
    }

    #[test]
    fn animated_override_forces_gif_and_keeps_intent() {
        let overridden = apply_animated_override(ctx("mp4", "png"));

        assert_eq!(overridden.request_format, "mp4");
        assert_eq!(overridden.format, "gif");
    }

    #[test]
    fn video_conversion_requires_both_conditions() {
        assert!(needs_video_conversion(&ctx("mp4", "gif")));
        assert!(!needs_video_conversion(&ctx("mp4", "png")));
        assert!(!needs_video_conversion(&ctx("gif", "gif")));
        assert!(!needs_video_conversion(&ctx("png", "png")));
    }

    #[test]
    fn the_step_sequence_is_fixed() {
        let steps: [&dyn PipelineStep; 4] = [&Fetch, &Preprocess, &Transform, &PostProcess];
        let names: Vec<_> = steps.iter().map(|step| step.name()).collect();

        assert_eq!(names, ["fetch", "preprocess", "transform", "post-process"]);
    }
}
