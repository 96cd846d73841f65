//! The four pipeline stages, executed strictly in order: fetch,
//! preprocess, transform, post-process.

use std::path::PathBuf;

use anyhow::{Context, Result};
use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::common::{ANIMATED_IMAGE_FORMAT, COALESCE_TIMEOUT, NORMAL_TIMEOUT};
use crate::observe::Diagnostic;
use crate::pipeline::command::run_with_timeout;
use crate::pipeline::workspace::Workspace;
use crate::pipeline::{
    PipelineContext, PipelineEnv, PipelineStep, apply_animated_override, needs_video_conversion,
};

/// Downloaded source asset.
pub const INPUT_FILE: &str = "in";
/// Frame-disposal-flattened animation.
pub const COALESCED_FILE: &str = "coalesced";
/// Transform output; gains the effective format extension when produced.
pub const OUTPUT_FILE: &str = "out";
/// Post-processed video rendition.
pub const VIDEO_FILE: &str = "video.mp4";

// ────────────────────────────────────────────────────────────────
// Fetch
// ────────────────────────────────────────────────────────────────

pub struct Fetch;

#[rocket::async_trait]
impl PipelineStep for Fetch {
    fn name(&self) -> &'static str {
        "fetch"
    }

    async fn execute(
        &self,
        env: &PipelineEnv<'_>,
        workspace: &Workspace,
        _token: PathBuf,
        ctx: PipelineContext,
    ) -> Result<(PathBuf, PipelineContext)> {
        let in_file = workspace.join(INPUT_FILE);

        env.sink.record(
            Diagnostic::new("fetch")
                .in_step("download")
                .with_message(format!("{} -> {:?}", env.args.url, in_file)),
        );

        let mut out = File::create(&in_file)
            .await
            .context(format!("failed to create {:?}", in_file))?;

        let response = env
            .client
            .get(&env.args.url)
            .timeout(NORMAL_TIMEOUT)
            .send()
            .await
            .context(format!("failed to fetch {}", env.args.url))?;

        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.context(format!("failed to read body of {}", env.args.url))?;
            out.write_all(&chunk)
                .await
                .context(format!("failed to write to {:?}", in_file))?;
        }
        out.flush()
            .await
            .context(format!("failed to flush {:?}", in_file))?;

        Ok((in_file, ctx))
    }
}

// ────────────────────────────────────────────────────────────────
// Preprocess
// ────────────────────────────────────────────────────────────────

pub struct Preprocess;

#[rocket::async_trait]
impl PipelineStep for Preprocess {
    fn name(&self) -> &'static str {
        "preprocess"
    }

    async fn execute(
        &self,
        env: &PipelineEnv<'_>,
        workspace: &Workspace,
        token: PathBuf,
        ctx: PipelineContext,
    ) -> Result<(PathBuf, PipelineContext)> {
        if !env.classifier.is_animated(env.sink, &token).await {
            return Ok((token, ctx));
        }

        let ctx = apply_animated_override(ctx);
        let coalesced = workspace.join(COALESCED_FILE);

        // convert some.gif -coalesce coalesced
        let mut cmd = Command::new(env.convert_command);
        cmd.arg(&token).arg("-coalesce").arg(&coalesced);

        run_with_timeout(cmd, COALESCE_TIMEOUT)
            .await
            .map_err(|error| {
                env.sink.record(
                    Diagnostic::new("magick")
                        .in_step("coalesce")
                        .with_failure(&error)
                        .with_output(error.output()),
                );
                anyhow::Error::from(error)
            })?;

        Ok((coalesced, ctx))
    }
}

// ────────────────────────────────────────────────────────────────
// Transform
// ────────────────────────────────────────────────────────────────

pub struct Transform;

#[rocket::async_trait]
impl PipelineStep for Transform {
    fn name(&self) -> &'static str {
        "transform"
    }

    async fn execute(
        &self,
        env: &PipelineEnv<'_>,
        workspace: &Workspace,
        token: PathBuf,
        ctx: PipelineContext,
    ) -> Result<(PathBuf, PipelineContext)> {
        let out_file = workspace.join(OUTPUT_FILE);
        let (cmd_args, out_with_format) = env.args.command_args(&token, &out_file, &ctx.format);

        env.sink.record(
            Diagnostic::new("magick")
                .in_step("convert")
                .with_args(&cmd_args),
        );

        let mut cmd = Command::new(env.convert_command);
        cmd.args(&cmd_args);

        run_with_timeout(cmd, NORMAL_TIMEOUT)
            .await
            .map_err(|error| {
                env.sink.record(
                    Diagnostic::new("magick")
                        .in_step("convert")
                        .with_args(&cmd_args)
                        .with_failure(&error)
                        .with_output(error.output()),
                );
                anyhow::Error::from(error)
            })?;

        Ok((out_with_format, ctx))
    }
}

// ────────────────────────────────────────────────────────────────
// Post-process
// ────────────────────────────────────────────────────────────────

pub struct PostProcess;

#[rocket::async_trait]
impl PipelineStep for PostProcess {
    fn name(&self) -> &'static str {
        "post-process"
    }

    async fn execute(
        &self,
        env: &PipelineEnv<'_>,
        workspace: &Workspace,
        token: PathBuf,
        ctx: PipelineContext,
    ) -> Result<(PathBuf, PipelineContext)> {
        if !needs_video_conversion(&ctx) {
            return Ok((token, ctx));
        }

        let out_file = workspace.join(VIDEO_FILE);
        let cmd_args = vec![
            "-hide_banner".to_string(),
            "-nostdin".to_string(),
            "-f".to_string(),
            ANIMATED_IMAGE_FORMAT.to_string(),
            "-i".to_string(),
            token.to_string_lossy().into_owned(),
            out_file.to_string_lossy().into_owned(),
        ];

        env.sink.record(
            Diagnostic::new("ffmpeg")
                .in_step("video-convert")
                .with_args(&cmd_args),
        );

        let mut cmd = Command::new(env.ffmpeg_command);
        cmd.args(&cmd_args);

        run_with_timeout(cmd, NORMAL_TIMEOUT)
            .await
            .map_err(|error| {
                env.sink.record(
                    Diagnostic::new("ffmpeg")
                        .in_step("video-convert")
                        .with_args(&cmd_args)
                        .with_failure(&error)
                        .with_output(error.output()),
                );
                anyhow::Error::from(error)
            })?;

        Ok((out_file, ctx))
    }
}
