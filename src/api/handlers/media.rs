use anyhow::Context;
use rocket::State;
use rocket::fs::NamedFile;
use rocket::http::ContentType;
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use rocket::{get, routes};

use crate::api::{AppResult, AppState};
use crate::config::APP_CONFIG;
use crate::models::process_args::{Operation, ProcessArgs};
use crate::pipeline::proxy::{self, PassthroughBody};
use crate::pipeline::workspace::Workspace;
use crate::pipeline::{PipelineEnv, run_pipeline};

pub enum MediaResponse {
    Artifact(NamedFile),
    Passthrough(PassthroughBody, ContentType),
}

impl<'r> Responder<'r, 'r> for MediaResponse {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'r> {
        match self {
            MediaResponse::Artifact(file) => file.respond_to(req),
            MediaResponse::Passthrough(body, content_type) => {
                Response::build_from(body.respond_to(req)?)
                    .header(content_type)
                    .ok()
            }
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Process a remote asset with the requested operations and serve the
/// result. Without operations the remote asset is streamed through as-is.
#[get("/process?<url>&<format>&<resize>&<crop>&<rotate>&<quality>")]
pub async fn process_media(
    state: &State<AppState>,
    url: String,
    format: Option<String>,
    resize: Option<String>,
    crop: Option<String>,
    rotate: Option<String>,
    quality: Option<String>,
) -> AppResult<MediaResponse> {
    let mut operations = Vec::new();
    if let Some(geometry) = non_empty(resize) {
        operations.push(Operation::Resize(geometry));
    }
    if let Some(geometry) = non_empty(crop) {
        operations.push(Operation::Crop(geometry));
    }
    if let Some(degrees) = non_empty(rotate) {
        operations.push(Operation::Rotate(degrees));
    }
    if let Some(value) = non_empty(quality) {
        operations.push(Operation::Quality(value));
    }

    let args = ProcessArgs::new(url, non_empty(format), operations);

    // No operations? Just proxy the request.
    if !args.has_operations() {
        let (content_type, body) = proxy::passthrough(&state.client, &args).await?;
        return Ok(MediaResponse::Passthrough(body, content_type));
    }

    let workspace = Workspace::create(&APP_CONFIG.workspace_root, APP_CONFIG.keep_workspaces)?;

    let env = PipelineEnv {
        args: &args,
        client: &state.client,
        classifier: &state.classifier,
        sink: state.sink.as_ref(),
        convert_command: &APP_CONFIG.convert_command,
        ffmpeg_command: &APP_CONFIG.ffmpeg_command,
    };

    let final_path = run_pipeline(&env, &workspace).await?;

    // Open before the workspace is dropped; the open handle keeps the
    // artifact readable while the response streams.
    let file = NamedFile::open(&final_path)
        .await
        .context(format!("failed to open final artifact {:?}", final_path))?;

    Ok(MediaResponse::Artifact(file))
}

pub fn generate_media_routes() -> Vec<rocket::Route> {
    routes![process_media]
}
