pub mod handlers;

use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use serde_json::json;
use std::io::Cursor;

use crate::common::NORMAL_TIMEOUT;
use crate::config::APP_CONFIG;
use crate::observe::{DiagnosticSink, LogSink};
use crate::pipeline::classify::Classifier;

#[derive(Debug)]
pub struct AppError {
    pub status: Status,
    pub error: anyhow::Error,
}

#[rocket::async_trait]
impl<'r, 'o: 'r> Responder<'r, 'o> for AppError {
    fn respond_to(self, _req: &'r Request<'_>) -> response::Result<'o> {
        let outer_msg = self.error.to_string();

        let chain: Vec<String> = self.error.chain().map(|e| e.to_string()).collect();

        let body = json!({
            "error": outer_msg,
            "chain": chain,
        })
        .to_string();

        Response::build()
            .status(self.status)
            .header(ContentType::JSON)
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}

impl<E> From<E> for AppError
where
    anyhow::Error: From<E>,
{
    fn from(err: E) -> Self {
        AppError {
            status: Status::InternalServerError,
            error: anyhow::Error::from(err),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Shared per-process collaborators, handed to handlers by Rocket.
pub struct AppState {
    pub client: reqwest::Client,
    pub classifier: Classifier,
    pub sink: Box<dyn DiagnosticSink>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .connect_timeout(NORMAL_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            classifier: Classifier::new(&APP_CONFIG.identify_command),
            sink: Box::new(LogSink),
        }
    }
}
