//! Plain passthrough for requests with no operations.

use std::pin::Pin;

use anyhow::{Context, Result};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::header::CONTENT_TYPE;
use rocket::http::ContentType;
use rocket::response::stream::ByteStream;

use crate::models::process_args::ProcessArgs;

pub type PassthroughBody = ByteStream<Pin<Box<dyn Stream<Item = Bytes> + Send>>>;

/// Stream the remote resource straight through without touching disk.
pub async fn passthrough(
    client: &reqwest::Client,
    args: &ProcessArgs,
) -> Result<(ContentType, PassthroughBody)> {
    let response = client
        .get(&args.url)
        .send()
        .await
        .context(format!("failed to fetch {}", args.url))?;

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(ContentType::parse_flexible)
        .unwrap_or(ContentType::Binary);

    let stream: Pin<Box<dyn Stream<Item = Bytes> + Send>> = Box::pin(
        response
            .bytes_stream()
            .filter_map(|chunk| async move { chunk.ok() }),
    );

    Ok((content_type, ByteStream(stream)))
}
