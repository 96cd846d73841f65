use std::time::Duration;

// Kept short because a single request can run up to three convert passes
// and typical request/response deployments enforce a hard ~30s ceiling
// before the request is simply killed.
pub const NORMAL_TIMEOUT: Duration = Duration::from_secs(10);

// Coalescing a long animation routinely outlives NORMAL_TIMEOUT.
pub const COALESCE_TIMEOUT: Duration = Duration::from_secs(60);

/// Output format forced onto multi-frame assets.
pub const ANIMATED_IMAGE_FORMAT: &'static str = "gif";

/// The one motion format served out of the pipeline.
pub const VIDEO_OUTPUT_FORMAT: &'static str = "mp4";

/// Fallback when neither the request nor the source URL names a format.
pub const DEFAULT_OUTPUT_FORMAT: &'static str = "jpg";
