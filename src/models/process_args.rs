//! Parsed request parameters for one transformation request.

use std::path::{Path, PathBuf};

use crate::common::{DEFAULT_OUTPUT_FORMAT, VIDEO_OUTPUT_FORMAT};
use crate::utils::url_ext_lower;

/// One transformation operation, carried as the raw geometry/value text the
/// caller supplied. Validation is left to the transform tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Resize(String),
    Crop(String),
    Rotate(String),
    Quality(String),
}

impl Operation {
    fn push_args(&self, args: &mut Vec<String>) {
        match self {
            Operation::Resize(geometry) => {
                args.push("-resize".to_string());
                args.push(geometry.clone());
            }
            Operation::Crop(geometry) => {
                args.push("-crop".to_string());
                args.push(geometry.clone());
            }
            Operation::Rotate(degrees) => {
                args.push("-rotate".to_string());
                args.push(degrees.clone());
            }
            Operation::Quality(value) => {
                args.push("-quality".to_string());
                args.push(value.clone());
            }
        }
    }
}

/// Everything the pipeline needs to know about one request.
#[derive(Debug, Clone)]
pub struct ProcessArgs {
    pub url: String,
    /// Output format the caller asked for. Never reassigned.
    pub request_format: String,
    /// Output format derived before the pipeline starts; the pipeline may
    /// override it mid-run.
    pub format: String,
    pub operations: Vec<Operation>,
}

impl ProcessArgs {
    pub fn new(url: String, requested: Option<String>, operations: Vec<Operation>) -> Self {
        let source_format = url_ext_lower(&url);

        let request_format = requested
            .filter(|format| !format.is_empty())
            .map(|format| format.to_ascii_lowercase())
            .unwrap_or_else(|| {
                if source_format.is_empty() {
                    DEFAULT_OUTPUT_FORMAT.to_string()
                } else {
                    source_format.clone()
                }
            });

        // A video request starts from whatever the source URL claims to
        // be. The claim is unreliable for animated assets; preprocessing
        // corrects it after counting frames.
        let format = if request_format == VIDEO_OUTPUT_FORMAT && !source_format.is_empty() {
            source_format
        } else {
            request_format.clone()
        };

        Self {
            url,
            request_format,
            format,
            operations,
        }
    }

    pub fn has_operations(&self) -> bool {
        !self.operations.is_empty()
    }

    /// Concrete `convert` argument vector plus the format-qualified output
    /// path the tool will produce.
    pub fn command_args(
        &self,
        in_file: &Path,
        out_file: &Path,
        format: &str,
    ) -> (Vec<String>, PathBuf) {
        let out_with_format = out_file.with_extension(format);

        let mut args = vec![in_file.to_string_lossy().into_owned()];
        for operation in &self.operations {
            operation.push_args(&mut args);
        }
        args.push(out_with_format.to_string_lossy().into_owned());

        (args, out_with_format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_format_wins() {
        let args = ProcessArgs::new(
            "http://cdn.example/photo.png".to_string(),
            Some("WEBP".to_string()),
            vec![],
        );

        assert_eq!(args.request_format, "webp");
        assert_eq!(args.format, "webp");
    }

    #[test]
    fn format_falls_back_to_source_extension() {
        let args = ProcessArgs::new("http://cdn.example/photo.GIF".to_string(), None, vec![]);

        assert_eq!(args.request_format, "gif");
        assert_eq!(args.format, "gif");
    }

    #[test]
    fn format_defaults_when_nothing_is_known() {
        let args = ProcessArgs::new("http://cdn.example/photo".to_string(), None, vec![]);

        assert_eq!(args.request_format, DEFAULT_OUTPUT_FORMAT);
    }

    #[test]
    fn video_requests_start_from_the_source_claim() {
        let args = ProcessArgs::new(
            "http://cdn.example/clip.png".to_string(),
            Some("mp4".to_string()),
            vec![],
        );

        assert_eq!(args.request_format, "mp4");
        assert_eq!(args.format, "png");
    }

    #[test]
    fn has_operations_reflects_the_list() {
        let none = ProcessArgs::new("http://cdn.example/a.png".to_string(), None, vec![]);
        let some = ProcessArgs::new(
            "http://cdn.example/a.png".to_string(),
            None,
            vec![Operation::Resize("100x100".to_string())],
        );

        assert!(!none.has_operations());
        assert!(some.has_operations());
    }

    #[test]
    fn command_args_orders_input_operations_output() {
        let args = ProcessArgs::new(
            "http://cdn.example/a.png".to_string(),
            Some("png".to_string()),
            vec![
                Operation::Resize("100x100".to_string()),
                Operation::Quality("80".to_string()),
            ],
        );

        let (cmd_args, out_with_format) =
            args.command_args(Path::new("/tmp/ws/in"), Path::new("/tmp/ws/out"), "png");

        assert_eq!(
            cmd_args,
            vec![
                "/tmp/ws/in",
                "-resize",
                "100x100",
                "-quality",
                "80",
                "/tmp/ws/out.png",
            ]
        );
        assert_eq!(out_with_format, PathBuf::from("/tmp/ws/out.png"));
    }
}
