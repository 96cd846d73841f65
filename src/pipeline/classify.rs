//! Animated-asset detection.

use std::path::Path;

use tokio::process::Command;

use crate::common::NORMAL_TIMEOUT;
use crate::observe::{Diagnostic, DiagnosticSink};
use crate::pipeline::command::run_with_timeout;

/// Frame-count probe for downloaded assets.
///
/// Classification is advisory: every failure mode resolves to "not
/// animated", so a broken probe degrades to a single-frame transform
/// instead of failing the request.
pub struct Classifier {
    identify_command: String,
}

impl Classifier {
    pub fn new(identify_command: impl Into<String>) -> Self {
        Self {
            identify_command: identify_command.into(),
        }
    }

    /// Whether `file` holds more than one frame.
    pub async fn is_animated(&self, sink: &dyn DiagnosticSink, file: &Path) -> bool {
        // identify -format %n some.gif # => 105
        let mut cmd = Command::new(&self.identify_command);
        cmd.args(["-format", "%n"]).arg(file);

        let output = match run_with_timeout(cmd, NORMAL_TIMEOUT).await {
            Ok(output) => output,
            Err(error) => {
                sink.record(
                    Diagnostic::new("magick")
                        .in_step("identify")
                        .with_failure(&error)
                        .with_output(error.output()),
                );
                return false;
            }
        };

        match parse_frame_count(&output.stdout) {
            Ok(frames) => {
                sink.record(
                    Diagnostic::new("magick")
                        .in_step("identify")
                        .with_message(format!("{} frames", frames)),
                );
                frames > 1
            }
            Err(error) => {
                sink.record(
                    Diagnostic::new("magick")
                        .in_step("identify")
                        .with_failure(error)
                        .with_output(output.stdout)
                        .with_message("non numeric identify output"),
                );
                false
            }
        }
    }
}

fn parse_frame_count(stdout: &str) -> Result<usize, std::num::ParseIntError> {
    stdout.trim().parse::<usize>()
}
