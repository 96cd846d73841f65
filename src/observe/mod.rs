//! Structured diagnostics for pipeline components.
//!
//! Components never log through a global; they receive a sink and emit
//! records through it, so tests and alternative deployments can swap the
//! destination.

use log::{error, info};

/// One diagnostic record emitted by a pipeline component.
#[derive(Debug, Default)]
pub struct Diagnostic {
    pub processor: &'static str,
    pub step: Option<&'static str>,
    pub args: Option<Vec<String>>,
    pub failure: Option<String>,
    pub output: Option<String>,
    pub message: Option<String>,
}

impl Diagnostic {
    pub fn new(processor: &'static str) -> Self {
        Self {
            processor,
            ..Default::default()
        }
    }

    pub fn in_step(mut self, step: &'static str) -> Self {
        self.step = Some(step);
        self
    }

    pub fn with_args(mut self, args: &[String]) -> Self {
        self.args = Some(args.to_vec());
        self
    }

    pub fn with_failure(mut self, failure: impl std::fmt::Display) -> Self {
        self.failure = Some(failure.to_string());
        self
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Destination for pipeline diagnostics.
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, diagnostic: Diagnostic);
}

/// Production sink: forwards records to the process logger, failures at
/// error level.
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn record(&self, diagnostic: Diagnostic) {
        let Diagnostic {
            processor,
            step,
            args,
            failure,
            output,
            message,
        } = diagnostic;

        let step = step.unwrap_or("-");
        let args = args.map(|list| list.join(" ")).unwrap_or_default();

        match failure {
            Some(failure) => {
                let output = output.unwrap_or_default();
                let message = message.unwrap_or_else(|| "step failed".to_string());
                error!(
                    processor = processor, step = step, args = &*args,
                    failure = &*failure, output = &*output;
                    "{}",
                    message
                );
            }
            None => {
                info!(
                    processor = processor, step = step, args = &*args;
                    "{}",
                    message.unwrap_or_default()
                );
            }
        }
    }
}

/// Discards every record. Useful where diagnostics are irrelevant.
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn record(&self, _diagnostic: Diagnostic) {}
}
