//! Application startup tasks.
//!
//! Includes:
//! - Transform tool availability check
//! - Logger initialization

use std::process::Command;

use env_logger::Builder;
use log::{LevelFilter, error, info};

use crate::config::APP_CONFIG;

// ────────────────────────────────────────────────────────────────
// Tool Check
// ────────────────────────────────────────────────────────────────

/// Check that the external transform tools are reachable in PATH.
pub fn check_transform_tools() {
    for command in [
        APP_CONFIG.convert_command.as_str(),
        APP_CONFIG.identify_command.as_str(),
        APP_CONFIG.ffmpeg_command.as_str(),
    ] {
        match Command::new(command).arg("-version").output() {
            Ok(output) if output.status.success() => {
                let version_info = String::from_utf8_lossy(&output.stdout);
                let version_line = version_info.lines().next().unwrap_or("Unknown version");
                info!("{}: {}", command, version_line);
            }
            Ok(_) => {
                error!(
                    "`{}` command was found, but it returned an error. Please ensure it's correctly installed.",
                    command
                );
            }
            Err(_) => {
                error!(
                    "`{}` is not installed or not available in PATH. Please install it before running the application.",
                    command
                );
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────
// Logger Initialization
// ────────────────────────────────────────────────────────────────

/// Initialize the process logger. INFO+ globally, WARN+ for Rocket.
pub fn initialize_logger() {
    Builder::new()
        .filter(None, LevelFilter::Info)
        .filter(Some("rocket"), LevelFilter::Warn)
        .parse_default_env()
        .init();
}

pub fn initialize() {
    initialize_logger();
    check_transform_tools();
}
