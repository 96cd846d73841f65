use std::path::PathBuf;
use std::sync::LazyLock;

use dotenv::dotenv;
use serde::Deserialize;

/// Process-wide configuration, read once from the environment with the
/// `REFRACT_` prefix after loading `.env`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Parent directory for per-request workspaces.
    #[serde(default = "default_workspace_root")]
    pub workspace_root: PathBuf,

    /// Leave workspaces on disk after the request finishes. Off by default;
    /// turn on to inspect intermediate artifacts.
    #[serde(default)]
    pub keep_workspaces: bool,

    #[serde(default = "default_convert_command")]
    pub convert_command: String,

    #[serde(default = "default_identify_command")]
    pub identify_command: String,

    #[serde(default = "default_ffmpeg_command")]
    pub ffmpeg_command: String,
}

fn default_workspace_root() -> PathBuf {
    std::env::temp_dir()
}

fn default_convert_command() -> String {
    "convert".to_string()
}

fn default_identify_command() -> String {
    "identify".to_string()
}

fn default_ffmpeg_command() -> String {
    "ffmpeg".to_string()
}

pub static APP_CONFIG: LazyLock<AppConfig> = LazyLock::new(|| {
    dotenv().ok();
    envy::prefixed("REFRACT_")
        .from_env::<AppConfig>()
        .expect("Failed to read configuration from environment")
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_environment() {
        let config = envy::prefixed("REFRACT_")
            .from_iter::<_, AppConfig>(Vec::<(String, String)>::new())
            .unwrap();

        assert_eq!(config.workspace_root, std::env::temp_dir());
        assert!(!config.keep_workspaces);
        assert_eq!(config.convert_command, "convert");
        assert_eq!(config.identify_command, "identify");
        assert_eq!(config.ffmpeg_command, "ffmpeg");
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = envy::prefixed("REFRACT_")
            .from_iter::<_, AppConfig>(vec![
                ("REFRACT_KEEP_WORKSPACES".to_string(), "true".to_string()),
                ("REFRACT_CONVERT_COMMAND".to_string(), "gm".to_string()),
            ])
            .unwrap();

        assert!(config.keep_workspaces);
        assert_eq!(config.convert_command, "gm");
        assert_eq!(config.identify_command, "identify");
    }
}
