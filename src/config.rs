use std::env;

use crate::error::AppError;

/// Runtime configuration, assembled from the environment once at startup.
/// The rest of the system treats this as an opaque input and never reads
/// env vars or files directly.
#[derive(Clone, Debug)]
pub struct Config {
    /// Portal root, e.g. `https://canvas.colorado.edu`.
    pub canvas_url: String,
    pub username: String,
    pub password: String,
    pub todoist_token: Option<String>,
    pub notion_token: Option<String>,
    pub notion_database_id: Option<String>,
    pub export: ExportTargets,
    /// Launch a visible browser window. Diagnostic aid only.
    pub headful: bool,
    pub snapshot_path: String,
}

#[derive(Clone, Copy, Debug)]
pub struct ExportTargets {
    pub todoist: bool,
    pub notion: bool,
}

impl Config {
    pub fn new_from_env() -> Result<Self, AppError> {
        let canvas_url = env::var("CANVAS_URL")
            .map_err(|_| AppError::Config("CANVAS_URL is not set".to_string()))?;
        let username = env::var("CANVAS_USERNAME")
            .map_err(|_| AppError::Config("CANVAS_USERNAME is not set".to_string()))?;
        let password = env::var("CANVAS_PASSWORD")
            .map_err(|_| AppError::Config("CANVAS_PASSWORD is not set".to_string()))?;

        Ok(Self {
            canvas_url: canvas_url.trim_end_matches('/').to_string(),
            username,
            password,
            todoist_token: non_empty_var("TODOIST_API_TOKEN"),
            notion_token: non_empty_var("NOTION_TOKEN"),
            notion_database_id: non_empty_var("NOTION_DATABASE_ID"),
            export: ExportTargets {
                todoist: flag_var("EXPORT_TODOIST", true),
                notion: flag_var("EXPORT_NOTION", true),
            },
            headful: flag_var("CANVAS_SYNC_HEADFUL", false),
            snapshot_path: env::var("SNAPSHOT_PATH")
                .unwrap_or_else(|_| "canvas_items.json".to_string()),
        })
    }

    /// True when at least one remote export target is both enabled and has
    /// credentials; otherwise the run falls back to a local snapshot.
    pub fn any_export_configured(&self) -> bool {
        (self.export.todoist && self.todoist_token.is_some())
            || (self.export.notion
                && self.notion_token.is_some()
                && self.notion_database_id.is_some())
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn flag_var(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"),
        Err(_) => default,
    }
}
