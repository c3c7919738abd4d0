pub mod notion_sync;
pub mod todoist_sync;

pub use notion_sync::NotionSync;
pub use todoist_sync::TodoistSync;

use serde::Serialize;

/// Per-engine outcome counters, returned to the orchestrator for the final
/// run summary. Engines own their accumulator; nothing is ambient.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SyncStats {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: usize,
}
