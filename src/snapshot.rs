//! Local JSON snapshot, the fallback sink when no remote export is
//! configured.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::AppError;
use crate::models::CanvasItem;

pub fn write_snapshot(path: impl AsRef<Path>, items: &[CanvasItem]) -> Result<(), AppError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(items)?;
    fs::write(path, json)?;
    info!(path = %path.display(), count = items.len(), "snapshot written");
    Ok(())
}
