use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use tracing::{error, info, warn};

use super::SyncStats;
use crate::config::Config;
use crate::dates;
use crate::error::AppError;
use crate::models::CanvasItem;
use crate::notion::{DUE_DATE_PROPERTY, NotionApi, NotionHttpClient, Page};

/// Notion renders date properties in the workspace's display time zone; this
/// subtraction keeps the shown time aligned with the portal. Applied after a
/// successful parse, before the write. Empirically derived against the live
/// deployment; do not change without re-checking the rendered times.
const DISPLAY_CORRECTION_HOURS: i64 = 7;

const INITIAL_STATUS: &str = "Not started";
const PAGE_PRIORITY: u8 = 1;
const SCHOOL_TAG: &str = "School";

pub struct NotionSync {
    api: Arc<dyn NotionApi>,
}

impl NotionSync {
    pub fn new(api: Arc<dyn NotionApi>) -> Self {
        Self { api }
    }

    /// Orchestrator entry point. Both the token and the database id must be
    /// configured; a missing piece no-ops the whole engine.
    pub async fn run(config: &Config, items: &[CanvasItem]) -> Result<SyncStats, AppError> {
        let Some(token) = config.notion_token.as_deref() else {
            info!("Notion export skipped: NOTION_TOKEN is not configured");
            return Ok(SyncStats::default());
        };
        let Some(database_id) = config.notion_database_id.as_deref() else {
            info!("Notion export skipped: NOTION_DATABASE_ID is not configured");
            return Ok(SyncStats::default());
        };
        let api = NotionHttpClient::new(token, database_id)?;
        Self::new(Arc::new(api)).execute(items, Utc::now()).await
    }

    /// Reconcile against the pages visible through the next-year due-date
    /// window. `now` anchors natural-language date parsing.
    pub async fn execute(
        &self,
        items: &[CanvasItem],
        now: DateTime<Utc>,
    ) -> Result<SyncStats, AppError> {
        let pages = self.api.query_upcoming().await?;
        info!(pages = pages.len(), "fetched Notion state");

        let mut stats = SyncStats::default();
        for item in items {
            if let Err(e) = self.sync_item(item, &pages, now, &mut stats).await {
                error!(
                    title = %item.title,
                    url = %item.source_url,
                    error = %e,
                    "failed to sync item to Notion"
                );
                stats.errors += 1;
            }
        }

        info!(
            created = stats.created,
            updated = stats.updated,
            skipped = stats.skipped,
            errors = stats.errors,
            "Notion sync finished"
        );
        Ok(stats)
    }

    async fn sync_item(
        &self,
        item: &CanvasItem,
        pages: &[Page],
        now: DateTime<Utc>,
        stats: &mut SyncStats,
    ) -> Result<(), AppError> {
        let due = resolve_due(item, now);

        // Title-only match; there is no URL fallback on this service.
        let existing = pages.iter().find(|p| p.title() == Some(item.title.as_str()));
        match existing {
            Some(page) => {
                // Full overwrite: every matched field is rewritten.
                self.api
                    .update_page(&page.id, base_properties(item, due))
                    .await?;
                stats.updated += 1;
            }
            None => {
                let mut properties = base_properties(item, due);
                properties["Status"] = json!({ "status": { "name": INITIAL_STATUS } });
                properties["Priority"] = json!({ "number": PAGE_PRIORITY });
                self.api.create_page(properties).await?;
                stats.created += 1;
            }
        }
        Ok(())
    }
}

/// Absolute instant for the page's date property. Parse failure falls back
/// to the current instant so the write still proceeds.
fn resolve_due(item: &CanvasItem, now: DateTime<Utc>) -> DateTime<Utc> {
    match dates::parse_due_text(&item.due_date.text, now) {
        Some(parsed) => parsed - Duration::hours(DISPLAY_CORRECTION_HOURS),
        None => {
            warn!(
                title = %item.title,
                due = %item.due_date.text,
                "unparseable due date, defaulting to now"
            );
            now
        }
    }
}

fn base_properties(item: &CanvasItem, due: DateTime<Utc>) -> serde_json::Value {
    let mut properties = json!({
        "Name": {
            "title": [{ "text": { "content": item.title } }]
        },
        "Tags": {
            "multi_select": [{ "name": SCHOOL_TAG }, { "name": item.class_name }]
        },
    });

    properties[DUE_DATE_PROPERTY] = json!({ "date": { "start": due.to_rfc3339() } });

    properties["Description"] = match &item.description {
        Some(desc) => json!({ "rich_text": [{ "text": { "content": desc } }] }),
        None => json!({ "rich_text": [] }),
    };

    properties
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DueDate, ItemKind};
    use chrono::TimeZone;

    fn item(due_text: &str) -> CanvasItem {
        CanvasItem {
            title: "Lab 5".to_string(),
            due_date: DueDate::new(due_text),
            description: None,
            class_name: "CS 2270".to_string(),
            source_url: "https://canvas.example.edu/courses/3/quizzes/8".to_string(),
            kind: ItemKind::Quiz,
        }
    }

    #[test]
    fn due_gets_display_correction_after_parse() {
        let now = Utc.with_ymd_and_hms(2025, 9, 1, 12, 0, 0).unwrap();
        let due = resolve_due(&item("Mon Sep 22, 2025 4:00pm"), now);
        // 22:00 UTC parsed, minus the 7-hour display correction.
        assert_eq!(due, Utc.with_ymd_and_hms(2025, 9, 22, 15, 0, 0).unwrap());
    }

    #[test]
    fn unparseable_due_falls_back_to_now_uncorrected() {
        let now = Utc.with_ymd_and_hms(2025, 9, 1, 12, 0, 0).unwrap();
        assert_eq!(resolve_due(&item("No due date"), now), now);
    }

    #[test]
    fn properties_cover_every_overwritten_field() {
        let now = Utc.with_ymd_and_hms(2025, 9, 1, 12, 0, 0).unwrap();
        let it = item("Sep 22, 2025");
        let props = base_properties(&it, resolve_due(&it, now));

        assert_eq!(props["Name"]["title"][0]["text"]["content"], "Lab 5");
        assert_eq!(props["Tags"]["multi_select"][0]["name"], "School");
        assert_eq!(props["Tags"]["multi_select"][1]["name"], "CS 2270");
        assert!(props[DUE_DATE_PROPERTY]["date"]["start"].is_string());
        // Quiz has no description; the overwrite clears the field.
        assert_eq!(props["Description"]["rich_text"], json!([]));
    }
}
