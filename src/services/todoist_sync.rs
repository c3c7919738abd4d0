use std::sync::Arc;

use tracing::{debug, error, info};

use super::SyncStats;
use crate::config::Config;
use crate::error::AppError;
use crate::models::CanvasItem;
use crate::scraper::extract::DEFAULT_DUE_TEXT;
use crate::todoist::{
    CreateTaskRequest, Project, Task, TodoistApi, TodoistHttpClient, UpdateTaskRequest,
};

/// Todoist priority for coursework tasks (1 = lowest, 4 = urgent).
const TASK_PRIORITY: u8 = 2;

pub struct TodoistSync {
    api: Arc<dyn TodoistApi>,
}

impl TodoistSync {
    pub fn new(api: Arc<dyn TodoistApi>) -> Self {
        Self { api }
    }

    /// Orchestrator entry point. The whole engine no-ops when no API token
    /// is configured.
    pub async fn run(config: &Config, items: &[CanvasItem]) -> Result<SyncStats, AppError> {
        let Some(token) = config.todoist_token.as_deref() else {
            info!("Todoist export skipped: TODOIST_API_TOKEN is not configured");
            return Ok(SyncStats::default());
        };
        let api = TodoistHttpClient::new(token)?;
        Self::new(Arc::new(api)).execute(items).await
    }

    /// Reconcile every extracted item against a single up-front snapshot of
    /// the remote task and project sets. A failure here (the initial fetch)
    /// aborts this engine only; per-item failures are contained below.
    pub async fn execute(&self, items: &[CanvasItem]) -> Result<SyncStats, AppError> {
        let tasks = self.api.list_tasks().await?;
        let projects = self.api.list_projects().await?;
        info!(
            tasks = tasks.len(),
            projects = projects.len(),
            "fetched Todoist state"
        );

        let mut stats = SyncStats::default();
        for item in items {
            if let Err(e) = self.sync_item(item, &tasks, &projects, &mut stats).await {
                error!(
                    title = %item.title,
                    url = %item.source_url,
                    error = %e,
                    "failed to sync item to Todoist"
                );
                stats.errors += 1;
            }
        }

        info!(
            created = stats.created,
            updated = stats.updated,
            skipped = stats.skipped,
            errors = stats.errors,
            "Todoist sync finished"
        );
        Ok(stats)
    }

    async fn sync_item(
        &self,
        item: &CanvasItem,
        tasks: &[Task],
        projects: &[Project],
        stats: &mut SyncStats,
    ) -> Result<(), AppError> {
        if let Some(task) = find_match(item, tasks) {
            if task.is_completed {
                info!(title = %item.title, "skipping: already completed in Todoist");
                stats.skipped += 1;
                return Ok(());
            }

            // Lighter than create: only the description is rewritten, so
            // user edits to due date, project, or priority survive.
            let Some(description) = build_description(item) else {
                debug!(title = %item.title, "matched task has nothing to update");
                stats.skipped += 1;
                return Ok(());
            };
            self.api
                .update_task(&task.id, &UpdateTaskRequest { description })
                .await?;
            stats.updated += 1;
            return Ok(());
        }

        let project_id = resolve_project(&item.class_name, projects).map(|p| p.id.clone());
        if project_id.is_none() {
            debug!(class = %item.class_name, "no matching Todoist project, task goes to the default bucket");
        }

        let request = CreateTaskRequest {
            content: item.title.clone(),
            description: build_description(item),
            project_id,
            due_string: due_string(item),
            priority: TASK_PRIORITY,
        };
        self.api.create_task(&request).await?;
        stats.created += 1;
        Ok(())
    }
}

/// Dual match: exact title equality, or the item's detail-page URL embedded
/// in the task description. Titles collide and get renamed; the embedded
/// link is the stable anchor.
fn find_match<'a>(item: &CanvasItem, tasks: &'a [Task]) -> Option<&'a Task> {
    tasks
        .iter()
        .find(|t| t.content == item.title || t.description.contains(&item.source_url))
}

/// Reduce a portal course name to its comparable stem: lowercase, drop
/// punctuation, collapse whitespace, then peel trailing section markers and
/// 3+-digit course numbers ("ATLS 5420-001" -> "atls").
pub fn normalize_class_name(name: &str) -> String {
    let lowered: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    let mut words: Vec<&str> = lowered.split_whitespace().collect();
    loop {
        let n = words.len();
        if n >= 2
            && words[n - 2] == "section"
            && words[n - 1].chars().all(|c| c.is_ascii_digit())
        {
            words.truncate(n - 2);
            continue;
        }
        match words.last() {
            Some(last) if last.len() >= 3 && last.chars().all(|c| c.is_ascii_digit()) => {
                words.pop();
            }
            _ => break,
        }
    }
    words.join(" ")
}

/// Case-insensitive substring containment against remote project names. No
/// match means the task lands in the service's default bucket.
fn resolve_project<'a>(class_name: &str, projects: &'a [Project]) -> Option<&'a Project> {
    let normalized = normalize_class_name(class_name);
    if normalized.is_empty() {
        return None;
    }
    projects
        .iter()
        .find(|p| p.name.to_lowercase().contains(&normalized))
}

/// Todoist parses the due string service-side, so the free text passes
/// through untouched apart from the lead-in strip.
fn due_string(item: &CanvasItem) -> Option<String> {
    let text = item.due_date.text.trim();
    let text = text.strip_prefix("Due: ").unwrap_or(text);
    if text.is_empty() || text == DEFAULT_DUE_TEXT {
        return None;
    }
    Some(text.to_string())
}

/// Items without a description (quizzes) get none remotely either; for the
/// rest, the source link and class/kind labels ride along so renamed tasks
/// stay matchable.
fn build_description(item: &CanvasItem) -> Option<String> {
    item.description.as_ref().map(|desc| {
        format!(
            "{desc}\n\n[Open in Canvas]({url})\nClass: {class}\nType: {kind}",
            url = item.source_url,
            class = item.class_name,
            kind = item.kind.label(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DueDate, ItemKind};

    fn item(title: &str, url: &str) -> CanvasItem {
        CanvasItem {
            title: title.to_string(),
            due_date: DueDate::new("Sep 22, 2025 4:00pm"),
            description: Some("Read chapter 4".to_string()),
            class_name: "ATLS 5420-001".to_string(),
            source_url: url.to_string(),
            kind: ItemKind::Assignment,
        }
    }

    fn task(id: &str, content: &str, description: &str) -> Task {
        Task {
            id: id.to_string(),
            content: content.to_string(),
            description: description.to_string(),
            is_completed: false,
            project_id: None,
        }
    }

    #[test]
    fn normalizes_section_and_course_number_suffixes() {
        assert_eq!(normalize_class_name("ATLS 5420-001"), "atls");
        assert_eq!(normalize_class_name("CS 2270 Section 003"), "cs");
        assert_eq!(normalize_class_name("Intro to Writing"), "intro to writing");
    }

    #[test]
    fn matches_by_title_or_embedded_url() {
        let it = item("Essay 1", "https://canvas.example.edu/courses/9/assignments/4");
        let by_title = vec![task("1", "Essay 1", "")];
        let by_url = vec![task(
            "2",
            "Renamed by the user",
            "see [Open in Canvas](https://canvas.example.edu/courses/9/assignments/4)",
        )];
        let neither = vec![task("3", "Essay 2", "unrelated")];

        assert_eq!(find_match(&it, &by_title).map(|t| t.id.as_str()), Some("1"));
        assert_eq!(find_match(&it, &by_url).map(|t| t.id.as_str()), Some("2"));
        assert!(find_match(&it, &neither).is_none());
    }

    #[test]
    fn resolves_project_by_normalized_containment() {
        let projects = vec![
            Project {
                id: "p1".to_string(),
                name: "Inbox".to_string(),
            },
            Project {
                id: "p2".to_string(),
                name: "ATLS Creative Tech".to_string(),
            },
        ];
        let found = resolve_project("ATLS 5420-001", &projects).expect("project");
        assert_eq!(found.id, "p2");
        assert!(resolve_project("PHYS 1110", &projects).is_none());
    }

    #[test]
    fn due_string_strips_lead_in_and_default() {
        let mut it = item("Essay 1", "https://canvas.example.edu/a/1");
        it.due_date = DueDate::new("Due: Sep 22 at 4:00pm");
        assert_eq!(due_string(&it), Some("Sep 22 at 4:00pm".to_string()));

        it.due_date = DueDate::new(DEFAULT_DUE_TEXT);
        assert_eq!(due_string(&it), None);
    }

    #[test]
    fn description_embeds_source_link_and_labels() {
        let it = item("Essay 1", "https://canvas.example.edu/a/1");
        let desc = build_description(&it).expect("description");
        assert!(desc.contains("Read chapter 4"));
        assert!(desc.contains("[Open in Canvas](https://canvas.example.edu/a/1)"));
        assert!(desc.contains("Class: ATLS 5420-001"));
        assert!(desc.contains("Type: Assignment"));
    }

    #[test]
    fn quiz_without_description_builds_none() {
        let mut it = item("Quiz 2", "https://canvas.example.edu/q/2");
        it.description = None;
        it.kind = ItemKind::Quiz;
        assert!(build_description(&it).is_none());
    }
}
