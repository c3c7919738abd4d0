use serde::{Deserialize, Serialize};
use std::fmt;

/// One coursework entry extracted from the portal. Built once per discovered
/// planner link and never reclassified afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasItem {
    pub title: String,
    pub due_date: DueDate,
    /// Present for assignments and announcements, always `None` for quizzes.
    pub description: Option<String>,
    pub class_name: String,
    /// Absolute URL of the item's detail page. Durable identity anchor for
    /// task matching.
    pub source_url: String,
    pub kind: ItemKind,
}

/// Due date exactly as rendered on the portal, lead-in phrases stripped.
/// Not a timestamp; downstream consumers parse it contextually.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DueDate {
    pub text: String,
}

impl DueDate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Assignment,
    Quiz,
    Discussion,
}

impl ItemKind {
    pub fn label(&self) -> &'static str {
        match self {
            ItemKind::Assignment => "Assignment",
            ItemKind::Quiz => "Quiz",
            ItemKind::Discussion => "Announcement",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ItemKind::Assignment => "assignment",
            ItemKind::Quiz => "quiz",
            ItemKind::Discussion => "discussion",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_serializes_camel_case() {
        let item = CanvasItem {
            title: "Problem Set 3".to_string(),
            due_date: DueDate::new("Mon Sep 22, 2025 4:00pm"),
            description: None,
            class_name: "ATLS 5420-001".to_string(),
            source_url: "https://canvas.example.edu/courses/1/assignments/2".to_string(),
            kind: ItemKind::Assignment,
        };

        let json = serde_json::to_value(&item).expect("serialize");
        assert_eq!(json["dueDate"]["text"], "Mon Sep 22, 2025 4:00pm");
        assert_eq!(json["className"], "ATLS 5420-001");
        assert_eq!(json["sourceUrl"], item.source_url);
        assert_eq!(json["kind"], "assignment");
        assert!(json["description"].is_null());
    }
}
