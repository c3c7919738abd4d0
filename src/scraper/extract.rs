//! Per-kind content extraction and page classification.
//!
//! Extraction is best-effort: a locator that matches nothing yields that
//! field's default instead of failing the item. The policy is completeness
//! over strictness; a run should never lose an item to one missing span.

use chromiumoxide::page::Page;
use tracing::warn;

use crate::models::ItemKind;
use crate::selectors::{ItemSelectors, SELECTORS};

pub const DEFAULT_ASSIGNMENT_TITLE: &str = "Untitled Assignment";
pub const DEFAULT_QUIZ_TITLE: &str = "Untitled Quiz";
pub const DEFAULT_DISCUSSION_TITLE: &str = "Untitled Announcement";
pub const DEFAULT_DUE_TEXT: &str = "No due date";

/// Closed classification result for one detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Assignment,
    Quiz,
    Discussion,
    Unknown,
}

impl PageKind {
    pub fn item_kind(self) -> Option<ItemKind> {
        match self {
            PageKind::Assignment => Some(ItemKind::Assignment),
            PageKind::Quiz => Some(ItemKind::Quiz),
            PageKind::Discussion => Some(ItemKind::Discussion),
            PageKind::Unknown => None,
        }
    }
}

/// Classify from marker-probe results. Priority order is fixed — legacy
/// pages can satisfy more than one marker and the earlier kind wins.
/// Discussions only count when the page sits under the Announcements
/// breadcrumb; course discussion boards are out of scope.
pub fn classify(
    has_assignment: bool,
    has_quiz: bool,
    has_discussion: bool,
    in_announcements: bool,
) -> PageKind {
    if has_assignment {
        PageKind::Assignment
    } else if has_quiz {
        PageKind::Quiz
    } else if has_discussion && in_announcements {
        PageKind::Discussion
    } else {
        PageKind::Unknown
    }
}

/// What an extractor produces; the scraper fills in class name, URL, and
/// kind.
#[derive(Debug, Clone)]
pub struct ExtractedFields {
    pub title: String,
    pub due_text: String,
    pub description: Option<String>,
}

pub async fn extract(page: &Page, kind: ItemKind) -> ExtractedFields {
    match kind {
        ItemKind::Assignment => {
            extract_with(page, &SELECTORS.assignment, DEFAULT_ASSIGNMENT_TITLE).await
        }
        ItemKind::Quiz => extract_with(page, &SELECTORS.quiz, DEFAULT_QUIZ_TITLE).await,
        ItemKind::Discussion => {
            extract_with(page, &SELECTORS.discussion, DEFAULT_DISCUSSION_TITLE).await
        }
    }
}

async fn extract_with(
    page: &Page,
    selectors: &ItemSelectors,
    default_title: &str,
) -> ExtractedFields {
    let title = match text_of(page, selectors.title).await {
        Some(title) => title,
        None => {
            warn!(selector = selectors.title, "title not found, using default");
            default_title.to_string()
        }
    };

    let due_text = match text_of(page, selectors.due_date).await {
        Some(raw) => normalize_due_text(&raw),
        None => {
            warn!(selector = selectors.due_date, "due date not found, using default");
            DEFAULT_DUE_TEXT.to_string()
        }
    };

    // Absence of a description is expected for some kinds and not worth a
    // warning.
    let description = match selectors.description {
        Some(selector) => text_of(page, selector).await,
        None => None,
    };

    ExtractedFields {
        title,
        due_text,
        description,
    }
}

/// Trimmed inner text of the first element matching `selector`, or `None`
/// when the element is missing or empty.
pub(crate) async fn text_of(page: &Page, selector: &str) -> Option<String> {
    let element = page.find_element(selector).await.ok()?;
    element
        .inner_text()
        .await
        .ok()
        .flatten()
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Strip the lead-in phrases the portal templates disagree on: a "Due: "
/// prefix and the first " by " connector, so all three kinds produce
/// comparably shaped date text.
pub fn normalize_due_text(raw: &str) -> String {
    let trimmed = raw.trim();
    let stripped = trimmed.strip_prefix("Due: ").unwrap_or(trimmed);
    stripped.replacen(" by ", " ", 1).trim().to_string()
}
