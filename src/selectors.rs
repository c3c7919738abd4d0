//! Centralized mapping from logical page elements to concrete DOM locators.
//!
//! This module is the single coupling point to the portal's markup: when
//! Canvas ships a UI change, the fix lands here and nowhere else. Lookups are
//! static data and never fail; a locator that matches nothing on a live page
//! is handled by the scraper and extractors, not here.

/// Portal UI build these locators were last verified against.
pub const SELECTOR_REVISION: &str = "2025-08";

pub struct Selectors {
    pub login: LoginSelectors,
    pub navigation: NavigationSelectors,
    pub planner: PlannerSelectors,
    pub content: ContentSelectors,
    pub breadcrumbs: BreadcrumbSelectors,
    pub assignment: ItemSelectors,
    pub quiz: ItemSelectors,
    pub discussion: ItemSelectors,
}

pub struct LoginSelectors {
    pub username: &'static str,
    pub password: &'static str,
    pub submit: &'static str,
}

pub struct NavigationSelectors {
    pub dashboard_link: &'static str,
    pub planner_button: &'static str,
}

pub struct PlannerSelectors {
    /// Attaches once the planner list view has rendered.
    pub marker: &'static str,
    pub items: &'static str,
}

pub struct ContentSelectors {
    pub main: &'static str,
    pub spinner: &'static str,
}

pub struct BreadcrumbSelectors {
    pub class_name: &'static str,
    pub first_level: &'static str,
}

/// Per-kind locators. `marker` doubles as the classification probe; the
/// field locators are only applied after classification succeeds.
pub struct ItemSelectors {
    pub marker: &'static str,
    pub title: &'static str,
    pub due_date: &'static str,
    /// `None` for kinds that structurally lack a descriptive body.
    pub description: Option<&'static str>,
}

pub const SELECTORS: Selectors = Selectors {
    login: LoginSelectors {
        username: "#pseudonym_session_unique_id",
        password: "#pseudonym_session_password",
        submit: "#login_form button[type='submit']",
    },
    navigation: NavigationSelectors {
        dashboard_link: "#global_nav_dashboard_link",
        planner_button: "#dashboard-planner-header button[data-testid='list-view-toggle']",
    },
    planner: PlannerSelectors {
        marker: "#dashboard-planner",
        items: "div[class*='PlannerItem'] a[href*='/courses/']",
    },
    content: ContentSelectors {
        main: "#content",
        spinner: "#content div[class*='spinner']",
    },
    breadcrumbs: BreadcrumbSelectors {
        class_name: "#breadcrumbs li:nth-of-type(2) span",
        first_level: "#breadcrumbs li:nth-of-type(3) span",
    },
    assignment: ItemSelectors {
        marker: "#assignment_show",
        title: "#assignment_show h1.title",
        due_date: "#assignment_show .assignment_dates .date_text",
        description: Some("#assignment_show .description"),
    },
    quiz: ItemSelectors {
        marker: "#quiz_show",
        title: "#quiz_title",
        due_date: "#quiz_show .due_at",
        description: None,
    },
    discussion: ItemSelectors {
        marker: "#discussion_topic",
        title: "#discussion_topic .discussion-title",
        due_date: "#discussion_topic .discussion-pubdate",
        description: Some("#discussion_topic .message.user_content"),
    },
};
