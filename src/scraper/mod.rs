//! Browser-driven navigation and extraction.
//!
//! One linear state machine: launch, authenticate, reach the planner view,
//! discover item links, then process each link in an isolated page context.
//! Authentication and planner navigation are fatal on failure; everything
//! after that is contained to the item it happened on.

pub mod extract;

use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::Config;
use crate::error::AppError;
use crate::models::{CanvasItem, DueDate, ItemKind};
use crate::selectors::SELECTORS;

pub const UNKNOWN_CLASS: &str = "Unknown Class";

const LOGIN_FORM_WAIT: Duration = Duration::from_secs(15);
const LOGIN_FIELD_WAIT: Duration = Duration::from_secs(5);
const POST_LOGIN_WAIT: Duration = Duration::from_secs(30);
const PLANNER_WAIT: Duration = Duration::from_secs(30);
const CONTENT_WAIT: Duration = Duration::from_secs(10);
const SPINNER_WAIT: Duration = Duration::from_secs(10);
const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Aggregate counters for one scraping run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ScrapeStats {
    pub discovered: usize,
    pub processed: usize,
    pub assignments: usize,
    pub quizzes: usize,
    pub discussions: usize,
    pub skipped: usize,
    pub errors: usize,
}

pub struct ScrapeOutcome {
    pub items: Vec<CanvasItem>,
    pub stats: ScrapeStats,
}

pub struct Scraper {
    config: Config,
}

impl Scraper {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn run(&self) -> Result<ScrapeOutcome, AppError> {
        let (mut browser, handler_task) = self.launch().await?;

        let result = self.scrape(&browser).await;

        // Teardown runs whether or not the scrape succeeded.
        if let Err(e) = browser.close().await {
            warn!(error = %e, "failed to close browser cleanly");
        }
        handler_task.abort();

        match &result {
            Ok(outcome) => info!(
                discovered = outcome.stats.discovered,
                processed = outcome.stats.processed,
                assignments = outcome.stats.assignments,
                quizzes = outcome.stats.quizzes,
                discussions = outcome.stats.discussions,
                skipped = outcome.stats.skipped,
                errors = outcome.stats.errors,
                "scrape finished"
            ),
            Err(e) => error!(error = %e, "scrape aborted"),
        }
        result
    }

    async fn launch(&self) -> Result<(Browser, JoinHandle<()>), AppError> {
        let mut builder = BrowserConfig::builder()
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage");
        if self.config.headful {
            builder = builder.with_head();
        }
        let browser_config = builder.build().map_err(AppError::BrowserLaunch)?;

        let (browser, mut handler) = Browser::launch(browser_config).await?;
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        info!(headful = self.config.headful, "browser launched");
        Ok((browser, handler_task))
    }

    async fn scrape(&self, browser: &Browser) -> Result<ScrapeOutcome, AppError> {
        let page = browser.new_page("about:blank").await?;
        self.authenticate(&page).await?;
        self.goto_planner(&page).await?;

        let links = discover_links(&page).await;
        let mut stats = ScrapeStats {
            discovered: links.len(),
            ..Default::default()
        };
        if links.is_empty() {
            warn!("no planner items discovered; either nothing is outstanding or the view failed to render");
        }

        let base = Url::parse(&self.config.canvas_url)?;
        let mut items = Vec::new();

        for (index, href) in links.iter().enumerate() {
            let source_url = match base.join(href) {
                Ok(resolved) => resolved.to_string(),
                Err(e) => {
                    error!(index, href = %href, error = %e, "unresolvable item link");
                    stats.errors += 1;
                    continue;
                }
            };

            // Every item gets its own page context, closed no matter how
            // processing ends.
            let item_page = match browser.new_page("about:blank").await {
                Ok(p) => p,
                Err(e) => {
                    error!(index, url = %source_url, error = %e, "failed to open page context");
                    stats.errors += 1;
                    continue;
                }
            };

            let outcome = self.process_item(&item_page, &source_url).await;
            if let Err(e) = item_page.close().await {
                warn!(index, error = %e, "failed to close item page");
            }

            match outcome {
                Ok(Some(item)) => {
                    match item.kind {
                        ItemKind::Assignment => stats.assignments += 1,
                        ItemKind::Quiz => stats.quizzes += 1,
                        ItemKind::Discussion => stats.discussions += 1,
                    }
                    stats.processed += 1;
                    debug!(index, title = %item.title, kind = %item.kind, "extracted");
                    items.push(item);
                }
                Ok(None) => {
                    stats.skipped += 1;
                    info!(index, url = %source_url, "unrecognized content type, skipping");
                }
                Err(e) => {
                    error!(index, url = %source_url, error = %e, "item failed, continuing with the rest");
                    stats.errors += 1;
                }
            }
        }

        Ok(ScrapeOutcome { items, stats })
    }

    async fn authenticate(&self, page: &Page) -> Result<(), AppError> {
        info!(url = %self.config.canvas_url, "logging in");
        navigate(page, &self.config.canvas_url).await?;

        let username = wait_for_element(page, SELECTORS.login.username, LOGIN_FORM_WAIT)
            .await
            .map_err(|_| AppError::Auth("login form did not appear".to_string()))?;
        let password = wait_for_element(page, SELECTORS.login.password, LOGIN_FIELD_WAIT)
            .await
            .map_err(|_| AppError::Auth("password field did not appear".to_string()))?;
        let submit = wait_for_element(page, SELECTORS.login.submit, LOGIN_FIELD_WAIT)
            .await
            .map_err(|_| AppError::Auth("submit control did not appear".to_string()))?;

        username.click().await?;
        username.type_str(&self.config.username).await?;
        password.click().await?;
        password.type_str(&self.config.password).await?;
        submit.click().await?;

        // Stale credentials are a configuration problem, not a transient
        // fault; there is no retry.
        wait_for_element(page, SELECTORS.navigation.dashboard_link, POST_LOGIN_WAIT)
            .await
            .map_err(|_| {
                AppError::Auth("dashboard did not load after submitting credentials".to_string())
            })?;

        info!("authenticated");
        Ok(())
    }

    async fn goto_planner(&self, page: &Page) -> Result<(), AppError> {
        if page.find_element(SELECTORS.planner.marker).await.is_err() {
            let toggle =
                wait_for_element(page, SELECTORS.navigation.planner_button, PLANNER_WAIT).await?;
            toggle.click().await?;
        }
        wait_for_element(page, SELECTORS.planner.marker, PLANNER_WAIT).await?;
        info!("planner view ready");
        Ok(())
    }

    async fn process_item(
        &self,
        page: &Page,
        source_url: &str,
    ) -> Result<Option<CanvasItem>, AppError> {
        navigate(page, source_url).await?;
        wait_for_element(page, SELECTORS.content.main, CONTENT_WAIT).await?;
        wait_for_visible(page, SELECTORS.content.main, CONTENT_WAIT).await?;
        wait_for_absent(page, SELECTORS.content.spinner, SPINNER_WAIT).await?;

        let class_name = match extract::text_of(page, SELECTORS.breadcrumbs.class_name).await {
            Some(name) => name,
            None => {
                warn!(url = %source_url, "class breadcrumb missing, using sentinel");
                UNKNOWN_CLASS.to_string()
            }
        };
        let first_level = extract::text_of(page, SELECTORS.breadcrumbs.first_level).await;

        let kind = classify_page(page, first_level.as_deref()).await;
        let Some(kind) = kind.item_kind() else {
            return Ok(None);
        };

        let fields = extract::extract(page, kind).await;
        Ok(Some(CanvasItem {
            title: fields.title,
            due_date: DueDate::new(fields.due_text),
            description: fields.description,
            class_name,
            source_url: source_url.to_string(),
            kind,
        }))
    }
}

/// Probe the three kind markers and fold the result through the pure
/// classifier.
async fn classify_page(page: &Page, first_level: Option<&str>) -> extract::PageKind {
    let has_assignment = probe(page, SELECTORS.assignment.marker).await;
    let has_quiz = probe(page, SELECTORS.quiz.marker).await;
    let has_discussion = probe(page, SELECTORS.discussion.marker).await;
    let in_announcements = first_level == Some("Announcements");
    extract::classify(has_assignment, has_quiz, has_discussion, in_announcements)
}

async fn probe(page: &Page, selector: &str) -> bool {
    page.find_element(selector).await.is_ok()
}

/// Candidate item hrefs in DOM order. Zero results is a legitimate outcome.
async fn discover_links(page: &Page) -> Vec<String> {
    let elements = page
        .find_elements(SELECTORS.planner.items)
        .await
        .unwrap_or_default();

    let mut hrefs = Vec::new();
    for element in elements {
        if let Ok(Some(href)) = element.attribute("href").await {
            if !href.is_empty() {
                hrefs.push(href);
            }
        }
    }
    info!(count = hrefs.len(), "discovered planner items");
    hrefs
}

async fn navigate(page: &Page, url: &str) -> Result<(), AppError> {
    timeout(NAVIGATION_TIMEOUT, page.goto(url))
        .await
        .map_err(|_| AppError::NavigationTimeout(url.to_string()))??;
    let _ = page.wait_for_navigation().await;
    Ok(())
}

/// Poll until `selector` attaches, bounded by `wait`.
async fn wait_for_element(
    page: &Page,
    selector: &str,
    wait: Duration,
) -> Result<Element, AppError> {
    let deadline = Instant::now() + wait;
    loop {
        if let Ok(element) = page.find_element(selector).await {
            return Ok(element);
        }
        if Instant::now() >= deadline {
            return Err(AppError::WaitTimeout {
                selector: selector.to_string(),
                timeout_secs: wait.as_secs(),
            });
        }
        sleep(POLL_INTERVAL).await;
    }
}

/// Poll until the element is attached and laid out (not `display: none`).
async fn wait_for_visible(page: &Page, selector: &str, wait: Duration) -> Result<(), AppError> {
    let script = format!(
        "(() => {{ const el = document.querySelector({selector:?}); return !!el && el.offsetParent !== null; }})()"
    );
    let deadline = Instant::now() + wait;
    loop {
        let visible = match page.evaluate(script.as_str()).await {
            Ok(result) => result.into_value::<bool>().unwrap_or(false),
            Err(_) => false,
        };
        if visible {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(AppError::WaitTimeout {
                selector: selector.to_string(),
                timeout_secs: wait.as_secs(),
            });
        }
        sleep(POLL_INTERVAL).await;
    }
}

/// Poll until no element matches `selector`. Used for loading indicators; a
/// spinner still visible at the deadline means the content never settled.
async fn wait_for_absent(page: &Page, selector: &str, wait: Duration) -> Result<(), AppError> {
    let deadline = Instant::now() + wait;
    loop {
        if page.find_element(selector).await.is_err() {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(AppError::WaitTimeout {
                selector: selector.to_string(),
                timeout_secs: wait.as_secs(),
            });
        }
        sleep(POLL_INTERVAL).await;
    }
}
