use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use canvas_sync::config::Config;
use canvas_sync::error::AppError;
use canvas_sync::scraper::Scraper;
use canvas_sync::services::{NotionSync, TodoistSync};
use canvas_sync::snapshot;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "canvas_sync=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::new_from_env()?;

    let outcome = Scraper::new(config.clone()).run().await?;
    info!(items = outcome.items.len(), "extraction complete");

    if config.export.todoist {
        // An engine failure is logged but never blocks the other engine.
        match TodoistSync::run(&config, &outcome.items).await {
            Ok(stats) => info!(
                created = stats.created,
                updated = stats.updated,
                skipped = stats.skipped,
                errors = stats.errors,
                "Todoist export finished"
            ),
            Err(e) => error!(error = %e, "Todoist export aborted"),
        }
    } else {
        info!("Todoist export disabled");
    }

    if config.export.notion {
        match NotionSync::run(&config, &outcome.items).await {
            Ok(stats) => info!(
                created = stats.created,
                updated = stats.updated,
                skipped = stats.skipped,
                errors = stats.errors,
                "Notion export finished"
            ),
            Err(e) => error!(error = %e, "Notion export aborted"),
        }
    } else {
        info!("Notion export disabled");
    }

    if !config.any_export_configured() {
        info!("no remote export configured, writing local snapshot");
        snapshot::write_snapshot(&config.snapshot_path, &outcome.items)?;
    }

    Ok(())
}
