pub mod config;
pub mod dates;
pub mod error;
pub mod models;
pub mod notion;
pub mod scraper;
pub mod selectors;
pub mod services;
pub mod snapshot;
pub mod todoist;
