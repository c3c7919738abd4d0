pub mod dto;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::error::AppError;

pub use dto::{Page, Property, QueryDatabaseRequest, QueryDatabaseResponse};

const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";

/// Date property the upcoming-work query filters on.
pub const DUE_DATE_PROPERTY: &str = "Due Date";

#[async_trait]
pub trait NotionApi: Send + Sync {
    /// Pages whose due-date property falls within the next year. The window
    /// is a service-side filter; anything outside it is invisible to
    /// matching and will be treated as new.
    async fn query_upcoming(&self) -> Result<Vec<Page>, AppError>;
    async fn create_page(&self, properties: serde_json::Value) -> Result<(), AppError>;
    async fn update_page(
        &self,
        page_id: &str,
        properties: serde_json::Value,
    ) -> Result<(), AppError>;
}

pub struct NotionHttpClient {
    client: Client,
    token: String,
    database_id: String,
    base_url: String,
}

impl NotionHttpClient {
    pub fn new(token: impl Into<String>, database_id: impl Into<String>) -> Result<Self, AppError> {
        Self::with_base_url(token, database_id, DEFAULT_BASE_URL)
    }

    /// Base-URL override for tests running against a local mock server.
    pub fn with_base_url(
        token: impl Into<String>,
        database_id: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, AppError> {
        let client = Client::builder().build()?;
        let base_url: String = base_url.into();
        Ok(Self {
            client,
            token: token.into(),
            database_id: database_id.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Notion-Version", NOTION_VERSION)
    }

    async fn check(response: reqwest::Response) -> Result<String, AppError> {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(AppError::Api {
                service: "Notion",
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl NotionApi for NotionHttpClient {
    async fn query_upcoming(&self) -> Result<Vec<Page>, AppError> {
        let path = format!("/databases/{}/query", self.database_id);
        let mut pages = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let request_body = QueryDatabaseRequest {
                filter: Some(json!({
                    "property": DUE_DATE_PROPERTY,
                    "date": { "next_year": {} }
                })),
                start_cursor: cursor.take(),
                page_size: Some(100),
            };

            let response = self
                .request(reqwest::Method::POST, &path)
                .json(&request_body)
                .send()
                .await?;
            let body = Self::check(response).await?;

            let parsed: QueryDatabaseResponse = serde_json::from_str(&body).map_err(|e| {
                tracing::error!(error = %e, "failed to parse Notion query response");
                AppError::Json(e)
            })?;

            pages.extend(parsed.results);
            if !parsed.has_more {
                break;
            }
            cursor = parsed.next_cursor;
            if cursor.is_none() {
                break;
            }
        }

        Ok(pages)
    }

    async fn create_page(&self, properties: serde_json::Value) -> Result<(), AppError> {
        let request_body = json!({
            "parent": { "database_id": self.database_id },
            "properties": properties,
        });

        let response = self
            .request(reqwest::Method::POST, "/pages")
            .json(&request_body)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn update_page(
        &self,
        page_id: &str,
        properties: serde_json::Value,
    ) -> Result<(), AppError> {
        let request_body = json!({ "properties": properties });

        let response = self
            .request(reqwest::Method::PATCH, &format!("/pages/{page_id}"))
            .json(&request_body)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
