pub mod dto;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::AppError;

pub use dto::{CreateTaskRequest, Project, Task, UpdateTaskRequest};

const DEFAULT_BASE_URL: &str = "https://api.todoist.com/rest/v2";

#[async_trait]
pub trait TodoistApi: Send + Sync {
    async fn list_tasks(&self) -> Result<Vec<Task>, AppError>;
    async fn list_projects(&self) -> Result<Vec<Project>, AppError>;
    async fn create_task(&self, req: &CreateTaskRequest) -> Result<(), AppError>;
    async fn update_task(&self, id: &str, req: &UpdateTaskRequest) -> Result<(), AppError>;
}

pub struct TodoistHttpClient {
    client: Client,
    token: String,
    base_url: String,
}

impl TodoistHttpClient {
    pub fn new(token: impl Into<String>) -> Result<Self, AppError> {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    /// Base-URL override for tests running against a local mock server.
    pub fn with_base_url(
        token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, AppError> {
        let client = Client::builder().build()?;
        let base_url: String = base_url.into();
        Ok(Self {
            client,
            token: token.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .header("Authorization", format!("Bearer {}", self.token))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(AppError::Api {
                service: "Todoist",
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn post_json<B: serde::Serialize>(&self, path: &str, body: &B) -> Result<(), AppError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .header("Authorization", format!("Bearer {}", self.token))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Api {
                service: "Todoist",
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl TodoistApi for TodoistHttpClient {
    async fn list_tasks(&self) -> Result<Vec<Task>, AppError> {
        self.get_json("/tasks").await
    }

    async fn list_projects(&self) -> Result<Vec<Project>, AppError> {
        self.get_json("/projects").await
    }

    async fn create_task(&self, req: &CreateTaskRequest) -> Result<(), AppError> {
        self.post_json("/tasks", req).await
    }

    async fn update_task(&self, id: &str, req: &UpdateTaskRequest) -> Result<(), AppError> {
        self.post_json(&format!("/tasks/{id}"), req).await
    }
}
