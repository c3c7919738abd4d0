use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct Task {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub project_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateTaskRequest {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Natural-language due string; Todoist parses it service-side.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_string: Option<String>,
    pub priority: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateTaskRequest {
    pub description: String,
}
