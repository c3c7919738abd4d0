use canvas_sync::error::AppError;
use canvas_sync::todoist::{CreateTaskRequest, TodoistApi, TodoistHttpClient};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn lists_tasks_with_bearer_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "t1",
                "content": "Essay 1",
                "description": "",
                "is_completed": false,
                "project_id": "p1"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = TodoistHttpClient::with_base_url("test-token", server.uri()).expect("client");
    let tasks = client.list_tasks().await.expect("list");

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].content, "Essay 1");
    assert!(!tasks[0].is_completed);
}

#[tokio::test]
async fn create_posts_the_upsert_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tasks"))
        .and(body_partial_json(json!({
            "content": "Essay 1",
            "due_string": "Sep 22 4:00pm",
            "priority": 2
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "t9"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = TodoistHttpClient::with_base_url("test-token", server.uri()).expect("client");
    client
        .create_task(&CreateTaskRequest {
            content: "Essay 1".to_string(),
            description: None,
            project_id: None,
            due_string: Some("Sep 22 4:00pm".to_string()),
            priority: 2,
        })
        .await
        .expect("create");
}

#[tokio::test]
async fn non_success_status_surfaces_as_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let client = TodoistHttpClient::with_base_url("bad-token", server.uri()).expect("client");
    let err = client.list_projects().await.expect_err("should fail");

    match err {
        AppError::Api {
            service, status, ..
        } => {
            assert_eq!(service, "Todoist");
            assert_eq!(status, 403);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
