use canvas_sync::notion::{NotionApi, NotionHttpClient};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn page_json(id: &str, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "archived": false,
        "properties": {
            "Name": {
                "type": "title",
                "title": [{ "plain_text": title }]
            },
            "Due Date": {
                "type": "date",
                "date": { "start": "2025-09-22T15:00:00Z" }
            }
        }
    })
}

#[tokio::test]
async fn query_follows_pagination_cursors() {
    let server = MockServer::start().await;

    // The cursor-bearing follow-up request; mounted first so it wins when
    // the body carries the cursor.
    Mock::given(method("POST"))
        .and(path("/databases/db-1/query"))
        .and(body_partial_json(json!({ "start_cursor": "cursor-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [page_json("p2", "Quiz 3")],
            "has_more": false,
            "next_cursor": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/databases/db-1/query"))
        .and(header("Notion-Version", "2022-06-28"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [page_json("p1", "Essay 1")],
            "has_more": true,
            "next_cursor": "cursor-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client =
        NotionHttpClient::with_base_url("secret", "db-1", server.uri()).expect("client");
    let pages = client.query_upcoming().await.expect("query");

    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].title(), Some("Essay 1"));
    assert_eq!(pages[1].title(), Some("Quiz 3"));
}

#[tokio::test]
async fn create_wraps_properties_with_the_database_parent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pages"))
        .and(body_partial_json(json!({
            "parent": { "database_id": "db-1" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "p1"})))
        .expect(1)
        .mount(&server)
        .await;

    let client =
        NotionHttpClient::with_base_url("secret", "db-1", server.uri()).expect("client");
    client
        .create_page(json!({ "Name": { "title": [] } }))
        .await
        .expect("create");
}

#[tokio::test]
async fn update_patches_the_page_by_id() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/pages/p1"))
        .and(header("Authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "p1"})))
        .expect(1)
        .mount(&server)
        .await;

    let client =
        NotionHttpClient::with_base_url("secret", "db-1", server.uri()).expect("client");
    client
        .update_page("p1", json!({ "Name": { "title": [] } }))
        .await
        .expect("update");
}
