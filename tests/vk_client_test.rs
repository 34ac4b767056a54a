//! Integration tests for the VK API client.

use serde_json::json;
use vk_telegram_relay::config::Config;
use vk_telegram_relay::vk::{Attachment, OwnerDirectory, VkClient, VkError, WallSource};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> VkClient {
    VkClient::new(&Config {
        vk_api_url: server.uri(),
        ..Config::for_testing()
    })
}

#[tokio::test]
async fn test_fetch_posts_sends_expected_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/method/wall.get"))
        .and(query_param("access_token", "vk-test-token"))
        .and(query_param("v", "5.199"))
        .and(query_param("domain", "grp"))
        .and(query_param("count", "7"))
        .and(query_param("extended", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {"count": 1, "items": [{
                "id": 5, "owner_id": -42, "date": 2000, "text": "hi",
                "attachments": [
                    {"type": "photo", "photo": {"id": 1, "sizes": [{"type": "x", "url": "u1", "width": 604, "height": 403}]}},
                    {"type": "video", "video": {"id": 2, "player": "https://player"}}
                ]
            }], "profiles": [], "groups": []}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let posts = client(&server).fetch_posts(7).await.unwrap();

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, 5);
    let attachments = posts[0].attachments.as_ref().unwrap();
    assert!(matches!(&attachments[1], Attachment::Video(v) if v.player.as_deref() == Some("https://player")));
}

#[tokio::test]
async fn test_api_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/method/wall.get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": {"error_code": 15, "error_msg": "Access denied"}
        })))
        .mount(&server)
        .await;

    let err = client(&server).fetch_posts(10).await.unwrap_err();

    assert!(matches!(err, VkError::Api { code: 15, ref message } if message == "Access denied"));
}

#[tokio::test]
async fn test_http_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/method/wall.get"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = client(&server).fetch_posts(10).await.unwrap_err();
    assert!(matches!(err, VkError::Http(_)));
}

#[tokio::test]
async fn test_empty_id_list_skips_request() {
    let server = MockServer::start().await;
    let posts = client(&server).fetch_posts_by_ids(&[]).await.unwrap();
    assert!(posts.is_empty());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_user_name_resolution() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/method/users.get"))
        .and(query_param("user_ids", "15"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": [{"id": 15, "first_name": "Ivan", "last_name": "Petrov"}]
        })))
        .mount(&server)
        .await;

    assert_eq!(client(&server).owner_name(15).await, "Ivan Petrov");
}

#[tokio::test]
async fn test_group_name_resolution_uses_positive_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/method/groups.getById"))
        .and(query_param("group_id", "176833970"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {"groups": [{"id": 176_833_970, "name": "Форум Компаньон"}], "profiles": []}
        })))
        .mount(&server)
        .await;

    assert_eq!(client(&server).owner_name(-176_833_970).await, "Форум Компаньон");
}

#[tokio::test]
async fn test_name_resolution_falls_back_to_placeholder() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/method/users.get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": []})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/method/groups.getById"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client(&server);
    assert_eq!(client.owner_name(3).await, "Unknown");
    assert_eq!(client.owner_name(-3).await, "Unknown");
    assert!(matches!(
        client.fetch_owner_name(3).await,
        Err(VkError::OwnerNotFound(3))
    ));
}
