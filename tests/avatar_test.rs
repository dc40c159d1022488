//! Integration tests for avatar updates.

use birdr_client::{Client, ClientConfig, ClientError, Credentials, ProfileUpdate};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Smallest valid PNG signature plus a few bytes; the content is never sniffed.
const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake-image";

fn user_json() -> serde_json::Value {
    json!({
        "_id": "65a1",
        "username": "bird",
        "displayName": "Bird",
        "avatarUrl": "https://cdn.example.com/new.png",
        "__v": 1
    })
}

async fn logged_in_client(server: &MockServer) -> Client {
    Mock::given(method("GET"))
        .and(path("/api/v1/users/@me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .mount(server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/users/@me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .mount(server)
        .await;

    let config = ClientConfig::with_api_url(format!("{}/api/v1", server.uri()));
    let client = Client::new(&config).expect("Failed to build client");
    client
        .login(Credentials::token("test-token"))
        .await
        .expect("login failed");
    client
}

/// Bodies of every profile update the server received.
async fn patch_bodies(server: &MockServer) -> Vec<serde_json::Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.as_str() == "PATCH")
        .map(|r| serde_json::from_slice(&r.body).expect("PATCH body is not JSON"))
        .collect()
}

#[tokio::test]
async fn test_avatar_url_becomes_png_data_uri() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/images/a.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(PNG_BYTES))
        .expect(1)
        .mount(&server)
        .await;
    let client = logged_in_client(&server).await;

    client
        .update_user_info(ProfileUpdate::default().avatar(format!("{}/images/a.png", server.uri())))
        .await
        .expect("update_user_info failed");

    let bodies = patch_bodies(&server).await;
    assert_eq!(bodies.len(), 1);
    let avatar = bodies[0]["avatar"].as_str().expect("avatar missing");
    assert!(avatar.starts_with("data:image/png;base64,"), "got {avatar}");
    assert_eq!(
        avatar,
        birdr_client::media::to_data_uri("image/png", PNG_BYTES)
    );
}

#[tokio::test]
async fn test_avatar_type_comes_from_extension_not_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/images/pic.gif"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(PNG_BYTES))
        .mount(&server)
        .await;
    let client = logged_in_client(&server).await;

    client
        .change_avatar(&format!("{}/images/pic.gif?size=large", server.uri()))
        .await
        .expect("change_avatar failed");

    let bodies = patch_bodies(&server).await;
    let avatar = bodies[0]["avatar"].as_str().unwrap();
    assert!(avatar.starts_with("data:image/gif;base64,"), "got {avatar}");
}

#[tokio::test]
async fn test_local_jpeg_avatar() {
    let server = MockServer::start().await;
    let client = logged_in_client(&server).await;
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let file = temp_dir.path().join("me.jpg");
    std::fs::write(&file, b"jpeg-bytes").unwrap();

    client
        .update_user_info(
            ProfileUpdate::default()
                .avatar(file.to_string_lossy())
                .display_name("Bird"),
        )
        .await
        .expect("update_user_info failed");

    let bodies = patch_bodies(&server).await;
    assert_eq!(bodies[0]["displayName"], "Bird");
    assert_eq!(
        bodies[0]["avatar"],
        birdr_client::media::to_data_uri("image/jpeg", b"jpeg-bytes")
    );
    assert!(bodies[0].get("username").is_none());
}

#[tokio::test]
async fn test_local_bmp_avatar_is_rejected_before_update() {
    let server = MockServer::start().await;
    let client = logged_in_client(&server).await;
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let file = temp_dir.path().join("photo.bmp");
    std::fs::write(&file, b"BMfake").unwrap();

    let err = client
        .update_user_info(ProfileUpdate::default().avatar(file.to_string_lossy()))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::UnsupportedMediaType(_)), "got {err:?}");
    assert!(patch_bodies(&server).await.is_empty());
}

#[tokio::test]
async fn test_unresolvable_avatar_is_invalid_argument() {
    let server = MockServer::start().await;
    let client = logged_in_client(&server).await;

    let err = client
        .change_avatar("not/a/real/file.png")
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::InvalidArgument(_)), "got {err:?}");
    assert!(patch_bodies(&server).await.is_empty());
}

#[tokio::test]
async fn test_failed_avatar_download_sends_no_update() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/images/gone.png"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such image"))
        .mount(&server)
        .await;
    let client = logged_in_client(&server).await;

    let err = client
        .change_avatar(&format!("{}/images/gone.png", server.uri()))
        .await
        .unwrap_err();

    match err {
        ClientError::RemoteRequestFailed { status, message } => {
            assert_eq!(status, Some(404));
            assert_eq!(message, "no such image");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(patch_bodies(&server).await.is_empty());
}
