use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Item};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- list ---

#[tokio::test]
async fn list_items_empty() {
    let app = app();
    let resp = app
        .oneshot(Request::builder().uri("/items").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let items: Vec<Item> = body_json(resp).await;
    assert!(items.is_empty());
}

// --- create ---

#[tokio::test]
async fn create_item_returns_201() {
    let app = app();
    let resp = app
        .oneshot(json_request("POST", "/items", r#"{"name":"disk.img"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let item: Item = body_json(resp).await;
    assert_eq!(item.name, "disk.img");
    assert!(!item.archived);
}

#[tokio::test]
async fn create_item_malformed_json_returns_422() {
    let app = app();
    let resp = app
        .oneshot(json_request("POST", "/items", r#"{"not_name":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- get ---

#[tokio::test]
async fn get_item_not_found() {
    let app = app();
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/items/00000000-0000-0000-0000-000000000000")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_item_bad_uuid_returns_400() {
    let app = app();
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/items/not-a-uuid")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- subscription echo ---

#[tokio::test]
async fn subscribing_request_gets_subscription_headers_on_success() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("POST")
                .uri("/items")
                .header(http::header::CONTENT_TYPE, "application/json")
                .header("x-subscribe", "web_hook")
                .header("x-client-token", "tok-abc")
                .body(r#"{"name":"watched"}"#.to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert!(resp.headers().contains_key("x-subscription-id"));
    assert_eq!(resp.headers()["x-client-token"], "tok-abc");
    assert_eq!(resp.headers()["x-topic-id"], "items");
    assert_eq!(resp.headers()["x-topic-uri"], "/items");
}

#[tokio::test]
async fn failed_subscribing_request_gets_no_subscription_headers() {
    let app = app();
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/items/00000000-0000-0000-0000-000000000000")
                .header("x-subscribe", "web_hook")
                .header("x-client-token", "tok-abc")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(!resp.headers().contains_key("x-subscription-id"));
    assert!(!resp.headers().contains_key("x-client-token"));
}

#[tokio::test]
async fn non_subscribing_request_gets_no_subscription_headers() {
    let app = app();
    let resp = app
        .oneshot(Request::builder().uri("/items").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(!resp.headers().contains_key("x-subscription-id"));
}

// --- media ---

#[tokio::test]
async fn media_not_found_for_unknown_item() {
    let app = app();
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/items/00000000-0000-0000-0000-000000000000/media")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upload_then_download_media() {
    use tower::Service;

    let mut app = app().into_service();

    // upload raw bytes, creating the owning item
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("POST")
                .uri("/upload?name=blob.bin")
                .body("raw media payload".to_string())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let item: Item = body_json(resp).await;
    assert_eq!(item.name, "blob.bin");

    // download it back
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .uri(&format!("/items/{}/media", item.id))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_bytes(resp).await;
    assert_eq!(&body[..], b"raw media payload");
}

// --- lifecycle ---

#[tokio::test]
async fn item_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/items", r#"{"name":"disk.img"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Item = body_json(resp).await;
    let id = created.id;

    // archive via empty POST
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("POST")
                .uri(&format!("/items/{id}/archive"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let archived: Item = body_json(resp).await;
    assert!(archived.archived);

    // update name only
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            &format!("/items/{id}"),
            r#"{"name":"disk-v2.img"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Item = body_json(resp).await;
    assert_eq!(updated.name, "disk-v2.img");
    assert!(updated.archived); // unchanged

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("DELETE")
                .uri(&format!("/items/{id}"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let body = body_bytes(resp).await;
    assert!(body.is_empty());

    // get after delete — 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .uri(&format!("/items/{id}"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
