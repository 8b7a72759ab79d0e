use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, Query, Request, State},
    http::{HeaderValue, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub archived: bool,
}

#[derive(Deserialize)]
pub struct CreateItem {
    pub name: String,
    #[serde(default)]
    pub archived: bool,
}

#[derive(Deserialize)]
pub struct UpdateItem {
    pub name: Option<String>,
    pub archived: Option<bool>,
}

#[derive(Deserialize)]
pub struct UploadParams {
    pub name: String,
}

#[derive(Default)]
pub struct Store {
    items: HashMap<Uuid, Item>,
    media: HashMap<Uuid, Vec<u8>>,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route(
            "/items/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
        .route("/items/{id}/archive", post(archive_item))
        .route("/items/{id}/media", get(get_media))
        .route("/upload", post(upload_media))
        .layer(middleware::from_fn(subscription_echo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Subscription handshake: a successful response to a request carrying
/// `x-subscribe` gains a fresh `x-subscription-id`, the caller's
/// `x-client-token` echoed back, and the topic headers.
async fn subscription_echo(request: Request, next: Next) -> Response {
    let subscribing = request.headers().contains_key("x-subscribe");
    let client_token = request
        .headers()
        .get("x-client-token")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let topic_uri = request.uri().path().to_string();

    let mut response = next.run(request).await;
    if subscribing && response.status().is_success() {
        let subscription_id = Uuid::new_v4().to_string();
        let headers = response.headers_mut();
        if let Ok(value) = HeaderValue::from_str(&subscription_id) {
            headers.insert("x-subscription-id", value);
        }
        if let Some(value) = client_token.and_then(|t| HeaderValue::from_str(&t).ok()) {
            headers.insert("x-client-token", value);
        }
        headers.insert("x-topic-id", HeaderValue::from_static("items"));
        if let Ok(value) = HeaderValue::from_str(&topic_uri) {
            headers.insert("x-topic-uri", value);
        }
    }
    response
}

async fn list_items(State(db): State<Db>) -> Json<Vec<Item>> {
    let store = db.read().await;
    Json(store.items.values().cloned().collect())
}

async fn create_item(
    State(db): State<Db>,
    Json(input): Json<CreateItem>,
) -> (StatusCode, Json<Item>) {
    let item = Item {
        id: Uuid::new_v4(),
        name: input.name,
        archived: input.archived,
    };
    db.write().await.items.insert(item.id, item.clone());
    (StatusCode::CREATED, Json(item))
}

async fn get_item(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<Json<Item>, StatusCode> {
    let store = db.read().await;
    store.items.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_item(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateItem>,
) -> Result<Json<Item>, StatusCode> {
    let mut store = db.write().await;
    let item = store.items.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(name) = input.name {
        item.name = name;
    }
    if let Some(archived) = input.archived {
        item.archived = archived;
    }
    Ok(Json(item.clone()))
}

async fn delete_item(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    match store.items.remove(&id) {
        Some(_) => {
            store.media.remove(&id);
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// Custom operation reached by POST with an empty body.
async fn archive_item(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<Json<Item>, StatusCode> {
    let mut store = db.write().await;
    let item = store.items.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    item.archived = true;
    Ok(Json(item.clone()))
}

async fn get_media(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<Vec<u8>, StatusCode> {
    let store = db.read().await;
    store.media.get(&id).cloned().ok_or(StatusCode::NOT_FOUND)
}

/// Accepts the final body of an upload session and creates the item the
/// media belongs to.
async fn upload_media(
    State(db): State<Db>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> (StatusCode, Json<Item>) {
    let item = Item {
        id: Uuid::new_v4(),
        name: params.name,
        archived: false,
    };
    let mut store = db.write().await;
    store.media.insert(item.id, body.to_vec());
    store.items.insert(item.id, item.clone());
    (StatusCode::CREATED, Json(item))
}
