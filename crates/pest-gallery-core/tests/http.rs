//! HTTP clients against a local axum stub of the backend and image host.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use pest_gallery_config::{BackendConfig, ImageHostConfig};
use pest_gallery_core::{CloudinaryHost, GalleryError, HttpPestApi, ImageHost, PestApi, RecordStore};
use pest_gallery_protocol::{Category, CreatePestRequest, ImageFile, RecordId, UpdatePestRequest};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Default)]
struct Backend {
    records: Mutex<Vec<Value>>,
    bodies: Mutex<Vec<Value>>,
    list_calls: Mutex<usize>,
    uploads: Mutex<Vec<String>>,
}

type Shared = Arc<Backend>;

async fn list(State(backend): State<Shared>) -> Json<Vec<Value>> {
    *backend.list_calls.lock() += 1;
    Json(backend.records.lock().clone())
}

async fn create(State(backend): State<Shared>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    backend.bodies.lock().push(body.clone());
    let mut record = body;
    record["_id"] = json!("new-1");
    record["__v"] = json!(0);
    backend.records.lock().push(record.clone());
    (StatusCode::CREATED, Json(record))
}

async fn one(
    State(backend): State<Shared>,
    Path(id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    backend
        .records
        .lock()
        .iter()
        .find(|record| record["_id"] == json!(id))
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update(
    State(backend): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    backend.bodies.lock().push(body.clone());
    let mut records = backend.records.lock();
    let record = records
        .iter_mut()
        .find(|record| record["_id"] == json!(id))
        .ok_or(StatusCode::NOT_FOUND)?;
    if let (Some(target), Some(patch)) = (record.as_object_mut(), body.as_object()) {
        for (key, value) in patch {
            target.insert(key.clone(), value.clone());
        }
    }
    Ok(Json(record.clone()))
}

async fn remove(State(backend): State<Shared>, Path(id): Path<String>) -> StatusCode {
    let mut records = backend.records.lock();
    let before = records.len();
    records.retain(|record| record["_id"] != json!(id));
    if records.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    }
}

async fn upload(State(backend): State<Shared>, body: Bytes) -> Json<Value> {
    backend
        .uploads
        .lock()
        .push(String::from_utf8_lossy(&body).into_owned());
    Json(json!({
        "secure_url": "https://x/y.jpg",
        "public_id": "pests/y",
        "format": "jpg",
        "bytes": 4
    }))
}

async fn upload_without_url() -> Json<Value> {
    Json(json!({ "public_id": "pests/y" }))
}

async fn upload_rejected() -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": { "message": "Upload preset not found" } })),
    )
}

async fn upload_gateway_error() -> (StatusCode, &'static str) {
    (
        StatusCode::BAD_GATEWAY,
        "<html><body>Bad Gateway</body></html>",
    )
}

async fn spawn_stub(backend: Shared) -> SocketAddr {
    let app = Router::new()
        .route("/api/v1/pest", get(list).post(create))
        .route("/api/v1/pest/{id}", get(one).put(update).delete(remove))
        .route("/upload", post(upload))
        .route("/upload-no-url", post(upload_without_url))
        .route("/upload-rejected", post(upload_rejected))
        .route("/upload-gateway", post(upload_gateway_error))
        .with_state(backend);
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

fn backend_config(addr: SocketAddr) -> BackendConfig {
    BackendConfig {
        base_url: format!("http://{addr}"),
        api_prefix: "/api/v1".to_string(),
        timeout_secs: 5,
    }
}

fn seeded() -> Shared {
    let backend = Backend::default();
    *backend.records.lock() = vec![
        json!({"_id": "1", "name": "Aphid", "description": "sap", "imageUrl": "https://i/1.jpg", "category": "negative", "__v": 0}),
        json!({"_id": "2", "name": "Ladybug", "description": "friend", "text": "eats aphids", "imageUrl": "https://i/2.jpg", "category": "positive", "__v": 0}),
    ];
    Arc::new(backend)
}

fn image() -> ImageFile {
    ImageFile {
        file_name: "a.jpg".to_string(),
        mime_type: "image/jpeg".to_string(),
        bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
    }
}

#[tokio::test]
async fn lists_and_fetches_records() {
    let backend = seeded();
    let addr = spawn_stub(backend.clone()).await;
    let api = HttpPestApi::new(&backend_config(addr)).expect("client");

    let records = api.list().await.expect("list");
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].text, "eats aphids");
    assert_eq!(records[0].text, "");

    let ladybug = api.get(&RecordId::new("2")).await.expect("get");
    assert_eq!(ladybug.category, Category::Positive);
}

#[tokio::test]
async fn missing_record_maps_to_status_error() {
    let addr = spawn_stub(seeded()).await;
    let api = HttpPestApi::new(&backend_config(addr)).expect("client");

    let err = api.get(&RecordId::new("nope")).await.expect_err("404");
    assert!(matches!(err, GalleryError::Status { status: 404, .. }));
}

#[tokio::test]
async fn create_sends_camel_case_body() {
    let backend = seeded();
    let addr = spawn_stub(backend.clone()).await;
    let api = HttpPestApi::new(&backend_config(addr)).expect("client");

    let created = api
        .create(&CreatePestRequest {
            name: "Aphid".to_string(),
            description: "d".to_string(),
            text: None,
            image_url: "https://x/y.jpg".to_string(),
            category: Category::Negative,
        })
        .await
        .expect("create");

    assert_eq!(
        backend.bodies.lock().clone(),
        vec![json!({
            "name": "Aphid",
            "description": "d",
            "imageUrl": "https://x/y.jpg",
            "category": "negative"
        })]
    );
    assert_eq!(created.map(|record| record.id), Some(RecordId::new("new-1")));
}

#[tokio::test]
async fn update_and_delete_round_trip() {
    let backend = seeded();
    let addr = spawn_stub(backend.clone()).await;
    let api = HttpPestApi::new(&backend_config(addr)).expect("client");
    let id = RecordId::new("1");

    let updated = api
        .update(
            &id,
            &UpdatePestRequest {
                name: "Green aphid".to_string(),
                description: "sap".to_string(),
                category: Category::Negative,
                image_url: "https://i/1.jpg".to_string(),
                text: Some("on roses".to_string()),
            },
        )
        .await
        .expect("update")
        .expect("record body");
    assert_eq!(updated.name, "Green aphid");
    assert_eq!(updated.text, "on roses");

    api.delete(&id).await.expect("delete");
    let remaining = api.list().await.expect("list");
    assert_eq!(
        remaining.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
        vec!["2"]
    );
    let err = api.delete(&id).await.expect_err("already gone");
    assert!(matches!(err, GalleryError::Status { status: 404, .. }));
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let api = HttpPestApi::new(&backend_config(addr)).expect("client");

    let err = api.list().await.expect_err("nothing listening");
    assert!(matches!(err, GalleryError::Transport { .. }));
}

#[tokio::test]
async fn store_shares_one_request_between_readers() {
    let backend = seeded();
    let addr = spawn_stub(backend.clone()).await;
    let api = Arc::new(HttpPestApi::new(&backend_config(addr)).expect("client"));
    let store = RecordStore::new(api, false);

    let (first, second) = tokio::join!(store.read(), store.read());

    assert_eq!(first.expect("first").len(), 2);
    assert_eq!(second.expect("second").len(), 2);
    assert_eq!(*backend.list_calls.lock(), 1);
}

#[tokio::test]
async fn uploads_multipart_with_preset() {
    let backend = seeded();
    let addr = spawn_stub(backend.clone()).await;
    let host = CloudinaryHost::new(&ImageHostConfig {
        upload_url: format!("http://{addr}/upload"),
        upload_preset: "gallery".to_string(),
        timeout_secs: 5,
    })
    .expect("host");

    let uploaded = host.upload(image()).await.expect("upload");

    assert_eq!(uploaded.secure_url, "https://x/y.jpg");
    assert_eq!(uploaded.public_id.as_deref(), Some("pests/y"));
    let bodies = backend.uploads.lock().clone();
    assert_eq!(bodies.len(), 1);
    assert!(bodies[0].contains("name=\"upload_preset\""));
    assert!(bodies[0].contains("gallery"));
    assert!(bodies[0].contains("name=\"file\"; filename=\"a.jpg\""));
    assert!(bodies[0].contains("image/jpeg"));
}

#[tokio::test]
async fn upload_without_secure_url_fails() {
    let addr = spawn_stub(seeded()).await;
    let host = CloudinaryHost::new(&ImageHostConfig {
        upload_url: format!("http://{addr}/upload-no-url"),
        upload_preset: "gallery".to_string(),
        timeout_secs: 5,
    })
    .expect("host");

    let err = host.upload(image()).await.expect_err("no url");
    assert!(matches!(err, GalleryError::Upload(msg) if msg.contains("secure_url")));
}

#[tokio::test]
async fn rejected_upload_reports_host_message() {
    let addr = spawn_stub(seeded()).await;
    let host = CloudinaryHost::new(&ImageHostConfig {
        upload_url: format!("http://{addr}/upload-rejected"),
        upload_preset: "missing".to_string(),
        timeout_secs: 5,
    })
    .expect("host");

    let err = host.upload(image()).await.expect_err("rejected");
    assert_eq!(
        err,
        GalleryError::Upload("status 400: Upload preset not found".to_string())
    );
}

#[tokio::test]
async fn non_json_rejection_reports_status() {
    let addr = spawn_stub(seeded()).await;
    let host = CloudinaryHost::new(&ImageHostConfig {
        upload_url: format!("http://{addr}/upload-gateway"),
        upload_preset: "gallery".to_string(),
        timeout_secs: 5,
    })
    .expect("host");

    let err = host.upload(image()).await.expect_err("gateway");
    assert_eq!(
        err,
        GalleryError::Upload("status 502: <html><body>Bad Gateway</body></html>".to_string())
    );
}
