#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use musee_db::{create_pool, run_migrations, DbPool, DbRuntimeSettings};
use musee_media::{MediaSettings, MediaStore};
use musee_server::{app, AppState};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "musee-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub pool: DbPool,
    dir: TempDir,
}

impl TestApp {
    pub fn media_root(&self) -> PathBuf {
        self.dir.path().join("media")
    }

    /// Number of files stored for one asset kind (`targets`, `overlays`, `audio`).
    pub fn stored_files(&self, kind_dir: &str) -> usize {
        count_files(&self.media_root().join(kind_dir))
    }
}

pub fn setup_app() -> TestApp {
    setup_app_with(MediaSettings::default())
}

pub fn setup_app_with(settings: MediaSettings) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("musee.db");
    let pool = create_pool(db_path.to_str().unwrap(), DbRuntimeSettings::default()).unwrap();
    {
        let conn = pool.get().unwrap();
        run_migrations(&conn).unwrap();
    }

    let media = MediaStore::new(dir.path().join("media"), settings);
    let state = AppState {
        pool: pool.clone(),
        media,
    };

    TestApp {
        router: app(state),
        pool,
        dir,
    }
}

fn count_files(dir: &Path) -> usize {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.filter_map(Result::ok).count(),
        Err(_) => 0,
    }
}

/// Builds a `multipart/form-data` body.
#[derive(Default)]
pub struct Form {
    body: Vec<u8>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}

/// Text fields of a valid work, without files.
pub fn work_fields() -> Form {
    Form::new()
        .text("titre", "Le Radeau de la Méduse")
        .text("auteur", "Théodore Géricault")
        .text("technique", "huile sur toile")
        .text("hauteur", "491")
        .text("largeur", "716")
        .text("annee", "1818")
}

/// A valid work form with a target image.
pub fn work_form() -> Form {
    work_fields().file("image", "radeau.jpg", b"jpeg-bytes")
}

/// A valid overlay form with an overlay image.
pub fn overlay_form(type_calque: &str) -> Form {
    Form::new()
        .text("typeCalque", type_calque)
        .text("description", "Le triangle de l'amour")
        .file("calque", "triangle.png", b"png-bytes")
}

pub fn multipart_request(method: Method, uri: &str, form: Form) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(form.finish()))
        .unwrap()
}

pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Sends a request and returns the status with the raw body.
pub async fn send_raw(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

/// Sends a request and returns the status with the JSON body.
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send_raw(router, request).await;
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

/// Creates a work through the API and returns its JSON.
pub async fn create_work(app: &TestApp, form: Form) -> Value {
    let (status, json) = send(
        &app.router,
        multipart_request(Method::POST, "/oeuvres", form),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create work failed: {json}");
    json
}

/// Creates an overlay through the API and returns its JSON.
pub async fn create_overlay(app: &TestApp, work_id: i64, form: Form) -> Value {
    let (status, json) = send(
        &app.router,
        multipart_request(Method::POST, &format!("/oeuvres/{work_id}/calques"), form),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create overlay failed: {json}");
    json
}
