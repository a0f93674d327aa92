#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use annotation_kit::config::Config;
use annotation_kit::services::storage::FileStorage;
use annotation_kit::{build_router, database, AppState};

const BOUNDARY: &str = "annotation-kit-test-boundary";

pub mod routes {
    pub const PROJECTS: &str = "/projects";

    pub fn project(id: &str) -> String {
        format!("/projects/{id}")
    }

    pub fn project_images(id: &str) -> String {
        format!("/projects/{id}/images")
    }

    pub fn image(id: &str) -> String {
        format!("/images/{id}")
    }

    pub fn annotations(image_id: &str) -> String {
        format!("/images/{image_id}/annotations")
    }

    pub fn annotation(image_id: &str, annotation_id: &str) -> String {
        format!("/images/{image_id}/annotations/{annotation_id}")
    }

    pub fn predict(image_id: &str) -> String {
        format!("/predict/{image_id}")
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub bytes: Vec<u8>,
}

/// The full router over a throwaway SQLite database and storage directory.
pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
    pub storage: FileStorage,
    _dir: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|state| state).await
    }

    pub async fn spawn_with<F>(customize: F) -> Self
    where
        F: FnOnce(AppState) -> AppState,
    {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let database_url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());

        let config = Config {
            database_url: database_url.clone(),
            storage_dir: dir.path().join("static"),
            ..Config::default()
        };

        let db = database::init_db(&database_url, false)
            .await
            .expect("Failed to initialize test database");

        let state = customize(AppState::new(db.clone(), &config));
        state
            .storage
            .ensure_root()
            .await
            .expect("Failed to create storage root");
        let storage = state.storage.clone();

        TestApp {
            router: build_router(state),
            db,
            storage,
            _dir: dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body")
            .to_vec();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse {
            status,
            body,
            bytes,
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        self.send(request).await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn patch_json(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::PATCH, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.request(Method::DELETE, uri, None).await
    }

    /// Multipart upload with one `files` part per entry.
    pub async fn upload(&self, project_id: &str, files: &[(&str, &[u8])]) -> TestResponse {
        let mut body = Vec::new();
        for (name, data) in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri(routes::project_images(project_id))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    pub async fn create_project(&self, name: &str) -> String {
        let res = self.post_json(routes::PROJECTS, json!({ "name": name })).await;
        assert_eq!(res.status, StatusCode::CREATED, "create project: {:?}", res.body);
        res.body["id"].as_str().unwrap().to_string()
    }

    /// Upload a single file and return its image view.
    pub async fn upload_one(&self, project_id: &str, name: &str, data: &[u8]) -> Value {
        let res = self.upload(project_id, &[(name, data)]).await;
        assert_eq!(res.status, StatusCode::CREATED, "upload: {:?}", res.body);
        res.body[0].clone()
    }

    pub async fn create_annotation(&self, image_id: &str, body: Value) -> TestResponse {
        self.post_json(&routes::annotations(image_id), body).await
    }

    /// Number of regular files stored for a project.
    pub fn stored_files(&self, project_id: &str) -> usize {
        match std::fs::read_dir(self.storage.images_dir().join(project_id)) {
            Ok(entries) => entries.filter_map(Result::ok).count(),
            Err(_) => 0,
        }
    }
}

pub fn dog_box() -> Value {
    json!({ "label": "dog", "x": 0.1, "y": 0.1, "width": 0.2, "height": 0.2 })
}
