#![allow(dead_code)]

use std::io::Cursor;
use std::path::PathBuf;

use anyhow::{Context, Result};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};
use tower::ServiceExt;

use social_api::config::{self, AppConfig};
use social_api::database::Database;
use social_api::{app, AppState};

pub const PASSWORD: &str = "correct-horse-battery";

/// The full router over a fresh memory store and a private media directory
pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub media_root: PathBuf,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    pub fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let media_root = std::env::temp_dir().join(format!("social-api-test-{}", uuid::Uuid::new_v4()));

        let mut settings = config::config().clone();
        settings.database.url.clear();
        settings.media.root = media_root.to_string_lossy().into_owned();
        // Room for base64 uploads above the image limit
        settings.api.max_request_size_bytes = settings.api.max_request_size_bytes.max(8 * 1024 * 1024);
        adjust(&mut settings);

        let state = AppState::new(Database::memory(), settings);
        Self {
            router: app(state.clone()),
            state,
            media_root,
        }
    }

    pub async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Result<(StatusCode, Value)> {
        send(self.router.clone(), method, uri, token, body).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Register through the API and log in; returns (token, user id, profile id)
    pub async fn register(&self, username: &str) -> Result<Session> {
        let (status, body) = self
            .post(
                "/auth/registration/",
                None,
                json!({ "username": username, "password1": PASSWORD, "password2": PASSWORD }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "registration failed: {} {}", status, body);
        self.login(username).await
    }

    /// Create a staff user directly through the service layer
    pub async fn admin(&self, username: &str) -> Result<Session> {
        self.state.users().create_user(username, PASSWORD, true).await?;
        self.login(username).await
    }

    pub async fn login(&self, username: &str) -> Result<Session> {
        let (status, body) = self
            .post("/auth/login/", None, json!({ "username": username, "password": PASSWORD }))
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "login failed: {} {}", status, body);
        let data = &body["data"];
        Ok(Session {
            token: data["token"].as_str().context("token")?.to_string(),
            user_id: data["user"]["id"].as_i64().context("user id")?,
            profile_id: data["user"]["profile_id"].as_i64().context("profile id")?,
        })
    }

    /// Create a post and return its id
    pub async fn create_post(&self, session: &Session, title: &str) -> Result<i64> {
        let (status, body) = self.post("/posts/", Some(&session.token), json!({ "title": title })).await?;
        anyhow::ensure!(status == StatusCode::CREATED, "post create failed: {} {}", status, body);
        body["data"]["id"].as_i64().context("post id")
    }
}

/// Drive one request through a router; owned so it can run inside `tokio::spawn`
pub async fn send(router: Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = router.oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).with_context(|| format!("non-JSON body from {}", uri))?
    };
    Ok((status, value))
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.media_root);
    }
}

pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub profile_id: i64,
}

impl Session {
    pub fn token(&self) -> Option<&str> {
        Some(&self.token)
    }
}

/// Uncompressed BMP, so the encoded size is predictable
pub fn bmp(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    image::RgbImage::new(width, height)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageOutputFormat::Bmp)
        .expect("encode bmp");
    bytes
}

pub fn image_payload(bytes: &[u8]) -> Value {
    json!({ "filename": "upload.bmp", "data": STANDARD.encode(bytes) })
}
