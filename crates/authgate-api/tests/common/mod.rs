// Shared helpers for in-process router tests

#![allow(dead_code)]

use authgate_api::{build_app, auth::AuthType, App, ApiConfig};
use authgate_core::{CreateUser, Database, User};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const EMAIL: &str = "bob@hbtn.io";
pub const PASSWORD: &str = "H0lbertonSchool98!";
pub const SESSION_NAME: &str = "_my_session_id";

pub struct TestApp {
    pub app: App,
    pub db: Arc<Database>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// `name=value` pair from the Set-Cookie header
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with(&format!("{}=", SESSION_NAME)))
            .and_then(|v| v.split(';').next())
            .map(str::to_string)
    }
}

pub fn config(auth_type: AuthType) -> ApiConfig {
    ApiConfig {
        auth_type,
        session_name: SESSION_NAME.to_string(),
        ..Default::default()
    }
}

pub fn spawn(config: ApiConfig) -> TestApp {
    let db = Arc::new(Database::new());
    TestApp {
        app: build_app(&config, db.clone()),
        db,
    }
}

pub async fn spawn_with_user(config: ApiConfig) -> (TestApp, User) {
    let app = spawn(config);
    let user = app
        .db
        .create_user(CreateUser {
            email: EMAIL.to_string(),
            password: PASSWORD.to_string(),
            first_name: Some("Bob".to_string()),
            last_name: Some("Dylan".to_string()),
        })
        .await
        .expect("create user");
    (app, user)
}

pub fn basic(email: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", email, password)))
}

pub struct RequestSpec<'a> {
    pub method: Method,
    pub uri: &'a str,
    pub authorization: Option<&'a str>,
    pub cookie: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub body: Option<String>,
}

impl<'a> RequestSpec<'a> {
    pub fn get(uri: &'a str) -> Self {
        Self::new(Method::GET, uri)
    }

    pub fn new(method: Method, uri: &'a str) -> Self {
        Self {
            method,
            uri,
            authorization: None,
            cookie: None,
            content_type: None,
            body: None,
        }
    }

    pub fn authorization(mut self, value: &'a str) -> Self {
        self.authorization = Some(value);
        self
    }

    pub fn cookie(mut self, value: &'a str) -> Self {
        self.cookie = Some(value);
        self
    }

    pub fn json(mut self, body: impl Into<String>) -> Self {
        self.content_type = Some("application/json");
        self.body = Some(body.into());
        self
    }

    pub fn form(mut self, body: impl Into<String>) -> Self {
        self.content_type = Some("application/x-www-form-urlencoded");
        self.body = Some(body.into());
        self
    }
}

impl TestApp {
    pub async fn send(&self, spec: RequestSpec<'_>) -> TestResponse {
        let mut builder = Request::builder().method(spec.method).uri(spec.uri);
        if let Some(value) = spec.authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        if let Some(value) = spec.cookie {
            builder = builder.header(header::COOKIE, value);
        }
        if let Some(value) = spec.content_type {
            builder = builder.header(header::CONTENT_TYPE, value);
        }
        let request = builder
            .body(spec.body.map(Body::from).unwrap_or_else(Body::empty))
            .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(RequestSpec::get(uri)).await
    }
}
