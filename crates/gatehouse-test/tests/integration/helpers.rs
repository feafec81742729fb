#![allow(clippy::expect_used, dead_code)]
//! Request and assertion helpers for the integration tests.

use salvo::http::StatusCode;
use salvo::test::{RequestBuilder, ResponseExt, TestClient};
use serde_json::Value;

pub use gatehouse_test::{ADMIN_PASSWORD, ADMIN_USERNAME, TestApp, test_settings};

const BASE_URL: &str = "http://127.0.0.1:5800/api";

/// JSON request builder.
pub struct TestRequest {
    builder: RequestBuilder,
}

impl TestRequest {
    fn new(builder: RequestBuilder) -> Self {
        Self { builder }
    }

    #[must_use]
    pub fn get(path: &str) -> Self {
        Self::new(TestClient::get(format!("{BASE_URL}{path}")))
    }

    #[must_use]
    pub fn post(path: &str) -> Self {
        Self::new(TestClient::post(format!("{BASE_URL}{path}")))
    }

    #[must_use]
    pub fn put(path: &str) -> Self {
        Self::new(TestClient::put(format!("{BASE_URL}{path}")))
    }

    #[must_use]
    pub fn delete(path: &str) -> Self {
        Self::new(TestClient::delete(format!("{BASE_URL}{path}")))
    }

    #[must_use]
    pub fn token(self, token: &str) -> Self {
        self.header("authorization", &format!("Bearer {token}"))
    }

    #[must_use]
    pub fn header(self, name: &'static str, value: &str) -> Self {
        Self::new(self.builder.add_header(name, value.to_owned(), true))
    }

    #[must_use]
    pub fn json(self, body: &Value) -> Self {
        Self::new(self.builder.json(body))
    }

    pub async fn send(self, app: &TestApp) -> TestResponse {
        let mut response = self.builder.send(&app.service).await;
        let status = response
            .status_code
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let text = response.take_string().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        TestResponse { status, body }
    }
}

/// Status plus the decoded body (or the raw text when it is not JSON).
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    /// Asserts the status and, for JSON bodies, the matching envelope code.
    #[must_use]
    pub fn assert_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.status, expected,
            "Expected status {expected} but got {}: {}",
            self.status, self.body
        );
        if let Some(code) = self.body.get("code") {
            let envelope = if expected.is_success() { 0 } else { 7 };
            assert_eq!(code, envelope, "unexpected envelope code: {}", self.body);
        }
        self
    }

    #[must_use]
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    #[must_use]
    pub fn msg(&self) -> &str {
        self.body["msg"].as_str().unwrap_or_default()
    }
}

/// Signs in and returns the bearer token.
pub async fn login_as(app: &TestApp, username: &str, password: &str) -> String {
    let response = TestRequest::post("/login")
        .json(&serde_json::json!({ "username": username, "password": password }))
        .send(app)
        .await
        .assert_status(StatusCode::OK);
    response.data()["token"]
        .as_str()
        .expect("login response carries a token")
        .to_owned()
}

pub async fn admin_token(app: &TestApp) -> String {
    login_as(app, ADMIN_USERNAME, ADMIN_PASSWORD).await
}

/// Creates a role through the API.
pub async fn create_role(app: &TestApp, token: &str, authority_id: &str) {
    let _created = TestRequest::post("/authority/create")
        .token(token)
        .json(&serde_json::json!({
            "authorityId": authority_id,
            "authorityName": format!("role {authority_id}"),
        }))
        .send(app)
        .await
        .assert_status(StatusCode::OK);
}

/// Creates a user with `authority_id` and returns its id.
pub async fn create_user(
    app: &TestApp,
    token: &str,
    username: &str,
    password: &str,
    authority_id: &str,
) -> i64 {
    let response = TestRequest::post("/user")
        .token(token)
        .json(&serde_json::json!({
            "username": username,
            "password": password,
            "nickName": format!("{username} nick"),
            "authorityId": authority_id,
        }))
        .send(app)
        .await
        .assert_status(StatusCode::OK);
    response.data()["id"].as_i64().expect("created user has an id")
}

/// Creates a root menu with `path` and returns its id.
pub async fn create_menu(app: &TestApp, token: &str, parent_id: &str, path: &str) -> i64 {
    let response = TestRequest::post("/menu")
        .token(token)
        .json(&serde_json::json!({
            "parentId": parent_id,
            "path": path,
            "name": path,
            "component": format!("view/{path}/index.vue"),
            "sort": 1,
            "meta": { "title": path },
        }))
        .send(app)
        .await
        .assert_status(StatusCode::OK);
    response.data()["id"].as_i64().expect("created menu has an id")
}
