use chrono::Duration;
use salvo::http::StatusCode;
use serde_json::json;

use crate::helpers::*;

#[test_log::test(tokio::test)]
async fn health_is_public() {
    let app = TestApp::new(false).await;
    let response = TestRequest::get("/health").send(&app).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "OK");
}

#[test_log::test(tokio::test)]
async fn login_returns_user_token_and_expiry() {
    let app = TestApp::new(false).await;
    let response = TestRequest::post("/login")
        .json(&json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD }))
        .send(&app)
        .await
        .assert_status(StatusCode::OK);

    let data = response.data();
    assert_eq!(data["user"]["username"], ADMIN_USERNAME);
    assert_eq!(data["user"]["authorityId"], "888");
    assert!(data["user"].get("passwordHash").is_none());
    let expected = (gatehouse_test::test_epoch() + Duration::hours(1)).timestamp_millis();
    assert_eq!(data["expiresAt"], expected);
}

#[test_log::test(tokio::test)]
async fn bad_credentials_share_one_message() {
    let app = TestApp::new(false).await;

    let unknown = TestRequest::post("/login")
        .json(&json!({ "username": "ghost", "password": "whatever" }))
        .send(&app)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    let wrong = TestRequest::post("/login")
        .json(&json!({ "username": ADMIN_USERNAME, "password": "not-it" }))
        .send(&app)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    assert_eq!(unknown.msg(), "invalid username or password");
    assert_eq!(unknown.msg(), wrong.msg());
}

#[test_log::test(tokio::test)]
async fn captcha_is_required_after_three_failures_from_one_ip() {
    let app = TestApp::new(false).await;
    let ip = "203.0.113.9";

    let before = TestRequest::get("/login/captcha")
        .header("x-forwarded-for", ip)
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(before.data()["openCaptcha"], false);
    assert_eq!(before.data()["captchaLength"], 6);
    assert!(
        before.data()["picPath"]
            .as_str()
            .unwrap_or_default()
            .starts_with("data:image/svg+xml;base64,")
    );

    for _ in 0..3 {
        let _rejected = TestRequest::post("/login")
            .header("x-forwarded-for", ip)
            .json(&json!({ "username": ADMIN_USERNAME, "password": "wrong-one" }))
            .send(&app)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    let blocked = TestRequest::post("/login")
        .header("x-forwarded-for", ip)
        .json(&json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD }))
        .send(&app)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(blocked.msg(), "invalid captcha");

    let after = TestRequest::get("/login/captcha")
        .header("x-forwarded-for", ip)
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(after.data()["openCaptcha"], true);

    // Another client is unaffected.
    let _other = TestRequest::post("/login")
        .header("x-forwarded-for", "198.51.100.1")
        .json(&json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD }))
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
}

#[test_log::test(tokio::test)]
async fn rotating_forwarded_for_does_not_reset_the_guard_when_untrusted() {
    let mut settings = test_settings(false);
    settings.server.trust_forwarded_for = false;
    let app = TestApp::with_settings(settings).await;

    for n in 0..3 {
        let _rejected = TestRequest::post("/login")
            .header("x-forwarded-for", &format!("192.0.2.{n}"))
            .json(&json!({ "username": ADMIN_USERNAME, "password": "wrong-one" }))
            .send(&app)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    let blocked = TestRequest::post("/login")
        .header("x-forwarded-for", "192.0.2.200")
        .json(&json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD }))
        .send(&app)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(blocked.msg(), "invalid captcha");
}

#[test_log::test(tokio::test)]
async fn missing_and_garbage_tokens_are_rejected() {
    let app = TestApp::new(false).await;

    let missing = TestRequest::get("/user/current")
        .send(&app)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(missing.msg(), "missing token");

    let garbage = TestRequest::get("/user/current")
        .token("not.a.jwt")
        .send(&app)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(garbage.msg(), "invalid or expired token");
}

#[test_log::test(tokio::test)]
async fn logout_revokes_the_token() {
    let app = TestApp::new(false).await;
    let token = admin_token(&app).await;

    let _me = TestRequest::get("/user/current")
        .token(&token)
        .send(&app)
        .await
        .assert_status(StatusCode::OK);

    let _out = TestRequest::post("/login/logout")
        .token(&token)
        .send(&app)
        .await
        .assert_status(StatusCode::OK);

    let _rejected = TestRequest::get("/user/current")
        .token(&token)
        .send(&app)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    assert!(app.services.revocation.is_revoked(&token));
}

#[test_log::test(tokio::test)]
async fn tokens_expire_with_the_clock() {
    let app = TestApp::new(false).await;
    let token = admin_token(&app).await;

    app.clock.advance(Duration::minutes(59));
    let _still_valid = TestRequest::get("/user/current")
        .token(&token)
        .send(&app)
        .await
        .assert_status(StatusCode::OK);

    app.clock.advance(Duration::minutes(2));
    let _expired = TestRequest::get("/user/current")
        .token(&token)
        .send(&app)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[test_log::test(tokio::test)]
async fn register_then_login() {
    let app = TestApp::new(false).await;

    let registered = TestRequest::post("/register")
        .json(&json!({
            "username": "newcomer",
            "password": "hunter22",
            "nickName": "Newcomer",
        }))
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(registered.data()["authorityId"], "888");

    let duplicate = TestRequest::post("/register")
        .json(&json!({
            "username": "newcomer",
            "password": "hunter22",
            "nickName": "Someone else",
        }))
        .send(&app)
        .await
        .assert_status(StatusCode::CONFLICT);
    assert_eq!(duplicate.body["data"], serde_json::Value::Null);

    let _short = TestRequest::post("/register")
        .json(&json!({ "username": "tiny", "password": "123", "nickName": "Tiny" }))
        .send(&app)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let token = login_as(&app, "newcomer", "hunter22").await;
    assert!(!token.is_empty());
}

#[test_log::test(tokio::test)]
async fn malformed_body_is_a_bad_request() {
    let app = TestApp::new(false).await;
    let _bad = TestRequest::post("/login")
        .json(&json!({ "user": 1 }))
        .send(&app)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
