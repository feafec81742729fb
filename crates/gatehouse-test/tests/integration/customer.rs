use salvo::http::StatusCode;
use serde_json::json;

use crate::helpers::*;

async fn create_customer(app: &TestApp, token: &str, name: &str, phone: &str) -> i64 {
    let created = TestRequest::post("/customer")
        .token(token)
        .json(&json!({ "customerName": name, "customerPhone": phone }))
        .send(app)
        .await
        .assert_status(StatusCode::OK);
    created.data()["id"].as_i64().unwrap_or_default()
}

#[test_log::test(tokio::test)]
async fn customers_are_searchable_by_name_or_phone() {
    let app = TestApp::new(false).await;
    let token = admin_token(&app).await;

    create_customer(&app, &token, "Acme Ltd", "555-0100").await;
    create_customer(&app, &token, "Globex", "555-0199").await;
    create_customer(&app, &token, "Initech", "444-0000").await;

    let by_phone = TestRequest::get("/customer?keyword=555")
        .token(&token)
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(by_phone.data()["total"], 2);

    let by_name = TestRequest::get("/customer?keyword=Init&page=1&pageSize=10")
        .token(&token)
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(by_name.data()["total"], 1);
    assert_eq!(by_name.data()["list"][0]["customerName"], "Initech");

    let everyone = TestRequest::get("/customer")
        .token(&token)
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(everyone.data()["total"], 3);
    assert_eq!(everyone.data()["pageSize"], 10);
}

#[test_log::test(tokio::test)]
async fn customer_update_only_changes_given_fields() {
    let app = TestApp::new(false).await;
    let token = admin_token(&app).await;
    let id = create_customer(&app, &token, "Acme Ltd", "555-0100").await;

    let updated = TestRequest::put(&format!("/customer/{id}"))
        .token(&token)
        .json(&json!({ "customerPhone": "555-0111" }))
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(updated.data()["customerName"], "Acme Ltd");
    assert_eq!(updated.data()["customerPhone"], "555-0111");

    let _deleted = TestRequest::delete(&format!("/customer/{id}"))
        .token(&token)
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
    let _missing = TestRequest::get(&format!("/customer/{id}"))
        .token(&token)
        .send(&app)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn customer_name_is_required() {
    let app = TestApp::new(false).await;
    let token = admin_token(&app).await;

    let _invalid = TestRequest::post("/customer")
        .token(&token)
        .json(&json!({ "customerPhone": "555" }))
        .send(&app)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
