use salvo::http::StatusCode;
use serde_json::json;

use crate::helpers::*;

#[test_log::test(tokio::test)]
async fn users_are_paged_by_id() {
    let app = TestApp::new(false).await;
    let token = admin_token(&app).await;

    for i in 0..4 {
        create_user(&app, &token, &format!("user{i}"), "password1", "888").await;
    }

    let page = TestRequest::get("/user?page=2&pageSize=2")
        .token(&token)
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(page.data()["total"], 5);
    assert_eq!(page.data()["page"], 2);
    assert_eq!(page.data()["pageSize"], 2);
    let names: Vec<&str> = page.data()["list"]
        .as_array()
        .map(|users| users.iter().filter_map(|u| u["username"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(names, ["user1", "user2"]);

    let far = TestRequest::get("/user?page=9223372036854775807&pageSize=10")
        .token(&token)
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(far.data()["list"], json!([]));
    assert_eq!(far.data()["total"], 5);
}

#[test_log::test(tokio::test)]
async fn admin_updates_and_deletes_users() {
    let app = TestApp::new(false).await;
    let token = admin_token(&app).await;
    create_role(&app, &token, "100").await;
    let id = create_user(&app, &token, "carol", "password1", "888").await;

    let updated = TestRequest::put(&format!("/user/{id}"))
        .token(&token)
        .json(&json!({ "authorityId": "100", "enable": false }))
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(updated.data()["authorityId"], "100");
    assert_eq!(updated.data()["enable"], false);

    let disabled = TestRequest::post("/login")
        .json(&json!({ "username": "carol", "password": "password1" }))
        .send(&app)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(disabled.msg(), "account disabled");

    let _unknown_role = TestRequest::put(&format!("/user/{id}"))
        .token(&token)
        .json(&json!({ "authorityId": "404" }))
        .send(&app)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let _deleted = TestRequest::delete(&format!("/user/{id}"))
        .token(&token)
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
    let _again = TestRequest::delete(&format!("/user/{id}"))
        .token(&token)
        .send(&app)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn password_change_and_reset() {
    let app = TestApp::new(false).await;
    let admin = admin_token(&app).await;
    let id = create_user(&app, &admin, "dave", "first-pass", "888").await;
    let dave = login_as(&app, "dave", "first-pass").await;

    let wrong_old = TestRequest::post("/user/changePassword")
        .token(&dave)
        .json(&json!({ "password": "not-mine", "newPassword": "second-pass" }))
        .send(&app)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(wrong_old.msg(), "old password is incorrect");

    let _changed = TestRequest::post("/user/changePassword")
        .token(&dave)
        .json(&json!({ "password": "first-pass", "newPassword": "second-pass" }))
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
    let _relogin = login_as(&app, "dave", "second-pass").await;

    let _too_short = TestRequest::post(&format!("/user/{id}/resetPassword"))
        .token(&admin)
        .json(&json!({ "password": "123" }))
        .send(&app)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    let _reset = TestRequest::post(&format!("/user/{id}/resetPassword"))
        .token(&admin)
        .json(&json!({ "password": "third-pass" }))
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
    let _after_reset = login_as(&app, "dave", "third-pass").await;
}

#[test_log::test(tokio::test)]
async fn profile_updates_keep_nick_names_unique() {
    let app = TestApp::new(false).await;
    let admin = admin_token(&app).await;
    create_user(&app, &admin, "erin", "erin-pass", "888").await;
    let erin = login_as(&app, "erin", "erin-pass").await;

    let updated = TestRequest::put("/user/profile")
        .token(&erin)
        .json(&json!({ "nickName": "Erin E.", "headerImg": "https://img.example/erin.png" }))
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(updated.data()["nickName"], "Erin E.");

    let _taken = TestRequest::put("/user/profile")
        .token(&erin)
        .json(&json!({ "nickName": "Administrator" }))
        .send(&app)
        .await
        .assert_status(StatusCode::CONFLICT);

    let me = TestRequest::get("/user/current")
        .token(&erin)
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(me.data()["nickName"], "Erin E.");
    assert_eq!(me.data()["headerImg"], "https://img.example/erin.png");
}
