use salvo::http::StatusCode;
use serde_json::{Value, json};

use crate::helpers::*;

/// Id of the first menu whose path is `path`, searching the whole tree.
fn find_menu_id(nodes: &Value, path: &str) -> Option<i64> {
    nodes.as_array()?.iter().find_map(|node| {
        if node["path"] == path {
            node["id"].as_i64()
        } else {
            find_menu_id(&node["children"], path)
        }
    })
}

async fn menu_id(app: &TestApp, token: &str, path: &str) -> i64 {
    let tree = TestRequest::get("/menu")
        .token(token)
        .send(app)
        .await
        .assert_status(StatusCode::OK);
    find_menu_id(tree.data(), path).expect("seeded menu exists")
}

#[test_log::test(tokio::test)]
async fn role_crud_round() {
    let app = TestApp::new(true).await;
    let token = admin_token(&app).await;

    create_role(&app, &token, "100").await;

    let duplicate = TestRequest::post("/authority/create")
        .token(&token)
        .json(&json!({ "authorityId": "100", "authorityName": "again" }))
        .send(&app)
        .await
        .assert_status(StatusCode::CONFLICT);
    assert!(!duplicate.msg().is_empty());

    let updated = TestRequest::put("/authority/update")
        .token(&token)
        .json(&json!({ "authorityId": "100", "authorityName": "Operators" }))
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(updated.data()["authorityName"], "Operators");
    assert_eq!(updated.data()["defaultRouter"], "dashboard");

    let listed = TestRequest::get("/authority/list")
        .token(&token)
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
    let ids: Vec<&str> = listed
        .data()
        .as_array()
        .map(|roles| roles.iter().filter_map(|r| r["authorityId"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(ids, ["100", "888"]);

    let _deleted = TestRequest::delete("/authority/delete")
        .token(&token)
        .json(&json!({ "authorityId": "100" }))
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
    let _gone = TestRequest::delete("/authority/delete")
        .token(&token)
        .json(&json!({ "authorityId": "100" }))
        .send(&app)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn strict_mode_follows_menu_grants() {
    let app = TestApp::new(true).await;
    let admin = admin_token(&app).await;

    create_role(&app, &admin, "100").await;
    create_user(&app, &admin, "operator", "operator-pass", "100").await;
    let operator = login_as(&app, "operator", "operator-pass").await;

    let denied = TestRequest::get("/customer")
        .token(&operator)
        .send(&app)
        .await
        .assert_status(StatusCode::FORBIDDEN);
    assert_eq!(denied.msg(), "no permission to access this resource");

    let customer_menu = menu_id(&app, &admin, "customer").await;
    let _granted = TestRequest::post("/authority/setMenus")
        .token(&admin)
        .json(&json!({ "authorityId": "100", "menuIds": [customer_menu, 999_999] }))
        .send(&app)
        .await
        .assert_status(StatusCode::OK);

    let _allowed = TestRequest::get("/customer")
        .token(&operator)
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
    let _nested = TestRequest::get("/customer/12345")
        .token(&operator)
        .send(&app)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    let _still_denied = TestRequest::get("/user")
        .token(&operator)
        .send(&app)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    // Self-service routes only need a valid token.
    let menus = TestRequest::get("/authority/getMenus")
        .token(&operator)
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(find_menu_id(menus.data(), "customer"), Some(customer_menu));
    assert_eq!(menus.data().as_array().map(Vec::len), Some(1));
}

#[test_log::test(tokio::test)]
async fn lenient_mode_only_authenticates() {
    let app = TestApp::new(false).await;
    let admin = admin_token(&app).await;

    create_role(&app, &admin, "100").await;
    create_user(&app, &admin, "operator", "operator-pass", "100").await;
    let operator = login_as(&app, "operator", "operator-pass").await;

    let _allowed = TestRequest::get("/customer")
        .token(&operator)
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
}

#[test_log::test(tokio::test)]
async fn disabled_role_sees_no_menus_but_admin_view_does() {
    let app = TestApp::new(true).await;
    let admin = admin_token(&app).await;

    create_role(&app, &admin, "100").await;
    let customer_menu = menu_id(&app, &admin, "customer").await;
    let _granted = TestRequest::post("/authority/setMenus")
        .token(&admin)
        .json(&json!({ "authorityId": "100", "menuIds": [customer_menu] }))
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
    create_user(&app, &admin, "operator", "operator-pass", "100").await;
    let operator = login_as(&app, "operator", "operator-pass").await;

    let _disabled = TestRequest::put("/authority/update")
        .token(&admin)
        .json(&json!({ "authorityId": "100", "authorityName": "Operators", "enable": false }))
        .send(&app)
        .await
        .assert_status(StatusCode::OK);

    let own = TestRequest::get("/authority/getMenus")
        .token(&operator)
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(own.data(), &json!([]));

    let _forbidden = TestRequest::get("/customer")
        .token(&operator)
        .send(&app)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let admin_view = TestRequest::get("/authority/getMenusByRole?authorityId=100")
        .token(&admin)
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(find_menu_id(admin_view.data(), "customer"), Some(customer_menu));

    let _unknown = TestRequest::get("/authority/getMenusByRole?authorityId=404")
        .token(&admin)
        .send(&app)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn strict_mode_denies_every_admin_group_without_grants() {
    let app = TestApp::new(true).await;
    let admin = admin_token(&app).await;

    create_role(&app, &admin, "100").await;
    create_user(&app, &admin, "operator", "operator-pass", "100").await;
    let operator = login_as(&app, "operator", "operator-pass").await;

    for path in ["/authority/list", "/menu", "/user", "/customer"] {
        let denied = TestRequest::get(path)
            .token(&operator)
            .send(&app)
            .await
            .assert_status(StatusCode::FORBIDDEN);
        assert_eq!(denied.msg(), "no permission to access this resource");

        let _allowed = TestRequest::get(path)
            .token(&admin)
            .send(&app)
            .await
            .assert_status(StatusCode::OK);
    }

    let _deleted = TestRequest::delete("/authority/delete")
        .token(&operator)
        .json(&json!({ "authorityId": "100" }))
        .send(&app)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[test_log::test(tokio::test)]
async fn role_with_users_cannot_be_deleted() {
    let app = TestApp::new(false).await;
    let admin = admin_token(&app).await;

    create_role(&app, &admin, "100").await;
    let user_id = create_user(&app, &admin, "operator", "operator-pass", "100").await;

    let in_use = TestRequest::delete("/authority/delete")
        .token(&admin)
        .json(&json!({ "authorityId": "100" }))
        .send(&app)
        .await
        .assert_status(StatusCode::CONFLICT);
    assert_eq!(in_use.msg(), "role is assigned to users");

    let _user_deleted = TestRequest::delete(&format!("/user/{user_id}"))
        .token(&admin)
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
    let _role_deleted = TestRequest::delete("/authority/delete")
        .token(&admin)
        .json(&json!({ "authorityId": "100" }))
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
}
