use salvo::http::StatusCode;
use serde_json::json;

use crate::helpers::*;

#[test_log::test(tokio::test)]
async fn menu_tree_is_sorted_and_nested() {
    let app = TestApp::new(false).await;
    let token = admin_token(&app).await;

    let tree = TestRequest::get("/menu")
        .token(&token)
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
    let roots: Vec<&str> = tree
        .data()
        .as_array()
        .map(|nodes| nodes.iter().filter_map(|n| n["path"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(roots, ["dashboard", "admin", "customer"]);
    assert_eq!(tree.data()[1]["children"].as_array().map(Vec::len), Some(3));
    assert_eq!(tree.data()[0]["meta"]["defaultMenu"], true);
}

#[test_log::test(tokio::test)]
async fn menu_lifecycle_and_delete_guards() {
    let app = TestApp::new(false).await;
    let token = admin_token(&app).await;

    let parent = create_menu(&app, &token, "0", "reports").await;
    let child = create_menu(&app, &token, &parent.to_string(), "monthly").await;

    let fetched = TestRequest::get(&format!("/menu/{child}"))
        .token(&token)
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(fetched.data()["parentId"], parent.to_string());

    let _has_children = TestRequest::delete(&format!("/menu/{parent}"))
        .token(&token)
        .send(&app)
        .await
        .assert_status(StatusCode::CONFLICT);

    let updated = TestRequest::put(&format!("/menu/{child}"))
        .token(&token)
        .json(&json!({
            "parentId": parent.to_string(),
            "path": "monthly-report",
            "name": "monthlyReport",
            "sort": 4,
            "meta": { "title": "Monthly" },
        }))
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(updated.data()["path"], "monthly-report");
    assert_eq!(updated.data()["meta"]["title"], "Monthly");

    create_role(&app, &token, "100").await;
    let _granted = TestRequest::post("/authority/setMenus")
        .token(&token)
        .json(&json!({ "authorityId": "100", "menuIds": [child] }))
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
    let _still_granted = TestRequest::delete(&format!("/menu/{child}"))
        .token(&token)
        .send(&app)
        .await
        .assert_status(StatusCode::CONFLICT);

    let _revoked = TestRequest::post("/authority/setMenus")
        .token(&token)
        .json(&json!({ "authorityId": "100", "menuIds": [] }))
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
    let _child_gone = TestRequest::delete(&format!("/menu/{child}"))
        .token(&token)
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
    let _parent_gone = TestRequest::delete(&format!("/menu/{parent}"))
        .token(&token)
        .send(&app)
        .await
        .assert_status(StatusCode::OK);
    let _missing = TestRequest::get(&format!("/menu/{parent}"))
        .token(&token)
        .send(&app)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn menu_requires_path_and_name() {
    let app = TestApp::new(false).await;
    let token = admin_token(&app).await;

    let _invalid = TestRequest::post("/menu")
        .token(&token)
        .json(&json!({ "parentId": "0", "path": "", "name": "" }))
        .send(&app)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
