mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::{TestApp, PASSWORD};

#[tokio::test]
async fn health_and_root_respond() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app.get("/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["database"], "ok");

    let (status, body) = app.get("/", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    Ok(())
}

#[tokio::test]
async fn registration_provisions_exactly_one_profile() -> Result<()> {
    let app = TestApp::new();
    let ann = app.register("ann").await?;

    let (status, body) = app.get("/profiles/?page=1", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 1);

    let (status, body) = app.get(&format!("/profiles/{}/", ann.profile_id), None).await?;
    assert_eq!(status, StatusCode::OK);
    let profile = &body["data"];
    assert_eq!(profile["owner"], "ann");
    assert_eq!(profile["name"], "");
    assert_eq!(profile["content"], "");
    assert_eq!(profile["image"], app.state.settings.media.default_profile_image.as_str());
    assert_eq!(profile["posts_count"], 0);
    Ok(())
}

#[tokio::test]
async fn profiles_cannot_be_created_or_deleted_directly() -> Result<()> {
    let app = TestApp::new();
    let ann = app.register("ann").await?;

    let (status, _) = app.post("/profiles/", ann.token(), json!({ "name": "second" })).await?;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let (status, _) = app.delete(&format!("/profiles/{}/", ann.profile_id), ann.token()).await?;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    Ok(())
}

#[tokio::test]
async fn registration_rejects_bad_input() -> Result<()> {
    let app = TestApp::new();
    app.register("ann").await?;

    let (status, body) = app
        .post(
            "/auth/registration/",
            None,
            json!({ "username": "ann", "password1": PASSWORD, "password2": PASSWORD }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field_errors"]["username"], "A user with that username already exists.");

    let (status, body) = app
        .post(
            "/auth/registration/",
            None,
            json!({ "username": "bob", "password1": PASSWORD, "password2": "something-else" }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["non_field_errors"].is_string());

    let (status, body) = app
        .post("/auth/registration/", None, json!({ "username": "bob", "password1": "12345678", "password2": "12345678" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["password1"].is_string());

    let (status, body) = app.post("/auth/registration/", None, json!({})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field_errors"]["username"], "This field is required.");
    assert_eq!(body["field_errors"]["password1"], "This field is required.");
    Ok(())
}

#[tokio::test]
async fn login_and_current_user() -> Result<()> {
    let app = TestApp::new();
    let ann = app.register("ann").await?;

    let (status, body) = app.get("/auth/user/", ann.token()).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "ann");
    assert_eq!(body["data"]["id"], ann.user_id);
    assert_eq!(body["data"]["profile_id"], ann.profile_id);

    let (status, body) = app
        .post("/auth/login/", None, json!({ "username": "ann", "password": "wrong-password" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field_errors"]["non_field_errors"], "Unable to log in with provided credentials.");

    let (status, body) = app.get("/auth/user/", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn invalid_token_is_rejected_even_on_public_reads() -> Result<()> {
    let app = TestApp::new();

    let (status, _) = app.get("/posts/", Some("not-a-jwt")).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/posts/", None).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}
