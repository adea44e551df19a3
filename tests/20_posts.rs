mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn anonymous_users_cannot_create() -> Result<()> {
    let app = TestApp::new();
    let (status, body) = app.post("/posts/", None, json!({ "title": "hello" })).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    Ok(())
}

#[tokio::test]
async fn create_projects_the_requester_view() -> Result<()> {
    let app = TestApp::new();
    let ann = app.register("ann").await?;

    let (status, body) = app
        .post("/posts", ann.token(), json!({ "title": "first", "content": "" }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let post = &body["data"];
    assert_eq!(post["owner"], "ann");
    assert_eq!(post["is_owner"], true);
    assert_eq!(post["profile_id"], ann.profile_id);
    assert_eq!(post["image_filter"], "normal");
    assert_eq!(post["image"], app.state.settings.media.default_post_image.as_str());
    assert_eq!(post["like_id"], serde_json::Value::Null);
    assert_eq!(post["created_at"], "now");

    let (_, body) = app.get(&format!("/posts/{}/", post["id"]), None).await?;
    assert_eq!(body["data"]["is_owner"], false);
    Ok(())
}

#[tokio::test]
async fn create_validates_fields() -> Result<()> {
    let app = TestApp::new();
    let ann = app.register("ann").await?;

    let (status, body) = app
        .post("/posts/", ann.token(), json!({ "content": "no title", "image_filter": "sepia" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["field_errors"]["title"], "This field is required.");
    assert!(body["field_errors"]["image_filter"].is_string());

    let (status, body) = app.post("/posts/", ann.token(), json!({ "title": "x".repeat(256) })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field_errors"]["title"], "Ensure this field has no more than 255 characters.");
    Ok(())
}

#[tokio::test]
async fn like_scenario_is_relative_to_each_requester() -> Result<()> {
    let app = TestApp::new();
    let a = app.register("a").await?;
    let b = app.register("b").await?;
    let p1 = app.create_post(&a, "p1").await?;

    let (status, body) = app.post("/likes/", b.token(), json!({ "post": p1 })).await?;
    assert_eq!(status, StatusCode::CREATED);
    let like_id = body["data"]["id"].as_i64().unwrap();

    let (_, body) = app.get(&format!("/posts/{}/", p1), b.token()).await?;
    assert_eq!(body["data"]["likes_count"], 1);
    assert_eq!(body["data"]["like_id"], like_id);

    let (_, body) = app.get(&format!("/posts/{}/", p1), a.token()).await?;
    assert_eq!(body["data"]["likes_count"], 1);
    assert_eq!(body["data"]["like_id"], serde_json::Value::Null);
    Ok(())
}

#[tokio::test]
async fn non_owner_writes_are_forbidden_and_change_nothing() -> Result<()> {
    let app = TestApp::new();
    let ann = app.register("ann").await?;
    let bob = app.register("bob").await?;
    let post = app.create_post(&ann, "original").await?;
    let uri = format!("/posts/{}/", post);

    let (status, body) = app.patch(&uri, bob.token(), json!({ "title": "hijacked" })).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, _) = app.delete(&uri, bob.token()).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.patch(&uri, None, json!({ "title": "anonymous" })).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.get(&uri, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "original");
    Ok(())
}

#[tokio::test]
async fn owner_updates_are_partial() -> Result<()> {
    let app = TestApp::new();
    let ann = app.register("ann").await?;
    let (_, body) = app
        .post("/posts/", ann.token(), json!({ "title": "draft", "content": "body text" }))
        .await?;
    let uri = format!("/posts/{}/", body["data"]["id"]);

    let (status, body) = app.patch(&uri, ann.token(), json!({ "title": "final" })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "final");
    assert_eq!(body["data"]["content"], "body text");

    let (status, body) = app
        .request(axum::http::Method::PUT, &uri, ann.token(), Some(json!({ "image_filter": "lofi" })))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "final");
    assert_eq!(body["data"]["image_filter"], "lofi");
    Ok(())
}

#[tokio::test]
async fn deleting_a_post_removes_its_comments_and_likes() -> Result<()> {
    let app = TestApp::new();
    let ann = app.register("ann").await?;
    let bob = app.register("bob").await?;
    let cid = app.register("cid").await?;
    let post = app.create_post(&ann, "doomed").await?;
    let keep = app.create_post(&ann, "kept").await?;

    for (session, text) in [(&bob, "one"), (&cid, "two"), (&bob, "three")] {
        let (status, _) = app
            .post("/comments/", session.token(), json!({ "post": post, "content": text }))
            .await?;
        assert_eq!(status, StatusCode::CREATED);
    }
    app.post("/comments/", bob.token(), json!({ "post": keep, "content": "stays" })).await?;
    for session in [&bob, &cid] {
        let (status, _) = app.post("/likes/", session.token(), json!({ "post": post })).await?;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = app.get(&format!("/posts/{}/", post), None).await?;
    assert_eq!((body["data"]["comments_count"].as_i64(), body["data"]["likes_count"].as_i64()), (Some(3), Some(2)));

    let (status, body) = app.delete(&format!("/posts/{}/", post), ann.token()).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (_, body) = app.get(&format!("/comments/?post={}", post), None).await?;
    assert_eq!(body["data"]["count"], 0);
    let (_, body) = app.get(&format!("/likes/?post={}", post), None).await?;
    assert_eq!(body["data"]["count"], 0);
    let (_, body) = app.get("/comments/", None).await?;
    assert_eq!(body["data"]["count"], 1);

    let (status, _) = app.get(&format!("/posts/{}/", post), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn list_is_newest_first_and_paginated() -> Result<()> {
    let app = TestApp::with_config(|c| c.api.page_size = 2);
    let ann = app.register("ann").await?;
    for title in ["one", "two", "three", "four", "five"] {
        app.create_post(&ann, title).await?;
    }

    let (status, body) = app.get("/posts/", None).await?;
    assert_eq!(status, StatusCode::OK);
    let page = &body["data"];
    assert_eq!(page["count"], 5);
    assert_eq!(page["next"], 2);
    assert_eq!(page["previous"], serde_json::Value::Null);
    assert_eq!(page["results"][0]["title"], "five");
    assert_eq!(page["results"][1]["title"], "four");

    let (_, body) = app.get("/posts/?page=3", None).await?;
    assert_eq!(body["data"]["results"][0]["title"], "one");
    assert_eq!(body["data"]["next"], serde_json::Value::Null);
    assert_eq!(body["data"]["previous"], 2);

    let (status, body) = app.get("/posts/?page=4", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Invalid page.");

    let (_, body) = app.get("/posts/?ordering=created_at", None).await?;
    assert_eq!(body["data"]["results"][0]["title"], "one");

    // Unknown ordering keys fall back to the default
    let (_, body) = app.get("/posts/?ordering=-likes_count", None).await?;
    assert_eq!(body["data"]["results"][0]["title"], "five");
    Ok(())
}

#[tokio::test]
async fn list_filters() -> Result<()> {
    let app = TestApp::new();
    let ann = app.register("ann").await?;
    let bob = app.register("bob").await?;
    let cid = app.register("cid").await?;

    let ann_post = app.create_post(&ann, "Sunset at the beach").await?;
    let bob_post = app.create_post(&bob, "Mountain trail").await?;
    app.create_post(&cid, "Coffee").await?;

    // cid follows ann and likes bob's post
    app.post("/followers/", cid.token(), json!({ "followed": ann.user_id })).await?;
    app.post("/likes/", cid.token(), json!({ "post": bob_post })).await?;

    let ids = |body: &serde_json::Value| -> Vec<i64> {
        body["data"]["results"]
            .as_array()
            .map(|r| r.iter().filter_map(|p| p["id"].as_i64()).collect())
            .unwrap_or_default()
    };

    let (_, body) = app.get(&format!("/posts/?owner__profile={}", bob.profile_id), None).await?;
    assert_eq!(ids(&body), vec![bob_post]);

    let (_, body) = app.get(&format!("/posts/?feed={}", cid.profile_id), None).await?;
    assert_eq!(ids(&body), vec![ann_post]);

    let (_, body) = app.get(&format!("/posts/?liked_by={}", cid.profile_id), None).await?;
    assert_eq!(ids(&body), vec![bob_post]);

    let (_, body) = app.get("/posts/?search=SUNSET", None).await?;
    assert_eq!(ids(&body), vec![ann_post]);

    // Search also matches the author's username
    let (_, body) = app.get("/posts/?search=bo", None).await?;
    assert_eq!(ids(&body), vec![bob_post]);

    let (_, body) = app.get("/posts/?owner__profile=9999", None).await?;
    assert_eq!(body["data"]["count"], 0);
    Ok(())
}

#[tokio::test]
async fn search_treats_wildcards_literally() -> Result<()> {
    let app = TestApp::new();
    let ann = app.register("ann").await?;
    app.create_post(&ann, "plain title").await?;
    let sale = app.create_post(&ann, "50% off").await?;

    let (status, body) = app.get("/posts/?search=%25", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["results"][0]["id"], sale);

    let (_, body) = app.get("/posts/?search=50%25", None).await?;
    assert_eq!(body["data"]["count"], 1);

    let (_, body) = app.get("/posts/?search=_", None).await?;
    assert_eq!(body["data"]["count"], 0);
    Ok(())
}

#[tokio::test]
async fn comments_belong_to_an_existing_post() -> Result<()> {
    let app = TestApp::new();
    let ann = app.register("ann").await?;
    let post = app.create_post(&ann, "p").await?;

    let (status, body) = app.post("/comments/", ann.token(), json!({ "post": 999, "content": "hi" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field_errors"]["post"], "Invalid pk \"999\" - object does not exist.");

    let (status, body) = app.post("/comments/", ann.token(), json!({ "post": post, "content": "  " })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field_errors"]["content"], "This field may not be blank.");

    let (_, body) = app.post("/comments/", ann.token(), json!({ "post": post, "content": "hi" })).await?;
    let comment = &body["data"];
    assert_eq!(comment["post"], post);
    assert_eq!(comment["profile_id"], ann.profile_id);

    // The post of a comment is fixed
    let other = app.create_post(&ann, "other").await?;
    let (status, body) = app
        .patch(&format!("/comments/{}/", comment["id"]), ann.token(), json!({ "post": other, "content": "edited" }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["post"], post);
    assert_eq!(body["data"]["content"], "edited");
    Ok(())
}
