mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::{bmp, image_payload, TestApp};

#[tokio::test]
async fn oversized_image_is_rejected() -> Result<()> {
    let app = TestApp::new();
    let ann = app.register("ann").await?;

    let three_mib = vec![0u8; 3 * 1024 * 1024];
    let (status, body) = app
        .post("/posts/", ann.token(), json!({ "title": "big", "image": image_payload(&three_mib) }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["field_errors"]["image"], "Image size larger than 2MB!");

    let (_, body) = app.get("/posts/", None).await?;
    assert_eq!(body["data"]["count"], 0);
    Ok(())
}

#[tokio::test]
async fn one_mebibyte_image_is_stored() -> Result<()> {
    let app = TestApp::new();
    let ann = app.register("ann").await?;

    let image = bmp(600, 600);
    assert!(image.len() > 1024 * 1024);
    let (status, body) = app
        .post("/posts/", ann.token(), json!({ "title": "pic", "image": image_payload(&image) }))
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);

    let location = body["data"]["image"].as_str().unwrap_or_default();
    let media_url = app.state.settings.media.url.trim_end_matches('/').to_string();
    let file_name = location.strip_prefix(&format!("{}/", media_url)).expect("stored under MEDIA_URL");
    assert!(file_name.ends_with(".bmp"));
    let stored = std::fs::read(app.media_root.join(file_name))?;
    assert_eq!(stored.len(), image.len());
    Ok(())
}

#[tokio::test]
async fn image_dimensions_are_bounded() -> Result<()> {
    let app = TestApp::new();
    let ann = app.register("ann").await?;

    let (status, body) = app
        .patch(
            &format!("/profiles/{}/", ann.profile_id),
            ann.token(),
            json!({ "image": image_payload(&bmp(4097, 1)) }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field_errors"]["image"], "Image width larger than 4096px!");

    let (status, body) = app
        .post("/posts/", ann.token(), json!({ "title": "junk", "image": { "data": "bm90IGFuIGltYWdl" } }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["image"].is_string());
    Ok(())
}
