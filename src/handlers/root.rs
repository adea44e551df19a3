// GET / and GET /health

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - Service description
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Social API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Posts, comments, likes, follows, profiles and a product catalog",
            "endpoints": {
                "auth": "/auth/registration/, /auth/login/ (public), /auth/user/ (token)",
                "posts": "/posts/[:id/]",
                "comments": "/comments/[:id/]",
                "likes": "/likes/[:id/]",
                "followers": "/followers/[:id/]",
                "profiles": "/profiles/[:id/]",
                "products": "/products/[:id/]",
                "categories": "/categories/[:id/] (staff only)",
                "health": "/health",
            }
        }
    }))
}

/// GET /health - Liveness including a database round trip
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.db.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "code": "SERVICE_UNAVAILABLE",
                    "detail": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
