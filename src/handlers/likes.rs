// /likes/ and /likes/{id}/

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Extension, Json, Path, Query, State};
use serde::Deserialize;
use serde_json::json;

use crate::api::projection::{LikeView, Projector};
use crate::api::{Page, PageRequest};
use crate::database::models::{Like, NewLike};
use crate::database::schema::{LIKES_OWNER_POST_KEY, LIKES_POST_FKEY};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Requester};
use crate::permissions::check_owner;
use crate::state::AppState;

use super::utils::{any_of, fetch_page, invalid_pk, profile_owner, Validator};

#[derive(Debug, Default, Deserialize)]
pub struct LikeListQuery {
    pub page: Option<u32>,
    pub post: Option<i64>,
    #[serde(rename = "owner__profile")]
    pub owner_profile: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateLike {
    pub post: Option<i64>,
}

/// GET /likes/
pub async fn list(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    query: Result<Query<LikeListQuery>, QueryRejection>,
) -> ApiResult<Page<LikeView>> {
    let Query(query) = query?;
    let page = PageRequest::new(query.page, state.settings.api.page_size)?;

    let mut conditions = Vec::new();
    if let Some(post) = query.post {
        conditions.push(json!({ "post_id": post }));
    }
    if let Some(profile_id) = query.owner_profile {
        conditions.push(any_of("owner_id", profile_owner(&state.db, profile_id).await?));
    }
    let (count, likes) = fetch_page::<Like>(&state.db, conditions, None, page).await?;

    let ctx = Projector::new(&state.db, &requester);
    let mut results = Vec::with_capacity(likes.len());
    for like in &likes {
        results.push(LikeView::project(like, &ctx).await?);
    }
    Ok(ApiResponse::success(Page::new(page, count, results)?))
}

/// POST /likes/
pub async fn create(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    payload: Result<Json<CreateLike>, JsonRejection>,
) -> ApiResult<LikeView> {
    let user = requester.require()?;
    let Json(payload) = payload?;

    let mut v = Validator::new();
    let post = v.require("post", payload.post);
    v.finish()?;
    let Some(post_id) = post else {
        return Err(ApiError::bad_request("Invalid input."));
    };

    let like: Like = state
        .db
        .repo::<Like>()
        .insert(&NewLike {
            owner_id: user.user_id,
            post_id,
        })
        .await
        .map_err(|e| match e {
            e if e.is_constraint(LIKES_OWNER_POST_KEY) => ApiError::possible_duplicate("You have already liked this post."),
            e if e.is_constraint(LIKES_POST_FKEY) => invalid_pk("post", post_id),
            e => e.into(),
        })?;

    tracing::debug!("User {} liked post {}", user.user_id, post_id);
    let ctx = Projector::new(&state.db, &requester);
    Ok(ApiResponse::created(LikeView::project(&like, &ctx).await?))
}

/// GET /likes/{id}/
pub async fn retrieve(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<LikeView> {
    let Path(id) = id?;
    let like = state.db.repo::<Like>().select_404(id).await?;
    let ctx = Projector::new(&state.db, &requester);
    Ok(ApiResponse::success(LikeView::project(&like, &ctx).await?))
}

/// DELETE /likes/{id}/
pub async fn destroy(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = id?;
    let repo = state.db.repo::<Like>();
    let like = repo.select_404(id).await?;
    check_owner(&requester, &like)?;

    repo.delete(id).await?;
    Ok(ApiResponse::no_content())
}
