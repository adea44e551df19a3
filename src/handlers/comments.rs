// /comments/ and /comments/{id}/

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Extension, Json, Path, Query, State};
use serde::Deserialize;
use serde_json::json;

use crate::api::projection::{CommentView, Projector};
use crate::api::{Page, PageRequest};
use crate::database::models::{Comment, CommentChanges, NewComment};
use crate::database::schema::COMMENTS_POST_FKEY;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Requester};
use crate::permissions::check_owner;
use crate::state::AppState;

use super::utils::{fetch_page, invalid_pk, Validator};

#[derive(Debug, Default, Deserialize)]
pub struct CommentListQuery {
    pub page: Option<u32>,
    pub post: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateComment {
    pub post: Option<i64>,
    pub content: Option<String>,
}

/// `post` is fixed once the comment exists
#[derive(Debug, Deserialize)]
pub struct UpdateComment {
    pub content: Option<String>,
}

/// GET /comments/
pub async fn list(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    query: Result<Query<CommentListQuery>, QueryRejection>,
) -> ApiResult<Page<CommentView>> {
    let Query(query) = query?;
    let page = PageRequest::new(query.page, state.settings.api.page_size)?;

    let mut conditions = Vec::new();
    if let Some(post) = query.post {
        conditions.push(json!({ "post_id": post }));
    }
    let (count, comments) = fetch_page::<Comment>(&state.db, conditions, None, page).await?;

    let ctx = Projector::new(&state.db, &requester);
    let mut results = Vec::with_capacity(comments.len());
    for comment in &comments {
        results.push(CommentView::project(comment, &ctx).await?);
    }
    Ok(ApiResponse::success(Page::new(page, count, results)?))
}

/// POST /comments/
pub async fn create(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    payload: Result<Json<CreateComment>, JsonRejection>,
) -> ApiResult<CommentView> {
    let user = requester.require()?;
    let Json(payload) = payload?;

    let mut v = Validator::new();
    let post = v.require("post", payload.post);
    let content = v.require("content", payload.content);
    if let Some(content) = &content {
        v.text("content", content, false, None);
    }
    v.finish()?;

    let (Some(post_id), Some(content)) = (post, content) else {
        return Err(ApiError::bad_request("Invalid input."));
    };

    let comment: Comment = state
        .db
        .repo::<Comment>()
        .insert(&NewComment {
            owner_id: user.user_id,
            post_id,
            content,
        })
        .await
        .map_err(|e| match e {
            e if e.is_constraint(COMMENTS_POST_FKEY) => invalid_pk("post", post_id),
            e => e.into(),
        })?;

    let ctx = Projector::new(&state.db, &requester);
    Ok(ApiResponse::created(CommentView::project(&comment, &ctx).await?))
}

/// GET /comments/{id}/
pub async fn retrieve(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<CommentView> {
    let Path(id) = id?;
    let comment = state.db.repo::<Comment>().select_404(id).await?;
    let ctx = Projector::new(&state.db, &requester);
    Ok(ApiResponse::success(CommentView::project(&comment, &ctx).await?))
}

/// PUT|PATCH /comments/{id}/
pub async fn update(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateComment>, JsonRejection>,
) -> ApiResult<CommentView> {
    let Path(id) = id?;
    let repo = state.db.repo::<Comment>();
    let comment = repo.select_404(id).await?;
    check_owner(&requester, &comment)?;

    let Json(payload) = payload?;
    let mut v = Validator::new();
    if let Some(content) = &payload.content {
        v.text("content", content, false, None);
    }
    v.finish()?;

    let comment = repo.update(id, &CommentChanges { content: payload.content }).await?;
    let ctx = Projector::new(&state.db, &requester);
    Ok(ApiResponse::success(CommentView::project(&comment, &ctx).await?))
}

/// DELETE /comments/{id}/
pub async fn destroy(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = id?;
    let repo = state.db.repo::<Comment>();
    let comment = repo.select_404(id).await?;
    check_owner(&requester, &comment)?;

    repo.delete(id).await?;
    Ok(ApiResponse::no_content())
}
