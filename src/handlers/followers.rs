// /followers/ and /followers/{id}/

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Extension, Json, Path, Query, State};
use serde::Deserialize;
use serde_json::json;

use crate::api::projection::{FollowerView, Projector};
use crate::api::{Page, PageRequest};
use crate::database::models::{Follower, NewFollower};
use crate::database::schema::{FOLLOWERS_FOLLOWED_FKEY, FOLLOWERS_OWNER_FOLLOWED_KEY};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Requester};
use crate::permissions::check_owner;
use crate::state::AppState;

use super::utils::{any_of, fetch_page, invalid_pk, profile_owner, Validator};

#[derive(Debug, Default, Deserialize)]
pub struct FollowerListQuery {
    pub page: Option<u32>,
    #[serde(rename = "owner__profile")]
    pub owner_profile: Option<i64>,
    /// User id of the followed identity
    pub followed: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFollower {
    pub followed: Option<i64>,
}

/// GET /followers/
pub async fn list(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    query: Result<Query<FollowerListQuery>, QueryRejection>,
) -> ApiResult<Page<FollowerView>> {
    let Query(query) = query?;
    let page = PageRequest::new(query.page, state.settings.api.page_size)?;

    let mut conditions = Vec::new();
    if let Some(profile_id) = query.owner_profile {
        conditions.push(any_of("owner_id", profile_owner(&state.db, profile_id).await?));
    }
    if let Some(followed) = query.followed {
        conditions.push(json!({ "followed_id": followed }));
    }
    let (count, edges) = fetch_page::<Follower>(&state.db, conditions, None, page).await?;

    let ctx = Projector::new(&state.db, &requester);
    let mut results = Vec::with_capacity(edges.len());
    for edge in &edges {
        results.push(FollowerView::project(edge, &ctx).await?);
    }
    Ok(ApiResponse::success(Page::new(page, count, results)?))
}

/// POST /followers/
pub async fn create(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    payload: Result<Json<CreateFollower>, JsonRejection>,
) -> ApiResult<FollowerView> {
    let user = requester.require()?;
    let Json(payload) = payload?;

    let mut v = Validator::new();
    let followed = v.require("followed", payload.followed);
    if followed == Some(user.user_id) && !state.settings.api.allow_self_follow {
        v.add("followed", "You cannot follow yourself.");
    }
    v.finish()?;
    let Some(followed_id) = followed else {
        return Err(ApiError::bad_request("Invalid input."));
    };

    let edge: Follower = state
        .db
        .repo::<Follower>()
        .insert(&NewFollower {
            owner_id: user.user_id,
            followed_id,
        })
        .await
        .map_err(|e| match e {
            e if e.is_constraint(FOLLOWERS_OWNER_FOLLOWED_KEY) => {
                ApiError::possible_duplicate("You are already following this user.")
            }
            e if e.is_constraint(FOLLOWERS_FOLLOWED_FKEY) => invalid_pk("followed", followed_id),
            e => e.into(),
        })?;

    tracing::debug!("User {} followed user {}", user.user_id, followed_id);
    let ctx = Projector::new(&state.db, &requester);
    Ok(ApiResponse::created(FollowerView::project(&edge, &ctx).await?))
}

/// GET /followers/{id}/
pub async fn retrieve(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<FollowerView> {
    let Path(id) = id?;
    let edge = state.db.repo::<Follower>().select_404(id).await?;
    let ctx = Projector::new(&state.db, &requester);
    Ok(ApiResponse::success(FollowerView::project(&edge, &ctx).await?))
}

/// DELETE /followers/{id}/
pub async fn destroy(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = id?;
    let repo = state.db.repo::<Follower>();
    let edge = repo.select_404(id).await?;
    check_owner(&requester, &edge)?;

    repo.delete(id).await?;
    Ok(ApiResponse::no_content())
}
