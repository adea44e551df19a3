// /posts/ and /posts/{id}/

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Extension, Json, Path, Query, State};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::projection::{PostView, Projector};
use crate::api::{Page, PageRequest};
use crate::database::models::{Follower, Like, NewPost, Post, PostChanges, User, DEFAULT_IMAGE_FILTER, IMAGE_FILTERS};
use crate::database::Database;
use crate::error::ApiError;
use crate::filter::FilterData;
use crate::media::ImageUpload;
use crate::middleware::{ApiResponse, ApiResult, Requester};
use crate::permissions::check_owner;
use crate::state::AppState;

use super::utils::{any_of, contains, fetch_page, ordering, profile_owner, store_image, Validator};

const TITLE_MAX_LENGTH: usize = 255;
const ORDERING_FIELDS: &[&str] = &["created_at", "updated_at"];

#[derive(Debug, Default, Deserialize)]
pub struct PostListQuery {
    pub page: Option<u32>,
    /// Posts written by this profile's owner
    #[serde(rename = "owner__profile")]
    pub owner_profile: Option<i64>,
    /// Posts by everyone this profile's owner follows
    pub feed: Option<i64>,
    /// Posts this profile's owner has liked
    pub liked_by: Option<i64>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PostPayload {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image: Option<ImageUpload>,
    pub image_filter: Option<String>,
}

impl PostPayload {
    fn validate(&self, v: &mut Validator) {
        if let Some(title) = &self.title {
            v.text("title", title, false, Some(TITLE_MAX_LENGTH));
        }
        if let Some(filter) = &self.image_filter {
            v.choice("image_filter", filter, IMAGE_FILTERS);
        }
    }
}

/// GET /posts/
pub async fn list(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    query: Result<Query<PostListQuery>, QueryRejection>,
) -> ApiResult<Page<PostView>> {
    let Query(query) = query?;
    let page = PageRequest::new(query.page, state.settings.api.page_size)?;
    let conditions = list_conditions(&state.db, &query).await?;

    let (count, posts) = fetch_page::<Post>(
        &state.db,
        conditions,
        ordering(query.ordering.as_deref(), ORDERING_FIELDS),
        page,
    )
    .await?;

    let ctx = Projector::new(&state.db, &requester);
    let mut results = Vec::with_capacity(posts.len());
    for post in &posts {
        results.push(PostView::project(post, &ctx).await?);
    }
    Ok(ApiResponse::success(Page::new(page, count, results)?))
}

async fn list_conditions(db: &Database, query: &PostListQuery) -> Result<Vec<Value>, ApiError> {
    let mut conditions = Vec::new();

    if let Some(profile_id) = query.owner_profile {
        let owners = profile_owner(db, profile_id).await?;
        conditions.push(any_of("owner_id", owners));
    }

    if let Some(profile_id) = query.feed {
        let followed = match profile_owner(db, profile_id).await? {
            Some(owner) => db
                .repo::<Follower>()
                .select_any(FilterData::new().with_where(json!({ "owner_id": owner })))
                .await?
                .into_iter()
                .map(|edge| edge.followed_id)
                .collect(),
            None => vec![],
        };
        conditions.push(any_of("owner_id", followed));
    }

    if let Some(profile_id) = query.liked_by {
        let liked = match profile_owner(db, profile_id).await? {
            Some(owner) => db
                .repo::<Like>()
                .select_any(FilterData::new().with_where(json!({ "owner_id": owner })))
                .await?
                .into_iter()
                .map(|like| like.post_id)
                .collect(),
            None => vec![],
        };
        conditions.push(any_of("id", liked));
    }

    if let Some(term) = query.search.as_deref().filter(|t| !t.trim().is_empty()) {
        let pattern = contains(term);
        let authors: Vec<i64> = db
            .repo::<User>()
            .select_any(FilterData::new().with_where(json!({ "username": { "$ilike": pattern } })))
            .await?
            .into_iter()
            .map(|user| user.id)
            .collect();
        conditions.push(json!({
            "$or": [
                { "title": { "$ilike": pattern } },
                any_of("owner_id", authors),
            ]
        }));
    }

    Ok(conditions)
}

/// POST /posts/
pub async fn create(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    payload: Result<Json<PostPayload>, JsonRejection>,
) -> ApiResult<PostView> {
    let user = requester.require()?;
    let Json(payload) = payload?;

    let mut v = Validator::new();
    v.require("title", payload.title.as_ref());
    payload.validate(&mut v);
    v.finish()?;

    let image = store_image(&state.media, payload.image.as_ref())
        .await?
        .unwrap_or_else(|| state.settings.media.default_post_image.clone());

    let post: Post = state
        .db
        .repo::<Post>()
        .insert(&NewPost {
            owner_id: user.user_id,
            title: payload.title.unwrap_or_default(),
            content: payload.content.unwrap_or_default(),
            image,
            image_filter: payload.image_filter.unwrap_or_else(|| DEFAULT_IMAGE_FILTER.to_string()),
        })
        .await?;

    let ctx = Projector::new(&state.db, &requester);
    Ok(ApiResponse::created(PostView::project(&post, &ctx).await?))
}

/// GET /posts/{id}/
pub async fn retrieve(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<PostView> {
    let Path(id) = id?;
    let post = state.db.repo::<Post>().select_404(id).await?;
    let ctx = Projector::new(&state.db, &requester);
    Ok(ApiResponse::success(PostView::project(&post, &ctx).await?))
}

/// PUT|PATCH /posts/{id}/
pub async fn update(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<PostPayload>, JsonRejection>,
) -> ApiResult<PostView> {
    let Path(id) = id?;
    let repo = state.db.repo::<Post>();
    let post = repo.select_404(id).await?;
    check_owner(&requester, &post)?;

    let Json(payload) = payload?;
    let mut v = Validator::new();
    payload.validate(&mut v);
    v.finish()?;

    let changes = PostChanges {
        image: store_image(&state.media, payload.image.as_ref()).await?,
        title: payload.title,
        content: payload.content,
        image_filter: payload.image_filter,
    };
    let post = repo.update(id, &changes).await?;

    let ctx = Projector::new(&state.db, &requester);
    Ok(ApiResponse::success(PostView::project(&post, &ctx).await?))
}

/// DELETE /posts/{id}/
pub async fn destroy(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = id?;
    let repo = state.db.repo::<Post>();
    let post = repo.select_404(id).await?;
    check_owner(&requester, &post)?;

    repo.delete(id).await?;
    tracing::info!("Post {} deleted by user {}", id, post.owner_id);
    Ok(ApiResponse::no_content())
}
