// /profiles/ and /profiles/{id}/
//
// Profiles are provisioned with their user, so there is no create or delete.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Extension, Json, Path, Query, State};
use serde::Deserialize;
use serde_json::json;

use crate::api::projection::{ProfileView, Projector};
use crate::api::{Page, PageRequest};
use crate::database::models::{Follower, Profile, ProfileChanges};
use crate::database::Database;
use crate::error::ApiError;
use crate::filter::FilterData;
use crate::media::ImageUpload;
use crate::middleware::{ApiResponse, ApiResult, Requester};
use crate::permissions::check_owner;
use crate::state::AppState;

use super::utils::{any_of, fetch_page, ordering, profile_owner, store_image, Validator};

const NAME_MAX_LENGTH: usize = 255;
const ORDERING_FIELDS: &[&str] = &["created_at", "updated_at"];

#[derive(Debug, Default, Deserialize)]
pub struct ProfileListQuery {
    pub page: Option<u32>,
    /// Followers of this profile's owner
    pub following_of: Option<i64>,
    /// Everyone this profile's owner follows
    pub followed_by: Option<i64>,
    pub ordering: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub content: Option<String>,
    pub image: Option<ImageUpload>,
}

/// GET /profiles/
pub async fn list(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    query: Result<Query<ProfileListQuery>, QueryRejection>,
) -> ApiResult<Page<ProfileView>> {
    let Query(query) = query?;
    let page = PageRequest::new(query.page, state.settings.api.page_size)?;

    let mut conditions = Vec::new();
    if let Some(profile_id) = query.following_of {
        let followers = follow_edges(&state.db, profile_id, "followed_id", |edge| edge.owner_id).await?;
        conditions.push(any_of("owner_id", followers));
    }
    if let Some(profile_id) = query.followed_by {
        let followed = follow_edges(&state.db, profile_id, "owner_id", |edge| edge.followed_id).await?;
        conditions.push(any_of("owner_id", followed));
    }

    let (count, profiles) = fetch_page::<Profile>(
        &state.db,
        conditions,
        ordering(query.ordering.as_deref(), ORDERING_FIELDS),
        page,
    )
    .await?;

    let ctx = Projector::new(&state.db, &requester);
    let mut results = Vec::with_capacity(profiles.len());
    for profile in &profiles {
        results.push(ProfileView::project(profile, &ctx).await?);
    }
    Ok(ApiResponse::success(Page::new(page, count, results)?))
}

/// Follow edges touching a profile's owner on `column`, mapped to the user on the other end
async fn follow_edges(
    db: &Database,
    profile_id: i64,
    column: &str,
    other_end: fn(&Follower) -> i64,
) -> Result<Vec<i64>, ApiError> {
    let Some(owner) = profile_owner(db, profile_id).await? else {
        return Ok(vec![]);
    };
    let edges = db
        .repo::<Follower>()
        .select_any(FilterData::new().with_where(json!({ column: owner })))
        .await?;
    Ok(edges.iter().map(other_end).collect())
}

/// GET /profiles/{id}/
pub async fn retrieve(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<ProfileView> {
    let Path(id) = id?;
    let profile = state.db.repo::<Profile>().select_404(id).await?;
    let ctx = Projector::new(&state.db, &requester);
    Ok(ApiResponse::success(ProfileView::project(&profile, &ctx).await?))
}

/// PUT|PATCH /profiles/{id}/
pub async fn update(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateProfile>, JsonRejection>,
) -> ApiResult<ProfileView> {
    let Path(id) = id?;
    let repo = state.db.repo::<Profile>();
    let profile = repo.select_404(id).await?;
    check_owner(&requester, &profile)?;

    let Json(payload) = payload?;
    let mut v = Validator::new();
    if let Some(name) = &payload.name {
        v.text("name", name, true, Some(NAME_MAX_LENGTH));
    }
    v.finish()?;

    let changes = ProfileChanges {
        image: store_image(&state.media, payload.image.as_ref()).await?,
        name: payload.name,
        content: payload.content,
    };
    let profile = repo.update(id, &changes).await?;

    let ctx = Projector::new(&state.db, &requester);
    Ok(ApiResponse::success(ProfileView::project(&profile, &ctx).await?))
}
