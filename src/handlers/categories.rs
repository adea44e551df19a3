// /categories/ and /categories/{id}/ - staff only, reads included

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Extension, Json, Path, Query, State};
use serde::Deserialize;

use crate::api::projection::{CategoryView, Projector};
use crate::api::{Page, PageRequest};
use crate::database::models::{Category, CategoryChanges, NewCategory};
use crate::database::schema::CATEGORIES_NAME_KEY;
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Requester};
use crate::permissions::check_admin;
use crate::state::AppState;

use super::utils::{fetch_page, ordering, Validator};

const NAME_MAX_LENGTH: usize = 100;
const ORDERING_FIELDS: &[&str] = &["created_at", "name"];

#[derive(Debug, Default, Deserialize)]
pub struct CategoryListQuery {
    pub page: Option<u32>,
    pub ordering: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryPayload {
    pub name: Option<String>,
}

fn duplicate_name(err: DatabaseError) -> ApiError {
    if err.is_constraint(CATEGORIES_NAME_KEY) {
        ApiError::field("name", "category with this name already exists.")
    } else {
        err.into()
    }
}

/// GET /categories/
pub async fn list(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    query: Result<Query<CategoryListQuery>, QueryRejection>,
) -> ApiResult<Page<CategoryView>> {
    check_admin(&requester)?;
    let Query(query) = query?;
    let page = PageRequest::new(query.page, state.settings.api.page_size)?;

    let (count, categories) = fetch_page::<Category>(
        &state.db,
        vec![],
        ordering(query.ordering.as_deref(), ORDERING_FIELDS),
        page,
    )
    .await?;

    let ctx = Projector::new(&state.db, &requester);
    let results = categories.iter().map(|c| CategoryView::project(c, &ctx)).collect();
    Ok(ApiResponse::success(Page::new(page, count, results)?))
}

/// POST /categories/
pub async fn create(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    payload: Result<Json<CategoryPayload>, JsonRejection>,
) -> ApiResult<CategoryView> {
    check_admin(&requester)?;
    let Json(payload) = payload?;

    let mut v = Validator::new();
    let name = v.require("name", payload.name);
    if let Some(name) = &name {
        v.text("name", name, false, Some(NAME_MAX_LENGTH));
    }
    v.finish()?;
    let Some(name) = name else {
        return Err(ApiError::bad_request("Invalid input."));
    };

    let category: Category = state
        .db
        .repo::<Category>()
        .insert(&NewCategory { name })
        .await
        .map_err(duplicate_name)?;

    tracing::info!("Category {} created", category.name);
    let ctx = Projector::new(&state.db, &requester);
    Ok(ApiResponse::created(CategoryView::project(&category, &ctx)))
}

/// GET /categories/{id}/
pub async fn retrieve(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<CategoryView> {
    check_admin(&requester)?;
    let Path(id) = id?;
    let category = state.db.repo::<Category>().select_404(id).await?;
    let ctx = Projector::new(&state.db, &requester);
    Ok(ApiResponse::success(CategoryView::project(&category, &ctx)))
}

/// PUT|PATCH /categories/{id}/
pub async fn update(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CategoryPayload>, JsonRejection>,
) -> ApiResult<CategoryView> {
    check_admin(&requester)?;
    let Path(id) = id?;
    let repo = state.db.repo::<Category>();
    repo.select_404(id).await?;

    let Json(payload) = payload?;
    let mut v = Validator::new();
    if let Some(name) = &payload.name {
        v.text("name", name, false, Some(NAME_MAX_LENGTH));
    }
    v.finish()?;

    let category = repo
        .update(id, &CategoryChanges { name: payload.name })
        .await
        .map_err(duplicate_name)?;

    let ctx = Projector::new(&state.db, &requester);
    Ok(ApiResponse::success(CategoryView::project(&category, &ctx)))
}

/// DELETE /categories/{id}/ - linked products become uncategorized
pub async fn destroy(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    check_admin(&requester)?;
    let Path(id) = id?;
    let repo = state.db.repo::<Category>();
    repo.select_404(id).await?;

    repo.delete(id).await?;
    Ok(ApiResponse::no_content())
}
