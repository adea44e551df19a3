// /products/ and /products/{id}/

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Extension, Json, Path, Query, State};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use crate::api::projection::{ProductView, Projector};
use crate::api::{Page, PageRequest};
use crate::database::models::{NewProduct, Product, ProductChanges};
use crate::database::schema::PRODUCTS_CATEGORY_FKEY;
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::media::ImageUpload;
use crate::middleware::{ApiResponse, ApiResult, Requester};
use crate::permissions::check_owner;
use crate::state::AppState;

use super::utils::{contains, double_option, fetch_page, invalid_pk, ordering, store_image, Validator};

const NAME_MAX_LENGTH: usize = 255;
const PRICE_MAX_DIGITS: u32 = 10;
const PRICE_DECIMAL_PLACES: u32 = 2;
const ORDERING_FIELDS: &[&str] = &["created_at", "price", "name"];

#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    pub page: Option<u32>,
    pub category: Option<i64>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProductPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub image: Option<ImageUpload>,
    /// Absent leaves the link alone, null clears it
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<i64>>,
}

impl ProductPayload {
    fn validate(&self, v: &mut Validator) {
        if let Some(name) = &self.name {
            v.text("name", name, false, Some(NAME_MAX_LENGTH));
        }
        if let Some(price) = self.price {
            check_price(v, price);
        }
    }
}

fn check_price(v: &mut Validator, price: Decimal) {
    let price = price.normalize();
    let integer_digits = price.trunc().abs().to_string().trim_start_matches('0').len() as u32;

    if price.is_sign_negative() && !price.is_zero() {
        v.add("price", "Ensure this value is greater than or equal to 0.");
    } else if price.scale() > PRICE_DECIMAL_PLACES {
        v.add(
            "price",
            format!("Ensure that there are no more than {} decimal places.", PRICE_DECIMAL_PLACES),
        );
    } else if integer_digits > PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES {
        v.add(
            "price",
            format!("Ensure that there are no more than {} digits in total.", PRICE_MAX_DIGITS),
        );
    }
}

fn category_error(err: DatabaseError, category: Option<i64>) -> ApiError {
    match (err, category) {
        (e, Some(id)) if e.is_constraint(PRODUCTS_CATEGORY_FKEY) => invalid_pk("category", id),
        (e, _) => e.into(),
    }
}

/// GET /products/
pub async fn list(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    query: Result<Query<ProductListQuery>, QueryRejection>,
) -> ApiResult<Page<ProductView>> {
    let Query(query) = query?;
    let page = PageRequest::new(query.page, state.settings.api.page_size)?;

    let mut conditions = Vec::new();
    if let Some(category) = query.category {
        conditions.push(json!({ "category_id": category }));
    }
    if let Some(term) = query.search.as_deref().filter(|t| !t.trim().is_empty()) {
        let pattern = contains(term);
        conditions.push(json!({
            "$or": [
                { "name": { "$ilike": pattern } },
                { "description": { "$ilike": pattern } },
            ]
        }));
    }

    let (count, products) = fetch_page::<Product>(
        &state.db,
        conditions,
        ordering(query.ordering.as_deref(), ORDERING_FIELDS),
        page,
    )
    .await?;

    let ctx = Projector::new(&state.db, &requester);
    let mut results = Vec::with_capacity(products.len());
    for product in &products {
        results.push(ProductView::project(product, &ctx).await?);
    }
    Ok(ApiResponse::success(Page::new(page, count, results)?))
}

/// POST /products/
pub async fn create(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    payload: Result<Json<ProductPayload>, JsonRejection>,
) -> ApiResult<ProductView> {
    let user = requester.require()?;
    let Json(payload) = payload?;

    let mut v = Validator::new();
    v.require("name", payload.name.as_ref());
    v.require("price", payload.price);
    payload.validate(&mut v);
    v.finish()?;

    let image = store_image(&state.media, payload.image.as_ref())
        .await?
        .unwrap_or_else(|| state.settings.media.default_product_image.clone());
    let category_id = payload.category.flatten();

    let product: Product = state
        .db
        .repo::<Product>()
        .insert(&NewProduct {
            owner_id: user.user_id,
            category_id,
            name: payload.name.unwrap_or_default(),
            description: payload.description.unwrap_or_default(),
            price: payload.price.unwrap_or_default(),
            image,
        })
        .await
        .map_err(|e| category_error(e, category_id))?;

    let ctx = Projector::new(&state.db, &requester);
    Ok(ApiResponse::created(ProductView::project(&product, &ctx).await?))
}

/// GET /products/{id}/
pub async fn retrieve(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<ProductView> {
    let Path(id) = id?;
    let product = state.db.repo::<Product>().select_404(id).await?;
    let ctx = Projector::new(&state.db, &requester);
    Ok(ApiResponse::success(ProductView::project(&product, &ctx).await?))
}

/// PUT|PATCH /products/{id}/
pub async fn update(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ProductPayload>, JsonRejection>,
) -> ApiResult<ProductView> {
    let Path(id) = id?;
    let repo = state.db.repo::<Product>();
    let product = repo.select_404(id).await?;
    check_owner(&requester, &product)?;

    let Json(payload) = payload?;
    let mut v = Validator::new();
    payload.validate(&mut v);
    v.finish()?;

    let category_id = payload.category.flatten();
    let changes = ProductChanges {
        image: store_image(&state.media, payload.image.as_ref()).await?,
        category_id: payload.category,
        name: payload.name,
        description: payload.description,
        price: payload.price,
    };
    let product = repo
        .update(id, &changes)
        .await
        .map_err(|e| category_error(e, category_id))?;

    let ctx = Projector::new(&state.db, &requester);
    Ok(ApiResponse::success(ProductView::project(&product, &ctx).await?))
}

/// DELETE /products/{id}/
pub async fn destroy(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = id?;
    let repo = state.db.repo::<Product>();
    let product = repo.select_404(id).await?;
    check_owner(&requester, &product)?;

    repo.delete(id).await?;
    Ok(ApiResponse::no_content())
}
