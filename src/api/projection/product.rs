use rust_decimal::Decimal;
use serde::Serialize;

use crate::api::projection::Projector;
use crate::database::models::{Category, Product};
use crate::database::{Database, DatabaseError};
use crate::permissions::is_owner;

#[derive(Debug, Serialize)]
pub struct ProductView {
    pub id: i64,
    pub owner: String,
    pub is_owner: bool,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image: String,
    pub category: Option<i64>,
    pub category_name: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl ProductView {
    pub async fn project(product: &Product, ctx: &Projector<'_>) -> Result<Self, DatabaseError> {
        Ok(Self {
            id: product.id,
            owner: ctx.username(product.owner_id).await?,
            is_owner: is_owner(product.owner_id, ctx.requester),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            image: product.image.clone(),
            category: product.category_id,
            category_name: category_name(ctx.db, product).await?,
            created_at: ctx.timestamp(product.created_at),
            updated_at: ctx.timestamp(product.updated_at),
        })
    }
}

/// Null when the product is uncategorized
pub async fn category_name(db: &Database, product: &Product) -> Result<Option<String>, DatabaseError> {
    match product.category_id {
        Some(id) => Ok(db.repo::<Category>().get(id).await?.map(|c| c.name)),
        None => Ok(None),
    }
}
