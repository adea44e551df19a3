use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::entity::{Entity, SqlType};

/// Catalog item. Deleting its category leaves the product uncategorized.
#[derive(Debug, Clone, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub owner_id: i64,
    pub category_id: Option<i64>,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Product {
    const TABLE: &'static str = "products";
    const COLUMNS: &'static [(&'static str, SqlType)] = &[
        ("owner_id", SqlType::BigInt),
        ("category_id", SqlType::BigInt),
        ("name", SqlType::Text),
        ("description", SqlType::Text),
        ("price", SqlType::Numeric),
        ("image", SqlType::Text),
    ];
    const HAS_UPDATED_AT: bool = true;
}

#[derive(Debug, Serialize)]
pub struct NewProduct {
    pub owner_id: i64,
    pub category_id: Option<i64>,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image: String,
}

#[derive(Debug, Default, Serialize)]
pub struct ProductChanges {
    /// `Some(None)` clears the category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Option<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}
