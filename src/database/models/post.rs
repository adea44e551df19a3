use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::entity::{Entity, SqlType};

/// Accepted values for `image_filter`
pub const IMAGE_FILTERS: &[&str] = &[
    "_1977", "brannan", "earlybird", "hudson", "inkwell", "lofi", "kelvin", "normal", "nashville", "rise",
    "toaster", "valencia", "walden", "xpro2",
];

pub const DEFAULT_IMAGE_FILTER: &str = "normal";

#[derive(Debug, Clone, Deserialize, FromRow)]
pub struct Post {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub content: String,
    pub image: String,
    pub image_filter: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Post {
    const TABLE: &'static str = "posts";
    const COLUMNS: &'static [(&'static str, SqlType)] = &[
        ("owner_id", SqlType::BigInt),
        ("title", SqlType::Text),
        ("content", SqlType::Text),
        ("image", SqlType::Text),
        ("image_filter", SqlType::Text),
    ];
    const HAS_UPDATED_AT: bool = true;
}

#[derive(Debug, Serialize)]
pub struct NewPost {
    pub owner_id: i64,
    pub title: String,
    pub content: String,
    pub image: String,
    pub image_filter: String,
}

#[derive(Debug, Default, Serialize)]
pub struct PostChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_filter: Option<String>,
}
