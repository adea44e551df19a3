use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::entity::{Entity, SqlType};

#[derive(Debug, Clone, Deserialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub owner_id: i64,
    pub post_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Comment {
    const TABLE: &'static str = "comments";
    const COLUMNS: &'static [(&'static str, SqlType)] = &[
        ("owner_id", SqlType::BigInt),
        ("post_id", SqlType::BigInt),
        ("content", SqlType::Text),
    ];
    const HAS_UPDATED_AT: bool = true;
}

#[derive(Debug, Serialize)]
pub struct NewComment {
    pub owner_id: i64,
    pub post_id: i64,
    pub content: String,
}

/// The parent post is fixed once a comment exists
#[derive(Debug, Default, Serialize)]
pub struct CommentChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}
