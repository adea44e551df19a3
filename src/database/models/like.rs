use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::entity::{Entity, SqlType};

/// At most one per (owner, post)
#[derive(Debug, Clone, Deserialize, FromRow)]
pub struct Like {
    pub id: i64,
    pub owner_id: i64,
    pub post_id: i64,
    pub created_at: DateTime<Utc>,
}

impl Entity for Like {
    const TABLE: &'static str = "likes";
    const COLUMNS: &'static [(&'static str, SqlType)] = &[("owner_id", SqlType::BigInt), ("post_id", SqlType::BigInt)];
    const HAS_UPDATED_AT: bool = false;
}

#[derive(Debug, Serialize)]
pub struct NewLike {
    pub owner_id: i64,
    pub post_id: i64,
}
