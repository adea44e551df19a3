use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::entity::{Entity, SqlType};

/// `owner_id` follows `followed_id`; at most one edge per pair
#[derive(Debug, Clone, Deserialize, FromRow)]
pub struct Follower {
    pub id: i64,
    pub owner_id: i64,
    pub followed_id: i64,
    pub created_at: DateTime<Utc>,
}

impl Entity for Follower {
    const TABLE: &'static str = "followers";
    const COLUMNS: &'static [(&'static str, SqlType)] =
        &[("owner_id", SqlType::BigInt), ("followed_id", SqlType::BigInt)];
    const HAS_UPDATED_AT: bool = false;
}

#[derive(Debug, Serialize)]
pub struct NewFollower {
    pub owner_id: i64,
    pub followed_id: i64,
}
